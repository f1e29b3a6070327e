use crate::constants::*;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub nominatim_base_url: String,
    pub overpass_endpoints: Vec<String>,
    pub country_codes: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub redis_url: Option<String>, // In-memory cache when absent
    pub road_cache_ttl: u64,
    /// JSON file backing user preferences; in-memory only when absent
    pub preferences_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.parse().unwrap_or(3000),
            nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_string(),
            overpass_endpoints: DEFAULT_OVERPASS_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            country_codes: DEFAULT_COUNTRY_CODES.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECONDS,
            redis_url: None,
            road_cache_ttl: DEFAULT_ROAD_CACHE_TTL_SECONDS,
            preferences_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let overpass_endpoints = match env::var("OVERPASS_ENDPOINTS") {
            Ok(raw) => parse_endpoint_list(&raw)?,
            Err(_) => DEFAULT_OVERPASS_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let country_codes =
            env::var("COUNTRY_CODES").unwrap_or_else(|_| DEFAULT_COUNTRY_CODES.to_string());
        if country_codes.trim().is_empty() {
            return Err("COUNTRY_CODES must not be empty".to_string());
        }

        let road_cache_ttl: u64 = env::var("ROAD_CACHE_TTL")
            .unwrap_or_else(|_| DEFAULT_ROAD_CACHE_TTL_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid ROAD_CACHE_TTL")?;
        if road_cache_ttl == 0 {
            return Err("ROAD_CACHE_TTL must be greater than 0".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            nominatim_base_url: env::var("NOMINATIM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_NOMINATIM_BASE_URL.to_string()),
            overpass_endpoints,
            country_codes,
            user_agent: env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid HTTP_TIMEOUT_SECS")?,
            redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
            road_cache_ttl,
            preferences_path: env::var("PREFERENCES_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_endpoint_list(raw: &str) -> Result<Vec<String>, String> {
    let endpoints: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if endpoints.is_empty() {
        return Err("OVERPASS_ENDPOINTS must list at least one URL".to_string());
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "NOMINATIM_BASE_URL",
        "OVERPASS_ENDPOINTS",
        "COUNTRY_CODES",
        "HTTP_USER_AGENT",
        "HTTP_TIMEOUT_SECS",
        "REDIS_URL",
        "ROAD_CACHE_TTL",
        "PREFERENCES_PATH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.country_codes, "ph");
        assert_eq!(config.overpass_endpoints.len(), DEFAULT_OVERPASS_ENDPOINTS.len());
        assert_eq!(config.road_cache_ttl, DEFAULT_ROAD_CACHE_TTL_SECONDS);
        assert!(config.redis_url.is_none());
        assert!(config.preferences_path.is_none());
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("PORT", "8080");
        env::set_var("OVERPASS_ENDPOINTS", "http://a/api, http://b/api,");
        env::set_var("PREFERENCES_PATH", "/tmp/floodmap-prefs.json");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.overpass_endpoints, vec!["http://a/api", "http://b/api"]);
        assert_eq!(
            config.preferences_path,
            Some(PathBuf::from("/tmp/floodmap-prefs.json"))
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        clear_env();
        env::set_var("OVERPASS_ENDPOINTS", " , ");
        assert!(Config::from_env().is_err());

        clear_env();
        env::set_var("ROAD_CACHE_TTL", "0");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_default_matches_constants() {
        let config = Config::default();
        assert_eq!(config.nominatim_base_url, DEFAULT_NOMINATIM_BASE_URL);
        assert_eq!(config.port, 3000);
    }
}
