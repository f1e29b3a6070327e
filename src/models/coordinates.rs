use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lon
            ));
        }
        Ok(Coordinates { lat, lon })
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// GeoJSON position order: `[lon, lat]`.
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

/// Total length of a polyline in kilometers.
pub fn path_length_km(path: &[Coordinates]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(14.5995, 120.9842).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err()); // Invalid lat
        assert!(Coordinates::new(0.0, 181.0).is_err()); // Invalid lon
    }

    #[test]
    fn test_distance_calculation() {
        let manila = Coordinates::new(14.5995, 120.9842).unwrap();
        let cebu = Coordinates::new(10.3157, 123.8854).unwrap();

        let distance = manila.distance_to(&cebu);
        // Manila to Cebu City is approximately 570 km
        assert!((distance - 570.0).abs() < 15.0, "got {distance}");
    }

    #[test]
    fn test_path_length() {
        let path = vec![
            Coordinates::new(14.60, 121.00).unwrap(),
            Coordinates::new(14.61, 121.00).unwrap(),
            Coordinates::new(14.62, 121.00).unwrap(),
        ];
        // 0.02 degrees of latitude is about 2.22 km
        assert!((path_length_km(&path) - 2.22).abs() < 0.05);

        assert_eq!(path_length_km(&path[..1]), 0.0);
        assert_eq!(path_length_km(&[]), 0.0);
    }

    #[test]
    fn test_position_order() {
        let c = Coordinates::new(14.6, 121.07).unwrap();
        assert_eq!(c.to_position(), vec![121.07, 14.6]);
    }
}
