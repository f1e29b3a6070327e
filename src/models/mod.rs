pub mod coordinates;
pub mod place;
pub mod severity;
pub mod way;

pub use coordinates::Coordinates;
pub use place::PlaceCandidate;
pub use severity::{legend, severity_color, LegendEntry, SeverityLevel};
pub use way::Way;
