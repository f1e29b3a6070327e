//! The map viewer: search panel, map canvas and the composer that wires them.

pub mod app;
pub mod map_canvas;
pub mod search;
pub mod surface;

pub use app::FloodViewer;
pub use map_canvas::{CanvasEffect, CanvasPhase, MapCanvas};
pub use search::{PendingSelection, SearchPanel, SearchTicket};
pub use surface::{GeoJsonSurface, MapEvent, MapEventKind, MapSurface, PathStyle, TileLayer};
