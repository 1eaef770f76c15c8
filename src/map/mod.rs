pub mod geo;
pub mod overlay;
pub mod recording;
pub mod style;
pub mod surface;

pub use self::geo::{LatLng, LatLngBounds};
pub use self::overlay::{MapDefaults, OverlayManager, OverlayScene, RedrawSummary};
pub use self::surface::{LayerHandle, MapEngine, MapSurface};
