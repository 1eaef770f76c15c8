use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::map::geo::{LatLng, LatLngBounds};
use crate::map::style::{MarkerStyle, PolylineStyle, TileLayer, Tooltip};

/// Opaque reference to one element drawn on a [`MapSurface`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerHandle(u64);

impl LayerHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Display for LayerHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A map widget bound to a single container.
pub trait MapSurface {
    fn add_tile_layer(&mut self, layer: &TileLayer) -> LayerHandle;
    fn add_polyline(&mut self, path: &[LatLng], style: &PolylineStyle) -> LayerHandle;
    fn add_circle_marker(&mut self, at: LatLng, style: &MarkerStyle) -> LayerHandle;
    fn bind_tooltip(&mut self, layer: LayerHandle, tooltip: &Tooltip);
    fn remove_layer(&mut self, layer: LayerHandle);
    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32);
    fn set_view(&mut self, center: LatLng, zoom: u8);
}

/// Creates map surfaces. Returns `None` when no rendering engine is available.
pub trait MapEngine {
    type Surface: MapSurface;

    fn create_surface(&self, container: &str, center: LatLng, zoom: u8) -> Option<Self::Surface>;
}
