//! Headless map engine that keeps the drawn layer set in memory.
//!
//! Used by the `render` command to print what a browser map would show, and by
//! tests to assert on layer lifecycle and viewport framing.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::map::geo::{LatLng, LatLngBounds};
use crate::map::style::{MarkerStyle, PolylineStyle, TileLayer, Tooltip};
use crate::map::surface::{LayerHandle, MapEngine, MapSurface};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawnElement {
    Tiles { layer: TileLayer },
    Polyline { path: Vec<LatLng>, style: PolylineStyle },
    CircleMarker { at: LatLng, style: MarkerStyle },
}

impl DrawnElement {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tiles { .. } => "tiles",
            Self::Polyline { .. } => "polyline",
            Self::CircleMarker { .. } => "circle_marker",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrawnLayer {
    pub handle: LayerHandle,
    pub element: DrawnElement,
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    Centered { center: LatLng, zoom: u8 },
    Fitted { bounds: LatLngBounds, padding_px: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct SurfaceSnapshot {
    pub container: String,
    pub viewport: Viewport,
    pub layers: Vec<DrawnLayer>,
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    container: String,
    next_handle: u64,
    layers: BTreeMap<LayerHandle, DrawnLayer>,
    viewport: Viewport,
}

impl RecordingSurface {
    pub fn new(container: &str, center: LatLng, zoom: u8) -> Self {
        Self {
            container: container.to_string(),
            next_handle: 1,
            layers: BTreeMap::new(),
            viewport: Viewport::Centered { center, zoom },
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&DrawnLayer> {
        self.layers.get(&handle)
    }

    pub fn layers(&self) -> impl Iterator<Item = &DrawnLayer> {
        self.layers.values()
    }

    pub fn tile_layer_count(&self) -> usize {
        self.count_kind("tiles")
    }

    pub fn polyline_count(&self) -> usize {
        self.count_kind("polyline")
    }

    pub fn marker_count(&self) -> usize {
        self.count_kind("circle_marker")
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            container: self.container.clone(),
            viewport: self.viewport.clone(),
            layers: self.layers.values().cloned().collect(),
        }
    }

    fn count_kind(&self, kind: &str) -> usize {
        self.layers
            .values()
            .filter(|layer| layer.element.kind() == kind)
            .count()
    }

    fn insert(&mut self, element: DrawnElement) -> LayerHandle {
        let handle = LayerHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.layers.insert(
            handle,
            DrawnLayer {
                handle,
                element,
                tooltip: None,
            },
        );
        handle
    }
}

impl MapSurface for RecordingSurface {
    fn add_tile_layer(&mut self, layer: &TileLayer) -> LayerHandle {
        self.insert(DrawnElement::Tiles {
            layer: layer.clone(),
        })
    }

    fn add_polyline(&mut self, path: &[LatLng], style: &PolylineStyle) -> LayerHandle {
        self.insert(DrawnElement::Polyline {
            path: path.to_vec(),
            style: style.clone(),
        })
    }

    fn add_circle_marker(&mut self, at: LatLng, style: &MarkerStyle) -> LayerHandle {
        self.insert(DrawnElement::CircleMarker {
            at,
            style: style.clone(),
        })
    }

    fn bind_tooltip(&mut self, layer: LayerHandle, tooltip: &Tooltip) {
        if let Some(entry) = self.layers.get_mut(&layer) {
            entry.tooltip = Some(tooltip.clone());
        }
    }

    fn remove_layer(&mut self, layer: LayerHandle) {
        self.layers.remove(&layer);
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32) {
        self.viewport = Viewport::Fitted { bounds, padding_px };
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport::Centered { center, zoom };
    }
}

#[derive(Debug)]
pub struct RecordingEngine {
    available: bool,
    created: Cell<usize>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            available: true,
            created: Cell::new(0),
        }
    }

    /// An engine that never produces a surface, as when no renderer is loaded.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            created: Cell::new(0),
        }
    }

    pub fn instances_created(&self) -> usize {
        self.created.get()
    }
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MapEngine for RecordingEngine {
    type Surface = RecordingSurface;

    fn create_surface(&self, container: &str, center: LatLng, zoom: u8) -> Option<RecordingSurface> {
        if !self.available {
            return None;
        }
        self.created.set(self.created.get() + 1);
        Some(RecordingSurface::new(container, center, zoom))
    }
}
