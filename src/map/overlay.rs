//! Route overlay manager.
//!
//! Owns one map surface and the registry of layers drawn on it. Every redraw
//! removes the previous layer set before drawing the new one, so the registry
//! only ever holds the handles of the latest redraw.

use serde::Serialize;
use tracing::debug;

use crate::map::geo::{LatLng, LatLngBounds};
use crate::map::style::{self, TileLayer, Tooltip};
use crate::map::surface::{LayerHandle, MapEngine, MapSurface};
use crate::types::{DeliveryLog, RouteOption};

pub const DEFAULT_CENTER: LatLng = LatLng::new(40.7128, -74.0060);
pub const DEFAULT_ZOOM: u8 = 11;
pub const DEFAULT_FIT_PADDING_PX: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaults {
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
    pub fit_padding_px: u32,
    pub tiles: TileLayer,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            fit_padding_px: DEFAULT_FIT_PADDING_PX,
            tiles: TileLayer {
                url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
                    .to_string(),
                attribution: "&copy; OpenStreetMap contributors &copy; CARTO".to_string(),
                max_zoom: 19,
            },
        }
    }
}

/// Everything a redraw depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayScene {
    pub recommended: Option<RouteOption>,
    pub alternatives: Vec<RouteOption>,
    pub historical_route: Vec<LatLng>,
    pub historical_log: Option<DeliveryLog>,
}

impl OverlayScene {
    pub fn live(recommended: Option<RouteOption>, alternatives: Vec<RouteOption>) -> Self {
        Self {
            recommended,
            alternatives,
            ..Self::default()
        }
    }

    pub fn historical(route: Vec<LatLng>, log: Option<DeliveryLog>) -> Self {
        Self {
            historical_route: route,
            historical_log: log,
            ..Self::default()
        }
    }

    pub fn has_historical_route(&self) -> bool {
        !self.historical_route.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    Live,
    Historical,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "framing", rename_all = "snake_case")]
pub enum Framing {
    Fitted { bounds: LatLngBounds },
    DefaultView,
    /// No surface to draw on.
    Skipped,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RedrawSummary {
    pub mode: SceneMode,
    pub layers_drawn: usize,
    pub framing: Framing,
}

pub struct OverlayManager<S: MapSurface> {
    defaults: MapDefaults,
    surface: Option<S>,
    base_layer: Option<LayerHandle>,
    layers: Vec<LayerHandle>,
}

impl<S: MapSurface> OverlayManager<S> {
    pub fn new(defaults: MapDefaults) -> Self {
        Self {
            defaults,
            surface: None,
            base_layer: None,
            layers: Vec::new(),
        }
    }

    /// Acquire the surface and install the base tile layer. Calling this on an
    /// initialized manager does nothing. Returns whether a surface is held.
    pub fn initialize<E>(&mut self, engine: &E) -> bool
    where
        E: MapEngine<Surface = S>,
    {
        if self.surface.is_some() {
            return true;
        }
        let Some(mut surface) = engine.create_surface(
            &self.defaults.container,
            self.defaults.center,
            self.defaults.zoom,
        ) else {
            debug!(
                container = %self.defaults.container,
                "map engine unavailable, overlay disabled"
            );
            return false;
        };
        self.base_layer = Some(surface.add_tile_layer(&self.defaults.tiles));
        self.surface = Some(surface);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Handles drawn by the latest redraw.
    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    pub fn defaults(&self) -> &MapDefaults {
        &self.defaults
    }

    pub fn redraw(&mut self, scene: &OverlayScene) -> RedrawSummary {
        let mode = if scene.has_historical_route() {
            SceneMode::Historical
        } else {
            SceneMode::Live
        };
        let Some(surface) = self.surface.as_mut() else {
            return RedrawSummary {
                mode,
                layers_drawn: 0,
                framing: Framing::Skipped,
            };
        };

        for handle in self.layers.drain(..) {
            surface.remove_layer(handle);
        }

        let fit = match mode {
            SceneMode::Historical => draw_historical(surface, &mut self.layers, scene),
            SceneMode::Live => draw_live(surface, &mut self.layers, scene),
        };

        let framing = match fit {
            Some(bounds) => {
                surface.fit_bounds(bounds, self.defaults.fit_padding_px);
                Framing::Fitted { bounds }
            }
            None => {
                surface.set_view(self.defaults.center, self.defaults.zoom);
                Framing::DefaultView
            }
        };

        debug!(
            ?mode,
            layers = self.layers.len(),
            ?framing,
            "overlay redrawn"
        );
        RedrawSummary {
            mode,
            layers_drawn: self.layers.len(),
            framing,
        }
    }

    /// Remove every layer, base tiles included, and give the surface back.
    pub fn teardown(&mut self) -> Option<S> {
        let mut surface = self.surface.take()?;
        for handle in self.layers.drain(..) {
            surface.remove_layer(handle);
        }
        if let Some(base) = self.base_layer.take() {
            surface.remove_layer(base);
        }
        Some(surface)
    }
}

fn draw_live<S: MapSurface>(
    surface: &mut S,
    layers: &mut Vec<LayerHandle>,
    scene: &OverlayScene,
) -> Option<LatLngBounds> {
    for alternative in &scene.alternatives {
        if alternative.coordinates.is_empty() {
            continue;
        }
        let handle = surface.add_polyline(&alternative.coordinates, &style::alternative_route());
        surface.bind_tooltip(
            handle,
            &Tooltip::hover(format!(
                "{} ({:.0} min)",
                alternative.name, alternative.eta_mins
            )),
        );
        layers.push(handle);
    }

    let Some(recommended) = scene
        .recommended
        .as_ref()
        .filter(|route| !route.coordinates.is_empty())
    else {
        // only alternatives on screen: frame all of them
        let drawn: Vec<LatLng> = scene
            .alternatives
            .iter()
            .flat_map(|route| route.coordinates.iter().copied())
            .collect();
        return LatLngBounds::from_coordinates(&drawn);
    };
    let handle = surface.add_polyline(&recommended.coordinates, &style::recommended_route());
    surface.bind_tooltip(
        handle,
        &Tooltip::sticky(format!(
            "Recommended: {} ({:.0} min)",
            recommended.name, recommended.eta_mins
        )),
    );
    layers.push(handle);
    LatLngBounds::from_coordinates(&recommended.coordinates)
}

fn draw_historical<S: MapSurface>(
    surface: &mut S,
    layers: &mut Vec<LayerHandle>,
    scene: &OverlayScene,
) -> Option<LatLngBounds> {
    let route = &scene.historical_route;
    let (first, last) = (*route.first()?, *route.last()?);

    layers.push(surface.add_polyline(route, &style::historical_route()));
    let start = surface.add_circle_marker(first, &style::start_marker());
    let end = surface.add_circle_marker(last, &style::end_marker());
    if let Some(log) = &scene.historical_log {
        surface.bind_tooltip(start, &Tooltip::hover(format!("Log {}", log.log_id)));
        surface.bind_tooltip(
            end,
            &Tooltip::hover(format!("Delivered {}", log.display_timestamp())),
        );
    }
    layers.push(start);
    layers.push(end);
    LatLngBounds::from_coordinates(route)
}
