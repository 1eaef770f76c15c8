use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::map::geo::LatLng;
use crate::map::overlay::{MapDefaults, DEFAULT_CENTER, DEFAULT_FIT_PADDING_PX, DEFAULT_ZOOM};
use crate::map::style::TileLayer;

pub const API_URL_ENV: &str = "GREENROUTE_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub health_interval_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub simulation_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_center")]
    pub center: LatLng,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_fit_padding")]
    pub fit_padding_px: u32,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_tile_attribution")]
    pub tile_attribution: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

/// Per-route coordinates for drawing delivery logs; the history feed carries no geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub geometry: BTreeMap<String, Vec<LatLng>>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/greenroute/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    /// Environment first, then explicit overrides, so CLI flags win.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url.trim().to_string();
            }
        }
        if let Some(base_url) = overrides.base_url {
            self.backend.base_url = base_url;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[backend]
base_url = "http://localhost:8000"
timeout_secs = 15
connect_timeout_secs = 5
user_agent = "greenroute-dashboard/0.1"

[polling]
health_interval_ms = 5000
simulation_interval_ms = 5000

[map]
container = "map"
center = [40.7128, -74.0060]
zoom = 11
fit_padding_px = 50
tile_url = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
tile_attribution = "&copy; OpenStreetMap contributors &copy; CARTO"
max_zoom = 19

# Coordinates used to draw a delivery log, keyed by route id.
[history.geometry]
# R-101 = [[40.7128, -74.0060], [40.7200, -74.0500], [40.7357, -74.1724]]
"#;
        template.to_string()
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

impl PollingConfig {
    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms.max(1))
    }

    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.simulation_interval_ms.max(1))
    }
}

impl From<&MapConfig> for MapDefaults {
    fn from(value: &MapConfig) -> Self {
        Self {
            container: value.container.clone(),
            center: value.center,
            zoom: value.zoom,
            fit_padding_px: value.fit_padding_px,
            tiles: TileLayer {
                url_template: value.tile_url.clone(),
                attribution: value.tile_attribution.clone(),
                max_zoom: value.max_zoom,
            },
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval_ms: default_poll_interval_ms(),
            simulation_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            center: default_center(),
            zoom: default_zoom(),
            fit_padding_px: default_fit_padding(),
            tile_url: default_tile_url(),
            tile_attribution: default_tile_attribution(),
            max_zoom: default_max_zoom(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    "greenroute-dashboard/0.1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_container() -> String {
    MapDefaults::default().container
}

fn default_center() -> LatLng {
    DEFAULT_CENTER
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_fit_padding() -> u32 {
    DEFAULT_FIT_PADDING_PX
}

fn default_tile_url() -> String {
    MapDefaults::default().tiles.url_template
}

fn default_tile_attribution() -> String {
    MapDefaults::default().tiles.attribution
}

fn default_max_zoom() -> u8 {
    MapDefaults::default().tiles.max_zoom
}
