use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolylineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub dash_array: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TooltipDirection {
    Auto,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub permanent: bool,
    pub direction: TooltipDirection,
}

impl Tooltip {
    pub fn sticky(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            permanent: true,
            direction: TooltipDirection::Top,
        }
    }

    pub fn hover(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            permanent: false,
            direction: TooltipDirection::Auto,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

pub fn recommended_route() -> PolylineStyle {
    PolylineStyle {
        color: "#10b981".to_string(),
        weight: 6.0,
        opacity: 1.0,
        dash_array: None,
    }
}

pub fn alternative_route() -> PolylineStyle {
    PolylineStyle {
        color: "#94a3b8".to_string(),
        weight: 4.0,
        opacity: 0.5,
        dash_array: Some("10, 10".to_string()),
    }
}

pub fn historical_route() -> PolylineStyle {
    PolylineStyle {
        color: "#3b82f6".to_string(),
        weight: 6.0,
        opacity: 0.9,
        dash_array: None,
    }
}

pub fn start_marker() -> MarkerStyle {
    MarkerStyle {
        radius: 8.0,
        color: "#ffffff".to_string(),
        fill_color: "#22c55e".to_string(),
        fill_opacity: 1.0,
        weight: 2.0,
    }
}

pub fn end_marker() -> MarkerStyle {
    MarkerStyle {
        radius: 8.0,
        color: "#ffffff".to_string(),
        fill_color: "#ef4444".to_string(),
        fill_opacity: 1.0,
        weight: 2.0,
    }
}
