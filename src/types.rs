use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::map::geo::LatLng;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteOption {
    pub id: String,
    pub name: String,
    pub distance_km: f64,
    pub eta_mins: f64,
    pub traffic_factor: f64,
    pub weather_risk: f64,
    pub emissions: f64,
    pub delay_probability: f64,
    pub score: f64,
    #[serde(default)]
    pub coordinates: Vec<LatLng>,
}

impl RouteOption {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            distance_km: 0.0,
            eta_mins: 0.0,
            traffic_factor: 0.0,
            weather_risk: 0.0,
            emissions: 0.0,
            delay_probability: 0.0,
            score: 0.0,
            coordinates: Vec::new(),
        }
    }

    pub fn with_eta(mut self, eta_mins: f64) -> Self {
        self.eta_mins = eta_mins;
        self
    }

    pub fn with_coordinates(mut self, coordinates: Vec<LatLng>) -> Self {
        self.coordinates = coordinates;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteAction {
    Proceed,
    Reroute,
    DelayDispatch,
    Error,
    #[serde(other)]
    Unknown,
}

impl Display for RouteAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Proceed => "PROCEED",
            Self::Reroute => "REROUTE",
            Self::DelayDispatch => "DELAY_DISPATCH",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationResult {
    pub recommended_route: RouteOption,
    #[serde(default)]
    pub alternatives: Vec<RouteOption>,
    pub action: RouteAction,
    pub customer_message: String,
    pub carbon_saved: f64,
    pub ai_explanation: String,
    pub timestamp: String,
}

impl OptimizationResult {
    pub fn requires_reroute(&self) -> bool {
        matches!(self.action, RouteAction::Reroute | RouteAction::DelayDispatch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationStatus {
    pub traffic_level: String,
    pub traffic_factor: f64,
    pub weather_condition: String,
    pub weather_risk: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Idle,
    Testing,
    Repair,
    #[serde(other)]
    Unknown,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 5] = [
        VehicleStatus::Active,
        VehicleStatus::Maintenance,
        VehicleStatus::Idle,
        VehicleStatus::Testing,
        VehicleStatus::Repair,
    ];
}

impl Display for VehicleStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Active => "Active",
            Self::Maintenance => "Maintenance",
            Self::Idle => "Idle",
            Self::Testing => "Testing",
            Self::Repair => "Repair",
            Self::Unknown => "Unknown",
        };
        write!(f, "{display}")
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = UnknownVehicleStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "maintenance" => Ok(Self::Maintenance),
            "idle" => Ok(Self::Idle),
            "testing" => Ok(Self::Testing),
            "repair" => Ok(Self::Repair),
            _ => Err(UnknownVehicleStatus(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown vehicle status: {0}")]
pub struct UnknownVehicleStatus(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub vehicle_id: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    /// `None` when the roster cell is blank or not a whole number.
    #[serde(default, deserialize_with = "lenient_capacity")]
    pub capacity: Option<u32>,
    pub status: VehicleStatus,
    #[serde(default)]
    pub assigned_orders: Vec<String>,
}

// Roster rows come from a CSV on the backend, so capacity arrives as 50, 50.0, "50" or "Unknown".
fn lenient_capacity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(capacity_from_value(&raw))
}

fn capacity_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(whole) => u32::try_from(whole).ok(),
            None => number.as_f64().and_then(whole_capacity),
        },
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u32>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_capacity))
        }
        _ => None,
    }
}

fn whole_capacity(value: f64) -> Option<u32> {
    let in_range = value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
    in_range.then(|| value as u32)
}

/// Body of `POST /fleet/add`: a vehicle without its order assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVehicle {
    pub vehicle_id: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub capacity: u32,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogStatus {
    Completed,
    Delayed,
    #[serde(other)]
    Other,
}

impl Display for LogStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Completed => "Completed",
            Self::Delayed => "Delayed",
            Self::Other => "Other",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryLog {
    pub log_id: String,
    pub route_id: String,
    pub vehicle_id: String,
    pub timestamp: String,
    pub status: LogStatus,
    pub carbon_emitted: f64,
    pub customer_rating: f64,
}

impl DeliveryLog {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }

    /// Human readable timestamp, falling back to the raw backend value.
    pub fn display_timestamp(&self) -> String {
        self.parsed_timestamp()
            .map(|ts| ts.format("%b %d, %Y %H:%M").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceAnswer {
    #[serde(default)]
    pub question: Option<String>,
    pub answer: String,
    #[serde(default, alias = "audio", alias = "audio_reference")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogExplanation {
    pub explanation: String,
}
