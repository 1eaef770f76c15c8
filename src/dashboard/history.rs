use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::BackendError;
use crate::config::HistoryConfig;
use crate::dashboard::generation::{RequestGeneration, Ticket};
use crate::map::geo::LatLng;
use crate::map::overlay::OverlayScene;
use crate::types::{DeliveryLog, LogStatus};

pub const ANALYSIS_UNAVAILABLE: &str = "Analysis unavailable";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExplanationState {
    #[default]
    Idle,
    Loading { log_id: String },
    Ready { log_id: String, text: String },
    Unavailable { log_id: String },
}

impl ExplanationState {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ready { text, .. } => Some(text),
            Self::Unavailable { .. } => Some(ANALYSIS_UNAVAILABLE),
            Self::Idle | Self::Loading { .. } => None,
        }
    }
}

/// Route geometry for past deliveries, keyed by route id.
#[derive(Debug, Clone, Default)]
pub struct RouteGeometry {
    routes: BTreeMap<String, Vec<LatLng>>,
}

impl RouteGeometry {
    pub fn new(routes: BTreeMap<String, Vec<LatLng>>) -> Self {
        Self { routes }
    }

    pub fn lookup(&self, route_id: &str) -> Option<&[LatLng]> {
        self.routes.get(route_id).map(Vec::as_slice)
    }
}

impl From<&HistoryConfig> for RouteGeometry {
    fn from(value: &HistoryConfig) -> Self {
        Self::new(value.geometry.clone())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistorySummary {
    pub total: usize,
    pub completed: usize,
    pub delayed: usize,
    pub carbon_emitted: f64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Default)]
pub struct HistoryView {
    logs: Vec<DeliveryLog>,
    selected: Option<String>,
    explanation: ExplanationState,
    generation: RequestGeneration,
    geometry: RouteGeometry,
}

impl HistoryView {
    pub fn new(geometry: RouteGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn replace_logs(&mut self, logs: Vec<DeliveryLog>) {
        self.logs = logs;
    }

    pub fn logs(&self) -> &[DeliveryLog] {
        &self.logs
    }

    pub fn selected_log(&self) -> Option<&DeliveryLog> {
        let selected = self.selected.as_deref()?;
        self.logs.iter().find(|log| log.log_id == selected)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn explanation(&self) -> &ExplanationState {
        &self.explanation
    }

    /// Selects a log and returns the ticket its explanation fetch must carry.
    /// Any earlier fetch becomes stale.
    pub fn select(&mut self, log_id: &str) -> Ticket {
        self.selected = Some(log_id.to_string());
        self.explanation = ExplanationState::Loading {
            log_id: log_id.to_string(),
        };
        self.generation.issue()
    }

    /// Applies an explanation result if it belongs to the latest selection.
    pub fn apply_explanation(
        &mut self,
        ticket: Ticket,
        log_id: &str,
        result: Result<String, BackendError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        let log_id = log_id.to_string();
        self.explanation = match result {
            Ok(text) => ExplanationState::Ready { log_id, text },
            Err(_) => ExplanationState::Unavailable { log_id },
        };
        true
    }

    pub fn clear_selection(&mut self) {
        self.generation.invalidate();
        self.selected = None;
        self.explanation = ExplanationState::Idle;
    }

    /// Overlay for the selected log, or an empty scene when its route has no geometry.
    pub fn scene(&self) -> OverlayScene {
        let Some(log) = self.selected_log() else {
            return OverlayScene::default();
        };
        match self.geometry.lookup(&log.route_id) {
            Some(route) => OverlayScene::historical(route.to_vec(), Some(log.clone())),
            None => OverlayScene::default(),
        }
    }

    pub fn summary(&self) -> HistorySummary {
        let completed = self
            .logs
            .iter()
            .filter(|log| log.status == LogStatus::Completed)
            .count();
        let delayed = self
            .logs
            .iter()
            .filter(|log| log.status == LogStatus::Delayed)
            .count();
        let average_rating = if self.logs.is_empty() {
            None
        } else {
            Some(self.logs.iter().map(|log| log.customer_rating).sum::<f64>() / self.logs.len() as f64)
        };
        HistorySummary {
            total: self.logs.len(),
            completed,
            delayed,
            carbon_emitted: self.logs.iter().map(|log| log.carbon_emitted).sum(),
            average_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reqwest::StatusCode;

    use crate::backend::BackendError;
    use crate::dashboard::history::{
        ExplanationState, HistoryView, RouteGeometry, ANALYSIS_UNAVAILABLE,
    };
    use crate::map::geo::LatLng;
    use crate::test_utils::sample_log;
    use crate::types::LogStatus;

    fn view() -> HistoryView {
        let mut routes = BTreeMap::new();
        routes.insert(
            "R-101".to_string(),
            vec![LatLng::new(40.71, -74.0), LatLng::new(40.73, -74.1)],
        );
        let mut view = HistoryView::new(RouteGeometry::new(routes));
        view.replace_logs(vec![
            sample_log("L-1", "R-101", LogStatus::Completed),
            sample_log("L-2", "R-999", LogStatus::Delayed),
        ]);
        view
    }

    #[test]
    fn stale_explanation_is_ignored() {
        let mut view = view();
        let first = view.select("L-1");
        let second = view.select("L-2");

        assert!(view.apply_explanation(second, "L-2", Ok("second".to_string())));
        assert!(!view.apply_explanation(first, "L-1", Ok("first".to_string())));
        assert_eq!(
            view.explanation(),
            &ExplanationState::Ready {
                log_id: "L-2".to_string(),
                text: "second".to_string()
            }
        );
    }

    #[test]
    fn failed_explanation_shows_fallback() {
        let mut view = view();
        let ticket = view.select("L-1");
        let err = BackendError::Status {
            operation: "explain",
            status: StatusCode::BAD_GATEWAY,
            preview: String::new(),
        };
        assert!(view.apply_explanation(ticket, "L-1", Err(err)));
        assert_eq!(view.explanation().text(), Some(ANALYSIS_UNAVAILABLE));
    }

    #[test]
    fn cleared_selection_drops_pending_result() {
        let mut view = view();
        assert_eq!(view.explanation(), &ExplanationState::Idle);
        let ticket = view.select("L-1");
        view.clear_selection();
        assert!(!view.apply_explanation(ticket, "L-1", Ok("late".to_string())));
        assert_eq!(view.explanation(), &ExplanationState::Idle);
    }

    #[test]
    fn scene_uses_configured_geometry() {
        let mut view = view();
        view.select("L-1");
        let scene = view.scene();
        assert!(scene.has_historical_route());
        assert_eq!(scene.historical_log.map(|l| l.log_id), Some("L-1".to_string()));

        view.select("L-2");
        assert!(!view.scene().has_historical_route());
    }

    #[test]
    fn summarizes_logs() {
        let summary = view().summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.delayed, 1);
        assert_eq!(summary.carbon_emitted, 25.0);
        assert_eq!(summary.average_rating, Some(4.0));
    }
}
