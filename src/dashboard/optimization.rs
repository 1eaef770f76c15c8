use chrono::{DateTime, Utc};

use crate::map::overlay::OverlayScene;
use crate::types::OptimizationResult;

/// Latest optimization run. Each run replaces the previous one wholesale.
#[derive(Debug, Clone, Default)]
pub struct OptimizationView {
    result: Option<OptimizationResult>,
    received_at: Option<DateTime<Utc>>,
}

impl OptimizationView {
    pub fn apply(&mut self, result: OptimizationResult) {
        self.result = Some(result);
        self.received_at = Some(Utc::now());
    }

    pub fn result(&self) -> Option<&OptimizationResult> {
        self.result.as_ref()
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    pub fn scene(&self) -> OverlayScene {
        match &self.result {
            Some(result) => OverlayScene::live(
                Some(result.recommended_route.clone()),
                result.alternatives.clone(),
            ),
            None => OverlayScene::default(),
        }
    }

    pub fn headline(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        let route = &result.recommended_route;
        Some(format!(
            "{} ({:.1} km, {:.0} min) | action {} | {:.2} kg CO2 saved",
            route.name, route.distance_km, route.eta_mins, result.action, result.carbon_saved
        ))
    }
}
