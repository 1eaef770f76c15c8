//! Application shell: tab state, user actions and the notices they raise.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::{BackendError, DashboardBackend};
use crate::config::{Config, PollingConfig};
use crate::dashboard::fleet::{FleetView, VehicleForm};
use crate::dashboard::history::{ExplanationState, HistoryView, RouteGeometry};
use crate::dashboard::indicator::LiveStatus;
use crate::dashboard::optimization::OptimizationView;
use crate::dashboard::poller::{PollerHandle, StatusPoller};
use crate::map::overlay::OverlayScene;
use crate::types::{OptimizationResult, VoiceAnswer};

pub const VOICE_FALLBACK: &str = "Failed to process";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Dashboard,
    Fleet,
    History,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dashboard => "dashboard",
            Self::Fleet => "fleet",
            Self::History => "history",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Interrupts the user until acknowledged.
    Blocking,
    /// Shown in place of the content that failed to load.
    Inline,
}

/// A failed user action, ready to show.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Blocking,
            message: message.into(),
        }
    }

    pub fn inline(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Inline,
            message: message.into(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cheap to clone; clones share the same views and indicator.
#[derive(Clone)]
pub struct Shell {
    backend: Arc<dyn DashboardBackend>,
    status: LiveStatus,
    polling: PollingConfig,
    tab: Arc<Mutex<Tab>>,
    optimization: Arc<Mutex<OptimizationView>>,
    fleet: Arc<Mutex<FleetView>>,
    history: Arc<Mutex<HistoryView>>,
}

impl Shell {
    pub fn new(backend: Arc<dyn DashboardBackend>, config: &Config) -> Self {
        Self {
            backend,
            status: LiveStatus::new(),
            polling: config.polling.clone(),
            tab: Arc::new(Mutex::new(Tab::default())),
            optimization: Arc::new(Mutex::new(OptimizationView::default())),
            fleet: Arc::new(Mutex::new(FleetView::default())),
            history: Arc::new(Mutex::new(HistoryView::new(RouteGeometry::from(
                &config.history,
            )))),
        }
    }

    pub fn status(&self) -> &LiveStatus {
        &self.status
    }

    pub fn start_polling(&self) -> PollerHandle {
        StatusPoller::new(self.backend.clone(), self.status.clone(), &self.polling).start()
    }

    pub fn active_tab(&self) -> Tab {
        *lock(&self.tab)
    }

    /// Fleet and history load on demand. The fetch is detached from the tab:
    /// switching away again leaves it running and its result still lands.
    pub fn switch_tab(&self, tab: Tab) -> Option<JoinHandle<Result<(), Notice>>> {
        *lock(&self.tab) = tab;
        debug!(%tab, "switched tab");
        let shell = self.clone();
        match tab {
            Tab::Dashboard => None,
            Tab::Fleet => Some(tokio::spawn(async move { shell.refresh_fleet().await })),
            Tab::History => Some(tokio::spawn(async move { shell.refresh_history().await })),
        }
    }

    fn record<T>(&self, action: &str, result: &Result<T, BackendError>) {
        match result {
            Ok(_) => self.status.indicator.set_online(true),
            Err(err) => {
                warn!("{action} failed: {err}");
                self.status.indicator.set_online(false);
            }
        }
    }

    pub async fn optimize(&self) -> Result<OptimizationResult, Notice> {
        let result = self.backend.optimize().await;
        self.record("optimization", &result);
        let result = result.map_err(|err| Notice::blocking(format!("Optimization failed: {err}")))?;
        lock(&self.optimization).apply(result.clone());
        Ok(result)
    }

    pub async fn refresh_fleet(&self) -> Result<(), Notice> {
        let result = self.backend.fleet().await;
        self.record("fleet fetch", &result);
        let vehicles = result.map_err(|_| Notice::inline("Fleet unavailable"))?;
        lock(&self.fleet).replace(vehicles);
        Ok(())
    }

    /// Submits the form, then refetches the roster so the new vehicle shows up.
    pub async fn add_vehicle(&self, form: &VehicleForm) -> Result<(), Notice> {
        let vehicle = form.submit().map_err(|err| Notice::blocking(err.to_string()))?;
        let result = self.backend.add_vehicle(&vehicle).await;
        self.record("add vehicle", &result);
        result.map_err(|err| Notice::blocking(format!("Failed to add vehicle: {err}")))?;
        self.refresh_fleet().await
    }

    pub async fn refresh_history(&self) -> Result<(), Notice> {
        let result = self.backend.history().await;
        self.record("history fetch", &result);
        let logs = result.map_err(|_| Notice::inline("History unavailable"))?;
        lock(&self.history).replace_logs(logs);
        Ok(())
    }

    /// Selects a log and fetches its explanation. A later selection wins even
    /// when this fetch completes after it.
    pub async fn select_log(&self, log_id: &str) -> ExplanationState {
        let ticket = lock(&self.history).select(log_id);
        let result = self.backend.explain_log(log_id).await;
        self.record("log explanation", &result);
        let mut history = lock(&self.history);
        if !history.apply_explanation(ticket, log_id, result) {
            debug!(log_id, "discarding stale explanation");
        }
        history.explanation().clone()
    }

    pub fn clear_selection(&self) {
        lock(&self.history).clear_selection();
    }

    /// Blank questions are not sent.
    pub async fn ask(&self, question: &str) -> Result<Option<VoiceAnswer>, Notice> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        let result = self.backend.ask(question).await;
        self.record("voice query", &result);
        result
            .map(Some)
            .map_err(|_| Notice::inline(VOICE_FALLBACK))
    }

    /// Overlay inputs for the active tab. The fleet tab has no map.
    pub fn scene(&self) -> OverlayScene {
        match self.active_tab() {
            Tab::Dashboard => lock(&self.optimization).scene(),
            Tab::History => lock(&self.history).scene(),
            Tab::Fleet => OverlayScene::default(),
        }
    }

    pub fn with_optimization<R>(&self, f: impl FnOnce(&OptimizationView) -> R) -> R {
        f(&lock(&self.optimization))
    }

    pub fn with_fleet<R>(&self, f: impl FnOnce(&FleetView) -> R) -> R {
        f(&lock(&self.fleet))
    }

    pub fn with_history<R>(&self, f: impl FnOnce(&HistoryView) -> R) -> R {
        f(&lock(&self.history))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::Config;
    use crate::dashboard::fleet::VehicleForm;
    use crate::dashboard::history::ExplanationState;
    use crate::dashboard::shell::{NoticeLevel, Shell, Tab, VOICE_FALLBACK};
    use crate::map::geo::LatLng;
    use crate::test_utils::StubBackend;
    use crate::types::VehicleStatus;

    fn shell() -> (Arc<StubBackend>, Shell) {
        let backend = Arc::new(StubBackend::new());
        let mut config = Config::default();
        config.history.geometry = BTreeMap::from([(
            "R-101".to_string(),
            vec![LatLng::new(40.7128, -74.0060), LatLng::new(40.7357, -74.1724)],
        )]);
        let shell = Shell::new(backend.clone(), &config);
        (backend, shell)
    }

    #[tokio::test]
    async fn later_selection_wins_over_slow_earlier_one() {
        let (backend, shell) = shell();
        let gate = backend.hold_explanation("L-1");

        let first = tokio::spawn({
            let shell = shell.clone();
            async move { shell.select_log("L-1").await }
        });
        while backend.explain_calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let second = shell.select_log("L-2").await;
        assert_eq!(
            second,
            ExplanationState::Ready {
                log_id: "L-2".to_string(),
                text: "Analysis for L-2".to_string()
            }
        );

        gate.notify_one();
        first.await.expect("first selection task");
        shell.with_history(|history| {
            assert_eq!(history.selected_id(), Some("L-2"));
            assert_eq!(history.explanation().text(), Some("Analysis for L-2"));
        });
    }

    #[tokio::test]
    async fn tab_fetch_survives_switching_away() {
        let (_backend, shell) = shell();
        let pending = shell.switch_tab(Tab::Fleet).expect("fleet fetch");
        assert!(shell.switch_tab(Tab::Dashboard).is_none());
        pending.await.expect("join").expect("fleet fetch");
        assert_eq!(shell.active_tab(), Tab::Dashboard);
        shell.with_fleet(|fleet| assert!(fleet.find("V-100").is_some()));
    }

    #[tokio::test]
    async fn added_vehicle_appears_after_refetch() {
        let (_backend, shell) = shell();
        let form = VehicleForm {
            vehicle_id: "V-200".to_string(),
            vehicle_type: "Electric Van".to_string(),
            capacity: 50,
            status: VehicleStatus::Active,
        };
        shell.add_vehicle(&form).await.expect("add vehicle");
        shell.with_fleet(|fleet| {
            let added = fleet.find("V-200").expect("V-200 listed");
            assert_eq!(added.capacity, Some(50));
        });
        assert!(shell.status().indicator.is_online());
    }

    #[tokio::test]
    async fn incomplete_form_is_blocked_before_sending() {
        let (backend, shell) = shell();
        let notice = shell
            .add_vehicle(&VehicleForm::default())
            .await
            .expect_err("missing id");
        assert_eq!(notice.level, NoticeLevel::Blocking);
        assert_eq!(backend.vehicles.lock().expect("vehicles").len(), 1);
    }

    #[tokio::test]
    async fn failed_optimization_raises_blocking_notice() {
        let (backend, shell) = shell();
        shell.status().indicator.set_online(true);
        backend.set_online(false);
        let notice = shell.optimize().await.expect_err("offline");
        assert_eq!(notice.level, NoticeLevel::Blocking);
        assert!(!shell.status().indicator.is_online());
        shell.with_optimization(|view| assert!(view.result().is_none()));
    }

    #[tokio::test]
    async fn voice_query_fallback_and_blank_questions() {
        let (backend, shell) = shell();
        assert_eq!(shell.ask("   ").await, Ok(None));
        assert_eq!(backend.voice_calls.load(Ordering::SeqCst), 0);

        let answer = shell
            .ask("Where is V-100?")
            .await
            .expect("answer")
            .expect("non-empty question");
        assert_eq!(answer.answer, "You asked: Where is V-100?");

        backend.set_online(false);
        let notice = shell.ask("Where is V-100?").await.expect_err("offline");
        assert_eq!(notice.level, NoticeLevel::Inline);
        assert_eq!(notice.message, VOICE_FALLBACK);
    }

    #[tokio::test]
    async fn scene_follows_active_tab() {
        let (_backend, shell) = shell();
        shell.optimize().await.expect("optimize");
        assert!(shell.scene().recommended.is_some());

        shell
            .switch_tab(Tab::History)
            .expect("history fetch")
            .await
            .expect("join")
            .expect("history");
        assert!(!shell.scene().has_historical_route());
        shell.select_log("L-1").await;
        let scene = shell.scene();
        assert!(scene.has_historical_route());
        assert!(scene.recommended.is_none());

        shell.switch_tab(Tab::Fleet);
        assert_eq!(shell.scene(), crate::map::overlay::OverlayScene::default());
    }
}
