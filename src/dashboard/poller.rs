//! Background status polling.
//!
//! Two independent loops poll backend health and the traffic/weather
//! simulation. Each tick runs its fetch as a separate task, so stopping the
//! loops never cancels a request that is already in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::backend::DashboardBackend;
use crate::config::PollingConfig;
use crate::dashboard::generation::RequestGeneration;
use crate::dashboard::indicator::LiveStatus;

pub struct StatusPoller {
    backend: Arc<dyn DashboardBackend>,
    status: LiveStatus,
    health_interval: Duration,
    simulation_interval: Duration,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn DashboardBackend>, status: LiveStatus, polling: &PollingConfig) -> Self {
        Self {
            backend,
            status,
            health_interval: polling.health_interval(),
            simulation_interval: polling.simulation_interval(),
        }
    }

    pub fn start(self) -> PollerHandle {
        let health = tokio::spawn(health_loop(
            self.backend.clone(),
            self.status.clone(),
            self.health_interval,
        ));
        let simulation = tokio::spawn(simulation_loop(
            self.backend,
            self.status,
            self.simulation_interval,
        ));
        PollerHandle {
            loops: vec![health, simulation],
        }
    }
}

/// Stops future polls when stopped or dropped.
#[derive(Debug)]
pub struct PollerHandle {
    loops: Vec<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        self.loops.iter().any(|handle| !handle.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        for handle in &self.loops {
            handle.abort();
        }
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn health_loop(backend: Arc<dyn DashboardBackend>, status: LiveStatus, period: Duration) {
    let generation = Arc::new(RequestGeneration::new());
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        let ticket = generation.issue();
        let (backend, status, generation) = (backend.clone(), status.clone(), generation.clone());
        tokio::spawn(async move {
            let online = backend.health().await;
            if generation.advance(ticket) {
                status.indicator.set_online(online);
            } else {
                debug!("discarding stale health result");
            }
        });
    }
}

async fn simulation_loop(backend: Arc<dyn DashboardBackend>, status: LiveStatus, period: Duration) {
    let generation = Arc::new(RequestGeneration::new());
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        let ticket = generation.issue();
        let (backend, status, generation) = (backend.clone(), status.clone(), generation.clone());
        tokio::spawn(async move {
            let result = backend.simulation_status().await;
            if !generation.advance(ticket) {
                debug!("discarding stale simulation status");
                return;
            }
            match result {
                Ok(simulation) => {
                    status.indicator.set_online(true);
                    status.set_simulation(simulation);
                }
                Err(err) => {
                    debug!("simulation status unavailable: {err}");
                    status.indicator.set_online(false);
                }
            }
        });
    }
}
