use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::types::SimulationStatus;

/// Last known reachability of the backend. Any writer may flip it; the last write wins.
#[derive(Debug, Clone)]
pub struct ConnectionIndicator {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectionIndicator {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            info!(online, "backend connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectionIndicator {
    fn default() -> Self {
        Self::new(false)
    }
}

/// State written by the background pollers and read by the views.
#[derive(Debug, Clone)]
pub struct LiveStatus {
    pub indicator: ConnectionIndicator,
    simulation: Arc<watch::Sender<Option<SimulationStatus>>>,
}

impl LiveStatus {
    pub fn new() -> Self {
        let (simulation, _rx) = watch::channel(None);
        Self {
            indicator: ConnectionIndicator::default(),
            simulation: Arc::new(simulation),
        }
    }

    pub fn set_simulation(&self, status: SimulationStatus) {
        self.simulation.send_replace(Some(status));
    }

    pub fn simulation(&self) -> Option<SimulationStatus> {
        self.simulation.borrow().clone()
    }

    pub fn subscribe_simulation(&self) -> watch::Receiver<Option<SimulationStatus>> {
        self.simulation.subscribe()
    }
}

impl Default for LiveStatus {
    fn default() -> Self {
        Self::new()
    }
}
