pub mod client;
pub mod error;

use async_trait::async_trait;

pub use self::client::BackendClient;
pub use self::error::BackendError;

use crate::types::{
    DeliveryLog, NewVehicle, OptimizationResult, SimulationStatus, Vehicle, VoiceAnswer,
};

/// Produces ranked route options. Scoring and prediction live behind this seam.
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn optimize(&self) -> Result<OptimizationResult, BackendError>;
}

/// Produces a free-text analysis of a past delivery.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain_log(&self, log_id: &str) -> Result<String, BackendError>;
}

#[async_trait]
pub trait DashboardBackend: Optimizer + Explainer {
    /// Never fails: any error reads as offline.
    async fn health(&self) -> bool;
    async fn simulation_status(&self) -> Result<SimulationStatus, BackendError>;
    async fn fleet(&self) -> Result<Vec<Vehicle>, BackendError>;
    async fn add_vehicle(&self, vehicle: &NewVehicle) -> Result<(), BackendError>;
    async fn history(&self) -> Result<Vec<DeliveryLog>, BackendError>;
    async fn ask(&self, question: &str) -> Result<VoiceAnswer, BackendError>;
}
