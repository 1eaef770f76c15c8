use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{BackendError, DashboardBackend, Explainer, Optimizer};
use crate::config::BackendConfig;
use crate::types::{
    DeliveryLog, LogExplanation, NewVehicle, OptimizationResult, SimulationStatus, Vehicle,
    VoiceAnswer,
};

const BODY_PREVIEW_CHARS: usize = 180;
pub const CACHE_BUST_PARAM: &str = "_t";

/// REST client for the route optimization backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET with a timestamp parameter so intermediaries never serve stale data.
    fn volatile_get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.endpoint(path))
            .query(&[(CACHE_BUST_PARAM, Utc::now().timestamp_millis().to_string())])
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<String, BackendError> {
        debug!(operation, "backend request");
        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport { operation, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport { operation, source })?;
        if !status.is_success() {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            return Err(BackendError::Status {
                operation,
                status,
                preview,
            });
        }
        Ok(body)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(operation, request).await?;
        serde_json::from_str(&body).map_err(|source| BackendError::Decode { operation, source })
    }
}

#[async_trait]
impl Optimizer for BackendClient {
    async fn optimize(&self) -> Result<OptimizationResult, BackendError> {
        self.fetch_json("optimize", self.volatile_get("/optimize"))
            .await
    }
}

#[async_trait]
impl Explainer for BackendClient {
    async fn explain_log(&self, log_id: &str) -> Result<String, BackendError> {
        let request = self
            .volatile_get("/history/explain")
            .query(&[("log_id", log_id)]);
        let explanation: LogExplanation = self.fetch_json("explain", request).await?;
        Ok(explanation.explanation)
    }
}

#[async_trait]
impl DashboardBackend for BackendClient {
    async fn health(&self) -> bool {
        match self.send("health", self.volatile_get("/")).await {
            Ok(_) => true,
            Err(err) => {
                debug!("backend unreachable: {err}");
                false
            }
        }
    }

    async fn simulation_status(&self) -> Result<SimulationStatus, BackendError> {
        self.fetch_json("simulation status", self.volatile_get("/simulation/status"))
            .await
    }

    async fn fleet(&self) -> Result<Vec<Vehicle>, BackendError> {
        self.fetch_json("fleet", self.volatile_get("/fleet")).await
    }

    async fn add_vehicle(&self, vehicle: &NewVehicle) -> Result<(), BackendError> {
        let request = self.http.post(self.endpoint("/fleet/add")).json(vehicle);
        self.send("add vehicle", request).await?;
        Ok(())
    }

    async fn history(&self) -> Result<Vec<DeliveryLog>, BackendError> {
        self.fetch_json("history", self.volatile_get("/history"))
            .await
    }

    async fn ask(&self, question: &str) -> Result<VoiceAnswer, BackendError> {
        let request = self
            .http
            .get(self.endpoint("/voice"))
            .query(&[("question", question)]);
        self.fetch_json("voice", request).await
    }
}
