use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::backend::{BackendError, DashboardBackend, Explainer, Optimizer};
use crate::map::geo::LatLng;
use crate::types::{
    DeliveryLog, LogStatus, NewVehicle, OptimizationResult, RouteAction, RouteOption,
    SimulationStatus, Vehicle, VehicleStatus, VoiceAnswer,
};

/// In-memory backend whose reachability and response timing tests control.
pub struct StubBackend {
    pub online: AtomicBool,
    pub vehicles: Mutex<Vec<Vehicle>>,
    pub logs: Mutex<Vec<DeliveryLog>>,
    pub health_calls: AtomicUsize,
    pub simulation_calls: AtomicUsize,
    pub explain_calls: AtomicUsize,
    pub voice_calls: AtomicUsize,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            vehicles: Mutex::new(vec![sample_vehicle("V-100", VehicleStatus::Active)]),
            logs: Mutex::new(vec![
                sample_log("L-1", "R-101", LogStatus::Completed),
                sample_log("L-2", "R-102", LogStatus::Delayed),
            ]),
            health_calls: AtomicUsize::new(0),
            simulation_calls: AtomicUsize::new(0),
            explain_calls: AtomicUsize::new(0),
            voice_calls: AtomicUsize::new(0),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Holds the explanation for `log_id` until the returned handle is notified.
    pub fn hold_explanation(&self, log_id: &str) -> Arc<Notify> {
        self.hold(&format!("explain:{log_id}"))
    }

    /// Holds every health check until the returned handle is notified, one call per permit.
    pub fn hold_health(&self) -> Arc<Notify> {
        self.hold("health")
    }

    pub fn hold_simulation(&self) -> Arc<Notify> {
        self.hold("simulation")
    }

    fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .expect("gates")
            .insert(key.to_string(), gate.clone());
        gate
    }

    async fn pass_gate(&self, key: &str) {
        let gate = self.gates.lock().expect("gates").get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn check(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Status {
                operation,
                status: StatusCode::SERVICE_UNAVAILABLE,
                preview: "stub offline".to_string(),
            })
        }
    }
}

#[async_trait]
impl Optimizer for StubBackend {
    async fn optimize(&self) -> Result<OptimizationResult, BackendError> {
        self.check("optimize")?;
        Ok(sample_optimization())
    }
}

#[async_trait]
impl Explainer for StubBackend {
    async fn explain_log(&self, log_id: &str) -> Result<String, BackendError> {
        self.explain_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(&format!("explain:{log_id}")).await;
        self.check("explain")?;
        Ok(format!("Analysis for {log_id}"))
    }
}

#[async_trait]
impl DashboardBackend for StubBackend {
    async fn health(&self) -> bool {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate("health").await;
        self.online.load(Ordering::SeqCst)
    }

    async fn simulation_status(&self) -> Result<SimulationStatus, BackendError> {
        self.simulation_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate("simulation").await;
        self.check("simulation status")?;
        Ok(SimulationStatus {
            traffic_level: "Moderate".to_string(),
            traffic_factor: 5.0,
            weather_condition: "Rain".to_string(),
            weather_risk: 0.6,
        })
    }

    async fn fleet(&self) -> Result<Vec<Vehicle>, BackendError> {
        self.check("fleet")?;
        Ok(self.vehicles.lock().expect("vehicles").clone())
    }

    async fn add_vehicle(&self, vehicle: &NewVehicle) -> Result<(), BackendError> {
        self.check("add vehicle")?;
        self.vehicles.lock().expect("vehicles").push(Vehicle {
            vehicle_id: vehicle.vehicle_id.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
            capacity: Some(vehicle.capacity),
            status: vehicle.status,
            assigned_orders: Vec::new(),
        });
        Ok(())
    }

    async fn history(&self) -> Result<Vec<DeliveryLog>, BackendError> {
        self.check("history")?;
        Ok(self.logs.lock().expect("logs").clone())
    }

    async fn ask(&self, question: &str) -> Result<VoiceAnswer, BackendError> {
        self.voice_calls.fetch_add(1, Ordering::SeqCst);
        self.check("voice")?;
        Ok(VoiceAnswer {
            question: Some(question.to_string()),
            answer: format!("You asked: {question}"),
            audio_url: None,
        })
    }
}

pub fn sample_vehicle(id: &str, status: VehicleStatus) -> Vehicle {
    Vehicle {
        vehicle_id: id.to_string(),
        vehicle_type: "Electric Van".to_string(),
        capacity: Some(50),
        status,
        assigned_orders: vec!["ORD-991".to_string()],
    }
}

pub fn sample_log(id: &str, route_id: &str, status: LogStatus) -> DeliveryLog {
    DeliveryLog {
        log_id: id.to_string(),
        route_id: route_id.to_string(),
        vehicle_id: "V-100".to_string(),
        timestamp: "2024-05-10 08:30:00".to_string(),
        status,
        carbon_emitted: 12.5,
        customer_rating: 4.0,
    }
}

pub fn sample_optimization() -> OptimizationResult {
    let start = LatLng::new(40.7128, -74.0060);
    let end = LatLng::new(40.7357, -74.1724);
    OptimizationResult {
        recommended_route: RouteOption::new("A", "I-78 Express")
            .with_eta(27.5)
            .with_coordinates(vec![
                start,
                LatLng::new(40.72, -74.05),
                LatLng::new(40.73, -74.10),
                end,
            ]),
        alternatives: vec![RouteOption::new("B", "US-1 Truck Route")
            .with_eta(41.0)
            .with_coordinates(vec![
                start,
                LatLng::new(40.75, -74.02),
                LatLng::new(40.78, -74.08),
                LatLng::new(40.74, -74.15),
                end,
            ])],
        action: RouteAction::Proceed,
        customer_message: "Your delivery is on schedule.".to_string(),
        carbon_saved: 3.4,
        ai_explanation: "Lower emissions under current traffic.".to_string(),
        timestamp: "Now".to_string(),
    }
}
