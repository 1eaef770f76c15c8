use anyhow::Result;

use crate::types::{DeliveryLog, OptimizationResult, Vehicle};

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn routes_to_csv(result: &OptimizationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "recommended",
        "distance_km",
        "eta_mins",
        "traffic_factor",
        "weather_risk",
        "emissions",
        "delay_probability",
        "score",
    ])?;
    let rows = std::iter::once((&result.recommended_route, true))
        .chain(result.alternatives.iter().map(|route| (route, false)));
    for (route, recommended) in rows {
        writer.write_record([
            route.id.clone(),
            route.name.clone(),
            recommended.to_string(),
            format!("{:.2}", route.distance_km),
            format!("{:.1}", route.eta_mins),
            format!("{:.3}", route.traffic_factor),
            format!("{:.3}", route.weather_risk),
            format!("{:.3}", route.emissions),
            format!("{:.3}", route.delay_probability),
            format!("{:.4}", route.score),
        ])?;
    }
    finish(writer)
}

pub fn fleet_to_csv(vehicles: &[Vehicle]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["vehicle_id", "type", "capacity", "status", "assigned_orders"])?;
    for vehicle in vehicles {
        writer.write_record([
            vehicle.vehicle_id.clone(),
            vehicle.vehicle_type.clone(),
            vehicle.capacity.map(|c| c.to_string()).unwrap_or_default(),
            vehicle.status.to_string(),
            vehicle.assigned_orders.join(";"),
        ])?;
    }
    finish(writer)
}

pub fn history_to_csv(logs: &[DeliveryLog]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "log_id",
        "route_id",
        "vehicle_id",
        "timestamp",
        "status",
        "carbon_emitted",
        "customer_rating",
    ])?;
    for log in logs {
        writer.write_record([
            log.log_id.clone(),
            log.route_id.clone(),
            log.vehicle_id.clone(),
            log.timestamp.clone(),
            log.status.to_string(),
            format!("{:.2}", log.carbon_emitted),
            format!("{:.1}", log.customer_rating),
        ])?;
    }
    finish(writer)
}
