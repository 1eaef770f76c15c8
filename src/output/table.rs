use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::dashboard::fleet::FleetView;
use crate::dashboard::history::HistorySummary;
use crate::map::recording::{DrawnElement, SurfaceSnapshot, Viewport};
use crate::types::{DeliveryLog, LogStatus, OptimizationResult, SimulationStatus, VehicleStatus};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_routes_table(result: &OptimizationResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Route",
        "Name",
        "Distance (km)",
        "ETA (min)",
        "Traffic",
        "Weather Risk",
        "Emissions (kg)",
        "Delay Prob.",
        "Score",
    ]);
    let recommended = &result.recommended_route;
    let rows = std::iter::once((recommended, true))
        .chain(result.alternatives.iter().map(|route| (route, false)));
    for (route, is_recommended) in rows {
        let name = if is_recommended {
            Cell::new(format!("{} *", route.name)).fg(Color::Green)
        } else {
            Cell::new(&route.name)
        };
        table.add_row(Row::from(vec![
            Cell::new(&route.id),
            name,
            Cell::new(format!("{:.1}", route.distance_km)),
            Cell::new(format!("{:.0}", route.eta_mins)),
            Cell::new(format!("{:.2}", route.traffic_factor)),
            Cell::new(format!("{:.2}", route.weather_risk)),
            Cell::new(format!("{:.2}", route.emissions)),
            Cell::new(format!("{:.0}%", route.delay_probability * 100.0)),
            Cell::new(format!("{:.3}", route.score)),
        ]));
    }
    let advisory = if result.requires_reroute() {
        " (reroute advised)"
    } else {
        ""
    };
    let mut out = table.to_string();
    out.push_str(&format!(
        "\nAction: {}{advisory}\nCarbon saved: {:.2} kg\nCustomer message: {}\nAnalysis: {}",
        result.action, result.carbon_saved, result.customer_message, result.ai_explanation
    ));
    out
}

pub fn render_simulation_table(online: bool, simulation: Option<&SimulationStatus>) -> String {
    let mut table = new_table();
    table.set_header(vec!["Backend", "Traffic", "Traffic Factor", "Weather", "Weather Risk"]);
    let backend = if online {
        Cell::new("ONLINE").fg(Color::Green)
    } else {
        Cell::new("OFFLINE").fg(Color::Red)
    };
    let mut row = vec![backend];
    match simulation {
        Some(sim) => row.extend([
            Cell::new(&sim.traffic_level),
            Cell::new(format!("{:.1}", sim.traffic_factor)),
            Cell::new(&sim.weather_condition),
            Cell::new(format!("{:.2}", sim.weather_risk)),
        ]),
        None => row.extend((0..4).map(|_| Cell::new("-"))),
    }
    table.add_row(Row::from(row));
    table.to_string()
}

pub fn render_fleet_table(fleet: &FleetView) -> String {
    let mut table = new_table();
    table.set_header(vec!["Vehicle", "Type", "Capacity", "Status", "Assigned Orders"]);
    for vehicle in fleet.vehicles() {
        let status = match vehicle.status {
            VehicleStatus::Active => Cell::new(vehicle.status).fg(Color::Green),
            VehicleStatus::Maintenance | VehicleStatus::Repair => {
                Cell::new(vehicle.status).fg(Color::Red)
            }
            _ => Cell::new(vehicle.status),
        };
        let orders = if vehicle.assigned_orders.is_empty() {
            "-".to_string()
        } else {
            vehicle.assigned_orders.join(", ")
        };
        table.add_row(Row::from(vec![
            Cell::new(&vehicle.vehicle_id),
            Cell::new(&vehicle.vehicle_type),
            Cell::new(
                vehicle
                    .capacity
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            status,
            Cell::new(orders),
        ]));
    }
    let counts = fleet
        .status_counts()
        .iter()
        .map(|(status, count)| format!("{count} {status}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{table}\n{} vehicles ({counts}), total capacity {}, {} assigned orders",
        fleet.vehicles().len(),
        fleet.total_capacity(),
        fleet.assigned_order_count()
    )
}

pub fn render_history_table(logs: &[DeliveryLog], summary: &HistorySummary) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Log",
        "Route",
        "Vehicle",
        "Delivered",
        "Status",
        "Carbon (kg)",
        "Rating",
    ]);
    for log in logs {
        let status = match log.status {
            LogStatus::Completed => Cell::new(&log.status).fg(Color::Green),
            LogStatus::Delayed => Cell::new(&log.status).fg(Color::Yellow),
            LogStatus::Other => Cell::new(&log.status),
        };
        table.add_row(Row::from(vec![
            Cell::new(&log.log_id),
            Cell::new(&log.route_id),
            Cell::new(&log.vehicle_id),
            Cell::new(log.display_timestamp()),
            status,
            Cell::new(format!("{:.2}", log.carbon_emitted)),
            Cell::new(format!("{:.1}", log.customer_rating)),
        ]));
    }
    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} deliveries ({} completed, {} delayed), {:.2} kg CO2, average rating {}",
        summary.total,
        summary.completed,
        summary.delayed,
        summary.carbon_emitted,
        summary
            .average_rating
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "-".to_string())
    ));
    out
}

pub fn render_layers_table(snapshot: &SurfaceSnapshot) -> String {
    let mut table = new_table();
    table.set_header(vec!["Handle", "Kind", "Points", "Color", "Tooltip"]);
    for layer in &snapshot.layers {
        let (points, color) = match &layer.element {
            DrawnElement::Tiles { .. } => ("-".to_string(), "-".to_string()),
            DrawnElement::Polyline { path, style } => (path.len().to_string(), style.color.clone()),
            DrawnElement::CircleMarker { at, style } => {
                (format!("{:.4}, {:.4}", at.lat, at.lng), style.fill_color.clone())
            }
        };
        table.add_row(vec![
            layer.handle.to_string(),
            layer.element.kind().to_string(),
            points,
            color,
            layer
                .tooltip
                .as_ref()
                .map(|t| t.text.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    let viewport = match &snapshot.viewport {
        Viewport::Centered { center, zoom } => {
            format!("centered on {:.4}, {:.4} at zoom {zoom}", center.lat, center.lng)
        }
        Viewport::Fitted { bounds, padding_px } => format!(
            "fitted to [{:.4}, {:.4}] - [{:.4}, {:.4}] with {padding_px}px padding",
            bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
        ),
    };
    format!("{table}\nViewport ({}): {viewport}", snapshot.container)
}

#[cfg(test)]
mod tests {
    use crate::dashboard::fleet::FleetView;
    use crate::dashboard::history::HistoryView;
    use crate::map::overlay::{MapDefaults, OverlayManager};
    use crate::map::recording::{RecordingEngine, RecordingSurface};
    use crate::output::table::{
        render_fleet_table, render_history_table, render_layers_table, render_routes_table,
    };
    use crate::test_utils::{sample_log, sample_optimization, sample_vehicle};
    use crate::types::{LogStatus, RouteAction, VehicleStatus};

    #[test]
    fn routes_table_marks_recommended() {
        let out = render_routes_table(&sample_optimization());
        assert!(out.contains("I-78 Express *"));
        assert!(out.contains("US-1 Truck Route"));
        assert!(out.contains("Action: PROCEED\n"));

        let mut reroute = sample_optimization();
        reroute.action = RouteAction::Reroute;
        assert!(render_routes_table(&reroute).contains("Action: REROUTE (reroute advised)"));
    }

    #[test]
    fn fleet_and_history_tables_list_rows() {
        let mut roster = FleetView::default();
        roster.replace(vec![
            sample_vehicle("V-100", VehicleStatus::Active),
            sample_vehicle("V-101", VehicleStatus::Repair),
        ]);
        let fleet = render_fleet_table(&roster);
        assert!(fleet.contains("V-100"));
        assert!(fleet.contains("ORD-991"));
        assert!(fleet.contains("2 vehicles (1 Active, 1 Repair), total capacity 100, 2 assigned orders"));

        let mut view = HistoryView::default();
        view.replace_logs(vec![sample_log("L-1", "R-101", LogStatus::Completed)]);
        let history = render_history_table(view.logs(), &view.summary());
        assert!(history.contains("May 10, 2024 08:30"));
        assert!(history.contains("1 deliveries (1 completed, 0 delayed)"));
    }

    #[test]
    fn layers_table_describes_viewport() {
        let mut overlay: OverlayManager<RecordingSurface> = OverlayManager::new(MapDefaults::default());
        assert!(overlay.initialize(&RecordingEngine::new()));
        let snapshot = overlay.surface().expect("surface").snapshot();
        let out = render_layers_table(&snapshot);
        assert!(out.contains("tiles"));
        assert!(out.contains("centered on 40.7128, -74.0060 at zoom 11"));
    }
}
