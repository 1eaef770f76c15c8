use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{NewVehicle, Vehicle, VehicleStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Add-vehicle form. Only presence is checked; the backend owns validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleForm {
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub capacity: u32,
    pub status: VehicleStatus,
}

impl Default for VehicleForm {
    fn default() -> Self {
        Self {
            vehicle_id: String::new(),
            vehicle_type: String::new(),
            capacity: 0,
            status: VehicleStatus::Active,
        }
    }
}

impl VehicleForm {
    pub fn submit(&self) -> Result<NewVehicle, FormError> {
        let vehicle_id = self.vehicle_id.trim();
        if vehicle_id.is_empty() {
            return Err(FormError::Missing("vehicle id"));
        }
        let vehicle_type = self.vehicle_type.trim();
        if vehicle_type.is_empty() {
            return Err(FormError::Missing("vehicle type"));
        }
        Ok(NewVehicle {
            vehicle_id: vehicle_id.to_string(),
            vehicle_type: vehicle_type.to_string(),
            capacity: self.capacity,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetView {
    vehicles: Vec<Vehicle>,
}

impl FleetView {
    pub fn replace(&mut self, vehicles: Vec<Vehicle>) {
        self.vehicles = vehicles;
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn find(&self, vehicle_id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.vehicle_id == vehicle_id)
    }

    pub fn status_counts(&self) -> BTreeMap<VehicleStatus, usize> {
        let mut counts = BTreeMap::new();
        for vehicle in &self.vehicles {
            *counts.entry(vehicle.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_capacity(&self) -> u64 {
        self.vehicles
            .iter()
            .filter_map(|v| v.capacity)
            .map(u64::from)
            .sum()
    }

    pub fn assigned_order_count(&self) -> usize {
        self.vehicles.iter().map(|v| v.assigned_orders.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::dashboard::fleet::{FleetView, FormError, VehicleForm};
    use crate::test_utils::sample_vehicle;
    use crate::types::VehicleStatus;

    #[test]
    fn form_requires_id_and_type() {
        let mut form = VehicleForm::default();
        assert_eq!(form.submit(), Err(FormError::Missing("vehicle id")));
        form.vehicle_id = " V-200 ".to_string();
        assert_eq!(form.submit(), Err(FormError::Missing("vehicle type")));
        form.vehicle_type = "Electric Van".to_string();
        form.capacity = 50;
        let vehicle = form.submit().expect("valid form");
        assert_eq!(vehicle.vehicle_id, "V-200");
        assert_eq!(vehicle.status, VehicleStatus::Active);
    }

    #[test]
    fn aggregates_roster() {
        let mut view = FleetView::default();
        view.replace(vec![
            sample_vehicle("V-1", VehicleStatus::Active),
            sample_vehicle("V-2", VehicleStatus::Repair),
            sample_vehicle("V-3", VehicleStatus::Active),
        ]);
        let counts = view.status_counts();
        assert_eq!(counts.get(&VehicleStatus::Active), Some(&2));
        assert_eq!(counts.get(&VehicleStatus::Repair), Some(&1));
        assert_eq!(view.total_capacity(), 150);
        assert_eq!(view.assigned_order_count(), 3);
        assert!(view.find("V-2").is_some());
    }
}
