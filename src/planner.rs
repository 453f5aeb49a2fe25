use std::collections::HashMap;

use crate::catalog::{VehicleCatalog, VehicleSelection, VehicleTypeSpec};
use crate::error::PlanError;
use crate::grouping::order_loads;
use crate::scoring::rank_vehicle_types;
use crate::types::Load;
use crate::vehicle::Vehicle;

/// Vehicles actually used, plus every load that found no place.
#[derive(Debug, Clone)]
pub struct PlanningResult {
    pub vehicles: Vec<Vehicle>,
    pub unplaced: Vec<Load>,
}

impl PlanningResult {
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn placed_count(&self) -> usize {
        self.vehicles.iter().map(Vehicle::placement_count).sum()
    }

    pub fn unplaced_ids(&self) -> Vec<&str> {
        self.unplaced.iter().map(|l| l.id.as_str()).collect()
    }
}

/// Greedy single-pass planner. Each `plan` call works on fresh vehicles,
/// so one `Planner` can serve any number of runs.
pub struct Planner {
    types: Vec<VehicleTypeSpec>,
}

impl Planner {
    pub fn new(catalog: &VehicleCatalog, selection: &VehicleSelection) -> Result<Self, PlanError> {
        Ok(Self {
            types: catalog.resolve(selection)?,
        })
    }

    pub fn plan(&self, loads: &[Load]) -> Result<PlanningResult, PlanError> {
        validate_loads(loads)?;

        let mut vehicles: Vec<Vehicle> = Vec::new();
        let mut counters: HashMap<&str, usize> = HashMap::new();
        let mut unplaced = Vec::new();

        for load in order_loads(loads) {
            if !self.place(load, &mut vehicles, &mut counters) {
                tracing::warn!(
                    load = %load.id,
                    dims = %load.dims,
                    kg = load.weight,
                    "load left unplaced"
                );
                unplaced.push(load.clone());
            }
        }

        let vehicles = remove_empty_vehicles(vehicles);

        tracing::info!(
            loads = loads.len(),
            vehicles = vehicles.len(),
            unplaced = unplaced.len(),
            "planning finished"
        );

        Ok(PlanningResult { vehicles, unplaced })
    }

    /// Tries the ranked archetypes in turn: existing vehicles first, then a
    /// new one. Returns whether the load was placed.
    fn place<'a>(
        &'a self,
        load: &Load,
        vehicles: &mut Vec<Vehicle>,
        counters: &mut HashMap<&'a str, usize>,
    ) -> bool {
        for spec in rank_vehicle_types(load, &self.types) {
            let existing = vehicles
                .iter_mut()
                .filter(|v| v.type_name == spec.name)
                .find_map(|v| v.try_put(load).map(|p| (v.label.clone(), p)));
            if let Some((label, p)) = existing {
                tracing::debug!(
                    load = %load.id,
                    vehicle = %label,
                    x = p.x,
                    y = p.y,
                    z = p.z,
                    "placed"
                );
                return true;
            }

            if !load.fits_in(&spec.interior()) {
                continue;
            }

            let counter = counters.entry(spec.name.as_str()).or_insert(0);
            *counter += 1;
            let mut vehicle = Vehicle::new(format!("{} #{}", spec.name, counter), spec);

            match vehicle.try_put(load) {
                Some(p) => {
                    tracing::debug!(
                        load = %load.id,
                        vehicle = %vehicle.label,
                        x = p.x,
                        y = p.y,
                        z = p.z,
                        "placed in new vehicle"
                    );
                    vehicles.push(vehicle);
                    return true;
                }
                None => {
                    tracing::debug!(
                        load = %load.id,
                        vehicle_type = %spec.name,
                        "does not fit an empty vehicle"
                    );
                }
            }
        }

        false
    }
}

/// Plans `loads` on the archetypes `selection` picks from `catalog`.
pub fn plan(
    loads: &[Load],
    selection: &VehicleSelection,
    catalog: &VehicleCatalog,
) -> Result<PlanningResult, PlanError> {
    Planner::new(catalog, selection)?.plan(loads)
}

fn validate_loads(loads: &[Load]) -> Result<(), PlanError> {
    if loads.is_empty() {
        return Err(PlanError::NoLoads);
    }

    for load in loads {
        let invalid = |reason: &str| PlanError::InvalidLoad {
            id: load.id.clone(),
            reason: reason.to_string(),
        };
        if load.dims.length == 0 || load.dims.width == 0 || load.dims.height == 0 {
            return Err(invalid("dimensions must be positive"));
        }
        if load.dims.checked_volume().is_none() {
            return Err(invalid("dimensions are too large"));
        }
        if !load.weight.is_finite() || load.weight <= 0.0 {
            return Err(invalid("weight must be positive"));
        }
        if !(1..=5).contains(&load.priority) {
            return Err(invalid("priority must be between 1 and 5"));
        }
    }

    Ok(())
}

/// Drops vehicles that ended up empty and renumbers the rest per type.
fn remove_empty_vehicles(vehicles: Vec<Vehicle>) -> Vec<Vehicle> {
    let mut counters: HashMap<String, usize> = HashMap::new();

    vehicles
        .into_iter()
        .filter(|v| !v.is_empty())
        .map(|mut v| {
            let counter = counters.entry(v.type_name.clone()).or_insert(0);
            *counter += 1;
            v.label = format!("{} #{}", v.type_name, counter);
            v
        })
        .collect()
}
