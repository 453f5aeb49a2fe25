//! Serializable view of a [`PlanningResult`] for the CLI and the HTTP server.

use std::fmt::Write;

use serde::Serialize;

use crate::planner::PlanningResult;
use crate::render;
use crate::types::{Dims, MM3_PER_M3, Placement, Point3};
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_vehicles: usize,
    pub placed_loads: usize,
    pub unplaced_loads: usize,
    pub total_weight_used: f64,
    /// m³
    pub total_volume_used: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleReport {
    pub label: String,
    pub type_name: String,
    pub inner_length: u32,
    pub inner_width: u32,
    pub inner_height: u32,
    pub max_kg: f64,
    pub total_kg: f64,
    pub load_count: usize,
    /// Weight utilization, one decimal.
    pub utilization_percent: f64,
    pub volume_percent: f64,
    pub center_of_gravity: Point3,
    /// Bottom layer first, then front to back, then left to right.
    pub placements: Vec<Placement>,
}

impl VehicleReport {
    pub fn interior(&self) -> Dims {
        Dims::new(self.inner_length, self.inner_width, self.inner_height)
    }
}

impl From<&Vehicle> for VehicleReport {
    fn from(vehicle: &Vehicle) -> Self {
        let mut placements: Vec<Placement> = vehicle.placements().cloned().collect();
        placements.sort_by_key(|p| (p.z, p.y, p.x));

        Self {
            label: vehicle.label.clone(),
            type_name: vehicle.type_name.clone(),
            inner_length: vehicle.interior.length,
            inner_width: vehicle.interior.width,
            inner_height: vehicle.interior.height,
            max_kg: vehicle.max_kg,
            total_kg: vehicle.total_kg,
            load_count: vehicle.placement_count(),
            utilization_percent: round_to(vehicle.weight_utilization(), 1),
            volume_percent: round_to(vehicle.volume_utilization(), 1),
            center_of_gravity: vehicle.center_of_gravity,
            placements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub summary: Summary,
    pub vehicles: Vec<VehicleReport>,
    pub unplaced: Vec<String>,
}

impl From<&PlanningResult> for PlanReport {
    fn from(result: &PlanningResult) -> Self {
        let used_volume: u64 = result.vehicles.iter().map(Vehicle::used_volume).sum();

        Self {
            summary: Summary {
                total_vehicles: result.vehicle_count(),
                placed_loads: result.placed_count(),
                unplaced_loads: result.unplaced.len(),
                total_weight_used: result.vehicles.iter().map(|v| v.total_kg).sum(),
                total_volume_used: round_to(used_volume as f64 / MM3_PER_M3, 2),
            },
            vehicles: result.vehicles.iter().map(VehicleReport::from).collect(),
            unplaced: result.unplaced.iter().map(|l| l.id.clone()).collect(),
        }
    }
}

impl PlanReport {
    /// Plain-text listing; with `layout` every layer is drawn below its
    /// vehicle.
    pub fn to_text(&self, layout: bool) -> String {
        let mut out = String::new();

        for vehicle in &self.vehicles {
            let _ = writeln!(out, "{} ({} mm):", vehicle.label, vehicle.interior());
            for p in &vehicle.placements {
                let _ = writeln!(
                    out,
                    "  {} {} {} @ ({}, {}, {}) {} kg",
                    p.load_id, p.load_name, p.dims, p.x, p.y, p.z, p.kg
                );
            }
            let _ = writeln!(
                out,
                "  Weight: {} / {} kg ({:.1}%), volume {:.1}%",
                vehicle.total_kg,
                vehicle.max_kg,
                vehicle.utilization_percent,
                vehicle.volume_percent
            );
            if layout {
                out.push_str(&render::render_layers(vehicle.interior(), &vehicle.placements));
            }
            out.push('\n');
        }

        if !self.unplaced.is_empty() {
            let _ = writeln!(out, "Unplaced: {}", self.unplaced.join(", "));
        }

        let s = &self.summary;
        let _ = writeln!(
            out,
            "Summary: {} vehicle{}, {} load{} placed, {} unplaced, {} kg, {:.2} m³",
            s.total_vehicles,
            if s.total_vehicles == 1 { "" } else { "s" },
            s.placed_loads,
            if s.placed_loads == 1 { "" } else { "s" },
            s.unplaced_loads,
            s.total_weight_used,
            s.total_volume_used,
        );

        out
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{VehicleCatalog, VehicleSelection};
    use crate::planner::plan;
    use crate::types::Load;

    fn sample() -> PlanningResult {
        let loads = vec![
            Load::new("1", "pallet", Dims::new(1200, 800, 1000), 400.0, true),
            Load::new("2", "pallet", Dims::new(1200, 800, 1000), 400.0, true),
            Load::new("3", "crate", Dims::new(2000, 1000, 800), 600.0, true),
            Load::new("4", "giant", Dims::new(40000, 3000, 3000), 500.0, true),
        ];
        let selection = VehicleSelection {
            trailers: vec!["Standart Tır".to_string()],
            containers: Vec::new(),
        };
        plan(&loads, &selection, &VehicleCatalog::default()).unwrap()
    }

    #[test]
    fn test_summary() {
        let report = PlanReport::from(&sample());
        assert_eq!(report.summary.total_vehicles, 1);
        assert_eq!(report.summary.placed_loads, 3);
        assert_eq!(report.summary.unplaced_loads, 1);
        assert_eq!(report.summary.total_weight_used, 1400.0);
        // 2 × 0.96 m³ + 1.6 m³
        assert_eq!(report.summary.total_volume_used, 3.52);
        assert_eq!(report.unplaced, vec!["4"]);
    }

    #[test]
    fn test_vehicle_report() {
        let report = PlanReport::from(&sample());
        let vehicle = &report.vehicles[0];
        assert_eq!(vehicle.label, "Standart Tır #1");
        assert_eq!(vehicle.load_count, 3);
        // 1400 / 24000
        assert_eq!(vehicle.utilization_percent, 5.8);
        assert_eq!(vehicle.interior(), Dims::new(13600, 2450, 2700));
    }

    #[test]
    fn test_placements_sorted_bottom_up() {
        let report = PlanReport::from(&sample());
        let keys: Vec<(u32, u32, u32)> = report.vehicles[0]
            .placements
            .iter()
            .map(|p| (p.z, p.y, p.x))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_serializes_to_json() {
        let report = PlanReport::from(&sample());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["placed_loads"], 3);
        assert_eq!(json["vehicles"][0]["type_name"], "Standart Tır");
        let first = &json["vehicles"][0]["placements"][0];
        assert!(first["load_id"].is_string());
        assert!(first["length"].is_u64());
        assert_eq!(json["unplaced"][0], "4");
    }

    #[test]
    fn test_text_output() {
        let report = PlanReport::from(&sample());
        let text = report.to_text(false);
        assert!(text.contains("Standart Tır #1 (13600x2450x2700 mm):"));
        assert!(text.contains("Unplaced: 4"));
        assert!(text.contains("Summary: 1 vehicle, 3 loads placed, 1 unplaced"));
        assert!(!text.contains("Layer"));

        let with_layout = report.to_text(true);
        assert!(with_layout.contains("Layer z=0"));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(0.0, 2), 0.0);
        assert_eq!(round_to(5.8333, 1), 5.8);
    }
}
