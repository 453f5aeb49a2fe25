pub mod catalog;
pub mod error;
pub mod grouping;
pub mod input;
pub mod planner;
pub mod render;
pub mod report;
pub mod scoring;
pub mod shelf;
pub mod types;
pub mod vehicle;

pub use catalog::{ArchetypeKind, VehicleCatalog, VehicleSelection, VehicleTypeSpec};
pub use error::PlanError;
pub use planner::{Planner, PlanningResult, plan};
pub use types::{Dims, Load, Placement};
pub use vehicle::Vehicle;
