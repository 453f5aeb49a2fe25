use thiserror::Error;

/// Precondition failures. Loads that simply do not fit are not errors; they
/// come back in `PlanningResult::unplaced`.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no loads to plan")]
    NoLoads,

    #[error("no vehicle types selected")]
    NoVehicleTypes,

    #[error("unknown vehicle type '{0}'")]
    UnknownVehicleType(String),

    #[error("invalid load '{id}': {reason}")]
    InvalidLoad { id: String, reason: String },

    #[error("invalid vehicle type '{name}': {reason}")]
    InvalidVehicleType { name: String, reason: String },

    #[error("invalid load record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("invalid load input: {0}")]
    Input(serde_json::Error),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}
