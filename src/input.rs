//! Turning raw load records into [`Load`]s: unit conversion and the
//! stackability strategy live here, the planner only ever sees millimeters
//! and kilograms.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PlanError;
use crate::types::{DEFAULT_PRIORITY, Dims, Load};

/// Values of a stackability column that mean "yes".
const TRUTHY: [&str; 5] = ["1", "true", "evet", "yes", "ja"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
    M,
    In,
}

impl LengthUnit {
    pub fn to_mm(self) -> f64 {
        match self {
            LengthUnit::Mm => 1.0,
            LengthUnit::Cm => 10.0,
            LengthUnit::M => 1000.0,
            LengthUnit::In => 25.4,
        }
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" => Ok(LengthUnit::Mm),
            "cm" => Ok(LengthUnit::Cm),
            "m" => Ok(LengthUnit::M),
            "in" => Ok(LengthUnit::In),
            _ => Err(format!("invalid length unit '{}', expected: mm, cm, m, or in", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    T,
    Lb,
}

impl WeightUnit {
    pub fn to_kg(self) -> f64 {
        match self {
            WeightUnit::Kg => 1.0,
            WeightUnit::T => 1000.0,
            WeightUnit::Lb => 0.453_592_37,
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(WeightUnit::Kg),
            "t" => Ok(WeightUnit::T),
            "lb" => Ok(WeightUnit::Lb),
            _ => Err(format!("invalid weight unit '{}', expected: kg, t, or lb", s)),
        }
    }
}

/// Where the stackable flag comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    /// Read each record's own value; missing means stackable.
    #[default]
    Sheet,
    Yes,
    No,
}

impl std::str::FromStr for StackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sheet" => Ok(StackMode::Sheet),
            "yes" => Ok(StackMode::Yes),
            "no" => Ok(StackMode::No),
            _ => Err(format!("invalid stack mode '{}', expected: sheet, yes, or no", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOptions {
    #[serde(default)]
    pub length_unit: LengthUnit,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub stack_mode: StackMode,
}

/// A stackability cell as it may appear in a sheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StackValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl StackValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            StackValue::Flag(flag) => *flag,
            StackValue::Number(n) => *n == 1.0,
            StackValue::Text(text) => TRUTHY.contains(&text.trim().to_lowercase().as_str()),
        }
    }
}

/// One row of load input, in the caller's units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub stackable: Option<StackValue>,
    #[serde(default)]
    pub priority: Option<u8>,
}

/// Load numbers are often plain numbers in sheet exports.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

impl LoadRecord {
    pub fn into_load(self, options: &InputOptions) -> Result<Load, PlanError> {
        let invalid = |reason: String| PlanError::InvalidRecord {
            id: self.id.clone(),
            reason,
        };

        let to_mm = |value: f64, what: &str| {
            let mm = value * options.length_unit.to_mm();
            if !mm.is_finite() || mm < 0.0 || mm > u32::MAX as f64 {
                return Err(invalid(format!("{what} {value} is out of range")));
            }
            Ok(mm as u32)
        };
        let dims = Dims::new(
            to_mm(self.length, "length")?,
            to_mm(self.width, "width")?,
            to_mm(self.height, "height")?,
        );

        let weight = self.weight * options.weight_unit.to_kg();
        if !weight.is_finite() {
            return Err(invalid(format!("weight {} is out of range", self.weight)));
        }

        let priority = self.priority.unwrap_or(DEFAULT_PRIORITY);
        if !(1..=5).contains(&priority) {
            return Err(invalid(format!("priority {priority} is not between 1 and 5")));
        }

        let stackable = match options.stack_mode {
            StackMode::Yes => true,
            StackMode::No => false,
            StackMode::Sheet => self.stackable.as_ref().is_none_or(StackValue::is_truthy),
        };

        Ok(Load::new(self.id, self.name, dims, weight, stackable).with_priority(priority))
    }
}

pub fn loads_from_records(
    records: Vec<LoadRecord>,
    options: &InputOptions,
) -> Result<Vec<Load>, PlanError> {
    records.into_iter().map(|r| r.into_load(options)).collect()
}

/// Parses a JSON array of load records.
pub fn loads_from_json(json: &str, options: &InputOptions) -> Result<Vec<Load>, PlanError> {
    let records: Vec<LoadRecord> = serde_json::from_str(json).map_err(PlanError::Input)?;
    loads_from_records(records, options)
}
