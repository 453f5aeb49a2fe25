use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::types::{Dims, deserialize_u32_from_number};

/// Vehicle family. Placement rules and scoring are keyed on this, never on
/// the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    EnclosedTrailer,
    Flatbed,
    Lowbed,
    Container,
}

impl ArchetypeKind {
    pub fn is_trailer(self) -> bool {
        !matches!(self, ArchetypeKind::Container)
    }

    /// Fixed trailer order: enclosed, flatbed, lowbed.
    fn trailer_rank(self) -> u8 {
        match self {
            ArchetypeKind::EnclosedTrailer => 0,
            ArchetypeKind::Flatbed => 1,
            ArchetypeKind::Lowbed => 2,
            ArchetypeKind::Container => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeSpec {
    pub name: String,
    pub kind: ArchetypeKind,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub inner_length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub inner_width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub inner_height: u32,
    pub max_kg: f64,
}

impl VehicleTypeSpec {
    pub fn new(
        name: impl Into<String>,
        kind: ArchetypeKind,
        interior: Dims,
        max_kg: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            inner_length: interior.length,
            inner_width: interior.width,
            inner_height: interior.height,
            max_kg,
        }
    }

    pub fn interior(&self) -> Dims {
        Dims::new(self.inner_length, self.inner_width, self.inner_height)
    }

    fn validate(&self) -> Result<(), PlanError> {
        let invalid = |reason: &str| PlanError::InvalidVehicleType {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.inner_length == 0 || self.inner_width == 0 || self.inner_height == 0 {
            return Err(invalid("interior dimensions must be non-zero"));
        }
        if !self.max_kg.is_finite() || self.max_kg <= 0.0 {
            return Err(invalid("max weight must be positive"));
        }
        Ok(())
    }
}

/// Which archetypes a planning run may allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSelection {
    #[serde(default)]
    pub trailers: Vec<String>,
    #[serde(default)]
    pub containers: Vec<String>,
}

impl VehicleSelection {
    pub fn is_empty(&self) -> bool {
        self.trailers.is_empty() && self.containers.is_empty()
    }
}

/// Read-only set of vehicle archetypes, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCatalog {
    types: Vec<VehicleTypeSpec>,
}

impl VehicleCatalog {
    pub fn new(types: Vec<VehicleTypeSpec>) -> Result<Self, PlanError> {
        for (i, spec) in types.iter().enumerate() {
            spec.validate()?;
            if types[..i].iter().any(|t| t.name == spec.name) {
                return Err(PlanError::InvalidVehicleType {
                    name: spec.name.clone(),
                    reason: "duplicate name".to_string(),
                });
            }
        }
        if types.is_empty() {
            return Err(PlanError::NoVehicleTypes);
        }
        Ok(Self { types })
    }

    /// Parses a JSON array of vehicle type specs.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let types: Vec<VehicleTypeSpec> = serde_json::from_str(json)?;
        Self::new(types)
    }

    pub fn get(&self, name: &str) -> Option<&VehicleTypeSpec> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleTypeSpec> {
        self.types.iter()
    }

    /// Every archetype in the catalog, split into trailers and containers.
    pub fn select_all(&self) -> VehicleSelection {
        let (trailers, containers): (Vec<_>, Vec<_>) =
            self.types.iter().partition(|t| t.kind.is_trailer());
        VehicleSelection {
            trailers: trailers.into_iter().map(|t| t.name.clone()).collect(),
            containers: containers.into_iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Candidate archetypes for a run: selected trailers in the fixed
    /// enclosed/flatbed/lowbed order, then containers in caller order.
    /// Repeated names are kept once.
    pub fn resolve(&self, selection: &VehicleSelection) -> Result<Vec<VehicleTypeSpec>, PlanError> {
        let lookup = |name: &String| {
            self.get(name)
                .cloned()
                .ok_or_else(|| PlanError::UnknownVehicleType(name.clone()))
        };

        let mut trailers = selection
            .trailers
            .iter()
            .map(lookup)
            .collect::<Result<Vec<_>, _>>()?;
        trailers.sort_by_key(|t| t.kind.trailer_rank());

        let containers = selection
            .containers
            .iter()
            .map(lookup)
            .collect::<Result<Vec<_>, _>>()?;

        let mut resolved: Vec<VehicleTypeSpec> = Vec::new();
        for spec in trailers.into_iter().chain(containers) {
            if !resolved.iter().any(|r| r.name == spec.name) {
                resolved.push(spec);
            }
        }

        if resolved.is_empty() {
            return Err(PlanError::NoVehicleTypes);
        }
        Ok(resolved)
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self {
            types: vec![
                VehicleTypeSpec::new(
                    "Standart Tır",
                    ArchetypeKind::EnclosedTrailer,
                    Dims::new(13600, 2450, 2700),
                    24000.0,
                ),
                VehicleTypeSpec::new(
                    "Flatbed",
                    ArchetypeKind::Flatbed,
                    Dims::new(13600, 2480, 2800),
                    25000.0,
                ),
                VehicleTypeSpec::new(
                    "Lowbed",
                    ArchetypeKind::Lowbed,
                    Dims::new(25000, 2550, 3000),
                    35000.0,
                ),
                VehicleTypeSpec::new(
                    "20' DV Container",
                    ArchetypeKind::Container,
                    Dims::new(5900, 2350, 2390),
                    28000.0,
                ),
                VehicleTypeSpec::new(
                    "40' DV Container",
                    ArchetypeKind::Container,
                    Dims::new(12035, 2350, 2390),
                    30000.0,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(specs: &[VehicleTypeSpec]) -> Vec<&str> {
        specs.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = VehicleCatalog::default();
        let copy = VehicleCatalog::new(catalog.iter().cloned().collect()).unwrap();
        assert_eq!(copy, catalog);
        assert_eq!(catalog.get("Lowbed").unwrap().kind, ArchetypeKind::Lowbed);
        assert!(catalog.get("Reefer").is_none());
    }

    #[test]
    fn test_trailers_follow_fixed_order() {
        let catalog = VehicleCatalog::default();
        let selection = VehicleSelection {
            trailers: vec![
                "Lowbed".to_string(),
                "Standart Tır".to_string(),
                "Flatbed".to_string(),
            ],
            containers: vec!["40' DV Container".to_string(), "20' DV Container".to_string()],
        };
        let resolved = catalog.resolve(&selection).unwrap();
        assert_eq!(
            names(&resolved),
            vec![
                "Standart Tır",
                "Flatbed",
                "Lowbed",
                "40' DV Container",
                "20' DV Container"
            ]
        );
    }

    #[test]
    fn test_resolve_unknown_name() {
        let catalog = VehicleCatalog::default();
        let selection = VehicleSelection {
            trailers: vec!["Reefer".to_string()],
            containers: vec![],
        };
        assert!(matches!(
            catalog.resolve(&selection),
            Err(PlanError::UnknownVehicleType(name)) if name == "Reefer"
        ));
    }

    #[test]
    fn test_resolve_empty_selection() {
        let catalog = VehicleCatalog::default();
        assert!(matches!(
            catalog.resolve(&VehicleSelection::default()),
            Err(PlanError::NoVehicleTypes)
        ));
    }

    #[test]
    fn test_resolve_dedups() {
        let catalog = VehicleCatalog::default();
        let selection = VehicleSelection {
            trailers: vec!["Flatbed".to_string(), "Flatbed".to_string()],
            containers: vec!["Flatbed".to_string()],
        };
        assert_eq!(names(&catalog.resolve(&selection).unwrap()), vec!["Flatbed"]);
    }

    #[test]
    fn test_select_all() {
        let selection = VehicleCatalog::default().select_all();
        assert_eq!(selection.trailers.len(), 3);
        assert_eq!(
            selection.containers,
            vec!["20' DV Container".to_string(), "40' DV Container".to_string()]
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"name": "Mega", "kind": "enclosed_trailer", "inner_length": 13620,
             "inner_width": 2480, "inner_height": 3000.0, "max_kg": 24000}
        ]"#;
        let catalog = VehicleCatalog::from_json(json).unwrap();
        let mega = catalog.get("Mega").unwrap();
        assert_eq!(mega.interior(), Dims::new(13620, 2480, 3000));
        assert_eq!(mega.max_kg, 24000.0);
    }

    #[test]
    fn test_from_json_rejects_bad_specs() {
        let zero = r#"[{"name": "X", "kind": "flatbed", "inner_length": 0,
            "inner_width": 1, "inner_height": 1, "max_kg": 1}]"#;
        assert!(matches!(
            VehicleCatalog::from_json(zero),
            Err(PlanError::InvalidVehicleType { .. })
        ));
        assert!(matches!(
            VehicleCatalog::from_json("[]"),
            Err(PlanError::NoVehicleTypes)
        ));
        assert!(matches!(
            VehicleCatalog::from_json("{"),
            Err(PlanError::Catalog(_))
        ));
    }
}
