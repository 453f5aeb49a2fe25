use crate::catalog::{ArchetypeKind, VehicleTypeSpec};
use crate::types::Load;

/// Score of an archetype the load cannot go into at all.
pub const ELIMINATED: f64 = -1000.0;

const DIMENSION_FIT_WEIGHT: f64 = 10.0;
const WEIGHT_FIT_WEIGHT: f64 = 5.0;

/// What the archetype heuristics look at.
#[derive(Debug, Clone, Copy)]
pub struct LoadProfile {
    pub weight: f64,
    pub volume: u64,
    pub density: f64,
    pub aspect_ratio: f64,
    pub height: u32,
    pub stackable: bool,
    pub fragile: bool,
    pub priority: u8,
}

impl LoadProfile {
    pub fn of(load: &Load) -> Self {
        Self {
            weight: load.weight,
            volume: load.volume(),
            density: load.density(),
            aspect_ratio: load.dims.aspect_ratio(),
            height: load.dims.height,
            stackable: load.stackable,
            fragile: load.fragile,
            priority: load.priority,
        }
    }
}

/// A bonus or penalty applied when its condition holds.
pub struct Adjustment {
    pub applies: fn(&LoadProfile) -> bool,
    pub delta: f64,
}

const fn adjust(applies: fn(&LoadProfile) -> bool, delta: f64) -> Adjustment {
    Adjustment { applies, delta }
}

/// Base score plus adjustments for one vehicle family.
pub struct ScoringRule {
    pub base: f64,
    pub adjustments: &'static [Adjustment],
}

impl ScoringRule {
    pub fn score(&self, profile: &LoadProfile) -> f64 {
        self.adjustments
            .iter()
            .filter(|a| (a.applies)(profile))
            .fold(self.base, |score, a| score + a.delta)
    }
}

/// Protection for stackable, fragile and urgent cargo.
const ENCLOSED_TRAILER: ScoringRule = ScoringRule {
    base: 50.0,
    adjustments: &[
        adjust(|p| p.stackable, 20.0),
        adjust(|p| p.fragile, 15.0),
        adjust(|p| p.priority <= 2, 10.0),
        adjust(|p| (200.0..=800.0).contains(&p.density), 10.0),
        adjust(|p| p.weight > 1000.0, -15.0),
        adjust(|p| p.aspect_ratio > 5.0, -10.0),
    ],
};

/// Heavy, long, dense, non-stackable cargo.
const FLATBED: ScoringRule = ScoringRule {
    base: 60.0,
    adjustments: &[
        adjust(|p| p.weight > 500.0, 25.0),
        adjust(|p| p.aspect_ratio > 3.0, 20.0),
        adjust(|p| p.density > 800.0, 15.0),
        adjust(|p| !p.stackable, 15.0),
        adjust(|p| p.fragile, -20.0),
        adjust(|p| p.weight < 100.0, -5.0),
    ],
};

/// Very heavy, very long or tall machinery.
const LOWBED: ScoringRule = ScoringRule {
    base: 40.0,
    adjustments: &[
        adjust(|p| p.weight > 1000.0, 30.0),
        adjust(|p| p.aspect_ratio > 6.0, 25.0),
        adjust(|p| p.density > 1000.0, 20.0),
        adjust(|p| p.height > 2000, 15.0),
        adjust(|p| p.priority <= 2 && p.weight > 500.0 && !p.stackable, 15.0),
        adjust(|p| p.weight < 200.0, -25.0),
        adjust(|p| p.volume < 100_000_000, -15.0),
    ],
};

/// Containers compete on fit alone.
const CONTAINER: ScoringRule = ScoringRule {
    base: 0.0,
    adjustments: &[],
};

pub fn rule_for(kind: ArchetypeKind) -> &'static ScoringRule {
    match kind {
        ArchetypeKind::EnclosedTrailer => &ENCLOSED_TRAILER,
        ArchetypeKind::Flatbed => &FLATBED,
        ArchetypeKind::Lowbed => &LOWBED,
        ArchetypeKind::Container => &CONTAINER,
    }
}

/// Higher is a better match. [`ELIMINATED`] when the load is too big or
/// too heavy for the archetype.
pub fn score_vehicle_type(load: &Load, spec: &VehicleTypeSpec) -> f64 {
    let mut score = rule_for(spec.kind).score(&LoadProfile::of(load));

    let interior = spec.interior();
    if load.fits_in(&interior) {
        let utilization = (load.dims.length as f64 / interior.length as f64)
            .min(load.dims.width as f64 / interior.width as f64)
            .min(load.dims.height as f64 / interior.height as f64);
        score += utilization * DIMENSION_FIT_WEIGHT;
    } else {
        score = ELIMINATED;
    }

    if load.weight > spec.max_kg {
        score = ELIMINATED;
    } else {
        score += load.weight / spec.max_kg * WEIGHT_FIT_WEIGHT;
    }

    score
}

/// Candidate archetypes for `load`, best first. Equal scores keep their
/// input order.
pub fn rank_vehicle_types<'a>(
    load: &Load,
    types: &'a [VehicleTypeSpec],
) -> Vec<&'a VehicleTypeSpec> {
    let mut scored: Vec<(f64, &VehicleTypeSpec)> = types
        .iter()
        .map(|spec| (score_vehicle_type(load, spec), spec))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, spec)| spec).collect()
}
