use serde::Serialize;

use crate::catalog::{ArchetypeKind, VehicleTypeSpec};
use crate::shelf::Shelf;
use crate::types::{Dims, Load, Placement, Point3, Rect, WeightPoint};

/// Below either threshold the relaxed CG bounds stay wide open.
const LENIENT_CG_PLACEMENTS: usize = 8;
const LENIENT_CG_KG: f64 = 1500.0;

/// Penalty added to `fit_score` when a load would overload the vehicle.
const OVERWEIGHT_PENALTY: f64 = 10000.0;

/// Acceptable center-of-gravity window, in percent of interior length (x)
/// and width (y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CgBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl CgBounds {
    const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn contains(&self, x_percent: f64, y_percent: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x_percent)
            && (self.y_min..=self.y_max).contains(&y_percent)
    }
}

const STANDARD_CG: CgBounds = CgBounds::new(30.0, 70.0, 25.0, 75.0);
const LOWBED_CG: CgBounds = CgBounds::new(40.0, 60.0, 35.0, 65.0);
const LENIENT_CG: CgBounds = CgBounds::new(15.0, 85.0, 15.0, 85.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CgPreview {
    pub valid: bool,
    pub at: Point3,
}

/// One allocated transport unit: a stack of shelves inside a fixed interior.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub label: String,
    pub type_name: String,
    pub kind: ArchetypeKind,
    pub interior: Dims,
    pub max_kg: f64,
    /// Bottom to top.
    pub shelves: Vec<Shelf>,
    pub total_kg: f64,
    pub center_of_gravity: Point3,
    pub weight_distribution: Vec<WeightPoint>,
}

impl Vehicle {
    pub fn new(label: impl Into<String>, spec: &VehicleTypeSpec) -> Self {
        Self {
            label: label.into(),
            type_name: spec.name.clone(),
            kind: spec.kind,
            interior: spec.interior(),
            max_kg: spec.max_kg,
            shelves: Vec::new(),
            total_kg: 0.0,
            center_of_gravity: Point3::default(),
            weight_distribution: Vec::new(),
        }
    }

    pub fn is_lowbed(&self) -> bool {
        self.kind == ArchetypeKind::Lowbed
    }

    fn floor(&self) -> Rect {
        self.interior.base()
    }

    pub fn used_height(&self) -> u32 {
        self.shelves.iter().map(|s| s.height).sum()
    }

    pub fn remaining_height(&self) -> u32 {
        self.interior.height.saturating_sub(self.used_height())
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.shelves.iter().flat_map(|s| &s.placements)
    }

    pub fn placement_count(&self) -> usize {
        self.shelves.iter().map(|s| s.placements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.iter().all(Shelf::is_empty)
    }

    /// Index of a shelf that can take an item of `height`, creating one on
    /// top if needed. Lowbeds always get a fresh shelf. Nothing is stacked
    /// above a shelf holding a non-stackable load.
    pub fn ensure_shelf(&mut self, height: u32) -> Option<usize> {
        if !self.is_lowbed() {
            if let Some(idx) = self.shelves.iter().position(|s| height <= s.height) {
                return Some(idx);
            }
            if self.shelves.iter().any(|s| !s.all_stackable) {
                return None;
            }
        }

        if height > self.remaining_height() {
            return None;
        }

        let z0 = self.used_height();
        self.shelves.push(Shelf::new(z0, height, self.floor()));
        Some(self.shelves.len() - 1)
    }

    /// A lowbed carries one job: a new load must share its name, or a
    /// word of it, with something already aboard.
    pub fn can_place_on_lowbed(&self, load: &Load) -> bool {
        let mut names = self.placements().map(|p| p.load_name.as_str()).peekable();
        if names.peek().is_none() {
            return true;
        }
        names.any(|existing| existing == load.name || shares_word(existing, &load.name))
    }

    /// Places `load` somewhere in this vehicle, trying its preferred
    /// rotations in order. On `None` the vehicle is unchanged.
    pub fn try_put(&mut self, load: &Load) -> Option<Placement> {
        if self.total_kg + load.weight > self.max_kg {
            return None;
        }
        if self.is_lowbed() && !self.can_place_on_lowbed(load) {
            return None;
        }

        for rotation in load.preferred_rotations() {
            if !rotation.fits_in(&self.interior) {
                continue;
            }

            if !self.is_lowbed() {
                let placed = self
                    .shelves
                    .iter_mut()
                    .find_map(|shelf| shelf.try_place(load, rotation));
                if let Some(placement) = placed {
                    self.commit(&placement);
                    return Some(placement);
                }
            }

            let shelf_count = self.shelves.len();
            if let Some(idx) = self.ensure_shelf(rotation.height) {
                if let Some(placement) = self.shelves[idx].try_place(load, rotation) {
                    self.commit(&placement);
                    return Some(placement);
                }
                self.shelves.truncate(shelf_count);
            }
        }

        None
    }

    fn commit(&mut self, placement: &Placement) {
        self.total_kg += placement.kg;
        self.update_center_of_gravity(placement);
    }

    fn update_center_of_gravity(&mut self, placement: &Placement) {
        if self.total_kg <= 0.0 {
            return;
        }

        let at = placement.centroid();
        let prev_kg = self.total_kg - placement.kg;

        if prev_kg > 0.0 {
            let cg = &mut self.center_of_gravity;
            cg.x = (cg.x * prev_kg + at.x * placement.kg) / self.total_kg;
            cg.y = (cg.y * prev_kg + at.y * placement.kg) / self.total_kg;
            cg.z = (cg.z * prev_kg + at.z * placement.kg) / self.total_kg;
        } else {
            self.center_of_gravity = at;
        }

        self.weight_distribution.push(WeightPoint {
            at,
            kg: placement.kg,
        });
    }

    pub fn used_volume(&self) -> u64 {
        self.shelves.iter().map(Shelf::used_volume).sum()
    }

    /// Percent of the interior volume occupied.
    pub fn volume_utilization(&self) -> f64 {
        let total = self.interior.volume();
        if total == 0 {
            return 0.0;
        }
        self.used_volume() as f64 / total as f64 * 100.0
    }

    /// Percent of the weight capacity used.
    pub fn weight_utilization(&self) -> f64 {
        if self.max_kg <= 0.0 {
            return 0.0;
        }
        self.total_kg / self.max_kg * 100.0
    }

    fn cg_percent(&self, cg: Point3) -> (f64, f64) {
        (
            cg.x / self.interior.length as f64 * 100.0,
            cg.y / self.interior.width as f64 * 100.0,
        )
    }

    pub fn cg_bounds(&self) -> CgBounds {
        if self.is_lowbed() { LOWBED_CG } else { STANDARD_CG }
    }

    pub fn is_center_of_gravity_valid(&self) -> bool {
        let (x, y) = self.cg_percent(self.center_of_gravity);
        self.cg_bounds().contains(x, y)
    }

    /// 0..=100, higher when `placement` would keep the CG near the middle
    /// of the floor.
    pub fn placement_score(&self, placement: &Placement) -> f64 {
        let kg = self.total_kg + placement.kg;
        if kg <= 0.0 {
            return 0.0;
        }
        let at = placement.centroid();
        let cg_x = (self.center_of_gravity.x * self.total_kg + at.x * placement.kg) / kg;
        let cg_y = (self.center_of_gravity.y * self.total_kg + at.y * placement.kg) / kg;

        let ideal_x = self.interior.length as f64 / 2.0;
        let ideal_y = self.interior.width as f64 / 2.0;
        let deviation = (cg_x - ideal_x).abs() / ideal_x + (cg_y - ideal_y).abs() / ideal_y;

        (100.0 - deviation * 50.0).clamp(0.0, 100.0)
    }

    /// Wide open while the vehicle is lightly loaded, then the regular bounds.
    pub fn relaxed_cg_bounds(&self) -> CgBounds {
        if self.placement_count() < LENIENT_CG_PLACEMENTS || self.total_kg < LENIENT_CG_KG {
            LENIENT_CG
        } else {
            self.cg_bounds()
        }
    }

    /// Where the CG would move if `placement` were committed.
    pub fn preview_center_of_gravity(&self, placement: &Placement) -> CgPreview {
        let kg = self.total_kg + placement.kg;
        if kg <= 0.0 {
            return CgPreview {
                valid: true,
                at: Point3::default(),
            };
        }

        let load_at = placement.centroid();
        let cg = self.center_of_gravity;
        let at = Point3 {
            x: (cg.x * self.total_kg + load_at.x * placement.kg) / kg,
            y: (cg.y * self.total_kg + load_at.y * placement.kg) / kg,
            z: (cg.z * self.total_kg + load_at.z * placement.kg) / kg,
        };
        let (x, y) = self.cg_percent(at);

        CgPreview {
            valid: self.relaxed_cg_bounds().contains(x, y),
            at,
        }
    }

    /// Lower is better: free volume left after adding `load`, plus a large
    /// penalty when it would exceed the weight limit.
    pub fn fit_score(&self, load: &Load) -> f64 {
        let total = self.interior.volume();
        let estimated = if total > 0 {
            (self.used_volume() + load.volume()) as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let overweight = self.total_kg + load.weight > self.max_kg;

        (100.0 - estimated) + if overweight { OVERWEIGHT_PENALTY } else { 0.0 }
    }

    /// Cheap pre-check: weight headroom and some rotation fits the interior.
    pub fn can_potentially_fit(&self, load: &Load) -> bool {
        self.total_kg + load.weight <= self.max_kg && load.fits_in(&self.interior)
    }
}

fn shares_word(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.split_whitespace()
        .any(|word| b.split_whitespace().any(|other| other == word))
}
