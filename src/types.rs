use serde::{Deserialize, Deserializer, Serialize};

/// Cubic millimeters per cubic meter.
pub const MM3_PER_M3: f64 = 1_000_000_000.0;

/// Square millimeters per square meter.
pub const MM2_PER_M2: f64 = 1_000_000.0;

/// Flat areal-pressure estimate used by [`Load::can_support`].
pub const SUPPORT_KG_PER_M2: f64 = 1000.0;

pub const DEFAULT_PRIORITY: u8 = 3;

/// Accepts `3202`, `3202.0` or `3202.7` and truncates to an integer.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

/// Footprint of a box on a layer floor: `length` runs along the vehicle, `width` across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub length: u32,
    pub width: u32,
}

impl Rect {
    pub fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.length <= other.length && self.width <= other.width
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// Box dimensions in millimeters. A rotation of a load is just another `Dims`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl Dims {
    pub fn new(length: u32, width: u32, height: u32) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Saturates at `u64::MAX`; see [`Dims::checked_volume`].
    pub fn volume(&self) -> u64 {
        self.checked_volume().unwrap_or(u64::MAX)
    }

    pub fn checked_volume(&self) -> Option<u64> {
        (self.length as u64 * self.width as u64).checked_mul(self.height as u64)
    }

    pub fn base(&self) -> Rect {
        Rect::new(self.length, self.width)
    }

    pub fn base_area(&self) -> u64 {
        self.base().area()
    }

    pub fn fits_in(&self, other: &Dims) -> bool {
        self.length <= other.length && self.width <= other.width && self.height <= other.height
    }

    pub fn max_side(&self) -> u32 {
        self.length.max(self.width).max(self.height)
    }

    pub fn min_side(&self) -> u32 {
        self.length.min(self.width).min(self.height)
    }

    /// Longest over shortest side; a zero side counts as 1.
    pub fn aspect_ratio(&self) -> f64 {
        self.max_side() as f64 / self.min_side().max(1) as f64
    }

    fn sorted(&self) -> [u32; 3] {
        let mut sides = [self.length, self.width, self.height];
        sides.sort_unstable();
        sides
    }

    pub fn is_permutation_of(&self, other: &Dims) -> bool {
        self.sorted() == other.sorted()
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

/// A cargo item. Only rotations are derived from it after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub id: String,
    pub name: String,
    pub dims: Dims,
    pub weight: f64,
    pub stackable: bool,
    /// Always false for now.
    pub fragile: bool,
    /// 1 = high .. 5 = low.
    pub priority: u8,
}

impl Load {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dims: Dims,
        weight: f64,
        stackable: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dims,
            weight,
            stackable,
            fragile: false,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn volume(&self) -> u64 {
        self.dims.volume()
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume() as f64 / MM3_PER_M3
    }

    /// kg/m³, zero for a degenerate box.
    pub fn density(&self) -> f64 {
        if self.volume() == 0 {
            return 0.0;
        }
        self.weight / self.volume_m3()
    }

    /// Every distinct axis permutation of the load, original orientation first.
    pub fn rotations(&self) -> Vec<Dims> {
        let Dims {
            length: l,
            width: w,
            height: h,
        } = self.dims;
        let candidates = [
            Dims::new(l, w, h),
            Dims::new(l, h, w),
            Dims::new(w, l, h),
            Dims::new(w, h, l),
            Dims::new(h, l, w),
            Dims::new(h, w, l),
        ];

        let mut unique: Vec<Dims> = Vec::with_capacity(6);
        for rotation in candidates {
            if !unique.contains(&rotation) {
                unique.push(rotation);
            }
        }
        unique
    }

    /// Rotations in the order placement should attempt them: lowest first,
    /// then largest base, then the original orientation.
    pub fn preferred_rotations(&self) -> Vec<Dims> {
        let mut rotations = self.rotations();
        rotations.sort_by_key(|r| {
            (
                r.height,
                std::cmp::Reverse(r.base_area()),
                *r != self.dims,
            )
        });
        rotations
    }

    pub fn fits_in(&self, interior: &Dims) -> bool {
        self.rotations().iter().any(|r| r.fits_in(interior))
    }

    /// Whether `weight_on_top` kg may rest on this load.
    pub fn can_support(&self, weight_on_top: f64) -> bool {
        if !self.stackable {
            return false;
        }
        let max_support = self.dims.base_area() as f64 * SUPPORT_KG_PER_M2 / MM2_PER_M2;
        weight_on_top <= max_support
    }
}

/// A committed position of a load inside a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub load_id: String,
    pub load_name: String,
    /// Dimensions of the rotation that was placed.
    #[serde(flatten)]
    pub dims: Dims,
    pub kg: f64,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Placement {
    pub fn footprint(&self) -> Rect {
        self.dims.base()
    }

    pub fn centroid(&self) -> Point3 {
        Point3 {
            x: self.x as f64 + self.dims.length as f64 / 2.0,
            y: self.y as f64 + self.dims.width as f64 / 2.0,
            z: self.z as f64 + self.dims.height as f64 / 2.0,
        }
    }

    pub fn overlaps_footprint(&self, x: u32, y: u32, rect: Rect) -> bool {
        rects_overlap(self.x, self.y, self.footprint(), x, y, rect)
    }
}

/// Free space on a layer floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

impl FreeRect {
    pub fn overlaps(&self, x: u32, y: u32, rect: Rect) -> bool {
        rects_overlap(self.x, self.y, self.rect, x, y, rect)
    }

    pub fn contains(&self, other: &FreeRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.rect.length <= self.x + self.rect.length
            && other.y + other.rect.width <= self.y + self.rect.width
    }
}

/// Interiors overlap; touching edges do not count.
pub fn rects_overlap(x1: u32, y1: u32, a: Rect, x2: u32, y2: u32, b: Rect) -> bool {
    !(x1 >= x2 + b.length || x2 >= x1 + a.length || y1 >= y2 + b.width || y2 >= y1 + a.width)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One contribution to a vehicle's center of gravity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    #[serde(flatten)]
    pub at: Point3,
    pub kg: f64,
}
