use std::collections::HashMap;

use crate::types::Load;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeClass {
    /// Volume thresholds 0.05 / 0.2 / 1.0 m³.
    pub fn of(load: &Load) -> Self {
        match load.volume() {
            v if v < 50_000_000 => SizeClass::Small,
            v if v < 200_000_000 => SizeClass::Medium,
            v if v < 1_000_000_000 => SizeClass::Large,
            _ => SizeClass::ExtraLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightClass {
    Light,
    Medium,
    Heavy,
}

impl WeightClass {
    pub fn of(load: &Load) -> Self {
        match load.weight {
            kg if kg < 50.0 => WeightClass::Light,
            kg if kg < 200.0 => WeightClass::Medium,
            _ => WeightClass::Heavy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DensityClass {
    Low,
    Medium,
    High,
}

impl DensityClass {
    pub fn of(load: &Load) -> Self {
        match load.density() {
            d if d < 200.0 => DensityClass::Low,
            d if d < 800.0 => DensityClass::Medium,
            _ => DensityClass::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    Long,
    Rectangular,
    Square,
}

impl ShapeClass {
    pub fn of(load: &Load) -> Self {
        match load.dims.aspect_ratio() {
            r if r > 4.0 => ShapeClass::Long,
            r if r > 2.0 => ShapeClass::Rectangular,
            _ => ShapeClass::Square,
        }
    }
}

/// Loads with equal keys are packed back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryKey {
    pub size: SizeClass,
    pub weight: WeightClass,
    pub density: DensityClass,
    pub shape: ShapeClass,
    pub stackable: bool,
    pub priority: u8,
}

impl CategoryKey {
    pub fn of(load: &Load) -> Self {
        Self {
            size: SizeClass::of(load),
            weight: WeightClass::of(load),
            density: DensityClass::of(load),
            shape: ShapeClass::of(load),
            stackable: load.stackable,
            priority: load.priority,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadGroup<'a> {
    pub key: CategoryKey,
    pub loads: Vec<&'a Load>,
}

impl LoadGroup<'_> {
    pub fn average_weight(&self) -> f64 {
        if self.loads.is_empty() {
            return 0.0;
        }
        self.loads.iter().map(|l| l.weight).sum::<f64>() / self.loads.len() as f64
    }

    pub fn average_volume(&self) -> f64 {
        if self.loads.is_empty() {
            return 0.0;
        }
        self.loads.iter().map(|l| l.volume() as f64).sum::<f64>() / self.loads.len() as f64
    }
}

/// Groups by category key, groups in order of first appearance.
pub fn group_loads(loads: &[Load]) -> Vec<LoadGroup<'_>> {
    let mut index: HashMap<CategoryKey, usize> = HashMap::new();
    let mut groups: Vec<LoadGroup<'_>> = Vec::new();

    for load in loads {
        let key = CategoryKey::of(load);
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(LoadGroup {
                key,
                loads: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].loads.push(load);
    }

    groups
}

/// Processing order: high priority, non-stackable, heavy and bulky groups
/// first; largest loads first inside a group. Groups stay contiguous.
pub fn order_loads(loads: &[Load]) -> Vec<&Load> {
    let mut groups = group_loads(loads);

    groups.sort_by(|a, b| {
        a.key
            .priority
            .cmp(&b.key.priority)
            .then(a.key.stackable.cmp(&b.key.stackable))
            .then(b.average_weight().total_cmp(&a.average_weight()))
            .then(b.average_volume().total_cmp(&a.average_volume()))
    });

    groups
        .into_iter()
        .flat_map(|mut group| {
            group.loads.sort_by(|a, b| b.volume().cmp(&a.volume()));
            group.loads
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dims;

    fn load(id: &str, dims: Dims, kg: f64, stackable: bool) -> Load {
        Load::new(id, id, dims, kg, stackable)
    }

    fn ids(loads: &[&Load]) -> Vec<String> {
        loads.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_size_class_thresholds() {
        let small = load("s", Dims::new(100, 100, 100), 1.0, true);
        let medium = load("m", Dims::new(500, 500, 200), 1.0, true);
        let large = load("l", Dims::new(1000, 1000, 500), 1.0, true);
        let xl = load("xl", Dims::new(1000, 1000, 1000), 1.0, true);
        assert_eq!(SizeClass::of(&small), SizeClass::Small);
        assert_eq!(SizeClass::of(&medium), SizeClass::Medium);
        assert_eq!(SizeClass::of(&large), SizeClass::Large);
        assert_eq!(SizeClass::of(&xl), SizeClass::ExtraLarge);
    }

    #[test]
    fn test_weight_density_shape_classes() {
        let cube = load("c", Dims::new(1000, 1000, 1000), 500.0, true);
        assert_eq!(WeightClass::of(&cube), WeightClass::Heavy);
        assert_eq!(DensityClass::of(&cube), DensityClass::Medium);
        assert_eq!(ShapeClass::of(&cube), ShapeClass::Square);

        let beam = load("b", Dims::new(5000, 200, 200), 30.0, true);
        assert_eq!(WeightClass::of(&beam), WeightClass::Light);
        assert_eq!(DensityClass::of(&beam), DensityClass::Low);
        assert_eq!(ShapeClass::of(&beam), ShapeClass::Long);

        let board = load("r", Dims::new(900, 300, 300), 100.0, true);
        assert_eq!(WeightClass::of(&board), WeightClass::Medium);
        assert_eq!(DensityClass::of(&board), DensityClass::High);
        assert_eq!(ShapeClass::of(&board), ShapeClass::Rectangular);
    }

    #[test]
    fn test_group_by_key_in_first_appearance_order() {
        let loads = vec![
            load("a", Dims::new(100, 100, 100), 10.0, true),
            load("b", Dims::new(1000, 1000, 1000), 500.0, true),
            load("c", Dims::new(110, 100, 100), 12.0, true),
        ];
        let groups = group_loads(&loads);
        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0].loads), vec!["a", "c"]);
        assert_eq!(ids(&groups[1].loads), vec!["b"]);
        assert!((groups[0].average_weight() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_priority_then_stackability() {
        let loads = vec![
            load("stack", Dims::new(1000, 1000, 1000), 500.0, true),
            load("fixed", Dims::new(100, 100, 100), 10.0, false),
            load("urgent", Dims::new(100, 100, 100), 10.0, true).with_priority(1),
        ];
        assert_eq!(ids(&order_loads(&loads)), vec!["urgent", "fixed", "stack"]);
    }

    #[test]
    fn test_order_heavier_group_first_and_volume_within_group() {
        let loads = vec![
            load("light", Dims::new(100, 100, 100), 10.0, true),
            load("small", Dims::new(1000, 1000, 1000), 500.0, true),
            load("heavy", Dims::new(300, 300, 300), 5000.0, true),
            load("big", Dims::new(1200, 1000, 1000), 600.0, true),
        ];
        let ordered = ids(&order_loads(&loads));
        assert_eq!(ordered, vec!["heavy", "big", "small", "light"]);
    }

    #[test]
    fn test_order_keeps_every_load() {
        let loads: Vec<Load> = (0..20)
            .map(|i| {
                let dims = Dims::new(100 + i * 50, 200, 300);
                load(&i.to_string(), dims, (i * 37) as f64 + 1.0, i % 3 != 0)
            })
            .collect();
        let mut ordered = ids(&order_loads(&loads));
        ordered.sort();
        let mut expected: Vec<String> = loads.iter().map(|l| l.id.clone()).collect();
        expected.sort();
        assert_eq!(ordered, expected);
    }
}
