use crate::types::{Dims, FreeRect, Load, Placement, Rect};

/// Weight of the short leftover side in the best-short-side-fit score.
const SHORT_SIDE_WEIGHT: u64 = 1000;

/// One horizontal layer of a vehicle, packed in 2D with a MaxRects-style
/// free list. Free rectangles may overlap each other; placed footprints never do.
#[derive(Debug, Clone)]
pub struct Shelf {
    /// Floor of the layer above the vehicle deck.
    pub z0: u32,
    pub height: u32,
    pub free_rects: Vec<FreeRect>,
    pub placements: Vec<Placement>,
    /// False once any non-stackable load sits on this layer.
    pub all_stackable: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredPosition {
    pub free_idx: usize,
    pub score: u64,
}

impl Shelf {
    pub fn new(z0: u32, height: u32, floor: Rect) -> Self {
        Self {
            z0,
            height,
            free_rects: vec![FreeRect {
                x: 0,
                y: 0,
                rect: floor,
            }],
            placements: Vec::new(),
            all_stackable: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn used_volume(&self) -> u64 {
        self.placements.iter().map(|p| p.dims.volume()).sum()
    }

    /// Best-short-side-fit over the free list. The first rectangle reaching
    /// the minimum score wins.
    pub fn find_best(&self, piece: Rect) -> Option<ScoredPosition> {
        let mut best: Option<ScoredPosition> = None;

        for (idx, free) in self.free_rects.iter().enumerate() {
            if !piece.fits_in(&free.rect) {
                continue;
            }
            let score = Self::score(piece, free.rect);
            if best.is_none_or(|b| score < b.score) {
                best = Some(ScoredPosition {
                    free_idx: idx,
                    score,
                });
            }
        }

        best
    }

    fn score(piece: Rect, free: Rect) -> u64 {
        let leftover_length = (free.length - piece.length) as u64;
        let leftover_width = (free.width - piece.width) as u64;
        let short = leftover_length.min(leftover_width);
        let long = leftover_length.max(leftover_width);
        short * SHORT_SIDE_WEIGHT + long
    }

    /// The placement `try_place` would commit, without touching the shelf.
    pub fn preview_placement(&self, load: &Load, rotation: Dims) -> Option<Placement> {
        if rotation.height > self.height {
            return None;
        }

        let piece = rotation.base();
        let scored = self.find_best(piece)?;
        let free = self.free_rects[scored.free_idx];

        // Free-list bookkeeping is approximate; never trust it alone
        if self.conflicts(free.x, free.y, piece) {
            return None;
        }

        Some(Placement {
            load_id: load.id.clone(),
            load_name: load.name.clone(),
            dims: rotation,
            kg: load.weight,
            x: free.x,
            y: free.y,
            z: self.z0,
        })
    }

    /// Places `load` in the given rotation at the bottom-left corner of the
    /// best free rectangle. On `None` the shelf is unchanged.
    pub fn try_place(&mut self, load: &Load, rotation: Dims) -> Option<Placement> {
        let placement = self.preview_placement(load, rotation)?;

        self.split_free_rects(placement.x, placement.y, placement.footprint());
        self.all_stackable = self.all_stackable && load.stackable;
        self.placements.push(placement.clone());

        Some(placement)
    }

    fn conflicts(&self, x: u32, y: u32, piece: Rect) -> bool {
        self.placements
            .iter()
            .any(|p| p.overlaps_footprint(x, y, piece))
    }

    fn split_free_rects(&mut self, x: u32, y: u32, placed: Rect) {
        let mut next = Vec::with_capacity(self.free_rects.len() + 4);

        for free in &self.free_rects {
            if free.overlaps(x, y, placed) {
                next.extend(Self::split(*free, x, y, placed));
            } else {
                next.push(*free);
            }
        }

        self.free_rects = Self::prune(next);
    }

    /// Left, right, bottom and top slivers of `free` around the placed box.
    fn split(free: FreeRect, x: u32, y: u32, placed: Rect) -> Vec<FreeRect> {
        let mut splits = Vec::with_capacity(4);
        let free_end_x = free.x + free.rect.length;
        let free_end_y = free.y + free.rect.width;
        let placed_end_x = x + placed.length;
        let placed_end_y = y + placed.width;

        if x > free.x {
            splits.push(FreeRect {
                x: free.x,
                y: free.y,
                rect: Rect::new(x - free.x, free.rect.width),
            });
        }
        if placed_end_x < free_end_x {
            splits.push(FreeRect {
                x: placed_end_x,
                y: free.y,
                rect: Rect::new(free_end_x - placed_end_x, free.rect.width),
            });
        }
        if y > free.y {
            splits.push(FreeRect {
                x: free.x,
                y: free.y,
                rect: Rect::new(free.rect.length, y - free.y),
            });
        }
        if placed_end_y < free_end_y {
            splits.push(FreeRect {
                x: free.x,
                y: placed_end_y,
                rect: Rect::new(free.rect.length, free_end_y - placed_end_y),
            });
        }

        splits
    }

    /// Drops empty rectangles and any rectangle contained in another.
    fn prune(rects: Vec<FreeRect>) -> Vec<FreeRect> {
        let mut kept: Vec<FreeRect> = Vec::with_capacity(rects.len());

        for rect in rects {
            if rect.rect.length == 0 || rect.rect.width == 0 {
                continue;
            }
            if kept.iter().any(|existing| existing.contains(&rect)) {
                continue;
            }
            kept.retain(|existing| !rect.contains(existing));
            kept.push(rect);
        }

        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(id: &str, l: u32, w: u32, h: u32, stackable: bool) -> Load {
        Load::new(id, "crate", Dims::new(l, w, h), 10.0, stackable)
    }

    fn assert_disjoint(shelf: &Shelf) {
        for (i, a) in shelf.placements.iter().enumerate() {
            for b in &shelf.placements[i + 1..] {
                assert!(
                    !a.overlaps_footprint(b.x, b.y, b.footprint()),
                    "{} @ ({},{}) overlaps {} @ ({},{})",
                    a.dims, a.x, a.y, b.dims, b.x, b.y
                );
            }
        }
    }

    #[test]
    fn test_place_single_piece() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 500));
        let l = load("1", 400, 300, 200, true);
        let p = shelf.try_place(&l, l.dims).unwrap();
        assert_eq!((p.x, p.y, p.z), (0, 0, 0));
        assert_eq!(p.dims, Dims::new(400, 300, 200));
        assert_eq!(shelf.placements.len(), 1);
        // Right sliver and top sliver
        assert_eq!(shelf.free_rects.len(), 2);
        assert!(shelf.free_rects.contains(&FreeRect {
            x: 400,
            y: 0,
            rect: Rect::new(600, 500)
        }));
        assert!(shelf.free_rects.contains(&FreeRect {
            x: 0,
            y: 300,
            rect: Rect::new(1000, 200)
        }));
    }

    #[test]
    fn test_rejects_too_tall() {
        let mut shelf = Shelf::new(0, 100, Rect::new(1000, 500));
        let l = load("1", 100, 100, 200, true);
        assert!(shelf.try_place(&l, l.dims).is_none());
        assert!(shelf.is_empty());
        assert_eq!(shelf.free_rects.len(), 1);
    }

    #[test]
    fn test_rejects_too_large_footprint() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 500));
        let l = load("1", 1200, 100, 100, true);
        assert!(shelf.try_place(&l, l.dims).is_none());
    }

    #[test]
    fn test_best_short_side_fit_prefers_tight_rect() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 1000));
        shelf.free_rects = vec![
            FreeRect {
                x: 0,
                y: 0,
                rect: Rect::new(1000, 1000),
            },
            FreeRect {
                x: 0,
                y: 0,
                rect: Rect::new(310, 900),
            },
        ];
        let best = shelf.find_best(Rect::new(300, 300)).unwrap();
        assert_eq!(best.free_idx, 1);
        assert_eq!(best.score, 10 * 1000 + 600);
    }

    #[test]
    fn test_ties_go_to_first_rect() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 1000));
        shelf.free_rects = vec![
            FreeRect {
                x: 0,
                y: 500,
                rect: Rect::new(500, 500),
            },
            FreeRect {
                x: 500,
                y: 0,
                rect: Rect::new(500, 500),
            },
        ];
        let best = shelf.find_best(Rect::new(200, 200)).unwrap();
        assert_eq!(best.free_idx, 0);
    }

    #[test]
    fn test_fill_exact() {
        let mut shelf = Shelf::new(0, 100, Rect::new(200, 100));
        let l = load("1", 100, 100, 100, true);
        assert!(shelf.try_place(&l, l.dims).is_some());
        assert!(shelf.try_place(&l, l.dims).is_some());
        assert!(shelf.free_rects.is_empty());
        assert!(shelf.try_place(&l, l.dims).is_none());
        assert_disjoint(&shelf);
    }

    #[test]
    fn test_many_pieces_never_overlap() {
        let mut shelf = Shelf::new(0, 1000, Rect::new(2400, 1200));
        let sizes = [
            (800, 600),
            (400, 300),
            (600, 400),
            (300, 200),
            (500, 500),
            (700, 350),
            (250, 150),
            (1200, 300),
        ];
        let mut placed = 0;
        for round in 0..4 {
            for (i, &(l, w)) in sizes.iter().enumerate() {
                let item = load(&format!("{round}-{i}"), l, w, 100, true);
                if let Some(p) = shelf.try_place(&item, item.dims) {
                    assert!(p.x + p.dims.length <= 2400);
                    assert!(p.y + p.dims.width <= 1200);
                    placed += 1;
                }
            }
        }
        assert!(placed > 5);
        assert_eq!(placed, shelf.placements.len());
        assert_disjoint(&shelf);
    }

    #[test]
    fn test_free_list_has_no_contained_rects() {
        let mut shelf = Shelf::new(0, 1000, Rect::new(1000, 1000));
        for i in 0..5 {
            let l = load(&i.to_string(), 300, 200, 100, true);
            shelf.try_place(&l, l.dims).unwrap();
        }
        for (i, a) in shelf.free_rects.iter().enumerate() {
            for (j, b) in shelf.free_rects.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b), "{a:?} contains {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_non_stackable_marks_shelf() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 1000));
        let a = load("a", 100, 100, 100, true);
        shelf.try_place(&a, a.dims).unwrap();
        assert!(shelf.all_stackable);
        let b = load("b", 100, 100, 100, false);
        shelf.try_place(&b, b.dims).unwrap();
        assert!(!shelf.all_stackable);
    }

    #[test]
    fn test_preview_matches_commit() {
        let mut shelf = Shelf::new(250, 500, Rect::new(1000, 1000));
        let a = load("a", 400, 400, 300, true);
        shelf.try_place(&a, a.dims).unwrap();
        let b = load("b", 300, 300, 300, true);
        let free_before = shelf.free_rects.clone();
        let preview = shelf.preview_placement(&b, b.dims).unwrap();
        assert_eq!(shelf.free_rects, free_before);
        assert_eq!(shelf.placements.len(), 1);
        let committed = shelf.try_place(&b, b.dims).unwrap();
        assert_eq!(preview, committed);
        assert_eq!(committed.z, 250);
    }

    #[test]
    fn test_conflict_check_blocks_stale_free_rect() {
        let mut shelf = Shelf::new(0, 500, Rect::new(1000, 1000));
        let a = load("a", 500, 500, 100, true);
        shelf.try_place(&a, a.dims).unwrap();
        // Corrupt the free list so it advertises occupied space
        shelf.free_rects = vec![FreeRect {
            x: 0,
            y: 0,
            rect: Rect::new(1000, 1000),
        }];
        let b = load("b", 200, 200, 100, true);
        assert!(shelf.try_place(&b, b.dims).is_none());
        assert_eq!(shelf.placements.len(), 1);
    }
}
