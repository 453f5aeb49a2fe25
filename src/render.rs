use crate::types::{Dims, Placement, Rect};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 20.0;

/// Top-down drawing of every layer, bottom layer first.
pub fn render_layers(interior: Dims, placements: &[Placement]) -> String {
    let mut levels: Vec<u32> = placements.iter().map(|p| p.z).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut result = String::new();
    for z in levels {
        let layer: Vec<&Placement> = placements.iter().filter(|p| p.z == z).collect();
        result.push_str(&format!("Layer z={}:\n", z));
        result.push_str(&render_floor(interior.base(), &layer));
    }
    result
}

/// Draws the vehicle floor with each footprint labelled by its load id.
pub fn render_floor(floor: Rect, placements: &[&Placement]) -> String {
    let scale = f64::min(
        MAX_WIDTH / floor.length as f64,
        MAX_HEIGHT / floor.width as f64,
    );
    let to_cells = |mm: u32| (mm as f64 * scale).round() as usize;

    let (cols, rows) = (to_cells(floor.length), to_cells(floor.width));
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; cols + 1]; rows + 1];
    draw_rect(&mut grid, 0, 0, cols, rows);

    for p in placements {
        let (x, y) = (to_cells(p.x), to_cells(p.y));
        let (w, h) = (to_cells(p.dims.length), to_cells(p.dims.width));
        if w > 0 && h > 0 {
            draw_rect(&mut grid, x, y, w, h);
            write_label(&mut grid, &p.load_id, x, y, w, h);
        }
    }

    grid.iter()
        .map(|row| row.iter().collect::<String>().trim_end().to_string() + "\n")
        .collect()
}

/// Centers `text` inside the box, clipped to its interior.
fn write_label(grid: &mut [Vec<char>], text: &str, x: usize, y: usize, w: usize, h: usize) {
    let row = y + h / 2;
    if row <= y || row >= y + h {
        return;
    }
    let start = (x + w / 2).saturating_sub(text.chars().count() / 2);
    for (col, ch) in (start..).zip(text.chars()) {
        if col > x
            && col < x + w
            && let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col))
        {
            *cell = ch;
        }
    }
}

fn edge(current: char, along: char, across: char) -> char {
    if current == across || current == '+' { '+' } else { along }
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = match grid.first() {
        Some(row) => row.len(),
        None => return,
    };

    for i in (x..=x + w).filter(|&i| i < cols) {
        for j in [y, y + h].into_iter().filter(|&j| j < rows) {
            grid[j][i] = edge(grid[j][i], '-', '|');
        }
    }

    for j in (y..=y + h).filter(|&j| j < rows) {
        for i in [x, x + w].into_iter().filter(|&i| i < cols) {
            grid[j][i] = edge(grid[j][i], '|', '-');
        }
    }

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}
