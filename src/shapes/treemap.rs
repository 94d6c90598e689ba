//! Treemap layout: recursive rectangle subdivision.
//!
//! The tiling is chosen per chart and used at every depth. Nodes without a
//! positive value get a zero-area rectangle at their parent's corner.

use super::hierarchy::{Hierarchy, ROOT};
use crate::data_types::Rect;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tiling {
    /// Rows chosen to keep aspect ratios close to the golden ratio.
    #[default]
    Squarify,
    /// Alternates horizontal (even depth) and vertical (odd depth) strips.
    SliceDice,
}

const PHI: f64 = 1.618_033_988_749_895;

/// Rectangles indexed like `hierarchy.nodes`. The root gets `bounds`.
pub fn treemap<R>(hierarchy: &Hierarchy<R>, bounds: Rect, tiling: Tiling, padding: f64) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); hierarchy.nodes.len()];
    if rects.is_empty() {
        return rects;
    }
    rects[ROOT] = bounds;
    let half = padding.max(0.0) / 2.0;

    // pre-order: a parent is always placed before its children
    for idx in 0..hierarchy.nodes.len() {
        let node = &hierarchy.nodes[idx];
        if node.children.is_empty() {
            continue;
        }
        let values: Vec<f64> = node
            .children
            .iter()
            .map(|&c| hierarchy.nodes[c].value.max(0.0))
            .collect();
        let area = rects[idx];
        let tiles = match tiling {
            Tiling::Squarify => squarify(&values, area),
            Tiling::SliceDice if node.depth % 2 == 1 => slice(&values, area),
            Tiling::SliceDice => dice(&values, area),
        };
        for (&child, tile) in node.children.iter().zip(tiles) {
            rects[child] = if hierarchy.nodes[child].value > 0.0 {
                inset(tile, half)
            } else {
                Rect::new(tile.x, tile.y, 0.0, 0.0)
            };
        }
    }
    rects
}

fn inset(r: Rect, d: f64) -> Rect {
    let w = (r.width - 2.0 * d).max(0.0);
    let h = (r.height - 2.0 * d).max(0.0);
    Rect::new(r.x + (r.width - w) / 2.0, r.y + (r.height - h) / 2.0, w, h)
}

/// Side by side along x.
pub fn dice(values: &[f64], area: Rect) -> Vec<Rect> {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.width / total } else { 0.0 };
    let mut x = area.x;
    values
        .iter()
        .map(|v| {
            let w = v * k;
            let r = Rect::new(x, area.y, w, area.height);
            x += w;
            r
        })
        .collect()
}

/// Stacked along y.
pub fn slice(values: &[f64], area: Rect) -> Vec<Rect> {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.height / total } else { 0.0 };
    let mut y = area.y;
    values
        .iter()
        .map(|v| {
            let h = v * k;
            let r = Rect::new(area.x, y, area.width, h);
            y += h;
            r
        })
        .collect()
}

/// Squarified tiling. Children keep their input order.
pub fn squarify(values: &[f64], area: Rect) -> Vec<Rect> {
    let n = values.len();
    let mut out = vec![Rect::new(area.x, area.y, 0.0, 0.0); n];
    let mut value: f64 = values.iter().sum();
    if n == 0 || value <= 0.0 || area.width <= 0.0 || area.height <= 0.0 {
        return out;
    }

    let (mut x0, mut y0) = (area.x, area.y);
    let (x1, y1) = (area.x1(), area.y1());
    let mut i0 = 0;
    let mut i1 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // first non-zero value of the row
        let mut sum_value;
        loop {
            sum_value = values[i1];
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * PHI);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        while i1 < n {
            let v = values[i1];
            sum_value += v;
            min_value = min_value.min(v);
            max_value = max_value.max(v);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= v;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &values[i0..i1];
        let tiles = if dx < dy {
            let h = if value > 0.0 { dy * sum_value / value } else { dy };
            let tiles = dice(row, Rect::new(x0, y0, dx, h));
            y0 += h;
            tiles
        } else {
            let w = if value > 0.0 { dx * sum_value / value } else { dx };
            let tiles = slice(row, Rect::new(x0, y0, w, dy));
            x0 += w;
            tiles
        };
        out[i0..i1].copy_from_slice(&tiles);
        value -= sum_value;
        i0 = i1;
    }
    out
}
