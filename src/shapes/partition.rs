//! Radial partition (sunburst) layout.

use super::hierarchy::{Hierarchy, ROOT};
use crate::data_types::{ArcSlice, Point};
use std::f64::consts::TAU;

/// One slice per node, indexed like `hierarchy.nodes`.
///
/// Each depth gets a ring `radius / (max_depth + 1)` thick, so the hidden
/// root leaves a hole in the middle. A child's angular span is its share of
/// the parent's value; children of a zero-valued parent get zero spans.
pub fn partition<R>(hierarchy: &Hierarchy<R>, center: Point, radius: f64) -> Vec<ArcSlice> {
    let n = hierarchy.nodes.len();
    let mut arcs = vec![
        ArcSlice {
            center,
            ..ArcSlice::default()
        };
        n
    ];
    if n == 0 {
        return arcs;
    }
    let ring = radius.max(0.0) / (hierarchy.max_depth() + 1) as f64;
    arcs[ROOT].end_angle = TAU;
    arcs[ROOT].outer_radius = ring;

    for idx in 0..n {
        let node = &hierarchy.nodes[idx];
        let parent = arcs[idx];
        let k = if node.value > 0.0 {
            parent.span() / node.value
        } else {
            0.0
        };
        let mut angle = parent.start_angle;
        for &child in &node.children {
            let c = &hierarchy.nodes[child];
            let span = c.value.max(0.0) * k;
            arcs[child] = ArcSlice {
                center,
                inner_radius: ring * c.depth as f64,
                outer_radius: ring * (c.depth + 1) as f64,
                start_angle: angle,
                end_angle: angle + span,
                pad_angle: 0.0,
            };
            angle += span;
        }
    }
    arcs
}
