//! Arc generator for pie, donut and sunburst slices.

use super::path::PathData;
use crate::data_types::{ArcSlice, Point};
use d3rs::shape::{Arc, ArcDatum};
use glam::DVec2;
use std::f64::consts::TAU;

const EPSILON: f64 = 1e-9;

/// Point at `radius` and `angle`, with 12 o'clock as zero and angles
/// increasing clockwise on a y-down canvas.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    center + DVec2::new(radius * angle.sin(), -radius * angle.cos())
}

fn datum(arc: &ArcSlice) -> ArcDatum {
    ArcDatum::new()
        .inner_radius(arc.inner_radius.max(0.0))
        .outer_radius(arc.outer_radius.max(0.0))
        .start_angle(arc.start_angle)
        .end_angle(arc.end_angle)
}

/// Middle of the slice, half way between the radii.
pub fn centroid(arc: &ArcSlice) -> Point {
    let c = datum(arc).centroid();
    arc.center + DVec2::new(c.x, c.y)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcGenerator {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub pad_angle: f64,
}

impl ArcGenerator {
    pub fn new(center: Point, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            pad_angle: 0.0,
        }
    }

    pub fn with_pad_angle(mut self, pad_angle: f64) -> Self {
        self.pad_angle = pad_angle.max(0.0);
        self
    }

    pub fn slice(&self, start_angle: f64, end_angle: f64) -> ArcSlice {
        ArcSlice {
            center: self.center,
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
            start_angle,
            end_angle,
            pad_angle: self.pad_angle,
        }
    }

    /// One slice per record, angles read through the two accessors.
    pub fn arcs<R>(
        &self,
        records: &[R],
        start_angle: impl Fn(&R) -> f64,
        end_angle: impl Fn(&R) -> f64,
    ) -> Vec<ArcSlice> {
        records
            .iter()
            .map(|r| self.slice(start_angle(r), end_angle(r)))
            .collect()
    }

    pub fn path(&self, start_angle: f64, end_angle: f64) -> PathData {
        arc_path(&self.slice(start_angle, end_angle))
    }
}

/// SVG path of a slice. Zero-span slices give an empty path; a span of a
/// full turn or more draws a closed ring. The pad angle is trimmed from both
/// ends unless it would swallow the slice.
pub fn arc_path(arc: &ArcSlice) -> PathData {
    let span = arc.span();
    if span <= EPSILON || arc.outer_radius.max(0.0) <= arc.inner_radius.max(0.0) {
        return PathData::new();
    }
    let pad = if span < TAU - EPSILON && arc.pad_angle > 0.0 && span > arc.pad_angle {
        arc.pad_angle / 2.0
    } else {
        0.0
    };
    let padded = datum(arc)
        .start_angle(arc.start_angle + pad)
        .end_angle(arc.end_angle - pad);
    let path = Arc::new()
        .center(arc.center.x, arc.center.y)
        .generate(&padded);
    PathData::from(&path)
}
