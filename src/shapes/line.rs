//! Line and area path generation.

use super::path::PathData;
use crate::data_types::{PathSegment, Point};
use d3rs::shape::{Curve as D3Curve, Point as D3Point};
use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// Vertical move first, then horizontal.
    Before,
    /// Horizontal moves meet half way between the points.
    Middle,
    /// Horizontal move first, then vertical.
    #[default]
    After,
}

/// Interpolation between consecutive points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    #[default]
    Linear,
    Step(StepMode),
    /// Cardinal spline through every point; tension 0 is Catmull-Rom-like,
    /// tension 1 gives straight segments.
    Cardinal(f64),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineGenerator {
    pub curve: Curve,
}

impl LineGenerator {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    /// Open path through `points`. Fewer than one point gives an empty path.
    pub fn line(&self, points: &[Point]) -> PathData {
        let mut path = PathData::new();
        if let Some(first) = points.first() {
            path.move_to(*first);
            self.trace(&mut path, points);
        }
        path
    }

    /// Closed area between the curve and a horizontal baseline.
    pub fn area(&self, points: &[Point], baseline: f64) -> PathData {
        let mut path = PathData::new();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return path;
        };
        path.move_to(DVec2::new(first.x, baseline));
        path.line_to(*first);
        self.trace(&mut path, points);
        path.line_to(DVec2::new(last.x, baseline));
        path.close();
        path
    }

    /// Appends segments from `points[0]` to the end; the pen is already at
    /// the first point. Smooth curves are flattened by d3rs into short
    /// straight runs.
    fn trace(&self, path: &mut PathData, points: &[Point]) {
        let input: Vec<D3Point> = points.iter().map(|p| D3Point::new(p.x, p.y)).collect();
        let mut pen = points[0];
        for p in self.curve.to_d3().interpolate(&input).iter().skip(1) {
            let p = DVec2::new(p.x, p.y);
            // step curves repeat corner points
            if p != pen {
                path.line_to(p);
                pen = p;
            }
        }
    }
}

impl Curve {
    fn to_d3(self) -> D3Curve {
        match self {
            Self::Linear => D3Curve::linear(),
            Self::Step(StepMode::Before) => D3Curve::StepBefore,
            Self::Step(StepMode::Middle) => D3Curve::Step,
            Self::Step(StepMode::After) => D3Curve::StepAfter,
            Self::Cardinal(tension) => D3Curve::cardinal(tension),
        }
    }
}

/// Path data for a line or area segment.
pub fn path_for(segment: &PathSegment) -> PathData {
    let gen = LineGenerator::new(segment.curve);
    match segment.baseline {
        Some(base) => gen.area(&segment.points, base),
        None => gen.line(&segment.points),
    }
}
