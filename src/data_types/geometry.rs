//! Drawable geometry produced by the shape generators.

use super::key::Key;
use crate::shapes::line::Curve;
use crate::theme::Color;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub type Point = DVec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn x1(&self) -> f64 {
        self.x + self.width
    }

    pub fn y1(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x1() && p.y >= self.y && p.y <= self.y1()
    }

    pub fn lerp(&self, to: &Rect, t: f64) -> Rect {
        Rect {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            height: lerp(self.height, to.height, t),
        }
    }
}

/// One slice of a pie, donut or sunburst ring.
///
/// Angles are radians measured clockwise from 12 o'clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcSlice {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub pad_angle: f64,
}

impl ArcSlice {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Interpolates angles and radii together. Geometry is rebuilt from the
    /// interpolated angles, never from a path string.
    pub fn lerp(&self, to: &ArcSlice, t: f64) -> ArcSlice {
        ArcSlice {
            center: self.center.lerp(to.center, t),
            inner_radius: lerp(self.inner_radius, to.inner_radius, t),
            outer_radius: lerp(self.outer_radius, to.outer_radius, t),
            start_angle: lerp(self.start_angle, to.start_angle, t),
            end_angle: lerp(self.end_angle, to.end_angle, t),
            pad_angle: lerp(self.pad_angle, to.pad_angle, t),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        let d = p - self.center;
        let r = d.length();
        if r < self.inner_radius || r > self.outer_radius || self.span() <= 0.0 {
            return false;
        }
        if self.span() >= TAU {
            return true;
        }
        // 12 o'clock origin, clockwise, y pointing down
        let angle = d.x.atan2(-d.y).rem_euclid(TAU);
        let start = self.start_angle.rem_euclid(TAU);
        let offset = (angle - start).rem_euclid(TAU);
        offset <= self.span()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// A polyline through data points, drawn with `curve`. When `baseline` is
/// set the path is an area closed down to that y.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub points: Vec<Point>,
    pub baseline: Option<f64>,
    pub curve: Curve,
}

impl PathSegment {
    pub fn lerp(&self, to: &PathSegment, t: f64) -> PathSegment {
        let n = self.points.len().max(to.points.len());
        let points = (0..n)
            .map(|i| point_at(&self.points, i).lerp(point_at(&to.points, i), t))
            .collect();
        let baseline = match (self.baseline, to.baseline) {
            (Some(a), Some(b)) => Some(lerp(a, b, t)),
            (_, b) => b,
        };
        PathSegment {
            points,
            baseline,
            curve: to.curve,
        }
    }

    pub fn bounds(&self) -> Rect {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }
        if let Some(b) = self.baseline {
            min.y = min.y.min(b);
            max.y = max.y.max(b);
        }
        if self.points.is_empty() {
            return Rect::default();
        }
        Rect::from_corners(min, max)
    }
}

/// Paths of different lengths are aligned by repeating the last point.
fn point_at(points: &[Point], i: usize) -> Point {
    points
        .get(i)
        .or_else(|| points.last())
        .copied()
        .unwrap_or(DVec2::ZERO)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub position: Point,
    pub text: String,
    pub anchor: TextAnchor,
}

impl Label {
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            anchor: TextAnchor::Middle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Arc(ArcSlice),
    Circle(Circle),
    Path(PathSegment),
    Label(Label),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rect(_) => "rect",
            Self::Arc(_) => "arc",
            Self::Circle(_) => "circle",
            Self::Path(_) => "path",
            Self::Label(_) => "label",
        }
    }

    /// Interpolated pose at `t`. Shapes of different kinds snap to `to`.
    pub fn lerp(&self, to: &Shape, t: f64) -> Shape {
        match (self, to) {
            (Self::Rect(a), Self::Rect(b)) => Self::Rect(a.lerp(b, t)),
            (Self::Arc(a), Self::Arc(b)) => Self::Arc(a.lerp(b, t)),
            (Self::Circle(a), Self::Circle(b)) => Self::Circle(Circle {
                center: a.center.lerp(b.center, t),
                radius: lerp(a.radius, b.radius, t),
            }),
            (Self::Path(a), Self::Path(b)) => Self::Path(a.lerp(b, t)),
            (Self::Label(a), Self::Label(b)) => Self::Label(Label {
                position: a.position.lerp(b.position, t),
                text: b.text.clone(),
                anchor: b.anchor,
            }),
            _ => to.clone(),
        }
    }

    /// Largest coordinate difference between two poses of the same kind.
    pub fn distance(&self, other: &Shape) -> f64 {
        fn max_of(values: &[f64]) -> f64 {
            values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
        }
        match (self, other) {
            (Self::Rect(a), Self::Rect(b)) => max_of(&[
                a.x - b.x,
                a.y - b.y,
                a.width - b.width,
                a.height - b.height,
            ]),
            (Self::Arc(a), Self::Arc(b)) => max_of(&[
                a.center.x - b.center.x,
                a.center.y - b.center.y,
                a.inner_radius - b.inner_radius,
                a.outer_radius - b.outer_radius,
                a.start_angle - b.start_angle,
                a.end_angle - b.end_angle,
                a.pad_angle - b.pad_angle,
            ]),
            (Self::Circle(a), Self::Circle(b)) => max_of(&[
                a.center.x - b.center.x,
                a.center.y - b.center.y,
                a.radius - b.radius,
            ]),
            (Self::Path(a), Self::Path(b)) => {
                if a.points.len() != b.points.len() || a.baseline.is_some() != b.baseline.is_some() {
                    return f64::INFINITY;
                }
                let base = max_of(&[a.baseline.unwrap_or(0.0) - b.baseline.unwrap_or(0.0)]);
                a.points
                    .iter()
                    .zip(&b.points)
                    .fold(base, |m, (p, q)| m.max((*p - *q).abs().max_element()))
            }
            (Self::Label(a), Self::Label(b)) => {
                if a.text != b.text {
                    return f64::INFINITY;
                }
                (a.position - b.position).abs().max_element()
            }
            _ => f64::INFINITY,
        }
    }

    /// Zero-size pose at the same place, used as the default enter/exit pose.
    pub fn collapsed(&self) -> Shape {
        match self {
            Self::Rect(r) => Self::Rect(Rect::new(r.x, r.y + r.height, r.width, 0.0)),
            Self::Arc(a) => Self::Arc(ArcSlice {
                end_angle: a.start_angle,
                ..*a
            }),
            Self::Circle(c) => Self::Circle(Circle {
                radius: 0.0,
                ..*c
            }),
            Self::Path(p) => {
                let y = p
                    .baseline
                    .unwrap_or_else(|| p.points.iter().map(|q| q.y).fold(f64::NEG_INFINITY, f64::max));
                Self::Path(PathSegment {
                    points: p.points.iter().map(|q| DVec2::new(q.x, y)).collect(),
                    baseline: p.baseline,
                    curve: p.curve,
                })
            }
            Self::Label(l) => Self::Label(l.clone()),
        }
    }

    /// Hidden shapes are kept in the tree but not painted or hit-tested.
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Rect(r) => r.width > 0.0 && r.height > 0.0,
            Self::Arc(a) => a.span() > 0.0 && a.outer_radius > a.inner_radius,
            Self::Circle(c) => c.radius > 0.0,
            Self::Path(p) => !p.points.is_empty(),
            Self::Label(l) => !l.text.is_empty(),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::Arc(a) => a.contains(p),
            Self::Circle(c) => c.center.distance(p) <= c.radius,
            Self::Path(path) => path.bounds().contains(p),
            Self::Label(_) => false,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Arc(a) => {
                let r = a.outer_radius;
                Rect::new(a.center.x - r, a.center.y - r, 2.0 * r, 2.0 * r)
            }
            Self::Circle(c) => Rect::new(
                c.center.x - c.radius,
                c.center.y - c.radius,
                2.0 * c.radius,
                2.0 * c.radius,
            ),
            Self::Path(p) => p.bounds(),
            Self::Label(l) => Rect::new(l.position.x, l.position.y, 0.0, 0.0),
        }
    }

    /// Where a label for this shape goes.
    pub fn anchor_point(&self) -> Point {
        match self {
            Self::Rect(r) => r.center(),
            Self::Arc(a) => crate::shapes::arc::centroid(a),
            Self::Circle(c) => c.center,
            Self::Path(p) => p.points.last().copied().unwrap_or(DVec2::ZERO),
            Self::Label(l) => l.position,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }
}

/// The computed drawable unit for one record.
#[derive(Clone, Debug)]
pub struct GeometryNode<R> {
    pub key: Key,
    /// Position of the source record in the dataset.
    pub index: usize,
    pub datum: R,
    pub shape: Shape,
    pub style: Style,
    pub label: Option<Label>,
    /// Numeric value published with pointer events.
    pub value: Option<f64>,
}

impl<R> GeometryNode<R> {
    pub fn new(key: Key, index: usize, datum: R, shape: Shape) -> Self {
        Self {
            key,
            index,
            datum,
            shape,
            style: Style::default(),
            label: None,
            value: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_label(mut self, label: Option<Label>) -> Self {
        self.label = label;
        self
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
