use crate::data_types::{lerp, Shape};
use crate::theme::Color;

/// An animatable attribute value.
///
/// Shapes interpolate structurally: arcs through their angles and radii,
/// rects through their corners, paths point by point.
#[derive(Clone, Debug, PartialEq)]
pub enum Tween {
    Scalar(f64),
    Shape(Shape),
    Color(Color),
}

impl Tween {
    /// Value at eased progress `t`. Values of different kinds snap to `to`.
    pub fn lerp(&self, to: &Tween, t: f64) -> Tween {
        match (self, to) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(lerp(*a, *b, t)),
            (Self::Shape(a), Self::Shape(b)) => Self::Shape(a.lerp(b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(*b, t)),
            _ => to.clone(),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<f64> for Tween {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Shape> for Tween {
    fn from(s: Shape) -> Self {
        Self::Shape(s)
    }
}

impl From<Color> for Tween {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}
