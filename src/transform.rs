//! Transform helper for coordinate projection

use crate::data_types::{Margins, Point, Rect};
use crate::scales::ContinuousScale;
use glam::DVec2;

/// The drawable region of a canvas once margins are removed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margins: Margins,
}

impl PlotArea {
    pub fn new(canvas_width: f64, canvas_height: f64, margins: Margins) -> Self {
        Self {
            canvas_width,
            canvas_height,
            margins,
        }
    }

    pub fn width(&self) -> f64 {
        self.canvas_width - self.margins.left - self.margins.right
    }

    pub fn height(&self) -> f64 {
        self.canvas_height - self.margins.top - self.margins.bottom
    }

    pub fn origin(&self) -> Point {
        DVec2::new(self.margins.left, self.margins.top)
    }

    /// Inner rectangle in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.margins.left, self.margins.top, self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Largest radius that fits the inner rectangle.
    pub fn radius(&self) -> f64 {
        (self.width().min(self.height()) / 2.0).max(0.0)
    }
}

/// Projects data coordinates onto the canvas through two linear scales whose
/// ranges are relative to the plot area.
#[derive(Clone, Debug)]
pub struct PlotTransform {
    pub x_scale: ContinuousScale,
    pub y_scale: ContinuousScale,
    pub origin: Point,
}

impl PlotTransform {
    pub fn new(x_scale: ContinuousScale, y_scale: ContinuousScale, area: &PlotArea) -> Self {
        Self {
            x_scale,
            y_scale,
            origin: area.origin(),
        }
    }

    pub fn data_to_screen(&self, point: Point) -> Point {
        DVec2::new(
            self.origin.x + self.x_scale.map(point.x),
            self.origin.y + self.y_scale.map(point.y),
        )
    }

    pub fn screen_to_data(&self, point: Point) -> Point {
        DVec2::new(
            self.x_scale.invert(point.x - self.origin.x),
            self.y_scale.invert(point.y - self.origin.y),
        )
    }

    pub fn x_data_to_screen(&self, x: f64) -> f64 {
        self.origin.x + self.x_scale.map(x)
    }

    pub fn y_data_to_screen(&self, y: f64) -> f64 {
        self.origin.y + self.y_scale.map(y)
    }
}
