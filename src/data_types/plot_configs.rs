use super::accessor::Accessors;
use crate::error::ChartError;
use crate::shapes::hierarchy::Metric;
use crate::shapes::line::Curve;
use crate::shapes::treemap::Tiling;
use crate::theme::ChartTheme;
use crate::transform::PlotArea;
use crate::transition::Easing;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 30.0,
            left: 40.0,
        }
    }
}

impl Margins {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieConfig {
    /// Inner radius as a fraction of the outer radius. Donuts use `> 0`.
    pub inner_radius_ratio: f64,
    pub start_angle: f64,
    /// Total angle shared by all slices.
    pub span: f64,
    pub pad_angle: f64,
    /// Sort slices by descending value instead of input order.
    pub sort: bool,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            inner_radius_ratio: 0.0,
            start_angle: 0.0,
            span: TAU,
            pad_angle: 0.0,
            sort: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub curve: Curve,
    /// Fill down to the y = 0 baseline.
    pub area: bool,
    /// Draw a dot per record on top of the line.
    pub markers: bool,
    pub line_width: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            curve: Curve::Linear,
            area: false,
            markers: false,
            line_width: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    pub tiling: Tiling,
    /// Gap between sibling rectangles, in pixels.
    pub padding: f64,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            tiling: Tiling::Squarify,
            padding: 1.0,
        }
    }
}

/// Upper bound for `transition_duration_ms` and `stagger_ms`: one hour.
pub const MAX_DURATION_MS: f64 = 3_600_000.0;

/// Every non-function option a chart understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margins: Margins,
    pub show_labels: bool,
    pub transition_duration_ms: f64,
    pub easing: Easing,
    /// Extra delay per element, in input order.
    pub stagger_ms: f64,
    pub band_padding: f64,
    /// Marker radius for scatter and line charts. Scatter charts with a
    /// value accessor use it as the maximum radius.
    pub point_radius: f64,
    pub pie: PieConfig,
    pub line: LineConfig,
    pub treemap: TreemapConfig,
    pub sunburst_metric: Metric,
    /// Prefix for published topics, e.g. `sales` gives `sales:hover`.
    pub topic_prefix: Option<String>,
    pub no_data_text: String,
    pub theme: ChartTheme,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            canvas_width: 0.0,
            canvas_height: 0.0,
            margins: Margins::default(),
            show_labels: false,
            transition_duration_ms: 500.0,
            easing: Easing::CubicInOut,
            stagger_ms: 0.0,
            band_padding: 0.1,
            point_radius: 4.0,
            pie: PieConfig::default(),
            line: LineConfig::default(),
            treemap: TreemapConfig::default(),
            sunburst_metric: Metric::Sum,
            topic_prefix: None,
            no_data_text: "No data".to_string(),
            theme: ChartTheme::default(),
        }
    }
}

impl ChartConfig {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> eyre::Result<Self> {
        serde_json::from_str(json).wrap_err("failed to parse chart configuration")
    }

    pub fn to_json(&self) -> eyre::Result<String> {
        serde_json::to_string_pretty(self).wrap_err("failed to serialize chart configuration")
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ChartError::configuration(format!(
                "canvas must have a positive size, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        let area = self.plot_area();
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return Err(ChartError::configuration("margins leave no room to draw"));
        }
        if !(0.0..1.0).contains(&self.band_padding) {
            return Err(ChartError::configuration(format!(
                "band padding must be in [0, 1), got {}",
                self.band_padding
            )));
        }
        for (name, ms) in [
            ("transition_duration_ms", self.transition_duration_ms),
            ("stagger_ms", self.stagger_ms),
        ] {
            if !(0.0..=MAX_DURATION_MS).contains(&ms) {
                return Err(ChartError::configuration(format!(
                    "{name} must be in [0, {MAX_DURATION_MS}], got {ms}"
                )));
            }
        }
        Ok(())
    }

    pub fn plot_area(&self) -> PlotArea {
        PlotArea::new(self.canvas_width, self.canvas_height, self.margins)
    }

    /// Full topic name for a chart event.
    pub fn topic(&self, name: &str) -> String {
        match &self.topic_prefix {
            Some(prefix) => format!("{prefix}:{name}"),
            None => name.to_string(),
        }
    }
}

/// Configuration plus accessors: everything a chart is built from.
pub struct ChartOptions<R> {
    pub config: ChartConfig,
    pub accessors: Accessors<R>,
}

impl<R> ChartOptions<R> {
    pub fn new(config: ChartConfig, accessors: Accessors<R>) -> Self {
        Self { config, accessors }
    }
}

impl<R> Clone for ChartOptions<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            accessors: self.accessors.clone(),
        }
    }
}
