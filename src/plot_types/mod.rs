// Plot types module

pub mod bar;
pub mod line;
pub mod pie;
pub mod scatter;
pub mod stacked_bar;
pub mod sunburst;
pub mod treemap;

pub use bar::BarPlot;
pub use line::LinePlot;
pub use pie::PiePlot;
pub use scatter::ScatterPlot;
pub use stacked_bar::StackedBarPlot;
pub use sunburst::SunburstPlot;
pub use treemap::TreemapPlot;

use crate::data_types::{
    Accessor, Accessors, ChartConfig, GeometryNode, Key, Label, Point, Rect, Shape, Value,
};
use crate::error::{AccessorError, ChartError};
use crate::scales::{format_number, ScaleSet};
use crate::theme::{Color, ColorScale};
use crate::transform::PlotArea;

/// Everything a layout needs besides the data.
pub struct LayoutContext<'a> {
    pub config: &'a ChartConfig,
    pub area: PlotArea,
    /// Colours handed out so far, kept across renders.
    pub colors: &'a mut ColorScale,
}

/// Geometry for one render pass.
#[derive(Clone, Debug)]
pub struct Layout<R> {
    /// In dataset order, which is also paint order.
    pub nodes: Vec<GeometryNode<R>>,
    pub scales: ScaleSet,
    /// Pixel y of the value zero, for charts that grow from an axis.
    pub baseline: Option<f64>,
    /// Records skipped because an accessor failed.
    pub warnings: Vec<ChartError>,
}

impl<R> Layout<R> {
    pub fn new(scales: ScaleSet) -> Self {
        Self {
            nodes: Vec::new(),
            scales,
            baseline: None,
            warnings: Vec::new(),
        }
    }
}

/// Trait for chart kinds: turns records into geometry.
pub trait PlotRenderer<R> {
    fn name(&self) -> &'static str;

    /// Checks that the accessors the kind needs are present.
    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError>;

    /// Computes scales and one node per drawable record. Empty or unusable
    /// data is reported as [`ChartError::DegenerateDomain`].
    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError>;

    /// Pose an entering element starts from.
    fn enter_shape(&self, target: &Shape, baseline: Option<f64>) -> Shape {
        collapse_to_baseline(target, baseline)
    }

    /// Pose an exiting element ends at.
    fn exit_shape(&self, current: &Shape, baseline: Option<f64>) -> Shape {
        collapse_to_baseline(current, baseline)
    }
}

/// Rects flatten onto the baseline when there is one; everything else
/// collapses in place.
pub fn collapse_to_baseline(shape: &Shape, baseline: Option<f64>) -> Shape {
    match (shape, baseline) {
        (Shape::Rect(r), Some(y)) => Shape::Rect(Rect::new(r.x, y, r.width, 0.0)),
        _ => shape.collapsed(),
    }
}

/// Reads one accessor, turning a failure into a warning.
pub(crate) fn read<R: 'static, V: 'static>(
    accessor: &Accessor<R, V>,
    role: &'static str,
    index: usize,
    record: &R,
    warnings: &mut Vec<ChartError>,
) -> Option<V> {
    match accessor.read(role, index, record) {
        Ok(v) => Some(v),
        Err(e) => {
            warnings.push(e);
            None
        }
    }
}

/// Like [`read`], but non-finite numbers are failures too.
pub(crate) fn read_finite<R: 'static>(
    accessor: &Accessor<R, f64>,
    role: &'static str,
    index: usize,
    record: &R,
    warnings: &mut Vec<ChartError>,
) -> Option<f64> {
    let v = read(accessor, role, index, record, warnings)?;
    if v.is_finite() {
        Some(v)
    } else {
        warnings.push(ChartError::Accessor {
            role,
            index,
            source: AccessorError::new(format!("{v} is not a finite number")),
        });
        None
    }
}

pub(crate) fn read_number<R: 'static>(
    accessor: &Accessor<R, Value>,
    role: &'static str,
    index: usize,
    record: &R,
    warnings: &mut Vec<ChartError>,
) -> Option<f64> {
    let v = read(accessor, role, index, record, warnings)?;
    match v.as_number() {
        Some(n) if n.is_finite() => Some(n),
        _ => {
            warnings.push(ChartError::Accessor {
                role,
                index,
                source: AccessorError::new(format!("{v:?} is not a number")),
            });
            None
        }
    }
}

pub(crate) fn key_for<R: 'static>(
    accessors: &Accessors<R>,
    index: usize,
    record: &R,
    warnings: &mut Vec<ChartError>,
) -> Option<Key> {
    match accessors.key.key_of(index, record) {
        Ok(k) => Some(k),
        Err(e) => {
            warnings.push(e);
            None
        }
    }
}

/// Colour from the colour accessor, else from the ordinal palette by
/// `group`. A failing colour accessor falls back to the palette.
pub(crate) fn fill_for<R: 'static>(
    accessors: &Accessors<R>,
    colors: &mut ColorScale,
    group: &str,
    index: usize,
    record: &R,
    warnings: &mut Vec<ChartError>,
) -> Color {
    accessors
        .color
        .as_ref()
        .and_then(|c| read(c, "color", index, record, warnings))
        .unwrap_or_else(|| colors.color_for(group))
}

/// Label at `anchor` when labels are on: the label accessor's text, or the
/// formatted value when there is no label accessor.
pub(crate) fn label_for<R: 'static>(
    accessors: &Accessors<R>,
    config: &ChartConfig,
    index: usize,
    record: &R,
    value: Option<f64>,
    anchor: Point,
    warnings: &mut Vec<ChartError>,
) -> Option<Label> {
    if !config.show_labels {
        return None;
    }
    let text = match &accessors.label {
        Some(acc) => read(acc, "label", index, record, warnings)?,
        None => format_number(value?),
    };
    Some(Label::new(anchor, text))
}
