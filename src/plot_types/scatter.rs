use super::{
    fill_for, key_for, label_for, read_finite, read_number, Layout, LayoutContext, PlotRenderer,
};
use crate::data_types::{require, Accessors, Circle, GeometryNode, Shape, Style};
use crate::error::ChartError;
use crate::scales::{extent, ChartScale, ContinuousScale, ScaleSet};
use crate::transform::PlotTransform;
use glam::DVec2;

/// One dot per record. With a value accessor the dot area is proportional
/// to the value and `point_radius` is the largest radius.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScatterPlot;

impl ScatterPlot {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for ScatterPlot {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.x, "x", "scatter")?;
        require(&accessors.y, "y", "scatter")?;
        Ok(())
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let x = require(&accessors.x, "x", "scatter")?;
        let y = require(&accessors.y, "y", "scatter")?;
        let mut warnings = Vec::new();

        let mut rows = Vec::with_capacity(data.len());
        for (i, record) in data.iter().enumerate() {
            let Some(key) = key_for(accessors, i, record, &mut warnings) else {
                continue;
            };
            let Some(xv) = read_number(x, "x", i, record, &mut warnings) else {
                continue;
            };
            let Some(yv) = read_finite(y, "y", i, record, &mut warnings) else {
                continue;
            };
            let size = match &accessors.value {
                Some(v) => match read_finite(v, "value", i, record, &mut warnings) {
                    Some(v) => Some(v.max(0.0)),
                    None => continue,
                },
                None => None,
            };
            rows.push((i, key, xv, yv, size));
        }
        if rows.is_empty() {
            return Err(ChartError::degenerate("scatter chart has no drawable points"));
        }

        let (x0, x1) = extent(rows.iter().map(|r| r.2)).unwrap_or((0.0, 0.0));
        let (y0, y1) = extent(rows.iter().map(|r| r.3)).unwrap_or((0.0, 0.0));
        let max_size = rows.iter().filter_map(|r| r.4).fold(0.0_f64, f64::max);
        let area = ctx.area;
        let x_scale = ContinuousScale::new((x0, x1), (0.0, area.width()))?;
        let y_scale = ContinuousScale::new((y0, y1), (area.height(), 0.0))?;
        let transform = PlotTransform::new(x_scale.clone(), y_scale.clone(), &area);
        let max_radius = ctx.config.point_radius;

        let mut nodes = Vec::with_capacity(rows.len());
        for (i, key, xv, yv, size) in rows {
            let record = &data[i];
            let radius = match size {
                Some(s) if max_size > 0.0 => max_radius * (s / max_size).sqrt(),
                Some(_) => 0.0,
                None => max_radius,
            };
            let center = transform.data_to_screen(DVec2::new(xv, yv));
            // one palette colour unless the caller colours points
            let fill = fill_for(accessors, ctx.colors, "", i, record, &mut warnings);
            let shown = size.or(Some(yv));
            let label = label_for(accessors, ctx.config, i, record, shown, center, &mut warnings);
            nodes.push(
                GeometryNode::new(key, i, record.clone(), Shape::Circle(Circle { center, radius }))
                    .with_style(Style::filled(fill.alpha(0.8)))
                    .with_value(size.unwrap_or(yv))
                    .with_label(label),
            );
        }

        Ok(Layout {
            nodes,
            scales: ScaleSet {
                x: Some(ChartScale::Linear(x_scale)),
                y: Some(ChartScale::Linear(y_scale)),
            },
            baseline: None,
            warnings,
        })
    }
}
