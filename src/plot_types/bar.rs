use super::{fill_for, key_for, label_for, read, read_finite, Layout, LayoutContext, PlotRenderer};
use crate::data_types::{require, Accessors, GeometryNode, Rect, Shape, Style};
use crate::error::ChartError;
use crate::scales::{extent, BandScale, ChartScale, ContinuousScale, ScaleSet};
use indexmap::IndexSet;

/// Vertical bars: categorical x, numeric y, growing from zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct BarPlot;

impl BarPlot {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for BarPlot {
    fn name(&self) -> &'static str {
        "bar"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.x, "x", "bar")?;
        require(&accessors.y, "y", "bar")?;
        Ok(())
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let x = require(&accessors.x, "x", "bar")?;
        let y = require(&accessors.y, "y", "bar")?;
        let mut warnings = Vec::new();

        let mut rows = Vec::with_capacity(data.len());
        for (i, record) in data.iter().enumerate() {
            let Some(key) = key_for(accessors, i, record, &mut warnings) else {
                continue;
            };
            let Some(category) = read(x, "x", i, record, &mut warnings) else {
                continue;
            };
            let Some(value) = read_finite(y, "y", i, record, &mut warnings) else {
                continue;
            };
            rows.push((i, key, category.as_category(), value));
        }
        if rows.is_empty() {
            return Err(ChartError::degenerate("bar chart has no drawable records"));
        }

        let area = ctx.area;
        let categories: IndexSet<&str> = rows.iter().map(|(_, _, c, _)| c.as_str()).collect();
        let x_scale = BandScale::new(categories, (0.0, area.width()), ctx.config.band_padding)?;
        let (lo, hi) = extent(rows.iter().map(|r| r.3).chain([0.0])).unwrap_or((0.0, 0.0));
        let y_scale = ContinuousScale::new((lo, hi), (area.height(), 0.0))?;

        let origin = area.origin();
        let baseline = origin.y + y_scale.map(0.0);
        let width = x_scale.bandwidth();

        let mut nodes = Vec::with_capacity(rows.len());
        for (i, key, category, value) in rows {
            let record = &data[i];
            let Some(start) = x_scale.map(&category) else {
                continue;
            };
            let top = origin.y + y_scale.map(value);
            let rect = Rect::new(
                origin.x + start,
                top.min(baseline),
                width,
                (top - baseline).abs(),
            );
            let fill = fill_for(accessors, ctx.colors, &category, i, record, &mut warnings);
            let shape = Shape::Rect(rect);
            let label = label_for(
                accessors,
                ctx.config,
                i,
                record,
                Some(value),
                shape.anchor_point(),
                &mut warnings,
            );
            nodes.push(
                GeometryNode::new(key, i, record.clone(), shape)
                    .with_style(Style::filled(fill))
                    .with_value(value)
                    .with_label(label),
            );
        }

        Ok(Layout {
            nodes,
            scales: ScaleSet {
                x: Some(ChartScale::Band(x_scale)),
                y: Some(ChartScale::Linear(y_scale)),
            },
            baseline: Some(baseline),
            warnings,
        })
    }
}
