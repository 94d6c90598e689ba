use super::{fill_for, key_for, label_for, read, read_finite, Layout, LayoutContext, PlotRenderer};
use crate::data_types::{require, Accessors, GeometryNode, Rect, Shape, Style};
use crate::error::ChartError;
use crate::scales::{BandScale, ChartScale, ContinuousScale, ScaleSet};
use crate::shapes::{stack, StackSeries, StackValue};
use indexmap::{IndexMap, IndexSet};

/// Bars split into one band per series, stacked in series order. Negative
/// values stack downwards from zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackedBarPlot;

impl StackedBarPlot {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for StackedBarPlot {
    fn name(&self) -> &'static str {
        "stacked bar"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.x, "x", "stacked bar")?;
        require(&accessors.y, "y", "stacked bar")?;
        require(&accessors.series, "series", "stacked bar")?;
        Ok(())
    }

    /// Each band grows from its own lower edge so the stack stays tidy.
    fn enter_shape(&self, target: &Shape, _baseline: Option<f64>) -> Shape {
        target.collapsed()
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let x = require(&accessors.x, "x", "stacked bar")?;
        let y = require(&accessors.y, "y", "stacked bar")?;
        let series_of = require(&accessors.series, "series", "stacked bar")?;
        let mut warnings = Vec::new();

        // series -> rows as (index, key, category, value)
        let mut groups: IndexMap<String, Vec<_>> = IndexMap::new();
        for (i, record) in data.iter().enumerate() {
            let Some(key) = key_for(accessors, i, record, &mut warnings) else {
                continue;
            };
            let Some(category) = read(x, "x", i, record, &mut warnings) else {
                continue;
            };
            let Some(series) = read(series_of, "series", i, record, &mut warnings) else {
                continue;
            };
            let Some(value) = read_finite(y, "y", i, record, &mut warnings) else {
                continue;
            };
            groups
                .entry(series)
                .or_default()
                .push((i, key, category.as_category(), value));
        }
        if groups.is_empty() {
            return Err(ChartError::degenerate("stacked bar chart has no drawable records"));
        }

        let input: Vec<StackSeries> = groups
            .iter()
            .map(|(name, rows)| {
                StackSeries::new(
                    name.clone(),
                    rows.iter().map(|(_, _, c, v)| StackValue::new(c.clone(), *v)).collect(),
                )
            })
            .collect();
        let stacked = stack(&input);

        let area = ctx.area;
        let categories: IndexSet<&str> = stacked.ids.iter().map(String::as_str).collect();
        let x_scale = BandScale::new(categories, (0.0, area.width()), ctx.config.band_padding)?;
        let y_scale = ContinuousScale::new(stacked.extent(), (area.height(), 0.0))?;
        let origin = area.origin();
        let baseline = origin.y + y_scale.map(0.0);

        let mut nodes = Vec::new();
        for ((name, rows), bands) in groups.into_iter().zip(&stacked.bands) {
            for ((i, key, category, value), band) in rows.into_iter().zip(bands) {
                let record = &data[i];
                let Some(start) = x_scale.map(&category) else {
                    continue;
                };
                let top = origin.y + y_scale.map(band.high());
                let bottom = origin.y + y_scale.map(band.low());
                let shape = Shape::Rect(Rect::new(
                    origin.x + start,
                    top,
                    x_scale.bandwidth(),
                    bottom - top,
                ));
                let fill = fill_for(accessors, ctx.colors, &name, i, record, &mut warnings);
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
        }
        // paint in dataset order
        nodes.sort_by_key(|n| n.index);

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
