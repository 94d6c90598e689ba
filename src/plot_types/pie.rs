use super::{fill_for, key_for, label_for, read, Layout, LayoutContext, PlotRenderer};
use crate::data_types::{require, Accessors, GeometryNode, Shape, Style};
use crate::error::ChartError;
use crate::scales::ScaleSet;
use crate::shapes::{ArcGenerator, PieLayout};

/// Pie, or donut when `pie.inner_radius_ratio > 0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PiePlot;

impl PiePlot {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for PiePlot {
    fn name(&self) -> &'static str {
        "pie"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.value, "value", "pie").map(|_| ())
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let value = require(&accessors.value, "value", "pie")?;
        let mut warnings = Vec::new();

        let mut rows = Vec::with_capacity(data.len());
        for (i, record) in data.iter().enumerate() {
            let Some(key) = key_for(accessors, i, record, &mut warnings) else {
                continue;
            };
            let Some(v) = read(value, "value", i, record, &mut warnings) else {
                continue;
            };
            rows.push((i, key, v));
        }
        if !rows.iter().any(|(_, _, v)| v.is_finite() && *v > 0.0) {
            return Err(ChartError::degenerate("pie chart has no positive values"));
        }

        let cfg = &ctx.config.pie;
        let pie = PieLayout {
            start_angle: cfg.start_angle,
            span: cfg.span,
            sort: cfg.sort,
        };
        let values: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let slices = pie.layout(&values);

        let outer = ctx.area.radius();
        let arcs = ArcGenerator::new(ctx.area.center(), outer * cfg.inner_radius_ratio.clamp(0.0, 1.0), outer)
            .with_pad_angle(cfg.pad_angle);
        let theme = &ctx.config.theme;

        let mut nodes = Vec::with_capacity(rows.len());
        for ((i, key, v), slice) in rows.into_iter().zip(slices) {
            let record = &data[i];
            let shape = Shape::Arc(arcs.slice(slice.start_angle, slice.end_angle));
            let fill = fill_for(accessors, ctx.colors, &key.to_string(), i, record, &mut warnings);
            let label = if slice.span() > 0.0 {
                label_for(accessors, ctx.config, i, record, Some(v), shape.anchor_point(), &mut warnings)
            } else {
                None
            };
            nodes.push(
                GeometryNode::new(key, i, record.clone(), shape)
                    .with_style(Style::filled(fill).with_stroke(theme.stroke, theme.stroke_width))
                    .with_value(v)
                    .with_label(label),
            );
        }

        Ok(Layout {
            nodes,
            scales: ScaleSet::default(),
            baseline: None,
            warnings,
        })
    }
}
