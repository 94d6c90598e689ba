use super::treemap::top_level;
use super::{fill_for, label_for, Layout, LayoutContext, PlotRenderer};
use crate::data_types::{require, Accessors, GeometryNode, Shape, Style};
use crate::error::ChartError;
use crate::scales::ScaleSet;
use crate::shapes::hierarchy::{Hierarchy, Metric};
use crate::shapes::partition;

/// Radial partition of a hierarchy. Every node but the root gets a ring
/// slice; inner rings are ancestors.
#[derive(Clone, Copy, Debug, Default)]
pub struct SunburstPlot;

impl SunburstPlot {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for SunburstPlot {
    fn name(&self) -> &'static str {
        "sunburst"
    }

    fn validate(&self, _accessors: &Accessors<R>) -> Result<(), ChartError> {
        // the value accessor is only needed for the sum metric
        Ok(())
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let metric = ctx.config.sunburst_metric;
        let value = match metric {
            Metric::Sum => Some(require(&accessors.value, "value", "sunburst")?),
            Metric::Count => None,
        };
        let (tree, mut warnings) = Hierarchy::build(
            data,
            accessors.children.as_ref(),
            &accessors.key,
            value,
            metric,
        )?;
        if tree.root().value <= 0.0 {
            return Err(ChartError::degenerate("sunburst has nothing to partition"));
        }

        let arcs = partition(&tree, ctx.area.center(), ctx.area.radius());
        let theme = &ctx.config.theme;

        let mut nodes = Vec::new();
        for (idx, node) in tree.descendants() {
            let Some(record) = &node.datum else {
                continue;
            };
            let order = nodes.len();
            let group = tree.nodes[top_level(&tree, idx)].key.to_string();
            let base = fill_for(accessors, ctx.colors, &group, order, record, &mut warnings);
            // deeper rings fade out
            let fill = base.alpha((1.0 - 0.15 * (node.depth as f32 - 1.0)).max(0.35));
            let shape = Shape::Arc(arcs[idx]);
            let label = if arcs[idx].span() > 0.0 {
                label_for(accessors, ctx.config, order, record, Some(node.value), shape.anchor_point(), &mut warnings)
            } else {
                None
            };
            nodes.push(
                GeometryNode::new(node.key.clone(), order, record.clone(), shape)
                    .with_style(Style::filled(fill).with_stroke(theme.stroke, theme.stroke_width))
                    .with_value(node.value)
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
