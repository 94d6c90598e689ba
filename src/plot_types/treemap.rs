use super::{fill_for, label_for, Layout, LayoutContext, PlotRenderer};
use crate::data_types::{require, Accessors, GeometryNode, Rect, Shape, Style, TextAnchor};
use crate::error::ChartError;
use crate::scales::ScaleSet;
use crate::shapes::hierarchy::{Hierarchy, Metric, ROOT};
use crate::shapes::treemap;
use glam::DVec2;

/// Nested rectangles sized by value; only leaves are drawn. Records may
/// carry children through the `children` accessor, and child keys are
/// `parent/child` paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreemapPlot;

impl TreemapPlot {
    pub fn new() -> Self {
        Self
    }
}

/// Index of the top-level node above `idx`.
pub(crate) fn top_level<R>(h: &Hierarchy<R>, mut idx: usize) -> usize {
    while let Some(parent) = h.nodes[idx].parent {
        if parent == ROOT {
            break;
        }
        idx = parent;
    }
    idx
}

impl<R: Clone + 'static> PlotRenderer<R> for TreemapPlot {
    fn name(&self) -> &'static str {
        "treemap"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.value, "value", "treemap").map(|_| ())
    }

    /// Rectangles grow out of their centre.
    fn enter_shape(&self, target: &Shape, _baseline: Option<f64>) -> Shape {
        match target {
            Shape::Rect(r) => {
                let c = r.center();
                Shape::Rect(Rect::new(c.x, c.y, 0.0, 0.0))
            }
            other => other.collapsed(),
        }
    }

    fn exit_shape(&self, current: &Shape, baseline: Option<f64>) -> Shape {
        <Self as PlotRenderer<R>>::enter_shape(self, current, baseline)
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let value = require(&accessors.value, "value", "treemap")?;
        let (tree, mut warnings) = Hierarchy::build(
            data,
            accessors.children.as_ref(),
            &accessors.key,
            Some(value),
            Metric::Sum,
        )?;
        if tree.root().value <= 0.0 {
            return Err(ChartError::degenerate("treemap has no positive values"));
        }

        let cfg = &ctx.config.treemap;
        let rects = treemap::treemap(&tree, ctx.area.bounds(), cfg.tiling, cfg.padding);
        let theme = &ctx.config.theme;

        let mut nodes = Vec::new();
        for (idx, node) in tree.leaves() {
            let Some(record) = &node.datum else {
                continue;
            };
            let order = nodes.len();
            let group = tree.nodes[top_level(&tree, idx)].key.to_string();
            let fill = fill_for(accessors, ctx.colors, &group, order, record, &mut warnings);
            let rect = rects[idx];
            let shape = Shape::Rect(rect);
            // labels sit in the top-left corner of visible tiles
            let corner = DVec2::new(rect.x + 4.0, rect.y + theme.label_size + 2.0);
            let label = if rect.area() > 0.0 {
                label_for(accessors, ctx.config, order, record, Some(node.value), corner, &mut warnings)
            } else {
                None
            };
            let label = label.map(|mut l| {
                l.anchor = TextAnchor::Start;
                l
            });
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
