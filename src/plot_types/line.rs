use super::{
    fill_for, key_for, label_for, read, read_finite, read_number, Layout, LayoutContext,
    PlotRenderer,
};
use crate::data_types::{require, Accessors, Circle, GeometryNode, Key, PathSegment, Shape, Style};
use crate::error::ChartError;
use crate::scales::{extent, ChartScale, ContinuousScale, ScaleSet};
use crate::transform::PlotTransform;
use glam::DVec2;
use indexmap::IndexMap;

/// Line or area through the records in input order; one path per series.
///
/// Paths are keyed `line:<series>` and markers by record key.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinePlot;

impl LinePlot {
    pub fn new() -> Self {
        Self
    }

    pub fn path_key(series: &str) -> Key {
        Key::Field(format!("line:{series}"))
    }
}

impl<R: Clone + 'static> PlotRenderer<R> for LinePlot {
    fn name(&self) -> &'static str {
        "line"
    }

    fn validate(&self, accessors: &Accessors<R>) -> Result<(), ChartError> {
        require(&accessors.x, "x", "line")?;
        require(&accessors.y, "y", "line")?;
        Ok(())
    }

    fn layout(
        &self,
        data: &[R],
        accessors: &Accessors<R>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Layout<R>, ChartError> {
        let x = require(&accessors.x, "x", "line")?;
        let y = require(&accessors.y, "y", "line")?;
        let cfg = &ctx.config.line;
        let mut warnings = Vec::new();

        // series name -> points as (index, marker key, x, y)
        let mut series: IndexMap<String, Vec<(usize, Option<Key>, f64, f64)>> = IndexMap::new();
        for (i, record) in data.iter().enumerate() {
            let Some(xv) = read_number(x, "x", i, record, &mut warnings) else {
                continue;
            };
            let Some(yv) = read_finite(y, "y", i, record, &mut warnings) else {
                continue;
            };
            let name = match &accessors.series {
                Some(s) => match read(s, "series", i, record, &mut warnings) {
                    Some(name) => name,
                    None => continue,
                },
                None => String::new(),
            };
            let key = if cfg.markers {
                match key_for(accessors, i, record, &mut warnings) {
                    Some(k) => Some(k),
                    None => continue,
                }
            } else {
                None
            };
            series.entry(name).or_default().push((i, key, xv, yv));
        }
        if series.is_empty() {
            return Err(ChartError::degenerate("line chart has no drawable points"));
        }

        let all = || series.values().flatten();
        let (x0, x1) = extent(all().map(|p| p.2)).unwrap_or((0.0, 0.0));
        let ys = all().map(|p| p.3);
        let y_extent = if cfg.area {
            extent(ys.chain([0.0]))
        } else {
            extent(ys)
        };
        let (y0, y1) = y_extent.unwrap_or((0.0, 0.0));
        let area = ctx.area;
        let x_scale = ContinuousScale::new((x0, x1), (0.0, area.width()))?;
        let y_scale = ContinuousScale::new((y0, y1), (area.height(), 0.0))?;
        let transform = PlotTransform::new(x_scale.clone(), y_scale.clone(), &area);
        let baseline = transform.y_data_to_screen(0.0_f64.clamp(y0, y1));

        let theme = &ctx.config.theme;
        let mut nodes = Vec::new();
        for (name, points) in &series {
            let Some(&(first, ..)) = points.first() else {
                continue;
            };
            let record = &data[first];
            let color = fill_for(accessors, ctx.colors, name, first, record, &mut warnings);
            let screen: Vec<_> = points
                .iter()
                .map(|p| transform.data_to_screen(DVec2::new(p.2, p.3)))
                .collect();
            let segment = PathSegment {
                points: screen.clone(),
                baseline: cfg.area.then_some(baseline),
                curve: cfg.curve,
            };
            let style = if cfg.area {
                Style::filled(color.alpha(0.35)).with_stroke(color, cfg.line_width)
            } else {
                Style::stroked(color, cfg.line_width)
            };
            nodes.push(
                GeometryNode::new(Self::path_key(name), first, record.clone(), Shape::Path(segment))
                    .with_style(style),
            );

            if cfg.markers {
                for (p, pos) in points.iter().zip(screen) {
                    let (i, Some(key), _, yv) = p.clone() else {
                        continue;
                    };
                    let record = &data[i];
                    let shape = Shape::Circle(Circle {
                        center: pos,
                        radius: ctx.config.point_radius,
                    });
                    let above = pos - DVec2::new(0.0, ctx.config.point_radius + 4.0);
                    let label =
                        label_for(accessors, ctx.config, i, record, Some(yv), above, &mut warnings);
                    nodes.push(
                        GeometryNode::new(key, i, record.clone(), shape)
                            .with_style(Style::filled(color).with_stroke(theme.stroke, theme.stroke_width))
                            .with_value(yv)
                            .with_label(label),
                    );
                }
            }
        }

        Ok(Layout {
            nodes,
            scales: ScaleSet {
                x: Some(ChartScale::Linear(x_scale)),
                y: Some(ChartScale::Linear(y_scale)),
            },
            baseline: Some(baseline),
            warnings,
        })
    }
}
