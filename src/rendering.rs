// Rendering of the visual tree into backend-neutral paint primitives

use crate::data_types::{Circle, Label, Point, Rect, Shape, Style, TextAnchor};
use crate::scales::format_number;
use crate::shapes::{arc_path, path_for, PathData};
use crate::theme::{ChartTheme, Color};
use crate::visual::VisualTree;
use std::fmt::Write;

/// One thing to paint, already resolved to pixels and final colours.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Quad {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    Path {
        data: PathData,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    Text {
        label: Label,
        color: Color,
        size: f64,
    },
}

/// Paint list of one frame, back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<Primitive>,
}

fn faded(color: Option<Color>, opacity: f64) -> Option<Color> {
    color
        .map(|c| c.alpha(c.a * opacity.clamp(0.0, 1.0) as f32))
        .filter(|c| c.a > 0.0)
}

fn stroke_of(style: &Style, opacity: f64) -> Option<(Color, f64)> {
    if style.stroke_width <= 0.0 {
        return None;
    }
    faded(style.stroke, opacity).map(|c| (c, style.stroke_width))
}

/// Closed circle outline as two half arcs.
pub fn circle_path(circle: &Circle) -> PathData {
    let Circle { center, radius } = *circle;
    let mut path = PathData::new();
    path.move_to(Point::new(center.x - radius, center.y));
    path.arc_to(radius, false, true, Point::new(center.x + radius, center.y));
    path.arc_to(radius, false, true, Point::new(center.x - radius, center.y));
    path.close();
    path
}

impl Scene {
    /// Paints every visible element at its current pose, then the labels of
    /// elements that are not leaving, then the placeholder text.
    pub fn build<R>(
        tree: &VisualTree<R>,
        width: f64,
        height: f64,
        placeholder: Option<&Label>,
        theme: &ChartTheme,
    ) -> Self {
        let mut primitives = Vec::with_capacity(tree.len());
        for element in tree.iter() {
            if !element.shape.is_visible() || element.opacity <= 0.0 {
                continue;
            }
            let opacity = element.opacity * element.style.opacity;
            let fill = faded(element.style.fill, opacity);
            let stroke = stroke_of(&element.style, opacity);
            let primitive = match &element.shape {
                Shape::Rect(rect) => Primitive::Quad {
                    rect: *rect,
                    fill,
                    stroke,
                },
                Shape::Arc(arc) => Primitive::Path {
                    data: arc_path(arc),
                    fill,
                    stroke,
                },
                Shape::Circle(circle) => Primitive::Path {
                    data: circle_path(circle),
                    fill,
                    stroke,
                },
                Shape::Path(segment) => Primitive::Path {
                    data: path_for(segment),
                    // open lines are never filled
                    fill: if segment.baseline.is_some() { fill } else { None },
                    stroke,
                },
                Shape::Label(label) => Primitive::Text {
                    label: label.clone(),
                    color: faded(Some(theme.label), opacity).unwrap_or(Color::TRANSPARENT),
                    size: theme.label_size,
                },
            };
            primitives.push(primitive);
        }

        for element in tree.iter().filter(|e| !e.is_exiting()) {
            if let Some(label) = &element.label {
                let color = faded(Some(theme.label), element.opacity);
                if let Some(color) = color {
                    primitives.push(Primitive::Text {
                        label: label.clone(),
                        color,
                        size: theme.label_size,
                    });
                }
            }
        }

        if let Some(label) = placeholder {
            primitives.push(Primitive::Text {
                label: label.clone(),
                color: theme.placeholder,
                size: theme.label_size * 1.25,
            });
        }

        Self {
            width,
            height,
            primitives,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Standalone SVG document of the scene.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = format_number(self.width),
            h = format_number(self.height),
        );
        for primitive in &self.primitives {
            match primitive {
                Primitive::Quad { rect, fill, stroke } => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                        format_number(rect.x),
                        format_number(rect.y),
                        format_number(rect.width),
                        format_number(rect.height),
                        paint_attrs(*fill, *stroke),
                    );
                }
                Primitive::Path { data, fill, stroke } => {
                    let _ = write!(out, r#"<path d="{data}"{}/>"#, paint_attrs(*fill, *stroke));
                }
                Primitive::Text { label, color, size } => {
                    let anchor = match label.anchor {
                        TextAnchor::Start => "start",
                        TextAnchor::Middle => "middle",
                        TextAnchor::End => "end",
                    };
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" text-anchor="{anchor}" font-size="{}" fill="{}"{}>{}</text>"#,
                        format_number(label.position.x),
                        format_number(label.position.y),
                        format_number(*size),
                        color.to_hex(),
                        opacity_attr("fill-opacity", color.a),
                        escape(&label.text),
                    );
                }
            }
        }
        out.push_str("</svg>");
        out
    }
}

fn opacity_attr(name: &str, alpha: f32) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" {name}="{}""#, format_number(f64::from(alpha)))
    }
}

fn paint_attrs(fill: Option<Color>, stroke: Option<(Color, f64)>) -> String {
    let mut attrs = match fill {
        Some(c) => format!(r#" fill="{}"{}"#, c.to_hex(), opacity_attr("fill-opacity", c.a)),
        None => r#" fill="none""#.to_string(),
    };
    if let Some((c, width)) = stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{}"{}"#,
            c.to_hex(),
            format_number(width),
            opacity_attr("stroke-opacity", c.a),
        );
    }
    attrs
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Convenience wrapper: SVG of a chart's current frame.
pub fn render_svg<R>(
    tree: &VisualTree<R>,
    width: f64,
    height: f64,
    placeholder: Option<&Label>,
    theme: &ChartTheme,
) -> String {
    Scene::build(tree, width, height, placeholder, theme).to_svg()
}
