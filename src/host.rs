// GPUI host: paints a scene inside a canvas and drives the shared clock

use crate::rendering::{Primitive, Scene};
use crate::shapes::{PathCommand, PathData};
use crate::theme::Color;
use crate::transition::TransitionScheduler;
use gpui::*;
use std::time::Instant;

pub fn to_hsla(color: Color) -> Hsla {
    Hsla::from(Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    })
}

fn at(bounds: &Bounds<Pixels>, p: glam::DVec2) -> gpui::Point<Pixels> {
    gpui::Point::new(
        bounds.origin.x + px(p.x as f32),
        bounds.origin.y + px(p.y as f32),
    )
}

fn build_path(mut builder: PathBuilder, data: &PathData, bounds: &Bounds<Pixels>) -> Option<Path<Pixels>> {
    for cmd in data.commands() {
        match *cmd {
            PathCommand::MoveTo(p) => builder.move_to(at(bounds, p)),
            PathCommand::LineTo(p) => builder.line_to(at(bounds, p)),
            PathCommand::CubicTo(a, b, to) => {
                builder.cubic_bezier_to(at(bounds, to), at(bounds, a), at(bounds, b))
            }
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => {
                let r = px(radius as f32);
                builder.arc_to(gpui::Point::new(r, r), px(0.0), large_arc, sweep, at(bounds, to));
            }
            PathCommand::Close => builder.close(),
        }
    }
    builder.build().ok()
}

/// Paints the shapes of `scene` into `bounds`. Text primitives are laid out
/// as elements by [`label_elements`].
pub fn paint_scene(window: &mut Window, bounds: Bounds<Pixels>, scene: &Scene) {
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Quad { rect, fill, stroke } => {
                let quad = Bounds::new(
                    at(&bounds, glam::DVec2::new(rect.x, rect.y)),
                    Size::new(px(rect.width as f32), px(rect.height as f32)),
                );
                if let Some(c) = fill {
                    window.paint_quad(gpui::fill(quad, to_hsla(*c)));
                }
                if let Some((c, _)) = stroke {
                    window.paint_quad(gpui::outline(quad, to_hsla(*c), BorderStyle::Solid));
                }
            }
            Primitive::Path { data, fill, stroke } => {
                if let Some(c) = fill {
                    if let Some(path) = build_path(PathBuilder::fill(), data, &bounds) {
                        window.paint_path(path, to_hsla(*c));
                    }
                }
                if let Some((c, width)) = stroke {
                    let builder = PathBuilder::stroke(px(*width as f32));
                    if let Some(path) = build_path(builder, data, &bounds) {
                        window.paint_path(path, to_hsla(*c));
                    }
                }
            }
            Primitive::Text { .. } => {}
        }
    }
}

/// Absolutely positioned text elements for the labels of `scene`.
pub fn label_elements(scene: &Scene) -> Vec<AnyElement> {
    scene
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text { label, color, size } => Some(
                div()
                    .absolute()
                    .left(px(label.position.x as f32))
                    .top(px((label.position.y - size) as f32))
                    .text_size(px(*size as f32))
                    .text_color(to_hsla(*color))
                    .child(label.text.clone())
                    .into_any_element(),
            ),
            _ => None,
        })
        .collect()
}

/// Advances the shared clock to now and asks for another frame while any
/// transition is still running.
pub fn drive_frame(scheduler: &TransitionScheduler, window: &mut Window) {
    scheduler.tick(Instant::now());
    if scheduler.has_active() {
        window.request_animation_frame();
    }
}
