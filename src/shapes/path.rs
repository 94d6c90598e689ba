use crate::data_types::Point;
use crate::scales::format_number;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic bezier: two control points, then the end point.
    CubicTo(Point, Point, Point),
    /// SVG elliptical arc with equal radii.
    ArcTo {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Resolved path geometry. `Display` writes SVG path data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.commands.push(PathCommand::LineTo(p));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.commands.push(PathCommand::CubicTo(c1, c2, to));
    }

    pub fn arc_to(&mut self, radius: f64, large_arc: bool, sweep: bool, to: Point) {
        self.commands.push(PathCommand::ArcTo {
            radius,
            large_arc,
            sweep,
            to,
        });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn pt(p: &Point) -> String {
    format!("{},{}", format_number(p.x), format_number(p.y))
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(p) => write!(f, "M{}", pt(p))?,
                PathCommand::LineTo(p) => write!(f, "L{}", pt(p))?,
                PathCommand::CubicTo(a, b, c) => write!(f, "C{},{},{}", pt(a), pt(b), pt(c))?,
                PathCommand::ArcTo {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => {
                    let r = format_number(*radius);
                    write!(
                        f,
                        "A{r},{r},0,{},{},{}",
                        u8::from(*large_arc),
                        u8::from(*sweep),
                        pt(to)
                    )?
                }
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// Converts a d3rs path into drawable commands. Canvas arcs become SVG arcs
/// from the current pen position, so no extra move is inserted.
impl From<&d3rs::shape::Path> for PathData {
    fn from(path: &d3rs::shape::Path) -> Self {
        use d3rs::shape::PathCommand as D3;
        use glam::DVec2;
        use std::f64::consts::PI;

        let mut out = PathData::new();
        let mut pen = DVec2::ZERO;
        let mut start = DVec2::ZERO;
        for cmd in path.commands() {
            match *cmd {
                D3::MoveTo { x, y } => {
                    pen = DVec2::new(x, y);
                    start = pen;
                    out.move_to(pen);
                }
                D3::LineTo { x, y } => {
                    pen = DVec2::new(x, y);
                    out.line_to(pen);
                }
                D3::HorizontalLineTo { x } => {
                    pen.x = x;
                    out.line_to(pen);
                }
                D3::VerticalLineTo { y } => {
                    pen.y = y;
                    out.line_to(pen);
                }
                D3::QuadraticCurveTo { x1, y1, x, y } => {
                    // degree elevation
                    let c = DVec2::new(x1, y1);
                    let to = DVec2::new(x, y);
                    out.cubic_to(pen + (c - pen) * (2.0 / 3.0), to + (c - to) * (2.0 / 3.0), to);
                    pen = to;
                }
                D3::CubicCurveTo { x1, y1, x2, y2, x, y } => {
                    pen = DVec2::new(x, y);
                    out.cubic_to(DVec2::new(x1, y1), DVec2::new(x2, y2), pen);
                }
                D3::Arc {
                    x,
                    y,
                    radius,
                    start_angle,
                    end_angle,
                    anticlockwise,
                } => {
                    pen = DVec2::new(x + radius * end_angle.cos(), y + radius * end_angle.sin());
                    out.arc_to(radius, (end_angle - start_angle).abs() > PI, !anticlockwise, pen);
                }
                D3::EllipticalArc {
                    rx,
                    large_arc,
                    sweep,
                    x,
                    y,
                    ..
                } => {
                    pen = DVec2::new(x, y);
                    out.arc_to(rx, large_arc, sweep, pen);
                }
                D3::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    pen = DVec2::new(x, y);
                    start = pen;
                    out.move_to(pen);
                    out.line_to(DVec2::new(x + width, y));
                    out.line_to(DVec2::new(x + width, y + height));
                    out.line_to(DVec2::new(x, y + height));
                    out.close();
                }
                D3::ClosePath => {
                    pen = start;
                    out.close();
                }
            }
        }
        out
    }
}
