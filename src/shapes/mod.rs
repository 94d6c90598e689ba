//! Pure shape generators: data plus scales in, pixel geometry out.

pub mod arc;
pub mod hierarchy;
pub mod line;
pub mod partition;
pub mod path;
pub mod pie;
pub mod stack;
pub mod treemap;

pub use arc::{arc_path, centroid, polar, ArcGenerator};
pub use hierarchy::{HierNode, Hierarchy, Metric};
pub use line::{path_for, Curve, LineGenerator, StepMode};
pub use partition::partition;
pub use path::{PathCommand, PathData};
pub use pie::{PieLayout, PieSlice};
pub use stack::{stack, Stack, StackBand, StackSeries, StackValue};
pub use treemap::{treemap, Tiling};
