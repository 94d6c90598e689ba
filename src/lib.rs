//! chart_engine: declarative charts driven by data joins and animated
//! transitions
//!
//! Records go in through accessors, plot kinds lay them out as geometry,
//! the data join matches geometry to live elements by key, and a shared
//! transition scheduler moves the elements to their new pose.

pub mod chart;
pub mod data_types;
pub mod error;
pub mod events;
#[cfg(feature = "gpui")]
pub mod host;
pub mod join;
pub mod plot_types;
pub mod rendering;
pub mod scales;
pub mod shapes;
pub mod theme;
pub mod tooltip;
pub mod transform;
pub mod transition;
pub mod visual;

pub use chart::{Chart, RenderReport};
pub use data_types::{Accessors, ChartConfig, ChartOptions, Key};
pub use error::ChartError;
pub use events::{ChartEvent, EventRelay, OwnerId};
pub use join::{reconcile, DataJoin};
pub use plot_types::{
    BarPlot, LinePlot, PiePlot, PlotRenderer, ScatterPlot, StackedBarPlot, SunburstPlot,
    TreemapPlot,
};
pub use rendering::{render_svg, Scene};
pub use scales::{BandScale, ChartScale, ContinuousScale};
pub use tooltip::TooltipOverlay;
pub use transition::{Easing, TransitionScheduler};
