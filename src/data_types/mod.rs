pub mod accessor;
pub mod geometry;
pub mod key;
pub mod plot_configs;

// Re-export everything for compatibility
pub use accessor::*;
pub use geometry::*;
pub use key::*;
pub use plot_configs::*;
