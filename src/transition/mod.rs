//! Time-boxed interpolation of element attributes.

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{
    Attr, AttrKey, DoneFn, ElementId, FrameFn, Transition, TransitionId, TransitionScheduler,
};
pub use tween::Tween;
