use d3rs::ease::EaseType;
use serde::{Deserialize, Serialize};

/// Maps linear progress in `[0, 1]` onto eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    #[default]
    CubicInOut,
    SinInOut,
    /// Overshoots slightly before settling, for entering elements.
    BackOut,
    BounceOut,
    ElasticOut,
}

impl Easing {
    fn curve(self) -> EaseType {
        match self {
            Self::Linear => EaseType::Linear,
            Self::QuadIn => EaseType::QuadIn,
            Self::QuadOut => EaseType::QuadOut,
            Self::QuadInOut => EaseType::QuadInOut,
            Self::CubicIn => EaseType::CubicIn,
            Self::CubicOut => EaseType::CubicOut,
            Self::CubicInOut => EaseType::CubicInOut,
            Self::SinInOut => EaseType::SinInOut,
            Self::BackOut => EaseType::BackOut,
            Self::BounceOut => EaseType::BounceOut,
            Self::ElasticOut => EaseType::ElasticOut,
        }
    }

    /// Progress is clamped to `[0, 1]` before easing.
    pub fn apply(self, t: f64) -> f64 {
        self.curve().ease(t.clamp(0.0, 1.0))
    }
}
