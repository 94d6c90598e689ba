//! Scale factory: continuous (linear) and discrete (band) scales.
//!
//! Scales are immutable values. When the data extent or the canvas changes a
//! chart builds new scales and keeps the old ones for transitions.

use crate::error::ChartError;
use d3rs::scale::{BandScale as D3Band, LinearScale, Scale as D3Scale};
use indexmap::IndexSet;

/// Linear map from `[d0, d1]` to `[r0, r1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousScale {
    inner: LinearScale,
}

impl ContinuousScale {
    /// A zero-width domain (`min == max`) maps every input to the middle of
    /// the range.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, ChartError> {
        let (d_min, d_max) = domain;
        if !d_min.is_finite() || !d_max.is_finite() {
            return Err(ChartError::degenerate(format!(
                "domain [{d_min}, {d_max}] is not finite"
            )));
        }
        if d_min > d_max {
            return Err(ChartError::configuration(format!(
                "domain min {d_min} is greater than max {d_max}"
            )));
        }
        Ok(Self {
            inner: LinearScale::new().domain(d_min, d_max).range(range.0, range.1),
        })
    }

    pub fn with_clamp(self, clamp: bool) -> Self {
        Self {
            inner: self.inner.clamp(clamp),
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        D3Scale::domain(&self.inner)
    }

    pub fn range(&self) -> (f64, f64) {
        D3Scale::range(&self.inner)
    }

    fn is_flat(&self) -> bool {
        let (d0, d1) = self.domain();
        (d1 - d0).abs() < f64::EPSILON
    }

    pub fn map(&self, value: f64) -> f64 {
        let (r0, r1) = self.range();
        if self.is_flat() {
            return (r0 + r1) / 2.0;
        }
        let res = self.inner.scale(value);
        if res.is_nan() {
            r0
        } else {
            res
        }
    }

    /// Inverse map. A flat domain inverts every pixel to its single value.
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, _) = self.domain();
        let (r0, r1) = self.range();
        if self.is_flat() || (r1 - r0).abs() < f64::EPSILON {
            return d0;
        }
        self.inner.invert(pixel).unwrap_or(d0)
    }

    /// Roughly `count` round tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        self.inner.ticks(count)
    }

    /// Extends the domain outwards to round tick values.
    pub fn nice(&self, count: usize) -> Self {
        Self {
            inner: self.inner.nice(Some(count.max(1))),
        }
    }

    pub fn format_tick(&self, value: f64) -> String {
        if value.abs() < 0.001 && value.abs() > 0.0 {
            format!("{:.4}", value)
        } else if value.abs() > 1000.0 {
            format!("{:.0}", value)
        } else {
            format_number(value)
        }
    }
}

/// Discrete scale: one equal-width band per category.
#[derive(Clone, Debug)]
pub struct BandScale {
    inner: D3Band<String>,
    padding: f64,
    outer_padding: f64,
}

impl PartialEq for BandScale {
    fn eq(&self, other: &Self) -> bool {
        self.inner.get_domain() == other.inner.get_domain()
            && self.inner.get_range() == other.inner.get_range()
            && self.padding == other.padding
            && self.outer_padding == other.outer_padding
    }
}

impl BandScale {
    /// Bands of width `step * (1 - padding)`, centred in their slots.
    pub fn new(
        categories: impl IntoIterator<Item = impl Into<String>>,
        range: (f64, f64),
        padding: f64,
    ) -> Result<Self, ChartError> {
        let mut set = IndexSet::new();
        for (i, c) in categories.into_iter().enumerate() {
            let c = c.into();
            if !set.insert(c.clone()) {
                return Err(ChartError::configuration(format!(
                    "band scale category `{c}` repeated at position {i}"
                )));
            }
        }
        if set.is_empty() {
            return Err(ChartError::degenerate("band scale has no categories"));
        }
        if !(0.0..1.0).contains(&padding) {
            return Err(ChartError::configuration(format!(
                "band padding must be in [0, 1), got {padding}"
            )));
        }
        let inner = D3Band::new()
            .domain(set.into_iter().collect())
            .range(range.0, range.1)
            .padding_inner(padding)
            .padding_outer(padding / 2.0);
        Ok(Self {
            inner,
            padding,
            outer_padding: 0.0,
        })
    }

    /// Reserves `steps` slot widths before the first and after the last
    /// band, at most one.
    pub fn with_outer_padding(mut self, steps: f64) -> Self {
        self.outer_padding = steps.clamp(0.0, 1.0 - self.padding / 2.0);
        self.inner = self
            .inner
            .padding_outer(self.padding / 2.0 + self.outer_padding);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.get_domain().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.get_domain().is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.inner.get_domain().iter().map(String::as_str)
    }

    pub fn range(&self) -> (f64, f64) {
        self.inner.get_range()
    }

    /// Distance between the starts of two adjacent slots.
    pub fn step(&self) -> f64 {
        self.inner.step()
    }

    pub fn bandwidth(&self) -> f64 {
        self.inner.bandwidth()
    }

    /// Start of the band for `category`.
    pub fn map(&self, category: &str) -> Option<f64> {
        self.inner.scale(&category.to_string())
    }

    pub fn center(&self, category: &str) -> Option<f64> {
        self.map(category).map(|start| start + self.bandwidth() / 2.0)
    }

    /// Category whose slot contains `pixel`.
    pub fn invert(&self, pixel: f64) -> Option<&str> {
        let step = self.step();
        if step == 0.0 {
            return None;
        }
        let slot = ((pixel - self.range().0) / step - self.outer_padding).floor();
        if slot < 0.0 {
            return None;
        }
        self.inner.get_domain().get(slot as usize).map(String::as_str)
    }
}

/// A scale of either kind, as held by charts.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartScale {
    Linear(ContinuousScale),
    Band(BandScale),
}

impl ChartScale {
    pub fn new_linear(domain: (f64, f64), range: (f64, f64)) -> Result<Self, ChartError> {
        ContinuousScale::new(domain, range).map(Self::Linear)
    }

    pub fn new_band(
        categories: impl IntoIterator<Item = impl Into<String>>,
        range: (f64, f64),
        padding: f64,
    ) -> Result<Self, ChartError> {
        BandScale::new(categories, range, padding).map(Self::Band)
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.range(),
            Self::Band(s) => s.range(),
        }
    }

    pub fn as_linear(&self) -> Option<&ContinuousScale> {
        match self {
            Self::Linear(s) => Some(s),
            Self::Band(_) => None,
        }
    }

    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Self::Band(s) => Some(s),
            Self::Linear(_) => None,
        }
    }
}

/// Current and previous scales of a chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleSet {
    pub x: Option<ChartScale>,
    pub y: Option<ChartScale>,
}

/// `[min, max]` over the finite values, or `None` when there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Short decimal rendering: at most three decimals, no trailing zeros.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() || v.abs() < 0.0005 {
        return "0".to_string();
    }
    let mut s = format!("{:.3}", (v * 1000.0).round() / 1000.0);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}
