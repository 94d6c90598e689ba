//! Pie layout: angular spans proportional to values.

use d3rs::shape::Pie;
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieSlice {
    /// Position of the value in the input.
    pub index: usize,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieLayout {
    pub start_angle: f64,
    /// Total angle shared by the slices, a full turn by default.
    pub span: f64,
    /// Assign angles by descending value instead of input order.
    pub sort: bool,
}

impl Default for PieLayout {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            span: TAU,
            sort: false,
        }
    }
}

impl PieLayout {
    /// Slices in input order. Values that are not positive and finite get a
    /// zero span at their place in the sequence, so they stay hidden
    /// without disturbing the other slices.
    pub fn layout(&self, values: &[f64]) -> Vec<PieSlice> {
        let usable: Vec<f64> = values
            .iter()
            .map(|&v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
            .collect();
        let end = self.start_angle + self.span;
        let indices: Vec<usize> = (0..values.len()).collect();
        // d3rs sorts stably, so equal values keep input order
        let generated = Pie::new()
            .start_angle(self.start_angle)
            .end_angle(end)
            .sort(self.sort)
            .sort_descending(true)
            .generate(&indices, |&i| usable[i]);

        let mut slices = vec![
            PieSlice {
                index: 0,
                value: 0.0,
                start_angle: self.start_angle,
                end_angle: self.start_angle,
            };
            values.len()
        ];
        let last_positive = generated.iter().rposition(|s| s.value > 0.0);
        for (pos, s) in generated.iter().enumerate() {
            let (start_angle, end_angle) = match last_positive {
                // the last slice closes the circle exactly
                Some(last) if pos == last => (s.arc.start_angle, end),
                Some(last) if pos > last => (end, end),
                _ => (s.arc.start_angle, s.arc.end_angle),
            };
            slices[s.index] = PieSlice {
                index: s.index,
                value: values[s.index],
                start_angle,
                end_angle,
            };
        }
        slices
    }
}
