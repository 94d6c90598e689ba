//! Stack layout: cumulative offsets for series aligned by id.
//!
//! Positive values stack upwards from zero and negative values stack
//! downwards from zero, each on its own running sum (the d3rs diverging
//! offset). For every band `y1 = y0 + value`, so a negative band ends below
//! where it starts.

use d3rs::shape::{Stack as D3Stack, StackOffset};
use indexmap::IndexSet;

#[derive(Clone, Debug, PartialEq)]
pub struct StackValue {
    pub id: String,
    pub value: f64,
}

impl StackValue {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackSeries {
    pub name: String,
    pub values: Vec<StackValue>,
}

impl StackSeries {
    pub fn new(name: impl Into<String>, values: Vec<StackValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackBand {
    pub series: usize,
    pub id: String,
    pub value: f64,
    pub y0: f64,
    pub y1: f64,
}

impl StackBand {
    pub fn low(&self) -> f64 {
        self.y0.min(self.y1)
    }

    pub fn high(&self) -> f64 {
        self.y0.max(self.y1)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    /// Ids in first-seen order across all series.
    pub ids: Vec<String>,
    /// `bands[s][i]` is the band of the `i`-th value of series `s`.
    pub bands: Vec<Vec<StackBand>>,
}

impl Stack {
    /// `[min, max]` over every band and zero.
    pub fn extent(&self) -> (f64, f64) {
        self.bands
            .iter()
            .flatten()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), b| (lo.min(b.low()), hi.max(b.high())))
    }
}

/// Stacks series in input order. Non-finite values count as zero, and an
/// id repeated within one series keeps its last value.
pub fn stack(series: &[StackSeries]) -> Stack {
    let ids: IndexSet<&str> = series
        .iter()
        .flat_map(|s| s.values.iter().map(|v| v.id.as_str()))
        .collect();

    // one row per id, one column per series; missing cells stay zero
    let mut matrix = vec![vec![0.0; series.len()]; ids.len()];
    for (s, serie) in series.iter().enumerate() {
        for v in &serie.values {
            if let Some(row) = ids.get_index_of(v.id.as_str()) {
                matrix[row][s] = if v.value.is_finite() { v.value } else { 0.0 };
            }
        }
    }

    let keys = series.iter().map(|s| s.name.clone()).collect();
    let stacked = D3Stack::new()
        .keys(keys)
        .offset(StackOffset::Diverging)
        .generate(&matrix);

    let bands = series
        .iter()
        .enumerate()
        .map(|(s, serie)| {
            serie
                .values
                .iter()
                .map(|v| {
                    let row = ids.get_index_of(v.id.as_str()).unwrap_or_default();
                    let value = matrix.get(row).map_or(0.0, |r| r[s]);
                    let [lo, hi] = stacked
                        .get(s)
                        .and_then(|d3| d3.get(row))
                        .unwrap_or([0.0, 0.0]);
                    // d3rs stores [low, high]; a negative band starts at its top
                    let (y0, y1) = if value < 0.0 { (hi, lo) } else { (lo, hi) };
                    StackBand {
                        series: s,
                        id: v.id.clone(),
                        value,
                        y0,
                        y1,
                    }
                })
                .collect()
        })
        .collect();

    Stack {
        ids: ids.into_iter().map(str::to_string).collect(),
        bands,
    }
}
