//! Tree built from flat top-level records and a children accessor.

use crate::data_types::{Accessor, ChildrenFn, Key, KeyFn};
use crate::error::ChartError;
use serde::{Deserialize, Serialize};

/// How leaf magnitudes are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Leaves take the value accessor, parents the sum of their children.
    #[default]
    Sum,
    /// Every leaf counts as one.
    Count,
}

#[derive(Clone, Debug)]
pub struct HierNode<R> {
    pub key: Key,
    /// `None` only for the synthetic root.
    pub datum: Option<R>,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Aggregate of the subtree. Never negative.
    pub value: f64,
    /// Position among its siblings.
    pub index: usize,
}

impl<R> HierNode<R> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Nodes in pre-order; index 0 is the synthetic root holding the top-level
/// records as children.
#[derive(Clone, Debug)]
pub struct Hierarchy<R> {
    pub nodes: Vec<HierNode<R>>,
}

pub const ROOT: usize = 0;

impl<R: Clone + 'static> Hierarchy<R> {
    /// Builds the tree and sums values. Accessor failures are returned as
    /// warnings and the affected leaf counts as zero.
    pub fn build(
        records: &[R],
        children: Option<&ChildrenFn<R>>,
        key: &KeyFn<R>,
        value: Option<&Accessor<R, f64>>,
        metric: Metric,
    ) -> Result<(Self, Vec<ChartError>), ChartError> {
        let mut tree = Hierarchy {
            nodes: vec![HierNode {
                key: Key::Field(String::new()),
                datum: None,
                depth: 0,
                parent: None,
                children: vec![],
                value: 0.0,
                index: 0,
            }],
        };
        let mut warnings = Vec::new();
        tree.push_children(ROOT, records.to_vec(), children, key, &mut warnings)?;
        tree.sum(ROOT, value, metric, &mut warnings);
        Ok((tree, warnings))
    }

    fn push_children(
        &mut self,
        parent: usize,
        records: Vec<R>,
        children: Option<&ChildrenFn<R>>,
        key: &KeyFn<R>,
        warnings: &mut Vec<ChartError>,
    ) -> Result<(), ChartError> {
        let depth = self.nodes[parent].depth + 1;
        let mut seen: Vec<(Key, usize)> = Vec::new();
        for (i, record) in records.into_iter().enumerate() {
            let own = match key.key_of(i, &record) {
                Ok(k) => k,
                Err(e) => {
                    warnings.push(e);
                    continue;
                }
            };
            if let Some((_, first)) = seen.iter().find(|(k, _)| *k == own) {
                return Err(ChartError::DuplicateKey {
                    key: own,
                    first: *first,
                    second: i,
                });
            }
            seen.push((own.clone(), i));
            let node_key = if parent == ROOT {
                own
            } else {
                self.nodes[parent].key.child(&own)
            };
            let kids = children.map(|f| f(&record)).unwrap_or_default();
            let idx = self.nodes.len();
            self.nodes.push(HierNode {
                key: node_key,
                datum: Some(record),
                depth,
                parent: Some(parent),
                children: vec![],
                value: 0.0,
                index: i,
            });
            self.nodes[parent].children.push(idx);
            if !kids.is_empty() {
                self.push_children(idx, kids, children, key, warnings)?;
            }
        }
        Ok(())
    }

    fn sum(
        &mut self,
        idx: usize,
        value: Option<&Accessor<R, f64>>,
        metric: Metric,
        warnings: &mut Vec<ChartError>,
    ) -> f64 {
        let kids = self.nodes[idx].children.clone();
        let total = if kids.is_empty() {
            match (metric, &self.nodes[idx].datum, value) {
                (_, None, _) => 0.0,
                (Metric::Count, Some(_), _) => 1.0,
                (Metric::Sum, Some(datum), Some(acc)) => {
                    match acc.read("value", self.nodes[idx].index, datum) {
                        Ok(v) if v.is_finite() => v.max(0.0),
                        Ok(_) => 0.0,
                        Err(e) => {
                            warnings.push(e);
                            0.0
                        }
                    }
                }
                (Metric::Sum, Some(_), None) => 0.0,
            }
        } else {
            kids.iter()
                .map(|&k| self.sum(k, value, metric, warnings))
                .sum()
        };
        self.nodes[idx].value = total;
        total
    }
}

impl<R> Hierarchy<R> {
    pub fn root(&self) -> &HierNode<R> {
        &self.nodes[ROOT]
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Every node except the root, in pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = (usize, &HierNode<R>)> {
        self.nodes.iter().enumerate().skip(1)
    }

    pub fn leaves(&self) -> impl Iterator<Item = (usize, &HierNode<R>)> {
        self.descendants().filter(|(_, n)| n.is_leaf())
    }
}
