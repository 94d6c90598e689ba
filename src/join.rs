//! Keyed data join: classifies a new dataset against the elements of the
//! previous render.

use crate::data_types::Key;
use crate::error::ChartError;
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// A record with no element from the previous render.
#[derive(Clone, Debug, PartialEq)]
pub struct Entering<T> {
    /// Position in the new dataset.
    pub index: usize,
    pub key: Key,
    pub datum: T,
}

/// A record whose key already has an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Updating<T> {
    pub index: usize,
    /// Position of the element in the previous render.
    pub previous: usize,
    pub key: Key,
    pub datum: T,
}

/// A previous element whose key is gone from the new dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exiting {
    pub previous: usize,
    pub key: Key,
}

/// Result of [`reconcile`]. Enter and update entries follow the new
/// dataset's order, exit entries the previous render's order.
#[derive(Clone, Debug, PartialEq)]
pub struct DataJoin<T> {
    pub enter: Vec<Entering<T>>,
    pub update: Vec<Updating<T>>,
    pub exit: Vec<Exiting>,
}

impl<T> Default for DataJoin<T> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<T> DataJoin<T> {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }

    /// Keys of the new dataset in order, whatever their classification.
    pub fn keys(&self) -> Vec<&Key> {
        let mut all: Vec<(usize, &Key)> = self
            .enter
            .iter()
            .map(|e| (e.index, &e.key))
            .chain(self.update.iter().map(|u| (u.index, &u.key)))
            .collect();
        all.sort_by_key(|(i, _)| *i);
        all.into_iter().map(|(_, k)| k).collect()
    }
}

/// Classifies every record of `incoming` as enter or update by key, and
/// every previous key missing from `incoming` as exit.
///
/// Two records resolving to the same key fail with
/// [`ChartError::DuplicateKey`]; nothing is classified in that case.
pub fn reconcile<'a, T>(
    previous: impl IntoIterator<Item = &'a Key>,
    incoming: Vec<T>,
    mut key_of: impl FnMut(usize, &T) -> Result<Key, ChartError>,
) -> Result<DataJoin<T>, ChartError> {
    let previous: IndexMap<&Key, usize> = previous
        .into_iter()
        .enumerate()
        .map(|(i, k)| (k, i))
        .collect();

    let mut keyed = Vec::with_capacity(incoming.len());
    let mut seen: HashMap<Key, usize> = HashMap::with_capacity(incoming.len());
    for (index, datum) in incoming.into_iter().enumerate() {
        let key = key_of(index, &datum)?;
        if let Some(&first) = seen.get(&key) {
            return Err(ChartError::DuplicateKey {
                key,
                first,
                second: index,
            });
        }
        seen.insert(key.clone(), index);
        keyed.push((index, key, datum));
    }

    let mut join = DataJoin::default();
    for (index, key, datum) in keyed {
        match previous.get(&key) {
            Some(&prev) => join.update.push(Updating {
                index,
                previous: prev,
                key,
                datum,
            }),
            None => join.enter.push(Entering { index, key, datum }),
        }
    }
    join.exit = previous
        .iter()
        .filter(|(k, _)| !seen.contains_key(*k))
        .map(|(k, &i)| Exiting {
            previous: i,
            key: (*k).clone(),
        })
        .collect();

    debug!(
        enter = join.enter.len(),
        update = join.update.len(),
        exit = join.exit.len(),
        "reconciled dataset"
    );
    Ok(join)
}
