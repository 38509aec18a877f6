//! Two-level keyed table.

use std::borrow::Borrow;
use std::collections::BTreeMap;

/// A `K1 -> K2 -> V` table with explicit insertion.
///
/// Reads never create keys: [`get`](Self::get) on an absent pair is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedTable<K1, K2, V> {
    inner: BTreeMap<K1, BTreeMap<K2, V>>,
}

impl<K1, K2, V> Default for NestedTable<K1, K2, V> {
    fn default() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }
}

/// Result of [`NestedTable::select`].
#[derive(Debug, PartialEq)]
pub enum Selection<'a, K1, K2, V> {
    /// The key matched an outer key: its whole row.
    Outer(&'a BTreeMap<K2, V>),
    /// The key matched inner keys: one value per outer key that has it.
    Inner(BTreeMap<&'a K1, &'a V>),
}

impl<K1: Ord, K2: Ord, V> NestedTable<K1, K2, V> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one at `(outer, inner)`.
    pub fn insert(&mut self, outer: K1, inner: K2, value: V) -> Option<V> {
        self.inner.entry(outer).or_default().insert(inner, value)
    }

    /// Value at `(outer, inner)`.
    pub fn get<Q1, Q2>(&self, outer: &Q1, inner: &Q2) -> Option<&V>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: Ord + ?Sized,
        Q2: Ord + ?Sized,
    {
        self.inner.get(outer)?.get(inner)
    }

    /// All inner entries under `outer`.
    pub fn row<Q>(&self, outer: &Q) -> Option<&BTreeMap<K2, V>>
    where
        K1: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.get(outer)
    }

    /// Whether a value is stored at `(outer, inner)`.
    pub fn contains<Q1, Q2>(&self, outer: &Q1, inner: &Q2) -> bool
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: Ord + ?Sized,
        Q2: Ord + ?Sized,
    {
        self.get(outer, inner).is_some()
    }

    /// Outer keys in order.
    pub fn outer_keys(&self) -> impl Iterator<Item = &K1> {
        self.inner.keys()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.inner.values().map(BTreeMap::len).sum()
    }

    /// Whether the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(outer, inner, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K1, &K2, &V)> {
        self.inner
            .iter()
            .flat_map(|(k1, row)| row.iter().map(move |(k2, v)| (k1, k2, v)))
    }

    /// Exchanges the two key levels.
    pub fn swap(self) -> NestedTable<K2, K1, V>
    where
        K1: Clone,
    {
        let mut out = NestedTable::new();
        for (k1, row) in self.inner {
            for (k2, v) in row {
                out.insert(k2, k1.clone(), v);
            }
        }
        out
    }

    /// Looks `key` up on the outer level first and falls back to the inner
    /// level, so a caller can ask for either a model or a metric by name.
    pub fn select<Q>(&self, key: &Q) -> Option<Selection<'_, K1, K2, V>>
    where
        K1: Borrow<Q>,
        K2: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(row) = self.inner.get(key) {
            return Some(Selection::Outer(row));
        }
        let matches: BTreeMap<&K1, &V> = self
            .inner
            .iter()
            .filter_map(|(k1, row)| row.get(key).map(|v| (k1, v)))
            .collect();
        (!matches.is_empty()).then_some(Selection::Inner(matches))
    }
}
