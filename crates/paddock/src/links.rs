//! Canonical weighted link tables.
//!
//! Raw `(source, target[, weight])` rows are grouped by `(source, target)`. Rows that carry a
//! weight contribute it to the group sum; bare pairs contribute `1.0` each, so a table without a
//! weight column ends up counting duplicate links. Groups whose sum is exactly zero are dropped.

use std::collections::BTreeSet;
use std::hash::Hash;

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde::Serialize;

/// Node index in sorted order. Position `i` in the set is row/column `i` of every matrix and
/// coordinate vector derived from the table.
pub type NodeSet<N> = IndexSet<N, FxBuildHasher>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link<N> {
    pub source: N,
    pub target: N,
    pub weight: f64,
}

impl<N> Link<N> {
    pub fn new(source: N, target: N, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }

    pub fn is_self_loop(&self) -> bool
    where
        N: PartialEq,
    {
        self.source == self.target
    }
}

/// A bare pair counts as one occurrence.
impl<N> From<(N, N)> for Link<N> {
    fn from((source, target): (N, N)) -> Self {
        Self::new(source, target, 1.0)
    }
}

impl<N> From<(N, N, f64)> for Link<N> {
    fn from((source, target, weight): (N, N, f64)) -> Self {
        Self::new(source, target, weight)
    }
}

/// Aggregated links, sorted by `(source, target)`, plus the node order they induce.
#[derive(Debug, Clone)]
pub struct EdgeTable<N> {
    links: Vec<Link<N>>,
    nodes: NodeSet<N>,
}

impl<N> EdgeTable<N> {
    pub fn links(&self) -> &[Link<N>] {
        &self.links
    }

    /// Sorted, deduplicated union of every source and target.
    pub fn nodes(&self) -> &NodeSet<N> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link<N>> {
        self.links.iter()
    }

    pub fn into_links(self) -> Vec<Link<N>> {
        self.links
    }
}

impl<N: Hash + Eq> EdgeTable<N> {
    pub fn node_index(&self, node: &N) -> Option<usize> {
        self.nodes.get_index_of(node)
    }
}

impl<N: PartialEq> PartialEq for EdgeTable<N> {
    fn eq(&self, other: &Self) -> bool {
        // The node set is derived from the links.
        self.links == other.links
    }
}

impl<'a, N> IntoIterator for &'a EdgeTable<N> {
    type Item = &'a Link<N>;
    type IntoIter = std::slice::Iter<'a, Link<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Groups, sums, sorts and prunes raw rows into an [`EdgeTable`].
///
/// Sums accumulate in input order within each `(source, target)` group, so the result is
/// deterministic for a given row sequence.
pub fn aggregate<N, I>(rows: I) -> EdgeTable<N>
where
    N: Ord + Hash + Clone,
    I: IntoIterator,
    I::Item: Into<Link<N>>,
{
    let mut sums: FxHashMap<(N, N), f64> = FxHashMap::default();
    let mut rows_seen = 0usize;
    for row in rows {
        let link: Link<N> = row.into();
        *sums.entry((link.source, link.target)).or_insert(0.0) += link.weight;
        rows_seen += 1;
    }

    let mut links: Vec<Link<N>> = sums
        .into_iter()
        .filter(|(_, weight)| *weight != 0.0)
        .map(|((source, target), weight)| Link::new(source, target, weight))
        .collect();
    links.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then_with(|| a.target.cmp(&b.target))
    });

    let table = EdgeTable::from_sorted(links);
    tracing::debug!(
        rows = rows_seen,
        links = table.len(),
        nodes = table.nodes.len(),
        "aggregated link table"
    );
    table
}

impl<N: Ord + Hash + Clone> EdgeTable<N> {
    fn from_sorted(links: Vec<Link<N>>) -> Self {
        let mut nodes: BTreeSet<&N> = BTreeSet::new();
        for link in &links {
            nodes.insert(&link.source);
            nodes.insert(&link.target);
        }
        let nodes: NodeSet<N> = nodes.into_iter().cloned().collect();
        Self { links, nodes }
    }
}
