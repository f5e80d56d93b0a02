use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::error::Result;
use crate::layout::{ForceLayout, ForceLayoutOptions};
use crate::links::{EdgeTable, Link, NodeSet, aggregate};
use crate::matrix::WeightMatrix;

/// Step count used by [`Graph::frame`].
pub const DEFAULT_FRAME_STEPS: usize = 120;

/// A weighted, directed link graph.
///
/// Links are stored as a canonical [`EdgeTable`]: `source` and `target` are node identifiers and
/// `weight` is the summed weight (or the duplicate count when the input had no weight column).
#[derive(Debug, Clone, PartialEq)]
pub struct Graph<N> {
    links: EdgeTable<N>,
}

impl<N: Ord + Hash + Clone> Graph<N> {
    /// Aggregates raw rows. See [`aggregate`].
    pub fn from_links<I>(rows: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Link<N>>,
    {
        Self {
            links: aggregate(rows),
        }
    }

    /// Raw weight matrix, one row per source node in node order.
    pub fn matrix(&self) -> WeightMatrix {
        WeightMatrix::from_table(&self.links)
    }

    pub fn force_layout(&self) -> Result<ForceLayout<'_, N>> {
        ForceLayout::new(self)
    }

    /// Final positions after [`DEFAULT_FRAME_STEPS`] steps from a random start.
    pub fn frame(&self) -> Result<LayoutResult<N>> {
        ForceLayout::with_options(self, ForceLayoutOptions::default())?.frame(DEFAULT_FRAME_STEPS)
    }
}

impl<N> Graph<N> {
    pub fn links(&self) -> &EdgeTable<N> {
        &self.links
    }

    pub fn nodes(&self) -> &NodeSet<N> {
        self.links.nodes()
    }

    /// Number of canonical links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link<N>> {
        self.links.iter()
    }
}

/// An already canonical table is taken as-is.
impl<N> From<EdgeTable<N>> for Graph<N> {
    fn from(links: EdgeTable<N>) -> Self {
        Self { links }
    }
}

impl<'a, N> IntoIterator for &'a Graph<N> {
    type Item = &'a Link<N>;
    type IntoIter = std::slice::Iter<'a, Link<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl<N: fmt::Display> fmt::Display for Graph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph with {} links", self.len())?;
        for link in self {
            write!(f, "\n{} {} {}", link.source, link.target, link.weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult<N: Ord> {
    pub positions: BTreeMap<N, Point>,
}

impl<N: Ord> LayoutResult<N> {
    pub fn get(&self, node: &N) -> Option<Point> {
        self.positions.get(node).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
