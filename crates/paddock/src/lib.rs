#![forbid(unsafe_code)]

//! Force-directed layout for weighted link tables.
//!
//! Raw `(source, target[, weight])` rows are aggregated into a canonical [`EdgeTable`], wrapped
//! in a [`Graph`], and laid out by [`ForceLayout`], which yields one [`Snapshot`] of node
//! coordinates per relaxation step.
//!
//! ```no_run
//! use paddock::{Graph, InitialPositions};
//!
//! # fn main() -> paddock::Result<()> {
//! let graph = Graph::from_links([("alonso", "hamilton", 3.0), ("hamilton", "rosberg", 1.0)]);
//! let layout = graph.force_layout()?;
//! for snapshot in layout.run_from(50, InitialPositions::random())? {
//!     println!("{:?} {:?}", snapshot.x, snapshot.y);
//! }
//! let frame = layout.frame(120)?;
//! println!("{:?}", frame.get(&"alonso"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod layout;
pub mod links;
pub mod matrix;
pub mod table;

pub use error::{Error, Result};
pub use graph::{DEFAULT_FRAME_STEPS, Graph, LayoutResult, Point};
pub use layout::{ForceLayout, ForceLayoutOptions, InitialPositions, Layout, Snapshot};
pub use links::{EdgeTable, Link, NodeSet, aggregate};
pub use matrix::{Operator, WeightMatrix};
pub use table::NodeId;

/// Headless layout entry point: final positions after `steps` snapshots from a random start.
pub fn layout<N>(
    graph: &Graph<N>,
    steps: usize,
    options: ForceLayoutOptions,
) -> Result<LayoutResult<N>>
where
    N: Ord + std::hash::Hash + Clone,
{
    ForceLayout::with_options(graph, options)?.frame(steps)
}
