//! Force-directed relaxation in the style of Gephi's ForceAtlas2.
//!
//! Every node repels every other node with an inverse-distance force averaged over the graph,
//! links pull their endpoints together through the attraction [`Operator`], and the combined
//! force is smoothly clamped by a speed that cools linearly over the run.
//!
//! Positions are complex numbers internally (`x + iy`) and are exposed as parallel `x` / `y`
//! vectors in node order.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::iter::FusedIterator;

use nalgebra::{Complex, DVector};
use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, LayoutResult, Point};
use crate::links::NodeSet;
use crate::matrix::Operator;

mod forces;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceLayoutOptions {
    /// Floor for squared distances (repulsion) and force magnitudes (clamping).
    pub epsilon: f64,
    /// Speed of the first relaxation step.
    pub initial_speed: f64,
    /// Speed of the last relaxation step.
    pub final_speed: f64,
}

impl Default for ForceLayoutOptions {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            initial_speed: 1.0,
            final_speed: 0.1,
        }
    }
}

/// Caller-provided starting coordinates. An empty axis is drawn from a standard normal
/// distribution instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialPositions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl InitialPositions {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn random() -> Self {
        Self::default()
    }
}

/// Coordinates after one step, in node order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Snapshot {
    fn of(z: &DVector<Complex<f64>>) -> Self {
        Self {
            x: z.iter().map(|p| p.re).collect(),
            y: z.iter().map(|p| p.im).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn point(&self, i: usize) -> Option<Point> {
        Some(Point {
            x: *self.x.get(i)?,
            y: *self.y.get(i)?,
        })
    }
}

/// A graph prepared for layout. The operator is built once and shared read-only by every run.
#[derive(Debug, Clone)]
pub struct ForceLayout<'g, N> {
    nodes: &'g NodeSet<N>,
    operator: Operator,
    options: ForceLayoutOptions,
}

impl<'g, N: Ord + Hash + Clone> ForceLayout<'g, N> {
    pub fn new(graph: &'g Graph<N>) -> Result<Self> {
        Self::with_options(graph, ForceLayoutOptions::default())
    }

    pub fn with_options(graph: &'g Graph<N>, options: ForceLayoutOptions) -> Result<Self> {
        let nodes = graph.nodes();
        if nodes.is_empty() {
            return Err(Error::EmptyGraph);
        }
        check_weights(graph)?;

        let weights = graph.matrix();
        let operator = Operator::attraction(&weights);
        tracing::debug!(
            nodes = nodes.len(),
            links = graph.len(),
            total_weight = weights.total(),
            attraction = !operator.is_zero(),
            "built force layout operator"
        );

        Ok(Self {
            nodes,
            operator,
            options,
        })
    }

    /// Final node positions after `steps` snapshots from a random start.
    pub fn frame(&self, steps: usize) -> Result<LayoutResult<N>> {
        self.frame_from(steps, InitialPositions::random())
    }

    pub fn frame_from(&self, steps: usize, start: InitialPositions) -> Result<LayoutResult<N>> {
        self.frame_with_rng(steps, start, &mut rand::thread_rng())
    }

    pub fn frame_with_rng<R: Rng + ?Sized>(
        &self,
        steps: usize,
        start: InitialPositions,
        rng: &mut R,
    ) -> Result<LayoutResult<N>> {
        let last = self.run_with_rng(steps, start, rng)?.last();
        let mut positions: BTreeMap<N, Point> = BTreeMap::new();
        if let Some(last) = last {
            for (i, node) in self.nodes.iter().enumerate() {
                if let Some(p) = last.point(i) {
                    positions.insert(node.clone(), p);
                }
            }
        }
        Ok(LayoutResult { positions })
    }
}

/// Every weight, and the running total of the off-diagonal ones, must be finite. Rows number the
/// canonical links of `graph`.
fn check_weights<N: PartialEq>(graph: &Graph<N>) -> Result<()> {
    let mut total = 0.0_f64;
    for (row, link) in graph.iter().enumerate() {
        if !link.weight.is_finite() {
            return Err(Error::invalid_input(
                row,
                format!("link weight {} is not finite", link.weight),
            ));
        }
        if link.source != link.target {
            total += link.weight;
            if !total.is_finite() {
                return Err(Error::invalid_input(row, "link weights overflow"));
            }
        }
    }
    Ok(())
}

impl<N> ForceLayout<'_, N> {
    pub fn nodes(&self) -> &NodeSet<N> {
        self.nodes
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn options(&self) -> &ForceLayoutOptions {
        &self.options
    }

    /// Lazily yields `steps` snapshots, starting from a random placement.
    pub fn run(&self, steps: usize) -> Result<Layout<'_>> {
        self.run_from(steps, InitialPositions::random())
    }

    pub fn run_from(&self, steps: usize, start: InitialPositions) -> Result<Layout<'_>> {
        self.run_with_rng(steps, start, &mut rand::thread_rng())
    }

    /// Like [`ForceLayout::run_from`], drawing random axes from `rng`.
    ///
    /// Validation happens here; the returned iterator never fails.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        steps: usize,
        start: InitialPositions,
        rng: &mut R,
    ) -> Result<Layout<'_>> {
        if steps < 1 {
            return Err(Error::InvalidStepCount { steps });
        }

        let n = self.nodes.len();
        for (axis, seed) in [('x', &start.x), ('y', &start.y)] {
            if !seed.is_empty() && seed.len() != n {
                return Err(Error::InvalidSeed {
                    axis,
                    expected: n,
                    actual: seed.len(),
                });
            }
        }

        let x = if start.x.is_empty() {
            (0..n).map(|_| forces::standard_normal(rng)).collect()
        } else {
            start.x
        };
        let y = if start.y.is_empty() {
            (0..n).map(|_| forces::standard_normal(rng)).collect()
        } else {
            start.y
        };
        let positions =
            DVector::from_iterator(n, x.into_iter().zip(y).map(|(x, y)| Complex::new(x, y)));

        let speeds = forces::speed_schedule(
            steps - 1,
            self.options.initial_speed,
            self.options.final_speed,
        );
        tracing::debug!(nodes = n, steps, "starting force layout run");

        Ok(Layout {
            operator: &self.operator,
            epsilon: self.options.epsilon,
            positions,
            speeds: speeds.into_iter(),
            step: 0,
            started: false,
        })
    }
}

/// One layout run: the initial placement followed by one snapshot per relaxation step.
///
/// Each run owns its positions; dropping it releases everything.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    operator: &'a Operator,
    epsilon: f64,
    positions: DVector<Complex<f64>>,
    speeds: std::vec::IntoIter<f64>,
    step: usize,
    started: bool,
}

impl Layout<'_> {
    /// Index of the next snapshot.
    pub fn step(&self) -> usize {
        self.step
    }

    fn relax(&mut self, speed: f64) {
        let mut forces = forces::repulsion(&self.positions, self.epsilon);
        forces -= self.operator.apply(&self.positions);
        forces::limit(&mut forces, speed, self.epsilon);
        self.positions += &forces;

        tracing::trace!(
            step = self.step,
            speed,
            max_move = forces.iter().map(|f| f.norm()).fold(0.0, f64::max),
            "relaxation step"
        );
    }
}

impl Iterator for Layout<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if self.started {
            let speed = self.speeds.next()?;
            self.relax(speed);
        } else {
            self.started = true;
        }
        self.step += 1;
        Some(Snapshot::of(&self.positions))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.speeds.len() + usize::from(!self.started);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Layout<'_> {}

impl FusedIterator for Layout<'_> {}
