//! Sparse link matrices.
//!
//! [`WeightMatrix`] stores one compressed row per source node. [`Operator`] is the attraction
//! operator `A = L + I` derived from it, where `L` is the out-degree Laplacian of the
//! diagonal-free weight matrix rescaled so its entries sum to the node count.

use std::hash::Hash;

use nalgebra::{Complex, DVector};

use crate::links::EdgeTable;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    dim: usize,
    // Compressed rows: row `i` owns `cols[row_start[i]..row_start[i + 1]]`.
    row_start: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl WeightMatrix {
    /// `W[i][j] = weight` for every link `i -> j`.
    ///
    /// Table links are sorted by `(source, target)` and node indices follow the same order, so
    /// entries arrive row-major with strictly increasing columns.
    pub fn from_table<N: Hash + Eq>(table: &EdgeTable<N>) -> Self {
        let dim = table.nodes().len();
        let mut triplets = Vec::with_capacity(table.len());
        for link in table {
            let (Some(i), Some(j)) = (table.node_index(&link.source), table.node_index(&link.target))
            else {
                continue;
            };
            triplets.push((i, j, link.weight));
        }
        Self::from_triplets(dim, triplets)
    }

    /// Builds a matrix from `(row, col, value)` entries. Repeated coordinates are summed.
    pub fn from_triplets(dim: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.retain(|&(i, j, _)| i < dim && j < dim);
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_start = vec![0usize; dim + 1];
        let mut cols: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;
        for (i, j, v) in triplets {
            if last == Some((i, j)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            last = Some((i, j));
            cols.push(j);
            values.push(v);
            row_start[i + 1] += 1;
        }
        for i in 0..dim {
            row_start[i + 1] += row_start[i];
        }

        Self {
            dim,
            row_start,
            cols,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_start[i]..self.row_start[i + 1];
        self.cols[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.dim {
            return 0.0;
        }
        self.row(i)
            .find(|&(col, _)| col == j)
            .map_or(0.0, |(_, v)| v)
    }

    /// `(row, col, value)` for every stored entry, row-major.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.dim).flat_map(move |i| self.row(i).map(move |(j, v)| (i, j, v)))
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.row(i).map(|(_, v)| v).sum()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Copy with every `W[i][i]` removed.
    pub fn without_diagonal(&self) -> Self {
        let triplets = self.entries().filter(|&(i, j, _)| i != j).collect();
        Self::from_triplets(self.dim, triplets)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self.values.iter().map(|v| v * factor).collect(),
            ..self.clone()
        }
    }
}

/// `A = L + I` over a normalized weight matrix, applied once per relaxation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    diagonal: Vec<f64>,
    off_diagonal: WeightMatrix,
}

impl Operator {
    /// Zeroes the diagonal of `weights`, rescales so the total is the node count, and forms the
    /// out-degree Laplacian plus identity.
    ///
    /// This departs from plain `L + I` in one case. When the off-diagonal total is zero (no
    /// links, or only self-loops) there is nothing to rescale and the operator is all zeros
    /// instead of the identity, so an isolated node is not pulled towards the origin and stays
    /// where it was placed. Weights are expected to be finite; [`ForceLayout`] rejects anything
    /// else before calling this.
    ///
    /// [`ForceLayout`]: crate::ForceLayout
    pub fn attraction(weights: &WeightMatrix) -> Self {
        let dim = weights.dim();
        let weights = weights.without_diagonal();
        let total = weights.total();

        if total == 0.0 {
            return Self {
                diagonal: vec![0.0; dim],
                off_diagonal: WeightMatrix::from_triplets(dim, Vec::new()),
            };
        }

        let weights = weights.scaled(dim as f64 / total);
        let diagonal = (0..dim).map(|i| weights.row_sum(i) + 1.0).collect();
        Self {
            diagonal,
            off_diagonal: weights.scaled(-1.0),
        }
    }

    pub fn dim(&self) -> usize {
        self.diagonal.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            self.diagonal.get(i).copied().unwrap_or(0.0)
        } else {
            self.off_diagonal.get(i, j)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.off_diagonal.nnz() == 0 && self.diagonal.iter().all(|&d| d == 0.0)
    }

    /// `A · z`.
    pub fn apply(&self, z: &DVector<Complex<f64>>) -> DVector<Complex<f64>> {
        DVector::from_fn(self.dim(), |i, _| {
            self.off_diagonal
                .row(i)
                .fold(z[i] * self.diagonal[i], |acc, (j, a)| acc + z[j] * a)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Operator, WeightMatrix};
    use nalgebra::{Complex, DVector};

    #[test]
    fn triplets_merge_repeated_coordinates() {
        let w = WeightMatrix::from_triplets(3, vec![(2, 0, 1.0), (0, 1, 2.0), (2, 0, 0.5)]);
        assert_eq!(w.nnz(), 2);
        assert_eq!(w.get(2, 0), 1.5);
        assert_eq!(w.get(0, 1), 2.0);
        assert_eq!(w.get(1, 1), 0.0);
        assert_eq!(w.total(), 3.5);
    }

    #[test]
    fn attraction_operator_is_laplacian_plus_identity() {
        // 0 -> 1 (1.0), 1 -> 2 (3.0), 2 -> 2 (5.0, dropped)
        let w = WeightMatrix::from_triplets(3, vec![(0, 1, 1.0), (1, 2, 3.0), (2, 2, 5.0)]);
        let a = Operator::attraction(&w);

        // Off-diagonal total 4.0, rescaled to 3.0.
        let s = 3.0 / 4.0;
        assert_eq!(a.get(0, 0), 1.0 * s + 1.0);
        assert_eq!(a.get(0, 1), -1.0 * s);
        assert_eq!(a.get(1, 1), 3.0 * s + 1.0);
        assert_eq!(a.get(1, 2), -3.0 * s);
        assert_eq!(a.get(2, 2), 1.0);
        assert_eq!(a.get(1, 0), 0.0);
    }

    #[test]
    fn attraction_rows_sum_to_one() {
        let w = WeightMatrix::from_triplets(
            4,
            vec![(0, 1, 2.0), (0, 3, 1.0), (1, 0, 4.0), (3, 2, 0.25)],
        );
        let a = Operator::attraction(&w);
        let ones = DVector::from_element(4, Complex::new(1.0, 0.0));
        let out = a.apply(&ones);
        for i in 0..4 {
            assert!((out[i].re - 1.0).abs() < 1e-12, "row {i}: {}", out[i]);
            assert_eq!(out[i].im, 0.0);
        }
    }

    #[test]
    fn self_loops_only_yield_zero_operator() {
        let w = WeightMatrix::from_triplets(2, vec![(0, 0, 1.0), (1, 1, 2.0)]);
        let a = Operator::attraction(&w);
        assert!(a.is_zero());
        let z = DVector::from_vec(vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 0.5)]);
        assert_eq!(a.apply(&z), DVector::from_element(2, Complex::new(0.0, 0.0)));
    }
}
