#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense row-major `rows x cols` matrix of f32.
///
/// Only the three operations the pathway needs are provided:
/// - row vector times matrix (`v · M`),
/// - transposed product (`Mᵀ · v`, same arithmetic as `v · M`),
/// - rank-1 accumulate (`M += s · u ⊗ v`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix entry by entry, visiting rows in order.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// `out = v · M` with `v.len() == rows` and `out.len() == cols`.
    ///
    /// Rows with a zero coefficient are skipped (one-hot inputs touch a single row).
    pub fn vec_mul_into(&self, v: &[f32], out: &mut [f32]) {
        debug_assert_eq!(v.len(), self.rows);
        debug_assert_eq!(out.len(), self.cols);

        out.fill(0.0);
        for (r, &x) in v.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            for (o, &w) in out.iter_mut().zip(self.row(r)) {
                *o += x * w;
            }
        }
    }

    /// `out = Mᵀ · v`. Identical to [`Matrix::vec_mul_into`]; kept as its own
    /// name so call sites read like the math they implement.
    #[inline]
    pub fn transpose_mul_into(&self, v: &[f32], out: &mut [f32]) {
        self.vec_mul_into(v, out);
    }

    /// `M += scale · u ⊗ v` with `u.len() == rows`, `v.len() == cols`.
    pub fn add_outer(&mut self, scale: f32, u: &[f32], v: &[f32]) {
        debug_assert_eq!(u.len(), self.rows);
        debug_assert_eq!(v.len(), self.cols);

        if scale == 0.0 {
            return;
        }
        let cols = self.cols;
        for (r, &x) in u.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            let k = scale * x;
            let row = &mut self.data[r * cols..(r + 1) * cols];
            for (w, &y) in row.iter_mut().zip(v) {
                *w += k * y;
            }
        }
    }
}
