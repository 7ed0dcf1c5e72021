//! # Dense row-major matrix
//!
//! [`Matrix`] stores `rows × cols` scalars in a flat row-major buffer, with the invariant
//! `data.len() == rows * cols` maintained by every operation. It doubles as the append-only
//! result table of the ODE models ([`Matrix::push_row`]).
//!
//! ## Numerical kernels
//!
//! - [`Matrix::determinant`] – Leibniz permutation expansion. Factorial cost: it is bounded to
//!   order [`MAX_LEIBNIZ_ORDER`], which covers the 7×7 Butcher tableau; larger systems need an
//!   LU decomposition instead.
//! - [`Matrix::invert`] – Gauss-Jordan elimination with partial pivoting on `[A | I]`.
//!
//! Both are only defined for square matrices and report [`GnomonError::NotSquare`] otherwise.
use std::fmt;
use std::ops::{Index, IndexMut, Mul, Neg};

use itertools::Itertools;

use crate::gnomon_errors::GnomonError;
use crate::linalg::vector::Vector;

/// Largest order accepted by the permutation-expansion determinant.
pub const MAX_LEIBNIZ_ORDER: usize = 7;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Number of inversions of a permutation, i.e. pairs `i < j` with `perm[i] > perm[j]`.
fn inversion_count(perm: &[usize]) -> usize {
    perm.iter()
        .tuple_combinations::<(_, _)>()
        .filter(|(a, b)| a > b)
        .count()
}

impl Matrix {
    /// Zero matrix of shape `rows × cols`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from a row-major buffer.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, GnomonError> {
        if data.len() != rows * cols {
            return Err(GnomonError::DimensionMismatch {
                context: "row-major buffer",
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::new(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<usize, GnomonError> {
        if row >= self.rows {
            return Err(GnomonError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(GnomonError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    fn require_square(&self) -> Result<usize, GnomonError> {
        if !self.is_square() {
            return Err(GnomonError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.rows)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64, GnomonError> {
        let idx = self.check_bounds(row, col)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), GnomonError> {
        let idx = self.check_bounds(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Copy of row `row`.
    pub fn row(&self, row: usize) -> Result<Vector, GnomonError> {
        if row >= self.rows {
            return Err(GnomonError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        Ok(Vector::from_slice(
            &self.data[row * self.cols..(row + 1) * self.cols],
        ))
    }

    /// Copy of column `col`.
    pub fn col(&self, col: usize) -> Result<Vector, GnomonError> {
        if col >= self.cols {
            return Err(GnomonError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        Ok((0..self.rows)
            .map(|row| self.data[row * self.cols + col])
            .collect())
    }

    /// Iterate over the rows as vector copies.
    pub fn row_iter(&self) -> impl Iterator<Item = Vector> + '_ {
        self.data
            .chunks_exact(self.cols.max(1))
            .take(self.rows)
            .map(Vector::from_slice)
    }

    pub fn set_row(&mut self, row: usize, values: &Vector) -> Result<(), GnomonError> {
        if row >= self.rows {
            return Err(GnomonError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if values.dimension() != self.cols {
            return Err(GnomonError::DimensionMismatch {
                context: "set_row",
                expected: self.cols,
                found: values.dimension(),
            });
        }
        self.data[row * self.cols..(row + 1) * self.cols].copy_from_slice(values.as_slice());
        Ok(())
    }

    /// Exchange rows `i` and `j`.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> Result<&mut Self, GnomonError> {
        if i == j {
            self.row(i)?;
            return Ok(self);
        }
        let row_i = self.row(i)?;
        let row_j = self.row(j)?;
        self.set_row(i, &row_j)?;
        self.set_row(j, &row_i)?;
        Ok(self)
    }

    /// Append `values` as a new last row.
    ///
    /// An empty matrix adopts the vector's dimension as its width.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if the width differs from `self.cols()`.
    pub fn push_row(&mut self, values: &Vector) -> Result<&mut Self, GnomonError> {
        if self.rows == 0 && self.cols == 0 {
            self.cols = values.dimension();
        } else if values.dimension() != self.cols {
            return Err(GnomonError::DimensionMismatch {
                context: "push_row",
                expected: self.cols,
                found: values.dimension(),
            });
        }
        self.data.extend_from_slice(values.as_slice());
        self.rows += 1;
        Ok(self)
    }

    /// Append `values` as a new last column (transpose, push a row, transpose back).
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if the height differs from `self.rows()`.
    pub fn push_col(&mut self, values: &Vector) -> Result<&mut Self, GnomonError> {
        if !(self.rows == 0 && self.cols == 0) && values.dimension() != self.rows {
            return Err(GnomonError::DimensionMismatch {
                context: "push_col",
                expected: self.rows,
                found: values.dimension(),
            });
        }
        self.transpose();
        self.push_row(values)?;
        Ok(self.transpose())
    }

    /// Transpose in place and return `self` for chaining.
    pub fn transpose(&mut self) -> &mut Self {
        let mut data = Vec::with_capacity(self.data.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                data.push(self.data[row * self.cols + col]);
            }
        }
        std::mem::swap(&mut self.rows, &mut self.cols);
        self.data = data;
        self
    }

    pub fn transposed(&self) -> Matrix {
        let mut out = self.clone();
        out.transpose();
        out
    }

    pub fn try_add(&self, other: &Matrix) -> Result<Matrix, GnomonError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(GnomonError::DimensionMismatch {
                context: "matrix addition",
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        })
    }

    /// Matrix product `self · other` (plain triple loop).
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if `self.cols() != other.rows()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix, GnomonError> {
        if self.cols != other.rows {
            return Err(GnomonError::DimensionMismatch {
                context: "matrix product",
                expected: self.cols,
                found: other.rows,
            });
        }
        let mut out = Matrix::new(self.rows, other.cols);
        for row in 0..self.rows {
            for col in 0..other.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self.data[row * self.cols + k] * other.data[k * other.cols + col];
                }
                out.data[row * other.cols + col] = acc;
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self · v`.
    pub fn mul_vector(&self, v: &Vector) -> Result<Vector, GnomonError> {
        if v.dimension() != self.cols {
            return Err(GnomonError::DimensionMismatch {
                context: "matrix-vector product",
                expected: self.cols,
                found: v.dimension(),
            });
        }
        Ok(self
            .row_iter()
            .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Determinant by Leibniz permutation expansion:
    /// `det A = Σ_σ (−1)^{inv(σ)} Π_i A[i, σ(i)]`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::NotSquare`] for a non-square matrix.
    /// * [`GnomonError::DeterminantOrderTooLarge`] above [`MAX_LEIBNIZ_ORDER`].
    pub fn determinant(&self) -> Result<f64, GnomonError> {
        let n = self.require_square()?;
        if n > MAX_LEIBNIZ_ORDER {
            return Err(GnomonError::DeterminantOrderTooLarge {
                order: n,
                max: MAX_LEIBNIZ_ORDER,
            });
        }
        if n == 0 {
            return Ok(1.0);
        }

        Ok((0..n)
            .permutations(n)
            .map(|perm| {
                let sign = if inversion_count(&perm) % 2 == 0 {
                    1.0
                } else {
                    -1.0
                };
                let term: f64 = perm
                    .iter()
                    .enumerate()
                    .map(|(row, &col)| self.data[row * n + col])
                    .product();
                sign * term
            })
            .sum())
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// The matrix is augmented with an identity block. For every pivot column the row with the
    /// largest-magnitude candidate (from the pivot row downward) is swapped into place and
    /// normalized, the column is eliminated from the rows below, and a second, upward pass
    /// clears the entries above each pivot. The right half of the augmented matrix is the
    /// inverse.
    ///
    /// Only an exactly zero (or non-finite) pivot stops the elimination, so badly scaled but
    /// invertible matrices such as `diag(1, 1e-17)` are inverted. See
    /// [`Matrix::invert_with_tolerance`] for a rank-revealing variant.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::NotSquare`] for a non-square matrix.
    /// * [`GnomonError::SingularMatrix`] carrying the column of the vanishing pivot.
    pub fn invert(&self) -> Result<Matrix, GnomonError> {
        let n = self.require_square()?;
        self.gauss_jordan(n, 0.0)
    }

    /// Like [`Matrix::invert`], but a pivot with `|pivot| ≤ tolerance · max|Aᵢⱼ|` counts as
    /// zero. With `tolerance = n·ε` this rejects matrices that are singular up to rounding,
    /// e.g. `[[1, 2, 3], [4, 5, 6], [7, 8, 9]]`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::NotSquare`] for a non-square matrix.
    /// * [`GnomonError::ArithmeticDegeneracy`] for a negative or non-finite `tolerance`.
    /// * [`GnomonError::SingularMatrix`] carrying the column of the vanishing pivot.
    pub fn invert_with_tolerance(&self, tolerance: f64) -> Result<Matrix, GnomonError> {
        let n = self.require_square()?;
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(GnomonError::ArithmeticDegeneracy(
                "pivot tolerance must be finite and non-negative",
            ));
        }
        let scale = self.data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        self.gauss_jordan(n, tolerance * scale)
    }

    fn gauss_jordan(&self, n: usize, zero_pivot: f64) -> Result<Matrix, GnomonError> {
        let mut aug = self.clone();
        for i in 0..n {
            let mut unit = Vector::zeros(n);
            unit[i] = 1.0;
            aug.push_col(&unit)?;
        }
        let width = aug.cols;

        // forward pass
        for pivot in 0..n {
            let best = (pivot..n)
                .max_by(|&a, &b| {
                    aug.data[a * width + pivot]
                        .abs()
                        .total_cmp(&aug.data[b * width + pivot].abs())
                })
                .unwrap_or(pivot);

            let candidate = aug.data[best * width + pivot];
            if candidate.abs() <= zero_pivot || !candidate.is_finite() {
                return Err(GnomonError::SingularMatrix(pivot));
            }
            aug.swap_rows(pivot, best)?;

            let pivot_row = aug.row(pivot)? / candidate;
            aug.set_row(pivot, &pivot_row)?;

            for row in pivot + 1..n {
                let coeff = aug.data[row * width + pivot];
                let mut target = aug.row(row)?;
                target.add_scaled(-coeff, &pivot_row)?;
                aug.set_row(row, &target)?;
            }
        }

        // backward pass
        for pivot in (1..n).rev() {
            let pivot_row = aug.row(pivot)?;
            for row in (0..pivot).rev() {
                let coeff = aug.data[row * width + pivot];
                let mut target = aug.row(row)?;
                target.add_scaled(-coeff, &pivot_row)?;
                aug.set_row(row, &target)?;
            }
        }

        let mut inverse = Matrix::new(n, n);
        for row in 0..n {
            inverse.data[row * n..(row + 1) * n]
                .copy_from_slice(&aug.data[row * width + n..(row + 1) * width]);
        }
        Ok(inverse)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "matrix index ({row}, {col}) out of range for {}x{}",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "matrix index ({row}, {col}) out of range for {}x{}",
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self * -1.0
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        -&self
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, s: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|x| x * s).collect(),
        }
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(self, s: f64) -> Matrix {
        &self * s
    }
}

impl Mul<&Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, m: &Matrix) -> Matrix {
        m * self
    }
}

/// One line per row, components separated by a single space.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_iter() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod matrix_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::DMatrix;
    use proptest::prelude::*;

    fn assert_identity(m: &Matrix, eps: f64) {
        assert!(m.is_square());
        for row in 0..m.rows() {
            for col in 0..m.cols() {
                let expected = if row == col { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(m[(row, col)], expected, epsilon = eps);
            }
        }
    }

    fn sample() -> Matrix {
        Matrix::from_row_major(
            3,
            3,
            vec![2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0],
        )
        .unwrap()
    }

    #[test]
    fn test_buffer_invariant() {
        assert!(Matrix::from_row_major(2, 3, vec![0.0; 5]).is_err());
        let m = Matrix::new(2, 3);
        assert_eq!(m.as_slice().len(), 6);
        assert_eq!(
            m.get(2, 0),
            Err(GnomonError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            m.get(0, 3),
            Err(GnomonError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    #[should_panic]
    fn test_index_past_width_is_a_fault() {
        // (0, 3) maps inside the flat buffer of a 2x3 matrix but is still out of range
        let m = Matrix::new(2, 3);
        let _ = m[(0, 3)];
    }

    #[test]
    fn test_rows_and_cols_are_copies() {
        let mut m = sample();
        let mut r = m.row(1).unwrap();
        r[0] = 100.0;
        assert_eq!(m[(1, 0)], -1.0);
        assert_eq!(m.col(2).unwrap(), Vector::from([0.0, -1.0, 2.0]));

        m.swap_rows(0, 2).unwrap();
        assert_eq!(m.row(0).unwrap(), Vector::from([0.0, -1.0, 2.0]));
        assert_eq!(m.row(2).unwrap(), Vector::from([2.0, -1.0, 0.0]));
        assert!(m.swap_rows(0, 3).is_err());
    }

    #[test]
    fn test_push_row_and_col() {
        let mut table = Matrix::default();
        table.push_row(&Vector::from([1.0, 2.0])).unwrap();
        table.push_row(&Vector::from([3.0, 4.0])).unwrap();
        assert_eq!((table.rows(), table.cols()), (2, 2));
        assert_eq!(
            table.push_row(&Vector::from([1.0, 2.0, 3.0])).unwrap_err(),
            GnomonError::DimensionMismatch {
                context: "push_row",
                expected: 2,
                found: 3
            }
        );

        table.push_col(&Vector::from([5.0, 6.0])).unwrap();
        assert_eq!(
            table,
            Matrix::from_row_major(2, 3, vec![1.0, 2.0, 5.0, 3.0, 4.0, 6.0]).unwrap()
        );
        assert!(table.push_col(&Vector::from([1.0])).is_err());
    }

    #[test]
    fn test_transpose_mutates_and_returns() {
        let mut m = Matrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = m.transpose().clone();
        assert_eq!((m.rows(), m.cols()), (3, 2));
        assert_eq!(t, m);
        assert_eq!(m.row(0).unwrap(), Vector::from([1.0, 4.0]));
    }

    #[test]
    fn test_arithmetic() {
        let a = sample();
        let i = Matrix::identity(3);
        assert_eq!(a.matmul(&i).unwrap(), a);
        assert_eq!(a.try_add(&-&a).unwrap(), Matrix::new(3, 3));
        assert_eq!((2.0 * &a)[(0, 0)], 4.0);
        assert!(a.try_add(&Matrix::new(3, 2)).is_err());
        assert!(a.matmul(&Matrix::new(2, 3)).is_err());

        let v = a.mul_vector(&Vector::from([1.0, 1.0, 1.0])).unwrap();
        assert_eq!(v, Vector::from([1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_determinant() {
        for n in 1..=7 {
            assert_eq!(Matrix::identity(n).determinant().unwrap(), 1.0);
        }
        assert_abs_diff_eq!(sample().determinant().unwrap(), 4.0, epsilon = 1e-12);

        let swapped = Matrix::from_row_major(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(swapped.determinant().unwrap(), -1.0);

        assert_eq!(
            Matrix::new(2, 3).determinant(),
            Err(GnomonError::NotSquare { rows: 2, cols: 3 })
        );
        assert!(matches!(
            Matrix::identity(8).determinant(),
            Err(GnomonError::DeterminantOrderTooLarge { order: 8, .. })
        ));
    }

    #[test]
    fn test_invert() {
        let a = sample();
        let inv = a.invert().unwrap();
        assert_identity(&a.matmul(&inv).unwrap(), 1e-12);

        // needs a row swap on the first pivot
        let p = Matrix::from_row_major(3, 3, vec![0.0, 2.0, 1.0, 1.0, 0.0, 0.0, 3.0, 0.0, 1.0])
            .unwrap();
        assert_identity(&p.matmul(&p.invert().unwrap()).unwrap(), 1e-12);

        assert!(Matrix::new(2, 3).invert().is_err());
    }

    #[test]
    fn test_invert_singular() {
        let s = Matrix::from_row_major(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.invert(), Err(GnomonError::SingularMatrix(1)));

        let s = Matrix::from_row_major(
            3,
            3,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        )
        .unwrap();
        let tolerance = 3.0 * f64::EPSILON;
        assert_eq!(
            s.invert_with_tolerance(tolerance),
            Err(GnomonError::SingularMatrix(2))
        );
        assert!(s.invert_with_tolerance(-1.0).is_err());
    }

    #[test]
    fn test_invert_badly_scaled() {
        let d = Matrix::from_row_major(2, 2, vec![1.0, 0.0, 0.0, 1e-17]).unwrap();
        assert_eq!(d.determinant(), Ok(1e-17));

        let inv = d.invert().unwrap();
        assert_eq!(inv[(0, 0)], 1.0);
        assert_relative_eq!(inv[(1, 1)], 1e17, max_relative = 1e-15);
        assert_eq!(inv[(0, 1)], 0.0);
        assert_eq!(inv[(1, 0)], 0.0);
        assert_identity(&d.matmul(&inv).unwrap(), 1e-12);

        // rank-revealing variant treats the tiny pivot as zero
        assert_eq!(
            d.invert_with_tolerance(2.0 * f64::EPSILON),
            Err(GnomonError::SingularMatrix(1))
        );
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_row_major(2, 2, vec![1.0, 2.5, -3.0, 4.0]).unwrap();
        assert_eq!(format!("{m}"), "1 2.5\n-3 4\n");
    }

    fn dominant(n: usize) -> impl Strategy<Value = Matrix> {
        prop::collection::vec(-1.0..1.0_f64, n * n).prop_map(move |mut data| {
            for i in 0..n {
                data[i * n + i] += n as f64 + 1.0;
            }
            Matrix::from_row_major(n, n, data).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_double_transpose(rows in 1..6usize, cols in 1..6usize, seed in prop::collection::vec(-1e3..1e3_f64, 36)) {
            let a = Matrix::from_row_major(rows, cols, seed[..rows * cols].to_vec()).unwrap();
            prop_assert_eq!(a.transposed().transposed(), a);
        }

        #[test]
        fn prop_inverse_is_right_inverse(a in (1..=7usize).prop_flat_map(dominant)) {
            let product = a.matmul(&a.invert().unwrap()).unwrap();
            for row in 0..a.rows() {
                for col in 0..a.cols() {
                    let expected = if row == col { 1.0 } else { 0.0 };
                    prop_assert!((product[(row, col)] - expected).abs() <= 1e-9);
                }
            }
        }

        #[test]
        fn prop_determinant_matches_nalgebra(a in (1..=5usize).prop_flat_map(dominant)) {
            let reference = DMatrix::from(&a).determinant();
            let det = a.determinant().unwrap();
            prop_assert!((det - reference).abs() <= 1e-9 * reference.abs().max(1.0));
        }
    }
}
