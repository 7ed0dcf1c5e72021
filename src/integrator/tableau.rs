//! Dormand-Prince 5(4) coefficients
//!
//! Seven-stage embedded pair from Dormand & Prince (1980), "A family of embedded Runge-Kutta
//! formulae", J. Comp. Appl. Math. 6(1). The fifth-order weights equal the last row of `A`
//! (first same as last).

use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;

/// Number of stages
pub const STAGES: usize = 7;

/// Order of the propagated solution
pub const ORDER: u8 = 5;

/// Nodes c_i: stage i is evaluated at t + c_i h
pub const C: [f64; STAGES] = [0.0, 0.2, 0.3, 0.8, 8.0 / 9.0, 1.0, 1.0];

/// Runge-Kutta matrix a_ij (strictly lower triangular)
pub const A: [[f64; STAGES]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ],
];

/// Fifth-order weights
pub const B: [f64; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

/// Embedded fourth-order weights
pub const B_EMBEDDED: [f64; STAGES] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

/// Coefficients held as algebra values by each integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    pub c: Vector,
    pub a: Matrix,
    pub b: Vector,
    pub b_embedded: Vector,
}

impl ButcherTableau {
    pub fn dormand_prince() -> Result<Self, GnomonError> {
        Ok(ButcherTableau {
            c: Vector::from(C),
            a: Matrix::from_row_major(STAGES, STAGES, A.iter().flatten().copied().collect())?,
            b: Vector::from(B),
            b_embedded: Vector::from(B_EMBEDDED),
        })
    }

    pub fn stages(&self) -> usize {
        self.c.dimension()
    }
}

#[cfg(test)]
mod tableau_test {
    use super::*;

    const TOL: f64 = 1e-14;

    #[test]
    fn test_row_sum_condition() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum();
            assert!(
                (row_sum - C[i]).abs() < TOL,
                "row {i} sums to {row_sum}, expected c[{i}] = {}",
                C[i]
            );
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((B.iter().sum::<f64>() - 1.0).abs() < TOL);
        assert!((B_EMBEDDED.iter().sum::<f64>() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_first_same_as_last() {
        assert_eq!(A[STAGES - 1], B);
    }

    #[test]
    fn test_algebra_view() {
        let tableau = ButcherTableau::dormand_prince().unwrap();
        assert_eq!(tableau.stages(), STAGES);
        assert_eq!(tableau.a.row(STAGES - 1).unwrap(), tableau.b);
        // strictly lower triangular: every stage is explicit
        for i in 0..STAGES {
            for j in i..STAGES {
                assert_eq!(tableau.a[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_order_conditions() {
        // Σ b_i c_i = 1/2 and Σ b_i c_i² = 1/3 hold for both weight sets
        for weights in [B, B_EMBEDDED] {
            let first: f64 = weights.iter().zip(C).map(|(b, c)| b * c).sum();
            let second: f64 = weights.iter().zip(C).map(|(b, c)| b * c * c).sum();
            assert!((first - 0.5).abs() < TOL);
            assert!((second - 1.0 / 3.0).abs() < TOL);
        }
    }
}
