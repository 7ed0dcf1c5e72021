//! # Dense linear algebra
//!
//! Small dense value types used by the integrator and the ODE models:
//!
//! - [`vector::Vector`] – dynamically sized `f64` vector with inline storage for short states,
//! - [`matrix::Matrix`] – row-major matrix, also used as an append-only result table,
//! - [`quaternion::RotationQuaternion`] – rotation quaternion built atop [`vector::Vector`].
//!
//! Conversions to and from [`nalgebra`] types are provided so the kernels can be cross-checked
//! against a reference implementation and so callers can hand results to `nalgebra` code.
pub mod matrix;
pub mod quaternion;
pub mod vector;

use nalgebra::{DMatrix, DVector, Vector3};

use crate::gnomon_errors::GnomonError;
use matrix::Matrix;
use vector::Vector;

impl From<&Vector> for DVector<f64> {
    fn from(v: &Vector) -> Self {
        DVector::from_column_slice(v.as_slice())
    }
}

impl From<&DVector<f64>> for Vector {
    fn from(v: &DVector<f64>) -> Self {
        Vector::from_slice(v.as_slice())
    }
}

impl From<Vector3<f64>> for Vector {
    fn from(v: Vector3<f64>) -> Self {
        Vector::from([v.x, v.y, v.z])
    }
}

impl TryFrom<&Vector> for Vector3<f64> {
    type Error = GnomonError;

    fn try_from(v: &Vector) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
            other => Err(GnomonError::DimensionMismatch {
                context: "Vector3 conversion",
                expected: 3,
                found: other.len(),
            }),
        }
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(m: &Matrix) -> Self {
        DMatrix::from_row_slice(m.rows(), m.cols(), m.as_slice())
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(m: &DMatrix<f64>) -> Self {
        let mut out = Matrix::new(m.nrows(), m.ncols());
        for row in 0..m.nrows() {
            for col in 0..m.ncols() {
                out[(row, col)] = m[(row, col)];
            }
        }
        out
    }
}

#[cfg(test)]
mod linalg_test {
    use super::*;
    use crate::linalg::quaternion::RotationQuaternion;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Rotation3, Unit};

    #[test]
    fn test_matrix_roundtrip_keeps_layout() {
        let m = Matrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let d = DMatrix::from(&m);
        assert_eq!(d[(0, 2)], 3.0);
        assert_eq!(d[(1, 0)], 4.0);
        assert_eq!(Matrix::from(&d), m);
    }

    #[test]
    fn test_inverse_matches_nalgebra() {
        let m = Matrix::from_row_major(3, 3, vec![4.0, 1.0, 2.0, 0.5, 3.0, -1.0, 2.0, 0.0, 5.0])
            .unwrap();
        let reference = DMatrix::from(&m).try_inverse().unwrap();
        let inv = m.invert().unwrap();
        for row in 0..3 {
            for col in 0..3 {
                assert_abs_diff_eq!(inv[(row, col)], reference[(row, col)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_quaternion_rotation_matches_nalgebra() {
        let axis = Vector3::new(1.0, -2.0, 0.5);
        let angle = 0.83;
        let v = Vector::from([0.3, 1.7, -2.2]);

        let q = RotationQuaternion::from_axis_angle(angle, &Vector::from(axis)).unwrap();
        let ours = Vector3::try_from(&q.rotate(&v).unwrap()).unwrap();

        let reference = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle)
            * Vector3::try_from(&v).unwrap();
        assert_abs_diff_eq!(ours, reference, epsilon = 1e-12);
    }

    #[test]
    fn test_vector3_requires_three_components() {
        assert!(Vector3::try_from(&Vector::zeros(4)).is_err());
        let back = Vector::from(&DVector::from(&Vector::from([1.0, 2.0])));
        assert_eq!(back, Vector::from([1.0, 2.0]));
    }
}
