//! # Rotation quaternions
//!
//! [`RotationQuaternion`] stores a scalar part `q0` and a vector part `q⃗ = (q1, q2, q3)` by value.
//! It represents a rotation when of unit norm; construction from an axis-angle pair produces
//! the canonical unit quaternion `(cos θ/2, â sin θ/2)`.
//!
//! Product rule, for `p = (p0, p⃗)` and `q = (q0, q⃗)`:
//!
//! ```text
//! p·q = (p0 q0 − p⃗·q⃗,  p0 q⃗ + q0 p⃗ + p⃗ × q⃗)
//! ```
//!
//! Rotating a vector `v` embeds it as the pure quaternion `(0, v)` and evaluates the sandwich
//! `q v q⁻¹`. For a quaternion already known to be of unit norm, `q⁻¹ = q*` and
//! [`RotationQuaternion::rotate_unit`] skips the norm division.
use std::fmt;
use std::ops::{Add, Mul, Neg, Not, Sub};

use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationQuaternion {
    scalar: f64,
    vector: [f64; 3],
}

#[inline]
fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn as_vector3(v: &Vector, context: &'static str) -> Result<[f64; 3], GnomonError> {
    match v.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        other => Err(GnomonError::DimensionMismatch {
            context,
            expected: 3,
            found: other.len(),
        }),
    }
}

impl RotationQuaternion {
    pub fn new(q0: f64, q1: f64, q2: f64, q3: f64) -> Self {
        RotationQuaternion {
            scalar: q0,
            vector: [q1, q2, q3],
        }
    }

    pub fn identity() -> Self {
        RotationQuaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Pure quaternion `(0, v)` embedding a 3-vector.
    pub fn pure(v: &Vector) -> Result<Self, GnomonError> {
        let [x, y, z] = as_vector3(v, "pure quaternion")?;
        Ok(RotationQuaternion::new(0.0, x, y, z))
    }

    /// Unit quaternion rotating by `angle` (radians) about `axis`.
    ///
    /// The axis is normalized internally; its length is irrelevant but must not be zero.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if `axis` is not 3-dimensional.
    /// * [`GnomonError::ArithmeticDegeneracy`] if `axis` has zero length.
    pub fn from_axis_angle(angle: f64, axis: &Vector) -> Result<Self, GnomonError> {
        let [x, y, z] = as_vector3(&axis.normalized()?, "rotation axis")?;
        let (sin, cos) = (angle / 2.0).sin_cos();
        Ok(RotationQuaternion::new(cos, x * sin, y * sin, z * sin))
    }

    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    pub fn vector(&self) -> Vector {
        Vector::from(self.vector)
    }

    /// Squared norm `q0² + |q⃗|²`.
    pub fn norm_squared(&self) -> f64 {
        self.scalar * self.scalar + dot3(&self.vector, &self.vector)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// `(q0, −q⃗)`
    pub fn conjugate(&self) -> Self {
        let [x, y, z] = self.vector;
        RotationQuaternion::new(self.scalar, -x, -y, -z)
    }

    /// Multiplicative inverse `q* / |q|²`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::ArithmeticDegeneracy`] for the zero quaternion.
    pub fn inverse(&self) -> Result<Self, GnomonError> {
        let norm2 = self.norm_squared();
        if norm2 == 0.0 || !norm2.is_finite() {
            return Err(GnomonError::ArithmeticDegeneracy(
                "inverse of a zero-norm quaternion",
            ));
        }
        Ok(self.conjugate() * (1.0 / norm2))
    }

    /// Scale both parts to unit norm, in place.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::ArithmeticDegeneracy`] for the zero quaternion.
    pub fn normalize(&mut self) -> Result<&mut Self, GnomonError> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(GnomonError::ArithmeticDegeneracy(
                "normalization of a zero-norm quaternion",
            ));
        }
        self.scalar /= norm;
        for c in self.vector.iter_mut() {
            *c /= norm;
        }
        Ok(self)
    }

    /// Rotate `v` with the full sandwich `q v q⁻¹`; valid for any non-zero quaternion.
    pub fn rotate(&self, v: &Vector) -> Result<Vector, GnomonError> {
        let rotated = *self * RotationQuaternion::pure(v)? * self.inverse()?;
        Ok(rotated.vector())
    }

    /// Rotate `v` with `q v q*`, assuming `self` is of unit norm.
    pub fn rotate_unit(&self, v: &Vector) -> Result<Vector, GnomonError> {
        let rotated = *self * RotationQuaternion::pure(v)? * self.conjugate();
        Ok(rotated.vector())
    }

    /// Equivalent 3×3 rotation matrix `R` such that `R v == q v q⁻¹`.
    ///
    /// The quaternion is normalized first, so any non-zero scaling yields the same matrix.
    pub fn to_rotation_matrix(&self) -> Result<Matrix, GnomonError> {
        let mut unit = *self;
        unit.normalize()?;
        let q0 = unit.scalar;
        let [q1, q2, q3] = unit.vector;

        Matrix::from_row_major(
            3,
            3,
            vec![
                q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
                2.0 * (q1 * q2 - q0 * q3),
                2.0 * (q1 * q3 + q0 * q2),
                2.0 * (q2 * q1 + q0 * q3),
                q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,
                2.0 * (q2 * q3 - q0 * q1),
                2.0 * (q3 * q1 - q0 * q2),
                2.0 * (q3 * q2 + q0 * q1),
                q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
            ],
        )
    }
}

impl Mul for RotationQuaternion {
    type Output = RotationQuaternion;

    fn mul(self, rhs: RotationQuaternion) -> RotationQuaternion {
        let (p0, p) = (self.scalar, &self.vector);
        let (q0, q) = (rhs.scalar, &rhs.vector);
        let pxq = cross3(p, q);
        RotationQuaternion {
            scalar: p0 * q0 - dot3(p, q),
            vector: [
                p0 * q[0] + q0 * p[0] + pxq[0],
                p0 * q[1] + q0 * p[1] + pxq[1],
                p0 * q[2] + q0 * p[2] + pxq[2],
            ],
        }
    }
}

impl Mul<f64> for RotationQuaternion {
    type Output = RotationQuaternion;

    fn mul(self, s: f64) -> RotationQuaternion {
        let [x, y, z] = self.vector;
        RotationQuaternion::new(self.scalar * s, x * s, y * s, z * s)
    }
}

impl Mul<RotationQuaternion> for f64 {
    type Output = RotationQuaternion;

    fn mul(self, q: RotationQuaternion) -> RotationQuaternion {
        q * self
    }
}

impl Add for RotationQuaternion {
    type Output = RotationQuaternion;

    fn add(self, rhs: RotationQuaternion) -> RotationQuaternion {
        let [a, b, c] = self.vector;
        let [x, y, z] = rhs.vector;
        RotationQuaternion::new(self.scalar + rhs.scalar, a + x, b + y, c + z)
    }
}

impl Neg for RotationQuaternion {
    type Output = RotationQuaternion;

    fn neg(self) -> RotationQuaternion {
        self * -1.0
    }
}

impl Sub for RotationQuaternion {
    type Output = RotationQuaternion;

    fn sub(self, rhs: RotationQuaternion) -> RotationQuaternion {
        self + (-rhs)
    }
}

/// `!q` is the multiplicative inverse.
impl Not for RotationQuaternion {
    type Output = Result<RotationQuaternion, GnomonError>;

    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl fmt::Display for RotationQuaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.vector;
        write!(f, "({} {} {} {})", self.scalar, x, y, z)
    }
}
