//! # Dense dynamically-sized vector
//!
//! [`Vector`] is the value type carried through the whole crate: ODE states, stage
//! rates, observer geometry and result-table rows are all `Vector`s.
//!
//! ## Conventions
//!
//! - **Value semantics**: `clone()` is a deep, independent copy. Storage is inline for up to
//!   [`INLINE_DIM`] components, which covers every state handled by the models.
//! - **Checked vs. faulting access**: [`Vector::get`] / [`Vector::set`] return
//!   [`GnomonError::IndexOutOfRange`]; `v[i]` panics like a slice does.
//! - **Ordering**: `==` is element-wise, `<` / `>` compare **magnitudes**. Two distinct
//!   vectors of the same magnitude are unordered (`partial_cmp` returns `None`), which keeps
//!   `PartialOrd` consistent with `PartialEq`.
//! - **Fallible arithmetic**: every binary operation that needs matching dimensions returns a
//!   `Result`; scaling and negation cannot fail and are exposed as operators.
//!
//! ## Rotations
//!
//! Two independent rotation paths are provided and are expected to agree to ~1e-10:
//!
//! - [`Vector::rotate_by_rodrigues`] – closed-form Rodrigues formula,
//! - [`Vector::rotate_by_quaternion_axis`] / [`Vector::rotate_by_quaternion`] – sandwich
//!   product with a [`RotationQuaternion`].
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Index, IndexMut, Mul, Neg};

use itertools::Itertools;
use smallvec::SmallVec;

use crate::gnomon_errors::GnomonError;
use crate::linalg::quaternion::RotationQuaternion;

/// Number of components stored without heap allocation.
pub const INLINE_DIM: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector {
    data: SmallVec<[f64; INLINE_DIM]>,
}

impl Vector {
    /// Zero vector of dimension `size`.
    pub fn zeros(size: usize) -> Self {
        Vector {
            data: SmallVec::from_elem(0.0, size),
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Vector {
            data: SmallVec::from_slice(values),
        }
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    /// Checked element read.
    pub fn get(&self, index: usize) -> Result<f64, GnomonError> {
        self.data
            .get(index)
            .copied()
            .ok_or(GnomonError::IndexOutOfRange {
                index,
                len: self.data.len(),
            })
    }

    /// Checked element write.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), GnomonError> {
        let len = self.data.len();
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GnomonError::IndexOutOfRange { index, len }),
        }
    }

    pub fn push(&mut self, value: f64) -> &mut Self {
        self.data.push(value);
        self
    }

    /// `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    fn check_same_dimension(&self, other: &Vector, context: &'static str) -> Result<(), GnomonError> {
        if self.dimension() != other.dimension() {
            return Err(GnomonError::DimensionMismatch {
                context,
                expected: self.dimension(),
                found: other.dimension(),
            });
        }
        Ok(())
    }

    /// Scalar product `Σ aᵢ bᵢ`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if the operands differ in length.
    pub fn dot(&self, other: &Vector) -> Result<f64, GnomonError> {
        self.check_same_dimension(other, "dot product")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Three-dimensional cross product `self × other`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] unless both operands have exactly 3 components.
    pub fn cross(&self, other: &Vector) -> Result<Vector, GnomonError> {
        for v in [self, other] {
            if v.dimension() != 3 {
                return Err(GnomonError::DimensionMismatch {
                    context: "cross product",
                    expected: 3,
                    found: v.dimension(),
                });
            }
        }
        let (a, b) = (&self.data, &other.data);
        Ok(Vector::from([
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]))
    }

    /// Euclidean norm.
    ///
    /// The squares are accumulated relative to the largest component and summed with
    /// Neumaier's compensated algorithm, so the result does not overflow for heliocentric
    /// distances and keeps small velocity components that a naive sum would absorb.
    pub fn length(&self) -> f64 {
        let scale = self.data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }

        let mut sum = 0.0_f64;
        let mut compensation = 0.0_f64;
        for x in self.data.iter() {
            let term = (x / scale) * (x / scale);
            let t = sum + term;
            if sum.abs() >= term.abs() {
                compensation += (sum - t) + term;
            } else {
                compensation += (term - t) + sum;
            }
            sum = t;
        }

        scale * (sum + compensation).sqrt()
    }

    /// Divide every component by [`Vector::length`], in place.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::ArithmeticDegeneracy`] for a zero-length (or non-finite) vector.
    pub fn normalize(&mut self) -> Result<&mut Self, GnomonError> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Err(GnomonError::ArithmeticDegeneracy(
                "normalization of a zero-length vector",
            ));
        }
        for x in self.data.iter_mut() {
            *x /= len;
        }
        Ok(self)
    }

    /// By-value variant of [`Vector::normalize`].
    pub fn normalized(&self) -> Result<Vector, GnomonError> {
        let mut out = self.clone();
        out.normalize()?;
        Ok(out)
    }

    /// New vector made of `self`'s components followed by `other`'s.
    pub fn concat(&self, other: &Vector) -> Vector {
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Vector { data }
    }

    pub fn try_add(&self, other: &Vector) -> Result<Vector, GnomonError> {
        self.check_same_dimension(other, "vector addition")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a + b)
            .collect())
    }

    pub fn try_sub(&self, other: &Vector) -> Result<Vector, GnomonError> {
        self.check_same_dimension(other, "vector subtraction")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a - b)
            .collect())
    }

    /// In-place `self += alpha * other`.
    pub fn add_scaled(&mut self, alpha: f64, other: &Vector) -> Result<&mut Self, GnomonError> {
        self.check_same_dimension(other, "scaled accumulation")?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += alpha * b;
        }
        Ok(self)
    }

    /// Rotate by `angle` about `axis` with Rodrigues' formula:
    /// `v cosθ + (â × v) sinθ + â (â·v)(1 − cosθ)`.
    ///
    /// Errors
    /// ------
    /// * [`GnomonError::DimensionMismatch`] if `self` or `axis` is not 3-dimensional.
    /// * [`GnomonError::ArithmeticDegeneracy`] if `axis` has zero length.
    pub fn rotate_by_rodrigues(&self, angle: f64, axis: &Vector) -> Result<Vector, GnomonError> {
        let axis = axis.normalized()?;
        let (sin, cos) = angle.sin_cos();

        let mut out = self * cos;
        out.add_scaled(sin, &axis.cross(self)?)?;
        out.add_scaled(axis.dot(self)? * (1.0 - cos), &axis)?;
        Ok(out)
    }

    /// Rotate by `angle` about `axis` through the unit quaternion `(cos θ/2, â sin θ/2)`.
    pub fn rotate_by_quaternion_axis(
        &self,
        angle: f64,
        axis: &Vector,
    ) -> Result<Vector, GnomonError> {
        RotationQuaternion::from_axis_angle(angle, axis)?.rotate_unit(self)
    }

    /// Rotate by an arbitrary (not necessarily unit) quaternion.
    ///
    /// A normalized copy of `q` is used, so only its direction in quaternion space matters.
    pub fn rotate_by_quaternion(&self, q: &RotationQuaternion) -> Result<Vector, GnomonError> {
        let mut unit = *q;
        unit.normalize()?;
        unit.rotate(self)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Vector {
            data: SmallVec::from_vec(values),
        }
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(values: [f64; N]) -> Self {
        Vector::from_slice(&values)
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Vector {
            data: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.data[index]
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.data.iter().map(|x| -x).collect()
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        -&self
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, s: f64) -> Vector {
        self.data.iter().map(|x| x * s).collect()
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, s: f64) -> Vector {
        &self * s
    }
}

impl Mul<&Vector> for f64 {
    type Output = Vector;

    fn mul(self, v: &Vector) -> Vector {
        v * self
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;

    fn mul(self, v: Vector) -> Vector {
        &v * self
    }
}

impl Div<f64> for &Vector {
    type Output = Vector;

    fn div(self, s: f64) -> Vector {
        self.data.iter().map(|x| x / s).collect()
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, s: f64) -> Vector {
        &self / s
    }
}

impl PartialOrd for Vector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match self.length().partial_cmp(&other.length()) {
            Some(Ordering::Equal) => None,
            ord => ord,
        }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.iter().join(" "))
    }
}
