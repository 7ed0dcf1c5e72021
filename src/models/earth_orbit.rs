//! Point-mass heliocentric motion.
//!
//! State `(x, y, z, vx, vy, vz)` in meters and m/s, equations of motion
//! `r̈ = −μ r / |r|³` with `μ` defaulting to [`GM_SUN`].
use crate::constants::{GM_SUN, REFERENCE_EARTH_STATE};
use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::models::{check_state_dimension, OdeModel};

pub const STATE_DIMENSION: usize = 6;

#[derive(Debug, Clone)]
pub struct EarthOrbitModel {
    mu: f64,
    results: Matrix,
}

impl EarthOrbitModel {
    /// Build a model around a central body of gravitational parameter `mu` (m³/s²).
    pub fn new(mu: f64) -> Self {
        EarthOrbitModel {
            mu,
            results: Matrix::default(),
        }
    }

    /// Heliocentric Earth state at 2024-01-01 00:00 UTC.
    pub fn reference_state() -> Vector {
        Vector::from(REFERENCE_EARTH_STATE)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Position part of a 6-D state.
    pub fn position(state: &Vector) -> Result<Vector, GnomonError> {
        check_state_dimension(state, STATE_DIMENSION, "orbital state")?;
        Ok(Vector::from_slice(&state.as_slice()[..3]))
    }

    /// Velocity part of a 6-D state.
    pub fn velocity(state: &Vector) -> Result<Vector, GnomonError> {
        check_state_dimension(state, STATE_DIMENSION, "orbital state")?;
        Ok(Vector::from_slice(&state.as_slice()[3..]))
    }

    /// Specific orbital energy `v²/2 − μ/r` in J/kg.
    ///
    /// Conserved by the exact flow, so its drift over a run measures the integration error.
    pub fn specific_energy(&self, state: &Vector) -> Result<f64, GnomonError> {
        let r = Self::position(state)?.length();
        if r == 0.0 {
            return Err(GnomonError::ArithmeticDegeneracy(
                "orbital state at the attracting center",
            ));
        }
        let v = Self::velocity(state)?.length();
        Ok(0.5 * v * v - self.mu / r)
    }

    /// One raw state per accepted step.
    pub fn results(&self) -> &Matrix {
        &self.results
    }
}

impl Default for EarthOrbitModel {
    fn default() -> Self {
        Self::new(GM_SUN)
    }
}

impl OdeModel for EarthOrbitModel {
    fn derivative(&self, state: &Vector, _t: f64) -> Result<Vector, GnomonError> {
        let position = Self::position(state)?;
        let r = position.length();
        if r == 0.0 {
            return Err(GnomonError::ArithmeticDegeneracy(
                "orbital state at the attracting center",
            ));
        }
        let acceleration = position * (-self.mu / (r * r * r));

        Ok(Self::velocity(state)?.concat(&acceleration))
    }

    fn accept(&mut self, state: &Vector, _t: f64) -> Result<(), GnomonError> {
        self.results.push_row(state)?;
        Ok(())
    }
}
