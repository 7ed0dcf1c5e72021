//! Planar circular restricted three-body problem in the rotating frame.
//!
//! Non-dimensional units: the primaries (mass ratio `μ`) sit at `x = −μ` and `x = 1 − μ`,
//! their separation and the angular rate of the frame are 1. The state layout is
//! `(x, ẋ, y, ẏ)`.
//!
//! With [`ARENSTORF_MU`] and [`ARENSTORF_INITIAL_STATE`] the trajectory is the Arenstorf
//! periodic orbit, a classic stress test for adaptive step control: the step size has to
//! shrink by orders of magnitude around each close approach to the Earth.
use crate::constants::{ARENSTORF_INITIAL_STATE, ARENSTORF_MU};
use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::models::{check_state_dimension, OdeModel};

pub const STATE_DIMENSION: usize = 4;

#[derive(Debug, Clone)]
pub struct RestrictedThreeBodyModel {
    mu: f64,
    results: Matrix,
}

impl RestrictedThreeBodyModel {
    pub fn new(mu: f64) -> Self {
        RestrictedThreeBodyModel {
            mu,
            results: Matrix::default(),
        }
    }

    /// Earth–Moon mass ratio of the Arenstorf orbit.
    pub fn arenstorf() -> Self {
        Self::new(ARENSTORF_MU)
    }

    /// Initial state of the Arenstorf periodic orbit.
    pub fn arenstorf_initial_state() -> Vector {
        Vector::from(ARENSTORF_INITIAL_STATE)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// One raw state per accepted step.
    pub fn results(&self) -> &Matrix {
        &self.results
    }
}

impl Default for RestrictedThreeBodyModel {
    fn default() -> Self {
        Self::arenstorf()
    }
}

impl OdeModel for RestrictedThreeBodyModel {
    fn derivative(&self, state: &Vector, _t: f64) -> Result<Vector, GnomonError> {
        check_state_dimension(state, STATE_DIMENSION, "three-body state")?;

        let (x, vx, y, vy) = (state[0], state[1], state[2], state[3]);
        let mu = self.mu;
        let mu_ = 1.0 - mu;

        // cubed distances to the two primaries
        let d1 = ((x + mu).powi(2) + y * y).powf(1.5);
        let d2 = ((x - mu_).powi(2) + y * y).powf(1.5);
        if d1 == 0.0 || d2 == 0.0 {
            return Err(GnomonError::ArithmeticDegeneracy(
                "three-body state coincides with a primary",
            ));
        }

        Ok(Vector::from([
            vx,
            x + 2.0 * vy - mu_ * (x + mu) / d1 - mu * (x - mu_) / d2,
            vy,
            y - 2.0 * vx - mu_ * y / d1 - mu * y / d2,
        ]))
    }

    fn accept(&mut self, state: &Vector, _t: f64) -> Result<(), GnomonError> {
        self.results.push_row(state)?;
        Ok(())
    }
}
