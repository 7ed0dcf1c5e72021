//! # ODE models
//!
//! A model is a right-hand side `ẋ = f(x, t)` paired with an event-detecting consumer of the
//! accepted integration steps. The [`OdeModel`] trait captures exactly those two capabilities;
//! the [`integrator::DormandPrince`](crate::integrator::DormandPrince) driver is generic over it.
//!
//! ## Variants
//!
//! | Model                                          | State | Recorded row                                   |
//! |------------------------------------------------|-------|------------------------------------------------|
//! | [`three_body::RestrictedThreeBodyModel`]       | 4     | raw state `(x, ẋ, y, ẏ)`                       |
//! | [`earth_orbit::EarthOrbitModel`]               | 6     | raw state `(x, y, z, vx, vy, vz)`              |
//! | [`sundial::SundialShadowModel`]                | 6     | `(east, north, up, zenith distance, elapsed)`  |
//! | [`daylight::DaylightBoundaryModel`]            | 6     | `(sunrise clock, sunset clock)`                |
//!
//! The sundial and daylight models reuse the point-mass dynamics of
//! [`earth_orbit::EarthOrbitModel`] by composition and add an
//! [`observer_site::ObserverSite`] for the topocentric geometry.
//!
//! Every model owns an append-only result table (a [`Matrix`](crate::linalg::matrix::Matrix))
//! exposed through an inherent `results()` method.
pub mod daylight;
pub mod earth_orbit;
pub mod observer_site;
pub mod sundial;
pub mod three_body;

use crate::gnomon_errors::GnomonError;
use crate::linalg::vector::Vector;

/// Right-hand side and accepted-step hook of an ODE model.
pub trait OdeModel {
    /// Time derivative of `state` at time `t`. Must not mutate the model.
    fn derivative(&self, state: &Vector, t: f64) -> Result<Vector, GnomonError>;

    /// Called by the integrator once per accepted step, in increasing time order,
    /// with the new state and time.
    fn accept(&mut self, state: &Vector, t: f64) -> Result<(), GnomonError>;
}

pub(crate) fn check_state_dimension(
    state: &Vector,
    expected: usize,
    context: &'static str,
) -> Result<(), GnomonError> {
    if state.dimension() != expected {
        return Err(GnomonError::DimensionMismatch {
            context,
            expected,
            found: state.dimension(),
        });
    }
    Ok(())
}
