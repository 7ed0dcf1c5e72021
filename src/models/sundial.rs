//! Shadow of a vertical unit gnomon over a test day.
//!
//! The Earth is propagated from the run epoch; samples at or before the start of the test day
//! are ignored. For each later accepted step with the Sun above the horizon the model projects
//! the gnomon tip along the sunlight onto the horizontal plane, expresses the shadow vector in
//! the local (east, north, up) frame and records
//!
//! ```text
//! east  north  up  solar_zenith_distance  seconds_since_test_start
//! ```
//!
//! The shadow length is `tan(zenith distance)`; `up` vanishes up to rounding.
//!
//! The local frame is right-handed with columns in (east, north, up) order. Tables laid out
//! as (north, down, east) map onto it by `east = c3`, `north = c1`, `up = -c2`.
use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::models::earth_orbit::EarthOrbitModel;
use crate::models::observer_site::ObserverSite;
use crate::models::OdeModel;

#[derive(Debug, Clone)]
pub struct SundialShadowModel {
    orbit: EarthOrbitModel,
    site: ObserverSite,
    test_start: f64,
    results: Matrix,
}

impl SundialShadowModel {
    /// Arguments
    /// ---------
    /// * `orbit`: dynamics of the Earth
    /// * `site`: observer carrying the gnomon
    /// * `test_start`: start of the test day, in seconds after the run epoch
    pub fn new(orbit: EarthOrbitModel, site: ObserverSite, test_start: f64) -> Self {
        SundialShadowModel {
            orbit,
            site,
            test_start,
            results: Matrix::default(),
        }
    }

    pub fn site(&self) -> &ObserverSite {
        &self.site
    }

    pub fn test_start(&self) -> f64 {
        self.test_start
    }

    /// One `(east, north, up, zenith distance, elapsed)` row per sunlit sample.
    pub fn results(&self) -> &Matrix {
        &self.results
    }

    /// Shadow of the gnomon in the local frame, `None` when the Sun is below the horizon.
    pub fn shadow(&self, state: &Vector, t: f64) -> Result<Option<(Vector, f64)>, GnomonError> {
        let geometry = self
            .site
            .solar_geometry(&EarthOrbitModel::position(state)?, t)?;
        if !geometry.is_lit() {
            return Ok(None);
        }

        // tip + k·sunlight lands on the horizontal plane for k = -1 / cos_separation
        let mut shadow = geometry.zenith.clone();
        shadow.add_scaled(-1.0 / geometry.cos_separation, &geometry.sunlight)?;

        let local = self.site.local_frame(t)?.mul_vector(&shadow)?;
        Ok(Some((local, geometry.zenith_distance())))
    }
}

impl OdeModel for SundialShadowModel {
    fn derivative(&self, state: &Vector, t: f64) -> Result<Vector, GnomonError> {
        self.orbit.derivative(state, t)
    }

    fn accept(&mut self, state: &Vector, t: f64) -> Result<(), GnomonError> {
        if t <= self.test_start {
            return Ok(());
        }
        if let Some((local, zenith_distance)) = self.shadow(state, t)? {
            let row = local.concat(&Vector::from([zenith_distance, t - self.test_start]));
            self.results.push_row(&row)?;
        }
        Ok(())
    }
}
