//! Ground observer on a spherical, uniformly rotating Earth.
//!
//! Time `t` is measured in seconds from the run epoch. The local sidereal angle is
//! `s(t) = s₀ + Ω t + λ`, with `s₀` the Greenwich mean sidereal time of the epoch,
//! `Ω` = [`EARTH_ROTATION_RATE`] and `λ` the east longitude.
use std::f64::consts::FRAC_PI_2;

use crate::constants::{Radian, EARTH_ROTATION_RATE, MJD};
use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::time::{gmst, wrap_angle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverSite {
    latitude: Radian,
    longitude: Radian,
    sidereal_origin: Radian,
}

/// Sun–observer geometry at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarGeometry {
    /// Observer zenith unit vector (equatorial frame).
    pub zenith: Vector,
    /// Unit heliocentric position of the Earth, i.e. the direction of sunlight.
    pub sunlight: Vector,
    /// `sunlight · zenith`; negative when the Sun is above the horizon.
    pub cos_separation: f64,
}

impl SolarGeometry {
    /// Angle between the direction of sunlight and the zenith, in `[0, π]`.
    pub fn separation(&self) -> Radian {
        self.cos_separation.clamp(-1.0, 1.0).acos()
    }

    /// True when the Sun is above the horizon.
    pub fn is_lit(&self) -> bool {
        self.separation() > FRAC_PI_2
    }

    /// Solar zenith distance: angle between the direction to the Sun and the zenith.
    pub fn zenith_distance(&self) -> Radian {
        std::f64::consts::PI - self.separation()
    }
}

impl ObserverSite {
    /// Observer at geodetic `latitude` / east `longitude` (radians), with the Earth
    /// orientation taken from the mean sidereal time at `epoch_mjd`.
    pub fn new(latitude: Radian, longitude: Radian, epoch_mjd: MJD) -> Result<Self, GnomonError> {
        if !(latitude.is_finite() && latitude.abs() <= FRAC_PI_2) {
            return Err(GnomonError::InvalidScenarioParameter(format!(
                "latitude must lie in [-pi/2, pi/2], got {latitude}"
            )));
        }
        if !longitude.is_finite() {
            return Err(GnomonError::InvalidScenarioParameter(format!(
                "longitude must be finite, got {longitude}"
            )));
        }
        Ok(ObserverSite {
            latitude,
            longitude,
            sidereal_origin: gmst(epoch_mjd),
        })
    }

    pub fn latitude(&self) -> Radian {
        self.latitude
    }

    pub fn longitude(&self) -> Radian {
        self.longitude
    }

    /// Local sidereal angle at `t` seconds after the epoch, wrapped into `(-π, π]`.
    pub fn local_sidereal_angle(&self, t: f64) -> Radian {
        wrap_angle(self.sidereal_origin + EARTH_ROTATION_RATE * t + self.longitude)
    }

    /// Zenith unit vector `(cos φ cos s, cos φ sin s, sin φ)`.
    pub fn zenith(&self, t: f64) -> Vector {
        let s = self.local_sidereal_angle(t);
        let (sin_phi, cos_phi) = self.latitude.sin_cos();
        Vector::from([cos_phi * s.cos(), cos_phi * s.sin(), sin_phi])
    }

    /// Rotation from the equatorial frame to the local (east, north, up) frame.
    pub fn local_frame(&self, t: f64) -> Result<Matrix, GnomonError> {
        let (sin_s, cos_s) = self.local_sidereal_angle(t).sin_cos();
        let (sin_phi, cos_phi) = self.latitude.sin_cos();
        Matrix::from_row_major(
            3,
            3,
            vec![
                -sin_s,
                cos_s,
                0.0,
                -sin_phi * cos_s,
                -sin_phi * sin_s,
                cos_phi,
                cos_phi * cos_s,
                cos_phi * sin_s,
                sin_phi,
            ],
        )
    }

    /// Sun–observer geometry for a heliocentric Earth position (any length unit).
    pub fn solar_geometry(
        &self,
        earth_position: &Vector,
        t: f64,
    ) -> Result<SolarGeometry, GnomonError> {
        let sunlight = earth_position.normalized()?;
        let zenith = self.zenith(t);
        let cos_separation = sunlight.dot(&zenith)?;
        Ok(SolarGeometry {
            zenith,
            sunlight,
            cos_separation,
        })
    }
}
