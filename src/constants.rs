//! # Constants and type definitions for Gnomon
//!
//! This module centralizes the **physical constants**, **conversion factors** and
//! **unit aliases** shared by the models, the integrator and the scenario harness.
//!
//! ## Overview
//!
//! - Geophysical and heliocentric constants (SI units: meters, seconds)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, JD ↔ MJD)
//! - Reference initial conditions used by the bundled scenarios
//!
//! All quantities handled by the ODE models are expressed in SI units, except the
//! planar restricted three-body benchmark, which is non-dimensional.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Heliocentric gravitational parameter GM☉ in m³/s²
pub const GM_SUN: f64 = 1.327_124_400_18e20;

/// Earth sidereal rotation rate in rad/s
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;

// -------------------------------------------------------------------------------------------------
// Restricted three-body benchmark (Arenstorf orbit)
// -------------------------------------------------------------------------------------------------

/// Earth–Moon mass ratio used by the Arenstorf periodic orbit
pub const ARENSTORF_MU: f64 = 0.012277471;

/// Initial state `(x, ẋ, y, ẏ)` of the Arenstorf periodic orbit
pub const ARENSTORF_INITIAL_STATE: [f64; 4] = [0.994, 0.0, 0.0, -2.00158510637908252240];

/// Period of the Arenstorf orbit (non-dimensional time units)
pub const ARENSTORF_PERIOD: f64 = 17.0652165601579625588;

// -------------------------------------------------------------------------------------------------
// Reference heliocentric Earth state
// -------------------------------------------------------------------------------------------------

/// Heliocentric equatorial Earth state at 2024-01-01 00:00:00 UTC (JD 2460310.5):
/// position in meters followed by velocity in m/s.
pub const REFERENCE_EARTH_STATE: [f64; 6] = [
    -2.6005047996994e10,
    1.32621705709054e11,
    5.7523888683657e10,
    -2.9832953e4,
    -4.715287e3,
    -2.043123e3,
];

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Duration or elapsed time in seconds
pub type Seconds = f64;
/// Julian Date (days)
pub type JD = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
