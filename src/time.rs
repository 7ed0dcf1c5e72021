use hifitime::Epoch;
use std::str::FromStr;

use crate::constants::{
    Radian, Seconds, DPI, JD, JDTOMJD, MJD, SECONDS_PER_DAY, SECONDS_PER_HOUR, T2000,
};
use crate::gnomon_errors::GnomonError;

/// Parse a date in the format YYYY-MM-ddTHH:mm:ss (UTC unless a time scale is given)
///
/// Argument
/// --------
/// * `date`: ISO 8601 date string accepted by [`hifitime::Epoch`]
///
/// Return
/// ------
/// * the parsed epoch, or [`GnomonError::InvalidScenarioParameter`] if the string is not a date
pub fn parse_epoch(date: &str) -> Result<Epoch, GnomonError> {
    Epoch::from_str(date)
        .map_err(|e| GnomonError::InvalidScenarioParameter(format!("invalid date {date:?}: {e}")))
}

/// Julian Date (UTC) of an epoch
pub fn epoch_to_jd(epoch: &Epoch) -> JD {
    epoch.to_jde_utc_days()
}

/// Transformation from julian date (JD) in modified julian date (MJD)
pub fn jd_to_mjd(jd: JD) -> MJD {
    jd - JDTOMJD
}

/// Seconds elapsed from `origin` to `epoch` (negative if `epoch` is earlier).
pub fn seconds_between(origin: &Epoch, epoch: &Epoch) -> Seconds {
    (*epoch - *origin).to_seconds()
}

/// Greenwich mean sidereal angle at a Modified Julian Date, in `[0, 2π)`.
///
/// IAU 1982 polynomial for 0h, advanced by the fractional day at the sidereal rate. The
/// scenarios pass UTC days; the UT1 − UTC difference (< 0.9 s) is below the sampling step.
pub fn gmst(tjm: MJD) -> Radian {
    // seconds of sidereal time
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    let h = tjm.fract() * DPI;
    (gmst0 + h * RAP).rem_euclid(DPI)
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: Radian) -> Radian {
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(DPI) - std::f64::consts::PI;
    if wrapped <= -std::f64::consts::PI {
        std::f64::consts::PI
    } else {
        wrapped
    }
}

/// Local wall-clock time of day in seconds, in `[0, 86400)`.
///
/// Arguments
/// ---------
/// * `elapsed`: seconds since a UTC midnight
/// * `utc_offset_hours`: signed offset of the local time zone
pub fn wall_clock_seconds(elapsed: Seconds, utc_offset_hours: f64) -> Seconds {
    let clock = (elapsed % SECONDS_PER_DAY + utc_offset_hours * SECONDS_PER_HOUR)
        .rem_euclid(SECONDS_PER_DAY);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if clock >= SECONDS_PER_DAY {
        0.0
    } else {
        clock
    }
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_parse_epoch() {
        let epoch = parse_epoch("2024-01-01T00:00:00 UTC").unwrap();
        assert_abs_diff_eq!(epoch_to_jd(&epoch), 2460310.5, epsilon = 1e-9);
        assert_abs_diff_eq!(jd_to_mjd(epoch_to_jd(&epoch)), 60310.0, epsilon = 1e-9);

        assert!(matches!(
            parse_epoch("first of january"),
            Err(GnomonError::InvalidScenarioParameter(_))
        ));
    }

    #[test]
    fn test_jd_mjd() {
        assert_eq!(jd_to_mjd(2459215.5), 59215.0);
    }

    #[test]
    fn test_seconds_between() {
        let a = parse_epoch("2024-01-01T00:00:00 UTC").unwrap();
        let b = parse_epoch("2024-03-15T00:00:00 UTC").unwrap();
        assert_abs_diff_eq!(seconds_between(&a, &b), 74.0 * 86400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(seconds_between(&b, &a), -74.0 * 86400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gmst() {
        let tut = 57028.478514610404;
        assert_abs_diff_eq!(gmst(tut), 4.851925725092499, epsilon = 1e-12);
        assert_abs_diff_eq!(gmst(T2000), 4.894961212789145, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_angle() {
        assert_abs_diff_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-PI), PI);
        assert_abs_diff_eq!(wrap_angle(0.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_wall_clock_seconds() {
        assert_eq!(wall_clock_seconds(3600.0, 3.0), 4.0 * 3600.0);
        // wraps past midnight both ways
        assert_eq!(wall_clock_seconds(86400.0 + 23.0 * 3600.0, 3.0), 2.0 * 3600.0);
        assert_eq!(wall_clock_seconds(3600.0, -5.0), 20.0 * 3600.0);
        assert_eq!(wall_clock_seconds(0.0, 0.0), 0.0);
    }
}
