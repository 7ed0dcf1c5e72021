//! Sunrise / sunset detection for a ground observer.
//!
//! The model walks the accepted-step stream with a two-state machine:
//!
//! * [`DayPhase::AwaitingSunrise`] + observer lit → [`DayPhase::AwaitingSunset`], the sunrise
//!   time is remembered (nothing recorded yet);
//! * [`DayPhase::AwaitingSunset`] + observer in shadow → [`DayPhase::AwaitingSunrise`], a
//!   `(sunrise clock, sunset clock)` row is recorded if a sunrise was seen.
//!
//! The first accepted sample only seeds the phase. A run starting in daylight therefore skips
//! the truncated first day instead of reporting a sunrise at the run start.
//!
//! Event times are sampled, so their resolution is the integrator's maximum step.
use crate::constants::Seconds;
use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::models::earth_orbit::EarthOrbitModel;
use crate::models::observer_site::ObserverSite;
use crate::models::OdeModel;
use crate::time::wall_clock_seconds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    AwaitingSunrise,
    AwaitingSunset,
}

/// One complete day: sunrise followed by sunset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaylightSpan {
    /// Seconds since the run epoch.
    pub sunrise_elapsed: Seconds,
    pub sunset_elapsed: Seconds,
    /// Local wall-clock time of day, in `[0, 86400)`.
    pub sunrise_clock: Seconds,
    pub sunset_clock: Seconds,
}

impl DaylightSpan {
    pub fn duration(&self) -> Seconds {
        self.sunset_elapsed - self.sunrise_elapsed
    }
}

#[derive(Debug, Clone)]
pub struct DaylightBoundaryModel {
    orbit: EarthOrbitModel,
    site: ObserverSite,
    utc_offset_hours: f64,
    phase: Option<DayPhase>,
    // (elapsed, clock) of the last sunrise not yet closed by a sunset
    pending_sunrise: Option<(Seconds, Seconds)>,
    spans: Vec<DaylightSpan>,
    results: Matrix,
}

impl DaylightBoundaryModel {
    /// Arguments
    /// ---------
    /// * `orbit`: dynamics of the Earth
    /// * `site`: observer location
    /// * `utc_offset_hours`: time zone of the reported wall-clock times
    ///
    /// The run epoch is expected to be a UTC midnight.
    pub fn new(orbit: EarthOrbitModel, site: ObserverSite, utc_offset_hours: f64) -> Self {
        DaylightBoundaryModel {
            orbit,
            site,
            utc_offset_hours,
            phase: None,
            pending_sunrise: None,
            spans: Vec::new(),
            results: Matrix::default(),
        }
    }

    /// Current phase, `None` before the first accepted sample.
    pub fn phase(&self) -> Option<DayPhase> {
        self.phase
    }

    /// Complete days detected so far, in time order.
    pub fn intervals(&self) -> &[DaylightSpan] {
        &self.spans
    }

    /// One `(sunrise clock, sunset clock)` row per complete day.
    pub fn results(&self) -> &Matrix {
        &self.results
    }

    /// Forget all detection state and recorded rows.
    pub fn reset(&mut self) {
        self.phase = None;
        self.pending_sunrise = None;
        self.spans.clear();
        self.results = Matrix::default();
    }

    fn on_sunset(&mut self, t: Seconds, clock: Seconds) -> Result<(), GnomonError> {
        if let Some((sunrise_elapsed, sunrise_clock)) = self.pending_sunrise.take() {
            self.results
                .push_row(&Vector::from([sunrise_clock, clock]))?;
            self.spans.push(DaylightSpan {
                sunrise_elapsed,
                sunset_elapsed: t,
                sunrise_clock,
                sunset_clock: clock,
            });
        }
        Ok(())
    }
}

impl OdeModel for DaylightBoundaryModel {
    fn derivative(&self, state: &Vector, t: f64) -> Result<Vector, GnomonError> {
        self.orbit.derivative(state, t)
    }

    fn accept(&mut self, state: &Vector, t: f64) -> Result<(), GnomonError> {
        let lit = self
            .site
            .solar_geometry(&EarthOrbitModel::position(state)?, t)?
            .is_lit();

        let Some(phase) = self.phase else {
            self.phase = Some(if lit {
                DayPhase::AwaitingSunset
            } else {
                DayPhase::AwaitingSunrise
            });
            return Ok(());
        };

        let clock = wall_clock_seconds(t, self.utc_offset_hours);
        match (phase, lit) {
            (DayPhase::AwaitingSunset, false) => {
                self.phase = Some(DayPhase::AwaitingSunrise);
                self.on_sunset(t, clock)?;
            }
            (DayPhase::AwaitingSunrise, true) => {
                self.phase = Some(DayPhase::AwaitingSunset);
                self.pending_sunrise = Some((t, clock));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod daylight_test {
    use super::*;
    use crate::constants::{RADEG, SECONDS_PER_DAY};

    fn model() -> DaylightBoundaryModel {
        let site = ObserverSite::new(55.0 * RADEG, 37.0 * RADEG, 60310.0).unwrap();
        DaylightBoundaryModel::new(EarthOrbitModel::default(), site, 3.0)
    }

    /// Feed a frozen Earth position sampled every `step` seconds over `[from, to]`.
    fn sweep(model: &mut DaylightBoundaryModel, from: f64, to: f64, step: f64) {
        let state = EarthOrbitModel::reference_state();
        let mut t = from;
        while t <= to {
            model.accept(&state, t).unwrap();
            t += step;
        }
    }

    #[test]
    fn test_first_sample_only_seeds_phase() {
        let mut model = model();
        assert_eq!(model.phase(), None);
        // local midnight is dark in January at 55°N
        model
            .accept(&EarthOrbitModel::reference_state(), 60.0)
            .unwrap();
        assert_eq!(model.phase(), Some(DayPhase::AwaitingSunrise));
        assert!(model.results().is_empty());
    }

    #[test]
    fn test_one_pair_per_day() {
        let mut model = model();
        sweep(&mut model, 60.0, 3.0 * SECONDS_PER_DAY, 60.0);

        assert_eq!(model.results().rows(), 3);
        assert_eq!(model.intervals().len(), 3);
        for (day, span) in model.intervals().iter().enumerate() {
            let day_start = day as f64 * SECONDS_PER_DAY;
            assert!(span.sunrise_elapsed > day_start);
            assert!(span.sunset_elapsed < day_start + SECONDS_PER_DAY);
            // short winter day
            assert!(span.duration() > 5.0 * 3600.0 && span.duration() < 9.0 * 3600.0);
            assert!(span.sunrise_clock < span.sunset_clock);
        }
        let first = model.results().row(0).unwrap();
        assert_eq!(first[0], model.intervals()[0].sunrise_clock);
        assert_eq!(first[1], model.intervals()[0].sunset_clock);
    }

    #[test]
    fn test_start_in_daylight_skips_partial_day() {
        let mut model = model();
        // 10:00 local: already lit, so the first sunset closes nothing
        sweep(&mut model, 7.0 * 3600.0, 2.0 * SECONDS_PER_DAY, 60.0);
        assert_eq!(model.results().rows(), 1);
        assert!(model.intervals()[0].sunrise_elapsed > SECONDS_PER_DAY);
    }

    #[test]
    fn test_reset() {
        let mut model = model();
        sweep(&mut model, 60.0, SECONDS_PER_DAY, 600.0);
        assert!(!model.results().is_empty());
        model.reset();
        assert_eq!(model.phase(), None);
        assert!(model.results().is_empty());
        assert!(model.intervals().is_empty());
    }
}
