//! # Scenario harness
//!
//! Wires an epoch, an observer location and the integrator settings into the ODE models and
//! runs them to completion:
//!
//! | [`Scenario`]  | Model                                          | Interval                        |
//! |---------------|------------------------------------------------|---------------------------------|
//! | `Sundial`     | [`SundialShadowModel`]                         | epoch → end of the test day     |
//! | `Daylight`    | [`DaylightBoundaryModel`]                      | epoch → epoch + `span_days`     |
//! | `Arenstorf`   | [`RestrictedThreeBodyModel`]                   | one period of the Arenstorf orbit |
//!
//! Time inside a run is measured in seconds from [`ScenarioParams::epoch`] (`t0 = 0`); the
//! integrator's `h_max` is the sampling increment, so accepted samples are at most
//! `sample_increment` seconds apart.
//!
//! [`run_all`] is the error boundary: every scenario runs on its own, and the failure of one
//! is reported in its slot without stopping the others. With the `progress` feature, an
//! `indicatif` bar tracks the scenarios.
//!
//! ## Example
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use gnomon::scenario::{run_all, Scenario, ScenarioParams};
//!
//! let params = ScenarioParams::builder().sample_increment(600.0).build().unwrap();
//! for (scenario, report) in run_all(&Scenario::ALL, &params) {
//!     match report {
//!         Ok(report) => {
//!             report.write_to(Utf8Path::new(".")).unwrap();
//!         }
//!         Err(e) => eprintln!("{scenario} failed: {e}"),
//!     }
//! }
//! ```
#[cfg(feature = "progress")]
pub(crate) mod progress_bar;

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;

use crate::constants::{
    Radian, Seconds, ARENSTORF_PERIOD, RADEG, REFERENCE_EARTH_STATE, SECONDS_PER_DAY,
};
use crate::gnomon_errors::GnomonError;
use crate::integrator::{DormandPrince, IntegrationSummary, IntegratorParams, Stats};
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;
use crate::models::daylight::DaylightBoundaryModel;
use crate::models::earth_orbit::EarthOrbitModel;
use crate::models::observer_site::ObserverSite;
use crate::models::sundial::SundialShadowModel;
use crate::models::three_body::RestrictedThreeBodyModel;
use crate::results::write_table;
use crate::time::{epoch_to_jd, jd_to_mjd, seconds_between};

#[cfg(feature = "progress")]
use indicatif::ProgressBar;
#[cfg(feature = "progress")]
use progress_bar::{scenario_style, RunClock};

/// Inputs shared by the scenarios.
///
/// `initial_state` is the heliocentric Earth state at `epoch`; the default pairs the
/// 2024-01-01 00:00 UTC epoch with its reference state, so changing one requires changing the
/// other.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    /// Run epoch, expected at a UTC midnight.
    pub epoch: Epoch,
    pub latitude: Radian,
    /// East longitude.
    pub longitude: Radian,
    /// Time zone of the reported wall-clock times.
    pub utc_offset_hours: f64,
    /// Length of the daylight run.
    pub span_days: f64,
    /// Start of the sundial test day, in days after `epoch`.
    pub test_day_offset: f64,
    /// Largest step of the integrator (seconds).
    pub sample_increment: Seconds,
    pub tolerance: f64,
    pub initial_state: Vector,
}

impl ScenarioParams {
    pub fn builder() -> ScenarioParamsBuilder {
        ScenarioParamsBuilder::new()
    }

    /// Start of the sundial test day, in seconds after the epoch.
    pub fn test_start(&self) -> Seconds {
        self.test_day_offset * SECONDS_PER_DAY
    }

    pub fn observer_site(&self) -> Result<ObserverSite, GnomonError> {
        ObserverSite::new(
            self.latitude,
            self.longitude,
            jd_to_mjd(epoch_to_jd(&self.epoch)),
        )
    }

    /// Integrator whose largest step is the sampling increment.
    pub fn integrator(&self) -> Result<DormandPrince, GnomonError> {
        DormandPrince::new(
            IntegratorParams::builder()
                .tolerance(self.tolerance)
                .h_max(self.sample_increment)
                .build()?,
        )
    }
}

impl Default for ScenarioParams {
    fn default() -> Self {
        ScenarioParams {
            epoch: Epoch::from_gregorian_utc_at_midnight(2024, 1, 1),
            latitude: 55.0 * RADEG,
            longitude: 37.0 * RADEG,
            utc_offset_hours: 3.0,
            span_days: 365.0,
            // 2024-03-15
            test_day_offset: 74.0,
            sample_increment: 60.0,
            tolerance: 1e-12,
            initial_state: Vector::from(REFERENCE_EARTH_STATE),
        }
    }
}

/// Builder for [`ScenarioParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ScenarioParamsBuilder {
    params: ScenarioParams,
}

impl ScenarioParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ScenarioParams::default(),
        }
    }

    pub fn epoch(mut self, v: Epoch) -> Self {
        self.params.epoch = v;
        self
    }
    /// Latitude in degrees.
    pub fn latitude_deg(mut self, v: f64) -> Self {
        self.params.latitude = v * RADEG;
        self
    }
    /// East longitude in degrees.
    pub fn longitude_deg(mut self, v: f64) -> Self {
        self.params.longitude = v * RADEG;
        self
    }
    pub fn utc_offset_hours(mut self, v: f64) -> Self {
        self.params.utc_offset_hours = v;
        self
    }
    pub fn span_days(mut self, v: f64) -> Self {
        self.params.span_days = v;
        self
    }
    pub fn test_day_offset(mut self, v: f64) -> Self {
        self.params.test_day_offset = v;
        self
    }
    /// Test day given as a date; converted to an offset from the current epoch, so set the
    /// epoch first.
    pub fn test_day(mut self, v: Epoch) -> Self {
        self.params.test_day_offset = seconds_between(&self.params.epoch, &v) / SECONDS_PER_DAY;
        self
    }
    pub fn sample_increment(mut self, v: f64) -> Self {
        self.params.sample_increment = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.tolerance = v;
        self
    }
    pub fn initial_state(mut self, v: Vector) -> Self {
        self.params.initial_state = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// -----------------
    /// * [`GnomonError::InvalidScenarioParameter`] for a latitude outside `[−90°, 90°]`, a
    ///   non-finite longitude, a UTC offset outside `[−14 h, 14 h]`, a non-positive span,
    ///   sampling increment or tolerance, a negative test day offset, or an initial state that
    ///   is not a finite 6-vector.
    pub fn build(self) -> Result<ScenarioParams, GnomonError> {
        let p = &self.params;
        let invalid = |msg: &str| Err(GnomonError::InvalidScenarioParameter(msg.into()));
        let gt0 = |x: f64| x.is_finite() && x > 0.0;

        if !(p.latitude.is_finite() && p.latitude.abs() <= std::f64::consts::FRAC_PI_2) {
            return invalid("latitude must lie in [-90, 90] degrees");
        }
        if !p.longitude.is_finite() {
            return invalid("longitude must be finite");
        }
        if !(p.utc_offset_hours.is_finite() && p.utc_offset_hours.abs() <= 14.0) {
            return invalid("utc_offset_hours must lie in [-14, 14]");
        }
        if !gt0(p.span_days) {
            return invalid("span_days must be > 0");
        }
        if !(p.test_day_offset.is_finite() && p.test_day_offset >= 0.0) {
            return invalid("test_day_offset must be >= 0");
        }
        if !gt0(p.sample_increment) {
            return invalid("sample_increment must be > 0");
        }
        if !gt0(p.tolerance) {
            return invalid("tolerance must be > 0");
        }
        if p.initial_state.dimension() != 6 || !p.initial_state.is_finite() {
            return invalid("initial_state must be a finite (x, y, z, vx, vy, vz) vector");
        }

        Ok(self.params)
    }
}

/// A completed run: the model with its result table, and the integrator summary.
#[derive(Debug, Clone)]
pub struct ScenarioRun<M> {
    pub model: M,
    pub summary: IntegrationSummary,
}

/// Shadow of a unit gnomon over the test day.
pub fn run_sundial(
    params: &ScenarioParams,
) -> Result<ScenarioRun<SundialShadowModel>, GnomonError> {
    let mut model = SundialShadowModel::new(
        EarthOrbitModel::default(),
        params.observer_site()?,
        params.test_start(),
    );
    let t1 = params.test_start() + SECONDS_PER_DAY;
    let summary = params
        .integrator()?
        .run(&mut model, &params.initial_state, 0.0, t1)?;
    Ok(ScenarioRun { model, summary })
}

/// Sunrise / sunset times over `span_days`.
pub fn run_daylight(
    params: &ScenarioParams,
) -> Result<ScenarioRun<DaylightBoundaryModel>, GnomonError> {
    let mut model = DaylightBoundaryModel::new(
        EarthOrbitModel::default(),
        params.observer_site()?,
        params.utc_offset_hours,
    );
    let t1 = params.span_days * SECONDS_PER_DAY;
    let summary = params
        .integrator()?
        .run(&mut model, &params.initial_state, 0.0, t1)?;
    Ok(ScenarioRun { model, summary })
}

/// One period of the Arenstorf orbit; only the tolerance is taken from `params`.
pub fn run_arenstorf(
    params: &ScenarioParams,
) -> Result<ScenarioRun<RestrictedThreeBodyModel>, GnomonError> {
    let mut model = RestrictedThreeBodyModel::arenstorf();
    let summary = DormandPrince::with_tolerance(params.tolerance)?.run(
        &mut model,
        &RestrictedThreeBodyModel::arenstorf_initial_state(),
        0.0,
        ARENSTORF_PERIOD,
    )?;
    Ok(ScenarioRun { model, summary })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Sundial,
    Daylight,
    Arenstorf,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Sundial, Scenario::Daylight, Scenario::Arenstorf];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Sundial => "sundial",
            Scenario::Daylight => "daylight",
            Scenario::Arenstorf => "arenstorf",
        }
    }

    /// Name of the result table written by [`ScenarioReport::write_to`].
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.name())
    }

    pub fn run(&self, params: &ScenarioParams) -> Result<ScenarioReport, GnomonError> {
        let (table, summary) = match self {
            Scenario::Sundial => {
                let run = run_sundial(params)?;
                (run.model.results().clone(), run.summary)
            }
            Scenario::Daylight => {
                let run = run_daylight(params)?;
                (run.model.results().clone(), run.summary)
            }
            Scenario::Arenstorf => {
                let run = run_arenstorf(params)?;
                (run.model.results().clone(), run.summary)
            }
        };
        Ok(ScenarioReport {
            scenario: *self,
            table,
            final_time: summary.t,
            stats: summary.stats,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = GnomonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                GnomonError::InvalidScenarioParameter(format!(
                    "unknown scenario {s:?} (expected one of sundial, daylight, arenstorf)"
                ))
            })
    }
}

/// Model-independent outcome of a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub table: Matrix,
    pub final_time: f64,
    pub stats: Stats,
}

impl ScenarioReport {
    /// Write the result table into `dir` and return the file path.
    pub fn write_to(&self, dir: &Utf8Path) -> Result<Utf8PathBuf, GnomonError> {
        let path = dir.join(self.scenario.file_name());
        write_table(&self.table, &path)?;
        Ok(path)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rows, t = {}, {}",
            self.scenario,
            self.table.rows(),
            self.final_time,
            self.stats
        )
    }
}

/// Run each scenario in its own error boundary, in order.
#[cfg(not(feature = "progress"))]
pub fn run_all(
    scenarios: &[Scenario],
    params: &ScenarioParams,
) -> Vec<(Scenario, Result<ScenarioReport, GnomonError>)> {
    scenarios
        .iter()
        .map(|scenario| (*scenario, scenario.run(params)))
        .collect()
}

/// Run each scenario in its own error boundary, in order, behind a progress bar.
///
/// A throughput line (accepted steps per second, evaluations per step) is printed above the
/// bar as each scenario completes.
#[cfg(feature = "progress")]
pub fn run_all(
    scenarios: &[Scenario],
    params: &ScenarioParams,
) -> Vec<(Scenario, Result<ScenarioReport, GnomonError>)> {
    use std::time::Duration;

    let pb = ProgressBar::new((scenarios.len() as u64).max(1));
    pb.set_style(scenario_style());
    pb.enable_steady_tick(Duration::from_millis(200));

    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        pb.set_message(format!("running {scenario}"));
        let clock = RunClock::start();
        let report = scenario.run(params);

        match &report {
            Ok(report) => pb.println(format!("{scenario}: {}", clock.finish(&report.stats))),
            Err(e) => pb.println(format!(
                "{scenario}: failed after {:.2}s: {e}",
                clock.elapsed().as_secs_f64()
            )),
        }
        reports.push((*scenario, report));
        pb.inc(1);
    }

    pb.disable_steady_tick();
    pb.finish_and_clear();
    reports
}
