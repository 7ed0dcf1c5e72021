//! # Adaptive Dormand-Prince 5(4) integration
//!
//! [`DormandPrince`] advances any [`OdeModel`] from an initial state over `[t0, t1]` with the
//! seven-stage embedded pair of [`tableau`]. Each step attempt evaluates the seven stages
//!
//! ```text
//! k_i = f(x + h Σ_j a_ij k_j, t + c_i h)
//! ```
//!
//! and forms a fifth-order candidate (weights `b`) and a fourth-order companion (weights
//! `b*`). Their difference gives the scalar error estimate
//!
//! ```text
//! err = ‖x5 − x4‖ / (1 + ‖x5‖)
//! ```
//!
//! which is absolute for small states and relative for large ones. The step is accepted when
//! `err ≤ tolerance`: time advances, the state becomes `x5`, and the model's
//! [`accept`](OdeModel::accept) hook is called. Accepted or not, the next step size is
//!
//! ```text
//! h ← min(h · clamp(safety · (tol / err)^(1/5), min_factor, max_factor), h_max)
//! ```
//!
//! `h_max` doubles as the sampling increment of the accepted-step stream, and the final step is
//! clipped so that the run lands exactly on `t1`.
//!
//! ## Failure modes
//!
//! * [`GnomonError::StepSizeTooSmall`] – a rejected step asks for `h < h_min`,
//! * [`GnomonError::MaxStepsExceeded`] – more than `max_steps` attempts,
//! * [`GnomonError::NonFiniteState`] – the accepted state contains NaN or infinity,
//! * any error returned by the model itself is propagated unchanged.
//!
//! ## Example
//!
//! ```rust
//! use gnomon::integrator::{DormandPrince, IntegratorParams};
//! use gnomon::models::three_body::RestrictedThreeBodyModel;
//! use gnomon::constants::ARENSTORF_PERIOD;
//!
//! let params = IntegratorParams::builder().tolerance(1e-10).build().unwrap();
//! let mut integrator = DormandPrince::new(params).unwrap();
//! let mut model = RestrictedThreeBodyModel::arenstorf();
//! let x0 = RestrictedThreeBodyModel::arenstorf_initial_state();
//!
//! let summary = integrator.run(&mut model, &x0, 0.0, ARENSTORF_PERIOD).unwrap();
//! assert_eq!(summary.t, ARENSTORF_PERIOD);
//! assert_eq!(model.results().rows() as u64, summary.stats.accepted_steps);
//! ```
pub mod tableau;

use std::fmt;

use crate::gnomon_errors::GnomonError;
use crate::linalg::vector::Vector;
use crate::models::OdeModel;
use tableau::{ButcherTableau, ORDER};

/// Configuration of a [`DormandPrince`] integrator.
///
/// Defaults
/// -----------------
/// | field          | default      |
/// |----------------|--------------|
/// | `tolerance`    | `1e-10`      |
/// | `initial_step` | `0` (auto)   |
/// | `h_min`        | `1e-12`      |
/// | `h_max`        | `∞`          |
/// | `max_steps`    | `10_000_000` |
/// | `safety`       | `0.9`        |
/// | `min_factor`   | `0.2`        |
/// | `max_factor`   | `5.0`        |
///
/// An `initial_step` of zero starts with `1e-3` of the integration span, capped by `h_max`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorParams {
    /// Bound on the mixed absolute/relative error estimate of an accepted step.
    pub tolerance: f64,
    pub initial_step: f64,
    /// Smallest step a rejection may shrink to.
    pub h_min: f64,
    /// Largest step, i.e. the maximum spacing of accepted samples.
    pub h_max: f64,
    /// Maximum number of step attempts per run.
    pub max_steps: u64,
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl IntegratorParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`IntegratorParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gnomon::integrator::IntegratorParams;
    ///
    /// let params = IntegratorParams::builder()
    ///     .tolerance(1e-12)
    ///     .h_max(600.0)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.h_max, 600.0);
    /// ```
    pub fn builder() -> IntegratorParamsBuilder {
        IntegratorParamsBuilder::new()
    }
}

impl Default for IntegratorParams {
    fn default() -> Self {
        IntegratorParams {
            tolerance: 1e-10,
            initial_step: 0.0,
            h_min: 1e-12,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
        }
    }
}

/// Builder for [`IntegratorParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct IntegratorParamsBuilder {
    params: IntegratorParams,
}

impl IntegratorParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: IntegratorParams::default(),
        }
    }

    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.tolerance = v;
        self
    }
    pub fn initial_step(mut self, v: f64) -> Self {
        self.params.initial_step = v;
        self
    }
    pub fn h_min(mut self, v: f64) -> Self {
        self.params.h_min = v;
        self
    }
    pub fn h_max(mut self, v: f64) -> Self {
        self.params.h_max = v;
        self
    }
    pub fn max_steps(mut self, v: u64) -> Self {
        self.params.max_steps = v;
        self
    }
    pub fn safety(mut self, v: f64) -> Self {
        self.params.safety = v;
        self
    }
    pub fn min_factor(mut self, v: f64) -> Self {
        self.params.min_factor = v;
        self
    }
    pub fn max_factor(mut self, v: f64) -> Self {
        self.params.max_factor = v;
        self
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.is_finite() && x > 0.0
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// -----------------
    /// * [`GnomonError::InvalidIntegratorParameter`] when
    ///   - `tolerance`, `h_min` or `safety` is not finite and positive,
    ///   - `initial_step` is negative or not finite,
    ///   - `h_max` is not positive or smaller than `h_min` (`∞` is allowed),
    ///   - `max_steps` is zero,
    ///   - the factors violate `0 < min_factor ≤ 1 ≤ max_factor`.
    pub fn build(self) -> Result<IntegratorParams, GnomonError> {
        let p = &self.params;

        if !Self::gt0(p.tolerance) {
            return Err(GnomonError::InvalidIntegratorParameter(
                "tolerance must be > 0".into(),
            ));
        }
        if !(p.initial_step.is_finite() && p.initial_step >= 0.0) {
            return Err(GnomonError::InvalidIntegratorParameter(
                "initial_step must be >= 0 (0 selects it automatically)".into(),
            ));
        }
        if !Self::gt0(p.h_min) {
            return Err(GnomonError::InvalidIntegratorParameter(
                "h_min must be > 0".into(),
            ));
        }
        if p.h_max.is_nan() || p.h_max < p.h_min {
            return Err(GnomonError::InvalidIntegratorParameter(
                "h_max must be >= h_min".into(),
            ));
        }
        if p.max_steps == 0 {
            return Err(GnomonError::InvalidIntegratorParameter(
                "max_steps must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.safety) {
            return Err(GnomonError::InvalidIntegratorParameter(
                "safety must be > 0".into(),
            ));
        }
        let factors_ok = Self::gt0(p.min_factor)
            && p.min_factor <= 1.0
            && p.max_factor.is_finite()
            && p.max_factor >= 1.0;
        if !factors_ok {
            return Err(GnomonError::InvalidIntegratorParameter(
                "require 0 < min_factor <= 1 <= max_factor".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for IntegratorParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Dormand-Prince 5(4) Parameters")?;
            writeln!(f, "------------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Error control]")?;
            line!(
                "tolerance    = {:.1e}",
                self.tolerance,
                "Bound on the scaled error estimate"
            )?;
            line!(
                "safety       = {:.2}",
                self.safety,
                "Safety factor of the step controller"
            )?;
            line!(
                "min_factor   = {:.2}",
                self.min_factor,
                "Largest shrink per step"
            )?;
            line!(
                "max_factor   = {:.2}",
                self.max_factor,
                "Largest growth per step"
            )?;

            writeln!(f, "\n[Step limits]")?;
            if self.initial_step > 0.0 {
                line!("initial_step = {:.3e}", self.initial_step, "First trial step")?;
            } else {
                line!("initial_step = {}", "auto", "1e-3 of the span, capped by h_max")?;
            }
            line!("h_min        = {:.1e}", self.h_min, "Smallest admissible step")?;
            line!(
                "h_max        = {:.3e}",
                self.h_max,
                "Largest step / sampling increment"
            )?;
            line!(
                "max_steps    = {}",
                self.max_steps,
                "Cap on step attempts per run"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "IntegratorParams(tol={:.1e}, h∈[{:.1e},{:.3e}], max_steps={}, safety={:.2}, factor∈[{:.2},{:.2}])",
                self.tolerance,
                self.h_min,
                self.h_max,
                self.max_steps,
                self.safety,
                self.min_factor,
                self.max_factor
            )
        }
    }
}

/// Step-size controller
///
/// `factor = safety · (tol / err)^(1/(p+1))` with `p = 4` the order of the error estimate,
/// clamped to `[min_factor, max_factor]`.
#[derive(Debug, Clone)]
pub struct StepController {
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self::from_params(&IntegratorParams::default())
    }
}

impl StepController {
    pub fn from_params(params: &IntegratorParams) -> Self {
        StepController {
            safety: params.safety,
            min_factor: params.min_factor,
            max_factor: params.max_factor,
            exponent: 1.0 / ORDER as f64,
        }
    }

    /// Step size adjustment factor for an error estimate `error` against `tolerance`.
    pub fn compute_factor(&self, error: f64, tolerance: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        if !error.is_finite() {
            return self.min_factor;
        }

        let factor = self.safety * (tolerance / error).powf(self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of derivative evaluations
    pub fn_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accepted / {} rejected steps, {} evaluations",
            self.accepted_steps, self.rejected_steps, self.fn_evals
        )
    }
}

/// Outcome of one step attempt
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Fifth-order candidate state
    pub state: Vector,
    /// Scaled error estimate
    pub error: f64,
    pub accepted: bool,
}

/// Final time, final state and statistics of a completed run
#[derive(Debug, Clone)]
pub struct IntegrationSummary {
    pub t: f64,
    pub state: Vector,
    pub stats: Stats,
}

/// Adaptive embedded Runge-Kutta integrator with a fixed Dormand-Prince tableau.
#[derive(Debug, Clone)]
pub struct DormandPrince {
    params: IntegratorParams,
    tableau: ButcherTableau,
    controller: StepController,
    stats: Stats,
}

impl DormandPrince {
    pub fn new(params: IntegratorParams) -> Result<Self, GnomonError> {
        Ok(DormandPrince {
            controller: StepController::from_params(&params),
            tableau: ButcherTableau::dormand_prince()?,
            params,
            stats: Stats::default(),
        })
    }

    /// Integrator with default parameters and the given tolerance.
    pub fn with_tolerance(tolerance: f64) -> Result<Self, GnomonError> {
        Self::new(IntegratorParams::builder().tolerance(tolerance).build()?)
    }

    pub fn params(&self) -> &IntegratorParams {
        &self.params
    }

    /// Statistics of the last (or current) run.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Attempt one step of size `h` from `(t, state)` without committing it.
    pub fn step<M: OdeModel + ?Sized>(
        &mut self,
        model: &M,
        t: f64,
        state: &Vector,
        h: f64,
    ) -> Result<StepResult, GnomonError> {
        let stages = self.tableau.stages();
        let mut k: Vec<Vector> = Vec::with_capacity(stages);

        for i in 0..stages {
            let mut probe = state.clone();
            for (j, kj) in k.iter().enumerate() {
                let a = self.tableau.a[(i, j)];
                if a != 0.0 {
                    probe.add_scaled(h * a, kj)?;
                }
            }
            k.push(model.derivative(&probe, t + self.tableau.c[i] * h)?);
        }
        self.stats.fn_evals += stages as u64;

        let mut high = state.clone();
        let mut low = state.clone();
        for (i, ki) in k.iter().enumerate() {
            high.add_scaled(h * self.tableau.b[i], ki)?;
            low.add_scaled(h * self.tableau.b_embedded[i], ki)?;
        }

        let error = high.try_sub(&low)?.length() / (1.0 + high.length());
        let accepted = error <= self.params.tolerance;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }

        Ok(StepResult {
            state: high,
            error,
            accepted,
        })
    }

    /// Integrate `model` from `initial` at `t0` up to `t1`.
    ///
    /// The model's `accept` hook sees every accepted step in increasing time order, the last
    /// one exactly at `t1`. The initial state itself is not passed to `accept`.
    ///
    /// Errors
    /// -----------------
    /// * [`GnomonError::InvalidIntegratorParameter`] unless `t0 < t1`, both finite.
    /// * [`GnomonError::NonFiniteState`] for a non-finite initial or accepted state.
    /// * [`GnomonError::StepSizeTooSmall`], [`GnomonError::MaxStepsExceeded`].
    /// * Errors from the model are propagated.
    pub fn run<M: OdeModel + ?Sized>(
        &mut self,
        model: &mut M,
        initial: &Vector,
        t0: f64,
        t1: f64,
    ) -> Result<IntegrationSummary, GnomonError> {
        if !(t0.is_finite() && t1.is_finite() && t0 < t1) {
            return Err(GnomonError::InvalidIntegratorParameter(format!(
                "integration interval must satisfy t0 < t1, got [{t0}, {t1}]"
            )));
        }
        if !initial.is_finite() {
            return Err(GnomonError::NonFiniteState { t: t0 });
        }

        self.stats = Stats::default();
        let mut t = t0;
        let mut state = initial.clone();
        let mut h = if self.params.initial_step > 0.0 {
            self.params.initial_step
        } else {
            (t1 - t0) * 1e-3
        }
        .min(self.params.h_max);
        let mut attempts: u64 = 0;

        while t < t1 {
            let last = t + h >= t1;
            if last {
                h = t1 - t;
            }

            let result = self.step(model, t, &state, h)?;
            if result.accepted {
                t = if last { t1 } else { t + h };
                if !result.state.is_finite() {
                    return Err(GnomonError::NonFiniteState { t });
                }
                state = result.state;
                model.accept(&state, t)?;
            }

            let h_next = (h * self.controller.compute_factor(result.error, self.params.tolerance))
                .min(self.params.h_max);
            if !result.accepted && h_next < self.params.h_min {
                return Err(GnomonError::StepSizeTooSmall { t, h: h_next });
            }
            h = h_next;

            attempts += 1;
            if t < t1 && attempts >= self.params.max_steps {
                return Err(GnomonError::MaxStepsExceeded { t, steps: attempts });
            }
        }

        Ok(IntegrationSummary {
            t,
            state,
            stats: self.stats,
        })
    }
}
