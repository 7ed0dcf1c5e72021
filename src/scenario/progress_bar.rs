//! Progress reporting for [`run_all`](super::run_all) under the `progress` feature.
//!
//! Each scenario is timed with a [`RunClock`]; once it finishes, its integrator [`Stats`]
//! are turned into a [`Throughput`] line printed above the bar, e.g.
//!
//! ```text
//! daylight: 52560 steps in 1.84s (28.6k steps/s, 7.0 evals/step)
//! ```
use std::fmt;
use std::time::{Duration, Instant};

use indicatif::ProgressStyle;

use crate::integrator::Stats;

pub(crate) fn scenario_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} scenarios | {elapsed_precise} | {msg}",
    )
    .expect("indicatif template")
}

/// Wall clock of a single scenario run.
pub(crate) struct RunClock {
    started: Instant,
}

impl RunClock {
    pub(crate) fn start() -> Self {
        RunClock {
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn finish(&self, stats: &Stats) -> Throughput {
        Throughput::new(self.elapsed(), stats)
    }
}

/// Integration work per unit of wall time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Throughput {
    elapsed: Duration,
    accepted_steps: u64,
    attempts: u64,
    fn_evals: u64,
}

impl Throughput {
    pub(crate) fn new(elapsed: Duration, stats: &Stats) -> Self {
        Throughput {
            elapsed,
            accepted_steps: stats.accepted_steps,
            attempts: stats.accepted_steps + stats.rejected_steps,
            fn_evals: stats.fn_evals,
        }
    }

    /// Accepted steps per second, `None` when no time was measured.
    pub(crate) fn steps_per_second(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.accepted_steps as f64 / secs)
    }

    /// Derivative evaluations per accepted step (7 without rejections).
    pub(crate) fn evals_per_step(&self) -> Option<f64> {
        (self.accepted_steps > 0).then(|| self.fn_evals as f64 / self.accepted_steps as f64)
    }
}

fn fmt_rate(rate: f64) -> String {
    if rate >= 1e6 {
        format!("{:.1}M", rate / 1e6)
    } else if rate >= 1e3 {
        format!("{:.1}k", rate / 1e3)
    } else {
        format!("{rate:.0}")
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps in {:.2}s",
            self.accepted_steps,
            self.elapsed.as_secs_f64()
        )?;
        if self.attempts > self.accepted_steps {
            write!(f, " ({} rejected)", self.attempts - self.accepted_steps)?;
        }
        match (self.steps_per_second(), self.evals_per_step()) {
            (Some(rate), Some(evals)) => {
                write!(f, " ({} steps/s, {evals:.1} evals/step)", fmt_rate(rate))
            }
            _ => Ok(()),
        }
    }
}
