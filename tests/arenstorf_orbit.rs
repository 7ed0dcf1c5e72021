mod common;

use common::assert_vector_close;
use gnomon::constants::ARENSTORF_PERIOD;
use gnomon::integrator::{DormandPrince, IntegratorParams};
use gnomon::linalg::vector::Vector;
use gnomon::models::three_body::RestrictedThreeBodyModel;
use gnomon::models::OdeModel;
use gnomon::GnomonError;

#[test]
fn test_arenstorf_orbit_closes_after_one_period() {
    let mut integrator = DormandPrince::with_tolerance(1e-12).unwrap();
    let mut model = RestrictedThreeBodyModel::arenstorf();
    let x0 = RestrictedThreeBodyModel::arenstorf_initial_state();

    let summary = integrator
        .run(&mut model, &x0, 0.0, ARENSTORF_PERIOD)
        .unwrap();

    assert_eq!(summary.t, ARENSTORF_PERIOD);
    assert_vector_close(&summary.state, &x0, 1e-6);

    let table = model.results();
    assert_eq!(table.rows() as u64, summary.stats.accepted_steps);
    assert_eq!(table.row(table.rows() - 1).unwrap(), summary.state);
}

/// Records the time of every accepted step.
struct Timed {
    inner: RestrictedThreeBodyModel,
    times: Vec<f64>,
}

impl OdeModel for Timed {
    fn derivative(&self, state: &Vector, t: f64) -> Result<Vector, GnomonError> {
        self.inner.derivative(state, t)
    }

    fn accept(&mut self, state: &Vector, t: f64) -> Result<(), GnomonError> {
        self.times.push(t);
        self.inner.accept(state, t)
    }
}

#[test]
fn test_step_size_adapts_to_close_approaches() {
    let mut integrator = DormandPrince::with_tolerance(1e-10).unwrap();
    let mut model = Timed {
        inner: RestrictedThreeBodyModel::arenstorf(),
        times: Vec::new(),
    };
    integrator
        .run(
            &mut model,
            &RestrictedThreeBodyModel::arenstorf_initial_state(),
            0.0,
            ARENSTORF_PERIOD,
        )
        .unwrap();

    let spacing: Vec<f64> = model.times.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(spacing.iter().all(|dt| *dt > 0.0));
    let smallest = spacing.iter().copied().fold(f64::INFINITY, f64::min);
    let largest = spacing.iter().copied().fold(0.0, f64::max);
    assert!(largest / smallest > 50.0, "{largest} / {smallest}");
    assert_eq!(model.inner.results().rows(), model.times.len());
}

#[test]
fn test_looser_tolerance_uses_fewer_steps() {
    let run = |tolerance: f64| {
        let params = IntegratorParams::builder()
            .tolerance(tolerance)
            .build()
            .unwrap();
        let mut integrator = DormandPrince::new(params).unwrap();
        integrator
            .run(
                &mut RestrictedThreeBodyModel::arenstorf(),
                &RestrictedThreeBodyModel::arenstorf_initial_state(),
                0.0,
                ARENSTORF_PERIOD,
            )
            .unwrap()
            .stats
    };
    let tight = run(1e-12);
    let loose = run(1e-7);
    assert!(loose.accepted_steps < tight.accepted_steps);
    assert!(loose.fn_evals < tight.fn_evals);
}
