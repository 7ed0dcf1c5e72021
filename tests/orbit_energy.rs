mod common;

use common::assert_vector_close;
use gnomon::constants::SECONDS_PER_DAY;
use gnomon::integrator::{DormandPrince, IntegratorParams};
use gnomon::models::earth_orbit::EarthOrbitModel;

const YEAR: f64 = 365.25 * SECONDS_PER_DAY;

fn relative_energy_drift(tolerance: f64, h_max: f64) -> (f64, EarthOrbitModel) {
    let params = IntegratorParams::builder()
        .tolerance(tolerance)
        .h_max(h_max)
        .build()
        .unwrap();
    let mut integrator = DormandPrince::new(params).unwrap();
    let mut model = EarthOrbitModel::default();
    let x0 = EarthOrbitModel::reference_state();
    let e0 = model.specific_energy(&x0).unwrap();

    integrator.run(&mut model, &x0, 0.0, YEAR).unwrap();

    let drift = model
        .results()
        .row_iter()
        .map(|state| ((model.specific_energy(&state).unwrap() - e0) / e0).abs())
        .fold(0.0, f64::max);
    (drift, model)
}

#[test]
fn test_energy_drift_scales_with_tolerance() {
    for tolerance in [1e-8, 1e-10] {
        let (drift, _) = relative_energy_drift(tolerance, f64::INFINITY);
        assert!(
            drift < 1e3 * tolerance,
            "tolerance {tolerance:e}: drift {drift:e}"
        );
    }
}

#[test]
fn test_hourly_sampling_keeps_energy() {
    let (drift, model) = relative_energy_drift(1e-12, 3600.0);
    assert!(drift < 1e-9, "drift {drift:e}");
    // one accepted sample per hour
    assert_eq!(model.results().rows(), (YEAR / 3600.0).ceil() as usize);
}

#[test]
fn test_orbit_closes_after_one_keplerian_period() {
    let model = EarthOrbitModel::default();
    let x0 = EarthOrbitModel::reference_state();
    let semi_major_axis = -model.mu() / (2.0 * model.specific_energy(&x0).unwrap());
    let period = std::f64::consts::TAU * (semi_major_axis.powi(3) / model.mu()).sqrt();

    let params = IntegratorParams::builder()
        .tolerance(1e-12)
        .h_max(3600.0)
        .build()
        .unwrap();
    let summary = DormandPrince::new(params)
        .unwrap()
        .run(&mut EarthOrbitModel::default(), &x0, 0.0, period)
        .unwrap();

    // about 363 days for this state
    assert!((period / SECONDS_PER_DAY - 363.08).abs() < 0.05);
    assert_vector_close(&summary.state, &x0, 1e6);
}
