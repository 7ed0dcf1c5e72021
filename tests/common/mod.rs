#![allow(dead_code)]

use camino::Utf8PathBuf;
use gnomon::linalg::vector::Vector;
use gnomon::scenario::ScenarioParams;

/// Default scenario (55°N 37°E, UTC+3, epoch 2024-01-01) sampled every `increment` seconds.
pub fn moscow_params(increment: f64) -> ScenarioParams {
    ScenarioParams::builder()
        .latitude_deg(55.0)
        .longitude_deg(37.0)
        .utc_offset_hours(3.0)
        .sample_increment(increment)
        .tolerance(1e-12)
        .build()
        .unwrap()
}

pub fn assert_vector_close(actual: &Vector, expected: &Vector, epsilon: f64) {
    let distance = actual.try_sub(expected).unwrap().length();
    assert!(
        distance < epsilon,
        "|{actual} - {expected}| = {distance:e} exceeds {epsilon:e}"
    );
}

/// Fresh per-process scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> Utf8PathBuf {
    let dir = std::env::temp_dir().join(format!("gnomon-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    Utf8PathBuf::from_path_buf(dir).unwrap()
}
