mod common;

use common::moscow_params;
use gnomon::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use gnomon::results::{records, DaylightInterval};
use gnomon::scenario::run_daylight;

#[test]
fn test_year_of_daylight_at_55_north() {
    let run = run_daylight(&moscow_params(600.0)).unwrap();
    let spans = run.model.intervals();
    let table = run.model.results();

    assert_eq!(spans.len(), 365);
    assert_eq!(table.rows(), 365);
    assert_eq!(table.cols(), 2);
    assert_eq!(run.summary.t, 365.0 * SECONDS_PER_DAY);

    for (day, span) in spans.iter().enumerate() {
        let day_start = day as f64 * SECONDS_PER_DAY;
        assert!(
            (day_start..day_start + SECONDS_PER_DAY).contains(&span.sunrise_elapsed),
            "sunrise of pair {day} at {}",
            span.sunrise_elapsed
        );
        assert!(span.sunrise_clock < span.sunset_clock, "pair {day}: {span:?}");
        assert!((0.0..SECONDS_PER_DAY).contains(&span.sunrise_clock));
        assert!((0.0..SECONDS_PER_DAY).contains(&span.sunset_clock));
    }
    assert!(spans
        .windows(2)
        .all(|w| w[0].sunset_elapsed < w[1].sunrise_elapsed));

    let hours: Vec<f64> = spans
        .iter()
        .map(|span| span.duration() / SECONDS_PER_HOUR)
        .collect();
    let (longest_day, longest) = hours
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0.0), |best, (i, h)| if h > best.1 { (i, h) } else { best });
    let shortest = hours.iter().copied().fold(f64::INFINITY, f64::min);

    assert!(longest > 16.5, "longest day {longest} h");
    assert!((150..195).contains(&longest_day), "longest day index {longest_day}");
    assert!(shortest < 7.5, "shortest day {shortest} h");
}

#[test]
fn test_first_day_clock_times() {
    let mut params = moscow_params(600.0);
    params.span_days = 3.0;
    let run = run_daylight(&params).unwrap();
    let first = run.model.intervals()[0];

    // early January in Moscow time: sunrise after 9 h, sunset after 16 h
    let sunrise = first.sunrise_clock / SECONDS_PER_HOUR;
    let sunset = first.sunset_clock / SECONDS_PER_HOUR;
    assert!((8.9..9.5).contains(&sunrise), "sunrise {sunrise} h");
    assert!((15.9..16.5).contains(&sunset), "sunset {sunset} h");
}

#[test]
fn test_daylight_table_as_typed_records() {
    let mut params = moscow_params(600.0);
    params.span_days = 10.0;
    let run = run_daylight(&params).unwrap();
    let rows: Vec<DaylightInterval> = records(run.model.results()).unwrap();

    assert_eq!(rows.len(), run.model.intervals().len());
    for (row, span) in rows.iter().zip(run.model.intervals()) {
        assert_eq!(row.sunrise, span.sunrise_clock);
        assert_eq!(row.sunset, span.sunset_clock);
        assert_eq!(row.day_length(), span.sunset_clock - span.sunrise_clock);
    }
}
