use std::env;

use camino::Utf8PathBuf;
use gnomon::constants::RADEG;
use gnomon::scenario::{run_all, Scenario, ScenarioParams};
use gnomon::time::parse_epoch;
use gnomon::GnomonError;

/// Remove `flag` and its value from `args`, returning the value.
fn take_option(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

/// Run the requested scenarios with the default Moscow setup and write their tables.
/// Usage:
///   sundial_and_daylight [SCENARIO...] [--out DIR] [--test-day DATE] [--verbose]
/// Example:
///   sundial_and_daylight sundial daylight --out /tmp/gnomon --test-day 2024-06-21T00:00:00 --verbose
///
/// Each scenario runs in its own error boundary: a failure is reported and the remaining
/// scenarios still run.
fn main() -> Result<(), GnomonError> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let verbose = if let Some(pos) = args.iter().position(|a| a == "--verbose") {
        args.remove(pos);
        true
    } else {
        false
    };
    let out_dir = take_option(&mut args, "--out")
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| Utf8PathBuf::from("."));
    let test_day = take_option(&mut args, "--test-day")
        .map(|date| parse_epoch(&date))
        .transpose()?;

    let scenarios = if args.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        args.iter()
            .map(|name| name.parse::<Scenario>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let params = match test_day {
        Some(day) => ScenarioParams::builder().test_day(day).build()?,
        None => ScenarioParams::default(),
    };
    if verbose {
        eprintln!(
            "[sundial_and_daylight] site = ({:.2}°, {:.2}°), UTC{:+}, epoch {}",
            params.latitude / RADEG,
            params.longitude / RADEG,
            params.utc_offset_hours,
            params.epoch
        );
        eprintln!("{:#}", params.integrator()?.params());
    }

    let mut failures = 0usize;
    for (scenario, report) in run_all(&scenarios, &params) {
        match report.and_then(|report| report.write_to(&out_dir).map(|path| (report, path))) {
            Ok((report, path)) => println!("{report} -> {path}"),
            Err(e) => {
                failures += 1;
                eprintln!("[sundial_and_daylight] {scenario} failed: {e}");
            }
        }
    }

    if failures > 0 {
        eprintln!("[sundial_and_daylight] {failures} scenario(s) failed");
        std::process::exit(1);
    }
    Ok(())
}
