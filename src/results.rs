//! # Result tables on disk
//!
//! A model's result table is written as plain text: one line per row, fields separated by a
//! single space, no header. Numbers use Rust's shortest round-trip formatting, so reading a
//! table back yields bit-identical values.
//!
//! ```text
//! 33240 57240
//! 33060 57360
//! ```
//!
//! Tables can also be viewed as typed rows through `serde` ([`DaylightInterval`],
//! [`ShadowSample`]) with [`read_records`] / [`records`].
use std::fs::File;
use std::io::{Read, Write};

use camino::Utf8Path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::gnomon_errors::GnomonError;
use crate::linalg::matrix::Matrix;
use crate::linalg::vector::Vector;

/// Row of the daylight table: local wall-clock times in seconds of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaylightInterval {
    pub sunrise: f64,
    pub sunset: f64,
}

impl DaylightInterval {
    /// Length of the day in seconds (the clock times share the same local day).
    pub fn day_length(&self) -> f64 {
        self.sunset - self.sunrise
    }
}

/// Row of the sundial table, in the right-handed (east, north, up) frame.
///
/// Column order differs from a (north, down, east) layout: compare `north` with its first
/// column, `-up` with its second and `east` with its third.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSample {
    pub east: f64,
    pub north: f64,
    pub up: f64,
    /// Solar zenith distance in radians.
    pub zenith_distance: f64,
    /// Seconds since the start of the test day.
    pub elapsed: f64,
}

impl ShadowSample {
    pub fn length(&self) -> f64 {
        self.east.hypot(self.north)
    }

    /// Azimuth of the shadow, clockwise from north, in `[0, 2π)`.
    pub fn azimuth(&self) -> f64 {
        self.east
            .atan2(self.north)
            .rem_euclid(2.0 * std::f64::consts::PI)
    }
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(b' ').has_headers(false);
    builder
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// I/O failures of the csv writer belong to the destination, not to the table.
fn sink_error(e: csv::Error) -> GnomonError {
    if !e.is_io_error() {
        return GnomonError::TableFormat(e);
    }
    match e.into_kind() {
        csv::ErrorKind::Io(io) => GnomonError::SinkFailure(io),
        other => GnomonError::SinkFailure(std::io::Error::other(format!("{other:?}"))),
    }
}

/// Write `table` to any writer, one space-separated line per row.
///
/// Errors
/// -----------------
/// * [`GnomonError::SinkFailure`] whenever the writer fails, whether the failure surfaces
///   while buffering a row or on the final flush.
pub fn write_table_to<W: Write>(table: &Matrix, sink: W) -> Result<(), GnomonError> {
    let mut writer = writer_builder().from_writer(sink);
    for row in table.row_iter() {
        writer
            .write_record(row.iter().map(|x| x.to_string()))
            .map_err(sink_error)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `table` to `path`, truncating any existing file.
///
/// Errors
/// -----------------
/// * [`GnomonError::SinkFailure`] if the file cannot be created or written.
pub fn write_table(table: &Matrix, path: &Utf8Path) -> Result<(), GnomonError> {
    let file = File::create(path)?;
    write_table_to(table, file)
}

/// Read a table back from any reader.
///
/// Empty fields (repeated separators) are ignored.
///
/// Errors
/// -----------------
/// * [`GnomonError::MalformedRow`] for a non-numeric field or a row whose width differs from
///   the first row.
/// * [`GnomonError::TableFormat`] for an I/O or encoding failure of the underlying reader.
pub fn read_table_from<R: Read>(source: R) -> Result<Matrix, GnomonError> {
    let mut reader = reader_builder().from_reader(source);
    let mut table = Matrix::default();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let values = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().map_err(|e| GnomonError::MalformedRow {
                    row,
                    reason: format!("{field:?}: {e}"),
                })
            })
            .collect::<Result<Vector, GnomonError>>()?;

        if values.is_empty() {
            continue;
        }
        if !table.is_empty() && values.dimension() != table.cols() {
            return Err(GnomonError::MalformedRow {
                row,
                reason: format!(
                    "expected {} fields, found {}",
                    table.cols(),
                    values.dimension()
                ),
            });
        }
        table.push_row(&values)?;
    }
    Ok(table)
}

/// Read a table written by [`write_table`].
pub fn read_table(path: &Utf8Path) -> Result<Matrix, GnomonError> {
    read_table_from(File::open(path)?)
}

/// Deserialize the rows of a table file into typed records.
pub fn read_records<T: DeserializeOwned>(path: &Utf8Path) -> Result<Vec<T>, GnomonError> {
    records(&read_table(path)?)
}

/// Typed view of an in-memory table.
pub fn records<T: DeserializeOwned>(table: &Matrix) -> Result<Vec<T>, GnomonError> {
    let mut buffer = Vec::new();
    write_table_to(table, &mut buffer)?;
    let mut reader = reader_builder().from_reader(buffer.as_slice());
    reader
        .deserialize()
        .map(|record| record.map_err(GnomonError::from))
        .collect()
}

#[cfg(test)]
mod results_test {
    use super::*;

    fn sample_table() -> Matrix {
        Matrix::from_row_major(2, 2, vec![33240.0, 57240.5, 1e-17, -3.0]).unwrap()
    }

    #[test]
    fn test_text_layout() {
        let mut buffer = Vec::new();
        write_table_to(&sample_table(), &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "33240 57240.5\n0.00000000000000001 -3\n"
        );
    }

    #[test]
    fn test_read_back_is_exact() {
        let table = Matrix::from_row_major(
            1,
            3,
            vec![std::f64::consts::PI, -1.0 / 3.0, 6.02214076e23],
        )
        .unwrap();
        let mut buffer = Vec::new();
        write_table_to(&table, &mut buffer).unwrap();
        assert_eq!(read_table_from(buffer.as_slice()).unwrap(), table);
    }

    #[test]
    fn test_reader_tolerates_repeated_separators() {
        let text = "1  2 3\n\n4 5  6 \n";
        let table = read_table_from(text.as_bytes()).unwrap();
        assert_eq!(
            table,
            Matrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
        );
    }

    #[test]
    fn test_malformed_rows() {
        assert_eq!(
            read_table_from("1 2\n3 x\n".as_bytes()).unwrap_err(),
            GnomonError::MalformedRow {
                row: 1,
                reason: "\"x\": invalid float literal".into()
            }
        );
        assert!(matches!(
            read_table_from("1 2\n3 4 5\n".as_bytes()),
            Err(GnomonError::MalformedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_typed_rows() {
        let daylight: Vec<DaylightInterval> = records(&sample_table()).unwrap();
        assert_eq!(
            daylight[0],
            DaylightInterval {
                sunrise: 33240.0,
                sunset: 57240.5
            }
        );
        assert_eq!(daylight[0].day_length(), 24000.5);

        let shadow = ShadowSample {
            east: 0.0,
            north: 1.5,
            up: 0.0,
            zenith_distance: 1.0,
            elapsed: 100.0,
        };
        assert_eq!(shadow.length(), 1.5);
        assert_eq!(shadow.azimuth(), 0.0);
        let west = ShadowSample { east: -1.0, ..shadow };
        assert!(west.azimuth() > std::f64::consts::PI);
    }

    /// Writer that rejects every byte, like a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_full_sink_is_a_sink_failure_for_any_table_size() {
        for rows in [2, 20_000] {
            let err = write_table_to(&Matrix::new(rows, 6), FullDisk).unwrap_err();
            assert!(
                matches!(&err, GnomonError::SinkFailure(io) if io.kind() == std::io::ErrorKind::Other),
                "{rows} rows: {err:?}"
            );
        }
    }

    #[test]
    fn test_unwritable_path_is_a_sink_failure() {
        let path = Utf8Path::new("/nonexistent-gnomon-dir/table.txt");
        assert!(matches!(
            write_table(&sample_table(), path),
            Err(GnomonError::SinkFailure(_))
        ));
    }
}
