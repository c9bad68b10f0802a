// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bulk CSV ingestion.
//!
//! Rows stream through Header → Read → Transform → Write, one at a time; the
//! source is never buffered whole. A bad row is logged, counted and skipped.
//! Only source I/O failures and store write failures end the import early.
//!
//! # Row Layout
//!
//! | column | field |
//! |-------:|-------|
//! | 0 | bus and round id |
//! | 1 | vehicle id |
//! | 2, 3, 4 | year, month, day |
//! | 9 | timestamp |
//! | 10 | travel distance (m) |
//! | 18 | total time (s) |
//!
//! Every data row must have exactly [`REQUIRED_COLUMNS`] columns. The header,
//! when present, is never inspected.

use std::fs::File;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

use csv::ByteRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::error::{LedgerError, Result};
use crate::key::compose_key;
use crate::record::TripRecord;
use crate::store::LedgerStub;

/// Bus and round id column.
pub const COL_BUS_AND_ROUND: usize = 0;
/// Vehicle id column.
pub const COL_VEHICLE: usize = 1;
/// Year column.
pub const COL_YEAR: usize = 2;
/// Month column.
pub const COL_MONTH: usize = 3;
/// Day column.
pub const COL_DAY: usize = 4;
/// Timestamp column.
pub const COL_TIMESTAMP: usize = 9;
/// Travel distance column.
pub const COL_DISTANCE: usize = 10;
/// Total time column.
pub const COL_DURATION: usize = 18;
/// Width of every data row.
pub const REQUIRED_COLUMNS: usize = COL_DURATION + 1;
/// Skipped rows whose reasons are kept in the report; counts are always exact.
pub const MAX_SKIP_DETAILS: usize = 100;

/// Why a single row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The reader could not parse the row.
    #[error("unreadable row: {0}")]
    Parse(String),
    /// Row is not [`REQUIRED_COLUMNS`] wide.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Width required.
        expected: usize,
        /// Width of the row.
        found: usize,
    },
    /// A column the row needs is not valid UTF-8.
    #[error("column {column} is not valid UTF-8")]
    Encoding {
        /// Column index.
        column: usize,
    },
    /// A date component is not a number in range.
    #[error("column {column}: {value:?} is not a valid {part}")]
    DateComponent {
        /// Column index.
        column: usize,
        /// `year`, `month` or `day`.
        part: &'static str,
        /// Raw cell text.
        value: String,
    },
    /// The row's key could not be composed (e.g. empty vehicle id).
    #[error("{0}")]
    Key(String),
}

/// One skipped row in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based source line.
    pub line: u64,
    /// Rendered [`RowError`].
    pub reason: String,
}

/// Aggregate outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows written to the store.
    pub written: usize,
    /// Rows skipped.
    pub skipped: usize,
    /// Reasons for the first [`MAX_SKIP_DETAILS`] skipped rows.
    pub skipped_rows: Vec<SkippedRow>,
}

impl IngestReport {
    fn skip(&mut self, line: u64, reason: &RowError) {
        warn!(line, %reason, "skipping csv row");
        self.skipped += 1;
        if self.skipped_rows.len() < MAX_SKIP_DETAILS {
            self.skipped_rows.push(SkippedRow {
                line,
                reason: reason.to_string(),
            });
        }
    }
}

/// Import options.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Discard the first record without validating it.
    pub has_header: bool,
    /// Polled before every row.
    pub cancel: CancelFlag,
}

/// Render a canonical `YYYY-MM-DD` date.
pub fn canonical_date(year: u32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

fn field(record: &ByteRecord, column: usize) -> std::result::Result<&str, RowError> {
    let bytes = record.get(column).ok_or(RowError::ColumnCount {
        expected: REQUIRED_COLUMNS,
        found: record.len(),
    })?;
    std::str::from_utf8(bytes).map_err(|_| RowError::Encoding { column })
}

fn date_part(
    record: &ByteRecord,
    column: usize,
    part: &'static str,
    range: RangeInclusive<u32>,
) -> std::result::Result<u32, RowError> {
    let raw = field(record, column)?;
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| range.contains(value))
        .ok_or_else(|| RowError::DateComponent {
            column,
            part,
            value: raw.to_owned(),
        })
}

/// Reshape one data row into a trip record.
pub fn transform_row(record: &ByteRecord) -> std::result::Result<TripRecord, RowError> {
    if record.len() != REQUIRED_COLUMNS {
        return Err(RowError::ColumnCount {
            expected: REQUIRED_COLUMNS,
            found: record.len(),
        });
    }
    let year = date_part(record, COL_YEAR, "year", 1..=9999)?;
    let month = date_part(record, COL_MONTH, "month", 1..=12)?;
    let day = date_part(record, COL_DAY, "day", 1..=31)?;
    Ok(TripRecord {
        bus_and_round_id: field(record, COL_BUS_AND_ROUND)?.to_owned(),
        vehicle_id: field(record, COL_VEHICLE)?.to_owned(),
        date_of_trip: canonical_date(year, month, day),
        timestamp_of_trip: field(record, COL_TIMESTAMP)?.to_owned(),
        travel_distance_m: field(record, COL_DISTANCE)?.to_owned(),
        total_time_sec: field(record, COL_DURATION)?.to_owned(),
    })
}

/// Stream `source` into `stub`.
///
/// Each row is written under `compose_key(vehicle, date, "<txId>-<line>")`:
/// rows share one transaction, so the line number keeps their keys apart.
pub fn ingest_reader<R: Read>(
    stub: &mut dyn LedgerStub,
    source: R,
    options: &IngestOptions,
) -> Result<IngestReport> {
    ingest_labelled(stub, source, "<reader>", options)
}

/// Open `path` and stream it into `stub`. The file is closed on every return.
pub fn ingest_path(
    stub: &mut dyn LedgerStub,
    path: &Path,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|source| LedgerError::Source {
        path: label.clone(),
        source,
    })?;
    ingest_labelled(stub, file, &label, options)
}

fn ingest_labelled<R: Read>(
    stub: &mut dyn LedgerStub,
    source: R,
    label: &str,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut record = ByteRecord::new();
    let mut report = IngestReport::default();
    let mut header_pending = options.has_header;

    loop {
        options.cancel.check()?;
        let next_line = reader.position().line();
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => match err.into_kind() {
                csv::ErrorKind::Io(source) => {
                    return Err(LedgerError::Source {
                        path: label.to_owned(),
                        source,
                    })
                }
                other => {
                    report.skip(next_line, &RowError::Parse(format!("{other:?}")));
                    continue;
                }
            },
        }
        let line = record.position().map_or(next_line, csv::Position::line);
        if header_pending {
            header_pending = false;
            continue;
        }

        let trip = match transform_row(&record) {
            Ok(trip) => trip,
            Err(reason) => {
                report.skip(line, &reason);
                continue;
            }
        };
        let token = format!("{}-{line}", stub.tx_id());
        let key = match compose_key(&trip.vehicle_id, &trip.date_of_trip, &token) {
            Ok(key) => key,
            Err(err) => {
                report.skip(line, &RowError::Key(err.to_string()));
                continue;
            }
        };
        let document = trip.to_document()?;
        stub.put_state(&key, &document)
            .map_err(|source| LedgerError::RecordWrite {
                key: key.clone(),
                source,
            })?;
        debug!(line, %key, "recorded trip from csv");
        report.written += 1;
    }

    info!(
        source = label,
        written = report.written,
        skipped = report.skipped,
        "csv import finished"
    );
    Ok(report)
}
