// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ledger operations exposed through the dispatcher.

use std::path::Path;

use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::error::{LedgerError, Result};
use crate::ingest::{ingest_path, IngestOptions, IngestReport};
use crate::key::compose_key;
use crate::query::query_with_selector;
use crate::record::TripRecord;
use crate::selector::Selector;
use crate::store::LedgerStub;

/// Raw document stored under exactly `key`.
pub fn query_buses(stub: &dyn LedgerStub, key: &str) -> Result<Vec<u8>> {
    stub.get_state(key)?
        .ok_or_else(|| LedgerError::NotFound(key.to_owned()))
}

/// JSON array of `{Key, Record}` for every trip on `date`.
///
/// The date is validated before the store is touched.
pub fn query_buses_by_date(
    stub: &dyn LedgerStub,
    date: &str,
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let selector = Selector::by_trip_date(date)?;
    query_with_selector(stub, &selector, cancel)
}

/// Fixture record written by [`init_ledger`].
pub fn placeholder_record() -> TripRecord {
    TripRecord {
        bus_and_round_id: "0-0".into(),
        vehicle_id: "TESTT".into(),
        date_of_trip: "1970-01-01".into(),
        timestamp_of_trip: "0".into(),
        travel_distance_m: "0".into(),
        total_time_sec: "0".into(),
    }
}

/// Seed one placeholder record. Returns its key.
pub fn init_ledger(stub: &mut dyn LedgerStub) -> Result<String> {
    let key = record_trip(stub, &placeholder_record())?;
    info!(%key, "seeded placeholder trip");
    Ok(key)
}

/// Write `trip` under a fresh composite key. Returns the key.
pub fn record_trip(stub: &mut dyn LedgerStub, trip: &TripRecord) -> Result<String> {
    let key = compose_key(&trip.vehicle_id, &trip.date_of_trip, stub.tx_id())?;
    let document = trip.to_document()?;
    stub.put_state(&key, &document)
        .map_err(|source| LedgerError::RecordWrite {
            key: key.clone(),
            source,
        })?;
    debug!(%key, "recorded trip");
    Ok(key)
}

/// Record one bus trip from its positional fields. Returns the key.
pub fn record_bus(
    stub: &mut dyn LedgerStub,
    vehicle_id: &str,
    date_of_trip: &str,
    timestamp_of_trip: &str,
    travel_distance_m: &str,
    total_time_sec: &str,
) -> Result<String> {
    let trip = TripRecord {
        bus_and_round_id: String::new(),
        vehicle_id: vehicle_id.to_owned(),
        date_of_trip: date_of_trip.to_owned(),
        timestamp_of_trip: timestamp_of_trip.to_owned(),
        travel_distance_m: travel_distance_m.to_owned(),
        total_time_sec: total_time_sec.to_owned(),
    };
    record_trip(stub, &trip)
}

/// Bulk-import the CSV file at `path`.
pub fn record_buses_from_csv(
    stub: &mut dyn LedgerStub,
    path: &Path,
    has_header: bool,
    cancel: &CancelFlag,
) -> Result<IngestReport> {
    let options = IngestOptions {
        has_header,
        cancel: cancel.clone(),
    };
    ingest_path(stub, path, &options)
}

/// Parse the optional header flag: `true`/`false`, case-insensitive.
pub fn parse_header_flag(raw: &str) -> Result<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(LedgerError::Validation(format!(
            "header flag must be true or false, got {raw:?}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;

    #[test]
    fn missing_key_is_not_found() {
        let mut ledger = MemoryLedger::new();
        let tx = ledger.begin();
        assert!(matches!(
            query_buses(&tx, "trip~V~2020-01-01~nope"),
            Err(LedgerError::NotFound(k)) if k == "trip~V~2020-01-01~nope"
        ));
    }

    #[test]
    fn record_bus_uses_tx_id_as_token() {
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        let tx_id = tx.tx_id().to_owned();
        let key = record_bus(&mut tx, "V1", "2020-05-01", "t", "1", "2").unwrap();
        assert_eq!(key, format!("trip~V1~2020-05-01~{tx_id}"));
    }

    #[test]
    fn record_bus_rejects_bad_date_before_writing() {
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        let err = record_bus(&mut tx, "V1", "May 1st", "t", "1", "2").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn init_ledger_seed_is_queryable_by_date() {
        let mut ledger = MemoryLedger::new();
        let key = {
            let mut tx = ledger.begin();
            let key = init_ledger(&mut tx).unwrap();
            tx.commit();
            key
        };
        let tx = ledger.begin();
        let out = query_buses_by_date(&tx, "1970-01-01", &CancelFlag::new()).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(rows[0]["Key"], key);
        assert_eq!(rows[0]["Record"]["vehicleId"], "TESTT");
    }

    #[test]
    fn header_flag_parsing() {
        assert!(parse_header_flag("true").unwrap());
        assert!(parse_header_flag("TRUE").unwrap());
        assert!(!parse_header_flag("false").unwrap());
        assert!(parse_header_flag("yes").is_err());
    }
}
