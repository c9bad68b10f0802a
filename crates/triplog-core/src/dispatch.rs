// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named-operation dispatch.
//!
//! The routing table is built once on first use and never mutated. Handlers
//! own their arity checks.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use tracing::instrument;

use crate::cancel::CancelFlag;
use crate::contract::{
    init_ledger, parse_header_flag, query_buses, query_buses_by_date, record_bus,
    record_buses_from_csv,
};
use crate::error::{LedgerError, Result};
use crate::store::LedgerStub;

/// `queryBuses(key)`
pub const QUERY_BUSES: &str = "queryBuses";
/// `queryBusesByDate(date)`
pub const QUERY_BUSES_BY_DATE: &str = "queryBusesByDate";
/// `initLedger()`
pub const INIT_LEDGER: &str = "initLedger";
/// `recordBus(vehicleId, dateOfTrip, timestampOfTrip, travelDistanceM, totalTimeSec)`
pub const RECORD_BUS: &str = "recordBus";
/// `recordBusesFromCSV(path, hasHeader?)`
pub const RECORD_BUSES_FROM_CSV: &str = "recordBusesFromCSV";

type Handler = fn(&mut dyn LedgerStub, &[String], &CancelFlag) -> Result<Vec<u8>>;

static HANDLERS: LazyLock<BTreeMap<&'static str, Handler>> = LazyLock::new(|| {
    BTreeMap::from([
        (QUERY_BUSES, handle_query_buses as Handler),
        (QUERY_BUSES_BY_DATE, handle_query_buses_by_date as Handler),
        (INIT_LEDGER, handle_init_ledger as Handler),
        (RECORD_BUS, handle_record_bus as Handler),
        (RECORD_BUSES_FROM_CSV, handle_record_buses_from_csv as Handler),
    ])
});

fn exact<'a, const N: usize>(
    operation: &'static str,
    expected: &'static str,
    args: &'a [String],
) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| LedgerError::Arity {
        operation,
        expected,
        found: args.len(),
    })
}

fn handle_query_buses(
    stub: &mut dyn LedgerStub,
    args: &[String],
    _cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let [key] = exact::<1>(QUERY_BUSES, "1", args)?;
    query_buses(stub, key)
}

fn handle_query_buses_by_date(
    stub: &mut dyn LedgerStub,
    args: &[String],
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let [date] = exact::<1>(QUERY_BUSES_BY_DATE, "1", args)?;
    query_buses_by_date(stub, date, cancel)
}

fn handle_init_ledger(
    stub: &mut dyn LedgerStub,
    args: &[String],
    _cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let [] = exact::<0>(INIT_LEDGER, "0", args)?;
    Ok(init_ledger(stub)?.into_bytes())
}

fn handle_record_bus(
    stub: &mut dyn LedgerStub,
    args: &[String],
    _cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let [vehicle, date, timestamp, distance, duration] = exact::<5>(RECORD_BUS, "5", args)?;
    Ok(record_bus(stub, vehicle, date, timestamp, distance, duration)?.into_bytes())
}

fn handle_record_buses_from_csv(
    stub: &mut dyn LedgerStub,
    args: &[String],
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let (path, has_header) = match args {
        [path] => (path, false),
        [path, flag] => (path, parse_header_flag(flag)?),
        _ => {
            return Err(LedgerError::Arity {
                operation: RECORD_BUSES_FROM_CSV,
                expected: "1 or 2",
                found: args.len(),
            })
        }
    };
    let report = record_buses_from_csv(stub, Path::new(path), has_header, cancel)?;
    Ok(serde_json::to_vec(&report)?)
}

/// Names of every routed operation, sorted.
pub fn operations() -> impl Iterator<Item = &'static str> {
    HANDLERS.keys().copied()
}

/// Route `function` with positional `args` against `stub`.
pub fn invoke(stub: &mut dyn LedgerStub, function: &str, args: &[String]) -> Result<Vec<u8>> {
    invoke_with_cancel(stub, function, args, &CancelFlag::new())
}

/// [`invoke`] with a caller-held cancellation flag.
#[instrument(skip(stub, args, cancel), fields(argc = args.len()))]
pub fn invoke_with_cancel(
    stub: &mut dyn LedgerStub,
    function: &str,
    args: &[String],
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let handler = HANDLERS
        .get(function)
        .ok_or_else(|| LedgerError::UnknownCommand(function.to_owned()))?;
    handler(stub, args, cancel)
}
