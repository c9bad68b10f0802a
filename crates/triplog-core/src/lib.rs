// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trip ledger core.
//!
//! `triplog-core` decides what keys and selectors a vehicle trip ledger
//! produces. It records trips under composite keys, answers point lookups and
//! date queries, and bulk-imports CSV sources. The ledger itself is injected
//! through [`LedgerStub`]; [`MemoryLedger`] is the in-process implementation.
//!
//! # Key Policy
//!
//! Every write lands under `trip~<vehicleId>~<dateOfTrip>~<txToken>`. The token
//! is the writing transaction's id, so concurrent writers for the same vehicle
//! and date never collide. See [`key`].
//!
//! # Validation Gate
//!
//! Dates are checked against `YYYY-MM-DD` before a selector or key exists. A
//! request that fails validation performs no store call at all.
//!
//! # Ingestion Policy
//!
//! Bad CSV rows are skipped and counted ([`IngestReport`]); only source I/O and
//! store write failures abort an import.
#![forbid(unsafe_code)]

pub mod cancel;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod key;
mod memory;
pub mod query;
pub mod record;
pub mod selector;
pub mod store;

pub use cancel::CancelFlag;
pub use dispatch::{invoke, invoke_with_cancel, operations};
pub use error::{LedgerError, Result};
pub use ingest::{IngestOptions, IngestReport, RowError};
pub use key::{compose_key, CompositeKey, TRIP_INDEX};
pub use memory::{MemoryIter, MemoryLedger, MemoryTx};
pub use record::TripRecord;
pub use selector::Selector;
pub use store::{KeyValue, LedgerStub, StateIterator, StoreError};
