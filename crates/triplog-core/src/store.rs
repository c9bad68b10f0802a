// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Store capability consumed by the contract.
//!
//! The ledger itself (consensus, persistence, query indexing) lives outside
//! this crate. Contract code only sees a [`LedgerStub`]: one transaction's view
//! of world state plus the transaction id used as the key uniqueness token.
//!
//! # Absence Semantics
//!
//! [`get_state`](LedgerStub::get_state) returns `Ok(None)` for a missing key.
//! Absence is not a store failure; the contract decides how to report it.

use thiserror::Error;

use crate::selector::Selector;

/// Failures reported by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Write was rejected.
    #[error("put {key:?} rejected: {reason}")]
    Put {
        /// Key of the rejected write.
        key: String,
        /// Backend reason.
        reason: String,
    },
    /// Read failed.
    #[error("get {key:?} failed: {reason}")]
    Get {
        /// Key being read.
        key: String,
        /// Backend reason.
        reason: String,
    },
    /// Query could not be opened or advanced.
    #[error("query failed: {0}")]
    Query(String),
    /// Iterator was used after close.
    #[error("iterator already closed")]
    Closed,
}

/// One query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Storage key.
    pub key: String,
    /// Raw stored document.
    pub value: Vec<u8>,
}

/// Cursor over query results.
///
/// Callers must invoke [`close`](StateIterator::close) exactly once when done;
/// [`crate::query::execute`] guarantees this on every exit path.
pub trait StateIterator {
    /// `true` while at least one more entry can be requested.
    fn has_next(&self) -> bool;
    /// Advance and return the next entry.
    fn next_entry(&mut self) -> Result<KeyValue, StoreError>;
    /// Release the cursor.
    fn close(&mut self) -> Result<(), StoreError>;
}

/// One transaction's view of the ledger.
pub trait LedgerStub {
    /// Identifier of the enclosing transaction. Unique per transaction.
    fn tx_id(&self) -> &str;

    /// Stage a write of `value` under `key`.
    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Read the committed value under `key`.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Open a cursor over committed entries matching `selector`.
    fn get_query_result(
        &self,
        selector: &Selector,
    ) -> Result<Box<dyn StateIterator + '_>, StoreError>;
}
