// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory ledger.
//!
//! [`MemoryLedger`] is the fake world state behind tests and the developer CLI.
//! It models just enough of a transactional ledger for the contract: per
//! transaction write sets, unique transaction ids, and selector queries over
//! committed state.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::selector::Selector;
use crate::store::{KeyValue, LedgerStub, StateIterator, StoreError};

const TX_ID_DOMAIN: &[u8] = b"triplog:tx:";

/// In-memory world state.
///
/// Committed entries live in a `BTreeMap`, so query results come back in key
/// order.
///
/// # Transaction Invariants
///
/// - Each [`begin`](MemoryLedger::begin) issues a fresh transaction id derived
///   from a monotonically increasing counter.
/// - Writes are invisible to reads (including the writing transaction) until
///   [`MemoryTx::commit`].
/// - Dropping a transaction without committing discards its writes.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: BTreeMap<String, Arc<[u8]>>,
    next_tx: u64,
    byte_count: usize,
}

impl MemoryLedger {
    /// Empty ledger whose first transaction is number 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from previously committed entries.
    ///
    /// `next_tx` must be the counter saved alongside the entries, otherwise
    /// transaction ids (and therefore keys) may repeat.
    pub fn from_entries<I, K, V>(next_tx: u64, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let mut ledger = Self {
            next_tx,
            ..Self::default()
        };
        for (key, value) in entries {
            ledger.apply(key.into(), value.as_ref());
        }
        ledger
    }

    fn apply(&mut self, key: String, value: &[u8]) {
        self.byte_count += value.len();
        if let Some(old) = self.state.insert(key, Arc::from(value)) {
            self.byte_count -= old.len();
        }
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns `true` if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Total bytes across committed values.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Counter for the next transaction.
    pub fn next_tx(&self) -> u64 {
        self.next_tx
    }

    /// Committed value under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.state.get(key).cloned()
    }

    /// Committed entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.state.iter().map(|(k, v)| (k.as_str(), &**v))
    }

    /// Open a transaction.
    pub fn begin(&mut self) -> MemoryTx<'_> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(TX_ID_DOMAIN);
        hasher.update(&self.next_tx.to_le_bytes());
        let tx_id = hasher.finalize().to_hex().to_string();
        self.next_tx += 1;
        MemoryTx {
            ledger: self,
            tx_id,
            writes: BTreeMap::new(),
        }
    }
}

/// Open transaction against a [`MemoryLedger`].
#[derive(Debug)]
pub struct MemoryTx<'a> {
    ledger: &'a mut MemoryLedger,
    tx_id: String,
    writes: BTreeMap<String, Vec<u8>>,
}

impl MemoryTx<'_> {
    /// Number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply staged writes. Returns how many entries were written.
    pub fn commit(self) -> usize {
        let count = self.writes.len();
        for (key, value) in self.writes {
            self.ledger.apply(key, &value);
        }
        debug!(tx_id = %self.tx_id, count, "memory ledger commit");
        count
    }
}

impl LedgerStub for MemoryTx<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Put {
                key: String::new(),
                reason: "key must not be empty".into(),
            });
        }
        self.writes.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.ledger.state.get(key).map(|v| v.to_vec()))
    }

    fn get_query_result(
        &self,
        selector: &Selector,
    ) -> Result<Box<dyn StateIterator + '_>, StoreError> {
        let entries = self
            .ledger
            .state
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<serde_json::Value>(value)
                    .is_ok_and(|doc| selector.matches(&doc))
            })
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.to_vec(),
            })
            .collect();
        Ok(Box::new(MemoryIter {
            entries,
            closed: false,
        }))
    }
}

/// Snapshot cursor returned by [`MemoryTx`] queries.
#[derive(Debug)]
pub struct MemoryIter {
    entries: VecDeque<KeyValue>,
    closed: bool,
}

impl StateIterator for MemoryIter {
    fn has_next(&self) -> bool {
        !self.closed && !self.entries.is_empty()
    }

    fn next_entry(&mut self) -> Result<KeyValue, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        self.entries
            .pop_front()
            .ok_or_else(|| StoreError::Query("iterator exhausted".into()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.entries.clear();
        Ok(())
    }
}
