// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
//! Shared fixtures for triplog-core integration tests.

use std::cell::Cell;
use std::collections::BTreeMap;

use triplog_core::ingest::{
    COL_BUS_AND_ROUND, COL_DAY, COL_DISTANCE, COL_DURATION, COL_MONTH, COL_TIMESTAMP,
    COL_VEHICLE, COL_YEAR, REQUIRED_COLUMNS,
};
use triplog_core::{KeyValue, LedgerStub, Selector, StateIterator, StoreError};

/// Stub that counts every store call and can be told to reject reads or writes.
#[derive(Default)]
pub struct CountingStub {
    pub tx_id: String,
    pub writes: BTreeMap<String, Vec<u8>>,
    pub puts: Cell<usize>,
    pub gets: Cell<usize>,
    pub queries: Cell<usize>,
    pub fail_puts_after: Option<usize>,
    pub fail_gets: bool,
}

impl CountingStub {
    pub fn new(tx_id: &str) -> Self {
        Self {
            tx_id: tx_id.to_owned(),
            ..Self::default()
        }
    }

    pub fn store_calls(&self) -> usize {
        self.puts.get() + self.gets.get() + self.queries.get()
    }
}

struct EmptyIter;

impl StateIterator for EmptyIter {
    fn has_next(&self) -> bool {
        false
    }

    fn next_entry(&mut self) -> Result<KeyValue, StoreError> {
        Err(StoreError::Query("empty".into()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl LedgerStub for CountingStub {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.puts.set(self.puts.get() + 1);
        if self.fail_puts_after.is_some_and(|n| self.writes.len() >= n) {
            return Err(StoreError::Put {
                key: key.to_owned(),
                reason: "endorsement refused".into(),
            });
        }
        self.writes.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.gets.set(self.gets.get() + 1);
        if self.fail_gets {
            return Err(StoreError::Get {
                key: key.to_owned(),
                reason: "peer unreachable".into(),
            });
        }
        Ok(self.writes.get(key).cloned())
    }

    fn get_query_result(
        &self,
        _selector: &Selector,
    ) -> Result<Box<dyn StateIterator + '_>, StoreError> {
        self.queries.set(self.queries.get() + 1);
        Ok(Box::new(EmptyIter))
    }
}

/// One well-formed CSV data line of `REQUIRED_COLUMNS` cells.
pub fn csv_row(bus: &str, vehicle: &str, y: &str, m: &str, d: &str, distance: &str) -> String {
    let mut cells = vec![String::new(); REQUIRED_COLUMNS];
    cells[COL_BUS_AND_ROUND] = bus.to_owned();
    cells[COL_VEHICLE] = vehicle.to_owned();
    cells[COL_YEAR] = y.to_owned();
    cells[COL_MONTH] = m.to_owned();
    cells[COL_DAY] = d.to_owned();
    cells[COL_TIMESTAMP] = "07:30:00".to_owned();
    cells[COL_DISTANCE] = distance.to_owned();
    cells[COL_DURATION] = "1500".to_owned();
    cells.join(",")
}

/// Header line matching [`csv_row`]'s width.
pub fn csv_header() -> String {
    (0..REQUIRED_COLUMNS)
        .map(|i| format!("col{i}"))
        .collect::<Vec<_>>()
        .join(",")
}
