// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query execution: fold a result cursor into one JSON array.
//!
//! Output element shape is `{"Key":"<key>","Record":<stored document>}`. The
//! stored document is embedded verbatim, not re-encoded. Order is exactly the
//! cursor's delivery order.

use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::error::{LedgerError, Result};
use crate::selector::Selector;
use crate::store::{LedgerStub, StateIterator, StoreError};

#[derive(Serialize)]
struct QueryRow {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Record")]
    record: Box<RawValue>,
}

/// Closes the wrapped cursor exactly once, when dropped.
struct CloseOnDrop<'a> {
    inner: Box<dyn StateIterator + 'a>,
}

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.inner.close() {
            warn!(%err, "failed to close query iterator");
        }
    }
}

fn raw_record(key: &str, value: Vec<u8>) -> Result<Box<RawValue>> {
    let text = String::from_utf8(value).map_err(|_| {
        LedgerError::Iterator(StoreError::Query(format!(
            "value under {key:?} is not UTF-8"
        )))
    })?;
    Ok(RawValue::from_string(text)?)
}

/// Drain `iter` into a JSON array payload.
///
/// All-or-nothing: if any `next_entry` fails the buffered rows are discarded
/// and [`LedgerError::Iterator`] is returned. The cursor is closed exactly once
/// on every exit path, cancellation included.
pub fn execute<'a>(iter: Box<dyn StateIterator + 'a>, cancel: &CancelFlag) -> Result<Vec<u8>> {
    let mut cursor = CloseOnDrop { inner: iter };
    let mut rows = Vec::new();
    while cursor.inner.has_next() {
        cancel.check()?;
        let entry = cursor.inner.next_entry().map_err(LedgerError::Iterator)?;
        let record = raw_record(&entry.key, entry.value)?;
        rows.push(QueryRow {
            key: entry.key,
            record,
        });
    }
    Ok(serde_json::to_vec(&rows)?)
}

/// Issue `selector` against `stub` and fold the results.
pub fn query_with_selector(
    stub: &dyn LedgerStub,
    selector: &Selector,
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let query = selector.to_query_string()?;
    debug!(%query, "issuing rich query");
    let iter = stub.get_query_result(selector)?;
    let payload = execute(iter, cancel)?;
    debug!(bytes = payload.len(), "rich query complete");
    Ok(payload)
}
