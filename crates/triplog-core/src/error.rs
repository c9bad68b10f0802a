// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for ledger operations.
//!
//! Display strings carry a bracketed stable code (`[TRIP_*]`) so callers on the
//! far side of a transport can match on the code without parsing prose.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by contract operations.
///
/// Validation variants are produced before any store access. Store variants
/// wrap the backend failure verbatim; nothing here is retried.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Date string does not match `YYYY-MM-DD`.
    #[error("[TRIP_INVALID_DATE] date {0:?} is not in the format YYYY-MM-DD")]
    InvalidDateFormat(String),

    /// A composite key component was empty or otherwise unusable.
    #[error("[TRIP_KEY_COMPOSITION] {component}: {reason}")]
    KeyComposition {
        /// Which component was rejected (`vehicleId`, `dateOfTrip`, `txToken`).
        component: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An argument failed validation (flags, foreign keys).
    #[error("[TRIP_VALIDATION] {0}")]
    Validation(String),

    /// Operation received the wrong number of positional arguments.
    #[error("[TRIP_ARITY] {operation}: incorrect number of arguments, expecting {expected}, got {found}")]
    Arity {
        /// Operation name as dispatched.
        operation: &'static str,
        /// Human-readable expected count (`"1"`, `"1 or 2"`).
        expected: &'static str,
        /// Number of arguments supplied.
        found: usize,
    },

    /// No record is stored under the requested key.
    #[error("[TRIP_NOT_FOUND] could not locate record {0:?}")]
    NotFound(String),

    /// The store rejected a record write.
    #[error("[TRIP_RECORD_WRITE] failed to record trip under {key:?}: {source}")]
    RecordWrite {
        /// Key the write was issued against.
        key: String,
        /// Backend failure.
        #[source]
        source: StoreError,
    },

    /// A result iterator failed mid-stream; partial output was discarded.
    #[error("[TRIP_ITERATOR] {0}")]
    Iterator(#[source] StoreError),

    /// Any other store failure (get, query open).
    #[error("[TRIP_STORE] {0}")]
    Store(#[from] StoreError),

    /// Dispatcher received an operation name it does not route.
    #[error("[TRIP_UNKNOWN_COMMAND] invalid ledger function name: {0}")]
    UnknownCommand(String),

    /// The bulk source could not be opened or read.
    #[error("[TRIP_SOURCE] {path}: {source}")]
    Source {
        /// Path (or label) of the source.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Record or response (de)serialization failed.
    #[error("[TRIP_JSON] {0}")]
    Json(#[from] serde_json::Error),

    /// The caller cancelled the operation; open resources were released.
    #[error("[TRIP_CANCELLED] operation cancelled by caller")]
    Cancelled,
}

impl LedgerError {
    /// `true` for errors raised before any store access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateFormat(_)
                | Self::KeyComposition { .. }
                | Self::Validation(_)
                | Self::Arity { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LedgerError>;
