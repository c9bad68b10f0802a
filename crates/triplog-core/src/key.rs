// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Composite storage keys.
//!
//! Shape: `trip~<vehicleId>~<dateOfTrip>~<txToken>`.
//!
//! The token comes from the enclosing write transaction, so two writes for the
//! same vehicle and date never share a key. Components may not contain the
//! delimiter; that keeps the mapping injective and lets [`CompositeKey::parse`]
//! split a key back into its parts. All keys share the [`TRIP_INDEX`] prefix,
//! so a store can enumerate them as one range even though this crate never
//! issues range scans itself.

use std::fmt;

use crate::error::{LedgerError, Result};
use crate::selector::is_canonical_date;

/// Namespace tag heading every trip key.
pub const TRIP_INDEX: &str = "trip";

/// Separator between key components.
pub const KEY_DELIMITER: char = '~';

/// Parsed form of a composite trip key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// Vehicle identifier.
    pub vehicle_id: String,
    /// Canonical trip date.
    pub date_of_trip: String,
    /// Per-write uniqueness token.
    pub tx_token: String,
}

fn check_component(component: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LedgerError::KeyComposition {
            component,
            reason: "component is empty",
        });
    }
    if value.contains(KEY_DELIMITER) {
        return Err(LedgerError::KeyComposition {
            component,
            reason: "component contains the key delimiter '~'",
        });
    }
    if value.chars().any(char::is_control) {
        return Err(LedgerError::KeyComposition {
            component,
            reason: "component contains a control character",
        });
    }
    Ok(())
}

/// Build the storage key for one trip write.
///
/// Deterministic for identical inputs; rejects empty components, components
/// containing `~` or control characters, and non-canonical dates.
pub fn compose_key(vehicle_id: &str, date_of_trip: &str, tx_token: &str) -> Result<String> {
    check_component("vehicleId", vehicle_id)?;
    check_component("dateOfTrip", date_of_trip)?;
    if !is_canonical_date(date_of_trip) {
        return Err(LedgerError::KeyComposition {
            component: "dateOfTrip",
            reason: "date is not in the format YYYY-MM-DD",
        });
    }
    check_component("txToken", tx_token)?;
    Ok(format!(
        "{TRIP_INDEX}{KEY_DELIMITER}{vehicle_id}{KEY_DELIMITER}{date_of_trip}{KEY_DELIMITER}{tx_token}"
    ))
}

impl CompositeKey {
    /// Compose the key string for these parts.
    pub fn compose(&self) -> Result<String> {
        compose_key(&self.vehicle_id, &self.date_of_trip, &self.tx_token)
    }

    /// Split a key produced by [`compose_key`].
    ///
    /// Keys outside the trip namespace, or with the wrong number of
    /// components, are rejected with [`LedgerError::Validation`].
    pub fn parse(key: &str) -> Result<Self> {
        let foreign = || LedgerError::Validation(format!("{key:?} is not a trip key"));
        let mut parts = key.split(KEY_DELIMITER);
        if parts.next() != Some(TRIP_INDEX) {
            return Err(foreign());
        }
        let (Some(vehicle_id), Some(date_of_trip), Some(tx_token), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(foreign());
        };
        let parsed = Self {
            vehicle_id: vehicle_id.to_owned(),
            date_of_trip: date_of_trip.to_owned(),
            tx_token: tx_token.to_owned(),
        };
        parsed.compose().map_err(|_| foreign())?;
        Ok(parsed)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TRIP_INDEX}{KEY_DELIMITER}{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.vehicle_id, self.date_of_trip, self.tx_token
        )
    }
}
