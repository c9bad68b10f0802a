// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rich-query selector documents.
//!
//! A [`Selector`] is the attribute-match filter handed to the store. It is only
//! constructible through validating builders, so a malformed date never reaches
//! the store as a query.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::record::DATE_OF_TRIP_FIELD;

// ASCII digits only; `\d` in `regex` would admit any Unicode digit.
#[allow(clippy::expect_used)]
static CANONICAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("canonical date pattern is a valid literal")
});

/// Returns `true` if `date` has the canonical `YYYY-MM-DD` shape.
///
/// Shape only: `2020-13-45` passes. Calendar validity is the writer's concern.
pub fn is_canonical_date(date: &str) -> bool {
    CANONICAL_DATE.is_match(date)
}

/// Reject `date` with [`LedgerError::InvalidDateFormat`] unless canonical.
pub fn ensure_canonical_date(date: &str) -> Result<()> {
    if is_canonical_date(date) {
        Ok(())
    } else {
        Err(LedgerError::InvalidDateFormat(date.to_owned()))
    }
}

/// Exact-match selector over record attributes.
///
/// Serializes to the store's rich-query document:
/// `{"selector":{"dateOfTrip":"2020-01-01"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    selector: BTreeMap<String, String>,
}

impl Selector {
    /// Selector matching every record whose `dateOfTrip` equals `date`.
    pub fn by_trip_date(date: &str) -> Result<Self> {
        ensure_canonical_date(date)?;
        let mut selector = BTreeMap::new();
        selector.insert(DATE_OF_TRIP_FIELD.to_owned(), date.to_owned());
        Ok(Self { selector })
    }

    /// Attribute/value pairs in attribute order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selector.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Evaluate against a parsed document. Non-objects and non-string
    /// attribute values never match.
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        let Some(object) = document.as_object() else {
            return false;
        };
        self.attributes().all(|(attr, expected)| {
            object
                .get(attr)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|actual| actual == expected)
        })
    }

    /// Render the query string sent to the store.
    pub fn to_query_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_dates_accepted() {
        for date in ["2020-01-01", "1999-12-31", "0000-00-00"] {
            assert!(is_canonical_date(date), "{date}");
        }
    }

    #[test]
    fn malformed_dates_rejected() {
        for date in [
            "2020-1-1",
            "abcd-ef-gh",
            "",
            "2020-01-01 ",
            " 2020-01-01",
            "2020/01/01",
            "20200-01-01",
            "2020-01-01\n",
            "٢٠٢٠-٠١-٠١",
            r#"2020-01-01"},"$or":[{"#,
        ] {
            let err = Selector::by_trip_date(date).unwrap_err();
            assert!(
                matches!(err, LedgerError::InvalidDateFormat(ref d) if d == date),
                "{date:?} -> {err}"
            );
        }
    }

    #[test]
    fn query_string_shape() {
        let selector = Selector::by_trip_date("2019-07-04").unwrap();
        assert_eq!(
            selector.to_query_string().unwrap(),
            r#"{"selector":{"dateOfTrip":"2019-07-04"}}"#
        );
    }

    #[test]
    fn matches_exact_date_only() {
        let selector = Selector::by_trip_date("2019-07-04").unwrap();
        assert!(selector.matches(&json!({"dateOfTrip": "2019-07-04", "vehicleId": "A"})));
        assert!(!selector.matches(&json!({"dateOfTrip": "2019-07-05"})));
        assert!(!selector.matches(&json!({"vehicleId": "A"})));
        assert!(!selector.matches(&json!({"dateOfTrip": 20190704})));
        assert!(!selector.matches(&json!(["2019-07-04"])));
    }
}
