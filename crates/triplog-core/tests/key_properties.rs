// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]
//! Property tests for composite key determinism and uniqueness.

use proptest::prelude::*;
use triplog_core::ingest::canonical_date;
use triplog_core::selector::is_canonical_date;
use triplog_core::{compose_key, CompositeKey, LedgerError, Selector};

fn component() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._/-]{1,16}"
}

fn date() -> impl Strategy<Value = String> {
    (1u32..=9999, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| canonical_date(y, m, d))
}

proptest! {
    #[test]
    fn identical_inputs_compose_identical_keys(v in component(), d in date(), t in component()) {
        prop_assert_eq!(compose_key(&v, &d, &t).unwrap(), compose_key(&v, &d, &t).unwrap());
    }

    #[test]
    fn any_differing_input_changes_the_key(
        (v1, v2) in (component(), component()),
        (d1, d2) in (date(), date()),
        (t1, t2) in (component(), component()),
    ) {
        let a = compose_key(&v1, &d1, &t1).unwrap();
        let b = compose_key(&v2, &d2, &t2).unwrap();
        let same_inputs = v1 == v2 && d1 == d2 && t1 == t2;
        prop_assert_eq!(a == b, same_inputs);
    }

    #[test]
    fn parse_recovers_components(v in component(), d in date(), t in component()) {
        let key = compose_key(&v, &d, &t).unwrap();
        let parsed = CompositeKey::parse(&key).unwrap();
        prop_assert_eq!(parsed.vehicle_id, v);
        prop_assert_eq!(parsed.date_of_trip, d);
        prop_assert_eq!(parsed.tx_token, t);
    }

    #[test]
    fn non_canonical_dates_never_build_selectors(s in "\\PC{0,12}") {
        prop_assume!(!is_canonical_date(&s));
        prop_assert!(matches!(Selector::by_trip_date(&s), Err(LedgerError::InvalidDateFormat(_))));
        let is_key_error = matches!(
            compose_key("V", &s, "tx"),
            Err(LedgerError::KeyComposition { .. })
        );
        prop_assert!(is_key_error);
    }
}
