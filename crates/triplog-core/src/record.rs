// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trip record document.

use serde::{Deserialize, Serialize};

/// One recorded vehicle trip.
///
/// Every field is an opaque string at rest, numeric-looking ones included. The
/// store is schema-less; the persisted form is the flat JSON object produced by
/// [`TripRecord::to_document`]. Records are never mutated after a write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripRecord {
    /// Bus and round identifier. Empty when the writer does not know it.
    #[serde(rename = "busAndRoundId")]
    pub bus_and_round_id: String,
    /// Vehicle identifier.
    #[serde(rename = "vehicleId")]
    pub vehicle_id: String,
    /// Canonical `YYYY-MM-DD` trip date.
    #[serde(rename = "dateOfTrip")]
    pub date_of_trip: String,
    /// Trip timestamp as supplied.
    #[serde(rename = "timestampOfTrip")]
    pub timestamp_of_trip: String,
    /// Travel distance in meters.
    #[serde(rename = "travelDistance_m")]
    pub travel_distance_m: String,
    /// Total trip time in seconds.
    #[serde(rename = "totalTime_sec")]
    pub total_time_sec: String,
}

/// JSON attribute name of the trip date; selectors match on it.
pub const DATE_OF_TRIP_FIELD: &str = "dateOfTrip";

impl TripRecord {
    /// Serialize to the persisted document bytes.
    pub fn to_document(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a persisted document.
    pub fn from_document(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_ledger_field_names() {
        let record = TripRecord {
            bus_and_round_id: "12-3".into(),
            vehicle_id: "V42".into(),
            date_of_trip: "2019-03-07".into(),
            timestamp_of_trip: "1551949200".into(),
            travel_distance_m: "10500".into(),
            total_time_sec: "1800".into(),
        };
        let doc = String::from_utf8(record.to_document().unwrap()).unwrap();
        assert_eq!(
            doc,
            r#"{"busAndRoundId":"12-3","vehicleId":"V42","dateOfTrip":"2019-03-07","timestampOfTrip":"1551949200","travelDistance_m":"10500","totalTime_sec":"1800"}"#
        );
        assert_eq!(TripRecord::from_document(doc.as_bytes()).unwrap(), record);
    }

    #[test]
    fn numeric_fields_stay_strings() {
        let doc = br#"{"busAndRoundId":"","vehicleId":"V1","dateOfTrip":"2020-01-01","timestampOfTrip":"x","travelDistance_m":"007","totalTime_sec":"1e3"}"#;
        let record = TripRecord::from_document(doc).unwrap();
        assert_eq!(record.travel_distance_m, "007");
        assert_eq!(record.total_time_sec, "1e3");
    }
}
