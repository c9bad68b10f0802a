// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved preferences for the triplog CLI.

use serde::{Deserialize, Serialize};

/// Config key the CLI stores its preferences under.
pub const CLI_PREFS_KEY: &str = "triplog-cli";

/// Preferences persisted between CLI runs.
///
/// Missing fields fall back to their defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliPrefs {
    /// Ledger snapshot file used when `--ledger` is not given.
    pub ledger_path: String,
    /// Max log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// Header flag assumed by `recordBusesFromCSV` when omitted.
    pub default_has_header: bool,
}

impl Default for CliPrefs {
    fn default() -> Self {
        Self {
            ledger_path: "triplog-ledger.json".into(),
            log_level: "info".into(),
            default_has_header: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let prefs: CliPrefs = serde_json::from_str(r#"{"log_level":"debug"}"#).unwrap();
        assert_eq!(prefs.log_level, "debug");
        assert_eq!(prefs.ledger_path, "triplog-ledger.json");
        assert!(!prefs.default_has_header);
    }
}
