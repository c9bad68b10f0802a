// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON snapshot persistence for the CLI's in-memory ledger.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use triplog_core::MemoryLedger;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_tx: u64,
    state: BTreeMap<String, String>,
}

/// A [`MemoryLedger`] loaded from, and saved back to, one JSON file.
pub struct FileLedger {
    path: PathBuf,
    ledger: MemoryLedger,
}

impl FileLedger {
    /// Load `path`; a missing file is an empty ledger.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)
                .with_context(|| format!("corrupt ledger snapshot {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        debug!(path = %path.display(), entries = snapshot.state.len(), "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            ledger: MemoryLedger::from_entries(snapshot.next_tx, snapshot.state),
        })
    }

    /// The loaded ledger.
    pub fn ledger_mut(&mut self) -> &mut MemoryLedger {
        &mut self.ledger
    }

    /// Write the ledger back, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        let mut state = BTreeMap::new();
        for (key, value) in self.ledger.entries() {
            let text = std::str::from_utf8(value)
                .with_context(|| format!("value under {key:?} is not UTF-8"))?;
            state.insert(key.to_owned(), text.to_owned());
        }
        let snapshot = Snapshot {
            next_tx: self.ledger.next_tx(),
            state,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!(path = %self.path.display(), entries = self.ledger.len(), "ledger saved");
        Ok(())
    }
}
