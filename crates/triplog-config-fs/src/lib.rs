// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `ConfigStore` for triplog tools (uses platform config dir).

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use triplog_app_core::config::{ConfigError, ConfigStore};

/// Store configs as JSON files under a base directory.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Create a store rooted at the user config directory (e.g., `~/.config/triplog`).
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "triplog")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::with_base(proj.config_dir())
    }

    /// Create a store rooted at `base`, creating it if needed.
    pub fn with_base(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory config files live in.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use triplog_app_core::config::ConfigService;
    use triplog_app_core::prefs::{CliPrefs, CLI_PREFS_KEY};

    #[test]
    fn prefs_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::with_base(dir.path().join("nested")).unwrap();
        assert_eq!(store.base(), dir.path().join("nested"));
        assert!(matches!(store.load_raw("absent"), Err(ConfigError::NotFound)));

        let svc = ConfigService::new(store);
        let prefs = CliPrefs {
            ledger_path: "/tmp/ledger.json".into(),
            ..CliPrefs::default()
        };
        svc.save(CLI_PREFS_KEY, &prefs).unwrap();
        assert!(dir.path().join("nested/triplog-cli.json").exists());
        assert_eq!(svc.load::<CliPrefs>(CLI_PREFS_KEY).unwrap(), Some(prefs));
    }
}
