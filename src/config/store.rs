//! File-backed configuration with last-good fallback.
//!
//! Both files are re-read whenever a command runs or a loop iterates, so
//! edits take effect without a restart. A concurrent writer may be observed
//! either before or after its write.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::warn;

use super::{BotConfig, ConfigError, UsernameList};

/// Paths of the configuration files plus the last snapshot that parsed.
#[derive(Debug)]
pub struct ConfigStore {
    config_path: PathBuf,
    usernames_path: PathBuf,
    last_good: RwLock<BotConfig>,
}

impl ConfigStore {
    /// Creates a store seeded with an already loaded configuration.
    #[must_use]
    pub fn new(
        config_path: impl Into<PathBuf>,
        usernames_path: impl Into<PathBuf>,
        initial: BotConfig,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            usernames_path: usernames_path.into(),
            last_good: RwLock::new(initial),
        }
    }

    /// Re-reads `config.json`, falling back to the last good snapshot.
    pub async fn current(&self) -> BotConfig {
        match BotConfig::load_from_file(&self.config_path) {
            Ok(config) => {
                let mut last_good = self.last_good.write().await;
                last_good.clone_from(&config);
                config
            }
            Err(e) => {
                warn!(
                    "Could not reload {}: {}. Using last good configuration.",
                    self.config_path.display(),
                    e
                );
                self.last_good.read().await.clone()
            }
        }
    }

    /// Reads the username list as it is on disk right now.
    pub fn usernames(&self) -> Result<UsernameList, ConfigError> {
        UsernameList::load_from_file(&self.usernames_path)
    }

    /// Path of the username list file.
    #[must_use]
    pub fn usernames_path(&self) -> &Path {
        &self.usernames_path
    }

    /// Path of `config.json`.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_picks_up_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = BotConfig::example();
        config.save_to_file(&path).unwrap();

        let store = ConfigStore::new(&path, dir.path().join("names.txt"), config.clone());
        config.prefix = "$".to_owned();
        config.save_to_file(&path).unwrap();

        assert_eq!(store.current().await.prefix, "$");
    }

    #[tokio::test]
    async fn test_current_falls_back_on_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = BotConfig::example();
        config.prefix = ">>".to_owned();
        config.save_to_file(&path).unwrap();

        let store = ConfigStore::new(&path, dir.path().join("names.txt"), BotConfig::fallback());
        assert_eq!(store.current().await.prefix, ">>");

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(store.current().await.prefix, ">>");
    }

    #[test]
    fn test_missing_username_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(
            dir.path().join("config.json"),
            dir.path().join("missing.txt"),
            BotConfig::fallback(),
        );
        assert!(store.usernames().is_err());
    }
}
