//! Username rotation list (`config/usernames.txt`).

use std::path::Path;

use tracing::warn;

use super::ConfigError;

/// Names written when the list file does not exist.
const PLACEHOLDER_NAMES: [&str; 3] = ["Username One", "Username Two", "Username Three"];

/// Ordered list of display names, one per line in the backing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsernameList {
    names: Vec<String>,
}

impl UsernameList {
    /// Parses the file contents. Blank lines are skipped and names are trimmed.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    /// Reads the list from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Reads the list, creating the file with placeholder names if absent.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_from_file(path);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, PLACEHOLDER_NAMES.join("\n") + "\n")?;
        warn!("Created default {} with placeholder names", path.display());

        Ok(Self {
            names: PLACEHOLDER_NAMES.iter().map(|&n| n.to_owned()).collect(),
        })
    }

    /// Returns the name at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Checks if the list has no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
