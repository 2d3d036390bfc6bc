// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the settings storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for persisted settings.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the settings directory.
#[derive(Debug, Clone)]
pub struct SettingsPaths {
    root: PathBuf,
}

impl Default for SettingsPaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl SettingsPaths {
    /// Create a new SettingsPaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all settings data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory containing one JSON file per settings key.
    pub fn settings_dir(&self) -> PathBuf {
        self.root.join("settings")
    }

    /// Path to the file backing a settings key.
    pub fn setting(&self, key: &str) -> PathBuf {
        self.settings_dir().join(format!("{key}.json"))
    }

    /// File used by the storage health check.
    pub fn health_check_file(&self) -> PathBuf {
        self.root.join(".health_check")
    }
}

/// Settings keys become file names, so only a conservative alphabet is allowed.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_paths_are_under_settings_dir() {
        let paths = SettingsPaths::new("/tmp/wallet");
        assert_eq!(
            paths.setting("testaccounts"),
            PathBuf::from("/tmp/wallet/settings/testaccounts.json")
        );
        assert_eq!(paths.root(), Path::new("/tmp/wallet"));
    }

    #[test]
    fn key_validation_blocks_traversal() {
        assert!(is_valid_key("publicaccounts"));
        assert!(is_valid_key("ui-theme_v2"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("a/b"));
    }
}
