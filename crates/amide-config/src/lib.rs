use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = ".amide";
const CONFIG_FILE: &str = "scan.toml";

/// Per-project scan settings, persisted under `.amide/scan.toml` in the
/// project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    ignored_directories: Vec<String>,
}

impl ScanConfig {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ScanConfigError> {
        let path = config_path(root);
        let contents = fs::read_to_string(&path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    /// Load the project configuration, falling back to defaults when no
    /// configuration file exists yet.
    pub fn load_or_default(root: impl AsRef<Path>) -> Result<Self, ScanConfigError> {
        match Self::load(root) {
            Ok(config) => Ok(config),
            Err(ScanConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, root: impl AsRef<Path>) -> Result<(), ScanConfigError> {
        let path = config_path(&root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Directory names that project scans should skip, in addition to the
    /// built-in skip list.
    pub fn ignored_directories(&self) -> impl Iterator<Item = &str> {
        self.ignored_directories.iter().map(|entry| entry.as_str())
    }

    pub fn add_ignored_directory(&mut self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return false;
        }
        if self
            .ignored_directories
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(name))
        {
            return false;
        }
        self.ignored_directories.push(name.to_string());
        true
    }

    fn normalize(&mut self) {
        self.ignored_directories
            .iter_mut()
            .for_each(|entry| *entry = entry.trim().to_string());
        self.ignored_directories
            .retain(|entry| !entry.is_empty());
    }
}

impl fmt::Display for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanConfig(name={:?})", self.name)
    }
}

#[derive(Debug, Error)]
pub enum ScanConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse scan configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize scan configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn config_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_or_default_without_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempdir().unwrap();
        let mut config = ScanConfig::default();
        config.name = Some("demo".to_string());
        assert!(config.add_ignored_directory("third_party"));
        config.save(dir.path()).unwrap();

        let reloaded = ScanConfig::load(dir.path()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn add_ignored_directory_rejects_duplicates_and_blanks() {
        let mut config = ScanConfig::default();
        assert!(config.add_ignored_directory("vendor"));
        assert!(!config.add_ignored_directory("Vendor"));
        assert!(!config.add_ignored_directory("   "));
        assert_eq!(config.ignored_directories().count(), 1);
    }

    #[test]
    fn loading_normalizes_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join(CONFIG_FILE),
            "ignored_directories = [\" vendor \", \"\"]\n",
        )
        .unwrap();

        let config = ScanConfig::load(dir.path()).unwrap();
        let entries: Vec<&str> = config.ignored_directories().collect();
        assert_eq!(entries, vec!["vendor"]);
    }

    #[test]
    fn malformed_file_reports_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(CONFIG_FILE), "ignored_directories = 3\n").unwrap();

        let err = ScanConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ScanConfigError::Parse(_)));
    }
}
