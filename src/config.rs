//! Host configuration: defaults, file loading, and validation.

// Layer 1: Standard library imports
use std::path::{Path, PathBuf};

// Layer 2: Third-party crate imports
use config::{Config, File};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::error::ConfigError;

/// Default `code_directory`, relative to the configuration file's own
/// directory.
pub const DEFAULT_CODE_DIRECTORY: &str = "./";

/// Default TCP port the HostManager listens on.
pub const DEFAULT_OPS_PORT: u16 = 4999;

/// Host configuration, read once at startup (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Root of the actor-code tree, resolved relative to the config file's
    /// directory.
    #[serde(default = "default_code_directory")]
    pub code_directory: PathBuf,

    /// TCP port on which the HostManager listens for `remove_actor`
    /// notifications.
    #[serde(default = "default_ops_port")]
    pub ops_port: u16,

    /// Endpoint string advertised to every actor so it can reach the
    /// Directory. The host itself never dials it.
    #[serde(default)]
    pub directory_port: String,
}

fn default_code_directory() -> PathBuf {
    PathBuf::from(DEFAULT_CODE_DIRECTORY)
}

fn default_ops_port() -> u16 {
    DEFAULT_OPS_PORT
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            code_directory: default_code_directory(),
            ops_port: default_ops_port(),
            directory_port: String::new(),
        }
    }
}

impl HostConfig {
    /// Load configuration from `path`, merging YAML/JSON/TOML over the
    /// built-in defaults. Unknown keys are ignored (spec §6).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let builder = Config::builder()
            .set_default("code_directory", DEFAULT_CODE_DIRECTORY)
            .map_err(ConfigError::Parse)?
            .set_default("ops_port", DEFAULT_OPS_PORT as i64)
            .map_err(ConfigError::Parse)?
            .set_default("directory_port", "")
            .map_err(ConfigError::Parse)?
            .add_source(File::from(path).required(true));

        let raw = builder.build().map_err(ConfigError::Parse)?;
        raw.try_deserialize().map_err(ConfigError::Parse)
    }

    /// Directory containing the configuration file — the host's working
    /// directory for the remainder of its lifetime (spec §4.7).
    pub fn config_dir(path: &Path) -> PathBuf {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve `code_directory` against an already-applied working
    /// directory change, returning an absolute-enough path for the loader.
    pub fn resolved_code_directory(&self) -> &Path {
        &self.code_directory
    }

    /// Sanity-check the loaded configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.ops_port == 0 {
            return Err("ops_port must be non-zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec() {
        let config = HostConfig::default();
        assert_eq!(config.code_directory, PathBuf::from("./"));
        assert_eq!(config.ops_port, 4999);
        assert_eq!(config.directory_port, "");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = HostConfig::load(Path::new("/nonexistent/actor_host.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_merges_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("actor_host.yaml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(file, "ops_port: 6000").expect("write config");
        writeln!(file, "directory_port: \"127.0.0.1:7000\"").expect("write config");

        let config = HostConfig::load(&path).expect("load config");
        assert_eq!(config.ops_port, 6000);
        assert_eq!(config.directory_port, "127.0.0.1:7000");
        assert_eq!(config.code_directory, PathBuf::from("./"));
    }

    #[test]
    fn load_ignores_unknown_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("actor_host.yaml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(file, "ops_port: 5050").expect("write config");
        writeln!(file, "some_future_key: true").expect("write config");

        let config = HostConfig::load(&path).expect("load config");
        assert_eq!(config.ops_port, 5050);
    }

    #[test]
    fn validate_rejects_zero_ops_port() {
        let mut config = HostConfig::default();
        config.ops_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_dir_returns_parent() {
        let path = Path::new("/etc/actor_host/actor_host.yaml");
        assert_eq!(HostConfig::config_dir(path), PathBuf::from("/etc/actor_host"));
    }
}
