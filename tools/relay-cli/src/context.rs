//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use relay_sdk::relay_core::RelayConfig;

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["relay.toml", ".relay.toml", "relay.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Relay configuration.
    pub config: RelayConfig,
    /// Where the configuration came from, if a file was used.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (RelayConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some(path) => {
                    let config = RelayConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (RelayConfig::default(), None),
            },
        };

        if let Some(path) = &config_path {
            output.debug(&format!("Using config: {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }
}

/// Find a config file in the directory tree, walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".relay.toml"), "").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(".relay.toml"));
    }

    #[test]
    fn test_find_config_prefers_relay_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("relay.json"), "{}").unwrap();
        std::fs::write(dir.path().join("relay.toml"), "").unwrap();

        let found = find_config(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("relay.toml"));
    }

    #[test]
    fn test_nearest_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("child");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("relay.toml"), "").unwrap();
        std::fs::write(nested.join("relay.json"), "{}").unwrap();

        assert_eq!(find_config(&nested).unwrap(), nested.join("relay.json"));
    }
}
