//! Configuration loading and discovery for `heartfelt.toml`
//!
//! Provides functions to find, load, and write configuration.

use super::schema::GreetingConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE: &str = "heartfelt.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse heartfelt.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// Refused to overwrite an existing file
    #[error("Config file already exists: {}", .0.display())]
    Exists(PathBuf),
}

/// Find heartfelt.toml by walking up from the current working directory,
/// falling back to `$XDG_CONFIG_HOME/heartfelt/heartfelt.toml`
/// (or `~/.config/heartfelt/heartfelt.toml`).
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find heartfelt.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("heartfelt").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find heartfelt.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise uses
/// [`find_config`]; when nothing is found the defaults are returned.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("site/heartfelt.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<GreetingConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => {
            log::debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(GreetingConfig::default())
        }
    }
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<GreetingConfig, ConfigError> {
    let config: GreetingConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<GreetingConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Render a configuration as TOML text.
pub fn to_toml(config: &GreetingConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Write the default configuration to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::Exists(path.to_path_buf()));
    }
    let text = to_toml(&GreetingConfig::default())?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[hearts]\ncap = 10")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "").expect("should write config");

        let subdir = temp.path().join("site").join("assets");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let dir = temp.path().join("heartfelt");
        fs::create_dir_all(&dir).expect("should create config dir");
        fs::write(dir.join(CONFIG_FILE), "").expect("should write config");

        let previous = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(v) => env::set_var("XDG_CONFIG_HOME", v),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(dir.join(CONFIG_FILE)));
    }

    #[test]
    fn test_load_config_from_path() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[confetti]\ncount = 12\n").expect("should write config");

        let config = load_config(Some(&path)).expect("should load");
        assert_eq!(config.confetti.count, 12);
        assert_eq!(config.hearts.cap, 30);
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[hearts]\ncap = 0\ninitial = 0\n").expect("should write config");

        match load_config(Some(&path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("hearts.cap"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[hearts\n").expect("should write config");

        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join(CONFIG_FILE);

        write_default_config(&path, false).expect("first write");
        assert!(matches!(write_default_config(&path, false), Err(ConfigError::Exists(_))));
        write_default_config(&path, true).expect("forced write");

        let config = load_config(Some(&path)).expect("should load written defaults");
        assert_eq!(config, GreetingConfig::default());
    }
}
