//! Configuration commands (config, init)

use std::path::Path;
use std::process::ExitCode;

use crate::config::{load_config, to_toml, write_default_config, ConfigError};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the config command
pub fn run_config(path: Option<&Path>) -> ExitCode {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e @ ConfigError::Validation(_)) | Err(e @ ConfigError::Parse(_)) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match to_toml(&config) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the init command
pub fn run_init(output: &Path, force: bool) -> ExitCode {
    match write_default_config(output, force) {
        Ok(()) => {
            println!("Wrote {}", output.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e @ ConfigError::Exists(_)) => {
            eprintln!("Error: {} (use --force to overwrite)", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
