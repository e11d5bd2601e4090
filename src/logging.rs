//! Logging bootstrap for the native binary.
//!
//! The engine only talks to the `log` facade. The binary routes it to stderr
//! through `flexi_logger`; the browser build routes it to the console (see
//! `crate::wasm`).

use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Level used when neither `--log-level` nor `RUST_LOG` is given.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "warn"
    }
}

/// Normalize a level name. Full `flexi_logger` specs such as
/// `heartfelt::media=trace` pass through untouched.
pub fn normalize_level(level: &str) -> Result<String, String> {
    let trimmed = level.trim();
    if trimmed.is_empty() {
        return Err("log level cannot be empty".to_string());
    }
    if trimmed.contains('=') || trimmed.contains(',') {
        return Ok(trimmed.to_string());
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "off" => Ok("off".to_string()),
        "trace" => Ok("trace".to_string()),
        "debug" => Ok("debug".to_string()),
        "info" => Ok("info".to_string()),
        "warn" | "warning" => Ok("warn".to_string()),
        "error" => Ok("error".to_string()),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}

/// Start logging to stderr. Later calls keep the first logger.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: Option<&str>) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let spec = normalize_level(level.unwrap_or(default_log_level()))?;
    let handle = Logger::try_with_env_or_str(&spec)
        .map_err(|err| format!("invalid log level `{spec}`: {err}"))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    let _ = LOGGER.set(handle);
    log::debug!("logging started at level {}", spec);
    Ok(())
}
