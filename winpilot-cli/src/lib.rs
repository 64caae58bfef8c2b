//! Shared setup for the winpilot command-line tools.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use winpilot_core::config::EngineConfig;
use winpilot_core::tools::{Desktop, ToolResponse};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "WINPILOT_LOG";

/// Install the stderr fmt subscriber.  stdout is left for tool output.
///
/// `WINPILOT_LOG` wins when set; otherwise `info`, or `debug` when
/// `verbose`.  The core crate's `log` records are forwarded.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Load `--config`, or the defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> winpilot_core::Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::from_json_file(path)?;
            log::debug!("loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Build a native desktop or exit with a message on stderr.
pub fn desktop_or_exit(config_path: Option<&Path>) -> Desktop {
    let built = load_config(config_path).and_then(Desktop::native);
    match built {
        Ok(desktop) => desktop,
        Err(e) => {
            log::error!("startup failed: {e}");
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}

/// Print a response as pretty JSON on stdout and return the exit code.
pub fn emit(response: &ToolResponse) -> i32 {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: response serialization failed: {e}"),
    }
    if response.success {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("winpilot-cli-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"timings": {"inter_command": 5}}"#).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.timings.inter_command.as_millis(), 5);
        assert_eq!(config.timings.key_hold.as_millis(), 50);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_config_missing_file() {
        let missing = std::env::temp_dir().join("winpilot-cli-does-not-exist.json");
        assert!(load_config(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_emit_exit_codes() {
        assert_eq!(emit(&ToolResponse::ok("fine")), 0);
        assert_eq!(emit(&ToolResponse::failure("nope")), 1);
    }
}
