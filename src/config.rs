//! Runtime configuration resolved once at startup.
//!
//! Values come from the process environment (after `.env` has been loaded by
//! the binary) and are passed explicitly to the components that need them.

use std::path::PathBuf;
use std::time::Duration;

use crate::soda::DEFAULT_PAUSE;

pub const APP_TOKEN_VAR: &str = "USAC_APP_TOKEN";
pub const OUTPUT_DIR_VAR: &str = "RAW_DATA_DIR";
pub const TIMEOUT_VAR: &str = "HTTP_TIMEOUT_SECS";
pub const LOG_FILE_VAR: &str = "LOG_FILE_PATH";

#[derive(Debug, Clone)]
pub struct Config {
    /// Application token sent as `X-App-Token`.
    pub app_token: Option<String>,
    /// Directory CSV exports default to.
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub pause: Duration,
    pub log_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_token: None,
            output_dir: PathBuf::from("./data/raw"),
            timeout: Duration::from_secs(30),
            pause: DEFAULT_PAUSE,
            log_file_path: PathBuf::from("logs/erate_prospector.log"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count
    /// as unset; an unparsable or zero timeout falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            app_token: get(APP_TOKEN_VAR),
            output_dir: get(OUTPUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            timeout: get(TIMEOUT_VAR)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            pause: defaults.pause,
            log_file_path: get(LOG_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file_path),
        }
    }

    /// `file_name` inside the configured output directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
