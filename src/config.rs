// Port Schedule Monitor - Settings
// Built-in defaults, optionally overridden by Settings.toml and env vars

use crate::error::ConfigError;
use crate::pipeline::DEFAULT_PINNED_LINE;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_VAR_PREFIX: &str = "PORT_SCHEDULE_";
pub const SETTINGS_FILE: &str = "Settings.toml";

pub const SCHEDULE_URL: &str = "https://yellow-truth-54a3.rladudrnr03.workers.dev/";
pub const ROSTER_URL: &str = "https://script.google.com/macros/s/AKfycbx5DMnZQDDeqHFA5vRvKC-XvmXbN7mxBsx5O2S_uET9RikN0CM_tIumFg3Ht5PBbHwgpQ/exec";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Vessel schedule endpoint (JSON array)
    pub schedule_url: String,
    /// Daily roster endpoint (JSON object)
    pub roster_url: String,
    /// Line listed first and selected on load
    pub pinned_line: String,
    /// Web server listen address
    pub bind_addr: String,
    /// Log file for the terminal dashboard
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schedule_url: SCHEDULE_URL.to_string(),
            roster_url: ROSTER_URL.to_string(),
            pinned_line: DEFAULT_PINNED_LINE.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            log_file: "port-schedule.log".to_string(),
        }
    }
}

fn figment() -> Figment {
    Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(SETTINGS_FILE))
        .merge(Env::prefixed(ENV_VAR_PREFIX))
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    Ok(figment().extract::<Settings>()?)
}
