use serde::{Deserialize, Serialize};
use std::fs;

pub const BASE_URL_ENV: &str = "SMASHDESK_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 5_000;

/// Client-side settings: where the service lives and how eagerly to poll it.
/// Paths default to the service's stock routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_status_path")]
    pub status_path: String,
    /// Job path template; `{id}` is replaced by the job id.
    #[serde(default = "default_job_path")]
    pub job_path: String,
    #[serde(default = "default_notices_path")]
    pub notices_path: String,
    /// Directory holding the per-state status icons (`running.gif`, ...).
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_status_path() -> String {
    "/server_status".to_string()
}

fn default_job_path() -> String {
    "/status/{id}".to_string()
}

fn default_notices_path() -> String {
    "/current_notices".to_string()
}

fn default_image_dir() -> String {
    "assets/status".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_redirect_delay_ms() -> u64 {
    DEFAULT_REDIRECT_DELAY_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty config must deserialize")
    }
}

impl AppConfig {
    pub fn from_json_file(path: &str) -> Result<Self, String> {
        let text =
            fs::read_to_string(path).map_err(|e| format!("Could not read config '{path}': {e}"))?;
        let mut config: Self = serde_json::from_str(&text)
            .map_err(|e| format!("Could not parse config '{path}': {e}"))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_or_default(path: Option<&str>) -> Result<Self, String> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                Ok(config)
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            if !base.trim().is_empty() {
                self.base_url = base.trim().trim_end_matches('/').to_string();
            }
        }
    }

    pub fn server_status_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.status_path)
    }

    pub fn job_status_url(&self, job_id: &str) -> String {
        let path = self.job_path.replace("{id}", job_id);
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn notices_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.notices_path
        )
    }
}
