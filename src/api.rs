//! Typed client for the analysis service's JSON endpoints.
//!
//! The service exposes three read-only endpoints: overall server/queue
//! status, per-job status, and current notices. Responses are decoded into
//! explicit structs here; a body that does not match the expected shape
//! fails with [`ApiError::Malformed`] instead of leaking half-parsed data.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Snapshot of the whole service: worker state plus queue counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerStatus {
    pub status: String,
    pub queue_length: u64,
    pub running: u64,
}

/// One job as reported by the status endpoint.
///
/// `status` is free text (may span multiple lines); `short_status` is the
/// machine-readable tag. The server only includes `result_url` once it
/// considers the job done, so it is optional here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatus {
    pub short_status: String,
    pub status: String,
    pub last_changed: String,
    #[serde(default)]
    pub result_url: Option<String>,
}

impl JobStatus {
    pub fn short(&self) -> ShortStatus {
        ShortStatus::classify(&self.short_status)
    }

    /// Icon file name for this job's current state, e.g. `running.gif`.
    /// Uses the raw server tag so unknown states map to their own icon.
    pub fn icon_file(&self) -> String {
        format!("{}.gif", self.short_status)
    }
}

/// Coarse machine-readable job state, classified from the server's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortStatus {
    Pending,
    Running,
    Done,
    Failed,
    Other,
}

impl ShortStatus {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "done" => Self::Done,
            "failed" => Self::Failed,
            _ => Self::Other,
        }
    }

    /// A terminal job never leaves its state; polling it further is useless.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// A server-pushed banner message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub category: String,
    pub teaser: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct NoticeList {
    notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { http }
    }

    pub fn server_status(&self, url: &str) -> Result<ServerStatus, ApiError> {
        self.get_json(url)
    }

    pub fn job_status(&self, url: &str) -> Result<JobStatus, ApiError> {
        self.get_json(url)
    }

    pub fn notices(&self, url: &str) -> Result<Vec<Notice>, ApiError> {
        let list: NoticeList = self.get_json(url)?;
        Ok(list.notices)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        // Decode from the full body text so shape errors surface as
        // Malformed rather than as a transport error.
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
