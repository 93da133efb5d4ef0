use std::error::Error;
use std::fmt;

/// Failures talking to the analysis service.
///
/// `Malformed` is kept separate from the transport variants so callers can
/// tell "server sent garbage" apart from "server unreachable".
#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
    Malformed(serde_json::Error),
}

impl Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "request failed: {e}"),
            ApiError::Status(code) => write!(f, "server returned HTTP {code}"),
            ApiError::Malformed(e) => write!(f, "malformed response body: {e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Malformed(err)
    }
}
