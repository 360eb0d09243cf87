//! Image DTOs
//!
//! `POST /images/create` answers with a stream of JSON progress messages,
//! one per line. A failed pull still answers 200 and reports the failure in
//! an `error` message.

use serde::{Deserialize, Serialize};

/// Error detail attached to a failed progress message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// One progress message from an image pull
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullProgress {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_detail: Option<ErrorDetail>,
}

impl PullProgress {
    /// Error message carried by this progress message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| {
            self.error_detail
                .as_ref()
                .map(|d| d.message.as_str())
                .filter(|m| !m.is_empty())
        })
    }
}

/// Parses a pull progress stream, returning the last status line or the first error
///
/// Lines that are not valid JSON are ignored.
pub fn summarize_pull(body: &str) -> Result<Option<String>, String> {
    let mut last_status = None;
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Ok(progress) = serde_json::from_str::<PullProgress>(line) else {
            continue;
        };
        if let Some(err) = progress.error_message() {
            return Err(err.to_string());
        }
        if progress.status.is_some() {
            last_status = progress.status;
        }
    }
    Ok(last_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_successful_pull() {
        let body = r#"{"status":"Pulling from redis","id":"latest"}
{"status":"Pull complete","id":"a3ed95caeb02"}
{"status":"Status: Downloaded newer image for 192.168.156.200:5000/redis:latest"}
"#;
        assert_eq!(
            summarize_pull(body),
            Ok(Some(
                "Status: Downloaded newer image for 192.168.156.200:5000/redis:latest".to_string()
            ))
        );
    }

    #[test]
    fn test_summarize_failed_pull() {
        let body = r#"{"status":"Pulling repository 192.168.156.200:5000/nope"}
{"errorDetail":{"message":"manifest unknown"},"error":"manifest unknown"}
"#;
        assert_eq!(summarize_pull(body), Err("manifest unknown".to_string()));
    }

    #[test]
    fn test_error_detail_only() {
        let body = r#"{"errorDetail":{"message":"denied"}}"#;
        assert_eq!(summarize_pull(body), Err("denied".to_string()));
    }
}
