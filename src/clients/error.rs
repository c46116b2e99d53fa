use thiserror::Error;

/// Failures talking to the upstream fitness API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("upstream rejected the credentials")]
    Unauthorized,
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid upstream url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_timeout())
    }

    /// Map a non-success status and its body to the matching variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => ApiError::NotFound {
                message: extract_message(&body).unwrap_or_else(|| "not found".to_string()),
            },
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden {
                message: extract_message(&body)
                    .unwrap_or_else(|| "You do not have permission to do that.".to_string()),
            },
            _ => ApiError::Status { status, body },
        }
    }
}

// Upstream error bodies carry the reason in one of these keys.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
