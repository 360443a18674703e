/// Error type for gateway requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("api base url is not configured")]
    BaseUrlMissing,
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("could not read response: {message}")]
    Read { message: String },
    #[error("{detail} (HTTP {status})")]
    Http { status: u16, detail: String },
    #[error("unexpected response: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Build an HTTP error from a non-success response body.
    ///
    /// The API reports failures as `{"detail": "..."}`; a body in that
    /// shape contributes only its detail text.
    pub fn from_status(status: u16, body: &[u8]) -> ApiError {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let detail = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| match v.get("detail") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) if !other.is_null() => Some(other.to_string()),
                _ => None,
            })
            .unwrap_or(text);
        let detail = if detail.is_empty() {
            "Request failed".to_string()
        } else {
            detail
        };
        ApiError::Http { status, detail }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }
}
