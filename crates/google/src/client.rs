//! Shared HTTP plumbing for the Drive and Sheets stores.
//!
//! Blocking reqwest client (no Tokio runtime required). One request per
//! call: there is no retry loop, so a failure surfaces to the engine
//! immediately and is either fatal (listing, reading) or isolated to the
//! row (move, write-back).

use std::time::Duration;

use filer_recon::StoreError;
use serde::de::DeserializeOwned;

// ── Constants ───────────────────────────────────────────────────────

pub const USER_AGENT: &str = concat!("invoice-filer/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;
const BODY_PREVIEW: usize = 200;

// ── ApiClient ───────────────────────────────────────────────────────

/// Bearer-authenticated JSON client shared by both stores.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    token: String,
    source_name: &'static str,
}

impl ApiClient {
    pub fn new(source_name: &'static str, token: String) -> Result<Self, StoreError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token,
            source_name,
        })
    }

    pub fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }

    /// Attach auth, send, classify the status, decode the JSON body.
    pub fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = req
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| StoreError::Network(format!("{} request failed: {e}", self.source_name)))?;

        let status = resp.status().as_u16();
        let text = resp.text().map_err(|e| {
            StoreError::Network(format!(
                "failed to read {} response body: {e}",
                self.source_name
            ))
        })?;

        if status >= 400 {
            let body: serde_json::Value =
                serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
            return Err(status_error(status, &extract_google_error(&body, status)));
        }

        serde_json::from_str(&text).map_err(|e| {
            StoreError::Parse(format!(
                "failed to parse {} JSON response: {} (body: {})",
                self.source_name,
                e,
                &text[..floor_char_boundary(&text, BODY_PREVIEW)],
            ))
        })
    }
}

/// Google wraps errors as `{"error": {"code": 404, "message": "..."}}`.
pub fn extract_google_error(body: &serde_json::Value, status: u16) -> String {
    body["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn status_error(status: u16, message: &str) -> StoreError {
    match status {
        401 | 403 => StoreError::Auth(message.to_string()),
        404 => StoreError::NotFound(message.to_string()),
        _ => StoreError::Http {
            status,
            message: message.to_string(),
        },
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Join `segments` onto `base` as percent-encoded path segments.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url, StoreError> {
    let mut url = url::Url::parse(base)
        .map_err(|e| StoreError::Other(format!("invalid base URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Other(format!("base URL '{base}' cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_google_message() {
        let body = serde_json::json!({
            "error": { "code": 404, "message": "File not found: abc." }
        });
        assert_eq!(extract_google_error(&body, 404), "File not found: abc.");
        assert_eq!(extract_google_error(&serde_json::Value::Null, 502), "HTTP 502");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(401, "x"), StoreError::Auth(_)));
        assert!(matches!(status_error(403, "x"), StoreError::Auth(_)));
        assert!(matches!(status_error(404, "x"), StoreError::NotFound(_)));
        assert_eq!(
            status_error(500, "backend"),
            StoreError::Http {
                status: 500,
                message: "backend".into()
            }
        );
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint("http://127.0.0.1:1/", &["v4", "spreadsheets", "id", "values", "'My Sheet'!P2"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/v4/spreadsheets/id/values/'My%20Sheet'!P2"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let s = "é".repeat(150);
        let cut = floor_char_boundary(&s, BODY_PREVIEW);
        assert!(s.is_char_boundary(cut));
        assert!(cut <= BODY_PREVIEW);
    }
}
