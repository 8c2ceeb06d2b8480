//! Shared HTTP client and auth utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::CuriaError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> CuriaError {
    match status {
        401 | 403 => CuriaError::Authentication(body.to_string()),
        429 => CuriaError::RateLimited {
            retry_after_ms: retry_after_from_body(body),
        },
        _ => CuriaError::api(status, body),
    }
}

/// `error.retry_after` (seconds) from an OpenAI-style error body.
fn retry_after_from_body(body: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let seconds = value.get("error")?.get("retry_after")?.as_f64()?;
    Some((seconds * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_auth_and_rate_limit_statuses() {
        assert!(matches!(status_to_error(401, "no"), CuriaError::Authentication(_)));
        assert!(matches!(
            status_to_error(429, r#"{"error":{"retry_after":1.5}}"#),
            CuriaError::RateLimited { retry_after_ms: Some(1500) }
        ));
        assert!(matches!(
            status_to_error(500, "oops"),
            CuriaError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn bearer_headers_carry_token() {
        let headers = bearer_headers("sk-test");
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
    }
}
