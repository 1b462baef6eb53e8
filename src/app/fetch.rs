// AuditSleuth - app/fetch.rs
//
// Fetching the audit trail from the LIS REST endpoint.
// Single-shot, blocking, no retry: a failed load surfaces one
// human-readable message (FetchError::user_message) and the user decides
// whether to run again.
//
// Credentials are passed in explicitly by the caller; nothing here reads
// tokens from the environment or any ambient store, and tokens are never
// logged.

use crate::core::loader;
use crate::core::model::RawLogRecord;
use crate::util::error::{AuditSleuthError, FetchError};
use std::time::Duration;

/// Fetch and decode the event payload from `url`.
///
/// `bearer_token`, when present, is sent as an Authorization header.
/// Non-success statuses become `FetchError::Status` so the caller can map
/// them to the fixed user-facing messages.
pub fn fetch_events(
    url: &str,
    bearer_token: Option<&str>,
    timeout: Duration,
) -> Result<Vec<RawLogRecord>, AuditSleuthError> {
    let body = fetch_body(url, bearer_token, timeout)?;
    let records = loader::parse_payload(&body)?;
    Ok(records)
}

/// Perform the HTTP GET and return the response body.
fn fetch_body(
    url: &str,
    bearer_token: Option<&str>,
    timeout: Duration,
) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("AuditSleuth/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::ClientBuild { source: e })?;

    let mut request = client.get(url).header("Accept", "application/json");
    if let Some(token) = bearer_token {
        request = request.bearer_auth(token);
    }

    tracing::debug!(url, "Requesting event payload");

    let response = request.send().map_err(|e| FetchError::Transport {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url, status = status.as_u16(), "Endpoint answered with an error status");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().map_err(|e| FetchError::Body {
        url: url.to_string(),
        source: e,
    })?;

    tracing::debug!(url, bytes = body.len(), "Event payload received");
    Ok(body)
}
