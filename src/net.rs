//! Browser HTTP transport for [`crate::sync::SyncClient`].

use crate::sync::{SyncError, Transport, TransportResponse};

/// `fetch`-backed transport via `gloo-net`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError> {
        let resp = gloo_net::http::Request::post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|e| SyncError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let mut response = TransportResponse { status: resp.status(), body: String::new() };
        // The body is only interesting for error reports.
        if !response.is_success() {
            response.body = resp.text().await.unwrap_or_default();
        }
        Ok(response)
    }
}
