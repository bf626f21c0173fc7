//! Stroke and fill submission to the raster server.
//!
//! The server owns every layer's pixels. A finished stroke or a bucket press
//! becomes one JSON `POST`; the server rasterizes it into whichever layer is
//! active on its side, and the client then reloads that layer's image.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is soft. A non-2xx status or a transport error is logged,
//! published as a [`SyncFailure`] on the optional failure channel, and
//! returned to the caller, which still proceeds to invalidate the layer.
//! Nothing here panics or blocks input handling.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::EditorConfig;
use crate::mapper::PixelPoint;
use crate::tool::Tool;

/// Body of `POST /api/v1/tools/stroke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRequest {
    pub tool: Tool,
    pub color: Color,
    pub size: u32,
    pub points: Vec<PixelPoint>,
}

/// Body of `POST /api/v1/tools/bucket_fill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRequest {
    pub color: Color,
    pub start_point: PixelPoint,
}

/// One pending server operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOp {
    Stroke(StrokeRequest),
    Fill(FillRequest),
}

impl SyncOp {
    #[must_use]
    pub fn kind(&self) -> SyncKind {
        match self {
            Self::Stroke(_) => SyncKind::Stroke,
            Self::Fill(_) => SyncKind::Fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Stroke,
    Fill,
}

impl SyncKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Stroke => "stroke",
            Self::Fill => "fill",
        }
    }
}

/// Error returned by [`SyncClient`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never produced a response (network down, CORS, aborted).
    #[error("request failed: {0}")]
    Transport(String),
    /// The payload could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

/// A soft failure, published for hosts that want to surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub kind: SyncKind,
    pub error: SyncError,
}

/// Raw HTTP response as seen by the sync client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP seam: sends a JSON body with `POST`.
///
/// The browser implementation is [`crate::net::GlooTransport`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if no response was received.
    async fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError>;
}

/// Client for the stroke and fill endpoints.
pub struct SyncClient<T> {
    transport: T,
    stroke_url: String,
    fill_url: String,
    failures: Option<UnboundedSender<SyncFailure>>,
}

impl<T: Transport> SyncClient<T> {
    #[must_use]
    pub fn new(transport: T, config: &EditorConfig) -> Self {
        Self {
            transport,
            stroke_url: config.stroke_url(),
            fill_url: config.fill_url(),
            failures: None,
        }
    }

    /// Attach a failure channel and return its receiving end.
    #[must_use]
    pub fn with_failure_channel(mut self) -> (Self, UnboundedReceiver<SyncFailure>) {
        let (tx, rx) = unbounded();
        self.failures = Some(tx);
        (self, rx)
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a finished stroke. An empty point list resolves immediately
    /// without a request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on encode, transport, or non-2xx failure. The
    /// failure has already been logged and published when this returns.
    pub async fn send_stroke(&self, request: &StrokeRequest) -> Result<(), SyncError> {
        if request.points.is_empty() {
            log::debug!("skipping empty stroke");
            return Ok(());
        }
        let result = self.post(&self.stroke_url, request).await;
        self.report(SyncKind::Stroke, result)
    }

    /// Submit a bucket fill.
    ///
    /// # Errors
    ///
    /// Same policy as [`SyncClient::send_stroke`].
    pub async fn send_fill(&self, request: &FillRequest) -> Result<(), SyncError> {
        let result = self.post(&self.fill_url, request).await;
        self.report(SyncKind::Fill, result)
    }

    /// Submit either kind of operation.
    ///
    /// # Errors
    ///
    /// Same policy as [`SyncClient::send_stroke`].
    pub async fn submit(&self, op: &SyncOp) -> Result<(), SyncError> {
        match op {
            SyncOp::Stroke(request) => self.send_stroke(request).await,
            SyncOp::Fill(request) => self.send_fill(request).await,
        }
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<(), SyncError> {
        let json = serde_json::to_string(body).map_err(|e| SyncError::Encode(e.to_string()))?;
        let response = self.transport.post_json(url, json).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(SyncError::Status { status: response.status, body: response.body })
        }
    }

    fn report(&self, kind: SyncKind, result: Result<(), SyncError>) -> Result<(), SyncError> {
        let Err(error) = result else {
            log::debug!("{} synced", kind.name());
            return Ok(());
        };
        log::warn!("{} failed: {error}", kind.name());
        if let Some(tx) = &self.failures {
            if tx.unbounded_send(SyncFailure { kind, error: error.clone() }).is_err() {
                log::debug!("failure channel closed");
            }
        }
        Err(error)
    }
}
