use std::cell::RefCell;
use std::collections::VecDeque;

use futures::executor::block_on;
use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

/// Records every request and answers from a scripted queue (200 when empty).
#[derive(Default)]
struct FakeTransport {
    sent: RefCell<Vec<(String, serde_json::Value)>>,
    replies: RefCell<VecDeque<Result<TransportResponse, SyncError>>>,
}

impl FakeTransport {
    fn replying(replies: Vec<Result<TransportResponse, SyncError>>) -> Self {
        Self { sent: RefCell::default(), replies: RefCell::new(replies.into()) }
    }

    fn sent(&self) -> Vec<(String, serde_json::Value)> {
        self.sent.borrow().clone()
    }
}

impl Transport for FakeTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError> {
        let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        self.sent.borrow_mut().push((url.to_owned(), value));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(TransportResponse { status: 200, body: String::new() }))
    }
}

fn ok(status: u16) -> Result<TransportResponse, SyncError> {
    Ok(TransportResponse { status, body: "nope".to_owned() })
}

fn red() -> Color {
    Color::rgb(255, 0, 0)
}

fn stroke(points: Vec<PixelPoint>) -> StrokeRequest {
    StrokeRequest { tool: Tool::Brush, color: red(), size: 10, points }
}

fn client(transport: FakeTransport) -> SyncClient<FakeTransport> {
    SyncClient::new(transport, &EditorConfig::default())
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn stroke_request_wire_shape() {
    let req = StrokeRequest {
        tool: Tool::Eraser,
        color: Color::rgb(255, 255, 255),
        size: 7,
        points: vec![PixelPoint::new(10, 10), PixelPoint::new(20, 10)],
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(
        value,
        json!({ "tool": "eraser", "color": "#ffffff", "size": 7, "points": [[10, 10], [20, 10]] })
    );
}

#[test]
fn fill_request_wire_shape() {
    let req = FillRequest { color: Color::rgb(0, 255, 0), start_point: PixelPoint::new(5, 5) };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, json!({ "color": "#00ff00", "start_point": [5, 5] }));
}

#[test]
fn response_success_range() {
    assert!(TransportResponse { status: 200, body: String::new() }.is_success());
    assert!(TransportResponse { status: 204, body: String::new() }.is_success());
    assert!(!TransportResponse { status: 302, body: String::new() }.is_success());
    assert!(!TransportResponse { status: 500, body: String::new() }.is_success());
}

// =============================================================
// send_stroke
// =============================================================

#[test]
fn stroke_posts_to_stroke_endpoint() {
    let c = client(FakeTransport::default());
    let result = block_on(c.send_stroke(&stroke(vec![PixelPoint::new(1, 2)])));
    assert_eq!(result, Ok(()));
    let sent = c.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "/api/v1/tools/stroke");
    assert_eq!(sent[0].1["points"], json!([[1, 2]]));
}

#[test]
fn empty_stroke_makes_no_request() {
    let c = client(FakeTransport::default());
    assert_eq!(block_on(c.send_stroke(&stroke(Vec::new()))), Ok(()));
    assert!(c.transport().sent().is_empty());
}

#[test]
fn non_success_status_is_reported() {
    let c = client(FakeTransport::replying(vec![ok(500)]));
    let result = block_on(c.send_stroke(&stroke(vec![PixelPoint::new(1, 1)])));
    assert_eq!(result, Err(SyncError::Status { status: 500, body: "nope".to_owned() }));
}

#[test]
fn transport_error_is_reported() {
    let c = client(FakeTransport::replying(vec![Err(SyncError::Transport("offline".to_owned()))]));
    let result = block_on(c.send_stroke(&stroke(vec![PixelPoint::new(1, 1)])));
    assert_eq!(result, Err(SyncError::Transport("offline".to_owned())));
}

// =============================================================
// send_fill / submit
// =============================================================

#[test]
fn fill_posts_to_fill_endpoint() {
    let c = client(FakeTransport::default());
    let req = FillRequest { color: Color::rgb(0, 255, 0), start_point: PixelPoint::new(5, 5) };
    assert_eq!(block_on(c.send_fill(&req)), Ok(()));
    let sent = c.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "/api/v1/tools/bucket_fill");
    assert_eq!(sent[0].1["start_point"], json!([5, 5]));
}

#[test]
fn submit_dispatches_by_kind() {
    let c = client(FakeTransport::default());
    let fill = SyncOp::Fill(FillRequest { color: red(), start_point: PixelPoint::new(0, 0) });
    let strk = SyncOp::Stroke(stroke(vec![PixelPoint::new(0, 0)]));
    assert_eq!(fill.kind(), SyncKind::Fill);
    assert_eq!(strk.kind(), SyncKind::Stroke);
    block_on(c.submit(&fill)).unwrap();
    block_on(c.submit(&strk)).unwrap();
    let urls: Vec<String> = c.transport().sent().into_iter().map(|(u, _)| u).collect();
    assert_eq!(urls, vec!["/api/v1/tools/bucket_fill", "/api/v1/tools/stroke"]);
}

#[test]
fn api_base_prefixes_endpoints() {
    let config = EditorConfig { api_base: "https://paint.example/".to_owned(), ..EditorConfig::default() };
    let c = SyncClient::new(FakeTransport::default(), &config);
    block_on(c.send_stroke(&stroke(vec![PixelPoint::new(0, 0)]))).unwrap();
    assert_eq!(c.transport().sent()[0].0, "https://paint.example/api/v1/tools/stroke");
}

// =============================================================
// Failure channel
// =============================================================

#[test]
fn failures_are_published() {
    let (c, mut rx) = client(FakeTransport::replying(vec![ok(503)])).with_failure_channel();
    let req = FillRequest { color: red(), start_point: PixelPoint::new(1, 1) };
    assert!(block_on(c.send_fill(&req)).is_err());
    let failure = rx.try_recv().unwrap();
    assert_eq!(failure.kind, SyncKind::Fill);
    assert_eq!(failure.error, SyncError::Status { status: 503, body: "nope".to_owned() });
}

#[test]
fn successes_publish_nothing() {
    let (c, mut rx) = client(FakeTransport::default()).with_failure_channel();
    block_on(c.send_stroke(&stroke(vec![PixelPoint::new(1, 1)]))).unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn closed_failure_channel_does_not_break_sync() {
    let (c, rx) = client(FakeTransport::replying(vec![ok(400)])).with_failure_channel();
    drop(rx);
    let result = block_on(c.send_stroke(&stroke(vec![PixelPoint::new(1, 1)])));
    assert!(matches!(result, Err(SyncError::Status { status: 400, .. })));
}

#[test]
fn error_messages_are_readable() {
    let err = SyncError::Status { status: 500, body: "boom".to_owned() };
    assert_eq!(err.to_string(), "server returned 500: boom");
    assert_eq!(SyncError::Transport("x".to_owned()).to_string(), "request failed: x");
}
