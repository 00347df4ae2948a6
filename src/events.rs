//! Audit events and the sinks that receive them.
//!
//! One [`AuditEvent`] is published per request, after the response is final.
//! Publishing is fire-and-forget: [`EventSink::publish`] returns nothing and
//! the audit filter never waits on or inspects what a sink does with it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::method::Method;
use crate::request::Request;

/// What was asked.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RequestSummary {
    method: Method,
    path: String,
}

impl RequestSummary {
    pub fn of(req: &Request) -> Self {
        Self { method: req.method().clone(), path: req.path().to_owned() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
}

/// What was answered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ResponseSummary {
    status: u16,
}

impl ResponseSummary {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn status(&self) -> u16 { self.status }
}

/// One audited request/response pair. Immutable once built.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AuditEvent {
    timestamp: DateTime<Utc>,
    request: RequestSummary,
    response: ResponseSummary,
}

impl AuditEvent {
    pub fn new(timestamp: DateTime<Utc>, request: RequestSummary, response: ResponseSummary) -> Self {
        Self { timestamp, request, response }
    }

    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn request(&self) -> &RequestSummary { &self.request }
    pub fn response(&self) -> ResponseSummary { self.response }
}

/// Receives audit events. Must tolerate concurrent calls.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: AuditEvent);
}

impl<F> EventSink for F
where
    F: Fn(AuditEvent) + Send + Sync,
{
    fn publish(&self, event: AuditEvent) {
        self(event)
    }
}

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Writes each event as a structured `tracing` event on target `gatehouse::audit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: AuditEvent) {
        info!(
            target: "gatehouse::audit",
            timestamp = %event.timestamp.to_rfc3339(),
            method = %event.request.method,
            path = %event.request.path,
            status = event.response.status,
            "request audited"
        );
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: AuditEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

/// Forwards events to a bounded channel without ever waiting.
///
/// When the channel is full or its receiver is gone the event is dropped
/// and counted; the request is never held up.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<AuditEvent>,
    dropped: AtomicU64,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, dropped: AtomicU64::new(0) }, rx)
    }

    /// Events discarded because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: AuditEvent) {
        if self.tx.try_send(event).is_err() {
            let n = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(dropped = n, "audit channel unavailable, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event(status: u16) -> AuditEvent {
        AuditEvent::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            RequestSummary::of(&Request::get("/internal/health?verbose=1")),
            ResponseSummary::new(status),
        )
    }

    #[test]
    fn summary_drops_query_string() {
        assert_eq!(event(200).request().path(), "/internal/health");
    }

    #[test]
    fn serializes_as_flat_json() {
        let json = serde_json::to_value(event(200)).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["request"]["method"], "GET");
        assert_eq!(json["response"]["status"], 200);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.publish(event(200));
        sink.publish(event(404));
        let statuses: Vec<u16> = sink.events().iter().map(|e| e.response().status()).collect();
        assert_eq!(statuses, vec![200, 404]);
    }

    #[tokio::test]
    async fn channel_sink_drops_when_full() {
        let (sink, mut rx) = ChannelSink::new(1);
        sink.publish(event(200));
        sink.publish(event(201));
        assert_eq!(sink.dropped(), 1);
        assert_eq!(rx.recv().await.unwrap().response().status(), 200);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(0);
        let sink = |_e: AuditEvent| *seen.lock().unwrap() += 1;
        sink.publish(event(200));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
