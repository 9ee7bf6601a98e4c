//! Fan-Out Publisher: one event, many relays, one report

use super::endpoint::RelayEndpoint;
use super::report::{DeliveryReport, FailureReason, SessionOutcome};
use super::session::{RelaySession, TimingPolicy};
use super::transport::{Transport, WebSocketTransport};
use crate::event::{encode_publish_frame, SignedEvent};
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Publishes a signed event to every endpoint concurrently.
///
/// Each endpoint gets its own task and its own connection. The publisher
/// waits for every session to conclude; a session's own timing policy is its
/// only deadline. Holds no state between calls.
pub struct FanOutPublisher<T: Transport = WebSocketTransport> {
    transport: Arc<T>,
}

impl FanOutPublisher<WebSocketTransport> {
    /// Publisher over real WebSocket connections
    pub fn websocket() -> Self {
        Self::new(WebSocketTransport::new())
    }
}

impl<T: Transport> FanOutPublisher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Share a transport with other publishers
    pub fn with_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Deliver `event` to every endpoint and report per-relay outcomes.
    ///
    /// Never fails: an empty endpoint list yields an empty report and every
    /// relay-level problem is recorded as a failure. Outcomes are reported in
    /// endpoint-input order. Dropping the returned future aborts sessions that
    /// are still in flight and discards their outcomes.
    pub async fn publish(
        &self,
        event: &SignedEvent,
        endpoints: &[RelayEndpoint],
        policy: TimingPolicy,
    ) -> DeliveryReport {
        if endpoints.is_empty() {
            tracing::info!("No relays configured; nothing to publish for {}", event.id());
            return DeliveryReport::empty(event.id());
        }

        let frame: Arc<str> = match encode_publish_frame(event) {
            Ok(frame) => Arc::from(frame),
            Err(e) => {
                // Nothing can be written, so no connection is opened.
                tracing::warn!("Event {} cannot be sent: {}", event.id(), e);
                let outcomes = endpoints
                    .iter()
                    .map(|endpoint| SessionOutcome::Failure {
                        endpoint: endpoint.clone(),
                        reason: FailureReason::Transport(format!("payload rejected: {}", e)),
                    })
                    .collect();
                return DeliveryReport::from_outcomes(event.id(), outcomes);
            }
        };

        tracing::info!(
            "📡 Publishing {} to {} relay(s)",
            event.id(),
            endpoints.len()
        );

        let handles: Vec<_> = endpoints
            .iter()
            .map(|endpoint| {
                let session = RelaySession::new(
                    Arc::clone(&self.transport),
                    endpoint.clone(),
                    Arc::clone(&frame),
                    policy,
                );
                tokio::spawn(session.run())
            })
            .collect();

        let _guard = AbortOnDrop(handles.iter().map(|h| h.abort_handle()).collect());

        let outcomes: Vec<SessionOutcome> = join_all(handles)
            .await
            .into_iter()
            .zip(endpoints)
            .map(|(joined, endpoint)| {
                joined.unwrap_or_else(|e| SessionOutcome::Failure {
                    endpoint: endpoint.clone(),
                    reason: FailureReason::Transport(format!("session task failed: {}", e)),
                })
            })
            .collect();

        let report = DeliveryReport::from_outcomes(event.id(), outcomes);
        tracing::info!("{} ({} failed)", report.summary(), report.failures().len());
        report
    }
}

/// Aborts every session task if the publish future is dropped early
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}
