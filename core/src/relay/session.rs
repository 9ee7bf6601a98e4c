//! Relay Session: one delivery attempt to one relay
//!
//! connect → send one frame → linger → close, reporting exactly one
//! [`SessionOutcome`]. Every step is time-bounded, so a session can never
//! hang, and every error is turned into a `Failure` value rather than
//! propagated.

use super::endpoint::RelayEndpoint;
use super::report::{FailureReason, SessionOutcome};
use super::transport::{Connection, Transport, TransportError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// Per-session timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPolicy {
    /// Deadline for establishing the connection
    pub connect_timeout: Duration,
    /// Deadline for each of send and close on an open connection
    pub write_timeout: Duration,
    /// Grace period held open after send, before close
    pub linger: Duration,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            linger: Duration::from_secs(1),
        }
    }
}

impl TimingPolicy {
    /// Build from millisecond values (as stored in config files)
    pub fn from_millis(connect_timeout_ms: u64, write_timeout_ms: u64, linger_ms: u64) -> Self {
        Self {
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            write_timeout: Duration::from_millis(write_timeout_ms),
            linger: Duration::from_millis(linger_ms),
        }
    }

    /// Longest a single session can possibly take
    pub fn worst_case(&self) -> Duration {
        self.connect_timeout + self.write_timeout + self.linger + self.write_timeout
    }
}

/// A single delivery attempt. Consumed by [`RelaySession::run`].
pub struct RelaySession<T: Transport> {
    transport: Arc<T>,
    endpoint: RelayEndpoint,
    frame: Arc<str>,
    policy: TimingPolicy,
}

impl<T: Transport> RelaySession<T> {
    pub fn new(
        transport: Arc<T>,
        endpoint: RelayEndpoint,
        frame: Arc<str>,
        policy: TimingPolicy,
    ) -> Self {
        Self {
            transport,
            endpoint,
            frame,
            policy,
        }
    }

    pub fn endpoint(&self) -> &RelayEndpoint {
        &self.endpoint
    }

    /// Run the session to completion
    pub async fn run(self) -> SessionOutcome {
        let started = Instant::now();
        let result = self.deliver().await;
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                tracing::debug!(relay = %self.endpoint, ?elapsed, "✓ relay accepted frame");
                SessionOutcome::Success {
                    endpoint: self.endpoint,
                }
            }
            Err(reason) => {
                tracing::warn!(relay = %self.endpoint, ?elapsed, %reason, "relay delivery failed");
                SessionOutcome::Failure {
                    endpoint: self.endpoint,
                    reason,
                }
            }
        }
    }

    async fn deliver(&self) -> Result<(), FailureReason> {
        tracing::debug!(relay = %self.endpoint, "connecting");

        // Dropping the connect future on timeout releases the half-open socket.
        let mut connection =
            match timeout(self.policy.connect_timeout, self.transport.connect(&self.endpoint)).await
            {
                Err(_) => return Err(FailureReason::ConnectTimeout),
                Ok(Err(e)) => return Err(FailureReason::Transport(e.to_string())),
                Ok(Ok(connection)) => connection,
            };

        let sent = bounded(self.policy.write_timeout, "send", connection.send(&self.frame)).await;
        if let Err(e) = sent {
            // Best effort: the send error is what gets reported.
            let _ = bounded(self.policy.write_timeout, "close", connection.close()).await;
            return Err(FailureReason::Transport(e.to_string()));
        }

        // Fixed grace period; nothing is read back from the relay.
        sleep(self.policy.linger).await;

        bounded(self.policy.write_timeout, "close", connection.close())
            .await
            .map_err(|e| FailureReason::Transport(e.to_string()))
    }
}

async fn bounded<F>(limit: Duration, stage: &'static str, op: F) -> Result<(), TransportError>
where
    F: Future<Output = Result<(), TransportError>>,
{
    timeout(limit, op)
        .await
        .map_err(|_| TransportError::TimedOut(stage))?
}
