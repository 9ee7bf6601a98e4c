//! Per-relay outcomes and the aggregate delivery report

use super::endpoint::RelayEndpoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a relay session failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// No connection within the connect timeout
    ConnectTimeout,
    /// Refused, reset, write failure, abrupt close
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ConnectTimeout => write!(f, "connection timeout"),
            FailureReason::Transport(detail) => write!(f, "transport error: {}", detail),
        }
    }
}

/// Exactly one of these is produced per endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Success {
        endpoint: RelayEndpoint,
    },
    Failure {
        endpoint: RelayEndpoint,
        reason: FailureReason,
    },
}

impl SessionOutcome {
    pub fn endpoint(&self) -> &RelayEndpoint {
        match self {
            SessionOutcome::Success { endpoint } | SessionOutcome::Failure { endpoint, .. } => {
                endpoint
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Success { .. })
    }
}

/// A relay that did not take the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub endpoint: RelayEndpoint,
    pub reason: FailureReason,
}

/// Aggregate result of one publish call.
///
/// Failures are listed in endpoint-input order, not completion order, so two
/// runs against the same relay list print the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    event_id: String,
    total: usize,
    success_count: usize,
    succeeded: Vec<RelayEndpoint>,
    failures: Vec<RelayFailure>,
}

impl DeliveryReport {
    /// Report for a publish with no endpoints
    pub fn empty(event_id: impl Into<String>) -> Self {
        Self::from_outcomes(event_id, Vec::new())
    }

    /// Fold outcomes (already in input order) into a report
    pub fn from_outcomes(event_id: impl Into<String>, outcomes: Vec<SessionOutcome>) -> Self {
        let total = outcomes.len();
        let mut succeeded = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                SessionOutcome::Success { endpoint } => succeeded.push(endpoint),
                SessionOutcome::Failure { endpoint, reason } => {
                    failures.push(RelayFailure { endpoint, reason })
                }
            }
        }

        Self {
            event_id: event_id.into(),
            total,
            success_count: succeeded.len(),
            succeeded,
            failures,
        }
    }

    /// Id of the event that was published
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Number of endpoints attempted
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Relays the event was handed to, in input order
    pub fn succeeded(&self) -> &[RelayEndpoint] {
        &self.succeeded
    }

    pub fn failures(&self) -> &[RelayFailure] {
        &self.failures
    }

    /// Every relay took the event (vacuously true for an empty publish)
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line human summary, e.g. `Posted to 3/5 relays`
    pub fn summary(&self) -> String {
        format!("Posted to {}/{} relays", self.success_count, self.total)
    }
}
