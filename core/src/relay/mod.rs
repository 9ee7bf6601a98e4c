//! Relay fan-out
//!
//! One signed event goes out to many independently operated relays. Each
//! relay gets its own time-bounded session; the publisher joins them all and
//! hands back a single [`DeliveryReport`]. Delivery is best-effort: a relay
//! counts as reached once the frame was written and the linger period passed
//! without a transport error.

pub mod endpoint;
pub mod publisher;
pub mod report;
pub mod session;
pub mod transport;

pub use endpoint::{EndpointError, RelayEndpoint, RelaySet, DEFAULT_RELAYS};
pub use publisher::FanOutPublisher;
pub use report::{DeliveryReport, FailureReason, RelayFailure, SessionOutcome};
pub use session::{RelaySession, TimingPolicy};
pub use transport::{Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport};
