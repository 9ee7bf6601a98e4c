//! Fan-out publisher integration tests
//!
//! Drives the publisher against a scripted in-memory transport with tokio's
//! paused clock, so timing assertions are exact:
//! 1. Report invariants (every endpoint accounted for exactly once)
//! 2. Connect-timeout bound
//! 3. Independence of slow and fast relays
//! 4. Mid-send transport failures
//!
//! Run with: cargo test --test integration_fanout

use async_trait::async_trait;
use relaypost_core::event::{EventDraft, Kind};
use relaypost_core::identity::{Keys, Signer};
use relaypost_core::relay::{
    Connection, FailureReason, FanOutPublisher, RelayEndpoint, SessionOutcome, TimingPolicy,
    Transport, TransportError,
};
use relaypost_core::SignedEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug)]
enum Script {
    /// Connects and accepts the frame
    Accept,
    /// Connects after a delay, then accepts
    AcceptAfter(Duration),
    /// TCP never completes
    Silent,
    /// Connects, then the write fails
    DropOnSend,
}

#[derive(Default)]
struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    frames: Arc<Mutex<Vec<(String, String)>>>,
    closed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    fn with(mut self, endpoint: &RelayEndpoint, script: Script) -> Self {
        self.scripts.insert(endpoint.to_string(), script);
        self
    }
}

struct ScriptedConnection {
    endpoint: String,
    script: Script,
    frames: Arc<Mutex<Vec<(String, String)>>>,
    closed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;

    async fn connect(&self, endpoint: &RelayEndpoint) -> Result<ScriptedConnection, TransportError> {
        let script = self
            .scripts
            .get(endpoint.as_str())
            .copied()
            .unwrap_or(Script::Accept);

        match script {
            Script::Silent => futures::future::pending().await,
            Script::AcceptAfter(delay) => tokio::time::sleep(delay).await,
            Script::Accept | Script::DropOnSend => {}
        }

        Ok(ScriptedConnection {
            endpoint: endpoint.to_string(),
            script,
            frames: Arc::clone(&self.frames),
            closed: Arc::clone(&self.closed),
        })
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        if let Script::DropOnSend = self.script {
            return Err(TransportError::Send("connection reset by peer".into()));
        }
        self.frames
            .lock()
            .unwrap()
            .push((self.endpoint.clone(), frame.to_string()));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.lock().unwrap().push(self.endpoint.clone());
        Ok(())
    }
}

fn signed_event() -> SignedEvent {
    Keys::generate()
        .sign(EventDraft::new(Kind::LONG_FORM, "# Archived\n\nSome article."))
        .expect("signing with fresh keys")
}

fn relays(n: usize) -> Vec<RelayEndpoint> {
    (0..n)
        .map(|i| RelayEndpoint::parse(&format!("wss://relay{}.example", i)).unwrap())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_scenario_a_all_relays_succeed() {
    let endpoints = relays(5);
    let transport = ScriptedTransport::default();
    let frames = Arc::clone(&transport.frames);
    let publisher = FanOutPublisher::new(transport);
    let event = signed_event();

    let report = publisher
        .publish(&event, &endpoints, TimingPolicy::default())
        .await;

    assert_eq!(report.total(), 5);
    assert_eq!(report.success_count(), 5);
    assert!(report.failures().is_empty());
    assert_eq!(report.event_id(), event.id());

    // Every relay got the same single frame
    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 5);
    let expected = relaypost_core::event::encode_publish_frame(&event).unwrap();
    assert!(frames.iter().all(|(_, frame)| *frame == expected));
}

#[tokio::test(start_paused = true)]
async fn test_scenario_b_two_relays_time_out() {
    let endpoints = relays(5);
    let transport = ScriptedTransport::default()
        .with(&endpoints[1], Script::Silent)
        .with(&endpoints[3], Script::Silent);
    let publisher = FanOutPublisher::new(transport);

    let report = publisher
        .publish(&signed_event(), &endpoints, TimingPolicy::default())
        .await;

    assert_eq!(report.total(), 5);
    assert_eq!(report.success_count(), 3);
    assert_eq!(report.failures().len(), 2);
    assert!(report
        .failures()
        .iter()
        .all(|f| f.reason == FailureReason::ConnectTimeout));
    assert_eq!(report.failures()[0].endpoint, endpoints[1]);
    assert_eq!(report.failures()[1].endpoint, endpoints[3]);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_c_no_relays() {
    let publisher = FanOutPublisher::new(ScriptedTransport::default());

    let report = publisher
        .publish(&signed_event(), &[], TimingPolicy::default())
        .await;

    assert_eq!(report.total(), 0);
    assert_eq!(report.success_count(), 0);
    assert!(report.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scenario_d_error_right_after_connect() {
    let endpoints = relays(1);
    let transport = ScriptedTransport::default().with(&endpoints[0], Script::DropOnSend);
    let closed = Arc::clone(&transport.closed);
    let publisher = FanOutPublisher::new(transport);

    let report = publisher
        .publish(&signed_event(), &endpoints, TimingPolicy::default())
        .await;

    assert_eq!(report.success_count(), 0);
    assert!(report.succeeded().is_empty());
    assert_eq!(report.failures().len(), 1);
    match &report.failures()[0].reason {
        FailureReason::Transport(detail) => assert!(detail.contains("connection reset by peer")),
        other => panic!("expected transport error, got {:?}", other),
    }
    // The connection is still released
    assert_eq!(*closed.lock().unwrap(), vec![endpoints[0].to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_silent_relay_resolves_at_connect_timeout() {
    let endpoints = relays(1);
    let transport = ScriptedTransport::default().with(&endpoints[0], Script::Silent);
    let publisher = FanOutPublisher::new(transport);
    let policy = TimingPolicy {
        connect_timeout: Duration::from_millis(750),
        ..TimingPolicy::default()
    };
    let started = Instant::now();

    let report = publisher.publish(&signed_event(), &endpoints, policy).await;

    assert_eq!(report.failures()[0].reason, FailureReason::ConnectTimeout);
    assert_eq!(started.elapsed(), Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn test_slow_relay_does_not_delay_fast_relay() {
    let endpoints = relays(2);
    let transport = ScriptedTransport::default().with(&endpoints[0], Script::Silent);
    let frames = Arc::clone(&transport.frames);
    let publisher = FanOutPublisher::new(transport);
    let policy = TimingPolicy::default();
    let started = Instant::now();

    let report = publisher.publish(&signed_event(), &endpoints, policy).await;

    // Bounded by the silent relay's own timeout, not timeout + linger
    assert_eq!(started.elapsed(), policy.connect_timeout);
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.succeeded(), &[endpoints[1].clone()]);
    assert_eq!(frames.lock().unwrap()[0].0, endpoints[1].to_string());
}

#[tokio::test(start_paused = true)]
async fn test_staggered_relays_finish_with_the_slowest() {
    let endpoints = relays(3);
    let transport = ScriptedTransport::default()
        .with(&endpoints[0], Script::AcceptAfter(Duration::from_secs(4)))
        .with(&endpoints[1], Script::AcceptAfter(Duration::from_secs(2)));
    let publisher = FanOutPublisher::new(transport);
    let started = Instant::now();

    let report = publisher
        .publish(&signed_event(), &endpoints, TimingPolicy::default())
        .await;

    assert_eq!(report.success_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_repeat_publish_gives_independent_reports() {
    let endpoints = relays(3);
    let transport = ScriptedTransport::default().with(&endpoints[2], Script::Silent);
    let publisher = FanOutPublisher::new(transport);
    let event = signed_event();

    let first = publisher
        .publish(&event, &endpoints, TimingPolicy::default())
        .await;
    let second = publisher
        .publish(&event, &endpoints, TimingPolicy::default())
        .await;

    assert_eq!(first, second);
    assert_eq!(first.total(), 3);
    assert_eq!(second.success_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_publishes_do_not_share_state() {
    let endpoints = relays(4);
    let transport = ScriptedTransport::default().with(&endpoints[0], Script::DropOnSend);
    let publisher = FanOutPublisher::new(transport);
    let a = signed_event();
    let b = signed_event();

    let (report_a, report_b) = tokio::join!(
        publisher.publish(&a, &endpoints, TimingPolicy::default()),
        publisher.publish(&b, &endpoints[1..], TimingPolicy::default()),
    );

    assert_eq!(report_a.event_id(), a.id());
    assert_eq!(report_a.total(), 4);
    assert_eq!(report_a.success_count(), 3);
    assert_eq!(report_b.event_id(), b.id());
    assert_eq!(report_b.total(), 3);
    assert_eq!(report_b.success_count(), 3);
}

#[test]
fn test_invariant_holds_for_random_mixes() {
    use proptest::prelude::*;
    use proptest::test_runner::TestRunner;

    let mut runner = TestRunner::default();
    runner
        .run(
            &proptest::collection::vec(0u8..3, 0..12),
            |scripts| {
                let endpoints = relays(scripts.len());
                let mut transport = ScriptedTransport::default();
                for (endpoint, script) in endpoints.iter().zip(&scripts) {
                    let script = match script {
                        0 => Script::Accept,
                        1 => Script::Silent,
                        _ => Script::DropOnSend,
                    };
                    transport = transport.with(endpoint, script);
                }
                let publisher = FanOutPublisher::new(transport);
                let event = signed_event();

                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .start_paused(true)
                    .build()
                    .unwrap();
                let report = runtime.block_on(publisher.publish(
                    &event,
                    &endpoints,
                    TimingPolicy::default(),
                ));

                prop_assert_eq!(
                    report.success_count() + report.failures().len(),
                    endpoints.len()
                );
                prop_assert_eq!(
                    report.success_count(),
                    scripts.iter().filter(|s| **s == 0).count()
                );
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_outcome_helpers() {
    let endpoint = RelayEndpoint::parse("wss://relay.example").unwrap();
    let ok = SessionOutcome::Success {
        endpoint: endpoint.clone(),
    };
    let failed = SessionOutcome::Failure {
        endpoint: endpoint.clone(),
        reason: FailureReason::ConnectTimeout,
    };

    assert!(ok.is_success());
    assert!(!failed.is_success());
    assert_eq!(failed.endpoint(), &endpoint);
}
