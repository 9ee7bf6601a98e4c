// Posting flow: draft → sign → fan out

use super::draft::Article;
use super::topics::TopicSet;
use crate::event::{encode_publish_frame, unix_now, EventError};
use crate::identity::{Signer, SigningError};
use crate::relay::{DeliveryReport, FanOutPublisher, RelayEndpoint, TimingPolicy, Transport};
use thiserror::Error;

/// Errors that stop a post before any relay is contacted
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),
    #[error("Event cannot be sent: {0}")]
    Encoding(#[from] EventError),
}

/// Sign `article` as a long-form event and publish it to `endpoints`.
///
/// Once the event is signed and encodable, the result is always a report;
/// relay failures are data inside it.
pub async fn post_article<S, T>(
    article: &Article,
    topics: &TopicSet,
    signer: &S,
    publisher: &FanOutPublisher<T>,
    endpoints: &[RelayEndpoint],
    policy: TimingPolicy,
) -> Result<DeliveryReport, PostError>
where
    S: Signer + ?Sized,
    T: Transport,
{
    let draft = article.to_draft(topics, unix_now());
    let event = signer.sign(draft)?;

    // Surface oversize events as an error instead of N identical relay failures.
    encode_publish_frame(&event)?;

    tracing::info!("📰 Posting \"{}\" as event {}", article.title(), event.id());
    Ok(publisher.publish(&event, endpoints, policy).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Keys, MockSigner};
    use crate::relay::{Connection, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingTransport {
        connects: Arc<AtomicUsize>,
    }

    struct NoopConnection;

    #[async_trait]
    impl Transport for CountingTransport {
        type Connection = NoopConnection;

        async fn connect(&self, _endpoint: &RelayEndpoint) -> Result<NoopConnection, TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(NoopConnection)
        }
    }

    #[async_trait]
    impl Connection for NoopConnection {
        async fn send(&mut self, _frame: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn relays() -> Vec<RelayEndpoint> {
        vec![
            RelayEndpoint::parse("wss://a.example").unwrap(),
            RelayEndpoint::parse("wss://b.example").unwrap(),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_signing_error_stops_before_network() {
        let mut signer = MockSigner::new();
        signer
            .expect_sign()
            .times(1)
            .returning(|_| Err(SigningError::InvalidKey("bad".into())));

        let transport = CountingTransport::default();
        let connects = Arc::clone(&transport.connects);
        let publisher = FanOutPublisher::new(transport);
        let article = Article::new("https://example.com/a", "A", "body").unwrap();

        let result = post_article(
            &article,
            &TopicSet::defaults(),
            &signer,
            &publisher,
            &relays(),
            TimingPolicy::default(),
        )
        .await;

        assert!(matches!(result, Err(PostError::Signing(_))));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_reaches_every_relay() {
        let keys = Keys::generate();
        let transport = CountingTransport::default();
        let connects = Arc::clone(&transport.connects);
        let publisher = FanOutPublisher::new(transport);
        let article = Article::new("https://example.com/a", "A", "body")
            .unwrap()
            .with_byline("Ada");

        let report = post_article(
            &article,
            &TopicSet::defaults(),
            &keys,
            &publisher,
            &relays(),
            TimingPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.event_id().len(), 64);
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_article_is_an_error() {
        let keys = Keys::generate();
        let publisher = FanOutPublisher::new(CountingTransport::default());
        let article = Article::new(
            "https://example.com/a",
            "A",
            "x".repeat(crate::event::MAX_FRAME_SIZE),
        )
        .unwrap();

        let result = post_article(
            &article,
            &TopicSet::new(),
            &keys,
            &publisher,
            &relays(),
            TimingPolicy::default(),
        )
        .await;

        assert!(matches!(result, Err(PostError::Encoding(EventError::TooLarge { .. }))));
    }
}
