// relaypost core: signed-event fan-out
//
// Capture an article, sign it once, hand it to every configured relay at the
// same time, and tell the user which relays took it.

pub mod article;
pub mod event;
pub mod identity;
pub mod relay;

pub use article::{post_article, Article, PostError, TopicSet};
pub use event::{EventDraft, Kind, SignedEvent, Tag};
pub use identity::{IdentityManager, KeyStore, Keys, Signer, SigningError};
pub use relay::{
    DeliveryReport, FailureReason, FanOutPublisher, RelayEndpoint, RelaySet, SessionOutcome,
    TimingPolicy,
};
