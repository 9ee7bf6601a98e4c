// Event types: the signed payload that gets fanned out to relays

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification code of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(pub u16);

impl Kind {
    /// Short text note
    pub const TEXT_NOTE: Kind = Kind(1);
    /// Long-form article (addressable by its `d` tag)
    pub const LONG_FORM: Kind = Kind(30023);

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tag entry: an ordered list of strings, first element is the tag name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Vec<String>);

impl Tag {
    /// Build a tag from any sequence of string-like values
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Tag name (`"d"`, `"t"`, `"title"`, ...)
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// First value after the name
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// An unsigned event, built by the application before it reaches a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub kind: Kind,
    /// Unix timestamp (seconds)
    pub created_at: u64,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl EventDraft {
    /// Create a draft stamped with the current time
    pub fn new(kind: Kind, content: impl Into<String>) -> Self {
        Self {
            kind,
            created_at: unix_now(),
            tags: Vec::new(),
            content: content.into(),
        }
    }

    /// Append a tag
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Override the creation timestamp
    pub fn with_created_at(mut self, created_at: u64) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A signed event, immutable once constructed.
///
/// Field order matches the relay wire format. Fields are private so that
/// nothing downstream of the signer can alter a payload whose id and
/// signature bind its contents; use the accessors to read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEvent {
    id: String,
    pubkey: String,
    created_at: u64,
    kind: Kind,
    tags: Vec<Tag>,
    content: String,
    sig: String,
}

impl SignedEvent {
    /// Assemble a signed event from a draft plus the signer-produced fields.
    ///
    /// Only signers should call this; see [`crate::identity::Signer`].
    pub(crate) fn from_parts(draft: EventDraft, pubkey: String, id: String, sig: String) -> Self {
        Self {
            id,
            pubkey,
            created_at: draft.created_at,
            kind: draft.kind,
            tags: draft.tags,
            content: draft.content,
            sig,
        }
    }

    /// Content-derived identifier (hex SHA-256)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Author's x-only public key (hex)
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Schnorr signature over the id (hex)
    pub fn sig(&self) -> &str {
        &self.sig
    }

    /// Find the first tag with the given name
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name() == Some(name))
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
