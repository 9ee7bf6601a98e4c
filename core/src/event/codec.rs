// Event codec: canonical id hashing and relay frame encoding

use super::types::{EventDraft, Kind, SignedEvent, Tag};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Maximum encoded publish frame: 512 KB.
/// Public relays reject larger events, so there is no point opening sockets for them.
pub const MAX_FRAME_SIZE: usize = 512 * 1024;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Encoded frame too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Event id mismatch: expected {expected}, found {found}")]
    IdMismatch { expected: String, found: String },
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// Compute the content-derived id of an event authored by `pubkey`.
///
/// The id is the lowercase hex SHA-256 of the compact JSON array
/// `[0, pubkey, created_at, kind, tags, content]`.
pub fn event_id(pubkey: &str, draft: &EventDraft) -> Result<String, EventError> {
    id_of(pubkey, draft.created_at, draft.kind, &draft.tags, &draft.content)
}

fn id_of(
    pubkey: &str,
    created_at: u64,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> Result<String, EventError> {
    let canonical = serde_json::to_string(&(0u8, pubkey, created_at, kind, tags, content))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Encode the client → relay publish frame: `["EVENT", <event>]`
pub fn encode_publish_frame(event: &SignedEvent) -> Result<String, EventError> {
    let frame = serde_json::to_string(&("EVENT", event))?;

    if frame.len() > MAX_FRAME_SIZE {
        return Err(EventError::TooLarge {
            size: frame.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    Ok(frame)
}

/// Parse a signed event from its JSON form
pub fn decode_event(json: &str) -> Result<SignedEvent, EventError> {
    if json.len() > MAX_FRAME_SIZE {
        return Err(EventError::TooLarge {
            size: json.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(serde_json::from_str(json)?)
}

impl SignedEvent {
    /// Recompute the id and check the Schnorr signature against the author key
    pub fn verify(&self) -> Result<(), EventError> {
        let expected = id_of(
            self.pubkey(),
            self.created_at(),
            self.kind(),
            self.tags(),
            self.content(),
        )?;
        if expected != self.id() {
            return Err(EventError::IdMismatch {
                expected,
                found: self.id().to_string(),
            });
        }

        let id_bytes =
            hex::decode(self.id()).map_err(|e| EventError::InvalidSignature(e.to_string()))?;
        let key_bytes =
            hex::decode(self.pubkey()).map_err(|e| EventError::InvalidSignature(e.to_string()))?;
        let sig_bytes =
            hex::decode(self.sig()).map_err(|e| EventError::InvalidSignature(e.to_string()))?;

        let verifying_key = k256::schnorr::VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| EventError::InvalidSignature(e.to_string()))?;
        let signature = k256::schnorr::Signature::try_from(sig_bytes.as_slice())
            .map_err(|e| EventError::InvalidSignature(e.to_string()))?;

        verifying_key
            .verify_raw(&id_bytes, &signature)
            .map_err(|e| EventError::InvalidSignature(e.to_string()))
    }
}
