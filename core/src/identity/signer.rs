// Signer: turns an unsigned draft into an immutable signed event

use super::keys::Keys;
use crate::event::{codec, EventDraft, SignedEvent};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
    #[error("Failed to compute event id: {0}")]
    Digest(String),
    #[error("Signature failed: {0}")]
    Signature(String),
}

/// Anything that can sign an event draft.
///
/// The publisher never calls this; it only ever receives the result.
#[cfg_attr(test, mockall::automock)]
pub trait Signer: Send + Sync {
    /// Author public key (hex) this signer signs as
    fn public_key_hex(&self) -> String;

    /// Populate the author, id, and signature of a draft
    fn sign(&self, draft: EventDraft) -> Result<SignedEvent, SigningError>;
}

impl Signer for Keys {
    fn public_key_hex(&self) -> String {
        Keys::public_key_hex(self)
    }

    fn sign(&self, draft: EventDraft) -> Result<SignedEvent, SigningError> {
        use rand::RngCore;

        let pubkey = Keys::public_key_hex(self);
        let id = codec::event_id(&pubkey, &draft).map_err(|e| SigningError::Digest(e.to_string()))?;
        let id_bytes = hex::decode(&id).map_err(|e| SigningError::Digest(e.to_string()))?;

        let mut aux_rand = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut aux_rand);

        let signature = self
            .signing_key()
            .sign_raw(&id_bytes, &aux_rand)
            .map_err(|e| SigningError::Signature(e.to_string()))?;

        tracing::debug!("✍️ Signed event {} as {}", id, pubkey);
        Ok(SignedEvent::from_parts(
            draft,
            pubkey,
            id,
            hex::encode(signature.to_bytes()),
        ))
    }
}

/// Sign with a raw secret key string (`nsec1...` or hex).
///
/// Invalid key material surfaces as [`SigningError::InvalidKey`].
pub fn sign_with_secret(secret: &str, draft: EventDraft) -> Result<SignedEvent, SigningError> {
    let keys = Keys::parse(secret).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    keys.sign(draft)
}
