// Key material: secp256k1 Schnorr keys in hex and bech32 forms

use bech32::{FromBase32, ToBase32, Variant};
use k256::schnorr::SigningKey;
use thiserror::Error;
use zeroize::Zeroizing;

const NSEC_HRP: &str = "nsec";
const NPUB_HRP: &str = "npub";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key is empty")]
    Empty,
    #[error("Invalid bech32 key: {0}")]
    InvalidBech32(String),
    #[error("Expected an nsec key, found prefix {0}")]
    WrongPrefix(String),
    #[error("Invalid hex key: {0}")]
    InvalidHex(String),
    #[error("Invalid private key length: {0} bytes (expected 32)")]
    InvalidLength(usize),
    #[error("Private key is not a valid secp256k1 scalar")]
    InvalidScalar,
}

/// Raw 32-byte secret, wiped on drop
pub struct SecretKey(Zeroizing<[u8; 32]>);

impl SecretKey {
    /// Parse a secret key from `nsec1...` bech32 or 64-char hex
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KeyError::Empty);
        }

        let bytes = if input.starts_with("nsec1") {
            let (hrp, data, _variant) =
                bech32::decode(input).map_err(|e| KeyError::InvalidBech32(e.to_string()))?;
            if hrp != NSEC_HRP {
                return Err(KeyError::WrongPrefix(hrp));
            }
            Zeroizing::new(
                Vec::<u8>::from_base32(&data).map_err(|e| KeyError::InvalidBech32(e.to_string()))?,
            )
        } else {
            Zeroizing::new(hex::decode(input).map_err(|e| KeyError::InvalidHex(e.to_string()))?)
        };

        Self::from_slice(&bytes)
    }

    /// Build from raw bytes (must be exactly 32)
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self(Zeroizing::new(array)))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A usable signing identity
#[derive(Clone)]
pub struct Keys {
    signing_key: SigningKey,
}

impl Keys {
    /// Generate a new random identity
    pub fn generate() -> Self {
        use rand::RngCore;
        loop {
            let mut secret = Zeroizing::new([0u8; 32]);
            rand::rngs::OsRng.fill_bytes(&mut secret[..]);
            // Out-of-range scalars are astronomically rare; draw again if one appears.
            if let Ok(signing_key) = SigningKey::from_bytes(&secret[..]) {
                return Self { signing_key };
            }
        }
    }

    /// Build keys from parsed secret material
    pub fn from_secret(secret: &SecretKey) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_bytes(secret.as_bytes()).map_err(|_| KeyError::InvalidScalar)?;
        Ok(Self { signing_key })
    }

    /// Parse `nsec1...` or hex directly into keys
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        Self::from_secret(&SecretKey::parse(input)?)
    }

    /// x-only public key as hex (64 chars)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Public key in `npub1...` form
    pub fn npub(&self) -> String {
        let public_key = self.signing_key.verifying_key().to_bytes();
        // Encoding 32 bytes under a fixed short prefix cannot exceed bech32 limits.
        bech32::encode(NPUB_HRP, public_key.to_base32(), Variant::Bech32).unwrap_or_default()
    }

    /// Secret key as hex, wiped on drop
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Secret key in `nsec1...` form, wiped on drop
    pub fn nsec(&self) -> Zeroizing<String> {
        let secret = Zeroizing::new(self.signing_key.to_bytes().to_vec());
        Zeroizing::new(
            bech32::encode(NSEC_HRP, secret.to_base32(), Variant::Bech32).unwrap_or_default(),
        )
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
