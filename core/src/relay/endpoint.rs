//! Relay endpoints and the ordered, de-duplicated endpoint set

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Relays used when the user has not configured any
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://nostr.wine",
    "wss://relay.primal.net",
    "wss://nos.lol",
    "wss://nostr.mom",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Relay address is empty")]
    Empty,
    #[error("Invalid relay address {address}: {reason}")]
    Malformed { address: String, reason: String },
    #[error("Relay URL must start with wss:// or ws:// (got {0})")]
    UnsupportedScheme(String),
    #[error("Relay URL has no host: {0}")]
    MissingHost(String),
}

/// A single relay address.
///
/// Stored exactly as the user entered it (trimmed), so that reports echo the
/// same string back. Only the scheme and host are checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelayEndpoint(String);

impl RelayEndpoint {
    /// Parse and validate a relay address
    pub fn parse(address: &str) -> Result<Self, EndpointError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(EndpointError::Empty);
        }

        let url = Url::parse(address).map_err(|e| EndpointError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(EndpointError::MissingHost(address.to_string()));
        }

        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the connection is TLS-protected
    pub fn is_secure(&self) -> bool {
        self.0.starts_with("wss://")
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RelayEndpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RelayEndpoint> for String {
    fn from(endpoint: RelayEndpoint) -> Self {
        endpoint.0
    }
}

impl std::str::FromStr for RelayEndpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ordered set of relays with no duplicates.
///
/// This is the endpoint store the publisher reads from; the publisher itself
/// accepts any slice and does not de-duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelaySet {
    relays: Vec<RelayEndpoint>,
}

impl RelaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in public relay list
    pub fn defaults() -> Self {
        let mut set = Self::new();
        for address in DEFAULT_RELAYS {
            if let Ok(endpoint) = RelayEndpoint::parse(address) {
                set.add(endpoint);
            }
        }
        set
    }

    /// Build from raw addresses, skipping duplicates; fails on the first invalid one
    pub fn from_addresses<I, S>(addresses: I) -> Result<Self, EndpointError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for address in addresses {
            set.add(RelayEndpoint::parse(address.as_ref())?);
        }
        Ok(set)
    }

    /// Append a relay. Returns `false` if it was already present.
    pub fn add(&mut self, endpoint: RelayEndpoint) -> bool {
        if self.relays.contains(&endpoint) {
            return false;
        }
        self.relays.push(endpoint);
        true
    }

    /// Remove a relay by address. Returns `false` if it was not present.
    pub fn remove(&mut self, address: &str) -> bool {
        let before = self.relays.len();
        self.relays.retain(|r| r.as_str() != address.trim());
        self.relays.len() != before
    }

    pub fn contains(&self, address: &str) -> bool {
        self.relays.iter().any(|r| r.as_str() == address.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelayEndpoint> {
        self.relays.iter()
    }

    pub fn as_slice(&self) -> &[RelayEndpoint] {
        &self.relays
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }
}

impl<'a> IntoIterator for &'a RelaySet {
    type Item = &'a RelayEndpoint;
    type IntoIter = std::slice::Iter<'a, RelayEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.relays.iter()
    }
}
