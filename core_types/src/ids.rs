//! Unique identifiers for messaging participants

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a proxy
///
/// Proxies are the calling side of a service interface. They originate
/// requests and correlate responses by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyAddress(Uuid);

impl ProxyAddress {
    /// Creates a new random proxy address
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a proxy address from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProxyAddress {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proxy({})", self.0)
    }
}

/// Unique identifier for a service endpoint
///
/// Endpoints are the receiving side of a service interface. An endpoint
/// owns a listener registry and the validity state of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointAddress(Uuid);

impl EndpointAddress {
    /// Creates a new random endpoint address
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an endpoint address from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EndpointAddress {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({})", self.0)
    }
}
