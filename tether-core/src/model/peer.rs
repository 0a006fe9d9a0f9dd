use crate::model::PeerRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque peer identity. Unique per rendezvous connection.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    /// `host_1a2b3c4d` / `client_1a2b3c4d` style identity.
    pub fn generate(role: PeerRole) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", role, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
