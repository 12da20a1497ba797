use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Reserved identifier of the master bus. Never produced from a host handle.
pub const MASTER_GUID: &str = "MASTER";

const MASTER_GUID_BRACED: &str = "{MASTER}";

/// Stable, serializable identity of a mixer channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct TrackGuid(String);

impl TrackGuid {
    pub fn new(guid: impl Into<String>) -> Self {
        Self(guid.into())
    }

    pub fn master() -> Self {
        Self(MASTER_GUID.to_owned())
    }

    /// The peer addresses the master bus either bare or braced.
    pub fn is_master(&self) -> bool {
        self.0 == MASTER_GUID || self.0 == MASTER_GUID_BRACED
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackGuid {
    fn from(guid: &str) -> Self {
        Self(guid.to_owned())
    }
}
