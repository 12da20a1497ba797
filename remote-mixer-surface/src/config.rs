use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use remote_mixer_api::PROTOCOL_VERSION;

pub const DEFAULT_PEER_PORT: u16 = 7071;
pub const DEFAULT_STATE_INTERVAL_MS: u64 = 250;
pub const DEFAULT_METER_INTERVAL_MS: u64 = 20;
pub const DEFAULT_RECONNECT_COOLDOWN_MS: u64 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_PEAK_HOLD_CLEAR_MS: u64 = 120;

/// Static settings of the surface. Every field has a default, so an embedding
/// host can deserialize a partial document or use [`SurfaceConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub peer_host:             IpAddr,
    pub peer_port:             u16,
    pub state_interval_ms:     u64,
    pub meter_interval_ms:     u64,
    pub reconnect_cooldown_ms: u64,
    pub connect_timeout_ms:    u64,
    /// Minimum time between resets of the host's UI peak-hold.
    pub peak_hold_clear_ms:    u64,
    pub protocol_version:      String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { peer_host:             IpAddr::V4(Ipv4Addr::LOCALHOST),
               peer_port:             DEFAULT_PEER_PORT,
               state_interval_ms:     DEFAULT_STATE_INTERVAL_MS,
               meter_interval_ms:     DEFAULT_METER_INTERVAL_MS,
               reconnect_cooldown_ms: DEFAULT_RECONNECT_COOLDOWN_MS,
               connect_timeout_ms:    DEFAULT_CONNECT_TIMEOUT_MS,
               peak_hold_clear_ms:    DEFAULT_PEAK_HOLD_CLEAR_MS,
               protocol_version:      PROTOCOL_VERSION.to_owned(), }
    }
}

impl SurfaceConfig {
    pub fn peer_addr(&self) -> SocketAddr {
        SocketAddr::new(self.peer_host, self.peer_port)
    }

    pub fn state_interval(&self) -> Duration {
        Duration::from_millis(self.state_interval_ms)
    }

    pub fn meter_interval(&self) -> Duration {
        Duration::from_millis(self.meter_interval_ms)
    }

    pub fn reconnect_cooldown(&self) -> Duration {
        Duration::from_millis(self.reconnect_cooldown_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn peak_hold_clear(&self) -> Duration {
        Duration::from_millis(self.peak_hold_clear_ms)
    }
}
