//! The cooperative scheduler. The host calls [`RemoteMixerSurface::tick`]
//! from its own periodic callback; nothing here sleeps, blocks or spawns.

use std::time::{Duration, Instant};

use tracing::*;

use remote_mixer_api::{Hello, SurfaceEvent};

use crate::clock::{Clock, SystemClock};
use crate::config::SurfaceConfig;
use crate::connection::{ConnectionManager, ConnectionState, TcpTransport, Transport};
use crate::dispatch::Dispatcher;
use crate::host::SessionHost;
use crate::identity::IdentityResolver;
use crate::meters::PeakEstimator;
use crate::snapshot::{SnapshotBuilder, Stamp};


pub struct RemoteMixerSurface<H: SessionHost, T: Transport = TcpTransport, C: Clock = SystemClock> {
    host:            H,
    config:          SurfaceConfig,
    clock:           C,
    connection:      ConnectionManager<T>,
    identity:        IdentityResolver,
    meters:          PeakEstimator,
    last_state_sent: Option<Instant>,
    last_meter_sent: Option<Instant>,
}

impl<H: SessionHost> RemoteMixerSurface<H> {
    pub fn new(host: H, config: SurfaceConfig) -> Self {
        Self::with_parts(host, config, TcpTransport, SystemClock)
    }
}

impl<H: SessionHost, T: Transport, C: Clock> RemoteMixerSurface<H, T, C> {
    pub fn with_parts(host: H, config: SurfaceConfig, transport: T, clock: C) -> Self {
        let connection = ConnectionManager::new(transport,
                                                config.peer_addr(),
                                                config.connect_timeout(),
                                                config.reconnect_cooldown());

        Self { host,
               meters: PeakEstimator::new(config.peak_hold_clear()),
               config,
               clock,
               connection,
               identity: IdentityResolver::new(),
               last_state_sent: None,
               last_meter_sent: None }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// One pass of the loop: keep the link up, apply what the peer sent, then
    /// broadcast state and meters when their own intervals have elapsed.
    pub fn tick(&mut self) {
        if self.connection.advance(self.clock.now()) {
            self.on_connected();
        }

        if !self.connection.is_connected() {
            return;
        }

        self.drain_commands();

        let now = self.clock.now();
        if self.connection.is_connected() && is_due(self.last_state_sent, self.config.state_interval(), now) {
            self.last_state_sent = Some(now);
            self.broadcast_state();
        }

        let now = self.clock.now();
        if self.connection.is_connected() && is_due(self.last_meter_sent, self.config.meter_interval(), now) {
            self.last_meter_sent = Some(now);
            self.broadcast_meters(now);
        }
    }

    fn on_connected(&mut self) {
        self.last_state_sent = None;
        self.last_meter_sent = None;

        let hello = SurfaceEvent::Hello(Hello { version: self.config.protocol_version.clone(),
                                                ts:      self.clock.timestamp(), });
        self.send(&hello);
    }

    fn drain_commands(&mut self) {
        for command in self.connection.receive() {
            let stamp = Stamp { version: &self.config.protocol_version,
                                ts:      self.clock.timestamp(), };

            let reply = Dispatcher::new(&mut self.host, &self.identity, stamp).dispatch(command);

            if let Some(reply) = reply {
                // the peer closed after sending; keep applying what it sent
                if !self.connection.is_connected() {
                    trace!(kind = reply.kind(), "link closed, reply dropped");
                    continue;
                }

                if !self.send(&reply) {
                    debug!("link lost while replying, dropping remaining commands");
                    break;
                }
            }
        }
    }

    fn broadcast_state(&mut self) {
        let stamp = Stamp { version: &self.config.protocol_version,
                            ts:      self.clock.timestamp(), };

        let snapshot = SnapshotBuilder::new(&self.host, &self.identity).session(stamp);
        debug!(tracks = snapshot.tracks.len(), "broadcasting state");

        self.send(&SurfaceEvent::State(snapshot));
    }

    fn broadcast_meters(&mut self, now: Instant) {
        let stamp = Stamp { version: &self.config.protocol_version,
                            ts:      self.clock.timestamp(), };

        let snapshot = SnapshotBuilder::new(&self.host, &self.identity).meter(&mut self.meters, now, stamp);

        self.send(&SurfaceEvent::Meter(snapshot));
    }

    fn send(&mut self, event: &SurfaceEvent) -> bool {
        match self.connection.send(event) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, kind = event.kind(), "message not sent");
                false
            }
        }
    }
}

fn is_due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    match last {
        Some(last) => now.saturating_duration_since(last) >= interval,
        None => true,
    }
}
