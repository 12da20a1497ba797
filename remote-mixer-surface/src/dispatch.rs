//! Applies inbound commands to the session.
//!
//! Each command re-resolves its target by identifier. A target that cannot be
//! resolved turns the command into a no-op; nothing is reported to the peer.

use tracing::*;

use remote_mixer_api::{FxList, FxParams, SurfaceCommand, SurfaceEvent, TrackGuid, TransportCommand};

use crate::host::{HostResult, HostResultExt, RouteAttribute, RouteCategory, SessionHost, TrackAttribute, TransportAction};
use crate::identity::IdentityResolver;
use crate::limits::{clamp_pan, clamp_tempo, clamp_unit, clamp_volume, record_input_selector, slot};
use crate::snapshot::{SnapshotBuilder, Stamp};

mod add_fx;

pub use add_fx::{normalize_fx_name, split_candidates};

#[cfg(test)]
mod tests;

/// Host value for "solo in place".
const SOLO_IN_PLACE: f64 = 2.0;

pub struct Dispatcher<'a, H: SessionHost> {
    host:     &'a mut H,
    identity: &'a IdentityResolver,
    stamp:    Stamp<'a>,
}

impl<'a, H: SessionHost> Dispatcher<'a, H> {
    pub fn new(host: &'a mut H, identity: &'a IdentityResolver, stamp: Stamp<'a>) -> Self {
        Self { host, identity, stamp }
    }

    /// Applies one command, returning the reply to send back, if the command has one.
    #[instrument(skip_all, fields(command = command.kind()))]
    pub fn dispatch(&mut self, command: SurfaceCommand) -> Option<SurfaceEvent> {
        match command {
            SurfaceCommand::ReqState => return Some(SurfaceEvent::State(self.snapshots().session(self.stamp))),
            SurfaceCommand::ReqRegions => return Some(SurfaceEvent::Regions(self.snapshots().region_list())),
            SurfaceCommand::Transport { action } => self.transport(action),
            SurfaceCommand::SetBpm { bpm } => {
                let bpm = clamp_tempo(bpm);
                if let Err(err) = self.host.set_tempo(bpm) {
                    debug!(%err, bpm, "could not set tempo");
                }
            }
            SurfaceCommand::GotoRegion { index } => self.goto_region(index),
            SurfaceCommand::SetVol { guid, vol } => self.with_track(&guid, |host, track| {
                                                          host.set_track_value(track, TrackAttribute::Volume, clamp_volume(vol))
                                                      }),
            SurfaceCommand::SetPan { guid, pan } => self.with_track(&guid, |host, track| {
                                                          host.set_track_value(track, TrackAttribute::Pan, clamp_pan(pan))
                                                      }),
            SurfaceCommand::SetMute { guid, mute } => self.with_track(&guid, |host, track| {
                                                            host.set_track_value(track, TrackAttribute::Mute, flag(mute))
                                                        }),
            SurfaceCommand::SetSolo { guid, solo } => self.with_track(&guid, |host, track| {
                                                            let value = if solo { SOLO_IN_PLACE } else { 0.0 };
                                                            host.set_track_value(track, TrackAttribute::Solo, value)
                                                        }),
            SurfaceCommand::SetRec { guid, rec } => self.with_track(&guid, |host, track| {
                                                          host.set_track_value(track, TrackAttribute::RecordArm, flag(rec))
                                                      }),
            SurfaceCommand::SetSendVol { guid, index, vol } => {
                self.set_route(&guid, RouteCategory::Send, index, RouteAttribute::Volume, clamp_volume(vol))
            }
            SurfaceCommand::SetSendMute { guid, index, mute } => {
                self.set_route(&guid, RouteCategory::Send, index, RouteAttribute::Mute, flag(mute))
            }
            SurfaceCommand::SetSendMode { guid, index, mode } => {
                self.set_route(&guid, RouteCategory::Send, index, RouteAttribute::Mode, mode.host_value())
            }
            SurfaceCommand::SetRecvVol { guid, index, vol } => {
                self.set_route(&guid, RouteCategory::Receive, index, RouteAttribute::Volume, clamp_volume(vol))
            }
            SurfaceCommand::SetRecvMute { guid, index, mute } => {
                self.set_route(&guid, RouteCategory::Receive, index, RouteAttribute::Mute, flag(mute))
            }
            SurfaceCommand::SetRecInput { guid, input } => self.with_track(&guid, |host, track| {
                                                                 host.set_track_value(track,
                                                                                      TrackAttribute::RecordInput,
                                                                                      record_input_selector(input))
                                                             }),
            SurfaceCommand::ShowFxChain { guid } => self.with_track(&guid, |host, track| host.show_fx_chain(track)),
            SurfaceCommand::ReqFxList { guid } => return Some(SurfaceEvent::FxList(self.fx_list(guid))),
            SurfaceCommand::SetFxEnabled { guid, index, enabled } => {
                if let Some(fx) = slot(index) {
                    self.with_track(&guid, |host, track| host.set_fx_enabled(track, fx, enabled));
                }
            }
            SurfaceCommand::SetFxAllEnabled { guid, enabled } => {
                self.with_track(&guid, |host, track| set_all_fx_enabled(host, track, enabled))
            }
            SurfaceCommand::DeleteFx { guid, index } => {
                if let Some(fx) = slot(index) {
                    self.with_track(&guid, |host, track| host.delete_fx(track, fx));
                }
            }
            SurfaceCommand::MoveFx { guid, from, to } => {
                if let (Some(from), Some(to)) = (slot(from), slot(to)) {
                    self.with_track(&guid, |host, track| host.copy_fx(track, from, to, true));
                }
            }
            SurfaceCommand::ReqFxParams { guid, fx_index } => {
                return Some(SurfaceEvent::FxParams(self.fx_params(guid, fx_index)))
            }
            SurfaceCommand::SetFxParam { guid,
                                         fx_index,
                                         param,
                                         value, } => {
                if let (Some(fx), Some(param)) = (slot(fx_index), slot(param)) {
                    self.with_track(&guid, |host, track| {
                            host.set_fx_param_normalized(track, fx, param, clamp_unit(value))
                        });
                }
            }
            SurfaceCommand::AddFx { guid, name } => return self.add_fx(guid, &name),
            SurfaceCommand::RenameTrack { guid, name } => self.rename_track(&guid, &name),
            SurfaceCommand::Unknown => trace!("ignoring unknown command"),
        }

        None
    }

    fn snapshots(&self) -> SnapshotBuilder<'_, H> {
        SnapshotBuilder::new(&*self.host, self.identity)
    }

    fn resolve(&self, guid: &TrackGuid) -> Option<H::Track> {
        let track = self.identity.resolve(&*self.host, guid);
        if track.is_none() {
            debug!(%guid, "target track not found, ignoring");
        }

        track
    }

    fn with_track<F>(&mut self, guid: &TrackGuid, apply: F)
        where F: FnOnce(&mut H, H::Track) -> HostResult<()>
    {
        let Some(track) = self.resolve(guid) else {
            return;
        };

        if let Err(err) = apply(&mut *self.host, track) {
            debug!(%guid, %err, "host rejected change");
        }
    }

    fn set_route(&mut self,
                 guid: &TrackGuid,
                 category: RouteCategory,
                 index: i64,
                 attribute: RouteAttribute,
                 value: f64) {
        let Some(index) = slot(index) else {
            debug!(%guid, index, ?category, "negative route index, ignoring");
            return;
        };

        self.with_track(guid, |host, track| host.set_route_value(track, category, index, attribute, value));
    }

    fn transport(&mut self, action: TransportCommand) {
        let action = match action {
            TransportCommand::Play => TransportAction::Play,
            TransportCommand::Stop => TransportAction::Stop,
            TransportCommand::Pause => TransportAction::Pause,
            TransportCommand::Record => TransportAction::Record,
            TransportCommand::Unknown => {
                debug!("ignoring unknown transport action");
                return;
            }
        };

        if let Err(err) = self.host.transport(action) {
            debug!(%err, ?action, "transport action failed");
        }
    }

    fn goto_region(&mut self, index: i64) {
        if index < 0 {
            return;
        }

        let count = self.host.marker_count().or_fallback(0, "marker count");
        let start = (0..count).filter_map(|position| self.host.marker(position).ok())
                              .find(|marker| marker.is_region && i64::from(marker.index) == index)
                              .map(|region| region.start);

        match start {
            Some(start) => {
                if let Err(err) = self.host.set_edit_cursor(start, true, true) {
                    debug!(%err, index, "could not move edit cursor");
                }
            }
            None => debug!(index, "no such region"),
        }
    }

    fn fx_list(&self, guid: TrackGuid) -> FxList {
        match self.resolve(&guid) {
            Some(track) => self.snapshots().fx_list(guid, track),
            None => FxList { guid, fx: vec![] },
        }
    }

    fn fx_params(&self, guid: TrackGuid, fx_index: i64) -> FxParams {
        match self.resolve(&guid) {
            Some(track) => self.snapshots().fx_params(guid, track, fx_index),
            None => FxParams { guid,
                               fx_index,
                               params: vec![] },
        }
    }

    fn rename_track(&mut self, guid: &TrackGuid, name: &str) {
        let name = name.trim();
        if name.is_empty() || guid.is_master() {
            debug!(%guid, "ignoring rename");
            return;
        }

        self.with_track(guid, |host, track| host.set_track_name(track, name));
    }
}

fn set_all_fx_enabled<H: SessionHost>(host: &mut H, track: H::Track, enabled: bool) -> HostResult<()> {
    for fx in 0..host.fx_count(track)? {
        if let Err(err) = host.set_fx_enabled(track, fx, enabled) {
            debug!(%err, fx, "could not toggle effect");
        }
    }

    Ok(())
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
