//! Builds the documents broadcast to the peer from fresh host reads.
//!
//! Every field is queried on its own and substituted with a default when the
//! host cannot answer, so one bad query never costs the whole snapshot.

use std::time::Instant;

use tracing::*;

use remote_mixer_api::{
    MeterFrame, MeterSnapshot, ReceiveState, SendState, SessionSnapshot, TrackGuid, TrackKind, TrackState,
};

use crate::host::{HostResultExt, RouteAttribute, RouteCategory, SessionHost, TrackAttribute};
use crate::identity::IdentityResolver;
use crate::limits::{clamp_pan, clamp_volume};
use crate::meters::PeakEstimator;

mod fx;
mod transport;


/// Drops the "custom color set" flag above the RGB bytes.
const NATIVE_COLOR_MASK: i32 = 0xFF_FFFF;

const UNTITLED_PROJECT: &str = "Untitled";
const UNNAMED_TRACK: &str = "Track";

/// Version and timestamp stamped onto outbound documents.
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    pub version: &'a str,
    pub ts:      f64,
}

pub struct SnapshotBuilder<'a, H: SessionHost> {
    host:     &'a H,
    identity: &'a IdentityResolver,
}

impl<'a, H: SessionHost> SnapshotBuilder<'a, H> {
    pub fn new(host: &'a H, identity: &'a IdentityResolver) -> Self {
        Self { host, identity }
    }

    #[instrument(skip_all)]
    pub fn session(&self, stamp: Stamp) -> SessionSnapshot {
        let master = self.host.master_track().ok().map(|master| self.master_state(master));

        let tracks = self.tracks()
                         .into_iter()
                         .map(|(position, track)| self.track_state(track, position))
                         .collect();

        let project_name = self.host
                               .project_name()
                               .ok()
                               .map(|name| name.trim().to_owned())
                               .filter(|name| !name.is_empty())
                               .unwrap_or_else(|| UNTITLED_PROJECT.to_owned());

        SessionSnapshot { master,
                          tracks,
                          project_name,
                          project_path: self.host.project_path().or_fallback(String::new(), "project path"),
                          transport: self.transport(),
                          ts: stamp.ts,
                          version: stamp.version.to_owned() }
    }

    pub fn meter(&self, estimator: &mut PeakEstimator, now: Instant, stamp: Stamp) -> MeterSnapshot {
        let master = self.host.master_track().ok();
        let frames = master.into_iter()
                           .chain(self.tracks().into_iter().map(|(_, track)| track))
                           .map(|track| {
                               let peaks = estimator.peaks_of(self.host, track, now);
                               MeterFrame { guid:  self.identity.identifier_of(self.host, track),
                                            left:  peaks.left,
                                            right: peaks.right, }
                           })
                           .collect::<Vec<_>>();

        trace!(frames = frames.len(), "meter snapshot");

        MeterSnapshot { frames,
                        ts: stamp.ts,
                        version: stamp.version.to_owned() }
    }

    /// Current tracks with their 1-based display position. Indices that no
    /// longer resolve are skipped.
    pub fn tracks(&self) -> Vec<(usize, H::Track)> {
        let count = self.host.track_count().or_fallback(0, "track count");

        (0..count).filter_map(|index| match self.host.track(index) {
                      Ok(Some(track)) => Some((index + 1, track)),
                      _ => None,
                  })
                  .collect()
    }

    pub fn master_state(&self, master: H::Track) -> TrackState {
        let (fx_count, fx_all_off) = self.fx_summary(master);

        TrackState { kind: TrackKind::Master,
                     guid: TrackGuid::master(),
                     id: "0".to_owned(),
                     idx: 0,
                     name: "MASTER".to_owned(),
                     vol: clamp_volume(self.value(master, TrackAttribute::Volume, 1.0)),
                     pan: 0.0,
                     mute: self.flag(master, TrackAttribute::Mute),
                     solo: false,
                     rec: false,
                     rec_input: None,
                     fx_count,
                     fx_all_off,
                     send_slots: vec![],
                     recv_slots: vec![],
                     send_details: vec![],
                     recv_details: vec![],
                     folder_depth: 0,
                     folder_compact: None,
                     indent: 0,
                     color: self.color(master) }
    }

    pub fn track_state(&self, track: H::Track, position: usize) -> TrackState {
        let (fx_count, fx_all_off) = self.fx_summary(track);
        let send_details = self.sends(track);
        let recv_details = self.receives(track);

        TrackState { kind: TrackKind::Track,
                     guid: self.identity.identifier_of(self.host, track),
                     id: position.to_string(),
                     idx: position,
                     name: self.track_name(track),
                     vol: clamp_volume(self.value(track, TrackAttribute::Volume, 1.0)),
                     pan: clamp_pan(self.value(track, TrackAttribute::Pan, 0.0)),
                     mute: self.flag(track, TrackAttribute::Mute),
                     solo: self.flag(track, TrackAttribute::Solo),
                     rec: self.flag(track, TrackAttribute::RecordArm),
                     rec_input: Some(self.value(track, TrackAttribute::RecordInput, 0.0) as i32),
                     fx_count,
                     fx_all_off,
                     send_slots: send_details.iter().map(|send| send.dest_name.clone()).collect(),
                     recv_slots: recv_details.iter().map(|recv| recv.src_name.clone()).collect(),
                     send_details,
                     recv_details,
                     folder_depth: self.value(track, TrackAttribute::FolderDepth, 0.0) as i32,
                     folder_compact: Some(self.value(track, TrackAttribute::FolderCompact, 0.0) as i32),
                     indent: self.host.track_depth(track).or_fallback(0, "track depth"),
                     color: self.color(track) }
    }

    fn track_name(&self, track: H::Track) -> String {
        self.host
            .track_name(track)
            .ok()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNNAMED_TRACK.to_owned())
    }

    fn value(&self, track: H::Track, attribute: TrackAttribute, fallback: f64) -> f64 {
        match self.host.track_value(track, attribute) {
            Ok(value) if value.is_finite() => value,
            Ok(_) => fallback,
            Err(err) => {
                trace!(%err, ?attribute, "track value unavailable, using fallback");
                fallback
            }
        }
    }

    fn flag(&self, track: H::Track, attribute: TrackAttribute) -> bool {
        self.value(track, attribute, 0.0) as i64 != 0
    }

    fn sends(&self, track: H::Track) -> Vec<SendState> {
        let count = self.host.route_count(track, RouteCategory::Send).or_fallback(0, "send count");

        (0..count).map(|index| {
                      let (dest_guid, dest_name) = self.partner(track, RouteCategory::Send, index);
                      let (src_chan, dst_chan) = self.route_channels(track, RouteCategory::Send, index);

                      SendState { index,
                                  dest_guid,
                                  dest_name,
                                  vol: self.route_volume(track, RouteCategory::Send, index),
                                  mute: self.route_value(track, RouteCategory::Send, index, RouteAttribute::Mute, 0.0)
                                        != 0.0,
                                  mode: self.route_value(track, RouteCategory::Send, index, RouteAttribute::Mode, 0.0)
                                        as i32,
                                  src_chan,
                                  dst_chan,
                                  src_ch: channel_pair_label(src_chan),
                                  dst_ch: channel_pair_label(dst_chan) }
                  })
                  .collect()
    }

    fn receives(&self, track: H::Track) -> Vec<ReceiveState> {
        let count = self.host.route_count(track, RouteCategory::Receive).or_fallback(0, "receive count");

        (0..count).map(|index| {
                      let (src_guid, src_name) = self.partner(track, RouteCategory::Receive, index);
                      let (src_chan, dst_chan) = self.route_channels(track, RouteCategory::Receive, index);

                      ReceiveState { index,
                                     src_guid,
                                     src_name,
                                     vol: self.route_volume(track, RouteCategory::Receive, index),
                                     mute: self.route_value(track,
                                                            RouteCategory::Receive,
                                                            index,
                                                            RouteAttribute::Mute,
                                                            0.0)
                                           != 0.0,
                                     mode: self.route_value(track,
                                                            RouteCategory::Receive,
                                                            index,
                                                            RouteAttribute::Mode,
                                                            0.0) as i32,
                                     src_chan,
                                     dst_chan,
                                     src_ch: channel_pair_label(src_chan),
                                     dst_ch: channel_pair_label(dst_chan) }
                  })
                  .collect()
    }

    /// Identifier and name of the other end of a route; an unknown partner
    /// gets an empty identifier and a positional name.
    fn partner(&self, track: H::Track, category: RouteCategory, index: usize) -> (TrackGuid, String) {
        match self.host.route_partner(track, category, index) {
            Ok(Some(partner)) => (self.identity.identifier_of(self.host, partner), self.track_name(partner)),
            _ => {
                let name = match category {
                    RouteCategory::Send => format!("Send {}", index + 1),
                    RouteCategory::Receive => format!("Return {}", index + 1),
                };
                (TrackGuid::default(), name)
            }
        }
    }

    fn route_value(&self,
                   track: H::Track,
                   category: RouteCategory,
                   index: usize,
                   attribute: RouteAttribute,
                   fallback: f64)
                   -> f64 {
        self.host
            .route_value(track, category, index, attribute)
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(fallback)
    }

    fn route_volume(&self, track: H::Track, category: RouteCategory, index: usize) -> f64 {
        clamp_volume(self.route_value(track, category, index, RouteAttribute::Volume, 1.0))
    }

    fn route_channels(&self, track: H::Track, category: RouteCategory, index: usize) -> (i32, i32) {
        (self.route_value(track, category, index, RouteAttribute::SourceChannel, 0.0) as i32,
         self.route_value(track, category, index, RouteAttribute::DestinationChannel, 0.0) as i32)
    }

    fn color(&self, track: H::Track) -> Option<String> {
        let native = self.host
                         .track_color(track)
                         .ok()
                         .filter(|native| *native != 0)
                         .or_else(|| {
                             self.host
                                 .track_value(track, TrackAttribute::CustomColor)
                                 .ok()
                                 .map(|custom| custom as i32 & NATIVE_COLOR_MASK)
                                 .filter(|native| *native != 0)
                         })?;

        let (r, g, b) = self.host.color_to_rgb(native).unwrap_or_else(|_| native_to_rgb(native));

        Some(format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

/// Byte order of a native color: red in the low byte.
pub fn native_to_rgb(native: i32) -> (u8, u8, u8) {
    ((native & 0xFF) as u8, ((native >> 8) & 0xFF) as u8, ((native >> 16) & 0xFF) as u8)
}

/// Label of a stereo pair starting at a 0-based channel offset, e.g. `1-2`.
pub fn channel_pair_label(offset: i32) -> String {
    let offset = offset.max(0);
    format!("{}-{}", offset + 1, offset + 2)
}
