//! Maps native track handles to the only identifier the rest of the surface
//! stores or compares, and back.

use std::cell::Cell;

use tracing::*;

use remote_mixer_api::TrackGuid;

use crate::host::{HostResultExt, SessionHost};

#[cfg(test)]
mod tests;

/// True for strings like `(MediaTrack*)0x0000021A3F` or `0x1F00A0C8`, which
/// some hosts hand out in place of a real identity and which change over time.
pub fn looks_like_pointer(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if value.starts_with('(') && value.contains(')') && value.contains("0x") {
        return true;
    }

    value.starts_with("0x") && value.len() > 6
}

pub fn is_braced_guid(value: &str) -> bool {
    value.len() > 2 && value.starts_with('{') && value.ends_with('}')
}

#[derive(Debug, Default)]
pub struct IdentityResolver {
    degraded_reported: Cell<bool>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_master<H: SessionHost>(&self, host: &H, track: H::Track) -> bool {
        host.master_track().map(|master| master == track).unwrap_or(false)
    }

    pub fn identifier_of<H: SessionHost>(&self, host: &H, track: H::Track) -> TrackGuid {
        if self.is_master(host, track) {
            return TrackGuid::master();
        }

        if let Ok(stable) = host.stable_track_guid(track) {
            let stable = stable.trim();
            if is_braced_guid(stable) {
                return TrackGuid::new(stable);
            }
        }

        match host.track_guid(track) {
            Ok(raw) => {
                let raw = raw.trim();
                if looks_like_pointer(raw) {
                    self.report_degraded(raw);
                }
                TrackGuid::new(raw)
            }
            Err(err) => {
                debug!(%err, ?track, "host has no GUID for track, using handle");
                TrackGuid::new(format!("{track:?}"))
            }
        }
    }

    /// Linear scan of the current track list. Never fails; a missing or
    /// unreadable track list resolves nothing.
    pub fn resolve<H: SessionHost>(&self, host: &H, guid: &TrackGuid) -> Option<H::Track> {
        if guid.is_empty() {
            return None;
        }

        if guid.is_master() {
            return host.master_track().ok();
        }

        let count = host.track_count().or_fallback(0, "track count");

        (0..count).filter_map(|index| host.track(index).ok().flatten())
                  .find(|track| self.identifier_of(host, *track) == *guid)
    }

    fn report_degraded(&self, raw: &str) {
        if !self.degraded_reported.replace(true) {
            warn!(raw,
                  "host only provides pointer-shaped track identities; peer may see identifiers change");
        }
    }
}
