//! Adding an effect by name, with fallback candidates and duplication of an
//! existing instance when the host cannot instantiate by name.

use tracing::*;

use remote_mixer_api::{SurfaceEvent, TrackGuid};

use crate::dispatch::Dispatcher;
use crate::host::SessionHost;

const CANDIDATE_SEPARATOR: &str = "||";

/// Plugin format tags hosts put in front of effect names.
const FORMAT_PREFIXES: &[&str] = &["jsfx:", "js:", "vst3i:", "vst3:", "vsti:", "vst:", "aui:", "au:", "clapi:",
                                   "clap:", "lv2i:", "lv2:", "dxi:", "dx:"];

pub fn split_candidates(names: &str) -> Vec<&str> {
    names.split(CANDIDATE_SEPARATOR)
         .map(str::trim)
         .filter(|name| !name.is_empty())
         .collect()
}

/// Lowercased effect name without its format tag.
pub fn normalize_fx_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();

    match FORMAT_PREFIXES.iter().find_map(|prefix| lowered.strip_prefix(prefix)) {
        Some(rest) => rest.trim().to_owned(),
        None => lowered,
    }
}

fn names_match(wanted: &str, existing: &str) -> bool {
    !existing.is_empty() && (wanted.contains(existing) || existing.contains(wanted))
}

impl<'a, H: SessionHost> Dispatcher<'a, H> {
    pub(super) fn add_fx(&mut self, guid: TrackGuid, names: &str) -> Option<SurfaceEvent> {
        if names.trim().is_empty() {
            debug!(%guid, "no effect name given");
            return None;
        }

        let track = self.resolve(&guid)?;

        for candidate in split_candidates(names) {
            if self.instantiate(track, candidate) {
                info!(%guid, candidate, "added effect");
                break;
            }
            debug!(%guid, candidate, "could not add effect");
        }

        Some(SurfaceEvent::FxList(self.snapshots().fx_list(guid, track)))
    }

    /// True once the chain grew.
    fn instantiate(&mut self, track: H::Track, candidate: &str) -> bool {
        let before = self.host.fx_count(track).ok();

        let index = match self.host.add_fx_by_name(track, candidate) {
            Ok(index) => index,
            Err(err) => {
                debug!(%err, candidate, "add by name failed");
                -1
            }
        };

        let Some(before) = before else {
            return index >= 0;
        };

        if self.grew(track, before) {
            return true;
        }

        self.duplicate_existing(track, candidate, before) && self.grew(track, before)
    }

    fn grew(&self, track: H::Track, before: usize) -> bool {
        self.host.fx_count(track).map(|after| after > before).unwrap_or(false)
    }

    /// Copies the first effect whose name matches `candidate` to the end of the chain.
    fn duplicate_existing(&mut self, track: H::Track, candidate: &str, end: usize) -> bool {
        let wanted = normalize_fx_name(candidate);
        if wanted.is_empty() {
            return false;
        }

        let source = (0..end).find(|index| {
                                 self.host
                                     .fx_name(track, *index)
                                     .map(|name| names_match(&wanted, &normalize_fx_name(&name)))
                                     .unwrap_or(false)
                             });

        match source {
            Some(source) => match self.host.copy_fx(track, source, end, false) {
                Ok(()) => {
                    debug!(candidate, source, "duplicated existing effect");
                    true
                }
                Err(err) => {
                    debug!(%err, candidate, source, "could not duplicate effect");
                    false
                }
            },
            None => false,
        }
    }
}
