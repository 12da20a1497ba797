use tracing::*;

use remote_mixer_api::{FxEntry, FxList, FxParam, FxParams, TrackGuid};

use crate::host::{HostResultExt, SessionHost};
use crate::limits::clamp_unit;
use crate::snapshot::SnapshotBuilder;

impl<'a, H: SessionHost> SnapshotBuilder<'a, H> {
    pub fn fx_list(&self, guid: TrackGuid, track: H::Track) -> FxList {
        let count = self.host.fx_count(track).or_fallback(0, "fx count");

        let fx = (0..count).map(|index| FxEntry { index,
                                                  name: self.fx_name(track, index),
                                                  enabled: self.host
                                                               .fx_enabled(track, index)
                                                               .or_fallback(true, "fx enabled") })
                           .collect();

        FxList { guid, fx }
    }

    #[instrument(skip(self, track))]
    pub fn fx_params(&self, guid: TrackGuid, track: H::Track, fx_index: i64) -> FxParams {
        let params = match usize::try_from(fx_index) {
            Ok(fx) => self.params_of(track, fx),
            Err(_) => vec![],
        };

        FxParams { guid, fx_index, params }
    }

    /// Effect count and whether every effect in the chain is bypassed.
    pub(crate) fn fx_summary(&self, track: H::Track) -> (usize, bool) {
        let count = self.host.fx_count(track).or_fallback(0, "fx count");
        if count == 0 {
            return (0, false);
        }

        let mut any_enabled = false;
        for index in 0..count {
            match self.host.fx_enabled(track, index) {
                Ok(true) => {
                    any_enabled = true;
                    break;
                }
                Ok(false) => {}
                Err(err) => {
                    trace!(%err, index, "effect enabled state unavailable");
                    return (count, false);
                }
            }
        }

        (count, !any_enabled)
    }

    fn fx_name(&self, track: H::Track, index: usize) -> String {
        self.host
            .fx_name(track, index)
            .ok()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("FX {}", index + 1))
    }

    fn params_of(&self, track: H::Track, fx: usize) -> Vec<FxParam> {
        let count = self.host.fx_param_count(track, fx).or_fallback(0, "parameter count");

        (0..count).map(|index| {
                      let name = self.host
                                     .fx_param_name(track, fx, index)
                                     .ok()
                                     .map(|name| name.trim().to_owned())
                                     .filter(|name| !name.is_empty())
                                     .unwrap_or_else(|| format!("Param {}", index + 1));

                      let (min, max) = match self.host.fx_param_range(track, fx, index) {
                          Ok((min, max)) => (Some(min), Some(max)),
                          Err(_) => (None, None),
                      };

                      FxParam { index,
                                name,
                                value: clamp_unit(self.host
                                                     .fx_param_normalized(track, fx, index)
                                                     .or_fallback(0.0, "parameter value")),
                                fmt: self.host
                                         .fx_param_formatted(track, fx, index)
                                         .or_fallback(String::new(), "formatted parameter"),
                                raw: self.host.fx_param_raw(track, fx, index).ok(),
                                min,
                                max }
                  })
                  .collect()
    }
}
