use itertools::Itertools;
use tracing::*;

use remote_mixer_api::{Marker, Region, RegionList, TransportState};

use crate::host::{HostResultExt, MarkerInfo, SessionHost};
use crate::snapshot::SnapshotBuilder;

const PLAYING: u32 = 1;
const PAUSED: u32 = 2;
const RECORDING: u32 = 4;

impl<'a, H: SessionHost> SnapshotBuilder<'a, H> {
    pub fn transport(&self) -> TransportState {
        let play_state = self.host.play_state().or_fallback(0, "play state");
        let playing = play_state & PLAYING != 0;
        let paused = play_state & PAUSED != 0;
        let recording = play_state & RECORDING != 0;

        let position = if playing || paused || recording {
            self.host.play_position()
        } else {
            self.host.cursor_position()
        };
        let position = position.ok().filter(|position| position.is_finite()).unwrap_or(0.0);

        let (bar, beat, beat_frac) = match self.host.time_to_beats(position) {
            Ok(info) => {
                let whole = info.beats_in_measure.trunc();
                (info.measures + 1, whole as i32 + 1, info.beats_in_measure - whole)
            }
            Err(err) => {
                trace!(%err, "musical position unavailable");
                (0, 0, 0.0)
            }
        };

        let RegionList { regions,
                         markers,
                         region_name,
                         region_index, } = self.regions_at(position);

        TransportState { play_state,
                         playing,
                         paused,
                         recording,
                         position,
                         bpm: self.tempo(),
                         bar,
                         beat,
                         beat_frac,
                         region_name,
                         region_index,
                         regions,
                         markers }
    }

    /// Regions and markers as the `regions` reply carries them, located at the
    /// current transport position.
    pub fn region_list(&self) -> RegionList {
        let transport = self.transport();

        RegionList { regions:      transport.regions,
                     markers:      transport.markers,
                     region_name:  transport.region_name,
                     region_index: transport.region_index, }
    }

    fn tempo(&self) -> Option<f64> {
        self.host
            .master_tempo()
            .or_else(|_| self.host.time_map_tempo())
            .ok()
            .filter(|bpm| bpm.is_finite())
    }

    fn regions_at(&self, position: f64) -> RegionList {
        let count = self.host.marker_count().or_fallback(0, "marker count");

        let (regions, markers): (Vec<_>, Vec<_>) =
            (0..count).filter_map(|index| self.host.marker(index).ok())
                      .partition(|marker: &MarkerInfo| marker.is_region);

        let regions = regions.into_iter()
                             .map(|region| Region { index: region.index,
                                                    name:  region.name,
                                                    start: region.start,
                                                    end:   region.end, })
                             .collect_vec();

        let markers = markers.into_iter()
                             .map(|marker| Marker { index:    marker.index,
                                                    name:     marker.name,
                                                    position: marker.start, })
                             .collect_vec();

        let region_index = self.host.current_region(position).ok().flatten();
        let region_name = region_index.and_then(|index| regions.iter().find(|region| region.index == index))
                                      .map(|region| region.name.clone())
                                      .unwrap_or_default();

        RegionList { regions,
                     markers,
                     region_name,
                     region_index }
    }
}
