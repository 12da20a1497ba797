//! In-memory [`SessionHost`] used by tests and for exercising the surface
//! without a running host.
//!
//! Raw track GUIDs are pointer-shaped and change on every call, the way some
//! scripting bridges expose them. Optional capabilities can be switched off.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

use uuid::Uuid;

use crate::clock::ManualClock;
use crate::host::{
    BeatInfo, HostFault, HostResult, MarkerInfo, RouteAttribute, RouteCategory, SessionHost, TrackAttribute,
    TransportAction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockedTrackHandle(u32);

pub const MASTER_HANDLE: MockedTrackHandle = MockedTrackHandle(0);

#[derive(Debug, Clone)]
pub struct MockedTrack {
    pub uuid:             Uuid,
    pub name:             String,
    pub values:           HashMap<TrackAttribute, f64>,
    pub depth:            i32,
    pub color:            i32,
    pub fx:               Vec<MockedFx>,
    pub sends:            Vec<MockedSend>,
    /// Linear left/right.
    pub processing_peaks: (f64, f64),
    /// dB left/right.
    pub hold_peaks_db:    (f64, f64),
}

impl MockedTrack {
    pub fn new(name: &str) -> Self {
        let values = [(TrackAttribute::Volume, 1.0), (TrackAttribute::Pan, 0.0)].into_iter().collect();

        Self { uuid: Uuid::new_v4(),
               name: name.to_owned(),
               values,
               depth: 0,
               color: 0,
               fx: vec![],
               sends: vec![],
               processing_peaks: (0.0, 0.0),
               hold_peaks_db: (-150.0, -150.0) }
    }

    pub fn value(&self, attribute: TrackAttribute) -> f64 {
        self.values.get(&attribute).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MockedSend {
    pub destination: MockedTrackHandle,
    pub values:      HashMap<RouteAttribute, f64>,
}

impl MockedSend {
    pub fn value(&self, attribute: RouteAttribute) -> f64 {
        self.values.get(&attribute).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MockedFx {
    pub name:    String,
    pub enabled: bool,
    pub params:  Vec<MockedParam>,
}

impl MockedFx {
    pub fn new(name: &str) -> Self {
        Self { name:    name.to_owned(),
               enabled: true,
               params:  vec![MockedParam { name:  "Gain".to_owned(),
                                           value: 0.5,
                                           min:   -24.0,
                                           max:   24.0, }], }
    }
}

#[derive(Debug, Clone)]
pub struct MockedParam {
    pub name:  String,
    pub value: f64,
    pub min:   f64,
    pub max:   f64,
}

impl MockedParam {
    fn raw(&self) -> f64 {
        self.min + self.value * (self.max - self.min)
    }
}

#[derive(Debug)]
pub struct MockedSession {
    pub project_name:      String,
    pub project_path:      String,
    /// Offer the stable GUID conversion primitive.
    pub stable_guids:      bool,
    /// Offer processing peaks.
    pub processing_peaks:  bool,
    /// Whether instantiating an effect by name changes the chain at all.
    pub add_by_name_works: bool,
    /// Effects that can be instantiated by name.
    pub catalog:           Vec<String>,
    pub play_state:        u32,
    pub play_position:     f64,
    pub cursor_position:   f64,
    pub tempo:             Option<f64>,
    pub markers:           Vec<MarkerInfo>,
    /// Extra tracks reported by the count that no longer resolve.
    pub phantom_tracks:    usize,
    pub transport_log:     Vec<TransportAction>,
    pub shown_fx_chains:   Vec<MockedTrackHandle>,
    /// Advances the clock whenever the project name is queried.
    pub query_delay:       Option<(ManualClock, Duration)>,
    master:                MockedTrack,
    tracks:                Vec<(MockedTrackHandle, MockedTrack)>,
    next_handle:           u32,
    pointer_counter:       Cell<u64>,
    hold_clears:           Cell<usize>,
}

impl Default for MockedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockedSession {
    pub fn new() -> Self {
        Self { project_name:      "Mocked Session".to_owned(),
               project_path:      "/sessions/mocked.rpp".to_owned(),
               stable_guids:      true,
               processing_peaks:  true,
               add_by_name_works: true,
               catalog:           vec![],
               play_state:        0,
               play_position:     0.0,
               cursor_position:   0.0,
               tempo:             Some(120.0),
               markers:           vec![],
               phantom_tracks:    0,
               transport_log:     vec![],
               shown_fx_chains:   vec![],
               query_delay:       None,
               master:            MockedTrack::new("MASTER"),
               tracks:            vec![],
               next_handle:       1,
               pointer_counter:   Cell::new(0),
               hold_clears:       Cell::new(0), }
    }

    pub fn add_track(&mut self, name: &str) -> MockedTrackHandle {
        let handle = MockedTrackHandle(self.next_handle);
        self.next_handle += 1;
        self.tracks.push((handle, MockedTrack::new(name)));
        handle
    }

    /// Removes the track and every send that targets it.
    pub fn remove_track(&mut self, handle: MockedTrackHandle) {
        self.tracks.retain(|(existing, _)| *existing != handle);
        for (_, track) in &mut self.tracks {
            track.sends.retain(|send| send.destination != handle);
        }
    }

    pub fn track_data(&self, handle: MockedTrackHandle) -> Option<&MockedTrack> {
        self.get(handle).ok()
    }

    pub fn track_mut(&mut self, handle: MockedTrackHandle) -> Option<&mut MockedTrack> {
        self.get_mut(handle).ok()
    }

    pub fn add_send(&mut self, from: MockedTrackHandle, to: MockedTrackHandle) -> Option<usize> {
        let values = [(RouteAttribute::Volume, 1.0)].into_iter().collect();
        let track = self.get_mut(from).ok()?;
        track.sends.push(MockedSend { destination: to,
                                      values });
        Some(track.sends.len() - 1)
    }

    pub fn add_fx(&mut self, handle: MockedTrackHandle, name: &str) -> Option<usize> {
        let track = self.get_mut(handle).ok()?;
        track.fx.push(MockedFx::new(name));
        Some(track.fx.len() - 1)
    }

    pub fn stable_guid_of(&self, handle: MockedTrackHandle) -> Option<String> {
        self.get(handle).ok().map(|track| braced_uuid_string(&track.uuid))
    }

    /// How many peak-hold reads asked for the hold to be reset.
    pub fn hold_clears(&self) -> usize {
        self.hold_clears.get()
    }

    fn get(&self, handle: MockedTrackHandle) -> HostResult<&MockedTrack> {
        if handle == MASTER_HANDLE {
            return Ok(&self.master);
        }

        self.tracks
            .iter()
            .find(|(existing, _)| *existing == handle)
            .map(|(_, track)| track)
            .ok_or(HostFault::InvalidHandle)
    }

    fn get_mut(&mut self, handle: MockedTrackHandle) -> HostResult<&mut MockedTrack> {
        if handle == MASTER_HANDLE {
            return Ok(&mut self.master);
        }

        self.tracks
            .iter_mut()
            .find(|(existing, _)| *existing == handle)
            .map(|(_, track)| track)
            .ok_or(HostFault::InvalidHandle)
    }

    /// Receives of a track are the sends of other tracks that target it.
    fn receives_of(&self, handle: MockedTrackHandle) -> Vec<(MockedTrackHandle, usize)> {
        self.tracks
            .iter()
            .flat_map(|(source, track)| {
                track.sends
                     .iter()
                     .enumerate()
                     .filter(move |(_, send)| send.destination == handle)
                     .map(move |(index, _)| (*source, index))
            })
            .collect()
    }

    /// The owning track and send index behind a route.
    fn route(&self,
             handle: MockedTrackHandle,
             category: RouteCategory,
             index: usize)
             -> HostResult<(MockedTrackHandle, usize)> {
        let route = match category {
            RouteCategory::Send => {
                let sends = self.get(handle)
                                .map(|track| track.sends.len())
                                .unwrap_or(0);

                Some((handle, index)).filter(|_| index < sends)
            }
            RouteCategory::Receive => self.receives_of(handle).get(index).copied(),
        };

        route.ok_or_else(|| HostFault::Failed(format!("no {category:?} at index {index}")))
    }

    fn fx(&self, handle: MockedTrackHandle, fx: usize) -> HostResult<&MockedFx> {
        self.get(handle)?
            .fx
            .get(fx)
            .ok_or_else(|| HostFault::Failed(format!("no effect at index {fx}")))
    }

    fn param(&self, handle: MockedTrackHandle, fx: usize, param: usize) -> HostResult<&MockedParam> {
        self.fx(handle, fx)?
            .params
            .get(param)
            .ok_or_else(|| HostFault::Failed(format!("no parameter at index {param}")))
    }
}

fn braced_uuid_string(uuid: &Uuid) -> String {
    format!("{{{}}}", uuid.as_hyphenated().encode_upper(&mut Uuid::encode_buffer()))
}

impl SessionHost for MockedSession {
    type Track = MockedTrackHandle;

    fn project_name(&self) -> HostResult<String> {
        if let Some((clock, delay)) = &self.query_delay {
            clock.advance(*delay);
        }

        Ok(self.project_name.clone())
    }

    fn project_path(&self) -> HostResult<String> {
        Ok(self.project_path.clone())
    }

    fn master_track(&self) -> HostResult<Self::Track> {
        Ok(MASTER_HANDLE)
    }

    fn track_count(&self) -> HostResult<usize> {
        Ok(self.tracks.len() + self.phantom_tracks)
    }

    fn track(&self, index: usize) -> HostResult<Option<Self::Track>> {
        Ok(self.tracks.get(index).map(|(handle, _)| *handle))
    }

    fn track_name(&self, track: Self::Track) -> HostResult<String> {
        Ok(self.get(track)?.name.clone())
    }

    fn set_track_name(&mut self, track: Self::Track, name: &str) -> HostResult<()> {
        self.get_mut(track)?.name = name.to_owned();
        Ok(())
    }

    fn track_value(&self, track: Self::Track, attribute: TrackAttribute) -> HostResult<f64> {
        Ok(self.get(track)?.value(attribute))
    }

    fn set_track_value(&mut self, track: Self::Track, attribute: TrackAttribute, value: f64) -> HostResult<()> {
        self.get_mut(track)?.values.insert(attribute, value);
        Ok(())
    }

    fn track_depth(&self, track: Self::Track) -> HostResult<i32> {
        Ok(self.get(track)?.depth)
    }

    fn track_color(&self, track: Self::Track) -> HostResult<i32> {
        Ok(self.get(track)?.color)
    }

    fn track_guid(&self, track: Self::Track) -> HostResult<String> {
        self.get(track)?;
        let counter = self.pointer_counter.get() + 1;
        self.pointer_counter.set(counter);
        Ok(format!("(GUID*)0x{:016X}", 0x7FF0_0000_0000 + counter * 16))
    }

    fn stable_track_guid(&self, track: Self::Track) -> HostResult<String> {
        if !self.stable_guids {
            return Err(HostFault::Unsupported("stable GUID conversion"));
        }

        Ok(braced_uuid_string(&self.get(track)?.uuid))
    }

    fn track_peak_info(&self, track: Self::Track, channel: u32) -> HostResult<f64> {
        if !self.processing_peaks {
            return Err(HostFault::Unsupported("processing peaks"));
        }

        let (left, right) = self.get(track)?.processing_peaks;
        Ok(if channel == 0 { left } else { right })
    }

    fn track_ui_peak_hold_db(&self, track: Self::Track, channel: u32, clear: bool) -> HostResult<f64> {
        let (left, right) = self.get(track)?.hold_peaks_db;
        if clear {
            self.hold_clears.set(self.hold_clears.get() + 1);
        }

        Ok(if channel == 0 { left } else { right })
    }

    fn route_count(&self, track: Self::Track, category: RouteCategory) -> HostResult<usize> {
        Ok(match category {
            RouteCategory::Send => self.get(track)?.sends.len(),
            RouteCategory::Receive => self.receives_of(track).len(),
        })
    }

    fn route_partner(&self,
                     track: Self::Track,
                     category: RouteCategory,
                     index: usize)
                     -> HostResult<Option<Self::Track>> {
        let (owner, send) = self.route(track, category, index)?;
        Ok(Some(match category {
                    RouteCategory::Send => self.get(owner)?.sends[send].destination,
                    RouteCategory::Receive => owner,
                }))
    }

    fn route_value(&self,
                   track: Self::Track,
                   category: RouteCategory,
                   index: usize,
                   attribute: RouteAttribute)
                   -> HostResult<f64> {
        let (owner, send) = self.route(track, category, index)?;
        Ok(self.get(owner)?.sends[send].value(attribute))
    }

    fn set_route_value(&mut self,
                       track: Self::Track,
                       category: RouteCategory,
                       index: usize,
                       attribute: RouteAttribute,
                       value: f64)
                       -> HostResult<()> {
        let (owner, send) = self.route(track, category, index)?;
        self.get_mut(owner)?.sends[send].values.insert(attribute, value);
        Ok(())
    }

    fn fx_count(&self, track: Self::Track) -> HostResult<usize> {
        Ok(self.get(track)?.fx.len())
    }

    fn fx_name(&self, track: Self::Track, fx: usize) -> HostResult<String> {
        Ok(self.fx(track, fx)?.name.clone())
    }

    fn fx_enabled(&self, track: Self::Track, fx: usize) -> HostResult<bool> {
        Ok(self.fx(track, fx)?.enabled)
    }

    fn set_fx_enabled(&mut self, track: Self::Track, fx: usize, enabled: bool) -> HostResult<()> {
        self.fx(track, fx)?;
        self.get_mut(track)?.fx[fx].enabled = enabled;
        Ok(())
    }

    fn delete_fx(&mut self, track: Self::Track, fx: usize) -> HostResult<()> {
        self.fx(track, fx)?;
        self.get_mut(track)?.fx.remove(fx);
        Ok(())
    }

    fn copy_fx(&mut self, track: Self::Track, from: usize, to: usize, is_move: bool) -> HostResult<()> {
        let effect = self.fx(track, from)?.clone();
        let chain = &mut self.get_mut(track)?.fx;
        if is_move {
            chain.remove(from);
        }
        let to = to.min(chain.len());
        chain.insert(to, effect);
        Ok(())
    }

    fn add_fx_by_name(&mut self, track: Self::Track, name: &str) -> HostResult<i32> {
        self.get(track)?;
        if !self.add_by_name_works {
            return Ok(-1);
        }

        let Some(known) = self.catalog.iter().find(|known| known.eq_ignore_ascii_case(name)).cloned() else {
            return Ok(-1);
        };

        let chain = &mut self.get_mut(track)?.fx;
        chain.push(MockedFx::new(&known));
        Ok(chain.len() as i32 - 1)
    }

    fn show_fx_chain(&mut self, track: Self::Track) -> HostResult<()> {
        self.get(track)?;
        self.shown_fx_chains.push(track);
        Ok(())
    }

    fn fx_param_count(&self, track: Self::Track, fx: usize) -> HostResult<usize> {
        Ok(self.fx(track, fx)?.params.len())
    }

    fn fx_param_name(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<String> {
        Ok(self.param(track, fx, param)?.name.clone())
    }

    fn fx_param_normalized(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<f64> {
        Ok(self.param(track, fx, param)?.value)
    }

    fn set_fx_param_normalized(&mut self, track: Self::Track, fx: usize, param: usize, value: f64) -> HostResult<()> {
        self.param(track, fx, param)?;
        self.get_mut(track)?.fx[fx].params[param].value = value;
        Ok(())
    }

    fn fx_param_formatted(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<String> {
        Ok(format!("{:.1} dB", self.param(track, fx, param)?.raw()))
    }

    fn fx_param_raw(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<f64> {
        Ok(self.param(track, fx, param)?.raw())
    }

    fn fx_param_range(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<(f64, f64)> {
        let param = self.param(track, fx, param)?;
        Ok((param.min, param.max))
    }

    fn play_state(&self) -> HostResult<u32> {
        Ok(self.play_state)
    }

    fn play_position(&self) -> HostResult<f64> {
        Ok(self.play_position)
    }

    fn cursor_position(&self) -> HostResult<f64> {
        Ok(self.cursor_position)
    }

    fn set_edit_cursor(&mut self, position: f64, _move_view: bool, _seek_play: bool) -> HostResult<()> {
        self.cursor_position = position;
        Ok(())
    }

    fn transport(&mut self, action: TransportAction) -> HostResult<()> {
        self.play_state = match action {
            TransportAction::Play => 1,
            TransportAction::Stop => 0,
            TransportAction::Pause => self.play_state ^ 2,
            TransportAction::Record => 5,
        };
        self.transport_log.push(action);
        Ok(())
    }

    fn master_tempo(&self) -> HostResult<f64> {
        self.tempo.ok_or(HostFault::Unsupported("master tempo"))
    }

    fn set_tempo(&mut self, bpm: f64) -> HostResult<()> {
        self.tempo = Some(bpm);
        Ok(())
    }

    /// Constant tempo in 4/4.
    fn time_to_beats(&self, position: f64) -> HostResult<BeatInfo> {
        let beats = position * self.tempo.unwrap_or(120.0) / 60.0;
        let measures = (beats / 4.0).floor();

        Ok(BeatInfo { beats_in_measure: beats - measures * 4.0,
                      measures:         measures as i32, })
    }

    fn marker_count(&self) -> HostResult<usize> {
        Ok(self.markers.len())
    }

    fn marker(&self, index: usize) -> HostResult<MarkerInfo> {
        self.markers
            .get(index)
            .cloned()
            .ok_or_else(|| HostFault::Failed(format!("no marker at index {index}")))
    }

    fn current_region(&self, position: f64) -> HostResult<Option<i32>> {
        Ok(self.markers
               .iter()
               .find(|marker| marker.is_region && marker.start <= position && position < marker.end)
               .map(|marker| marker.index))
    }
}
