//! The port through which the surface reads and mutates the live session.
//!
//! Every call returns a [`HostResult`]. Optional host capabilities have default
//! implementations that report [`HostFault::Unsupported`], so an adapter only
//! implements what its host actually provides.

use std::fmt::Debug;

use thiserror::Error;
use tracing::*;

pub mod mocked;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostFault {
    #[error("host does not provide {0}")]
    Unsupported(&'static str),
    #[error("handle is no longer valid")]
    InvalidHandle,
    #[error("host call failed: {0}")]
    Failed(String),
}

pub type HostResult<T> = Result<T, HostFault>;

/// Substitutes a documented default for a failed host query.
pub trait HostResultExt<T> {
    fn or_fallback(self, fallback: T, field: &'static str) -> T;
}

impl<T> HostResultExt<T> for HostResult<T> {
    fn or_fallback(self, fallback: T, field: &'static str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                trace!(%err, field, "host query failed, using fallback");
                fallback
            }
        }
    }
}

/// Numeric per-track attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackAttribute {
    Volume,
    Pan,
    Mute,
    Solo,
    RecordArm,
    RecordInput,
    FolderDepth,
    FolderCompact,
    /// Native color with the "custom color set" flag in bit 24.
    CustomColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    Send,
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteAttribute {
    Volume,
    Mute,
    Mode,
    SourceChannel,
    DestinationChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportAction {
    Play,
    Stop,
    Pause,
    Record,
}

/// A project marker or region as enumerated by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerInfo {
    pub is_region: bool,
    pub start:     f64,
    pub end:       f64,
    pub name:      String,
    /// User-visible marker number, not the enumeration position.
    pub index:     i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatInfo {
    /// Beats since the start of the measure, with fraction.
    pub beats_in_measure: f64,
    /// 0-based measure number.
    pub measures:         i32,
}

pub trait SessionHost {
    /// Native channel handle. Only valid for the current tick.
    type Track: Copy + PartialEq + Debug;

    fn project_name(&self) -> HostResult<String>;

    fn project_path(&self) -> HostResult<String>;

    fn master_track(&self) -> HostResult<Self::Track>;

    fn track_count(&self) -> HostResult<usize>;

    /// `Ok(None)` when the index is no longer populated.
    fn track(&self, index: usize) -> HostResult<Option<Self::Track>>;

    fn track_name(&self, track: Self::Track) -> HostResult<String>;

    fn set_track_name(&mut self, track: Self::Track, name: &str) -> HostResult<()>;

    fn track_value(&self, track: Self::Track, attribute: TrackAttribute) -> HostResult<f64>;

    fn set_track_value(&mut self, track: Self::Track, attribute: TrackAttribute, value: f64) -> HostResult<()>;

    fn track_depth(&self, _track: Self::Track) -> HostResult<i32> {
        Err(HostFault::Unsupported("track depth"))
    }

    fn track_color(&self, _track: Self::Track) -> HostResult<i32> {
        Err(HostFault::Unsupported("track color"))
    }

    fn color_to_rgb(&self, _native: i32) -> HostResult<(u8, u8, u8)> {
        Err(HostFault::Unsupported("native color conversion"))
    }

    /// The host's own identity string for the track. May be pointer-shaped and
    /// differ between calls for the same track.
    fn track_guid(&self, track: Self::Track) -> HostResult<String>;

    /// Braced GUID string that is stable for the lifetime of the track.
    fn stable_track_guid(&self, _track: Self::Track) -> HostResult<String> {
        Err(HostFault::Unsupported("stable GUID conversion"))
    }

    /// Linear post-processing peak for `channel`.
    fn track_peak_info(&self, _track: Self::Track, _channel: u32) -> HostResult<f64> {
        Err(HostFault::Unsupported("processing peaks"))
    }

    /// UI peak-hold in dB, optionally resetting the hold.
    fn track_ui_peak_hold_db(&self, track: Self::Track, channel: u32, clear: bool) -> HostResult<f64>;

    fn route_count(&self, track: Self::Track, category: RouteCategory) -> HostResult<usize>;

    /// The destination of a send or the source of a receive.
    fn route_partner(&self,
                     track: Self::Track,
                     category: RouteCategory,
                     index: usize)
                     -> HostResult<Option<Self::Track>>;

    fn route_value(&self,
                   track: Self::Track,
                   category: RouteCategory,
                   index: usize,
                   attribute: RouteAttribute)
                   -> HostResult<f64>;

    fn set_route_value(&mut self,
                       track: Self::Track,
                       category: RouteCategory,
                       index: usize,
                       attribute: RouteAttribute,
                       value: f64)
                       -> HostResult<()>;

    fn fx_count(&self, track: Self::Track) -> HostResult<usize>;

    fn fx_name(&self, track: Self::Track, fx: usize) -> HostResult<String>;

    fn fx_enabled(&self, _track: Self::Track, _fx: usize) -> HostResult<bool> {
        Err(HostFault::Unsupported("effect enabled state"))
    }

    fn set_fx_enabled(&mut self, track: Self::Track, fx: usize, enabled: bool) -> HostResult<()>;

    fn delete_fx(&mut self, track: Self::Track, fx: usize) -> HostResult<()>;

    /// Copies (or moves) an effect within the same chain; `to == fx_count` appends.
    fn copy_fx(&mut self, track: Self::Track, from: usize, to: usize, is_move: bool) -> HostResult<()>;

    /// Instantiates an effect by name, returning its index or a negative value.
    fn add_fx_by_name(&mut self, track: Self::Track, name: &str) -> HostResult<i32>;

    fn show_fx_chain(&mut self, track: Self::Track) -> HostResult<()>;

    fn fx_param_count(&self, track: Self::Track, fx: usize) -> HostResult<usize>;

    fn fx_param_name(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<String>;

    fn fx_param_normalized(&self, track: Self::Track, fx: usize, param: usize) -> HostResult<f64>;

    fn set_fx_param_normalized(&mut self, track: Self::Track, fx: usize, param: usize, value: f64) -> HostResult<()>;

    fn fx_param_formatted(&self, _track: Self::Track, _fx: usize, _param: usize) -> HostResult<String> {
        Err(HostFault::Unsupported("formatted parameter values"))
    }

    fn fx_param_raw(&self, _track: Self::Track, _fx: usize, _param: usize) -> HostResult<f64> {
        Err(HostFault::Unsupported("raw parameter values"))
    }

    fn fx_param_range(&self, _track: Self::Track, _fx: usize, _param: usize) -> HostResult<(f64, f64)> {
        Err(HostFault::Unsupported("parameter ranges"))
    }

    /// Bitmask: 1 playing, 2 paused, 4 recording.
    fn play_state(&self) -> HostResult<u32>;

    fn play_position(&self) -> HostResult<f64>;

    fn cursor_position(&self) -> HostResult<f64>;

    fn set_edit_cursor(&mut self, position: f64, move_view: bool, seek_play: bool) -> HostResult<()>;

    fn transport(&mut self, action: TransportAction) -> HostResult<()>;

    fn master_tempo(&self) -> HostResult<f64> {
        Err(HostFault::Unsupported("master tempo"))
    }

    fn time_map_tempo(&self) -> HostResult<f64> {
        Err(HostFault::Unsupported("time map tempo"))
    }

    fn set_tempo(&mut self, bpm: f64) -> HostResult<()>;

    fn time_to_beats(&self, position: f64) -> HostResult<BeatInfo>;

    fn marker_count(&self) -> HostResult<usize>;

    fn marker(&self, index: usize) -> HostResult<MarkerInfo>;

    /// Marker number of the region containing `position`, if any.
    fn current_region(&self, position: f64) -> HostResult<Option<i32>>;
}
