//! Messages sent from the surface to the peer, and the documents they carry.

use serde::{Deserialize, Serialize};

use crate::newtypes::TrackGuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    Hello(Hello),
    State(SessionSnapshot),
    Meter(MeterSnapshot),
    FxList(FxList),
    FxParams(FxParams),
    Regions(RegionList),
}

impl SurfaceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceEvent::Hello(_) => "hello",
            SurfaceEvent::State(_) => "state",
            SurfaceEvent::Meter(_) => "meter",
            SurfaceEvent::FxList(_) => "fxList",
            SurfaceEvent::FxParams(_) => "fxParams",
            SurfaceEvent::Regions(_) => "regions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub version: String,
    pub ts:      f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub master:       Option<TrackState>,
    pub tracks:       Vec<TrackState>,
    pub project_name: String,
    pub project_path: String,
    pub transport:    TransportState,
    pub ts:           f64,
    pub version:      String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Master,
    Track,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackState {
    pub kind:           TrackKind,
    pub guid:           TrackGuid,
    pub id:             String,
    /// 1-based display position, 0 for the master bus.
    pub idx:            usize,
    pub name:           String,
    pub vol:            f64,
    pub pan:            f64,
    pub mute:           bool,
    pub solo:           bool,
    pub rec:            bool,
    /// Negative: internal bus, 0..N: hardware input, 4096 and above: MIDI device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_input:      Option<i32>,
    pub fx_count:       usize,
    pub fx_all_off:     bool,
    pub send_slots:     Vec<String>,
    pub recv_slots:     Vec<String>,
    pub send_details:   Vec<SendState>,
    pub recv_details:   Vec<ReceiveState>,
    pub folder_depth:   i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_compact: Option<i32>,
    pub indent:         i32,
    pub color:          Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendState {
    pub index:     usize,
    pub dest_guid: TrackGuid,
    pub dest_name: String,
    pub vol:       f64,
    pub mute:      bool,
    pub mode:      i32,
    pub src_chan:  i32,
    pub dst_chan:  i32,
    pub src_ch:    String,
    pub dst_ch:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveState {
    pub index:    usize,
    pub src_guid: TrackGuid,
    pub src_name: String,
    pub vol:      f64,
    pub mute:     bool,
    pub mode:     i32,
    pub src_chan: i32,
    pub dst_chan: i32,
    pub src_ch:   String,
    pub dst_ch:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportState {
    pub play_state:   u32,
    pub playing:      bool,
    pub paused:       bool,
    pub recording:    bool,
    pub position:     f64,
    pub bpm:          Option<f64>,
    pub bar:          i32,
    pub beat:         i32,
    pub beat_frac:    f64,
    pub region_name:  String,
    pub region_index: Option<i32>,
    pub regions:      Vec<Region>,
    pub markers:      Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub index: i32,
    pub name:  String,
    pub start: f64,
    pub end:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub index:    i32,
    pub name:     String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub frames:  Vec<MeterFrame>,
    pub ts:      f64,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterFrame {
    pub guid: TrackGuid,
    #[serde(rename = "pkL")]
    pub left: f64,
    #[serde(rename = "pkR")]
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxList {
    pub guid: TrackGuid,
    pub fx:   Vec<FxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxEntry {
    pub index:   usize,
    pub name:    String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxParams {
    pub guid:     TrackGuid,
    pub fx_index: i64,
    pub params:   Vec<FxParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxParam {
    pub index: usize,
    pub name:  String,
    /// Normalized 0..1.
    pub value: f64,
    pub fmt:   String,
    pub raw:   Option<f64>,
    pub min:   Option<f64>,
    pub max:   Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionList {
    pub regions:      Vec<Region>,
    pub markers:      Vec<Marker>,
    pub region_name:  String,
    pub region_index: Option<i32>,
}
