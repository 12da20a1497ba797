use serde::Deserialize;

use crate::lenient;
use crate::newtypes::TrackGuid;


/// A control message received from the peer.
///
/// Unknown `type`s decode to [`SurfaceCommand::Unknown`] so that newer peers
/// can talk to older surfaces. Missing fields take the defaults the peer's UI
/// assumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceCommand {
    ReqState,
    ReqRegions,
    Transport {
        #[serde(default)]
        action: TransportCommand,
    },
    SetBpm {
        #[serde(default = "default_bpm", deserialize_with = "lenient::number")]
        bpm: f64,
    },
    GotoRegion {
        #[serde(default = "default_region", deserialize_with = "lenient::integer")]
        index: i64,
    },
    SetVol {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default = "unity", deserialize_with = "lenient::number")]
        vol:  f64,
    },
    SetPan {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::number")]
        pan:  f64,
    },
    SetMute {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::truthy")]
        mute: bool,
    },
    SetSolo {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::truthy")]
        solo: bool,
    },
    SetRec {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::truthy")]
        rec:  bool,
    },
    SetSendVol {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
        #[serde(default = "unity", deserialize_with = "lenient::number")]
        vol:   f64,
    },
    SetSendMute {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
        #[serde(default, deserialize_with = "lenient::truthy")]
        mute:  bool,
    },
    SetSendMode {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
        #[serde(default, deserialize_with = "send_mode")]
        mode:  SendMode,
    },
    SetRecvVol {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
        #[serde(default = "unity", deserialize_with = "lenient::number")]
        vol:   f64,
    },
    SetRecvMute {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
        #[serde(default, deserialize_with = "lenient::truthy")]
        mute:  bool,
    },
    /// `input` is 1-based as shown in the UI.
    SetRecInput {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default = "first_input", deserialize_with = "lenient::integer")]
        input: i64,
    },
    ShowFxChain {
        #[serde(default)]
        guid: TrackGuid,
    },
    ReqFxList {
        #[serde(default)]
        guid: TrackGuid,
    },
    SetFxEnabled {
        #[serde(default)]
        guid:    TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index:   i64,
        #[serde(default = "enabled", deserialize_with = "lenient::truthy")]
        enabled: bool,
    },
    SetFxAllEnabled {
        #[serde(default)]
        guid:    TrackGuid,
        #[serde(default = "enabled", deserialize_with = "lenient::truthy")]
        enabled: bool,
    },
    DeleteFx {
        #[serde(default)]
        guid:  TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        index: i64,
    },
    MoveFx {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::integer")]
        from: i64,
        #[serde(default, deserialize_with = "lenient::integer")]
        to:   i64,
    },
    ReqFxParams {
        #[serde(default)]
        guid:     TrackGuid,
        #[serde(rename = "fxIndex", default, deserialize_with = "lenient::integer")]
        fx_index: i64,
    },
    SetFxParam {
        #[serde(default)]
        guid:     TrackGuid,
        #[serde(rename = "fxIndex", default, deserialize_with = "lenient::integer")]
        fx_index: i64,
        #[serde(default, deserialize_with = "lenient::integer")]
        param:    i64,
        #[serde(default, deserialize_with = "lenient::number")]
        value:    f64,
    },
    /// `name` may hold several `||`-separated candidates, tried in order.
    AddFx {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::string")]
        name: String,
    },
    RenameTrack {
        #[serde(default)]
        guid: TrackGuid,
        #[serde(default, deserialize_with = "lenient::string")]
        name: String,
    },
    #[serde(other)]
    Unknown,
}

impl SurfaceCommand {
    /// Wire name of the command, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceCommand::ReqState => "reqState",
            SurfaceCommand::ReqRegions => "reqRegions",
            SurfaceCommand::Transport { .. } => "transport",
            SurfaceCommand::SetBpm { .. } => "setBpm",
            SurfaceCommand::GotoRegion { .. } => "gotoRegion",
            SurfaceCommand::SetVol { .. } => "setVol",
            SurfaceCommand::SetPan { .. } => "setPan",
            SurfaceCommand::SetMute { .. } => "setMute",
            SurfaceCommand::SetSolo { .. } => "setSolo",
            SurfaceCommand::SetRec { .. } => "setRec",
            SurfaceCommand::SetSendVol { .. } => "setSendVol",
            SurfaceCommand::SetSendMute { .. } => "setSendMute",
            SurfaceCommand::SetSendMode { .. } => "setSendMode",
            SurfaceCommand::SetRecvVol { .. } => "setRecvVol",
            SurfaceCommand::SetRecvMute { .. } => "setRecvMute",
            SurfaceCommand::SetRecInput { .. } => "setRecInput",
            SurfaceCommand::ShowFxChain { .. } => "showFxChain",
            SurfaceCommand::ReqFxList { .. } => "reqFxList",
            SurfaceCommand::SetFxEnabled { .. } => "setFxEnabled",
            SurfaceCommand::SetFxAllEnabled { .. } => "setFxAllEnabled",
            SurfaceCommand::DeleteFx { .. } => "deleteFx",
            SurfaceCommand::MoveFx { .. } => "moveFx",
            SurfaceCommand::ReqFxParams { .. } => "reqFxParams",
            SurfaceCommand::SetFxParam { .. } => "setFxParam",
            SurfaceCommand::AddFx { .. } => "addFx",
            SurfaceCommand::RenameTrack { .. } => "renameTrack",
            SurfaceCommand::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportCommand {
    Play,
    Stop,
    Pause,
    Record,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Two-state send routing as offered by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendMode {
    #[default]
    PostFader,
    PreFader,
}

impl SendMode {
    /// Value written to the host's send mode attribute.
    pub fn host_value(self) -> f64 {
        match self {
            SendMode::PostFader => 0.0,
            SendMode::PreFader => 1.0,
        }
    }
}

impl From<bool> for SendMode {
    fn from(pre_fader: bool) -> Self {
        if pre_fader {
            SendMode::PreFader
        } else {
            SendMode::PostFader
        }
    }
}

fn send_mode<'de, D>(deserializer: D) -> Result<SendMode, D::Error>
    where D: serde::Deserializer<'de>
{
    lenient::truthy(deserializer).map(SendMode::from)
}

fn default_bpm() -> f64 {
    120.0
}

fn default_region() -> i64 {
    -1
}

fn unity() -> f64 {
    1.0
}

fn first_input() -> i64 {
    1
}

fn enabled() -> bool {
    true
}
