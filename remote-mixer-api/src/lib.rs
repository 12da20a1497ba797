pub use codec::{Codec, CodecError, JsonLines, LineBuffer};
pub use command::{SendMode, SurfaceCommand, TransportCommand};
pub use event::*;
pub use newtypes::{TrackGuid, MASTER_GUID};

pub mod codec;
pub mod command;
pub mod event;
pub mod lenient;
pub mod newtypes;

/// Version reported in `hello`, `state` and `meter` messages.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
