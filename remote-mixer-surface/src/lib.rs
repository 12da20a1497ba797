pub use config::SurfaceConfig;
pub use host::{HostFault, HostResult, SessionHost};
pub use surface::RemoteMixerSurface;

pub mod clock;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod host;
pub mod identity;
pub mod limits;
pub mod logging;
pub mod meters;
pub mod snapshot;
pub mod surface;
