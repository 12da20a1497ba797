use std::env;

use anyhow::anyhow;
use once_cell::sync::OnceCell;
use tracing::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_RUST_LOG: &str = "info,remote_mixer_surface=debug,remote_mixer_api=debug";

static LOGGING: OnceCell<()> = OnceCell::new();

/// Installs the global tracing subscriber. Safe to call from every instance
/// the host loads; only the first call installs anything.
pub fn init() -> anyhow::Result<()> {
    LOGGING.get_or_try_init(|| {
               let _ = dotenv::dotenv();
               if env::var("RUST_LOG").is_err() {
                   env::set_var("RUST_LOG", DEFAULT_RUST_LOG);
               }

               tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env())
                                        .try_init()
                                        .map_err(|err| anyhow!("could not install tracing subscriber: {err}"))?;

               debug!("logging initialized");
               Ok::<_, anyhow::Error>(())
           })?;

    Ok(())
}
