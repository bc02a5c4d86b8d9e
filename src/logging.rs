//! Console logging for the service binary.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! also picks those records up, so library and server output share one
//! filter and one format.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter_string = format!("{level},ort=warn,hyper=warn,ureq=warn");
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&filter_string))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;

    Ok(())
}
