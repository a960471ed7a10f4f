use std::sync::Once;

use tracing::info;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn";

/// Install the global tracing subscriber. Later calls are no-ops.
///
/// `verbose` lowers the crate's own level to `debug` when `RUST_LOG` is unset.
pub fn init_tracing(verbose: bool) {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new(format!("{DEFAULT_LOG_FILTER},frame_relay_engine=debug"))
            } else {
                EnvFilter::new(DEFAULT_LOG_FILTER)
            }
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("frame relay tracing initialized");
    });
}
