// Engine orchestration — frame cache, decoding, and per-key playback positions.

pub mod cache;
pub mod decode;
pub mod placeholder;
pub mod sequencer;
pub mod stats;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::FrameError;
use crate::source::dir_source::DirectorySource;
use crate::source::traits::ImageSource;
use placeholder::Placeholder;
use sequencer::FrameSequencer;
use stats::StatsCollector;
use store::FrameStore;

/// Build a sequencer over the configured image directory.
pub fn build_engine(config: &EngineConfig) -> Result<Arc<FrameSequencer>, FrameError> {
    let source = Arc::new(DirectorySource::new(&config.image_dir));
    build_engine_with_source(config, source)
}

/// Build a sequencer over any image source.
pub fn build_engine_with_source(
    config: &EngineConfig,
    source: Arc<dyn ImageSource>,
) -> Result<Arc<FrameSequencer>, FrameError> {
    config.validate()?;

    let stats = Arc::new(StatsCollector::new());
    let store = FrameStore::new(source, config.cache_capacity, config.encoding, stats.clone());
    let placeholder = Placeholder::load(config);

    info!(
        "frame engine ready: dir={} capacity={} encoding={:?}",
        config.image_dir.display(),
        config.cache_capacity,
        config.encoding
    );

    Ok(Arc::new(FrameSequencer::new(store, placeholder, stats)))
}
