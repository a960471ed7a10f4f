// Frame store — decodes images into frame sequences and keeps the last few in a FIFO cache.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, error};

use super::cache::{FifoCache, Insertion};
use super::decode::decode_frames;
use super::stats::StatsCollector;
use crate::config::FrameEncoding;
use crate::error::FrameError;
use crate::source::traits::ImageSource;

/// The encoded frames of one source image, in display order. Never empty.
#[derive(Debug)]
pub struct FrameSequence {
    frames: Vec<Bytes>,
    media_type: &'static str,
}

impl FrameSequence {
    /// Returns `None` for an empty frame list.
    pub fn new(frames: Vec<Bytes>, media_type: &'static str) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self { frames, media_type })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Bytes> {
        self.frames.get(index)
    }

    /// The frame a round-robin counter at `position` lands on, with its index.
    pub fn frame_for_position(&self, position: u64) -> (usize, &Bytes) {
        let index = (position % self.frames.len() as u64) as usize;
        (index, &self.frames[index])
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }
}

fn into_sequence(
    image_id: &str,
    frames: Vec<Bytes>,
    media_type: &'static str,
) -> Result<FrameSequence, FrameError> {
    FrameSequence::new(frames, media_type).ok_or_else(|| FrameError::NoFrames {
        image_id: image_id.to_string(),
    })
}

pub struct FrameStore {
    source: Arc<dyn ImageSource>,
    cache: Mutex<FifoCache<String, Arc<FrameSequence>>>,
    encoding: FrameEncoding,
    stats: Arc<StatsCollector>,
}

impl FrameStore {
    /// # Panics
    /// If `capacity` is zero. `EngineConfig::validate` rejects that earlier.
    pub fn new(
        source: Arc<dyn ImageSource>,
        capacity: usize,
        encoding: FrameEncoding,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            source,
            cache: Mutex::new(FifoCache::new(capacity)),
            encoding,
            stats,
        }
    }

    /// Return the frames for `image_id`, decoding on first access.
    ///
    /// `Ok(None)` means the source does not exist. Decode failures are
    /// returned as errors and leave the cache untouched.
    pub async fn get_frames(
        &self,
        image_id: &str,
    ) -> Result<Option<Arc<FrameSequence>>, FrameError> {
        let cached = self.cache.lock().get(image_id);
        if let Some(frames) = cached {
            debug!("serving {} from cache", image_id);
            self.stats.record_hit();
            return Ok(Some(frames));
        }

        self.stats.record_miss();

        if !self.source.exists(image_id).await {
            debug!("no source at {}", self.source.describe(image_id));
            return Ok(None);
        }

        let data = self
            .source
            .read(image_id)
            .await
            .map_err(|e| FrameError::io(image_id, e))?;

        let t0 = Instant::now();
        let sequence = match self.decode(image_id, data).await {
            Ok(sequence) => Arc::new(sequence),
            Err(e) => {
                self.stats.record_decode_failure();
                error!("failed to decode {}: {}", self.source.describe(image_id), e);
                return Err(e);
            }
        };
        debug!(
            "decoded {} into {} frames in {} ms",
            image_id,
            sequence.len(),
            t0.elapsed().as_millis()
        );

        // Only the insertion itself runs under the lock.
        let mut cache = self.cache.lock();
        match cache.insert(image_id.to_string(), sequence.clone()) {
            Insertion::Inserted { evicted } => {
                if let Some(evicted) = evicted {
                    self.stats.record_eviction();
                    debug!("evicted {} from cache to maintain cache size", evicted);
                }
                debug!(
                    "added {} to cache, current cache size: {} items",
                    image_id,
                    cache.len()
                );
                Ok(Some(sequence))
            }
            Insertion::AlreadyPresent(existing) => {
                debug!("{} was cached by a concurrent request, discarding duplicate", image_id);
                Ok(Some(existing))
            }
        }
    }

    async fn decode(&self, image_id: &str, data: Bytes) -> Result<FrameSequence, FrameError> {
        let encoding = self.encoding;
        let frames = tokio::task::spawn_blocking(move || decode_frames(&data, encoding))
            .await
            .map_err(|e| FrameError::Task {
                image_id: image_id.to_string(),
                reason: e.to_string(),
            })?
            .map_err(|e| FrameError::decode(image_id, e))?;

        into_sequence(image_id, frames, encoding.media_type())
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.cache.lock().contains(image_id)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().capacity()
    }

    /// Cached image ids, oldest insertion first.
    pub fn cached_ids(&self) -> Vec<String> {
        self.cache.lock().keys().cloned().collect()
    }
}
