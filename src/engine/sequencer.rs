// Frame sequencer — hands out the next frame per tracking key, round-robin.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::placeholder::Placeholder;
use super::stats::{StatsCollector, StatsSnapshot};
use super::store::FrameStore;
use crate::config::SUPPRESSED_MEDIA_TYPE;
use crate::error::FrameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `index` is the frame served; `position` is the counter value it was
    /// derived from (`index == position % len`).
    Frame { index: usize, position: u64 },
    /// The image does not exist; the body is the placeholder.
    Placeholder,
    /// The caller asked for `show=false`.
    Suppressed,
    /// The image does not exist and no placeholder is loaded. Empty body.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct FrameResponse {
    pub body: Bytes,
    pub media_type: &'static str,
    pub outcome: Outcome,
}

impl FrameResponse {
    fn empty(outcome: Outcome) -> Self {
        Self {
            body: Bytes::new(),
            media_type: SUPPRESSED_MEDIA_TYPE,
            outcome,
        }
    }
}

pub struct FrameSequencer {
    store: FrameStore,
    placeholder: Option<Placeholder>,
    positions: Mutex<HashMap<String, u64>>,
    stats: Arc<StatsCollector>,
}

impl FrameSequencer {
    pub fn new(
        store: FrameStore,
        placeholder: Option<Placeholder>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        if placeholder.is_none() {
            warn!("no not-found placeholder loaded; missing images will get empty responses");
        }
        Self {
            store,
            placeholder,
            positions: Mutex::new(HashMap::new()),
            stats,
        }
    }

    /// Entry point for the request layer.
    ///
    /// `tracking_key` defaults to `image_id`. `show == Some(false)` returns an
    /// empty body without touching the cache or any position.
    pub async fn lookup(
        &self,
        image_id: &str,
        tracking_key: Option<&str>,
        show: Option<bool>,
    ) -> Result<FrameResponse, FrameError> {
        if show == Some(false) {
            self.stats.record_suppressed();
            return Ok(FrameResponse::empty(Outcome::Suppressed));
        }
        let tracking_key = tracking_key.filter(|k| !k.is_empty()).unwrap_or(image_id);
        self.next_frame(image_id, tracking_key).await
    }

    /// Return the frame at `tracking_key`'s position and advance it by one.
    ///
    /// Missing images are answered with the placeholder and advance nothing.
    pub async fn next_frame(
        &self,
        image_id: &str,
        tracking_key: &str,
    ) -> Result<FrameResponse, FrameError> {
        if image_id.is_empty() {
            return Err(FrameError::InvalidRequest("empty image id".to_string()));
        }

        let Some(frames) = self.store.get_frames(image_id).await? else {
            return Ok(self.not_found(image_id));
        };

        // Read then increment, both under the lock.
        let position = {
            let mut positions = self.positions.lock();
            let counter = positions.entry(tracking_key.to_string()).or_insert(0);
            let position = *counter;
            *counter = counter.wrapping_add(1);
            position
        };

        let (index, body) = frames.frame_for_position(position);
        self.stats.record_frame();

        Ok(FrameResponse {
            body: body.clone(),
            media_type: frames.media_type(),
            outcome: Outcome::Frame { index, position },
        })
    }

    fn not_found(&self, image_id: &str) -> FrameResponse {
        match &self.placeholder {
            Some(placeholder) => {
                debug!("{} not found, serving placeholder", image_id);
                self.stats.record_placeholder();
                FrameResponse {
                    body: placeholder.body.clone(),
                    media_type: placeholder.media_type,
                    outcome: Outcome::Placeholder,
                }
            }
            None => {
                warn!("{} not found and no placeholder is loaded", image_id);
                FrameResponse::empty(Outcome::Unavailable)
            }
        }
    }

    /// Current position for `tracking_key` without advancing it.
    pub fn position(&self, tracking_key: &str) -> u64 {
        self.positions.lock().get(tracking_key).copied().unwrap_or(0)
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
