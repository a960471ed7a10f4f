//! Serves successive frames of animated images, one frame per request.
//!
//! [`engine::store::FrameStore`] decodes images into frame sequences and
//! keeps the most recent ones in a bounded FIFO cache.
//! [`engine::sequencer::FrameSequencer`] tracks a playback position per
//! tracking key and hands out the next frame on every lookup.
//! [`server`] exposes the sequencer over HTTP.

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod source;
