use std::io;

/// Errors raised by the frame engine.
///
/// A missing source image is not an error: the store reports it as `None`
/// and the sequencer answers with the placeholder.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// The source exists but could not be decoded, or a frame could not be
    /// re-encoded. Nothing is cached for the image.
    #[error("cannot decode {image_id}: {source}")]
    Decode {
        image_id: String,
        #[source]
        source: image::ImageError,
    },

    /// The source decoded cleanly but yielded no frames.
    #[error("{image_id} contains no frames")]
    NoFrames { image_id: String },

    #[error("io error reading {image_id}: {source}")]
    Io {
        image_id: String,
        #[source]
        source: io::Error,
    },

    /// The decode task panicked or was cancelled.
    #[error("decode task for {image_id} failed: {reason}")]
    Task { image_id: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FrameError {
    pub fn decode(image_id: &str, source: image::ImageError) -> Self {
        FrameError::Decode {
            image_id: image_id.to_string(),
            source,
        }
    }

    pub fn io(image_id: &str, source: io::Error) -> Self {
        FrameError::Io {
            image_id: image_id.to_string(),
            source,
        }
    }

    /// Whether the failure was caused by the image data itself rather than
    /// by the caller or the environment.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            FrameError::Decode { .. } | FrameError::NoFrames { .. } | FrameError::Task { .. }
        )
    }
}
