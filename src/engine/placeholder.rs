// Not-found placeholder — loaded once at startup, shared by every miss.

use std::path::Path;

use bytes::Bytes;
use tracing::{error, info};

use crate::config::{EngineConfig, BUNDLED_PLACEHOLDER};

#[derive(Debug, Clone)]
pub struct Placeholder {
    pub body: Bytes,
    pub media_type: &'static str,
}

impl Placeholder {
    pub fn from_bytes(body: Bytes) -> Option<Self> {
        let media_type = media_type_of(&body)?;
        Some(Self { body, media_type })
    }

    /// The placeholder compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            body: Bytes::from_static(BUNDLED_PLACEHOLDER),
            media_type: "image/png",
        }
    }

    /// Load the placeholder named by `config`, falling back to the bundled one
    /// when no path is configured.
    ///
    /// A configured path that cannot be read, or is not an image, is a
    /// configuration error: it is logged here and `None` is returned so that
    /// requests needing the placeholder get an empty response instead.
    pub fn load(config: &EngineConfig) -> Option<Self> {
        match &config.placeholder_path {
            None => Some(Self::bundled()),
            Some(path) => Self::load_file(path),
        }
    }

    fn load_file(path: &Path) -> Option<Self> {
        let body = match std::fs::read(path) {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                error!("placeholder {} unavailable: {}", path.display(), e);
                return None;
            }
        };
        let placeholder = Self::from_bytes(body);
        match &placeholder {
            Some(p) => info!("placeholder loaded from {} ({})", path.display(), p.media_type),
            None => error!("placeholder {} is not a recognised image", path.display()),
        }
        placeholder
    }
}

fn media_type_of(data: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(data).ok()?;
    Some(format.to_mime_type())
}
