use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::FrameError;

/// Number of decoded images kept in the frame cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 5;

/// Port the frame server listens on by default.
pub const DEFAULT_PORT: u16 = 8405;

/// Seconds the supervisor waits before restarting a dead serving loop.
pub const DEFAULT_RESTART_DELAY_SECS: u64 = 5;

/// Folder under the user's pictures directory that holds source images.
pub const DEFAULT_IMAGE_FOLDER: &str = "AnimatedImages";

/// Media type sent with a suppressed (`show=false`) response.
pub const SUPPRESSED_MEDIA_TYPE: &str = "application/octet-stream";

/// Bundled placeholder used when no placeholder path is configured.
pub static BUNDLED_PLACEHOLDER: &[u8] = include_bytes!("../assets/not_found.png");

/// How decoded frames are re-encoded before they are cached and served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameEncoding {
    /// Lossless, keeps transparency.
    #[default]
    Png,
    /// Frames are flattened to RGB; transparency is lost.
    Jpeg,
}

impl FrameEncoding {
    pub fn media_type(self) -> &'static str {
        match self {
            FrameEncoding::Png => "image/png",
            FrameEncoding::Jpeg => "image/jpeg",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            FrameEncoding::Png => image::ImageFormat::Png,
            FrameEncoding::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Top-level configuration for the frame engine and its HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory that image identifiers are resolved against.
    pub image_dir: PathBuf,
    /// Maximum number of decoded images held in the cache.
    pub cache_capacity: usize,
    /// Output encoding for cached frames.
    pub encoding: FrameEncoding,
    /// Address the HTTP listener binds to.
    pub host: IpAddr,
    pub port: u16,
    /// Custom not-found image. `None` uses the bundled one.
    pub placeholder_path: Option<PathBuf>,
    /// Delay before the supervisor restarts a failed serving loop.
    pub restart_delay_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            encoding: FrameEncoding::default(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            placeholder_path: None,
            restart_delay_secs: DEFAULT_RESTART_DELAY_SECS,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, FrameError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FrameError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, FrameError> {
        let config: Self =
            toml::from_str(text).map_err(|e| FrameError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.cache_capacity == 0 {
            return Err(FrameError::Configuration(
                "cache_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}

fn default_image_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| {
            dirs.picture_dir()
                .map(Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().join("Pictures")))
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_IMAGE_FOLDER)
}
