use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::traits::ImageSource;

/// Resolves image identifiers as relative file names inside one directory.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Map an identifier to a path under the root.
    /// Returns `None` for absolute paths and anything that climbs out of the root.
    fn resolve(&self, image_id: &str) -> Option<PathBuf> {
        let relative = Path::new(image_id);
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }
}

#[async_trait]
impl ImageSource for DirectorySource {
    async fn exists(&self, image_id: &str) -> bool {
        let Some(path) = self.resolve(image_id) else {
            debug!("rejected image id {:?}", image_id);
            return false;
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn read(&self, image_id: &str) -> io::Result<Bytes> {
        let path = self.resolve(image_id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("image id {:?} escapes the image directory", image_id),
            )
        })?;
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    fn describe(&self, image_id: &str) -> String {
        self.root.join(image_id).display().to_string()
    }
}
