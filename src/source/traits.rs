use std::io;

use async_trait::async_trait;
use bytes::Bytes;

/// Backing storage that image identifiers resolve against.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Whether `image_id` names a readable resource.
    async fn exists(&self, image_id: &str) -> bool;
    async fn read(&self, image_id: &str) -> io::Result<Bytes>;
    /// Human-readable location, for logging.
    fn describe(&self, image_id: &str) -> String {
        image_id.to_string()
    }
}
