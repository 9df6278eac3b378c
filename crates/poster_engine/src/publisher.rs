use engine_logging::{engine_debug, engine_info};

use crate::resize::{prepare_image, MAX_SIDE};
use crate::{ImageSource, PublishError};

/// Media id recorded for rows handled by [`DryRunPublisher`].
pub const DRY_RUN_MEDIA_ID: &str = "DRY_RUN";

/// A backend that turns an image and caption into a published post.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// One-time setup before the first publish of a run, such as logging in.
    async fn prepare(&self) -> Result<(), PublishError> {
        Ok(())
    }

    /// Publish one post and return the platform's media id.
    async fn publish(&self, image: &ImageSource, caption: &str) -> Result<String, PublishError>;
}

/// Never touches the network; every publish of a usable image succeeds with
/// [`DRY_RUN_MEDIA_ID`].
///
/// Local files are still opened and prepared, so a missing or undecodable
/// file fails the row exactly as a real run would. Remote URLs are not fetched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunPublisher;

#[async_trait::async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, image: &ImageSource, _caption: &str) -> Result<String, PublishError> {
        if let ImageSource::Local { path, .. } = image {
            let prepared = prepare_image(path, MAX_SIDE)?;
            engine_debug!("[dry-run] {} is ready to upload", prepared.path().display());
        }
        engine_info!("[dry-run] Skipping upload of {}", image);
        Ok(DRY_RUN_MEDIA_ID.to_string())
    }
}
