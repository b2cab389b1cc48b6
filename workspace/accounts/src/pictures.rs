use async_trait::async_trait;

use crate::error::Result;

/// Largest width or height a stored profile picture may have, in pixels.
pub const MAX_PICTURE_DIMENSION: u32 = 300;

/// Shrinks stored profile pictures so they fit a bounding square.
///
/// Implementations overwrite the file at `path` in place when it is larger
/// than `max_dimension` on either side and leave it alone otherwise.
#[async_trait]
pub trait PictureProcessor: Send + Sync + std::fmt::Debug {
    async fn fit_within(&self, path: &str, max_dimension: u32) -> Result<()>;
}
