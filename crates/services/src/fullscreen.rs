use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("fullscreen request was denied")]
pub struct FullscreenDenied;

/// Host-side fullscreen switch. Leaving fullscreen is reported to the
/// session as `SessionEvent::FullscreenChanged`, not through this trait.
#[async_trait]
pub trait FullscreenControl: Send + Sync {
    /// # Errors
    ///
    /// Returns `FullscreenDenied` when the host or the user refuses.
    async fn request(&self) -> Result<(), FullscreenDenied>;

    async fn exit(&self);
}

/// For hosts without a fullscreen mode; every request succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

#[async_trait]
impl FullscreenControl for NoFullscreen {
    async fn request(&self) -> Result<(), FullscreenDenied> {
        Ok(())
    }

    async fn exit(&self) {}
}
