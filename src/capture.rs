//! Capture surface seam
//!
//! The capture surface supplies the raw bytes of either a user-selected
//! file or a single camera frame, normalized to the same encoded-image
//! representation before entering the pipeline. The device itself is
//! exclusive; implementations tear their stream down in `release`, and
//! must be released before another surface is opened.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Source of raw image bytes for a translation run
#[async_trait]
pub trait CaptureSurface: Send + Sync {
    /// Acquire one frame's encoded bytes
    async fn acquire_frame(&self) -> Result<Vec<u8>>;

    /// Tear down any exclusive device resources held by this surface
    fn release(&self) {}
}

/// File-based capture surface used by the CLI
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CaptureSurface for FileCapture {
    async fn acquire_frame(&self) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            anyhow::anyhow!("failed to read capture file {}: {}", self.path.display(), e)
        })?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Captured frame from file");
        Ok(bytes)
    }
}
