use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::frame::Frame;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The target window is gone. Callers treat this as "nothing observed".
    #[error("window `{0}` was not found")]
    WindowNotFound(String),
    #[error("capture backend failed: {0}")]
    Backend(String),
    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Produces frames of the observed window on demand.
///
/// Implementations must return a fresh frame or an error, never a stale copy.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture()
    }
}

/// Captures a live window through `xcap`. The window is looked up on every
/// capture, by application name or title, so a restarted client is picked up.
pub struct WindowSource {
    target: String,
}

impl WindowSource {
    /// Fails when the capture backend cannot enumerate windows at all.
    pub fn new(target: impl Into<String>) -> Result<Self, CaptureError> {
        let target = target.into();
        let windows = xcap::Window::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        info!("Capture backend ready ({} windows visible), target `{}`", windows.len(), target);
        Ok(Self { target })
    }

    fn find(&self) -> Result<xcap::Window, CaptureError> {
        let windows = xcap::Window::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        windows
            .into_iter()
            .filter(|w| !w.is_minimized())
            .find(|w| w.app_name() == self.target || w.title() == self.target)
            .ok_or_else(|| CaptureError::WindowNotFound(self.target.clone()))
    }
}

impl FrameSource for WindowSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let window = self.find()?;
        let image = window
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        // Rebuild from raw bytes so the frame does not depend on the image
        // crate version the backend links against.
        let (width, height) = (image.width(), image.height());
        debug!("Captured {}x{} from `{}`", width, height, self.target);
        Frame::from_raw(width, height, image.into_raw())
            .ok_or_else(|| CaptureError::Backend(format!("malformed {}x{} buffer", width, height)))
    }
}

/// Serves the same still image on every capture. Used for offline decoding
/// of saved screenshots.
#[derive(Debug, Clone)]
pub struct StillSource {
    frame: Frame,
}

impl StillSource {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| CaptureError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(Frame::new(image.to_rgba8())))
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StillSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        Ok(self.frame.clone())
    }
}
