use tracing::{debug, warn};

use super::capture::{CaptureError, FrameSource};
use super::frame::{Frame, Position, Region, VisionError};
use super::palette::{ColourSignature, Palette};

/// Mean position of every pixel of `region` that exactly matches each signature.
///
/// Positions are region-local and come back in signature order. Signatures
/// without a single matching pixel are left out, so the result is not
/// index-aligned with `signatures`.
pub fn locate_in(
    frame: &Frame,
    region: Region,
    signatures: &[ColourSignature],
) -> Result<Vec<Position>, VisionError> {
    let pixels = frame.region_pixels(region)?;
    let width = region.width as usize;
    let mut positions = Vec::with_capacity(signatures.len());

    for signature in signatures {
        let (mut sum_x, mut sum_y, mut count) = (0u64, 0u64, 0u64);
        for (index, _) in pixels.iter().enumerate().filter(|(_, p)| signature.matches(p)) {
            sum_x += (index % width) as u64;
            sum_y += (index / width) as u64;
            count += 1;
        }
        if count > 0 {
            positions.push(Position::new(
                sum_x as f64 / count as f64,
                sum_y as f64 / count as f64,
            ));
        }
    }

    Ok(positions)
}

/// Finds overview markers in frames pulled from a `FrameSource`.
pub struct EntityLocator<F> {
    source: F,
    overview: Region,
    palette: Palette,
}

impl<F: FrameSource> EntityLocator<F> {
    pub fn new(source: F, overview: Region, palette: Palette) -> Self {
        Self { source, overview, palette }
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }

    /// A fresh full frame, or `None` when the source has nothing to offer.
    /// A missing window is an ordinary "not observed yet" condition.
    pub fn capture(&mut self) -> Option<Frame> {
        match self.source.capture() {
            Ok(frame) => Some(frame),
            Err(CaptureError::WindowNotFound(target)) => {
                warn!("No frame: window `{}` was not found", target);
                None
            }
            Err(e) => {
                warn!("No frame: {}", e);
                None
            }
        }
    }

    /// `locate_in` on a fresh capture of the overview region. No frame means
    /// no entities.
    pub fn locate(&mut self, signatures: &[ColourSignature]) -> Result<Vec<Position>, VisionError> {
        let Some(frame) = self.capture() else {
            return Ok(Vec::new());
        };
        let positions = locate_in(&frame, self.overview, signatures)?;
        debug!("Located {} of {} signatures", positions.len(), signatures.len());
        Ok(positions)
    }

    pub fn controlled_position(&mut self) -> Result<Option<Position>, VisionError> {
        let signature = self.palette.controlled;
        Ok(self.locate(&[signature])?.first().copied())
    }

    pub fn marker_position(&mut self) -> Result<Option<Position>, VisionError> {
        let signature = self.palette.marker;
        Ok(self.locate(&[signature])?.first().copied())
    }

    /// True when any participant other than the controlled entity is visible.
    pub fn others_present(&mut self) -> Result<bool, VisionError> {
        let others = self.palette.others();
        Ok(!self.locate(&others)?.is_empty())
    }
}
