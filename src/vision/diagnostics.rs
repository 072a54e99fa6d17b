//! Debug rendering of the gradients behind a decode.
//!
//! Nothing here feeds back into `ArrowDecoder::read`; the canvas exists only
//! so a human can check which pixels were taken to be glyphs.

use image::{GrayImage, Luma};

use super::arrows::{ArrowDecoder, ArrowReading};
use super::frame::Frame;
use super::hsv::HsvImage;

/// Shade of glyph pixels on the diagnostic canvas.
pub const GLYPH_SHADE: u8 = 180;

/// Flood-fills every decoded glyph from its seed and paints the result on a
/// black canvas the size of the frame.
///
/// The fill is 4-connected. Along the glyph's own axis neighbours may differ by
/// the walk tolerance, across it only by the much tighter cross tolerance,
/// because the gradient changes along the arrow and hardly at all across it.
pub fn trace_gradients(decoder: &ArrowDecoder, frame: &Frame, readings: &[ArrowReading]) -> GrayImage {
    let mut canvas = GrayImage::new(frame.width(), frame.height());
    let hsv = HsvImage::from_region(frame, decoder.panel());
    let bounds = hsv.bounds();
    if bounds.is_empty() {
        return canvas;
    }

    let width = bounds.width as usize;
    let mut visited = vec![false; bounds.area()];
    let index = |x: i64, y: i64| (y - bounds.top as i64) as usize * width + (x - bounds.left as i64) as usize;

    let thresholds = decoder.thresholds();
    for reading in readings {
        let (along, across) = (thresholds.step_hue_tolerance, thresholds.cross_hue_tolerance);
        let (horizontal_tolerance, vertical_tolerance) = if reading.direction.is_horizontal() {
            (along, across)
        } else {
            (across, along)
        };

        let (sx, sy) = (reading.seed.0 as i64, reading.seed.1 as i64);
        if hsv.at(sx, sy).is_none() || visited[index(sx, sy)] {
            continue;
        }
        visited[index(sx, sy)] = true;
        let mut stack = vec![(sx, sy)];

        while let Some((x, y)) = stack.pop() {
            canvas.put_pixel(x as u32, y as u32, Luma([GLYPH_SHADE]));
            let Some(current) = hsv.at(x, y) else {
                continue;
            };

            for (dx, dy, tolerance) in [
                (1, 0, horizontal_tolerance),
                (-1, 0, horizontal_tolerance),
                (0, 1, vertical_tolerance),
                (0, -1, vertical_tolerance),
            ] {
                let (nx, ny) = (x + dx, y + dy);
                let Some(next) = hsv.at(nx, ny) else {
                    continue;
                };
                if !visited[index(nx, ny)] && decoder.continues(current, next, tolerance) {
                    visited[index(nx, ny)] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }

    canvas
}
