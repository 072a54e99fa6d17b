use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One RGBA pixel.
pub type Colour = [u8; 4];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisionError {
    #[error("region {region} does not fit in a {width}x{height} frame")]
    RegionOutOfBounds { region: Region, width: u32, height: u32 },
}

/// Axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when the region lies entirely inside a `width` x `height` frame.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.left.checked_add(self.width).is_some_and(|r| r <= width)
            && self.top.checked_add(self.height).is_some_and(|b| b <= height)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left as i64 && x < self.right() as i64 && y >= self.top as i64 && y < self.bottom() as i64
    }

    /// Intersection with a `width` x `height` frame. May be empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Region {
        let left = self.left.min(width);
        let top = self.top.min(height);
        Region {
            left,
            top,
            width: self.right().min(width) - left,
            height: self.bottom().min(height) - top,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }
}

/// Sub-pixel location, relative to the region it was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A captured image of the game window. Never mutated after capture.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Wraps a tightly packed RGBA buffer. `None` when the length does not match.
    pub fn from_raw(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba).map(Self::new)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Colour {
        self.image.get_pixel(x, y).0
    }

    /// Pixels of `region` flattened in row-major order.
    pub fn region_pixels(&self, region: Region) -> Result<Vec<Colour>, VisionError> {
        if !region.fits(self.width(), self.height()) {
            return Err(VisionError::RegionOutOfBounds {
                region,
                width: self.width(),
                height: self.height(),
            });
        }

        let mut pixels = Vec::with_capacity(region.area());
        for y in region.top..region.bottom() {
            for x in region.left..region.right() {
                pixels.push(self.pixel(x, y));
            }
        }
        Ok(pixels)
    }
}
