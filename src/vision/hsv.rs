//! 8-bit HSV, in the convention most capture tooling uses:
//! hue is in two-degree units (0..=179), saturation and value span 0..=255.
//! The glyph thresholds of the arrow decoder are expressed in this scale.

use super::frame::{Frame, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let (r, g, b) = (red as f32, green as f32, blue as f32);
        let maximum_channel = r.max(g.max(b));
        let minimum_channel = r.min(g.min(b));
        let chroma = maximum_channel - minimum_channel;

        let saturation = if maximum_channel <= 0.0 {
            0.0
        } else {
            255.0 * chroma / maximum_channel
        };

        let hue_degrees = if chroma <= 0.0 {
            0.0
        } else {
            let (base_difference, sector_offset) = if maximum_channel == r {
                (g - b, 0.0)
            } else if maximum_channel == g {
                (b - r, 120.0)
            } else {
                (r - g, 240.0)
            };
            let degrees = 60.0 * base_difference / chroma + sector_offset;
            if degrees < 0.0 { degrees + 360.0 } else { degrees }
        };

        let hue = (hue_degrees / 2.0).round() as u16;
        Self {
            hue: if hue >= 180 { 0 } else { hue as u8 },
            saturation: saturation.round() as u8,
            value: maximum_channel as u8,
        }
    }

    pub fn hue_distance(&self, other: &Hsv) -> u8 {
        self.hue.abs_diff(other.hue)
    }
}

/// HSV copy of one region of a frame. Lookups use frame coordinates.
#[derive(Debug, Clone)]
pub struct HsvImage {
    bounds: Region,
    data: Vec<Hsv>,
}

impl HsvImage {
    /// `region` is clamped to the frame.
    pub fn from_region(frame: &Frame, region: Region) -> Self {
        let bounds = region.clamp_to(frame.width(), frame.height());
        let mut data = Vec::with_capacity(bounds.area());
        for y in bounds.top..bounds.bottom() {
            for x in bounds.left..bounds.right() {
                let [r, g, b, _] = frame.pixel(x, y);
                data.push(Hsv::from_rgb(r, g, b));
            }
        }
        Self { bounds, data }
    }

    pub fn bounds(&self) -> Region {
        self.bounds
    }

    /// `None` outside the converted region.
    pub fn at(&self, x: i64, y: i64) -> Option<Hsv> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let row = (y - self.bounds.top as i64) as usize;
        let column = (x - self.bounds.left as i64) as usize;
        self.data.get(row * self.bounds.width as usize + column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_use_two_degree_hue() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv { hue: 0, saturation: 255, value: 255 });
        assert_eq!(Hsv::from_rgb(0, 255, 0), Hsv { hue: 60, saturation: 255, value: 255 });
        assert_eq!(Hsv::from_rgb(0, 0, 255), Hsv { hue: 120, saturation: 255, value: 255 });
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        let grey = Hsv::from_rgb(128, 128, 128);
        assert_eq!(grey.hue, 0);
        assert_eq!(grey.saturation, 0);
        assert_eq!(grey.value, 128);
        assert_eq!(Hsv::from_rgb(0, 0, 0), Hsv::default());
    }

    #[test]
    fn orange_lands_in_red_band() {
        // 16 degrees.
        let hsv = Hsv::from_rgb(255, 68, 0);
        assert_eq!(hsv.hue, 8);
        assert_eq!(hsv.saturation, 255);
    }

    #[test]
    fn magenta_wraps_below_180() {
        let hsv = Hsv::from_rgb(255, 0, 1);
        assert!(hsv.hue < 180);
    }
}
