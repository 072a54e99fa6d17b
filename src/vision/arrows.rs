//! Reads the four-arrow captcha panel.
//!
//! Each arrow is drawn as a colour gradient that starts at a red tip and fades
//! through orange and yellow into green. The decoder finds red seed pixels,
//! walks away from each seed along the four axes, and accepts the seed as a
//! glyph when the walk reaches green while staying on one continuous gradient.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frame::{Frame, Region};
use super::hsv::{Hsv, HsvImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which walks are attempted from a seed.
    pub const PROBE_ORDER: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Unit step `(dx, dy)` in frame coordinates, y growing downwards.
    pub fn step(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Maps the direction a successful colour walk travelled to the direction the
/// glyph points. The gradient runs from the arrow's tip back to its tail, so
/// walking left from the red tip means the arrow points right.
pub fn displayed_direction(walk: Direction) -> Direction {
    walk.opposite()
}

/// One decoded glyph. The seed is only kept for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowReading {
    pub direction: Direction,
    pub seed: (u32, u32),
}

/// Colour thresholds of the glyph gradients, in 8-bit HSV.
///
/// Tuned against one client's rendering; they are not expected to carry over
/// to other themes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphThresholds {
    pub seed_hue_min: u8,
    pub seed_hue_max: u8,
    pub seed_min_saturation: u8,
    pub seed_min_value: u8,
    /// Largest hue change between two neighbouring pixels of one gradient.
    pub step_hue_tolerance: u8,
    /// Perpendicular tolerance used only by the diagnostic flood fill.
    pub cross_hue_tolerance: u8,
    pub step_min_saturation: u8,
    pub step_min_value: u8,
    pub step_max_hue: u8,
    pub goal_hue_min: u8,
    pub goal_hue_max: u8,
    /// Glyphs are about this many pixels long.
    pub walk_length: u32,
    pub claim_radius: u32,
    pub expected_symbols: usize,
}

impl Default for GlyphThresholds {
    fn default() -> Self {
        Self {
            seed_hue_min: 5,
            seed_hue_max: 12,
            seed_min_saturation: 65,
            seed_min_value: 128,
            step_hue_tolerance: 10,
            cross_hue_tolerance: 2,
            step_min_saturation: 150,
            step_min_value: 150,
            step_max_hue: 70,
            goal_hue_min: 50,
            goal_hue_max: 70,
            walk_length: 30,
            claim_radius: 15,
            expected_symbols: 4,
        }
    }
}

/// Where the captcha panel shows up in an 800x600 client window.
pub const DEFAULT_PANEL: Region = Region::new(150, 150, 500, 125);

#[derive(Debug, Clone)]
pub struct ArrowDecoder {
    panel: Region,
    thresholds: GlyphThresholds,
}

impl Default for ArrowDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL, GlyphThresholds::default())
    }
}

impl ArrowDecoder {
    pub fn new(panel: Region, thresholds: GlyphThresholds) -> Self {
        Self { panel, thresholds }
    }

    pub fn panel(&self) -> Region {
        self.panel
    }

    pub fn thresholds(&self) -> &GlyphThresholds {
        &self.thresholds
    }

    /// Directions in left-to-right order. Fewer than `expected_symbols` means
    /// the panel is not decodable yet; the caller retries with a new frame.
    pub fn decode(&self, frame: &Frame) -> Vec<Direction> {
        self.read(frame).into_iter().map(|r| r.direction).collect()
    }

    pub fn is_complete(&self, directions: &[Direction]) -> bool {
        directions.len() == self.thresholds.expected_symbols
    }

    /// Glyph readings sorted by seed x. Ties keep discovery order.
    pub fn read(&self, frame: &Frame) -> Vec<ArrowReading> {
        let panel = self.panel.clamp_to(frame.width(), frame.height());
        if panel.is_empty() {
            return Vec::new();
        }

        let hsv = HsvImage::from_region(frame, panel);
        let mut claimed: Vec<(u32, u32)> = Vec::new();
        let mut readings = Vec::new();

        for y in panel.top..panel.bottom() {
            for x in panel.left..panel.right() {
                let Some(pixel) = hsv.at(x as i64, y as i64) else {
                    continue;
                };
                if !self.is_seed(pixel) || self.is_claimed(&claimed, x, y) {
                    continue;
                }

                // Seeds that reach green in no direction are noise.
                if let Some(walk) = Direction::PROBE_ORDER
                    .into_iter()
                    .find(|&walk| self.walk(&hsv, x, y, walk))
                {
                    claimed.push((x, y));
                    readings.push(ArrowReading {
                        direction: displayed_direction(walk),
                        seed: (x, y),
                    });
                }
            }
        }

        readings.sort_by_key(|r| r.seed.0);
        debug!("Decoded {} glyphs: {:?}", readings.len(), readings);
        readings
    }

    fn is_seed(&self, pixel: Hsv) -> bool {
        let t = &self.thresholds;
        (t.seed_hue_min..=t.seed_hue_max).contains(&pixel.hue)
            && pixel.saturation >= t.seed_min_saturation
            && pixel.value >= t.seed_min_value
    }

    fn is_claimed(&self, claimed: &[(u32, u32)], x: u32, y: u32) -> bool {
        let radius = self.thresholds.claim_radius;
        claimed
            .iter()
            .any(|&(cx, cy)| cx.abs_diff(x) < radius && cy.abs_diff(y) < radius)
    }

    /// Whether `next` continues the gradient that `current` belongs to.
    pub(crate) fn continues(&self, current: Hsv, next: Hsv, tolerance: u8) -> bool {
        let t = &self.thresholds;
        current.hue_distance(&next) <= tolerance
            && next.saturation >= t.step_min_saturation
            && next.value >= t.step_min_value
            && next.hue <= t.step_max_hue
    }

    fn reaches_goal(&self, pixel: Hsv) -> bool {
        (self.thresholds.goal_hue_min..=self.thresholds.goal_hue_max).contains(&pixel.hue)
    }

    /// Walks from the seed one pixel at a time. Succeeds on the first valid
    /// step that lands in the green band; fails on a broken gradient, on
    /// leaving the panel, or after `walk_length` steps.
    fn walk(&self, hsv: &HsvImage, x: u32, y: u32, direction: Direction) -> bool {
        let (dx, dy) = direction.step();
        let (mut cx, mut cy) = (x as i64, y as i64);
        let Some(mut current) = hsv.at(cx, cy) else {
            return false;
        };

        for _ in 0..self.thresholds.walk_length {
            let (nx, ny) = (cx + dx, cy + dy);
            let Some(next) = hsv.at(nx, ny) else {
                return false;
            };
            if !self.continues(current, next, self.thresholds.step_hue_tolerance) {
                return false;
            }
            if self.reaches_goal(next) {
                return true;
            }
            (cx, cy, current) = (nx, ny, next);
        }

        false
    }
}
