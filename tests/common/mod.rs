#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::collections::{BTreeSet, VecDeque};

use runewalker::control::{InputError, InputSink, Key, Transition};
use runewalker::vision::{CaptureError, ColourSignature, Direction, Frame, FrameSource, Palette, Region};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;
pub const OVERVIEW: Region = Region::new(5, 60, 175, 70);

/// Records every transition and tracks which keys are down.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<(Key, Transition)>,
    pub held: BTreeSet<Key>,
}

impl RecordingSink {
    pub fn downs(&self) -> Vec<Key> {
        self.events
            .iter()
            .filter(|(_, t)| *t == Transition::Down)
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn count_downs(&self, key: Key) -> usize {
        self.downs().into_iter().filter(|k| *k == key).count()
    }
}

impl InputSink for RecordingSink {
    fn send(&mut self, key: Key, transition: Transition) -> Result<(), InputError> {
        self.events.push((key, transition));
        match transition {
            Transition::Down => self.held.insert(key),
            Transition::Up => self.held.remove(&key),
        };
        Ok(())
    }
}

/// Like `RecordingSink`, but the first release of `key` after it went down
/// fails with a device error and leaves the key held.
#[derive(Debug)]
pub struct FlakySink {
    pub inner: RecordingSink,
    fail_release_of: Option<Key>,
}

impl FlakySink {
    pub fn failing_release_of(key: Key) -> Self {
        Self { inner: RecordingSink::default(), fail_release_of: Some(key) }
    }
}

impl InputSink for FlakySink {
    fn send(&mut self, key: Key, transition: Transition) -> Result<(), InputError> {
        if transition == Transition::Up
            && self.fail_release_of == Some(key)
            && self.inner.held.contains(&key)
        {
            self.fail_release_of = None;
            return Err(InputError::Device("transient".into()));
        }
        self.inner.send(key, transition)
    }
}

/// Serves frames in order, repeating the last one forever. `None` entries
/// behave like a missing window.
pub struct ScriptedSource {
    frames: VecDeque<Option<Frame>>,
    last: Option<Frame>,
    pub captures: usize,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Option<Frame>>) -> Self {
        Self { frames: frames.into(), last: None, captures: 0 }
    }

    pub fn repeating(frame: Frame) -> Self {
        Self::new(vec![Some(frame)])
    }
}

impl FrameSource for ScriptedSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.captures += 1;
        let next = match self.frames.pop_front() {
            Some(next) => {
                self.last = next.clone();
                next
            }
            None => self.last.clone(),
        };
        next.ok_or_else(|| CaptureError::WindowNotFound("scripted".into()))
    }
}

pub fn blank_frame() -> RgbaImage {
    RgbaImage::new(WIDTH, HEIGHT)
}

/// Paints one pixel per entity at overview-relative coordinates.
pub fn overview_frame(entities: &[(ColourSignature, u32, u32)]) -> Frame {
    let mut image = blank_frame();
    paint_entities(&mut image, entities);
    Frame::new(image)
}

pub fn paint_entities(image: &mut RgbaImage, entities: &[(ColourSignature, u32, u32)]) {
    for (signature, x, y) in entities {
        image.put_pixel(OVERVIEW.left + x, OVERVIEW.top + y, Rgba(signature.0));
    }
}

pub fn controlled_at(x: u32, y: u32) -> Frame {
    overview_frame(&[(Palette::default().controlled, x, y)])
}

/// Fully saturated colour of the given 8-bit hue, chosen so that it converts
/// back to exactly that hue.
pub fn hue_pixel(hue: u8) -> Rgba<u8> {
    let degrees = hue as f64 * 2.0;
    if degrees <= 60.0 {
        Rgba([255, (255.0 * degrees / 60.0).round() as u8, 0, 255])
    } else {
        Rgba([(255.0 * (120.0 - degrees) / 60.0).round() as u8, 255, 0, 255])
    }
}

/// Red-to-green ramp, one pixel per step.
pub const RAMP: [u8; 7] = [8, 16, 24, 32, 40, 48, 56];

/// Draws an arrow pointing `displayed` whose red tip sits at `(x, y)`. The
/// gradient runs away from the tip, against the pointing direction.
pub fn paint_glyph(image: &mut RgbaImage, x: u32, y: u32, displayed: Direction) {
    let (dx, dy) = displayed.opposite().step();
    for (k, hue) in RAMP.iter().enumerate() {
        let px = (x as i64 + dx * k as i64) as u32;
        let py = (y as i64 + dy * k as i64) as u32;
        image.put_pixel(px, py, hue_pixel(*hue));
    }
}

pub const GLYPH_XS: [u32; 4] = [160, 300, 420, 560];
pub const GLYPH_Y: u32 = 200;

/// Captcha frame with one glyph per direction at `GLYPH_XS`.
pub fn captcha_frame(directions: &[Direction]) -> Frame {
    let mut image = blank_frame();
    for (x, direction) in GLYPH_XS.iter().zip(directions) {
        paint_glyph(&mut image, *x, GLYPH_Y, *direction);
    }
    Frame::new(image)
}
