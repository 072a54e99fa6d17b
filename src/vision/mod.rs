pub mod arrows;
pub mod capture;
pub mod diagnostics;
pub mod frame;
pub mod hsv;
pub mod locator;
pub mod palette;

pub use arrows::{ArrowDecoder, ArrowReading, Direction, GlyphThresholds};
pub use capture::{CaptureError, FrameSource, StillSource, WindowSource};
pub use frame::{Colour, Frame, Position, Region, VisionError};
pub use locator::{locate_in, EntityLocator};
pub use palette::{ColourSignature, Palette};
