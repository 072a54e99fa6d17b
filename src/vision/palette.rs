use serde::{Deserialize, Serialize};

use super::frame::Colour;

/// Exact RGBA colour of one marker class on the overview panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColourSignature(pub Colour);

impl ColourSignature {
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self([red, green, blue, alpha])
    }

    /// Exact equality on all four channels. The palette is picked to be
    /// visually unambiguous, so there is no colour distance here.
    pub fn matches(&self, pixel: &Colour) -> bool {
        self.0 == *pixel
    }
}

/// Marker colours of the overview panel. Changing the game theme means
/// changing these values, never the locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// The entity the pilot steers.
    pub controlled: ColourSignature,
    /// Special-event marker (rune).
    pub marker: ColourSignature,
    pub stranger: ColourSignature,
    pub guildmate: ColourSignature,
    pub friend: ColourSignature,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            controlled: ColourSignature::rgba(255, 221, 68, 255),
            marker: ColourSignature::rgba(221, 102, 255, 255),
            stranger: ColourSignature::rgba(255, 0, 0, 255),
            guildmate: ColourSignature::rgba(102, 102, 255, 255),
            friend: ColourSignature::rgba(17, 221, 225, 255),
        }
    }
}

impl Palette {
    /// Every participant that is not the controlled entity.
    pub fn others(&self) -> [ColourSignature; 3] {
        [self.stranger, self.guildmate, self.friend]
    }

    pub fn named(&self) -> [(&'static str, ColourSignature); 5] {
        [
            ("controlled", self.controlled),
            ("marker", self.marker),
            ("stranger", self.stranger),
            ("guildmate", self.guildmate),
            ("friend", self.friend),
        ]
    }
}
