use serde::{Deserialize, Serialize};

/// An 8-bit RGBA display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const PURPLE: Colour = Colour::rgb(128, 0, 128);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Formats the colour as `#rrggbbaa`.
    ///
    /// ```
    /// use quadcluster_types::colour::Colour;
    ///
    /// assert_eq!(Colour::PURPLE.to_hex(), "#800080ff");
    /// ```
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::RED
    }
}
