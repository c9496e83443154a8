//! The fixed 16-color palette and the `reset` sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ColorNameError;

/// A palette entry, or `Reset` for "leave the terminal default alone".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorRef {
    #[default]
    Reset,
    Black,
    Maroon,
    Green,
    Olive,
    Navy,
    Purple,
    Teal,
    Silver,
    Grey,
    Red,
    Lime,
    Yellow,
    Blue,
    Fuchsia,
    Aqua,
    White,
}

impl ColorRef {
    /// The sixteen palette colors in picker order (`Reset` excluded).
    pub const PALETTE: [ColorRef; 16] = [
        ColorRef::Black,
        ColorRef::Maroon,
        ColorRef::Green,
        ColorRef::Olive,
        ColorRef::Navy,
        ColorRef::Purple,
        ColorRef::Teal,
        ColorRef::Silver,
        ColorRef::Grey,
        ColorRef::Red,
        ColorRef::Lime,
        ColorRef::Yellow,
        ColorRef::Blue,
        ColorRef::Fuchsia,
        ColorRef::Aqua,
        ColorRef::White,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorRef::Reset => "reset",
            ColorRef::Black => "black",
            ColorRef::Maroon => "maroon",
            ColorRef::Green => "green",
            ColorRef::Olive => "olive",
            ColorRef::Navy => "navy",
            ColorRef::Purple => "purple",
            ColorRef::Teal => "teal",
            ColorRef::Silver => "silver",
            ColorRef::Grey => "grey",
            ColorRef::Red => "red",
            ColorRef::Lime => "lime",
            ColorRef::Yellow => "yellow",
            ColorRef::Blue => "blue",
            ColorRef::Fuchsia => "fuchsia",
            ColorRef::Aqua => "aqua",
            ColorRef::White => "white",
        }
    }
}

impl FromStr for ColorRef {
    type Err = ColorNameError;

    /// Case-insensitive. Unknown names are rejected, never mapped to `Reset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("reset") {
            return Ok(ColorRef::Reset);
        }
        Self::PALETTE
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ColorNameError(s.to_string()))
    }
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for ColorRef {
    type Error = ColorNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorRef> for String {
    fn from(color: ColorRef) -> Self {
        color.name().to_string()
    }
}
