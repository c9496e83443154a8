//! termcanvas wire protocol: one operation per newline-terminated ASCII line.
//!
//! ```text
//! set:<x>,<y>,<fg>,<bg>,<char>
//! region:<x1>,<y1>,<x2>,<y2>,<fg>,<bg>,<borderFg>,<borderBg>,<char>,<true|false>
//! clearRegion:<x1>,<y1>,<x2>,<y2>
//! clear
//! exit
//! ```

pub mod codec;
pub mod operation;

pub use codec::{decode, encode, escape_char, unescape_char};
pub use operation::Operation;
