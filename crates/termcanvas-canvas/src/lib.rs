//! The authoritative canvas of one session participant, plus the two
//! collaborator seams it talks to: a rendering [`Surface`] and the CSV text
//! handed to the file load/save path.

pub mod persistence;
pub mod store;
pub mod surface;

pub use persistence::{parse_csv, to_csv, CSV_HEADER};
pub use store::{CanvasStore, Damage, Snapshot};
pub use surface::{repaint, HeadlessSurface, Surface};
