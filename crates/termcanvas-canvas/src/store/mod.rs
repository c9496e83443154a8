mod core;
mod draw;
mod erase;
mod snapshot;

pub use self::core::*;
pub use draw::{HLINE, LL_CORNER, LR_CORNER, UL_CORNER, UR_CORNER, VLINE};
pub use snapshot::Snapshot;

// ===========================================================================
// Tests
// ===========================================================================
