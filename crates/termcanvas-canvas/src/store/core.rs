//! CanvasStore struct definition, cell access and operation dispatch.

use std::collections::BTreeMap;

use termcanvas_common::{Cell, Point, Region};
use termcanvas_protocol::Operation;

// ---------------------------------------------------------------------------
// Damage
// ---------------------------------------------------------------------------

/// Area changed by one applied operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    None,
    Region(Region),
    Full,
}

// ---------------------------------------------------------------------------
// CanvasStore
// ---------------------------------------------------------------------------

/// Sparse map of non-default cells. A point with no entry is a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasStore {
    pub(crate) cells: BTreeMap<Point, Cell>,
}

impl CanvasStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- cell access --------------------------------------------------------

    pub fn get(&self, x: u16, y: u16) -> Cell {
        self.cells
            .get(&Point::new(x, y))
            .copied()
            .unwrap_or_default()
    }

    /// Stored cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Point, Cell)> + '_ {
        self.cells.iter().map(|(p, c)| (*p, *c))
    }

    /// Number of non-default cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // -- dispatch -----------------------------------------------------------

    pub fn apply(&mut self, op: &Operation) -> Damage {
        match *op {
            Operation::SetCell { x, y, ch, style } => {
                self.set_cell(x, y, ch, style);
                Damage::Region(Region::new(x, y, x, y))
            }
            Operation::DrawRegion {
                region,
                fill,
                fill_style,
                border_style,
                draw_borders,
            } => {
                self.draw_region(region, fill_style, border_style, fill, draw_borders);
                Damage::Region(region.normalized())
            }
            Operation::ClearRegion { region } => {
                self.clear_region(region);
                Damage::Region(region.normalized())
            }
            Operation::ClearAll => {
                self.clear();
                Damage::Full
            }
            Operation::Disconnect => Damage::None,
        }
    }
}
