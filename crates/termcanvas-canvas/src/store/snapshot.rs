//! Snapshot: the operations that rebuild the current canvas on an empty one.

use std::collections::btree_map;

use termcanvas_common::{Cell, Point};
use termcanvas_protocol::Operation;

use super::core::CanvasStore;

/// Lazy `SetCell` sequence over the stored cells. Clone it to restart.
#[derive(Clone)]
pub struct Snapshot<'a> {
    cells: btree_map::Iter<'a, Point, Cell>,
}

impl Iterator for Snapshot<'_> {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        self.cells
            .next()
            .map(|(p, c)| Operation::set_cell(p.x, p.y, c.ch, c.style))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cells.size_hint()
    }
}

impl ExactSizeIterator for Snapshot<'_> {}

impl CanvasStore {
    /// One `SetCell` per non-default cell, in row-major order.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            cells: self.cells.iter(),
        }
    }
}
