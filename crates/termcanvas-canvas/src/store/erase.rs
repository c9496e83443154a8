//! Erase operations: clear an inclusive rectangle, clear everything.

use termcanvas_common::Region;

use super::core::CanvasStore;

impl CanvasStore {
    /// Reset every cell of the inclusive rectangle `[x1,x2] x [y1,y2]`.
    pub fn clear_region(&mut self, region: Region) {
        let r = region.normalized();
        self.cells.retain(|p, _| !r.contains(*p));
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}
