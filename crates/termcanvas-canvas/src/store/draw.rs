//! Write operations: single cells and filled/bordered regions.

use termcanvas_common::{Cell, Point, Region, Style};

use super::core::CanvasStore;

pub const HLINE: char = '─';
pub const VLINE: char = '│';
pub const UL_CORNER: char = '┌';
pub const UR_CORNER: char = '┐';
pub const LL_CORNER: char = '└';
pub const LR_CORNER: char = '┘';

impl CanvasStore {
    /// Write one cell. Writing the default cell removes the entry.
    pub fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        let point = Point::new(x, y);
        let cell = Cell::new(ch, style);
        if cell.is_default() {
            self.cells.remove(&point);
        } else {
            self.cells.insert(point, cell);
        }
    }

    /// Fill the open interior of `region` and, if asked, frame it.
    ///
    /// Borders are drawn only for non-degenerate regions. A degenerate region
    /// (zero width or height) has an empty interior, so nothing is written.
    pub fn draw_region(
        &mut self,
        region: Region,
        fill_style: Style,
        border_style: Style,
        fill: char,
        draw_borders: bool,
    ) {
        let r = region.normalized();
        if r.is_degenerate() {
            return;
        }

        if draw_borders {
            for x in (r.x1 + 1)..r.x2 {
                self.set_cell(x, r.y1, HLINE, border_style);
                self.set_cell(x, r.y2, HLINE, border_style);
            }
            for y in (r.y1 + 1)..r.y2 {
                self.set_cell(r.x1, y, VLINE, border_style);
                self.set_cell(r.x2, y, VLINE, border_style);
            }
            self.set_cell(r.x1, r.y1, UL_CORNER, border_style);
            self.set_cell(r.x2, r.y1, UR_CORNER, border_style);
            self.set_cell(r.x1, r.y2, LL_CORNER, border_style);
            self.set_cell(r.x2, r.y2, LR_CORNER, border_style);
        }

        if Cell::new(fill, fill_style).is_default() {
            // Blank fill only removes entries; walk the stored cells instead
            // of the whole area.
            self.cells
                .retain(|p, _| !(r.x1 < p.x && p.x < r.x2 && r.y1 < p.y && p.y < r.y2));
            return;
        }
        for y in (r.y1 + 1)..r.y2 {
            for x in (r.x1 + 1)..r.x2 {
                self.set_cell(x, y, fill, fill_style);
            }
        }
    }
}
