//! Rendering surface seam and an in-memory implementation.

use termcanvas_common::{Cell, Point, Style};

use crate::store::{CanvasStore, Damage};

/// What a glyph-rendering backend must provide to show the canvas.
pub trait Surface: Send {
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style);
    fn get_cell(&self, x: u16, y: u16) -> (char, Style);
    /// `(width, height)` in cells.
    fn size(&self) -> (u16, u16);
    /// Ask the backend to redraw.
    fn notify_dirty(&mut self);
}

/// Copy the damaged part of `store` onto `surface`, clipped to its size, then
/// trigger a redraw. `Damage::None` leaves the surface untouched.
pub fn repaint(store: &CanvasStore, surface: &mut dyn Surface, damage: Damage) {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return;
    }
    let (x1, y1, x2, y2) = match damage {
        Damage::None => return,
        Damage::Full => (0, 0, width - 1, height - 1),
        Damage::Region(region) => {
            let r = region.normalized();
            if r.x1 >= width || r.y1 >= height {
                return;
            }
            (r.x1, r.y1, r.x2.min(width - 1), r.y2.min(height - 1))
        }
    };
    for y in y1..=y2 {
        for x in x1..=x2 {
            let cell = store.get(x, y);
            surface.set_cell(x, y, cell.ch, cell.style);
        }
    }
    surface.notify_dirty();
}

// ---------------------------------------------------------------------------
// HeadlessSurface
// ---------------------------------------------------------------------------

/// Fixed-size cell grid that counts redraw requests. Used where no terminal
/// is attached (console mode, tests).
pub struct HeadlessSurface {
    pub cols: u16,
    pub rows: u16,
    cells: Vec<Vec<Cell>>,
    redraws: u64,
}

impl HeadlessSurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: (0..rows)
                .map(|_| vec![Cell::default(); cols as usize])
                .collect(),
            redraws: 0,
        }
    }

    /// Number of `notify_dirty` calls so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Plain-text rendering, one line per row, trailing blanks trimmed.
    pub fn render_text(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                let line: String = row.iter().map(|c| c.ch).collect();
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn in_bounds(&self, p: Point) -> bool {
        p.x < self.cols && p.y < self.rows
    }
}

impl Surface for HeadlessSurface {
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if !self.in_bounds(Point::new(x, y)) {
            return;
        }
        self.cells[y as usize][x as usize] = Cell::new(ch, style);
    }

    fn get_cell(&self, x: u16, y: u16) -> (char, Style) {
        if !self.in_bounds(Point::new(x, y)) {
            let blank = Cell::default();
            return (blank.ch, blank.style);
        }
        let cell = self.cells[y as usize][x as usize];
        (cell.ch, cell.style)
    }

    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn notify_dirty(&mut self) {
        self.redraws += 1;
        tracing::trace!(redraws = self.redraws, "surface redraw requested");
    }
}
