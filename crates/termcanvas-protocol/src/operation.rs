use termcanvas_common::{Region, Style};

/// One mutation of the shared canvas; the unit of wire transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SetCell {
        x: u16,
        y: u16,
        ch: char,
        style: Style,
    },
    DrawRegion {
        region: Region,
        fill: char,
        fill_style: Style,
        border_style: Style,
        draw_borders: bool,
    },
    ClearRegion {
        region: Region,
    },
    ClearAll,
    /// Per-connection goodbye (`exit`). Never applied to a canvas.
    Disconnect,
}

impl Operation {
    pub fn set_cell(x: u16, y: u16, ch: char, style: Style) -> Self {
        Operation::SetCell { x, y, ch, style }
    }

    /// Topmost row the operation writes to, if it targets a specific area.
    pub fn top_row(&self) -> Option<u16> {
        match self {
            Operation::SetCell { y, .. } => Some(*y),
            Operation::DrawRegion { region, .. } | Operation::ClearRegion { region } => {
                Some(region.top())
            }
            Operation::ClearAll | Operation::Disconnect => None,
        }
    }
}
