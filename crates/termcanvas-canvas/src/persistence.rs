//! CSV text exchanged with the file load/save collaborator.
//!
//! ```text
//! x,y,foregroundColor,backgroundColor,character
//! 5,6,red,reset,█
//! ```
//!
//! Only text is produced and consumed here; reading and writing files is the
//! caller's job.

use std::fmt::Write;

use termcanvas_common::{Cell, ColorRef, MalformedFileError, Point, Style};
use termcanvas_protocol::{escape_char, unescape_char};

use crate::store::CanvasStore;

pub const CSV_HEADER: &str = "x,y,foregroundColor,backgroundColor,character";

/// Serialize every stored cell at or below `header_rows`.
pub fn to_csv(store: &CanvasStore, header_rows: u16) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (p, cell) in store.cells().filter(|(p, _)| p.y >= header_rows) {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            p.x,
            p.y,
            cell.style.fg,
            cell.style.bg,
            escape_char(cell.ch)
        );
    }
    out
}

/// Parse a saved canvas. Fails on the first bad row; nothing is returned
/// partially.
pub fn parse_csv(text: &str) -> Result<Vec<(Point, Cell)>, MalformedFileError> {
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim() == CSV_HEADER => {}
        _ => {
            return Err(MalformedFileError {
                line: 1,
                reason: format!("expected header {CSV_HEADER:?}"),
            })
        }
    }

    let mut cells = Vec::new();
    for (index, line) in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        cells.push(parse_row(line).map_err(|reason| MalformedFileError {
            line: index + 1,
            reason,
        })?);
    }
    Ok(cells)
}

fn parse_row(line: &str) -> Result<(Point, Cell), String> {
    let fields: Vec<&str> = line.splitn(5, ',').collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, got {}", fields.len()));
    }
    let x = fields[0]
        .parse::<u16>()
        .map_err(|_| format!("invalid x coordinate {:?}", fields[0]))?;
    let y = fields[1]
        .parse::<u16>()
        .map_err(|_| format!("invalid y coordinate {:?}", fields[1]))?;
    let fg = fields[2].parse::<ColorRef>().map_err(|e| e.to_string())?;
    let bg = fields[3].parse::<ColorRef>().map_err(|e| e.to_string())?;
    let ch = unescape_char(fields[4])
        .ok_or_else(|| format!("invalid character field {:?}", fields[4]))?;
    Ok((Point::new(x, y), Cell::new(ch, Style::new(fg, bg))))
}

impl CanvasStore {
    /// Overlay a saved canvas onto this one. On error the store is unchanged.
    pub fn load_csv(&mut self, text: &str) -> Result<usize, MalformedFileError> {
        let cells = parse_csv(text)?;
        for (p, cell) in &cells {
            self.set_cell(p.x, p.y, cell.ch, cell.style);
        }
        tracing::debug!(cells = cells.len(), "Loaded canvas from text");
        Ok(cells.len())
    }
}
