//! Line encoding and decoding.
//!
//! The character field is escaped (`\\`, `\c` for a comma, `\n`, `\r`) so a
//! comma can travel inside a `region:` line. A one-character field is always
//! taken literally, which keeps unescaped legacy lines such as
//! `set:1,5,red,reset,,` decodable.

use std::fmt::Write;

use termcanvas_common::{ColorRef, ProtocolError, Region, Style};

use crate::operation::Operation;

const TAG_SET: &str = "set";
const TAG_REGION: &str = "region";
const TAG_CLEAR_REGION: &str = "clearRegion";
const TAG_CLEAR: &str = "clear";
const TAG_EXIT: &str = "exit";

/// Encode an operation without the trailing newline.
pub fn encode(op: &Operation) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = match op {
        Operation::SetCell { x, y, ch, style } => write!(
            out,
            "{TAG_SET}:{x},{y},{},{},{}",
            style.fg,
            style.bg,
            escape_char(*ch)
        ),
        Operation::DrawRegion {
            region,
            fill,
            fill_style,
            border_style,
            draw_borders,
        } => write!(
            out,
            "{TAG_REGION}:{},{},{},{},{},{},{},{},{},{}",
            region.x1,
            region.y1,
            region.x2,
            region.y2,
            fill_style.fg,
            fill_style.bg,
            border_style.fg,
            border_style.bg,
            escape_char(*fill),
            draw_borders
        ),
        Operation::ClearRegion { region } => write!(
            out,
            "{TAG_CLEAR_REGION}:{},{},{},{}",
            region.x1, region.y1, region.x2, region.y2
        ),
        Operation::ClearAll => write!(out, "{TAG_CLEAR}"),
        Operation::Disconnect => write!(out, "{TAG_EXIT}"),
    };
    out
}

/// Decode one wire line. A trailing `\n` / `\r\n` is ignored.
pub fn decode(line: &str) -> Result<Operation, ProtocolError> {
    let body = line.trim_end_matches(['\n', '\r']);

    match body.split_once(':') {
        Some((TAG_SET, payload)) => decode_set(payload, body),
        Some((TAG_REGION, payload)) => decode_region(payload, body),
        Some((TAG_CLEAR_REGION, payload)) => decode_clear_region(payload, body),
        Some((tag, _)) => Err(malformed(body, format!("unknown operation {tag:?}"))),
        None => match body.trim() {
            TAG_CLEAR => Ok(Operation::ClearAll),
            TAG_EXIT => Ok(Operation::Disconnect),
            _ => Err(malformed(body, "unknown operation")),
        },
    }
}

fn decode_set(payload: &str, line: &str) -> Result<Operation, ProtocolError> {
    // The character is the final field, so everything after the fourth comma
    // belongs to it.
    let fields: Vec<&str> = payload.splitn(5, ',').collect();
    if fields.len() != 5 {
        return Err(field_count(line, 5, fields.len()));
    }
    Ok(Operation::SetCell {
        x: coordinate(&fields, 0, line)?,
        y: coordinate(&fields, 1, line)?,
        style: Style::new(color(fields[2])?, color(fields[3])?),
        ch: character(fields[4], line)?,
    })
}

fn decode_region(payload: &str, line: &str) -> Result<Operation, ProtocolError> {
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != 10 {
        return Err(field_count(line, 10, fields.len()));
    }
    Ok(Operation::DrawRegion {
        region: region(&fields, line)?,
        fill_style: Style::new(color(fields[4])?, color(fields[5])?),
        border_style: Style::new(color(fields[6])?, color(fields[7])?),
        fill: character(fields[8], line)?,
        draw_borders: boolean(fields[9], line)?,
    })
}

fn decode_clear_region(payload: &str, line: &str) -> Result<Operation, ProtocolError> {
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != 4 {
        return Err(field_count(line, 4, fields.len()));
    }
    Ok(Operation::ClearRegion {
        region: region(&fields, line)?,
    })
}

fn region(fields: &[&str], line: &str) -> Result<Region, ProtocolError> {
    Ok(Region::new(
        coordinate(fields, 0, line)?,
        coordinate(fields, 1, line)?,
        coordinate(fields, 2, line)?,
        coordinate(fields, 3, line)?,
    ))
}

fn coordinate(fields: &[&str], index: usize, line: &str) -> Result<u16, ProtocolError> {
    fields[index]
        .parse::<u16>()
        .map_err(|_| ProtocolError::Coordinate {
            field: index,
            line: line.to_string(),
        })
}

fn color(field: &str) -> Result<ColorRef, ProtocolError> {
    Ok(field.parse::<ColorRef>()?)
}

fn boolean(field: &str, line: &str) -> Result<bool, ProtocolError> {
    match field.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(malformed(line, format!("invalid boolean {other:?}"))),
    }
}

fn character(field: &str, line: &str) -> Result<char, ProtocolError> {
    unescape_char(field)
        .ok_or_else(|| malformed(line, "character field holds more than one character"))
}

/// Decode an escaped character field. Empty means space; a single character
/// is taken literally. `None` when the field is not exactly one character.
pub fn unescape_char(field: &str) -> Option<char> {
    let mut chars = field.chars();
    let Some(first) = chars.next() else {
        return Some(' ');
    };
    let Some(second) = chars.next() else {
        return Some(first);
    };

    let decoded = match (first, second) {
        ('\\', '\\') => '\\',
        ('\\', 'c') => ',',
        ('\\', 'n') => '\n',
        ('\\', 'r') => '\r',
        _ => return None,
    };
    match chars.next() {
        Some(_) => None,
        None => Some(decoded),
    }
}

/// Escape a character for a comma-separated field.
pub fn escape_char(ch: char) -> String {
    match ch {
        '\\' => "\\\\".into(),
        ',' => "\\c".into(),
        '\n' => "\\n".into(),
        '\r' => "\\r".into(),
        c => c.to_string(),
    }
}

fn field_count(line: &str, expected: usize, got: usize) -> ProtocolError {
    malformed(line, format!("expected {expected} fields, got {got}"))
}

fn malformed(line: &str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::Malformed {
        line: line.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcanvas_common::ColorNameError;

    fn red() -> Style {
        Style::fg(ColorRef::Red)
    }

    #[test]
    fn encode_set_cell() {
        let op = Operation::set_cell(5, 6, '█', red());
        assert_eq!(encode(&op), "set:5,6,red,reset,█");
    }

    #[test]
    fn encode_region_line() {
        let op = Operation::DrawRegion {
            region: Region::new(1, 4, 10, 8),
            fill: ' ',
            fill_style: Style::default(),
            border_style: Style::new(ColorRef::Blue, ColorRef::White),
            draw_borders: true,
        };
        assert_eq!(
            encode(&op),
            "region:1,4,10,8,reset,reset,blue,white, ,true"
        );
    }

    #[test]
    fn encode_bare_operations() {
        assert_eq!(
            encode(&Operation::ClearRegion {
                region: Region::new(3, 4, 1, 2)
            }),
            "clearRegion:3,4,1,2"
        );
        assert_eq!(encode(&Operation::ClearAll), "clear");
        assert_eq!(encode(&Operation::Disconnect), "exit");
    }

    #[test]
    fn decode_set_line_with_newline() {
        let op = decode("set:5,6,red,reset,█\n").unwrap();
        assert_eq!(op, Operation::set_cell(5, 6, '█', red()));
    }

    #[test]
    fn decode_crlf_is_accepted() {
        assert_eq!(decode("clear\r\n").unwrap(), Operation::ClearAll);
        assert_eq!(decode("exit\n").unwrap(), Operation::Disconnect);
    }

    #[test]
    fn decode_region_and_clear_region() {
        let op = decode("region:10,8,1,4,lime,reset,blue,reset,█,false").unwrap();
        assert_eq!(
            op,
            Operation::DrawRegion {
                region: Region::new(10, 8, 1, 4),
                fill: '█',
                fill_style: Style::fg(ColorRef::Lime),
                border_style: Style::fg(ColorRef::Blue),
                draw_borders: false,
            }
        );

        let op = decode("clearRegion:0,4,9,9").unwrap();
        assert_eq!(
            op,
            Operation::ClearRegion {
                region: Region::new(0, 4, 9, 9)
            }
        );
    }

    #[test]
    fn clear_region_is_not_mistaken_for_clear() {
        assert!(matches!(
            decode("clearRegion:1,2,3,4").unwrap(),
            Operation::ClearRegion { .. }
        ));
    }

    #[test]
    fn bad_x_reports_field_zero() {
        let err = decode("set:a,6,red,reset,X").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Coordinate {
                field: 0,
                line: "set:a,6,red,reset,X".into()
            }
        );
    }

    #[test]
    fn bad_region_corner_reports_its_field() {
        let err = decode("region:1,2,3,-4,red,reset,red,reset,x,true").unwrap_err();
        assert!(matches!(err, ProtocolError::Coordinate { field: 3, .. }));

        let err = decode("clearRegion:1,2,x,4").unwrap_err();
        assert!(matches!(err, ProtocolError::Coordinate { field: 2, .. }));
    }

    #[test]
    fn negative_and_oversized_coordinates_are_rejected() {
        assert!(matches!(
            decode("set:-1,6,red,reset,X").unwrap_err(),
            ProtocolError::Coordinate { field: 0, .. }
        ));
        assert!(matches!(
            decode("set:1,70000,red,reset,X").unwrap_err(),
            ProtocolError::Coordinate { field: 1, .. }
        ));
    }

    #[test]
    fn unknown_color_is_rejected() {
        let err = decode("set:1,6,mauve,reset,X").unwrap_err();
        assert_eq!(err, ProtocolError::ColorName(ColorNameError("mauve".into())));
    }

    #[test]
    fn structural_errors_are_malformed() {
        for line in [
            "set:1,2,red",
            "region:1,2,3,4,red,reset,red,reset,x",
            "region:1,2,3,4,red,reset,red,reset,x,maybe",
            "clearRegion:1,2,3",
            "paint:1,2",
            "hello",
            "",
        ] {
            assert!(
                matches!(decode(line), Err(ProtocolError::Malformed { .. })),
                "expected malformed: {line:?}"
            );
        }
    }

    #[test]
    fn multi_character_field_is_malformed() {
        assert!(matches!(
            decode("set:1,6,red,reset,XY"),
            Err(ProtocolError::Malformed { .. })
        ));
        assert!(matches!(
            decode("set:1,6,red,reset,\\q"),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_character_decodes_to_space() {
        assert_eq!(
            decode("set:1,6,reset,reset,").unwrap(),
            Operation::set_cell(1, 6, ' ', Style::default())
        );
    }

    #[test]
    fn comma_survives_inside_a_region_line() {
        let op = Operation::DrawRegion {
            region: Region::new(0, 4, 6, 9),
            fill: ',',
            fill_style: red(),
            border_style: Style::default(),
            draw_borders: true,
        };
        let line = encode(&op);
        assert_eq!(line, "region:0,4,6,9,red,reset,reset,reset,\\c,true");
        assert_eq!(decode(&line).unwrap(), op);
    }

    #[test]
    fn special_characters_round_trip_in_set() {
        for ch in [',', '\\', '\n', '\r', ':', '█', 'é'] {
            let op = Operation::set_cell(2, 9, ch, red());
            assert_eq!(decode(&encode(&op)).unwrap(), op, "char {ch:?}");
        }
    }

    #[test]
    fn legacy_unescaped_comma_is_accepted() {
        assert_eq!(
            decode("set:1,5,red,reset,,").unwrap(),
            Operation::set_cell(1, 5, ',', red())
        );
        assert_eq!(
            decode("set:1,5,red,reset,\\").unwrap(),
            Operation::set_cell(1, 5, '\\', red())
        );
    }
}
