//! Telemetry payload parsing.
//!
//! Client reports look like JSON but are not parsed as JSON. The parser walks
//! the string once, in a fixed field order:
//!
//! 1. `id":"<value>"`, `fw":"<value>"`, `topic":"<value>"`: each value runs
//!    from the marker to the next `"`.
//! 2. Ten numbers: skip past the next `,`, then read up to the next `,`
//!    (`param_1` .. `param_9`) or `}` (`param_10`).
//!
//! A missing marker or delimiter is a [`ParseError`] naming the field.
//! Numeric text that does not parse is read as `0.0`.

use std::str::FromStr;

use crate::cursor::Cursor;
use crate::error::{Field, ParseError, ParseResult, PARAM_COUNT};
use crate::record::TelemetryRecord;

/// Separator preceding each numeric field.
const FIELD_SEPARATOR: &str = ",";

/// Terminator of the final numeric field.
const RECORD_END: char = '}';

/// Parse a telemetry payload string.
pub fn parse_telemetry(input: &str) -> ParseResult<TelemetryRecord> {
    let input = input.trim();
    log::trace!("parsing telemetry payload: {}", input);

    let mut cursor = Cursor::new(input);

    let id = read_text_field(&mut cursor, Field::Id)?;
    let firmware_version = read_text_field(&mut cursor, Field::Firmware)?;
    let topic = read_text_field(&mut cursor, Field::Topic)?;

    let mut params = [0.0f32; PARAM_COUNT];
    for (i, slot) in params.iter_mut().enumerate() {
        let n = (i + 1) as u8;
        let delimiter = if i + 1 == PARAM_COUNT { RECORD_END } else { ',' };
        *slot = read_numeric_field(&mut cursor, Field::Param(n), delimiter)?;
    }

    Ok(TelemetryRecord {
        id: id.to_string(),
        firmware_version: firmware_version.to_string(),
        topic: topic.to_string(),
        params,
    })
}

fn read_text_field<'a>(cursor: &mut Cursor<'a>, field: Field) -> ParseResult<&'a str> {
    let marker = field.marker().unwrap_or_default();
    cursor
        .skip_past(marker)
        .ok_or(ParseError::MissingMarker { field, marker })?;
    let value = cursor
        .take_until('"')
        .ok_or(ParseError::MissingDelimiter { field, delimiter: '"' })?;

    log::trace!("{} = {}", field, value);
    Ok(value)
}

fn read_numeric_field(cursor: &mut Cursor<'_>, field: Field, delimiter: char) -> ParseResult<f32> {
    cursor
        .skip_past(FIELD_SEPARATOR)
        .ok_or(ParseError::MissingDelimiter { field, delimiter: ',' })?;
    let text = cursor
        .take_until(delimiter)
        .ok_or(ParseError::MissingDelimiter { field, delimiter })?;

    let value = parse_lenient_float(text);
    log::trace!("{} = {:.2}", field, value);
    Ok(value)
}

/// Locale-independent decimal parse that never fails.
///
/// Surrounding whitespace is ignored. If the whole text is not a number, the
/// longest leading `[+-]digits[.digits]` prefix is used (`"12.5V"` → 12.5);
/// text with no leading digits reads as `0.0`. The result is always finite:
/// `nan` and `inf` read as `0.0`.
pub fn parse_lenient_float(text: &str) -> f32 {
    let text = text.trim();
    if let Some(value) = text.parse::<f32>().ok().filter(|v| v.is_finite()) {
        return value;
    }

    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return 0.0;
    }
    text[..end].parse().unwrap_or(0.0)
}

impl FromStr for TelemetryRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_telemetry(s)
    }
}
