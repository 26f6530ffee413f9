use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{models::PlayerStat, ParseError};

/// Field separator shared by the parser and the CSV export
pub const DELIMITER: char = ',';

/// Positional columns: governorId, name, power, kills, deaths, t5Kills, dkp
const FIELD_COUNT: usize = 7;

/// Largest count every storage backend can hold (Postgres `BIGINT`)
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// Decodes raw upload bytes and parses them into player records
pub fn parse_bytes(raw: &[u8]) -> Result<Vec<PlayerStat>, ParseError> {
    let text = std::str::from_utf8(raw)?;
    Ok(parse(text))
}

/// Parses delimited text into player records.
///
/// The first row is a header and is always skipped. Rows that do not have
/// exactly seven fields, or whose governor id or name is blank, are dropped.
/// String fields are kept exactly as written. Numeric fields are read like
/// `parseInt`: the leading run of digits counts and anything else becomes `0`
/// without dropping the row. When a governor id repeats, the later row
/// replaces the earlier one in place.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse(text: &str) -> Vec<PlayerStat> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records: Vec<PlayerStat> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for (index, line) in text.split('\n').enumerate().skip(1) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let Some(stat) = parse_row(line) else {
            debug!(line = index + 1, "Dropping malformed row");
            dropped += 1;
            continue;
        };

        match positions.get(&stat.governor_id) {
            Some(&existing) => {
                debug!(governor_id = %stat.governor_id, "Duplicate governor id, keeping later row");
                records[existing] = stat;
            }
            None => {
                positions.insert(stat.governor_id.clone(), records.len());
                records.push(stat);
            }
        }
    }

    debug!(parsed = records.len(), dropped, "Parsed player stats");
    records
}

fn parse_row(line: &str) -> Option<PlayerStat> {
    let fields = split_row(line);
    if fields.len() != FIELD_COUNT {
        return None;
    }

    if fields[0].trim().is_empty() || fields[1].trim().is_empty() {
        return None;
    }

    Some(PlayerStat {
        governor_id: fields[0].to_string(),
        name: fields[1].to_string(),
        power: parse_count(&fields[2]),
        kills: parse_count(&fields[3]),
        deaths: parse_count(&fields[4]),
        t5_kills: parse_count(&fields[5]),
        dkp: parse_count(&fields[6]),
    })
}

/// Leading digits of the field after optional whitespace and `+`, capped at
/// [`MAX_COUNT`]. No digits (including a leading `-`) reads as `0`.
fn parse_count(field: &str) -> u64 {
    let field = field.trim_start();
    let unsigned = field.strip_prefix('+').unwrap_or(field);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];

    if digits.is_empty() {
        return 0;
    }
    // only overflow can fail on a pure digit run
    digits.parse::<u64>().map_or(MAX_COUNT, |n| n.min(MAX_COUNT))
}

/// Splits a row on the delimiter. A field that starts with `"` is quoted: it
/// runs up to a lone `"` followed by a delimiter or end of row, and `""`
/// inside it stands for one `"`. This is how the export writes values it
/// cannot leave bare. A quoted field that never closes, and quotes anywhere
/// else, are read literally.
fn split_row(line: &str) -> Vec<Cow<'_, str>> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut rest = line;

    loop {
        if let Some((value, after)) = rest.strip_prefix('"').and_then(read_quoted) {
            fields.push(Cow::Owned(value));
            match after.strip_prefix(DELIMITER) {
                Some(next) => {
                    rest = next;
                    continue;
                }
                None => return fields,
            }
        }

        match rest.split_once(DELIMITER) {
            Some((field, next)) => {
                fields.push(Cow::Borrowed(field));
                rest = next;
            }
            None => {
                fields.push(Cow::Borrowed(rest));
                return fields;
            }
        }
    }
}

/// Unescapes the body of a quoted field. Returns the value and the text after
/// the closing quote, or `None` when no closing quote exists.
fn read_quoted(body: &str) -> Option<(String, &str)> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '"' {
            value.push(c);
            continue;
        }
        match chars.peek() {
            Some(&(_, '"')) => {
                value.push('"');
                chars.next();
            }
            Some(&(_, next)) if next != DELIMITER => value.push('"'),
            _ => return Some((value, &body[i + 1..])),
        }
    }

    None
}
