//! CSV text <-> header-keyed rows.
//!
//! Decoding is a single character scan with one "inside quotes" flag. It is
//! deliberately lenient: a quote anywhere outside a quoted section opens one,
//! `\r` is dropped, and short rows are padded with empty cells. Encoding always
//! quotes every cell so that decoding its output gives back the same strings.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{PocketError, Result};

/// One record keyed by column name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`, keeping its original position if it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Parses `text`; the first record is the header. Blank lines are skipped.
pub fn decode(text: &str) -> Vec<Row> {
    let mut records = split_records(text).into_iter();
    let Some(header) = records.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    records
        .filter(|cells| !(cells.len() == 1 && cells[0].is_empty()))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(ix, h)| {
                    let value = cells.get(ix).map(|c| c.trim()).unwrap_or("");
                    (h.clone(), value.to_string())
                })
                .collect::<Row>()
        })
        .collect()
}

fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(ch),
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut cell)),
                '\n' => {
                    record.push(std::mem::take(&mut cell));
                    records.push(std::mem::take(&mut record));
                }
                '\r' => {}
                _ => cell.push(ch),
            }
        }
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }
    records
}

/// Line breaks inside a cell become a single space.
fn flatten(value: &str) -> String {
    value.replace("\r\n", " ").replace('\n', " ")
}

/// Writes a header line plus one line per row, every cell quoted. Column order is the
/// key order of the first row; lines are joined by `\n` with no trailing newline.
pub fn encode(rows: &[Row]) -> Result<String> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<&str> = first.keys().collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(headers.iter().map(|h| flatten(h)))?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| flatten(row.get(h).unwrap_or(""))))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8(bytes).map_err(|e| PocketError::Other(e.to_string()))?;
    Ok(text.trim_end_matches('\n').to_string())
}
