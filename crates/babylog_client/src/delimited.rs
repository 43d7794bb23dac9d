//! Delimited-text decoding into a positional [`RawTable`].
//!
//! The first non-blank line is the header. A data row shorter than the header
//! is padded with empty cells, since whitespace-separated logs have no other
//! way to leave a trailing cell blank. A row wider than the header is a parse
//! failure for the whole table.

use crate::{DataSourceError, RawTable};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// Runs of spaces or tabs, the format the logs are kept in.
    Whitespace,
    Comma,
    Tab,
    Semicolon,
}

impl Delimiter {
    fn byte(self) -> Option<u8> {
        match self {
            Delimiter::Whitespace => None,
            Delimiter::Comma => Some(b','),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Semicolon => Some(b';'),
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whitespace" | "space" | "" => Ok(Delimiter::Whitespace),
            "comma" | "," => Ok(Delimiter::Comma),
            "tab" | "\\t" => Ok(Delimiter::Tab),
            "semicolon" | ";" => Ok(Delimiter::Semicolon),
            other => Err(format!("unsupported delimiter: {other}")),
        }
    }
}

/// Decode `bytes` as UTF-8 delimited text.
pub fn parse_table(bytes: &[u8], delimiter: Delimiter) -> Result<RawTable, DataSourceError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DataSourceError::Parse(format!("table is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    match delimiter.byte() {
        None => parse_whitespace(text),
        Some(b) => parse_csv(text, b),
    }
}

fn parse_whitespace(text: &str) -> Result<RawTable, DataSourceError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(DataSourceError::Parse("table has no header row".into()));
    };
    let headers: Vec<String> = header.split_whitespace().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let cells = line.split_whitespace().map(str::to_string).collect();
        rows.push(fit_row(cells, headers.len(), idx + 1)?);
    }
    Ok(RawTable::new(headers, rows))
}

fn fit_row(
    mut cells: Vec<String>,
    width: usize,
    line: usize,
) -> Result<Vec<String>, DataSourceError> {
    if cells.len() > width {
        return Err(DataSourceError::Parse(format!(
            "line {line}: expected at most {width} fields, found {}",
            cells.len()
        )));
    }
    cells.resize(width, String::new());
    Ok(cells)
}

fn parse_csv(text: &str, delimiter: u8) -> Result<RawTable, DataSourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DataSourceError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DataSourceError::Parse("table has no header row".into()));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DataSourceError::Parse(e.to_string()))?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        let cells = record.iter().map(str::to_string).collect();
        rows.push(fit_row(cells, headers.len(), line)?);
    }
    Ok(RawTable::new(headers, rows))
}
