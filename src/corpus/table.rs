//! Header-addressed access to externally maintained CSV tables.

use std::io::Read;

use csv::StringRecord;

use crate::errors::{Result, VersemapError};

/// Column positions for a fixed set of required headers.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    /// Locate every `required` header; a missing one fails the whole table.
    pub fn resolve(headers: &StringRecord, required: &[&str]) -> Result<Self> {
        let mut positions = Vec::with_capacity(required.len());
        for &name in required {
            let pos = headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| VersemapError::Shape(format!("missing CSV column '{}'", name)))?;
            positions.push(pos);
        }
        Ok(Self { positions })
    }

    /// Field for the `i`-th required column, trimmed. `None` if the row is short.
    pub fn get<'r>(&self, record: &'r StringRecord, i: usize) -> Option<&'r str> {
        record.get(self.positions[i]).map(str::trim)
    }
}

/// Parse an integer that may have been written as a float ("3.0").
pub fn parse_int_lenient(s: &str) -> Option<u32> {
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 {
        Some(f.trunc() as u32)
    } else {
        None
    }
}

/// Open a CSV reader that tolerates ragged rows.
pub fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(rdr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_int() {
        assert_eq!(parse_int_lenient("12"), Some(12));
        assert_eq!(parse_int_lenient("3.0"), Some(3));
        assert_eq!(parse_int_lenient("x"), None);
        assert_eq!(parse_int_lenient("-1"), None);
    }

    #[test]
    fn test_missing_column_is_error() {
        let mut rdr = csv_reader("A,B\n1,2\n".as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert!(ColumnIndex::resolve(&headers, &["A", "C"]).is_err());
        let idx = ColumnIndex::resolve(&headers, &["B", "A"]).unwrap();
        let rec = rdr.records().next().unwrap().unwrap();
        assert_eq!(idx.get(&rec, 0), Some("2"));
        assert_eq!(idx.get(&rec, 1), Some("1"));
    }
}
