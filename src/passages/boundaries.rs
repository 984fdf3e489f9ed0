//! Pericope boundary catalog: (book code, chapter, start, end, summary) rows.

use std::io::Read;

use csv::StringRecord;
use tracing::debug;

use crate::corpus::table::{csv_reader, ColumnIndex};
use crate::errors::Result;

/// One boundary row as published, before resolving against the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageBoundary {
    /// Three-letter book code ("GEN", "1SA", ...).
    pub code: String,
    /// Chapter number.
    pub chapter: u32,
    /// First verse, inclusive.
    pub start_verse: u32,
    /// Last verse, inclusive.
    pub end_verse: u32,
    /// Section heading, cleaned.
    pub summary: String,
}

const COLUMNS: &[&str] = &["Book", "Chapter", "Start Verse", "End Verse", "Summary"];

/// Strip whitespace and trailing semicolons from a heading.
fn clean_summary(s: &str) -> String {
    s.trim().trim_end_matches(';').trim().to_string()
}

fn parse_row(cols: &ColumnIndex, record: &StringRecord) -> Option<PassageBoundary> {
    Some(PassageBoundary {
        code: cols.get(record, 0)?.to_string(),
        chapter: cols.get(record, 1)?.parse().ok()?,
        start_verse: cols.get(record, 2)?.parse().ok()?,
        end_verse: cols.get(record, 3)?.parse().ok()?,
        summary: clean_summary(cols.get(record, 4)?),
    })
}

/// Read every boundary row. Returns the rows plus how many were unparsable.
pub fn read_boundaries<R: Read>(rdr: R) -> Result<(Vec<PassageBoundary>, usize)> {
    let mut reader = csv_reader(rdr);
    let cols = ColumnIndex::resolve(reader.headers()?, COLUMNS)?;

    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!("unreadable pericope row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let parsed = parse_row(&cols, &record);

        match parsed {
            Some(b) => rows.push(b),
            None => skipped += 1,
        }
    }

    Ok((rows, skipped))
}
