//! Cross-reference relations: parsing, resolution, max-vote dedup.

use std::collections::BTreeMap;
use std::io::Read;

use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use crate::corpus::table::{csv_reader, parse_int_lenient, ColumnIndex};
use crate::corpus::{BookCatalog, VerseTable};
use crate::errors::Result;
use crate::types::VerseId;

/// An unordered verse pair with its vote weight. `a < b` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    /// Lower verse id.
    pub a: VerseId,
    /// Higher verse id.
    pub b: VerseId,
    /// Evidentiary weight.
    pub votes: i64,
    /// Endpoints lie in different testaments.
    pub cross_testament: bool,
}

impl CrossReference {
    /// Build from endpoints in any order. `None` for a self-pair.
    pub fn new(x: VerseId, y: VerseId, votes: i64, cross_testament: bool) -> Option<Self> {
        if x == y {
            return None;
        }
        Some(Self {
            a: x.min(y),
            b: x.max(y),
            votes,
            cross_testament,
        })
    }
}

/// Keep, per unordered pair, the first occurrence with the highest votes.
///
/// Output is sorted by pair, so it does not depend on input order except
/// for which of several equal-vote rows supplies the testament flag.
pub fn dedup_max_votes<I>(refs: I) -> Vec<CrossReference>
where
    I: IntoIterator<Item = CrossReference>,
{
    let mut best: BTreeMap<(VerseId, VerseId), CrossReference> = BTreeMap::new();
    for r in refs {
        let key = (r.a, r.b);
        match best.get(&key) {
            Some(existing) if existing.votes >= r.votes => {}
            _ => {
                best.insert(key, r);
            }
        }
    }
    best.into_values().collect()
}

/// Dataset-level counts, before the render threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct XrefSummary {
    /// Unique pairs present.
    pub total_unique: usize,
    /// Unique pairs within one testament.
    pub dataset_intra: usize,
    /// Unique pairs spanning testaments.
    pub dataset_inter: usize,
}

impl XrefSummary {
    /// Count a deduplicated set.
    pub fn of(refs: &[CrossReference]) -> Self {
        let inter = refs.iter().filter(|r| r.cross_testament).count();
        Self {
            total_unique: refs.len(),
            dataset_intra: refs.len() - inter,
            dataset_inter: inter,
        }
    }
}

/// Pairs at or above `min_votes`, most votes first, ties by pair.
pub fn rendered(refs: &[CrossReference], min_votes: i64) -> Vec<CrossReference> {
    let mut out: Vec<_> = refs.iter().copied().filter(|r| r.votes >= min_votes).collect();
    out.sort_by(|x, y| y.votes.cmp(&x.votes).then((x.a, x.b).cmp(&(y.a, y.b))));
    out
}

/// Parsed and deduplicated relation table.
#[derive(Debug, Clone, Default)]
pub struct XrefTable {
    /// Deduplicated pairs, sorted by pair.
    pub refs: Vec<CrossReference>,
    /// Rows with missing or unparsable fields.
    pub malformed: usize,
    /// Rows whose endpoints are not in the corpus, or self-pairs.
    pub unresolved: usize,
}

const COLUMNS: &[&str] = &[
    "From Book",
    "From Chapter",
    "From Verse number",
    "To Verse start Book",
    "To Verse start Chapter",
    "To Verse start number",
    "Votes",
];
const FROM_TESTAMENT: &str = "From Book Testament";
const TO_TESTAMENT: &str = "To Book Testament";

struct RawRow<'r> {
    votes: i64,
    from: (&'r str, u32, u32),
    to: (&'r str, u32, u32),
}

fn parse_row<'r>(cols: &ColumnIndex, rec: &'r StringRecord) -> Option<RawRow<'r>> {
    Some(RawRow {
        votes: cols.get(rec, 6)?.parse().ok()?,
        from: (
            cols.get(rec, 0)?,
            cols.get(rec, 1)?.parse().ok()?,
            cols.get(rec, 2)?.parse().ok()?,
        ),
        to: (
            cols.get(rec, 3)?,
            cols.get(rec, 4)?.parse().ok()?,
            parse_int_lenient(cols.get(rec, 5)?)?,
        ),
    })
}

/// Read the relation CSV and resolve endpoints by book abbreviation.
///
/// Bad rows are skipped and counted, never fatal.
pub fn read_cross_references<R: Read>(
    rdr: R,
    catalog: &BookCatalog,
    verses: &VerseTable,
) -> Result<XrefTable> {
    let mut reader = csv_reader(rdr);
    let headers = reader.headers()?.clone();
    let cols = ColumnIndex::resolve(&headers, COLUMNS)?;
    let testament_cols = ColumnIndex::resolve(&headers, &[FROM_TESTAMENT, TO_TESTAMENT]).ok();

    let mut table = XrefTable::default();
    let mut resolved = Vec::new();

    for record in reader.records() {
        let Ok(record) = record else {
            table.malformed += 1;
            continue;
        };
        let Some(row) = parse_row(&cols, &record) else {
            table.malformed += 1;
            continue;
        };

        let src = verses.find_by_abbrev(catalog.canonical_abbrev(row.from.0), row.from.1, row.from.2);
        let tgt = verses.find_by_abbrev(catalog.canonical_abbrev(row.to.0), row.to.1, row.to.2);

        // A missing testament column compares "" to "", i.e. same testament.
        let cross = match &testament_cols {
            Some(tc) => tc.get(&record, 0).unwrap_or("") != tc.get(&record, 1).unwrap_or(""),
            None => false,
        };

        match (src, tgt) {
            (Some(s), Some(t)) => match CrossReference::new(s, t, row.votes, cross) {
                Some(r) => resolved.push(r),
                None => table.unresolved += 1,
            },
            _ => table.unresolved += 1,
        }
    }

    debug!(
        "cross-references: {} resolved rows, {} malformed, {} unresolved",
        resolved.len(),
        table.malformed,
        table.unresolved
    );
    table.refs = dedup_max_votes(resolved);
    Ok(table)
}
