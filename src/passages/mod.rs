//! Passage (pericope) records and their pooled embeddings.

pub mod boundaries;
pub mod pooler;

pub use boundaries::{read_boundaries, PassageBoundary};
pub use pooler::pool;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::{BookCatalog, Testament, VerseTable};
use crate::errors::{Result, VersemapError};
use crate::types::VerseId;

/// One passage as written to the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Position in the manifest and row in the passage embedding file.
    pub id: usize,
    /// Section heading.
    pub title: String,
    /// Display reference, e.g. "Genesis 1:1–1:3".
    #[serde(rename = "ref")]
    pub reference: String,
    /// Full book name.
    pub book: String,
    /// Canonical book number.
    pub book_num: u32,
    /// Testament.
    pub testament: Testament,
    /// Chapter.
    pub chapter: u32,
    /// First verse as published.
    pub start_verse: u32,
    /// Last verse as published.
    pub end_verse: u32,
    /// Member verses present in the corpus.
    pub verse_ids: Vec<VerseId>,
    /// `verse_ids.len()`.
    pub n_verses: usize,
    /// Member texts joined by spaces.
    pub text: String,
    /// Secondary translation, joined, when any member has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_bsb: Option<String>,
}

/// Resolved passages, one pooled row per passage.
#[derive(Debug, Clone)]
pub struct PassageSet {
    /// Manifest records.
    pub passages: Vec<Passage>,
    /// Mean member embedding per passage (not normalised).
    pub embeddings: Array2<f32>,
    /// Boundaries dropped for an unknown book or no resolvable verses.
    pub skipped: usize,
}

fn format_reference(book: &str, chapter: u32, start: u32, end: u32) -> String {
    if start == end {
        format!("{} {}:{}", book, chapter, start)
    } else {
        format!("{} {}:{}–{}:{}", book, chapter, start, chapter, end)
    }
}

/// Resolve boundaries against the corpus and pool each passage's vectors.
///
/// Boundaries naming an unknown book, or resolving to no verses, are
/// dropped and counted in [`PassageSet::skipped`].
pub fn build_passages(
    boundaries: &[PassageBoundary],
    catalog: &BookCatalog,
    verses: &VerseTable,
    embeddings: &Array2<f32>,
) -> Result<PassageSet> {
    if embeddings.nrows() != verses.len() {
        return Err(VersemapError::Shape(format!(
            "{} embeddings vs {} verses",
            embeddings.nrows(),
            verses.len()
        )));
    }

    let dim = embeddings.ncols();
    let mut passages = Vec::new();
    let mut pooled: Vec<f32> = Vec::new();
    let mut skipped = 0;

    for b in boundaries {
        let Some(book) = catalog.by_code(&b.code) else {
            debug!("unknown pericope book code '{}'", b.code);
            skipped += 1;
            continue;
        };

        let members =
            verses.verses_in_range(&book.name, b.chapter, b.start_verse, b.end_verse);

        let mean = match pool(&members, embeddings) {
            Ok(m) => m,
            Err(VersemapError::EmptyPassage) => {
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        pooled.extend(mean.iter());

        let member_verses: Vec<_> = members.iter().filter_map(|&i| verses.get(i)).collect();
        let text = member_verses
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let bsb = member_verses
            .iter()
            .filter_map(|v| v.text_bsb.as_deref())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        passages.push(Passage {
            id: passages.len(),
            title: b.summary.clone(),
            reference: format_reference(&book.name, b.chapter, b.start_verse, b.end_verse),
            book: book.name.clone(),
            book_num: book.num,
            testament: book.testament,
            chapter: b.chapter,
            start_verse: b.start_verse,
            end_verse: b.end_verse,
            n_verses: members.len(),
            verse_ids: members,
            text,
            text_bsb: if bsb.is_empty() { None } else { Some(bsb) },
        });
    }

    let embeddings = Array2::from_shape_vec((passages.len(), dim), pooled)
        .map_err(|e| VersemapError::Shape(e.to_string()))?;

    Ok(PassageSet {
        passages,
        embeddings,
        skipped,
    })
}
