//! Verse records and reference lookups.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::books::Testament;
use crate::errors::{Result, VersemapError};
use crate::types::VerseId;

/// One verse as produced by the corpus fetch step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    /// Dense zero-based id, equal to the verse's position in the corpus.
    pub id: VerseId,
    /// Full book name.
    pub book: String,
    /// Book abbreviation.
    pub book_abbrev: String,
    /// Canonical book number.
    pub book_num: u32,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Primary translation text.
    pub text: String,
    /// Testament.
    pub testament: Testament,
    /// Genre label.
    #[serde(default)]
    pub genre: String,
    /// Display reference, "Book ch:v".
    #[serde(rename = "ref")]
    pub reference: String,
    /// Secondary translation text, if merged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_bsb: Option<String>,
}

/// The verse corpus plus (book, chapter, verse) lookups.
#[derive(Debug, Clone)]
pub struct VerseTable {
    verses: Vec<Verse>,
    by_name: HashMap<(String, u32, u32), VerseId>,
    by_abbrev: HashMap<(String, u32, u32), VerseId>,
    by_chapter: HashMap<(String, u32), Vec<VerseId>>,
}

impl VerseTable {
    /// Build from records whose ids must equal their positions.
    pub fn new(verses: Vec<Verse>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(verses.len());
        let mut by_abbrev = HashMap::with_capacity(verses.len());
        let mut by_chapter: HashMap<(String, u32), Vec<VerseId>> = HashMap::new();

        for (i, v) in verses.iter().enumerate() {
            if v.id != i {
                return Err(VersemapError::Shape(format!(
                    "verse ids must be dense and ordered: position {} has id {}",
                    i, v.id
                )));
            }
            let chapter = by_chapter.entry((v.book.clone(), v.chapter)).or_default();
            match by_name.insert((v.book.clone(), v.chapter, v.verse), i) {
                // Later duplicates replace earlier ones, as in the name lookup.
                Some(prev) => {
                    if let Some(slot) = chapter.iter_mut().find(|id| **id == prev) {
                        *slot = i;
                    }
                }
                None => chapter.push(i),
            }
            by_abbrev.insert((v.book_abbrev.clone(), v.chapter, v.verse), i);
        }
        for ids in by_chapter.values_mut() {
            ids.sort_by_key(|&i| verses[i].verse);
        }

        Ok(Self {
            verses,
            by_name,
            by_abbrev,
            by_chapter,
        })
    }

    /// Load `verses.json`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VersemapError::MissingArtifact {
                stage: "corpus",
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        let verses: Vec<Verse> = serde_json::from_reader(reader)?;
        Self::new(verses)
    }

    /// All verses in id order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Number of verses.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Verse by id.
    pub fn get(&self, id: VerseId) -> Option<&Verse> {
        self.verses.get(id)
    }

    /// Resolve a reference by full book name.
    pub fn find_by_name(&self, book: &str, chapter: u32, verse: u32) -> Option<VerseId> {
        self.by_name.get(&(book.to_string(), chapter, verse)).copied()
    }

    /// Ids of `book` `chapter`'s verses numbered `start..=end`, in verse order.
    ///
    /// Cost is bounded by the chapter's size, not by the width of the range.
    pub fn verses_in_range(&self, book: &str, chapter: u32, start: u32, end: u32) -> Vec<VerseId> {
        self.by_chapter
            .get(&(book.to_string(), chapter))
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&i| (start..=end).contains(&self.verses[i].verse))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve a reference by book abbreviation.
    pub fn find_by_abbrev(&self, abbrev: &str, chapter: u32, verse: u32) -> Option<VerseId> {
        self.by_abbrev
            .get(&(abbrev.to_string(), chapter, verse))
            .copied()
    }

    /// Count of verses per testament, (old, new).
    pub fn testament_counts(&self) -> (usize, usize) {
        let old = self
            .verses
            .iter()
            .filter(|v| v.testament == Testament::Old)
            .count();
        (old, self.verses.len() - old)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Small corpus: Gen 1:1-3, Gen 2:1, Ps 23:1, John 1:1-2.
    pub fn sample_verses() -> Vec<Verse> {
        let rows: &[(&str, &str, u32, u32, u32, Testament, &str)] = &[
            ("Genesis", "Gen", 1, 1, 1, Testament::Old, "In the beginning"),
            ("Genesis", "Gen", 1, 1, 2, Testament::Old, "And the earth"),
            ("Genesis", "Gen", 1, 1, 3, Testament::Old, "Let there be light"),
            ("Genesis", "Gen", 1, 2, 1, Testament::Old, "Thus the heavens"),
            ("Psalms", "Ps", 19, 23, 1, Testament::Old, "The LORD is my shepherd"),
            ("John", "John", 43, 1, 1, Testament::New, "In the beginning was the Word"),
            ("John", "John", 43, 1, 2, Testament::New, "The same was in the beginning"),
        ];
        rows.iter()
            .enumerate()
            .map(|(i, &(book, abbrev, num, ch, vs, testament, text))| Verse {
                id: i,
                book: book.to_string(),
                book_abbrev: abbrev.to_string(),
                book_num: num,
                chapter: ch,
                verse: vs,
                text: text.to_string(),
                testament,
                genre: String::new(),
                reference: format!("{} {}:{}", book, ch, vs),
                text_bsb: None,
            })
            .collect()
    }

    pub fn sample_table() -> VerseTable {
        VerseTable::new(sample_verses()).unwrap()
    }
}
