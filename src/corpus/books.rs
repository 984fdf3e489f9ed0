//! Immutable book metadata: names, abbreviations, testaments, genres.
//!
//! Built once at startup and handed to the stages that need it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which half of the canon a book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    /// Old Testament.
    #[serde(rename = "OT")]
    Old,
    /// New Testament.
    #[serde(rename = "NT")]
    New,
}

/// Metadata for one book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMeta {
    /// Full name, e.g. "1 Samuel".
    pub name: String,
    /// Short form used by the cross-reference data, e.g. "1Sam".
    pub abbrev: String,
    /// Canonical order, 1-based.
    pub num: u32,
    /// Testament.
    pub testament: Testament,
    /// Genre label.
    pub genre: String,
}

// (name, abbrev, pericope code, testament, genre)
const BOOKS: &[(&str, &str, &str, Testament, &str)] = &[
    ("Genesis", "Gen", "GEN", Testament::Old, "Law"),
    ("Exodus", "Exod", "EXO", Testament::Old, "Law"),
    ("Leviticus", "Lev", "LEV", Testament::Old, "Law"),
    ("Numbers", "Num", "NUM", Testament::Old, "Law"),
    ("Deuteronomy", "Deut", "DEU", Testament::Old, "Law"),
    ("Joshua", "Josh", "JOS", Testament::Old, "History"),
    ("Judges", "Judg", "JDG", Testament::Old, "History"),
    ("Ruth", "Ruth", "RUT", Testament::Old, "History"),
    ("1 Samuel", "1Sam", "1SA", Testament::Old, "History"),
    ("2 Samuel", "2Sam", "2SA", Testament::Old, "History"),
    ("1 Kings", "1Kgs", "1KI", Testament::Old, "History"),
    ("2 Kings", "2Kgs", "2KI", Testament::Old, "History"),
    ("1 Chronicles", "1Chr", "1CH", Testament::Old, "History"),
    ("2 Chronicles", "2Chr", "2CH", Testament::Old, "History"),
    ("Ezra", "Ezra", "EZR", Testament::Old, "History"),
    ("Nehemiah", "Neh", "NEH", Testament::Old, "History"),
    ("Esther", "Esth", "EST", Testament::Old, "History"),
    ("Job", "Job", "JOB", Testament::Old, "Wisdom"),
    ("Psalms", "Ps", "PSA", Testament::Old, "Wisdom"),
    ("Proverbs", "Prov", "PRO", Testament::Old, "Wisdom"),
    ("Ecclesiastes", "Eccl", "ECC", Testament::Old, "Wisdom"),
    ("Song of Solomon", "Song", "SNG", Testament::Old, "Wisdom"),
    ("Isaiah", "Isa", "ISA", Testament::Old, "Major Prophets"),
    ("Jeremiah", "Jer", "JER", Testament::Old, "Major Prophets"),
    ("Lamentations", "Lam", "LAM", Testament::Old, "Major Prophets"),
    ("Ezekiel", "Ezek", "EZK", Testament::Old, "Major Prophets"),
    ("Daniel", "Dan", "DAN", Testament::Old, "Major Prophets"),
    ("Hosea", "Hos", "HOS", Testament::Old, "Minor Prophets"),
    ("Joel", "Joel", "JOL", Testament::Old, "Minor Prophets"),
    ("Amos", "Amos", "AMO", Testament::Old, "Minor Prophets"),
    ("Obadiah", "Obad", "OBA", Testament::Old, "Minor Prophets"),
    ("Jonah", "Jonah", "JON", Testament::Old, "Minor Prophets"),
    ("Micah", "Mic", "MIC", Testament::Old, "Minor Prophets"),
    ("Nahum", "Nah", "NAM", Testament::Old, "Minor Prophets"),
    ("Habakkuk", "Hab", "HAB", Testament::Old, "Minor Prophets"),
    ("Zephaniah", "Zeph", "ZEP", Testament::Old, "Minor Prophets"),
    ("Haggai", "Hag", "HAG", Testament::Old, "Minor Prophets"),
    ("Zechariah", "Zech", "ZEC", Testament::Old, "Minor Prophets"),
    ("Malachi", "Mal", "MAL", Testament::Old, "Minor Prophets"),
    ("Matthew", "Matt", "MAT", Testament::New, "Gospels"),
    ("Mark", "Mark", "MRK", Testament::New, "Gospels"),
    ("Luke", "Luke", "LUK", Testament::New, "Gospels"),
    ("John", "John", "JHN", Testament::New, "Gospels"),
    ("Acts", "Acts", "ACT", Testament::New, "Acts"),
    ("Romans", "Rom", "ROM", Testament::New, "Pauline Epistles"),
    ("1 Corinthians", "1Cor", "1CO", Testament::New, "Pauline Epistles"),
    ("2 Corinthians", "2Cor", "2CO", Testament::New, "Pauline Epistles"),
    ("Galatians", "Gal", "GAL", Testament::New, "Pauline Epistles"),
    ("Ephesians", "Eph", "EPH", Testament::New, "Pauline Epistles"),
    ("Philippians", "Phil", "PHP", Testament::New, "Pauline Epistles"),
    ("Colossians", "Col", "COL", Testament::New, "Pauline Epistles"),
    ("1 Thessalonians", "1Thess", "1TH", Testament::New, "Pauline Epistles"),
    ("2 Thessalonians", "2Thess", "2TH", Testament::New, "Pauline Epistles"),
    ("1 Timothy", "1Tim", "1TI", Testament::New, "Pauline Epistles"),
    ("2 Timothy", "2Tim", "2TI", Testament::New, "Pauline Epistles"),
    ("Titus", "Titus", "TIT", Testament::New, "Pauline Epistles"),
    ("Philemon", "Phlm", "PHM", Testament::New, "Pauline Epistles"),
    ("Hebrews", "Heb", "HEB", Testament::New, "General Epistles"),
    ("James", "Jas", "JAS", Testament::New, "General Epistles"),
    ("1 Peter", "1Pet", "1PE", Testament::New, "General Epistles"),
    ("2 Peter", "2Pet", "2PE", Testament::New, "General Epistles"),
    ("1 John", "1John", "1JN", Testament::New, "General Epistles"),
    ("2 John", "2John", "2JN", Testament::New, "General Epistles"),
    ("3 John", "3John", "3JN", Testament::New, "General Epistles"),
    ("Jude", "Jude", "JUD", Testament::New, "General Epistles"),
    ("Revelation", "Rev", "REV", Testament::New, "Apocalyptic"),
];

const GENRE_COLORS: &[(&str, &str)] = &[
    ("Law", "#e6c865"),
    ("History", "#7cb5a0"),
    ("Wisdom", "#c490d1"),
    ("Major Prophets", "#e07a5f"),
    ("Minor Prophets", "#f2a65a"),
    ("Gospels", "#5b9bd5"),
    ("Acts", "#45a0a0"),
    ("Pauline Epistles", "#8bc34a"),
    ("General Epistles", "#4dd0e1"),
    ("Apocalyptic", "#ef5350"),
];

// Spellings seen in the cross-reference dataset that differ from ours.
const ABBREV_ALIASES: &[(&str, &str)] = &[
    ("Psa", "Ps"),
    ("Psm", "Ps"),
    ("SOS", "Song"),
    ("Sol", "Song"),
    ("Phm", "Phlm"),
];

/// Lookup tables over the 66-book canon.
#[derive(Debug, Clone)]
pub struct BookCatalog {
    books: Vec<BookMeta>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    genre_colors: Vec<(String, String)>,
}

impl BookCatalog {
    /// The standard Protestant canon.
    pub fn standard() -> Self {
        let mut books = Vec::with_capacity(BOOKS.len());
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();

        for (i, &(name, abbrev, code, testament, genre)) in BOOKS.iter().enumerate() {
            books.push(BookMeta {
                name: name.to_string(),
                abbrev: abbrev.to_string(),
                num: i as u32 + 1,
                testament,
                genre: genre.to_string(),
            });
            by_name.insert(name.to_string(), i);
            by_code.insert(code.to_string(), i);
        }

        let aliases = ABBREV_ALIASES
            .iter()
            .map(|&(from, to)| (from.to_string(), to.to_string()))
            .collect();
        let genre_colors = GENRE_COLORS
            .iter()
            .map(|&(g, c)| (g.to_string(), c.to_string()))
            .collect();

        Self {
            books,
            by_name,
            by_code,
            aliases,
            genre_colors,
        }
    }

    /// All books in canonical order.
    pub fn books(&self) -> &[BookMeta] {
        &self.books
    }

    /// Number of books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Look up by full name.
    pub fn by_name(&self, name: &str) -> Option<&BookMeta> {
        self.by_name.get(name).map(|&i| &self.books[i])
    }

    /// Look up by three-letter pericope code ("GEN", "1SA", ...).
    pub fn by_code(&self, code: &str) -> Option<&BookMeta> {
        self.by_code.get(code).map(|&i| &self.books[i])
    }

    /// Map a cross-reference abbreviation onto ours, passing unknown ones through.
    pub fn canonical_abbrev<'a>(&'a self, abbrev: &'a str) -> &'a str {
        self.aliases.get(abbrev).map(String::as_str).unwrap_or(abbrev)
    }

    /// Genre colour table in display order.
    pub fn genre_colors(&self) -> &[(String, String)] {
        &self.genre_colors
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
