//! Corpus inputs produced upstream: verse records, book metadata, `.npy` matrices.

/// Book metadata tables.
pub mod books;
/// `.npy` matrix I/O.
pub mod arrays;
/// Header-indexed CSV access.
pub mod table;
/// Verse records and lookups.
pub mod verses;

pub use books::{BookCatalog, BookMeta, Testament};
pub use verses::{Verse, VerseTable};
