//! The most typical verse of each book.

use ndarray::Array2;
use serde::Serialize;

use super::{group_by_book, mean_of_rows};
use crate::corpus::{BookCatalog, Testament, VerseTable};
use crate::errors::{Result, VersemapError};
use crate::utils::{l2_norm, normalize, round_to};

/// A book's representative verse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepresentativeVerse {
    /// Book number.
    pub book_num: u32,
    /// Book name.
    pub book: String,
    /// Testament.
    pub testament: Testament,
    /// Verse reference.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Verse text.
    pub text: String,
    /// Cosine to the book's mean embedding.
    pub similarity: f64,
    /// Verses in the book.
    pub n_verses: usize,
}

/// For every book with verses, the verse closest in cosine to the book's
/// mean embedding. Ties go to the earliest verse.
pub fn representative_verses(
    catalog: &BookCatalog,
    verses: &VerseTable,
    embeddings: &Array2<f32>,
    decimals: u32,
) -> Result<Vec<RepresentativeVerse>> {
    if embeddings.nrows() != verses.len() {
        return Err(VersemapError::Shape(format!(
            "{} embeddings vs {} verses",
            embeddings.nrows(),
            verses.len()
        )));
    }

    let groups = group_by_book(verses);
    let mut out = Vec::new();

    for book in catalog.books() {
        let Some(ids) = groups.get(&book.num) else {
            continue;
        };
        let mean = mean_of_rows(embeddings, ids);
        let mean_dir = &mean / (l2_norm(mean.view()) + 1e-8);

        let mut best: Option<(usize, f32)> = None;
        for &i in ids {
            let sim = normalize(embeddings.row(i)).dot(&mean_dir);
            match best {
                Some((_, s)) if s >= sim => {}
                _ => best = Some((i, sim)),
            }
        }

        if let Some((i, sim)) = best {
            let v = &verses.verses()[i];
            out.push(RepresentativeVerse {
                book_num: book.num,
                book: book.name.clone(),
                testament: book.testament,
                reference: v.reference.clone(),
                text: v.text.clone(),
                similarity: round_to(sim as f64, decimals),
                n_verses: ids.len(),
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::verses::fixtures::sample_table;
    use ndarray::array;

    #[test]
    fn test_picks_closest_to_mean() {
        let table = sample_table();
        let catalog = BookCatalog::standard();
        let emb = array![
            [1.0f32, 0.0],
            [0.0, 1.0],
            [1.0, 1.0], // Genesis mean direction is (1, 1)
            [0.0, 0.0],
            [5.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0]
        ];
        let reps = representative_verses(&catalog, &table, &emb, 4).unwrap();
        assert_eq!(reps.len(), 3);

        assert_eq!(reps[0].book, "Genesis");
        assert_eq!(reps[0].reference, "Genesis 1:3");
        assert_eq!(reps[0].n_verses, 4);
        assert_eq!(reps[0].similarity, 1.0);

        assert_eq!(reps[1].book, "Psalms");
        assert_eq!(reps[1].similarity, 1.0);

        // John: identical rows, first wins.
        assert_eq!(reps[2].reference, "John 1:1");
        assert_eq!(reps[2].testament, Testament::New);
    }
}
