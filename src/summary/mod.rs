//! Book-level summaries over verse embeddings.

pub mod heatmap;
pub mod representatives;

pub use heatmap::{book_heatmap, BookHeatmap};
pub use representatives::{representative_verses, RepresentativeVerse};

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::corpus::VerseTable;
use crate::types::VerseId;

/// Verse ids per book number, in id order.
pub(crate) fn group_by_book(verses: &VerseTable) -> BTreeMap<u32, Vec<VerseId>> {
    let mut groups: BTreeMap<u32, Vec<VerseId>> = BTreeMap::new();
    for v in verses.verses() {
        groups.entry(v.book_num).or_default().push(v.id);
    }
    groups
}

/// Mean of the selected rows; zeros when `ids` is empty.
pub(crate) fn mean_of_rows(embeddings: &Array2<f32>, ids: &[VerseId]) -> Array1<f32> {
    let mut sum = Array1::<f32>::zeros(embeddings.ncols());
    if ids.is_empty() {
        return sum;
    }
    for &i in ids {
        sum += &embeddings.row(i);
    }
    sum / ids.len() as f32
}
