//! Book-by-book cosine similarity of mean embeddings.

use ndarray::Array2;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::{group_by_book, mean_of_rows};
use crate::corpus::{BookCatalog, VerseTable};
use crate::errors::{Result, VersemapError};
use crate::utils::{l2_norm, round_to};

/// Book label row of the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapBook {
    /// Book name.
    pub name: String,
    /// Abbreviation.
    pub abbrev: String,
    /// Genre.
    pub genre: String,
}

/// Square similarity matrix in canonical book order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookHeatmap {
    /// Axis labels.
    pub books: Vec<HeatmapBook>,
    /// `matrix[i][j]` = cosine of book i's and book j's mean embeddings.
    pub matrix: Vec<Vec<f64>>,
    /// Genre to colour, in display order.
    #[serde(serialize_with = "ordered_map")]
    pub genre_colors: Vec<(String, String)>,
}

fn ordered_map<S: Serializer>(pairs: &[(String, String)], s: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

/// Cosine similarity between every pair of per-book mean embeddings.
///
/// A book with no verses has a zero mean and scores 0 against everything.
pub fn book_heatmap(
    catalog: &BookCatalog,
    verses: &VerseTable,
    embeddings: &Array2<f32>,
    decimals: u32,
) -> Result<BookHeatmap> {
    if embeddings.nrows() != verses.len() {
        return Err(VersemapError::Shape(format!(
            "{} embeddings vs {} verses",
            embeddings.nrows(),
            verses.len()
        )));
    }

    let groups = group_by_book(verses);
    let means: Vec<_> = catalog
        .books()
        .iter()
        .map(|b| {
            let ids = groups.get(&b.num).map(Vec::as_slice).unwrap_or(&[]);
            mean_of_rows(embeddings, ids)
        })
        .collect();
    let norms: Vec<f32> = means.iter().map(|m| l2_norm(m.view())).collect();

    let matrix = (0..means.len())
        .map(|i| {
            (0..means.len())
                .map(|j| {
                    let cos = means[i].dot(&means[j]) as f64
                        / (norms[i] as f64 * norms[j] as f64 + 1e-10);
                    round_to(cos, decimals)
                })
                .collect()
        })
        .collect();

    Ok(BookHeatmap {
        books: catalog
            .books()
            .iter()
            .map(|b| HeatmapBook {
                name: b.name.clone(),
                abbrev: b.abbrev.clone(),
                genre: b.genre.clone(),
            })
            .collect(),
        matrix,
        genre_colors: catalog.genre_colors().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::verses::fixtures::sample_table;
    use ndarray::array;

    #[test]
    fn test_heatmap_values() {
        let table = sample_table();
        let catalog = BookCatalog::standard();
        let emb = array![
            [1.0f32, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 1.0]
        ];
        let hm = book_heatmap(&catalog, &table, &emb, 4).unwrap();
        assert_eq!(hm.matrix.len(), 66);
        assert_eq!(hm.books[0].abbrev, "Gen");

        let gen = 0;
        let ps = 18;
        let john = 42;
        assert_eq!(hm.matrix[gen][gen], 1.0);
        assert_eq!(hm.matrix[gen][ps], 0.0);
        assert_eq!(hm.matrix[gen][john], 0.7071);
        assert_eq!(hm.matrix[john][gen], 0.7071);
        // Exodus has no verses.
        assert_eq!(hm.matrix[1][gen], 0.0);
    }

    #[test]
    fn test_genre_colors_keep_order() {
        let table = sample_table();
        let catalog = BookCatalog::standard();
        let emb = Array2::<f32>::ones((7, 2));
        let hm = book_heatmap(&catalog, &table, &emb, 4).unwrap();
        let json = serde_json::to_string(&hm).unwrap();
        assert!(json.contains(r##""genre_colors":{"Law":"#e6c865","History":"#7cb5a0""##));
    }
}
