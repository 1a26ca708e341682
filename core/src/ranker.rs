use std::cmp::Ordering;

use rayon::prelude::*;

use crate::index::{TermWeightVector, TextIndex};
use crate::RowIndex;

/// Cosine similarity of two sparse vectors, clamped to [-1, 1].
/// Zero when either side is the zero vector.
pub fn cosine_similarity(a: &TermWeightVector, b: &TermWeightVector) -> f32 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0)
}

/// Similarity descending, then row index ascending.
fn rank_order(a: &(RowIndex, f32), b: &(RowIndex, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Ranks every indexed title against one query row.
pub struct SimilarityRanker<'a> {
    index: &'a TextIndex,
}

impl<'a> SimilarityRanker<'a> {
    pub fn new(index: &'a TextIndex) -> Self { Self { index } }

    /// Up to `k` rows most similar to `query_row`, never including it.
    pub fn top_similar(&self, query_row: RowIndex, k: usize) -> Vec<RowIndex> {
        self.top_similar_scored(query_row, k).into_iter().map(|(row, _)| row).collect()
    }

    pub fn top_similar_scored(&self, query_row: RowIndex, k: usize) -> Vec<(RowIndex, f32)> {
        let Some(query) = self.index.vector_at(query_row) else {
            return Vec::new();
        };
        let mut scored: Vec<(RowIndex, f32)> = self
            .index
            .vectors()
            .par_iter()
            .enumerate()
            .filter(|(row, _)| *row != query_row)
            .map(|(row, v)| (row, cosine_similarity(query, v)))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k, rank_order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank_order);
        scored
    }
}
