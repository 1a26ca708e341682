//! TF-IDF term-weight vectors over film titles.
//!
//! Weighting for a term `t` in title `d`, with `n` titles in total:
//!
//! * `tf(t, d)`: raw occurrence count ([`TfMode::Raw`]) or `1 + ln(count)`
//!   ([`TfMode::Sublinear`]);
//! * `idf(t)`: `ln((1 + n) / (1 + df)) + 1` ([`IdfMode::Smooth`]) or `ln(n / df)`
//!   ([`IdfMode::Plain`]);
//! * every vector is L2-normalized, so cosine similarity between two non-empty
//!   titles is their dot product. Titles without tokens get the zero vector.

use std::collections::{BTreeSet, HashMap};

use crate::tokenizer::tokenize;
use crate::{RowIndex, TermId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TfMode {
    #[default]
    Raw,
    Sublinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdfMode {
    #[default]
    Smooth,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TfidfConfig {
    pub tf: TfMode,
    pub idf: IdfMode,
}

impl TfidfConfig {
    fn tf(&self, count: u32) -> f32 {
        match self.tf {
            TfMode::Raw => count as f32,
            TfMode::Sublinear if count > 0 => 1.0 + (count as f32).ln(),
            TfMode::Sublinear => 0.0,
        }
    }

    fn idf(&self, n: u32, df: u32) -> f32 {
        let (n, df) = (n as f32, df.max(1) as f32);
        match self.idf {
            IdfMode::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfMode::Plain => (n / df).ln(),
        }
    }
}

/// Sparse vector as parallel arrays, `terms` strictly ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermWeightVector {
    terms: Vec<TermId>,
    weights: Vec<f32>,
}

impl TermWeightVector {
    /// Build from unordered `(term, weight)` pairs; duplicate terms are summed.
    pub fn from_pairs(mut pairs: Vec<(TermId, f32)>) -> Self {
        pairs.sort_by_key(|(t, _)| *t);
        let mut terms: Vec<TermId> = Vec::with_capacity(pairs.len());
        let mut weights: Vec<f32> = Vec::with_capacity(pairs.len());
        for (t, w) in pairs {
            if terms.last() == Some(&t) {
                if let Some(last) = weights.last_mut() { *last += w; }
            } else {
                terms.push(t);
                weights.push(w);
            }
        }
        Self { terms, weights }
    }

    pub fn terms(&self) -> &[TermId] { &self.terms }

    pub fn weights(&self) -> &[f32] { &self.weights }

    pub fn weight(&self, term: TermId) -> f32 {
        self.terms.binary_search(&term).map(|i| self.weights[i]).unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool { self.weights.iter().all(|w| *w == 0.0) }

    pub fn norm(&self) -> f32 { self.weights.iter().map(|w| w * w).sum::<f32>().sqrt() }

    pub fn dot(&self, other: &TermWeightVector) -> f32 {
        let mut sum = 0.0f32;
        let (mut i, mut j) = (0, 0);
        while i < self.terms.len() && j < other.terms.len() {
            match self.terms[i].cmp(&other.terms[j]) {
                std::cmp::Ordering::Equal => {
                    sum += self.weights[i] * other.weights[j];
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for w in self.weights.iter_mut() { *w /= norm; }
        }
    }
}

/// Fixed term → column mapping. Columns follow lexicographic term order.
#[derive(Debug, Default)]
pub struct Vocabulary {
    columns: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Vocabulary {
    fn from_terms(terms: BTreeSet<String>) -> Self {
        let terms: Vec<String> = terms.into_iter().collect();
        let columns = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as TermId)).collect();
        Self { columns, terms }
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn column(&self, term: &str) -> Option<TermId> { self.columns.get(term).copied() }

    pub fn term(&self, column: TermId) -> Option<&str> {
        self.terms.get(column as usize).map(String::as_str)
    }
}

/// One precomputed vector per title, built once and never modified.
#[derive(Debug, Default)]
pub struct TextIndex {
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    vectors: Vec<TermWeightVector>,
}

impl TextIndex {
    pub fn build<'a, I>(titles: I, config: &TfidfConfig) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenized: Vec<Vec<String>> = titles.into_iter().map(tokenize).collect();
        let vocabulary = Vocabulary::from_terms(tokenized.iter().flatten().cloned().collect());

        // Term frequencies per title, then document frequency per column
        let mut df: Vec<u32> = vec![0; vocabulary.len()];
        let mut tf_rows: Vec<HashMap<TermId, u32>> = Vec::with_capacity(tokenized.len());
        for tokens in &tokenized {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for token in tokens {
                if let Some(col) = vocabulary.column(token) {
                    *tf_counts.entry(col).or_insert(0) += 1;
                }
            }
            for col in tf_counts.keys() { df[*col as usize] += 1; }
            tf_rows.push(tf_counts);
        }

        let n = tokenized.len() as u32;
        let idf: Vec<f32> = df.iter().map(|d| config.idf(n, *d)).collect();
        let vectors = tf_rows
            .into_iter()
            .map(|tf_counts| {
                let pairs = tf_counts
                    .into_iter()
                    .map(|(col, count)| (col, config.tf(count) * idf[col as usize]))
                    .collect();
                let mut v = TermWeightVector::from_pairs(pairs);
                v.l2_normalize();
                v
            })
            .collect();

        Self { vocabulary, idf, vectors }
    }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    pub fn vector_at(&self, row: RowIndex) -> Option<&TermWeightVector> { self.vectors.get(row) }

    pub fn vectors(&self) -> &[TermWeightVector] { &self.vectors }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.column(term).map(|col| self.idf[col as usize])
    }
}
