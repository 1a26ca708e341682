use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use crate::dataset::DatasetStore;
use crate::error::QueryError;
use crate::index::{TextIndex, TfidfConfig};
use crate::loader::{load_films, LoaderConfig};
use crate::month::parse_month;
use crate::ranker::SimilarityRanker;
use crate::{FilmRecord, RowIndex};

/// Number of titles returned by a recommendation.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// First title match and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleScore {
    pub title: String,
    pub score: f64,
}

/// Query context shared by all requests. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Catalog {
    store: DatasetStore,
    index: TextIndex,
}

impl Catalog {
    pub fn build(records: Vec<FilmRecord>, config: &TfidfConfig) -> Self {
        let start = Instant::now();
        let store = DatasetStore::new(records);
        let index = TextIndex::build(store.titles(), config);
        tracing::info!(
            films = store.len(),
            terms = index.vocabulary().len(),
            took_ms = start.elapsed().as_millis() as u64,
            "title index built"
        );
        Self { store, index }
    }

    pub fn load(path: &Path, loader: &LoaderConfig, config: &TfidfConfig) -> Result<Self> {
        let (records, _stats) = load_films(path, loader)?;
        Ok(Self::build(records, config))
    }

    pub fn store(&self) -> &DatasetStore { &self.store }

    pub fn index(&self) -> &TextIndex { &self.index }

    /// Films released in the named month, summed over all years.
    pub fn films_in_month(&self, month_name: &str) -> Result<usize, QueryError> {
        let month = parse_month(month_name)?;
        Ok(self.store.count_by_month(month))
    }

    /// Score of the first film (lowest row) whose title contains `query`.
    pub fn score_by_title(&self, query: &str) -> Result<TitleScore, QueryError> {
        let row = self.first_match(query)?;
        let record = self.record(row, query)?;
        Ok(TitleScore { title: record.title.clone(), score: record.vote_average })
    }

    /// Titles most similar to the first film whose title contains `query`, best first.
    pub fn recommend(&self, query: &str, k: usize) -> Result<Vec<String>, QueryError> {
        let row = self.first_match(query)?;
        let ranked = SimilarityRanker::new(&self.index).top_similar_scored(row, k);
        tracing::debug!(row, ?ranked, "ranked similar titles");
        Ok(ranked
            .into_iter()
            .filter_map(|(r, _)| self.store.record_at(r))
            .map(|record| record.title.clone())
            .collect())
    }

    fn first_match(&self, query: &str) -> Result<RowIndex, QueryError> {
        let matches = self.store.find_by_title_substring(query);
        if matches.len() > 1 {
            tracing::debug!(query, matches = matches.len(), "ambiguous title, using first match");
        }
        matches.first().copied().ok_or_else(|| QueryError::TitleNotFound(query.to_string()))
    }

    fn record(&self, row: RowIndex, query: &str) -> Result<&FilmRecord, QueryError> {
        self.store.record_at(row).ok_or_else(|| QueryError::TitleNotFound(query.to_string()))
    }
}
