use time::Month;

use crate::{FilmRecord, RowIndex};

/// Immutable, ordered collection of film records. Row indices handed out here
/// are the join key used by the text index and the ranker.
#[derive(Debug, Default)]
pub struct DatasetStore {
    records: Vec<FilmRecord>,
    // lowercased titles, parallel to `records`
    folded_titles: Vec<String>,
}

impl DatasetStore {
    pub fn new(records: Vec<FilmRecord>) -> Self {
        let folded_titles = records.iter().map(|r| r.title.to_lowercase()).collect();
        Self { records, folded_titles }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn record_at(&self, row: RowIndex) -> Option<&FilmRecord> { self.records.get(row) }

    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.title.as_str())
    }

    /// Number of records released in `month`, in any year.
    pub fn count_by_month(&self, month: Month) -> usize {
        self.records
            .iter()
            .filter(|r| r.release_date.is_some_and(|d| d.month() == month))
            .count()
    }

    /// Rows whose title contains `query` case-insensitively, in ascending row order.
    /// The query is matched literally.
    pub fn find_by_title_substring(&self, query: &str) -> Vec<RowIndex> {
        let needle = query.to_lowercase();
        self.folded_titles
            .iter()
            .enumerate()
            .filter(|(_, title)| title.contains(&needle))
            .map(|(row, _)| row)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn store() -> DatasetStore {
        DatasetStore::new(vec![
            FilmRecord::new("Toy Story", Some(date!(1995 - 11 - 22)), 8.3),
            FilmRecord::new("Toy Story 2", Some(date!(1999 - 11 - 24)), 7.9),
            FilmRecord::new("Cars", Some(date!(2006 - 06 - 09)), 7.2),
            FilmRecord::new("Undated", None, 5.0),
        ])
    }

    #[test]
    fn counts_month_across_years() {
        let s = store();
        assert_eq!(s.count_by_month(Month::November), 2);
        assert_eq!(s.count_by_month(Month::June), 1);
        assert_eq!(s.count_by_month(Month::January), 0);
    }

    #[test]
    fn substring_search_is_case_insensitive_and_ordered() {
        let s = store();
        assert_eq!(s.find_by_title_substring("toy story"), vec![0, 1]);
        assert_eq!(s.find_by_title_substring("CARS"), vec![2]);
        assert!(s.find_by_title_substring("Zootopia").is_empty());
    }

    #[test]
    fn pattern_characters_are_literal() {
        let s = DatasetStore::new(vec![
            FilmRecord::new("Se7en", None, 8.0),
            FilmRecord::new("What? (1999)", None, 6.0),
        ]);
        assert!(s.find_by_title_substring("S.7").is_empty());
        assert_eq!(s.find_by_title_substring("? (19"), vec![1]);
    }

    #[test]
    fn record_lookup_out_of_range_is_none() {
        let s = store();
        assert_eq!(s.record_at(2).map(|r| r.title.as_str()), Some("Cars"));
        assert!(s.record_at(99).is_none());
    }
}
