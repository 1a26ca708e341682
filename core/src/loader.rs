//! Reads the film dataset from Parquet, CSV, JSON or JSONL and applies the
//! cleaning rules before anything is indexed.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use serde::Deserialize;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::FilmRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Drop rows without a score. When false they are kept with a score of 0.
    pub drop_missing_score: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self { Self { drop_missing_score: true } }
}

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Release date cell: text such as `1995-10-30`, or milliseconds since the
/// Unix epoch (what pandas writes to JSON by default).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum DateCell {
    Text(String),
    EpochMillis(i64),
}

impl DateCell {
    fn to_date(&self) -> Option<Date> {
        match self {
            DateCell::Text(text) => parse_release_date(text),
            DateCell::EpochMillis(ms) => OffsetDateTime::from_unix_timestamp_nanos(i128::from(*ms) * 1_000_000)
                .ok()
                .map(|t| t.date()),
        }
    }
}

/// Score cell: a number, or text holding one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ScoreCell {
    Number(f64),
    Text(String),
}

impl ScoreCell {
    fn to_score(&self) -> Option<f64> {
        let value = match self {
            ScoreCell::Number(v) => *v,
            ScoreCell::Text(text) => text.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Row as it appears in the source file. Unknown columns are ignored and
/// cells of an unexpected type count as missing.
#[derive(Debug, Default, Deserialize)]
struct RawFilm {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    title: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_date: Option<DateCell>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_average: Option<ScoreCell>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub read: usize,
    pub kept: usize,
    pub missing_title: usize,
    pub missing_score: usize,
    pub undated: usize,
}

#[derive(Default)]
struct Cleaner {
    config: LoaderConfig,
    stats: LoadStats,
    records: Vec<FilmRecord>,
}

impl Cleaner {
    fn push(&mut self, raw: RawFilm) {
        self.stats.read += 1;
        let title = match raw.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                self.stats.missing_title += 1;
                return;
            }
        };
        let vote_average = match raw.vote_average.as_ref().and_then(ScoreCell::to_score) {
            Some(v) => v,
            _ if self.config.drop_missing_score => {
                self.stats.missing_score += 1;
                return;
            }
            _ => 0.0,
        };
        let release_date = raw.release_date.as_ref().and_then(DateCell::to_date);
        if release_date.is_none() {
            self.stats.undated += 1;
        }
        self.stats.kept += 1;
        self.records.push(FilmRecord { title, release_date, vote_average });
    }
}

/// Parse `YYYY-MM-DD`, ignoring any trailing time part.
pub fn parse_release_date(value: &str) -> Option<Date> {
    let day = value.trim().get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

/// Load and clean the dataset at `path`. The format follows the file extension.
pub fn load_films(path: &Path, config: &LoaderConfig) -> Result<(Vec<FilmRecord>, LoadStats)> {
    let file = File::open(path).with_context(|| format!("failed to open dataset {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
    let mut cleaner = Cleaner { config: *config, ..Default::default() };
    let read = match ext.as_deref() {
        Some("parquet") => read_parquet(file, &mut cleaner),
        Some("csv") => read_csv(file, &mut cleaner),
        Some("jsonl") => read_jsonl(file, &mut cleaner),
        Some("json") => read_json(file, &mut cleaner),
        _ => bail!("unsupported dataset format: {}", path.display()),
    };
    read.with_context(|| format!("failed to read dataset {}", path.display()))?;

    let stats = cleaner.stats;
    tracing::info!(
        path = %path.display(),
        read = stats.read,
        kept = stats.kept,
        missing_title = stats.missing_title,
        missing_score = stats.missing_score,
        undated = stats.undated,
        "dataset loaded"
    );
    Ok((cleaner.records, stats))
}

fn read_parquet(file: File, cleaner: &mut Cleaner) -> Result<()> {
    let reader = SerializedFileReader::new(file)?;
    for (idx, row) in reader.get_row_iter(None)?.enumerate() {
        let row = row.with_context(|| format!("invalid Parquet row {}", idx + 1))?;
        let mut raw = RawFilm::default();
        for (name, field) in row.get_column_iter() {
            match name.as_str() {
                "title" => raw.title = parquet_text(field),
                "release_date" => raw.release_date = parquet_date(field),
                "vote_average" => raw.vote_average = parquet_score(field),
                _ => {}
            }
        }
        cleaner.push(raw);
    }
    Ok(())
}

fn parquet_text(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        _ => None,
    }
}

fn parquet_date(field: &Field) -> Option<DateCell> {
    match field {
        Field::Str(s) => Some(DateCell::Text(s.clone())),
        Field::Date(days) => Some(DateCell::EpochMillis(i64::from(*days) * MILLIS_PER_DAY)),
        Field::TimestampMillis(ms) => Some(DateCell::EpochMillis(*ms)),
        Field::TimestampMicros(us) => Some(DateCell::EpochMillis(us.div_euclid(1_000))),
        _ => None,
    }
}

fn parquet_score(field: &Field) -> Option<ScoreCell> {
    match field {
        Field::Double(v) => Some(ScoreCell::Number(*v)),
        Field::Float(v) => Some(ScoreCell::Number(f64::from(*v))),
        Field::Int(v) => Some(ScoreCell::Number(f64::from(*v))),
        Field::Long(v) => Some(ScoreCell::Number(*v as f64)),
        Field::Str(s) => Some(ScoreCell::Text(s.clone())),
        _ => None,
    }
}

fn read_csv<R: Read>(reader: R, cleaner: &mut Cleaner) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    for (row, record) in rdr.deserialize::<RawFilm>().enumerate() {
        let raw = record.with_context(|| format!("invalid CSV row {}", row + 1))?;
        cleaner.push(raw);
    }
    Ok(())
}

fn read_jsonl<R: Read>(reader: R, cleaner: &mut Cleaner) -> Result<()> {
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let value: serde_json::Value =
            serde_json::from_str(&line).with_context(|| format!("invalid JSON at line {}", idx + 1))?;
        let raw: RawFilm = serde_json::from_value(value).with_context(|| format!("invalid film at line {}", idx + 1))?;
        cleaner.push(raw);
    }
    Ok(())
}

fn read_json<R: Read>(reader: R, cleaner: &mut Cleaner) -> Result<()> {
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(reader))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (idx, v) in arr.into_iter().enumerate() {
                let raw: RawFilm = serde_json::from_value(v).with_context(|| format!("invalid film at index {idx}"))?;
                cleaner.push(raw);
            }
        }
        serde_json::Value::Object(_) => cleaner.push(serde_json::from_value(json)?),
        _ => bail!("expected a JSON array or object"),
    }
    Ok(())
}
