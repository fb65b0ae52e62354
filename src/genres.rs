//! Distinct movie titles per year and genre.
//!
//! Input lines look like `Title (1999), Genre` or
//! `Title (Alternative Title) (1999), Genre`. Lines that don't match are
//! ignored, and only genres in the configured set are counted.

use crate::core::{GenreCount, GenreYear, InputLine};
use crate::errors::RecordError;
use crate::mapreduce::MapReduce;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static MOVIE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\((\d{4})\)\s*,\s*(.+)").unwrap());

/// A parsed movie line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    pub genre: String,
}

impl MovieRecord {
    pub fn parse(text: &str) -> Option<Self> {
        let captures = MOVIE_PATTERN.captures(text)?;
        Some(Self {
            title: captures[1].trim().to_string(),
            year: captures[2].to_string(),
            genre: captures[3].trim().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GenreCounter {
    genres: BTreeSet<String>,
}

impl GenreCounter {
    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
        }
    }

    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }
}

impl MapReduce for GenreCounter {
    type Input = InputLine;
    type Key = GenreYear;
    type Value = String;
    type Output = GenreCount;

    fn name(&self) -> &'static str {
        "genre-counter"
    }

    fn map(&self, line: InputLine) -> Result<Vec<(GenreYear, String)>, RecordError> {
        let Some(movie) = MovieRecord::parse(line.decoded()?) else {
            return Ok(Vec::new());
        };
        if !self.genres.contains(&movie.genre) {
            return Ok(Vec::new());
        }

        let key = GenreYear {
            year: movie.year,
            genre: movie.genre,
        };
        Ok(vec![(key, movie.title)])
    }

    // Distinct-count of a union equals distinct-count of deduplicated parts
    fn has_combiner(&self) -> bool {
        true
    }

    fn combine(&self, _key: &GenreYear, titles: Vec<String>) -> Vec<String> {
        titles
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn reduce(&self, key: GenreYear, titles: Vec<String>) -> Vec<GenreCount> {
        let distinct: BTreeSet<String> = titles.into_iter().collect();
        vec![GenreCount {
            year: key.year,
            genre: key.genre,
            titles: distinct.len(),
        }]
    }
}
