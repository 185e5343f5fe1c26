//! In-memory historical match table backed by the processed CSV

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{EplError, MatchRecord, Result};

/// Raw CSV row. Rolling averages are blank for a team's first fixtures.
#[derive(Debug, Deserialize)]
struct MatchRow {
    date: NaiveDate,
    team: String,
    opponent: String,
    opp_code: i64,
    day_code: i64,
    gf_rolling: Option<f32>,
    ga_rolling: Option<f32>,
}

impl MatchRow {
    fn into_record(self) -> Option<MatchRecord> {
        Some(MatchRecord {
            date: self.date,
            team: self.team,
            opponent: self.opponent,
            opp_code: self.opp_code,
            day_code: self.day_code,
            gf_rolling: self.gf_rolling?,
            ga_rolling: self.ga_rolling?,
        })
    }
}

/// Read-only match history, loaded once at startup
#[derive(Debug)]
pub struct MatchTable {
    source: PathBuf,
    records: Vec<MatchRecord>,
    /// team -> index of its chronologically latest record
    latest_form: HashMap<String, usize>,
    /// opponent -> code from the first record naming it
    opp_codes: HashMap<String, i64>,
}

impl MatchTable {
    /// Load the table from a CSV file with headers
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EplError::SystemFilesMissing {
                paths: vec![path.to_path_buf()],
            });
        }
        let reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        Self::from_csv(reader, path)
    }

    /// Load the table from any CSV source (used for in-memory data)
    pub fn from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(reader, source)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut records = Vec::new();
        let mut opponents = Vec::new();
        let mut skipped = 0usize;

        for row in reader.deserialize::<MatchRow>() {
            let row = row?;
            // Every row names an opponent, with or without rolling stats
            opponents.push((row.opponent.clone(), row.opp_code));
            match row.into_record() {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} rows without rolling averages in {}",
                skipped,
                source.display()
            );
        }

        Self::build(records, opponents, source)
    }

    /// Build the table and its lookup indexes from parsed records
    pub fn from_records(records: Vec<MatchRecord>, source: impl Into<PathBuf>) -> Result<Self> {
        let opponents = records
            .iter()
            .map(|r| (r.opponent.clone(), r.opp_code))
            .collect();
        Self::build(records, opponents, source)
    }

    /// `opponents` holds (name, code) for every data row in file order
    fn build(
        records: Vec<MatchRecord>,
        opponents: Vec<(String, i64)>,
        source: impl Into<PathBuf>,
    ) -> Result<Self> {
        let source = source.into();
        if records.is_empty() {
            return Err(EplError::EmptyTable(source));
        }

        let mut latest_form: HashMap<String, usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            // Later rows win ties on date
            let is_latest = latest_form
                .get(&record.team)
                .map_or(true, |&j| records[j].date <= record.date);
            if is_latest {
                latest_form.insert(record.team.clone(), i);
            }
        }

        let mut opp_codes: HashMap<String, i64> = HashMap::new();
        for (opponent, code) in opponents {
            opp_codes.entry(opponent).or_insert(code);
        }

        log::debug!(
            "Indexed {} records: {} teams, {} opponents",
            records.len(),
            latest_form.len(),
            opp_codes.len()
        );

        Ok(MatchTable {
            source,
            records,
            latest_form,
            opp_codes,
        })
    }

    /// Path the table was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record for a team, i.e. its current form
    pub fn latest_form(&self, team: &str) -> Option<&MatchRecord> {
        self.latest_form.get(team).map(|&i| &self.records[i])
    }

    /// Opponent code recorded for a team when it appeared as an opponent
    pub fn opponent_code(&self, opponent: &str) -> Option<i64> {
        self.opp_codes.get(opponent).copied()
    }

    /// Sorted distinct `team` values (home team choices)
    pub fn home_teams(&self) -> Vec<&str> {
        self.latest_form
            .keys()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct `opponent` values (away team choices)
    pub fn away_teams(&self) -> Vec<&str> {
        self.opp_codes
            .keys()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get_stats(&self) -> TableStats {
        TableStats {
            record_count: self.records.len(),
            team_count: self.latest_form.len(),
            opponent_count: self.opp_codes.len(),
            earliest_match: self.records.iter().map(|r| r.date).min(),
            latest_match: self.records.iter().map(|r| r.date).max(),
        }
    }
}

pub struct TableStats {
    pub record_count: usize,
    pub team_count: usize,
    pub opponent_count: usize,
    pub earliest_match: Option<NaiveDate>,
    pub latest_match: Option<NaiveDate>,
}
