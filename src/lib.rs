//! EPL match prediction from rolling team form
//!
//! Resolves a home/away/day selection into the feature vector a pre-trained
//! classifier expects, and turns its output into a win-probability verdict.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Day of the week a fixture is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchDay(pub Weekday);

impl MatchDay {
    /// All selectable days, Monday first
    pub const ALL: [MatchDay; 7] = [
        MatchDay(Weekday::Mon),
        MatchDay(Weekday::Tue),
        MatchDay(Weekday::Wed),
        MatchDay(Weekday::Thu),
        MatchDay(Weekday::Fri),
        MatchDay(Weekday::Sat),
        MatchDay(Weekday::Sun),
    ];

    /// Numeric day code used by the model (Monday = 0 ... Sunday = 6)
    pub fn code(&self) -> i64 {
        self.0.num_days_from_monday() as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl Default for MatchDay {
    fn default() -> Self {
        MatchDay(Weekday::Sat)
    }
}

impl fmt::Display for MatchDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for MatchDay {
    type Err = EplError;

    /// Accepts "Saturday", "sat" or the numeric code "5"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code).ok_or_else(|| EplError::InvalidDay(s.to_string()));
        }
        s.parse::<Weekday>()
            .map(MatchDay)
            .map_err(|_| EplError::InvalidDay(s.to_string()))
    }
}

/// One row of the historical match table: a single team's view of a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    /// Stable integer code assigned to `opponent` during data preparation
    pub opp_code: i64,
    pub day_code: i64,
    /// Rolling mean of goals scored over the team's previous fixtures
    pub gf_rolling: f32,
    /// Rolling mean of goals conceded over the team's previous fixtures
    pub ga_rolling: f32,
}

/// Model input for a single matchup, always seen from the home side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub venue_code: i64,
    pub opp_code: i64,
    pub day_code: i64,
    pub gf_rolling: f32,
    pub ga_rolling: f32,
}

impl FeatureVector {
    pub const DIM: usize = 5;

    /// Venue encoding for the home side
    pub const HOME_VENUE: i64 = 1;

    /// Column names in model order
    pub const NAMES: [&'static str; Self::DIM] =
        ["venue_code", "opp_code", "day_code", "gf_rolling", "ga_rolling"];

    /// Values in the exact order the classifier was trained on
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.venue_code as f32,
            self.opp_code as f32,
            self.day_code as f32,
            self.gf_rolling,
            self.ga_rolling,
        ]
    }
}

/// Binary outcome as the classifier labels it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    HomeWin,
    NotHomeWin,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::HomeWin => write!(f, "Home win"),
            MatchOutcome::NotHomeWin => write!(f, "No home win"),
        }
    }
}

/// Classifier output for one matchup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub home_win_probability: f32,
    pub predicted_label: MatchOutcome,
}

/// Qualitative reading of a home win probability, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictBand {
    StrongFavorite,
    MarginalFavorite,
    HighRisk,
}

impl VerdictBand {
    pub fn from_probability(prob: f32, thresholds: &VerdictConfig) -> Self {
        if prob > thresholds.strong_favorite {
            VerdictBand::StrongFavorite
        } else if prob > thresholds.marginal_favorite {
            VerdictBand::MarginalFavorite
        } else {
            VerdictBand::HighRisk
        }
    }
}

impl fmt::Display for VerdictBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictBand::StrongFavorite => write!(f, "Strong favorite"),
            VerdictBand::MarginalFavorite => write!(f, "Marginal favorite"),
            VerdictBand::HighRisk => write!(f, "High risk / draw-or-away"),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum EplError {
    #[error("Home and away team are both {team} - pick two different teams")]
    IdenticalTeams { team: String },

    #[error("No match history for home team: {0}")]
    UnknownHomeTeam(String),

    #[error("No opponent code for away team: {0}")]
    UnknownAwayTeam(String),

    #[error("Required files missing: {}", display_paths(.paths))]
    SystemFilesMissing { paths: Vec<PathBuf> },

    #[error("Match data file has no usable rows: {}", .0.display())]
    EmptyTable(PathBuf),

    #[error("Predictor not initialized")]
    NotReady,

    #[error("Unknown match day: {0} (use a weekday name or 0-6)")]
    InvalidDay(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EplError {
    /// True for errors the user can fix by changing the selection
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            EplError::IdenticalTeams { .. }
                | EplError::UnknownHomeTeam(_)
                | EplError::UnknownAwayTeam(_)
                | EplError::InvalidDay(_)
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, EplError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub verdict: VerdictConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub matches_path: String,
    /// Model record path without extension (burn appends `.mpk`)
    pub model_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            matches_path: "data/processed_matches.csv".to_string(),
            model_path: "outputs/epl_model".to_string(),
        }
    }
}

impl DataConfig {
    pub fn model_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.mpk", self.model_path))
    }
}

/// Probability thresholds for the verdict bands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictConfig {
    pub strong_favorite: f32,
    pub marginal_favorite: f32,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        VerdictConfig {
            strong_favorite: 0.65,
            marginal_favorite: 0.50,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EplError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| EplError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EplError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let v = &self.verdict;
        let in_range = |p: f32| (0.0..=1.0).contains(&p);
        if !in_range(v.strong_favorite) || !in_range(v.marginal_favorite) {
            return Err(EplError::Config(
                "verdict thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if v.marginal_favorite > v.strong_favorite {
            return Err(EplError::Config(format!(
                "marginal_favorite ({}) exceeds strong_favorite ({})",
                v.marginal_favorite, v.strong_favorite
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_day_codes() {
        assert_eq!(MatchDay(Weekday::Mon).code(), 0);
        assert_eq!(MatchDay(Weekday::Sat).code(), 5);
        assert_eq!(MatchDay(Weekday::Sun).code(), 6);
        assert_eq!(MatchDay::from_code(2), Some(MatchDay(Weekday::Wed)));
        assert_eq!(MatchDay::from_code(7), None);
        assert_eq!(MatchDay::from_code(-1), None);
    }

    #[test]
    fn test_match_day_parsing() {
        assert_eq!("Saturday".parse::<MatchDay>().unwrap(), MatchDay(Weekday::Sat));
        assert_eq!("tue".parse::<MatchDay>().unwrap(), MatchDay(Weekday::Tue));
        assert_eq!(" 6 ".parse::<MatchDay>().unwrap(), MatchDay(Weekday::Sun));
        assert!(matches!(
            "9".parse::<MatchDay>(),
            Err(EplError::InvalidDay(_))
        ));
        assert!(matches!(
            "someday".parse::<MatchDay>(),
            Err(EplError::InvalidDay(_))
        ));
    }

    #[test]
    fn test_feature_vector_order() {
        let features = FeatureVector {
            venue_code: 1,
            opp_code: 5,
            day_code: 5,
            gf_rolling: 2.3,
            ga_rolling: 1.1,
        };
        assert_eq!(features.to_vec(), vec![1.0, 5.0, 5.0, 2.3, 1.1]);
        assert_eq!(features.to_vec().len(), FeatureVector::DIM);
    }

    #[test]
    fn test_verdict_bands() {
        let thresholds = VerdictConfig::default();
        assert_eq!(
            VerdictBand::from_probability(0.72, &thresholds),
            VerdictBand::StrongFavorite
        );
        assert_eq!(
            VerdictBand::from_probability(0.55, &thresholds),
            VerdictBand::MarginalFavorite
        );
        assert_eq!(
            VerdictBand::from_probability(0.40, &thresholds),
            VerdictBand::HighRisk
        );
        // Band edges are exclusive on the lower side
        assert_eq!(
            VerdictBand::from_probability(0.65, &thresholds),
            VerdictBand::MarginalFavorite
        );
        assert_eq!(
            VerdictBand::from_probability(0.50, &thresholds),
            VerdictBand::HighRisk
        );
    }

    #[test]
    fn test_missing_files_message_lists_paths() {
        let err = EplError::SystemFilesMissing {
            paths: vec![
                PathBuf::from("outputs/epl_model.mpk"),
                PathBuf::from("data/processed_matches.csv"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("outputs/epl_model.mpk"));
        assert!(msg.contains("data/processed_matches.csv"));
        assert!(!err.is_selection_error());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.verdict.strong_favorite = 0.7;
        config.save(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.verdict.strong_favorite, 0.7);
        assert_eq!(loaded.data.model_path, "outputs/epl_model");
    }

    #[test]
    fn test_config_rejects_inverted_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[verdict]\nstrong_favorite = 0.4\nmarginal_favorite = 0.6\n",
        )
        .unwrap();

        let result = Config::load(path.to_str().unwrap());
        assert!(matches!(result, Err(EplError::Config(_))));
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[data]\nmatches_path = \"m.csv\"\nmodel_path = \"m\"\n",
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.data.model_file(), PathBuf::from("m.mpk"));
        assert_eq!(config.verdict.marginal_favorite, 0.50);
    }
}
