//! Matchup inference and result rendering

use crate::data::MatchTable;
use crate::features::MatchupResolver;
use crate::model::Classifier;
use crate::{FeatureVector, MatchDay, PredictionResult, Result, VerdictBand, VerdictConfig};

/// Predictor over a loaded match table and classifier
pub struct Predictor<C> {
    table: MatchTable,
    classifier: C,
    verdict: VerdictConfig,
}

impl<C: Classifier> Predictor<C> {
    pub fn new(table: MatchTable, classifier: C, verdict: VerdictConfig) -> Self {
        Predictor {
            table,
            classifier,
            verdict,
        }
    }

    /// Build the feature vector for a matchup
    pub fn resolve(&self, home_team: &str, away_team: &str, day: MatchDay) -> Result<FeatureVector> {
        MatchupResolver::new(&self.table).resolve(home_team, away_team, day)
    }

    /// Run the classifier on an already resolved feature vector
    pub fn predict_features(&self, features: &FeatureVector) -> PredictionResult {
        let [_, home_win_probability] = self.classifier.predict_proba(features);
        PredictionResult {
            home_win_probability,
            predicted_label: self.classifier.predict(features),
        }
    }

    /// Predict a single match
    pub fn predict(&self, home_team: &str, away_team: &str, day: MatchDay) -> Result<PredictionReport> {
        let features = self.resolve(home_team, away_team, day)?;
        let result = self.predict_features(&features);
        let verdict = VerdictBand::from_probability(result.home_win_probability, &self.verdict);

        log::info!(
            "{} vs {} ({}): P(home win)={:.3} -> {}",
            home_team,
            away_team,
            day,
            result.home_win_probability,
            verdict
        );

        Ok(PredictionReport {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            day,
            features,
            result,
            verdict,
        })
    }

    /// Get the match table
    pub fn table(&self) -> &MatchTable {
        &self.table
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

/// Everything shown to the user for one prediction
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub home_team: String,
    pub away_team: String,
    pub day: MatchDay,
    pub features: FeatureVector,
    pub result: PredictionResult,
    pub verdict: VerdictBand,
}

/// Format a prediction for display
pub fn format_prediction(report: &PredictionReport) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {} ({})
├─────────────────────────────────────────────────┤
│  Home win probability: {:.1}%
│  Predicted outcome:    {}
│  Verdict:              {}
├─────────────────────────────────────────────────┤
│  {} recent form
│    Goals scored (rolling):   {:.2}
│    Goals conceded (rolling): {:.2}
└─────────────────────────────────────────────────┘
"#,
        report.home_team,
        report.away_team,
        report.day,
        report.result.home_win_probability * 100.0,
        report.result.predicted_label,
        report.verdict,
        report.home_team,
        report.features.gf_rolling,
        report.features.ga_rolling,
    )
}

/// JSON form of a prediction
pub fn prediction_json(report: &PredictionReport) -> serde_json::Value {
    serde_json::json!({
        "home": report.home_team,
        "away": report.away_team,
        "day": report.day.name(),
        "home_win_prob": round3(report.result.home_win_probability),
        "predicted_label": report.result.predicted_label,
        "verdict": report.verdict.to_string(),
        "features": report.features,
    })
}

/// Round to the three decimals the CSV output shows
fn round3(value: f32) -> f64 {
    (value as f64 * 1000.0).round() / 1000.0
}

pub const CSV_HEADER: &str = "home,away,day,home_win_prob,predicted_label,verdict,gf_rolling,ga_rolling";

/// CSV row matching [`CSV_HEADER`]
pub fn prediction_csv_row(report: &PredictionReport) -> String {
    format!(
        "{},{},{},{:.3},{},{},{:.2},{:.2}",
        report.home_team,
        report.away_team,
        report.day,
        report.result.home_win_probability,
        report.result.predicted_label,
        report.verdict,
        report.features.gf_rolling,
        report.features.ga_rolling
    )
}
