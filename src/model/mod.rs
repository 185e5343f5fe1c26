//! Match outcome classifiers
//!
//! The predictor only sees the [`Classifier`] capability; the shipped
//! implementation is a burn logistic model loaded from a record file.

pub mod logistic;

pub use logistic::{BurnClassifier, LogisticModel};

use crate::{FeatureVector, MatchOutcome};

/// Binary home-win classifier over the five matchup features
pub trait Classifier {
    /// Class probabilities as `[P(no home win), P(home win)]`
    fn predict_proba(&self, features: &FeatureVector) -> [f32; 2];

    /// Class label using the classifier's own decision rule
    fn predict(&self, features: &FeatureVector) -> MatchOutcome {
        let [_, home_win] = self.predict_proba(features);
        if home_win > 0.5 {
            MatchOutcome::HomeWin
        } else {
            MatchOutcome::NotHomeWin
        }
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict_proba(&self, features: &FeatureVector) -> [f32; 2] {
        (**self).predict_proba(features)
    }

    fn predict(&self, features: &FeatureVector) -> MatchOutcome {
        (**self).predict(features)
    }
}
