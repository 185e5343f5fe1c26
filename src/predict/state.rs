//! One-time loading of the match table and classifier

use std::path::{Path, PathBuf};

use crate::data::MatchTable;
use crate::model::Classifier;
use crate::predict::Predictor;
use crate::{Config, EplError, Result};

/// Readiness of the prediction service
pub enum AppState<C> {
    /// Artifacts could not be loaded; holds the reason
    NotReady(EplError),
    Ready(Predictor<C>),
}

impl<C: Classifier> AppState<C> {
    /// Load both artifacts eagerly
    ///
    /// `load_model` receives the configured model path without extension.
    pub fn initialize<F>(config: &Config, load_model: F) -> Self
    where
        F: FnOnce(&Path) -> Result<C>,
    {
        match Self::load(config, load_model) {
            Ok(predictor) => {
                log::info!("Predictor ready");
                AppState::Ready(predictor)
            }
            Err(e) => {
                log::error!("Predictor not ready: {}", e);
                AppState::NotReady(e)
            }
        }
    }

    fn load<F>(config: &Config, load_model: F) -> Result<Predictor<C>>
    where
        F: FnOnce(&Path) -> Result<C>,
    {
        let model_file = config.data.model_file();
        let matches_file = PathBuf::from(&config.data.matches_path);

        let missing: Vec<PathBuf> = [model_file, matches_file.clone()]
            .into_iter()
            .filter(|p| !p.is_file())
            .collect();
        if !missing.is_empty() {
            return Err(EplError::SystemFilesMissing { paths: missing });
        }

        let table = MatchTable::load(&matches_file)?;
        log::info!(
            "Loaded {} match records from {}",
            table.len(),
            matches_file.display()
        );

        let classifier = load_model(Path::new(&config.data.model_path))?;

        Ok(Predictor::new(table, classifier, config.verdict.clone()))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AppState::Ready(_))
    }

    /// The predictor, if loading succeeded
    pub fn predictor(&self) -> Result<&Predictor<C>> {
        match self {
            AppState::Ready(predictor) => Ok(predictor),
            AppState::NotReady(_) => Err(EplError::NotReady),
        }
    }

    /// Why loading failed, if it did
    pub fn reason(&self) -> Option<&EplError> {
        match self {
            AppState::Ready(_) => None,
            AppState::NotReady(e) => Some(e),
        }
    }

    /// Take the predictor, or the loading error
    pub fn into_predictor(self) -> Result<Predictor<C>> {
        match self {
            AppState::Ready(predictor) => Ok(predictor),
            AppState::NotReady(e) => Err(e),
        }
    }
}
