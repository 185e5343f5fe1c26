//! Prediction and inference
//!
//! Load the match table and model once, then answer matchup predictions.

pub mod inference;
pub mod selection;
pub mod state;

pub use inference::{PredictionReport, Predictor};
pub use state::AppState;
