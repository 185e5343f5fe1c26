//! Feature construction
//!
//! Maps a user's matchup selection onto the model's input vector.

pub mod resolver;

pub use resolver::MatchupResolver;
