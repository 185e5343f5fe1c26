//! Historical match data
//!
//! Loads the processed match table and answers form and opponent-code lookups.

pub mod table;

pub use table::{MatchTable, TableStats};
