//! Team and day selection for the interactive prompt

use crate::{MatchDay, Result};

/// First home team in the list
pub fn default_home<'a>(home_teams: &[&'a str]) -> Option<&'a str> {
    home_teams.first().copied()
}

/// First away team that differs from the chosen home team
pub fn default_away<'a>(away_teams: &[&'a str], home_team: &str) -> Option<&'a str> {
    away_teams.iter().copied().find(|t| *t != home_team)
}

/// Interpret a choice typed at the prompt
///
/// Blank input picks the default, a number picks from the 1-based list, and
/// anything else must match a name (case-insensitive).
pub fn parse_choice<'a>(input: &str, options: &[&'a str], default: Option<&'a str>) -> Option<&'a str> {
    let input = input.trim();
    if input.is_empty() {
        return default;
    }
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i).copied());
    }
    options
        .iter()
        .copied()
        .find(|o| o.eq_ignore_ascii_case(input))
}

/// Interpret a match day typed at the prompt; blank picks the default
pub fn parse_day(input: &str, default: MatchDay) -> Result<MatchDay> {
    let input = input.trim();
    if input.is_empty() {
        Ok(default)
    } else {
        input.parse()
    }
}

/// Numbered list for display
pub fn numbered(options: &[&str]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{:>3}. {}", i + 1, o))
        .collect::<Vec<_>>()
        .join("\n")
}
