//! Matchup resolution
//!
//! Turns a (home, away, day) selection into the feature vector the classifier
//! was trained on, or a specific reason it cannot.

use crate::data::MatchTable;
use crate::{EplError, FeatureVector, MatchDay, Result};

/// Stateless lookup over the shared match table
#[derive(Debug, Clone, Copy)]
pub struct MatchupResolver<'a> {
    table: &'a MatchTable,
}

impl<'a> MatchupResolver<'a> {
    pub fn new(table: &'a MatchTable) -> Self {
        MatchupResolver { table }
    }

    /// Build the home-perspective feature vector for a matchup
    ///
    /// Form statistics come from the home team's latest record, the opponent
    /// code from the first record naming the away team as an opponent, and the
    /// day from the caller.
    pub fn resolve(&self, home_team: &str, away_team: &str, day: MatchDay) -> Result<FeatureVector> {
        if home_team == away_team {
            return Err(EplError::IdenticalTeams {
                team: home_team.to_string(),
            });
        }

        let form = self
            .table
            .latest_form(home_team)
            .ok_or_else(|| EplError::UnknownHomeTeam(home_team.to_string()))?;

        // Unknown opponents are an error
        let opp_code = self
            .table
            .opponent_code(away_team)
            .ok_or_else(|| EplError::UnknownAwayTeam(away_team.to_string()))?;

        log::debug!(
            "Resolved {} vs {} on {}: form from {} (gf={:.2}, ga={:.2}), opp_code={}",
            home_team,
            away_team,
            day,
            form.date,
            form.gf_rolling,
            form.ga_rolling,
            opp_code
        );

        Ok(FeatureVector {
            venue_code: FeatureVector::HOME_VENUE,
            opp_code,
            day_code: day.code(),
            gf_rolling: form.gf_rolling,
            ga_rolling: form.ga_rolling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchRecord;
    use chrono::{NaiveDate, Weekday};
    use std::sync::Arc;

    fn make_record(
        date: (i32, u32, u32),
        team: &str,
        opponent: &str,
        opp_code: i64,
        gf: f32,
        ga: f32,
    ) -> MatchRecord {
        MatchRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            team: team.to_string(),
            opponent: opponent.to_string(),
            opp_code,
            day_code: 5,
            gf_rolling: gf,
            ga_rolling: ga,
        }
    }

    fn sample_table() -> MatchTable {
        let records = vec![
            make_record((2023, 4, 1), "Arsenal", "Leeds United", 10, 2.3, 1.1),
            make_record((2023, 3, 4), "Arsenal", "Bournemouth", 1, 1.7, 1.3),
            make_record((2023, 3, 12), "Chelsea", "Leicester City", 11, 0.7, 1.0),
            make_record((2023, 2, 18), "Liverpool", "Chelsea", 5, 1.3, 0.7),
            make_record((2023, 4, 4), "Tottenham", "Chelsea", 5, 1.0, 2.0),
            make_record((2023, 4, 2), "Leeds United", "Arsenal", 0, 1.3, 2.0),
        ];
        MatchTable::from_records(records, "memory").unwrap()
    }

    #[test]
    fn test_resolves_home_perspective_vector() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        let features = resolver
            .resolve("Arsenal", "Chelsea", MatchDay(Weekday::Sat))
            .unwrap();

        assert_eq!(features.to_vec(), vec![1.0, 5.0, 5.0, 2.3, 1.1]);
    }

    #[test]
    fn test_identical_teams_rejected() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        for team in table.home_teams() {
            for day in MatchDay::ALL {
                let result = resolver.resolve(team, team, day);
                assert!(matches!(result, Err(EplError::IdenticalTeams { .. })));
            }
        }
    }

    #[test]
    fn test_identical_check_precedes_lookup() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        let result = resolver.resolve("Wrexham", "Wrexham", MatchDay::default());
        assert!(matches!(result, Err(EplError::IdenticalTeams { .. })));
    }

    #[test]
    fn test_unknown_away_team_has_no_fallback() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        let result = resolver.resolve("Arsenal", "Wrexham", MatchDay(Weekday::Mon));
        match result {
            Err(EplError::UnknownAwayTeam(team)) => assert_eq!(team, "Wrexham"),
            other => panic!("expected UnknownAwayTeam, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_home_team() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        // Appears as an opponent only, so it is not a home choice
        let result = resolver.resolve("Bournemouth", "Chelsea", MatchDay::default());
        assert!(matches!(result, Err(EplError::UnknownHomeTeam(_))));
    }

    #[test]
    fn test_form_is_latest_for_every_team() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        for team in table.home_teams() {
            let latest = table
                .records()
                .iter()
                .filter(|r| r.team == team)
                .max_by_key(|r| r.date)
                .unwrap();
            let away = table
                .away_teams()
                .into_iter()
                .find(|a| *a != team)
                .unwrap();

            let features = resolver.resolve(team, away, MatchDay::default()).unwrap();
            assert_eq!(features.gf_rolling, latest.gf_rolling);
            assert_eq!(features.ga_rolling, latest.ga_rolling);
        }
    }

    #[test]
    fn test_opp_code_same_across_duplicate_records() {
        let first = make_record((2023, 2, 18), "Liverpool", "Chelsea", 5, 1.3, 0.7);
        let second = make_record((2023, 4, 4), "Tottenham", "Chelsea", 5, 1.0, 2.0);
        let home = make_record((2023, 4, 1), "Arsenal", "Leeds United", 10, 2.3, 1.1);

        let forward = MatchTable::from_records(
            vec![home.clone(), first.clone(), second.clone()],
            "forward",
        )
        .unwrap();
        let reversed = MatchTable::from_records(vec![home, second, first], "reversed").unwrap();

        let day = MatchDay::default();
        let a = MatchupResolver::new(&forward)
            .resolve("Arsenal", "Chelsea", day)
            .unwrap();
        let b = MatchupResolver::new(&reversed)
            .resolve("Arsenal", "Chelsea", day)
            .unwrap();
        assert_eq!(a.opp_code, 5);
        assert_eq!(a.opp_code, b.opp_code);
    }

    #[test]
    fn test_away_team_only_in_row_without_rolling_stats() {
        let csv = "date,team,opponent,opp_code,day_code,gf_rolling,ga_rolling\n\
                   2022-08-05,Arsenal,Crystal Palace,7,4,,\n\
                   2022-08-13,Arsenal,Leicester City,11,5,1.3,1.0\n";
        let table = MatchTable::from_reader(csv.as_bytes(), "memory.csv").unwrap();

        let features = MatchupResolver::new(&table)
            .resolve("Arsenal", "Crystal Palace", MatchDay(Weekday::Sat))
            .unwrap();
        assert_eq!(features.to_vec(), vec![1.0, 7.0, 5.0, 1.3, 1.0]);
    }

    #[test]
    fn test_opp_code_zero_is_a_real_code() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        let features = resolver
            .resolve("Chelsea", "Arsenal", MatchDay::default())
            .unwrap();
        assert_eq!(features.opp_code, 0);
    }

    #[test]
    fn test_day_and_venue_come_from_selection() {
        let table = sample_table();
        let resolver = MatchupResolver::new(&table);

        for day in MatchDay::ALL {
            let features = resolver.resolve("Tottenham", "Arsenal", day).unwrap();
            assert_eq!(features.day_code, day.code());
            assert_eq!(features.venue_code, 1);
        }
    }

    #[test]
    fn test_concurrent_resolves_share_table() {
        let table = Arc::new(sample_table());

        std::thread::scope(|s| {
            let handles: Vec<_> = MatchDay::ALL
                .into_iter()
                .map(|day| {
                    let table = Arc::clone(&table);
                    s.spawn(move || {
                        MatchupResolver::new(&table)
                            .resolve("Arsenal", "Chelsea", day)
                            .unwrap()
                    })
                })
                .collect();

            for (handle, day) in handles.into_iter().zip(MatchDay::ALL) {
                let features = handle.join().unwrap();
                assert_eq!(features.day_code, day.code());
                assert_eq!(features.gf_rolling, 2.3);
            }
        });
    }
}
