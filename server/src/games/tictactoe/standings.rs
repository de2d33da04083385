use std::collections::BTreeMap;

use common::games::tictactoe::{Mark, Outcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// Who sat on a mark when the round resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Named(String),
    Automated(String),
    Empty,
}

impl Side {
    fn name(&self) -> Option<&str> {
        match self {
            Side::Named(name) | Side::Automated(name) => Some(name.as_str()),
            Side::Empty => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Standings {
    records: BTreeMap<String, Record>,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits one resolved round. Returns false when the round was not counted.
    pub fn record_round(&mut self, x_side: &Side, o_side: &Side, outcome: &Outcome) -> bool {
        if !outcome.is_terminal() {
            return false;
        }
        if matches!(x_side, Side::Automated(_)) && matches!(o_side, Side::Automated(_)) {
            return false;
        }

        for (mark, side) in [(Mark::X, x_side), (Mark::O, o_side)] {
            let Some(name) = side.name() else {
                continue;
            };
            let record = self.records.entry(name.to_string()).or_default();
            record.games += 1;
            match outcome.winner() {
                Some(winner) if winner == mark => record.wins += 1,
                Some(_) => record.losses += 1,
                None => record.draws += 1,
            }
        }
        true
    }

    /// Most wins first, then most draws, then by name.
    pub fn ranked(&self) -> Vec<(&str, &Record)> {
        let mut ranked: Vec<(&str, &Record)> = self
            .records
            .iter()
            .map(|(name, record)| (name.as_str(), record))
            .collect();
        ranked.sort_by(|(a_name, a), (b_name, b)| {
            b.wins
                .cmp(&a.wins)
                .then(b.draws.cmp(&a.draws))
                .then(a_name.cmp(b_name))
        });
        ranked
    }

    pub fn format_ranking(&self) -> String {
        if self.records.is_empty() {
            return "No games recorded yet.".to_string();
        }
        self.ranked()
            .iter()
            .enumerate()
            .map(|(index, (name, record))| {
                format!(
                    "{}. {}: {} games, {} wins, {} draws, {} losses",
                    index + 1,
                    name,
                    record.games,
                    record.wins,
                    record.draws,
                    record.losses
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
impl Standings {
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Side {
        Side::Named(name.to_string())
    }

    fn x_wins() -> Outcome {
        Outcome::Won {
            mark: Mark::X,
            line: [0, 1, 2],
        }
    }

    #[test]
    fn test_win_credits_both_sides() {
        let mut standings = Standings::new();

        assert!(standings.record_round(&named("alice"), &named("bob"), &x_wins()));

        assert_eq!(
            standings.get("alice"),
            Some(&Record { games: 1, wins: 1, draws: 0, losses: 0 })
        );
        assert_eq!(
            standings.get("bob"),
            Some(&Record { games: 1, wins: 0, draws: 0, losses: 1 })
        );
    }

    #[test]
    fn test_draw_credits_draws() {
        let mut standings = Standings::new();

        standings.record_round(&named("alice"), &Side::Automated("AI".to_string()), &Outcome::Draw);

        assert_eq!(standings.get("alice").unwrap().draws, 1);
        assert_eq!(standings.get("AI").unwrap().draws, 1);
    }

    #[test]
    fn test_fully_automated_round_is_skipped() {
        let mut standings = Standings::new();
        let bot = Side::Automated("AI".to_string());

        assert!(!standings.record_round(&bot, &bot, &Outcome::Draw));
        assert!(standings.is_empty());
    }

    #[test]
    fn test_in_progress_is_not_recorded() {
        let mut standings = Standings::new();

        assert!(!standings.record_round(&named("a"), &named("b"), &Outcome::InProgress));
        assert!(standings.is_empty());
    }

    #[test]
    fn test_empty_side_is_skipped() {
        let mut standings = Standings::new();

        standings.record_round(&Side::Empty, &named("bob"), &x_wins());

        assert_eq!(standings.get("bob").unwrap().losses, 1);
        assert_eq!(standings.ranked().len(), 1);
    }

    #[test]
    fn test_ranking_order() {
        let mut standings = Standings::new();
        standings.record_round(&named("carol"), &named("bob"), &x_wins());
        standings.record_round(&named("alice"), &named("dave"), &Outcome::Draw);
        standings.record_round(&named("carol"), &named("alice"), &x_wins());

        let names: Vec<&str> = standings.ranked().iter().map(|(name, _)| *name).collect();

        assert_eq!(names, vec!["carol", "alice", "dave", "bob"]);
    }

    #[test]
    fn test_format_ranking_empty() {
        assert_eq!(Standings::new().format_ranking(), "No games recorded yet.");
    }

    #[test]
    fn test_format_ranking_lines() {
        let mut standings = Standings::new();
        standings.record_round(&named("alice"), &named("bob"), &x_wins());

        assert_eq!(
            standings.format_ranking(),
            "1. alice: 1 games, 1 wins, 0 draws, 0 losses\n2. bob: 1 games, 0 wins, 0 draws, 1 losses"
        );
    }
}
