//! Qualification score table: wins, losses and points per team, ranked with shared positions for ties.

use crate::models::{TeamId, Tournament};
use serde::Serialize;
use std::collections::HashMap;

/// One row of the score table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QualificationTeamScore {
    pub id: TeamId,
    pub name: String,
    pub ready: bool,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub games_played: u32,
    /// 1-based; teams level on wins and points share a position.
    pub position: usize,
}

impl QualificationTeamScore {
    fn same_rank(&self, other: &Self) -> bool {
        self.wins == other.wins && self.points == other.points
    }
}

/// Rank every team: wins desc, points desc, then name asc. Positions run 1, 2, 3, ...
/// except that a team level with its predecessor inherits the predecessor's position.
pub fn score_table(tournament: &Tournament) -> Vec<QualificationTeamScore> {
    let mut scores: HashMap<TeamId, QualificationTeamScore> = tournament
        .teams
        .iter()
        .map(|t| {
            (
                t.id,
                QualificationTeamScore {
                    id: t.id,
                    name: t.name.clone(),
                    ready: t.checked_in,
                    wins: 0,
                    losses: 0,
                    points: 0,
                    games_played: 0,
                    position: 0,
                },
            )
        })
        .collect();

    for m in &tournament.qualification_matches {
        let (Some(winner), Some(loser)) = (m.winner(), m.loser()) else {
            continue;
        };
        if let Some(s) = scores.get_mut(&winner) {
            s.wins += 1;
            s.points += m.winner_points().unwrap_or(0);
            s.games_played += 1;
        }
        if let Some(s) = scores.get_mut(&loser) {
            s.losses += 1;
            s.games_played += 1;
        }
    }

    let mut table: Vec<QualificationTeamScore> = scores.into_values().collect();
    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.points.cmp(&a.points))
            .then_with(|| a.name.cmp(&b.name))
    });

    for i in 0..table.len() {
        table[i].position = if i > 0 && table[i].same_rank(&table[i - 1]) {
            table[i - 1].position
        } else {
            i + 1
        };
    }
    table
}
