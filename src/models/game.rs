//! Match timing, derived MatchStatus, and the qualification match with its two participations.

use crate::models::error::{Result, TournamentError};
use crate::models::ko_standing::StandingId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a qualification match.
pub type MatchId = Uuid;

/// Upper bound for the points a winner can be credited with in one match.
pub const MAX_WINNER_POINTS: u32 = 128;

/// Reference to either kind of match; this is what a table points at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum MatchRef {
    Qualification(MatchId),
    Ko(StandingId),
}

impl fmt::Display for MatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRef::Qualification(id) => write!(f, "qualification match {}", id),
            MatchRef::Ko(id) => write!(f, "KO match {}", id),
        }
    }
}

/// Status of a match, always computed from its persisted fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    NotCheckedIn,
    TeamsCheckedIn,
    QueuedCollectingDrinks,
    Playing,
    Finished,
}

impl MatchStatus {
    pub fn derive(times: &MatchTimes, has_table: bool, all_checked_in: bool) -> Self {
        if times.end_time.is_some() {
            MatchStatus::Finished
        } else if times.start_time.is_some() {
            MatchStatus::Playing
        } else if has_table {
            MatchStatus::QueuedCollectingDrinks
        } else if all_checked_in {
            MatchStatus::TeamsCheckedIn
        } else {
            MatchStatus::NotCheckedIn
        }
    }
}

/// Start and end of a match. End is never before start and never set without a start.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTimes {
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl MatchTimes {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn has_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Started but not yet finished.
    pub fn is_playing(&self) -> bool {
        self.has_started() && !self.is_finished()
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.has_started() || self.is_finished() {
            return Err(TournamentError::MatchAlreadyStarted);
        }
        self.start_time = Some(now);
        Ok(())
    }

    /// Set the end time. May be called again to correct a result, as long as it stays after the start.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<()> {
        let start = self.start_time.ok_or(TournamentError::MatchNotStarted)?;
        if now < start {
            return Err(TournamentError::EndBeforeStart);
        }
        self.end_time = Some(now);
        Ok(())
    }
}

/// One team's participation in a qualification match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub team: TeamId,
    pub drinks_collected: bool,
}

/// A qualification match between exactly two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QualificationMatch {
    pub id: MatchId,
    #[serde(flatten)]
    pub times: MatchTimes,
    participations: [Participation; 2],
    winner: Option<TeamId>,
    winner_points: Option<u32>,
}

impl QualificationMatch {
    pub fn new(team_1: TeamId, team_2: TeamId) -> Self {
        let participation = |team| Participation {
            team,
            drinks_collected: false,
        };
        Self {
            id: Uuid::new_v4(),
            times: MatchTimes::default(),
            participations: [participation(team_1), participation(team_2)],
            winner: None,
            winner_points: None,
        }
    }

    pub fn participations(&self) -> &[Participation; 2] {
        &self.participations
    }

    pub fn teams(&self) -> [TeamId; 2] {
        [self.participations[0].team, self.participations[1].team]
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.participations.iter().any(|p| p.team == team)
    }

    pub fn participation_mut(&mut self, team: TeamId) -> Option<&mut Participation> {
        self.participations.iter_mut().find(|p| p.team == team)
    }

    pub fn all_drinks_collected(&self) -> bool {
        self.participations.iter().all(|p| p.drinks_collected)
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    pub fn winner_points(&self) -> Option<u32> {
        self.winner_points
    }

    /// The participant that is not the winner, once a winner is recorded.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        self.teams().into_iter().find(|&t| t != winner)
    }

    /// Record the winner and their points. Does not touch the match times.
    pub fn set_result(&mut self, winner: TeamId, points: u32) -> Result<()> {
        if !self.has_team(winner) {
            return Err(TournamentError::InvalidWinner(winner));
        }
        if points > MAX_WINNER_POINTS {
            return Err(TournamentError::WinnerPointsOutOfRange(MAX_WINNER_POINTS));
        }
        self.winner = Some(winner);
        self.winner_points = Some(points);
        Ok(())
    }
}
