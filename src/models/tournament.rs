//! Tournament: the aggregate owning teams, qualification matches, KO standings and tables.

use crate::models::error::{Result, TournamentError};
use crate::models::game::{MatchId, MatchRef, QualificationMatch};
use crate::models::ko_standing::KoBracket;
use crate::models::table::{BeerPongTable, TableId};
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Fewest teams a tournament may be capped at.
pub const MIN_PARTICIPANTS: u32 = 16;
/// Most teams a tournament may be capped at.
pub const MAX_PARTICIPANTS: u32 = 64;
/// Allowed length of team and table names (after trimming).
pub const NAME_LENGTH: RangeInclusive<usize> = 3..=20;

/// Full tournament state. Callers hold one lock per tournament; every operation
/// validates before it writes, so a failed operation leaves the aggregate unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    /// Immutable once qualification matches exist.
    registration_end: DateTime<Utc>,
    /// Immutable once qualification matches exist.
    max_participants: u32,
    /// Username of the organizer.
    pub organizer: String,
    /// Shared with teams for unauthenticated self-signup.
    public_access_token: Uuid,
    pub teams: Vec<Team>,
    pub qualification_matches: Vec<QualificationMatch>,
    pub ko_standings: KoBracket,
    pub tables: Vec<BeerPongTable>,
}

impl Tournament {
    /// Create a tournament with no teams. Registration must end in the future.
    pub fn new(
        name: impl Into<String>,
        registration_end: DateTime<Utc>,
        max_participants: u32,
        description: Option<String>,
        organizer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if registration_end <= now {
            return Err(TournamentError::InvalidRegistrationEnd);
        }
        check_max_participants(max_participants)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            registration_end,
            max_participants,
            organizer: organizer.into(),
            public_access_token: Uuid::new_v4(),
            teams: Vec::new(),
            qualification_matches: Vec::new(),
            ko_standings: KoBracket::new(),
            tables: Vec::new(),
        })
    }

    pub fn registration_end(&self) -> DateTime<Utc> {
        self.registration_end
    }

    pub fn max_participants(&self) -> u32 {
        self.max_participants
    }

    pub fn public_access_token(&self) -> Uuid {
        self.public_access_token
    }

    /// Qualification matches have been generated.
    pub fn has_started(&self) -> bool {
        !self.qualification_matches.is_empty()
    }

    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        !self.has_started() && self.registration_end > now
    }

    pub fn set_registration_end(
        &mut self,
        registration_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.has_started() {
            return Err(TournamentError::TournamentAlreadyStarted);
        }
        if registration_end <= now {
            return Err(TournamentError::InvalidRegistrationEnd);
        }
        self.registration_end = registration_end;
        Ok(())
    }

    pub fn set_max_participants(&mut self, max_participants: u32) -> Result<()> {
        if self.has_started() {
            return Err(TournamentError::TournamentAlreadyStarted);
        }
        check_max_participants(max_participants)?;
        if (max_participants as usize) < self.teams.len() {
            return Err(TournamentError::MaxParticipantsBelowTeamCount(
                self.teams.len(),
            ));
        }
        self.max_participants = max_participants;
        Ok(())
    }

    pub fn is_organizer(&self, username: &str) -> bool {
        self.organizer == username
    }

    pub fn ensure_organizer(&self, username: &str) -> Result<()> {
        if !self.is_organizer(username) {
            log::debug!(
                "User {} is not the organizer of tournament {}",
                username,
                self.id
            );
            return Err(TournamentError::NotOrganizer);
        }
        Ok(())
    }

    pub fn ensure_access_token(&self, token: Uuid) -> Result<()> {
        if self.public_access_token != token {
            return Err(TournamentError::BadAccessToken);
        }
        Ok(())
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TeamNotFound(id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TeamNotFound(id))
    }

    pub fn qualification_match(&self, id: MatchId) -> Result<&QualificationMatch> {
        self.qualification_matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn qualification_match_mut(&mut self, id: MatchId) -> Result<&mut QualificationMatch> {
        self.qualification_matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn table(&self, id: TableId) -> Result<&BeerPongTable> {
        self.tables
            .iter()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TableNotFound(id))
    }

    pub fn table_mut(&mut self, id: TableId) -> Result<&mut BeerPongTable> {
        self.tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TableNotFound(id))
    }

    /// The table currently occupied by a match, if any.
    pub fn table_of(&self, match_ref: MatchRef) -> Option<&BeerPongTable> {
        self.tables
            .iter()
            .find(|t| t.current_match() == Some(match_ref))
    }

    pub fn is_team_checked_in(&self, id: TeamId) -> bool {
        self.team(id).is_ok_and(|t| t.checked_in)
    }
}

fn check_max_participants(max_participants: u32) -> Result<()> {
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&max_participants) {
        return Err(TournamentError::InvalidMaxParticipants {
            min: MIN_PARTICIPANTS,
            max: MAX_PARTICIPANTS,
        });
    }
    Ok(())
}

/// Trim a team or table name and check its length.
pub fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if !NAME_LENGTH.contains(&trimmed.chars().count()) {
        return Err(TournamentError::InvalidName {
            min: *NAME_LENGTH.start(),
            max: *NAME_LENGTH.end(),
        });
    }
    Ok(trimmed)
}
