//! TournamentError and its classification into the categories the API layer maps to status codes.

use crate::models::game::{MatchId, MatchRef};
use crate::models::ko_standing::{KoTreeValidation, StandingId};
use crate::models::table::TableId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use thiserror::Error;

/// Broad category of a [`TournamentError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    PreconditionFailed,
    Conflict,
    /// Internal construction produced something structurally invalid (a bug, not bad input).
    InvariantViolation,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("Team {0} not found in tournament")]
    TeamNotFound(TeamId),
    #[error("Qualification match {0} not found")]
    MatchNotFound(MatchId),
    #[error("KO standing {0} not found")]
    StandingNotFound(StandingId),
    #[error("Beer pong table {0} not found")]
    TableNotFound(TableId),
    #[error("No KO standings for tournament found")]
    KoPhaseNotFound,

    #[error("Current user isn't organizer of tournament")]
    NotOrganizer,
    #[error("Public access token does not match tournament")]
    BadAccessToken,

    #[error("Need at least {required} teams, found {found}")]
    NotEnoughTeams { required: usize, found: usize },
    #[error("Qualification matches already created for tournament")]
    QualificationAlreadyGenerated,
    #[error("Tournament has already started")]
    TournamentAlreadyStarted,
    #[error("Registration end must be in the future")]
    InvalidRegistrationEnd,
    #[error("Max participants must be between {min} and {max}")]
    InvalidMaxParticipants { min: u32, max: u32 },
    #[error("New max participants is lower than the {0} already registered teams")]
    MaxParticipantsBelowTeamCount(usize),
    #[error("Name must be between {min} and {max} characters")]
    InvalidName { min: usize, max: usize },
    #[error("A team with this name already exists")]
    DuplicateTeamName,
    #[error("A beer pong table with this name already exists")]
    DuplicateTableName,
    #[error("Could not read team import: {0}")]
    ImportFailed(String),

    #[error("Not all teams in this match are ready yet")]
    TeamsNotCheckedIn,
    #[error("Team {team} is not a participant of {match_ref}")]
    NotAParticipant { team: TeamId, match_ref: MatchRef },
    #[error("Cannot mark drinks for team {0} as picked up, currently playing in another match")]
    TeamCurrentlyPlaying(TeamId),
    #[error("Match has already started")]
    MatchAlreadyStarted,
    #[error("Match has already ended")]
    MatchAlreadyEnded,
    #[error("Match has not started yet")]
    MatchNotStarted,
    #[error("End time must not be before start time")]
    EndBeforeStart,
    #[error("Winner must be one of the participants")]
    InvalidWinner(TeamId),
    #[error("Winner points must be between 0 and {0}")]
    WinnerPointsOutOfRange(u32),

    #[error("Qualification matches still running")]
    QualificationIncomplete,
    #[error("Exactly {expected} teams are required for knockout phase (selected {selected})")]
    WrongNumberOfTeams { expected: usize, selected: usize },
    #[error("Team {0} was selected more than once for the knockout phase")]
    DuplicateTeamSelected(TeamId),
    #[error("The qualified teams are not in the correct order")]
    SeedingOrder,
    #[error("Team {0} is already disqualified from the knockout phase")]
    DisqualifiedTeamSelected(TeamId),
    #[error("Team {0} is not on the edge for qualification")]
    NotAnEdgeTeam(TeamId),
    #[error("Expected {expected} edge teams to be picked, got {picked}")]
    WrongEdgeSelection { expected: usize, picked: usize },
    #[error("Team of first round can't be changed")]
    LeafStandingImmutable,
    #[error("Team of next standing isn't empty")]
    NextStandingDecided,
    #[error("Team isn't assigned to a previous standing")]
    TeamNotInPrecedingStandings,
    #[error("Both teams for the next match must be set")]
    OpponentNotDecided,
    #[error("The final standing has no following match")]
    NoFollowingMatch,
    #[error("No root node for KO matches tree found")]
    MissingKoRoot,

    #[error("Team {team} already picked up drinks for {match_ref}")]
    DrinksAlreadyCollected { match_ref: MatchRef, team: TeamId },
    #[error("Beer pong table {0} was modified concurrently")]
    TableVersionConflict(TableId),
    #[error("Beer pong table {0} is already occupied")]
    TableOccupied(TableId),

    #[error("Generated KO tree is invalid: {0:?}")]
    InvalidKoTree(KoTreeValidation),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            TournamentNotFound(_) | TeamNotFound(_) | MatchNotFound(_) | StandingNotFound(_)
            | TableNotFound(_) | KoPhaseNotFound => ErrorKind::NotFound,
            NotOrganizer | BadAccessToken => ErrorKind::AccessDenied,
            DrinksAlreadyCollected { .. } | TableVersionConflict(_) | TableOccupied(_) => {
                ErrorKind::Conflict
            }
            InvalidKoTree(_) => ErrorKind::InvariantViolation,
            _ => ErrorKind::PreconditionFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, TournamentError>;
