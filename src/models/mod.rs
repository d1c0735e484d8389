//! Data structures for the beer pong tournament: teams, matches, KO standings, tables, tournament state.

mod error;
mod game;
mod ko_standing;
mod table;
mod team;
mod tournament;

pub use error::{ErrorKind, Result, TournamentError};
pub use game::{
    MatchId, MatchRef, MatchStatus, MatchTimes, Participation, QualificationMatch,
    MAX_WINNER_POINTS,
};
pub use ko_standing::{
    KoBracket, KoStanding, KoTreeValidation, StandingId, KO_TEAM_COUNT, KO_TREE_DEPTH,
};
pub use table::{BeerPongTable, TableId, TableView};
pub use team::{Team, TeamId, TeamView};
pub use tournament::{
    validate_name, Tournament, TournamentId, MAX_PARTICIPANTS, MIN_PARTICIPANTS, NAME_LENGTH,
};
