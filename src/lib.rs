//! Beer pong tournament engine: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    add_table, add_team, delete_table, delete_team, earliest_possible_start, generate_ko_matches,
    generate_qualification_matches, import_teams_csv, is_team_currently_playing, ko_match_queue,
    ko_standing_status, ko_tree, mark_team_ready, qualification_match_queue,
    qualification_match_status, qualification_match_views,
    qualification_matches_by_expected_start, queued_ko_matches, queued_qualification_matches,
    release_table, rename_table, rename_team, schedule_ko_matches, schedule_qualification_matches,
    score_table, signup_team, team_views, tournament_overview, update_ko_standing,
    update_qualification_match, update_tournament, KoStandingUpdate, KoTeam, KoTreeNode,
    QualificationMatchUpdate, QualificationMatchView, QualificationParticipantView,
    QualificationTeamScore, QueuedMatchView, ScoreUpdate, SetWinnerTeam, SignupTeamResult,
    TournamentOverview, TournamentUpdate, MIN_TEAMS_FOR_QUALIFICATION, TABLE_ASSIGN_ATTEMPTS,
};
pub use models::{
    validate_name, BeerPongTable, ErrorKind, KoBracket, KoStanding, KoTreeValidation, MatchId,
    MatchRef, MatchStatus, MatchTimes, Participation, QualificationMatch, StandingId, TableId,
    TableView, Team, TeamId, TeamView, Tournament, TournamentError, TournamentId, KO_TEAM_COUNT,
    KO_TREE_DEPTH, MAX_PARTICIPANTS, MAX_WINNER_POINTS, MIN_PARTICIPANTS, NAME_LENGTH,
};
