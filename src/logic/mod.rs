//! Tournament business logic: setup, teams, qualification, scheduling, tables, KO phase, score table.

mod import;
mod ko_phase;
mod qualification;
mod scheduling;
mod score_table;
mod setup;
mod tables;
mod teams;
mod views;

pub use import::import_teams_csv;
pub use ko_phase::{
    generate_ko_matches, ko_tree, update_ko_standing, KoStandingUpdate, KoTeam, KoTreeNode,
    SetWinnerTeam,
};
pub use qualification::{
    generate_qualification_matches, update_qualification_match, QualificationMatchUpdate,
    ScoreUpdate, MIN_TEAMS_FOR_QUALIFICATION,
};
pub use scheduling::{
    earliest_possible_start, is_team_currently_playing, ko_match_queue, ko_standing_status,
    qualification_match_queue, qualification_match_status,
    qualification_matches_by_expected_start,
};
pub use score_table::{score_table, QualificationTeamScore};
pub use setup::{update_tournament, TournamentUpdate};
pub use tables::{
    add_table, delete_table, release_table, rename_table, schedule_ko_matches,
    schedule_qualification_matches, TABLE_ASSIGN_ATTEMPTS,
};
pub use teams::{
    add_team, delete_team, mark_team_ready, rename_team, signup_team, team_views,
    SignupTeamResult,
};
pub use views::{
    qualification_match_views, queued_ko_matches, queued_qualification_matches,
    tournament_overview, QualificationMatchView, QualificationParticipantView, QueuedMatchView,
    TournamentOverview,
};
