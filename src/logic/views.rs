//! Read projections for operators and displays.

use crate::logic::scheduling::{
    ko_match_queue, qualification_match_queue, qualification_match_status,
    qualification_matches_by_expected_start,
};
use crate::models::{
    MatchId, MatchRef, MatchStatus, QualificationMatch, TableView, TeamId, Tournament,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QualificationParticipantView {
    pub team_id: TeamId,
    pub name: String,
    pub drinks_collected: bool,
    pub is_winner: bool,
    pub is_ready: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QualificationMatchView {
    pub id: MatchId,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub winner_points: Option<u32>,
    pub participants: Vec<QualificationParticipantView>,
    pub table: Option<TableView>,
    pub status: MatchStatus,
}

impl QualificationMatchView {
    pub fn new(tournament: &Tournament, m: &QualificationMatch) -> Self {
        let participants = m
            .participations()
            .iter()
            .map(|p| {
                let team = tournament.team(p.team).ok();
                QualificationParticipantView {
                    team_id: p.team,
                    name: team.map(|t| t.name.clone()).unwrap_or_default(),
                    drinks_collected: p.drinks_collected,
                    is_winner: m.winner() == Some(p.team),
                    is_ready: team.is_some_and(|t| t.checked_in),
                }
            })
            .collect();
        Self {
            id: m.id,
            start_time: m.times.start_time(),
            end_time: m.times.end_time(),
            winner_points: m.winner_points(),
            participants,
            table: tournament
                .table_of(MatchRef::Qualification(m.id))
                .map(TableView::from_table),
            status: qualification_match_status(tournament, m),
        }
    }
}

/// All qualification matches in the order they are expected to be played.
pub fn qualification_match_views(tournament: &Tournament) -> Vec<QualificationMatchView> {
    qualification_matches_by_expected_start(tournament)
        .into_iter()
        .map(|m| QualificationMatchView::new(tournament, m))
        .collect()
}

/// A match waiting in a queue, as shown on the operator display.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QueuedMatchView {
    pub teams: Vec<String>,
    pub table: Option<TableView>,
}

fn team_names(tournament: &Tournament, teams: impl IntoIterator<Item = TeamId>) -> Vec<String> {
    teams
        .into_iter()
        .filter_map(|id| tournament.team(id).ok())
        .map(|t| t.name.clone())
        .collect()
}

pub fn queued_qualification_matches(tournament: &Tournament) -> Vec<QueuedMatchView> {
    qualification_match_queue(tournament)
        .into_iter()
        .map(|m| QueuedMatchView {
            teams: team_names(tournament, m.teams()),
            table: tournament
                .table_of(MatchRef::Qualification(m.id))
                .map(TableView::from_table),
        })
        .collect()
}

pub fn queued_ko_matches(tournament: &Tournament) -> Vec<QueuedMatchView> {
    ko_match_queue(tournament)
        .into_iter()
        .map(|id| QueuedMatchView {
            teams: team_names(
                tournament,
                tournament.ko_standings.preceding_teams(id).into_iter().flatten(),
            ),
            table: tournament
                .table_of(MatchRef::Ko(id))
                .map(TableView::from_table),
        })
        .collect()
}

/// Dashboard counters for one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TournamentOverview {
    pub name: String,
    pub registration_end: DateTime<Utc>,
    pub max_participants: u32,
    pub description: Option<String>,
    pub all_qualification_matches: usize,
    pub played_qualification_matches: usize,
    pub all_ko_matches: usize,
    pub played_ko_matches: usize,
    pub teams: usize,
    pub checked_in_teams: usize,
    pub tables: usize,
    pub tables_in_use: usize,
    pub public_access_token: Uuid,
}

pub fn tournament_overview(tournament: &Tournament) -> TournamentOverview {
    let ko_matches = || tournament.ko_standings.iter().filter(|s| !s.is_leaf());
    TournamentOverview {
        name: tournament.name.clone(),
        registration_end: tournament.registration_end(),
        max_participants: tournament.max_participants(),
        description: tournament.description.clone(),
        all_qualification_matches: tournament.qualification_matches.len(),
        played_qualification_matches: tournament
            .qualification_matches
            .iter()
            .filter(|m| m.times.is_finished())
            .count(),
        all_ko_matches: ko_matches().count(),
        played_ko_matches: ko_matches().filter(|s| s.times.is_finished()).count(),
        teams: tournament.teams.len(),
        checked_in_teams: tournament.teams.iter().filter(|t| t.checked_in).count(),
        tables: tournament.tables.len(),
        tables_in_use: tournament.tables.iter().filter(|t| !t.is_free()).count(),
        public_access_token: tournament.public_access_token(),
    }
}
