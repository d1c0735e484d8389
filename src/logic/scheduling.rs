//! Scheduling: derived match status, the qualification ordering heuristic, and the
//! team-disjoint queues of matches waiting for a table.

use crate::models::{
    KoStanding, MatchRef, MatchStatus, QualificationMatch, StandingId, TeamId, Tournament,
};
use chrono::{DateTime, Utc};
use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};

/// Current status of a qualification match.
pub fn qualification_match_status(
    tournament: &Tournament,
    m: &QualificationMatch,
) -> MatchStatus {
    let has_table = tournament
        .table_of(MatchRef::Qualification(m.id))
        .is_some();
    let all_checked_in = m
        .teams()
        .iter()
        .all(|&id| tournament.is_team_checked_in(id));
    MatchStatus::derive(&m.times, has_table, all_checked_in)
}

/// Current status of a KO standing's match. Its participants are the teams of the preceding standings.
pub fn ko_standing_status(tournament: &Tournament, standing: &KoStanding) -> MatchStatus {
    let has_table = tournament.table_of(MatchRef::Ko(standing.id)).is_some();
    let all_checked_in = tournament
        .ko_standings
        .preceding_teams(standing.id)
        .iter()
        .all(|team| team.is_some_and(|id| tournament.is_team_checked_in(id)));
    MatchStatus::derive(&standing.times, has_table, all_checked_in)
}

/// A team is playing if any started, unfinished match (qualification or KO) involves it.
pub fn is_team_currently_playing(tournament: &Tournament, team: TeamId) -> bool {
    let in_qualification = tournament
        .qualification_matches
        .iter()
        .any(|m| m.times.is_playing() && m.has_team(team));
    if in_qualification {
        return true;
    }
    tournament.ko_standings.iter().any(|s| {
        s.times.is_playing()
            && tournament
                .ko_standings
                .preceding_teams(s.id)
                .contains(&Some(team))
    })
}

/// The later of the two teams' available-since timestamps; `None` (never) if either team has none yet.
pub fn earliest_possible_start(
    tournament: &Tournament,
    m: &QualificationMatch,
) -> Option<DateTime<Utc>> {
    let mut latest = None;
    for id in m.teams() {
        let since = tournament.team(id).ok()?.available_since?;
        latest = latest.max(Some(since));
    }
    latest
}

/// `None` means "not possible yet" and sorts after every timestamp.
fn cmp_earliest_start(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn finished_matches_by_team(tournament: &Tournament) -> HashMap<TeamId, usize> {
    let mut played = HashMap::new();
    for m in tournament
        .qualification_matches
        .iter()
        .filter(|m| m.times.is_finished())
    {
        for team in m.teams() {
            *played.entry(team).or_insert(0) += 1;
        }
    }
    played
}

/// All qualification matches in scheduling order.
///
/// 1. Descending by the finished-match count of the match's less experienced team.
/// 2. Ascending by [`earliest_possible_start`].
///
/// The sort is stable, so fully tied matches keep their generation order.
pub fn qualification_matches_by_expected_start(
    tournament: &Tournament,
) -> Vec<&QualificationMatch> {
    let played = finished_matches_by_team(tournament);
    let mut keyed: Vec<_> = tournament
        .qualification_matches
        .iter()
        .map(|m| {
            let min_played = m
                .teams()
                .iter()
                .map(|team| played.get(team).copied().unwrap_or(0))
                .min()
                .unwrap_or(0);
            (m, Reverse(min_played), earliest_possible_start(tournament, m))
        })
        .collect();
    keyed.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| cmp_earliest_start(a.2, b.2)));
    keyed.into_iter().map(|(m, _, _)| m).collect()
}

/// Checked-in matches without a table, in heuristic order, skipping any match that
/// shares a team with a queued/playing match or with an earlier entry of the queue.
pub fn qualification_match_queue(tournament: &Tournament) -> Vec<&QualificationMatch> {
    let ordered = qualification_matches_by_expected_start(tournament);

    let mut busy: HashSet<TeamId> = ordered
        .iter()
        .filter(|m| {
            matches!(
                qualification_match_status(tournament, m),
                MatchStatus::QueuedCollectingDrinks | MatchStatus::Playing
            )
        })
        .flat_map(|m| m.teams())
        .collect();

    let mut queue = Vec::new();
    for m in ordered {
        if qualification_match_status(tournament, m) != MatchStatus::TeamsCheckedIn {
            continue;
        }
        // team already playing or already queued
        if m.teams().iter().any(|team| busy.contains(team)) {
            continue;
        }
        busy.extend(m.teams());
        queue.push(m);
    }
    queue
}

/// KO matches ready for a table, rounds closest to the leaves first.
///
/// Collects the non-leaf standings breadth-first from the final, reverses that order,
/// and keeps those not started, without a table, whose preceding standings are decided.
pub fn ko_match_queue(tournament: &Tournament) -> Vec<StandingId> {
    let bracket = &tournament.ko_standings;
    let Some(root) = bracket.root() else {
        return Vec::new();
    };

    let is_leaf = |id: StandingId| bracket.get(id).map_or(true, KoStanding::is_leaf);
    let mut breadth_first = Vec::new();
    let mut level = vec![root];
    while level.first().is_some_and(|&id| !is_leaf(id)) {
        breadth_first.extend(level.iter().rev().copied());
        level = level
            .iter()
            .filter_map(|&id| bracket.get(id))
            .flat_map(|s| s.preceding_standings().iter().copied())
            .collect();
    }
    breadth_first.reverse();

    breadth_first
        .into_iter()
        .filter(|&id| {
            let Some(s) = bracket.get(id) else {
                return false;
            };
            !s.is_leaf()
                && !s.times.has_started()
                && tournament.table_of(MatchRef::Ko(id)).is_none()
                && bracket.have_preceding_matches_ended(id)
        })
        .collect()
}
