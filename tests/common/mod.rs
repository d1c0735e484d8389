//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use beer_pong_tournament::{
    add_team, mark_team_ready, update_qualification_match, MatchId, QualificationMatch,
    QualificationMatchUpdate, ScoreUpdate, SignupTeamResult, TeamId, Tournament,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const ORGANIZER: &str = "organizer";

/// Fixed reference time all tests count from.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap()
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

/// Tournament with `n` registered (not checked-in) teams named `Team 00`, `Team 01`, ...
pub fn tournament_with_teams(n: usize) -> Tournament {
    let mut t = Tournament::new("Beer Brawl", at(24 * 60), 64, None, ORGANIZER, t0()).unwrap();
    for i in 0..n {
        let result = add_team(&mut t, ORGANIZER, &format!("Team {i:02}"), t0()).unwrap();
        assert!(matches!(result, SignupTeamResult::Success(_)));
    }
    t
}

pub fn team_ids(t: &Tournament) -> Vec<TeamId> {
    t.teams.iter().map(|team| team.id).collect()
}

pub fn check_in_all(t: &mut Tournament, now: DateTime<Utc>) {
    for id in team_ids(t) {
        mark_team_ready(t, ORGANIZER, id, now).unwrap();
    }
}

pub fn pick_up(t: &mut Tournament, match_id: MatchId, team: TeamId, now: DateTime<Utc>) {
    let update = QualificationMatchUpdate {
        drinks_pickup: Some(team),
        score_update: None,
    };
    update_qualification_match(t, ORGANIZER, match_id, update, now).unwrap();
}

pub fn post_score(
    t: &mut Tournament,
    match_id: MatchId,
    winner: TeamId,
    points: u32,
    now: DateTime<Utc>,
) {
    let update = QualificationMatchUpdate {
        drinks_pickup: None,
        score_update: Some(ScoreUpdate {
            winner_team_id: winner,
            winner_points: points,
        }),
    };
    update_qualification_match(t, ORGANIZER, match_id, update, now).unwrap();
}

/// Drinks for both teams, then the first participant wins.
pub fn play_match(t: &mut Tournament, match_id: MatchId, points: u32, now: DateTime<Utc>) {
    let teams = t.qualification_match(match_id).unwrap().teams();
    for team in teams {
        pick_up(t, match_id, team, now);
    }
    post_score(t, match_id, teams[0], points, now);
}

/// Append an already finished match with a fixed result, bypassing pairing and tables.
pub fn finished_match(
    t: &mut Tournament,
    winner: TeamId,
    loser: TeamId,
    points: u32,
    now: DateTime<Utc>,
) -> MatchId {
    let mut m = QualificationMatch::new(winner, loser);
    m.times.start(now).unwrap();
    m.set_result(winner, points).unwrap();
    m.times.finish(now).unwrap();
    let id = m.id;
    t.qualification_matches.push(m);
    id
}

/// 20 teams with a fixed score table: teams 0..15 have distinct ranks 1..15,
/// teams 15..19 tie for position 16 (the edge), team 19 is last.
pub fn tournament_with_edge_tie() -> Tournament {
    let mut t = tournament_with_teams(20);
    let ids = team_ids(&t);
    for (i, &id) in ids.iter().take(15).enumerate() {
        finished_match(&mut t, id, ids[19], 100 - i as u32, t0());
    }
    for &id in &ids[15..19] {
        finished_match(&mut t, id, ids[19], 10, t0());
    }
    t
}

/// A valid KO seeding for [`tournament_with_edge_tie`]: the 15 guaranteed teams, then `edge_pick`.
pub fn seeds_with_edge_pick(t: &Tournament, edge_pick: usize) -> Vec<TeamId> {
    let ids = team_ids(t);
    let mut seeds: Vec<TeamId> = ids[..15].to_vec();
    seeds.push(ids[edge_pick]);
    seeds
}
