//! Qualification phase: pairing generation, drinks pickup with auto-start, and results.

use crate::logic::scheduling::is_team_currently_playing;
use crate::logic::tables::{release_table, schedule_qualification_matches};
use crate::models::{
    MatchId, MatchRef, QualificationMatch, Result, TeamId, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Deserialize;

/// Teams required before qualification matches can be generated.
pub const MIN_TEAMS_FOR_QUALIFICATION: usize = 16;

/// Result entry for a started match.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ScoreUpdate {
    pub winner_team_id: TeamId,
    pub winner_points: u32,
}

/// Organizer update of one qualification match. Drinks pickup is applied before the score.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct QualificationMatchUpdate {
    pub drinks_pickup: Option<TeamId>,
    pub score_update: Option<ScoreUpdate>,
}

/// Generate the qualification matches: shuffle the teams and pair every team with its
/// predecessor (wrapping), so each team plays exactly two different opponents.
/// Free tables are filled right away.
pub fn generate_qualification_matches(tournament: &mut Tournament, user: &str) -> Result<()> {
    tournament.ensure_organizer(user)?;
    if tournament.has_started() {
        log::debug!(
            "Qualification matches for tournament {} already exist",
            tournament.id
        );
        return Err(TournamentError::QualificationAlreadyGenerated);
    }
    if tournament.teams.len() < MIN_TEAMS_FOR_QUALIFICATION {
        return Err(TournamentError::NotEnoughTeams {
            required: MIN_TEAMS_FOR_QUALIFICATION,
            found: tournament.teams.len(),
        });
    }

    let mut team_ids: Vec<TeamId> = tournament.teams.iter().map(|t| t.id).collect();
    team_ids.shuffle(&mut rand::thread_rng());

    let n = team_ids.len();
    tournament.qualification_matches = (0..n)
        .map(|i| QualificationMatch::new(team_ids[i], team_ids[(i + n - 1) % n]))
        .collect();
    log::info!(
        "Generated {} qualification matches for tournament {}",
        n,
        tournament.id
    );

    schedule_qualification_matches(tournament)
}

/// Apply a drinks pickup and/or a score update. Every participant must be checked in.
/// On error nothing is applied.
pub fn update_qualification_match(
    tournament: &mut Tournament,
    user: &str,
    match_id: MatchId,
    update: QualificationMatchUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    tournament.ensure_organizer(user)?;
    let m = tournament.qualification_match(match_id)?;
    if !m.teams().iter().all(|&t| tournament.is_team_checked_in(t)) {
        log::debug!("Not all teams of match {} are checked in", match_id);
        return Err(TournamentError::TeamsNotCheckedIn);
    }

    let mut updated = tournament.clone();
    if let Some(team) = update.drinks_pickup {
        pick_up_drinks(&mut updated, match_id, team, now)?;
    }
    if let Some(score) = update.score_update {
        post_result(&mut updated, match_id, score, now)?;
    }
    *tournament = updated;
    Ok(())
}

fn pick_up_drinks(
    tournament: &mut Tournament,
    match_id: MatchId,
    team: TeamId,
    now: DateTime<Utc>,
) -> Result<()> {
    let match_ref = MatchRef::Qualification(match_id);
    let m = tournament.qualification_match(match_id)?;
    let participation = m
        .participations()
        .iter()
        .find(|p| p.team == team)
        .ok_or(TournamentError::NotAParticipant { team, match_ref })?;

    if participation.drinks_collected {
        return Err(TournamentError::DrinksAlreadyCollected { match_ref, team });
    }
    if is_team_currently_playing(tournament, team) {
        return Err(TournamentError::TeamCurrentlyPlaying(team));
    }
    if m.times.has_started() {
        return Err(TournamentError::MatchAlreadyStarted);
    }
    if m.times.is_finished() {
        return Err(TournamentError::MatchAlreadyEnded);
    }

    if let Some(p) = tournament
        .qualification_match_mut(match_id)?
        .participation_mut(team)
    {
        p.drinks_collected = true;
    }
    log::debug!("Team {} picked up drinks for {}", team, match_ref);

    try_start(tournament, match_id, now)?;
    Ok(())
}

/// Start the match if both teams have their drinks and neither is busy elsewhere.
fn try_start(tournament: &mut Tournament, match_id: MatchId, now: DateTime<Utc>) -> Result<bool> {
    let m = tournament.qualification_match(match_id)?;
    if !m.all_drinks_collected() {
        log::debug!("Match {} still waits for drinks", match_id);
        return Ok(false);
    }
    if m
        .teams()
        .iter()
        .any(|&team| is_team_currently_playing(tournament, team))
    {
        log::debug!("A team of match {} is still playing elsewhere", match_id);
        return Ok(false);
    }

    tournament
        .qualification_match_mut(match_id)?
        .times
        .start(now)?;
    log::info!("Starting qualification match {}", match_id);
    Ok(true)
}

/// Record the winner, end the match, free its table, refill the tables and start
/// matches that were only blocked by the two teams.
fn post_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    score: ScoreUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    let m = tournament.qualification_match_mut(match_id)?;
    if m.times.is_finished() {
        return Err(TournamentError::MatchAlreadyEnded);
    }
    match m.times.start_time() {
        Some(start) if start <= now => {}
        _ => return Err(TournamentError::MatchNotStarted),
    }
    m.set_result(score.winner_team_id, score.winner_points)?;
    m.times.finish(now)?;
    let teams = m.teams();
    log::info!(
        "Qualification match {} won by team {} with {} points",
        match_id,
        score.winner_team_id,
        score.winner_points
    );

    for team in teams {
        tournament.team_mut(team)?.mark_available(now);
    }

    if release_table(tournament, MatchRef::Qualification(match_id))? {
        schedule_qualification_matches(tournament)?;
    } else {
        log::warn!("Qualification match {} finished without a table", match_id);
    }

    // matches that only waited for one of these teams to stop playing
    let waiting: Vec<MatchId> = tournament
        .qualification_matches
        .iter()
        .filter(|m| {
            !m.times.has_started()
                && m.all_drinks_collected()
                && teams.iter().any(|&team| m.has_team(team))
        })
        .map(|m| m.id)
        .collect();
    for id in waiting {
        try_start(tournament, id, now)?;
    }
    Ok(())
}
