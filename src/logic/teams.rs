//! Team registration (self-signup and organizer), renaming, deletion and check-in.

use crate::logic::scheduling::is_team_currently_playing;
use crate::logic::tables::schedule_qualification_matches;
use crate::models::{validate_name, Result, Team, TeamId, TeamView, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Outcome of a registration attempt that passed authorization and name validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "result", content = "team_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupTeamResult {
    Success(TeamId),
    RegistrationClosed,
    MaxParticipantsReached,
    TeamAlreadyExists,
}

/// Register a team. Runs under the caller's exclusive lock, so the count check and the insert are atomic.
fn register(tournament: &mut Tournament, name: &str, now: DateTime<Utc>) -> SignupTeamResult {
    if !tournament.is_registration_open(now) {
        return SignupTeamResult::RegistrationClosed;
    }
    if tournament.teams.len() >= tournament.max_participants() as usize {
        return SignupTeamResult::MaxParticipantsReached;
    }
    if tournament.teams.iter().any(|t| t.name == name) {
        return SignupTeamResult::TeamAlreadyExists;
    }
    let team = Team::new(name);
    let id = team.id;
    tournament.teams.push(team);
    log::info!("Team {} ({}) signed up for tournament {}", name, id, tournament.id);
    SignupTeamResult::Success(id)
}

/// Self-signup with the tournament's public access token.
pub fn signup_team(
    tournament: &mut Tournament,
    access_token: Uuid,
    name: &str,
    now: DateTime<Utc>,
) -> Result<SignupTeamResult> {
    tournament.ensure_access_token(access_token)?;
    let name = validate_name(name)?;
    Ok(register(tournament, name, now))
}

/// Register a team on behalf of the organizer, under the same rules as self-signup.
pub fn add_team(
    tournament: &mut Tournament,
    user: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<SignupTeamResult> {
    tournament.ensure_organizer(user)?;
    let name = validate_name(name)?;
    Ok(register(tournament, name, now))
}

pub fn rename_team(
    tournament: &mut Tournament,
    user: &str,
    team_id: TeamId,
    name: &str,
) -> Result<()> {
    tournament.ensure_organizer(user)?;
    let name = validate_name(name)?;
    tournament.team(team_id)?;
    if tournament
        .teams
        .iter()
        .any(|t| t.id != team_id && t.name == name)
    {
        return Err(TournamentError::DuplicateTeamName);
    }
    tournament.team_mut(team_id)?.name = name.to_string();
    Ok(())
}

/// Remove a team. Only possible while no qualification matches reference it.
pub fn delete_team(tournament: &mut Tournament, user: &str, team_id: TeamId) -> Result<()> {
    tournament.ensure_organizer(user)?;
    tournament.team(team_id)?;
    if tournament.has_started() {
        return Err(TournamentError::TournamentAlreadyStarted);
    }
    tournament.teams.retain(|t| t.id != team_id);
    log::info!("Deleted team {} from tournament {}", team_id, tournament.id);
    Ok(())
}

/// Check a team in and offer its now eligible matches to free tables.
pub fn mark_team_ready(
    tournament: &mut Tournament,
    user: &str,
    team_id: TeamId,
    now: DateTime<Utc>,
) -> Result<()> {
    tournament.ensure_organizer(user)?;
    let team = tournament.team_mut(team_id)?;
    if team.checked_in {
        log::debug!("Team {} is already checked in", team_id);
        return Ok(());
    }
    team.check_in(now);
    log::info!("Team {} checked in", team_id);
    schedule_qualification_matches(tournament)
}

/// All teams with their current activity.
pub fn team_views(tournament: &Tournament) -> Vec<TeamView> {
    tournament
        .teams
        .iter()
        .map(|t| TeamView {
            id: t.id,
            name: t.name.clone(),
            checked_in: t.checked_in,
            currently_playing: is_team_currently_playing(tournament, t.id),
        })
        .collect()
}
