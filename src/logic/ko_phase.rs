//! KO phase: bracket generation from the score table, winner propagation, drinks pickup
//! with auto-start, and the tree read path.

use crate::logic::scheduling::{is_team_currently_playing, ko_standing_status};
use crate::logic::score_table::score_table;
use crate::logic::tables::{release_table, schedule_ko_matches};
use crate::models::{
    KoBracket, KoTreeValidation, MatchRef, MatchStatus, Result, StandingId, TableView, TeamId,
    Tournament, TournamentError, KO_TEAM_COUNT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Winner to set on a standing; `team_id: None` clears it.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct SetWinnerTeam {
    pub team_id: Option<TeamId>,
}

/// Organizer update of one standing. The winner is applied before the drinks pickup.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct KoStandingUpdate {
    pub team_set: Option<SetWinnerTeam>,
    pub drinks_pickup: Option<TeamId>,
}

/// Check the organizer's 16 seeds against the score table.
///
/// Teams ranked above the 16th place must lead the list in score-table order, teams ranked
/// below it must be absent, and the remaining slots must hold teams tied with the 16th place.
fn validate_seeding(tournament: &Tournament, team_ids: &[TeamId]) -> Result<()> {
    if team_ids.len() != KO_TEAM_COUNT {
        return Err(TournamentError::WrongNumberOfTeams {
            expected: KO_TEAM_COUNT,
            selected: team_ids.len(),
        });
    }
    let mut seen = HashSet::new();
    if let Some(&dup) = team_ids.iter().find(|&&id| !seen.insert(id)) {
        return Err(TournamentError::DuplicateTeamSelected(dup));
    }

    let scores = score_table(tournament);
    let Some(edge_position) = scores.get(KO_TEAM_COUNT - 1).map(|s| s.position) else {
        return Err(TournamentError::NotEnoughTeams {
            required: KO_TEAM_COUNT,
            found: scores.len(),
        });
    };

    let guaranteed: Vec<TeamId> = scores
        .iter()
        .filter(|s| s.position < edge_position)
        .map(|s| s.id)
        .collect();
    let disqualified: HashSet<TeamId> = scores
        .iter()
        .filter(|s| s.position > edge_position)
        .map(|s| s.id)
        .collect();
    let edge: HashSet<TeamId> = scores
        .iter()
        .filter(|s| s.position == edge_position)
        .map(|s| s.id)
        .collect();

    if guaranteed.iter().zip(team_ids).any(|(g, t)| g != t) {
        return Err(TournamentError::SeedingOrder);
    }
    if let Some(&id) = team_ids.iter().find(|&&id| disqualified.contains(&id)) {
        return Err(TournamentError::DisqualifiedTeamSelected(id));
    }

    let picked_edge: Vec<TeamId> = team_ids
        .iter()
        .copied()
        .filter(|id| !guaranteed.contains(id))
        .collect();
    let places_left = KO_TEAM_COUNT - guaranteed.len();
    if picked_edge.len() != places_left {
        return Err(TournamentError::WrongEdgeSelection {
            expected: places_left,
            picked: picked_edge.len(),
        });
    }
    if let Some(&id) = picked_edge.iter().find(|&&id| !edge.contains(&id)) {
        return Err(TournamentError::NotAnEdgeTeam(id));
    }
    Ok(())
}

/// Build the KO bracket from 16 ordered seeds once every qualification match has a winner.
/// Replaces any previous bracket and fills free tables with the first KO round.
pub fn generate_ko_matches(
    tournament: &mut Tournament,
    user: &str,
    team_ids: &[TeamId],
) -> Result<()> {
    tournament.ensure_organizer(user)?;

    let incomplete = tournament.qualification_matches.is_empty()
        || tournament
            .qualification_matches
            .iter()
            .any(|m| m.winner().is_none());
    if incomplete {
        log::debug!(
            "Qualification of tournament {} still running, cannot create KO matches",
            tournament.id
        );
        return Err(TournamentError::QualificationIncomplete);
    }

    validate_seeding(tournament, team_ids)?;

    let bracket = KoBracket::build(team_ids);
    let validity = bracket.evaluate_validity();
    if validity != KoTreeValidation::Ok {
        log::error!("Generated KO tree is invalid {:?}", validity);
        return Err(TournamentError::InvalidKoTree(validity));
    }

    // tables still pointing into the previous bracket
    let stale: Vec<MatchRef> = tournament
        .tables
        .iter()
        .filter_map(|t| t.current_match())
        .filter(|m| matches!(m, MatchRef::Ko(_)))
        .collect();
    for match_ref in stale {
        release_table(tournament, match_ref)?;
    }
    tournament.ko_standings = bracket;
    log::info!(
        "Generated KO bracket with {} standings for tournament {}",
        tournament.ko_standings.len(),
        tournament.id
    );

    schedule_ko_matches(tournament)
}

/// Apply a winner change and/or a drinks pickup to a standing. On error nothing is applied.
pub fn update_ko_standing(
    tournament: &mut Tournament,
    user: &str,
    standing_id: StandingId,
    update: KoStandingUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    tournament.ensure_organizer(user)?;
    tournament.ko_standings.standing(standing_id)?;

    let mut updated = tournament.clone();
    if let Some(team_set) = update.team_set {
        set_winner(&mut updated, standing_id, team_set.team_id, now)?;
    }
    if let Some(team) = update.drinks_pickup {
        pick_up_drinks(&mut updated, standing_id, team, now)?;
    }
    *tournament = updated;
    Ok(())
}

fn set_winner(
    tournament: &mut Tournament,
    standing_id: StandingId,
    team: Option<TeamId>,
    now: DateTime<Utc>,
) -> Result<()> {
    let bracket = &tournament.ko_standings;
    let standing = bracket.standing(standing_id)?;
    if standing.is_leaf() {
        return Err(TournamentError::LeafStandingImmutable);
    }
    if let Some(next) = standing.next_standing() {
        if bracket.standing(next)?.team().is_some() {
            return Err(TournamentError::NextStandingDecided);
        }
    }

    let Some(team) = team else {
        tournament.ko_standings.set_team(standing_id, None)?;
        log::debug!("Cleared winner of KO standing {}", standing_id);
        return Ok(());
    };

    tournament.team(team)?;
    if !standing.times.has_started() {
        return Err(TournamentError::MatchNotStarted);
    }
    tournament.ko_standings.set_team(standing_id, Some(team))?;
    if let Some(s) = tournament.ko_standings.get_mut(standing_id) {
        s.times.finish(now)?;
    }
    log::info!("KO standing {} won by team {}", standing_id, team);

    if release_table(tournament, MatchRef::Ko(standing_id))? {
        schedule_ko_matches(tournament)?;
    }
    Ok(())
}

fn pick_up_drinks(
    tournament: &mut Tournament,
    standing_id: StandingId,
    team: TeamId,
    now: DateTime<Utc>,
) -> Result<()> {
    let bracket = &tournament.ko_standings;
    let standing = bracket.standing(standing_id)?;
    if standing.team() != Some(team) {
        return Err(TournamentError::NotAParticipant {
            team,
            match_ref: MatchRef::Ko(standing_id),
        });
    }
    if !tournament.is_team_checked_in(team) {
        return Err(TournamentError::TeamsNotCheckedIn);
    }

    if standing.drinks_collected {
        return Err(TournamentError::DrinksAlreadyCollected {
            match_ref: MatchRef::Ko(standing_id),
            team,
        });
    }
    if is_team_currently_playing(tournament, team) {
        return Err(TournamentError::TeamCurrentlyPlaying(team));
    }

    let next_id = standing
        .next_standing()
        .ok_or(TournamentError::NoFollowingMatch)?;
    let next = bracket.standing(next_id)?;
    if next.times.has_started() {
        return Err(TournamentError::MatchAlreadyStarted);
    }
    if next.times.is_finished() {
        return Err(TournamentError::MatchAlreadyEnded);
    }
    if bracket.preceding_teams(next_id).iter().any(Option::is_none) {
        return Err(TournamentError::OpponentNotDecided);
    }

    if let Some(s) = tournament.ko_standings.get_mut(standing_id) {
        s.drinks_collected = true;
    }
    log::debug!("Team {} picked up drinks for KO match {}", team, next_id);

    try_start(tournament, next_id, now)?;
    Ok(())
}

/// Start a KO match once both participants are set, neither plays elsewhere and both have drinks.
fn try_start(
    tournament: &mut Tournament,
    standing_id: StandingId,
    now: DateTime<Utc>,
) -> Result<bool> {
    let bracket = &tournament.ko_standings;
    let participants: Vec<TeamId> = bracket
        .preceding_teams(standing_id)
        .into_iter()
        .flatten()
        .collect();
    if participants.len() != 2 {
        log::debug!(
            "Cannot start KO match {}; {} of 2 participants set",
            standing_id,
            participants.len()
        );
        return Ok(false);
    }
    if participants
        .iter()
        .any(|&t| is_team_currently_playing(tournament, t))
    {
        log::debug!(
            "Cannot start KO match {}; a participating team is currently playing",
            standing_id
        );
        return Ok(false);
    }
    let all_collected = bracket
        .standing(standing_id)?
        .preceding_standings()
        .iter()
        .all(|&p| bracket.get(p).is_some_and(|s| s.drinks_collected));
    if !all_collected {
        log::debug!("Cannot start KO match {}; drinks missing", standing_id);
        return Ok(false);
    }

    if let Some(s) = tournament.ko_standings.get_mut(standing_id) {
        s.times.start(now)?;
    }
    log::info!("Starting KO match {}", standing_id);
    Ok(true)
}

/// Team shown on a KO tree node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KoTeam {
    pub id: TeamId,
    pub name: String,
}

/// Recursive read model of the bracket, rooted at the final.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KoTreeNode {
    pub id: StandingId,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub team: Option<KoTeam>,
    pub drinks_collected: bool,
    pub table: Option<TableView>,
    pub preceding_standings: Vec<KoTreeNode>,
}

/// The whole bracket as a tree. Children are derived from every standing's
/// `next_standing` link, not from cached child lists.
pub fn ko_tree(tournament: &Tournament) -> Result<KoTreeNode> {
    let bracket = &tournament.ko_standings;
    if bracket.is_empty() {
        log::debug!("No KO standings for tournament {} found", tournament.id);
        return Err(TournamentError::KoPhaseNotFound);
    }
    let root = bracket.root().ok_or(TournamentError::MissingKoRoot)?;
    tree_node(tournament, root)
}

fn tree_node(tournament: &Tournament, id: StandingId) -> Result<KoTreeNode> {
    let standing = tournament.ko_standings.standing(id)?;
    let team = match standing.team() {
        Some(team_id) => Some(KoTeam {
            id: team_id,
            name: tournament.team(team_id)?.name.clone(),
        }),
        None => None,
    };
    let preceding_standings = tournament
        .ko_standings
        .children_from_links(id)
        .into_iter()
        .map(|child| tree_node(tournament, child))
        .collect::<Result<Vec<_>>>()?;

    Ok(KoTreeNode {
        id,
        start_time: standing.times.start_time(),
        end_time: standing.times.end_time(),
        status: ko_standing_status(tournament, standing),
        team,
        drinks_collected: standing.drinks_collected,
        table: tournament
            .table_of(MatchRef::Ko(id))
            .map(TableView::from_table),
        preceding_standings,
    })
}
