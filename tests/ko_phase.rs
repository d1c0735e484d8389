//! Integration tests for the KO phase: seeding rules, bracket shape, progression and the tree view.

mod common;

use beer_pong_tournament::{
    add_table, generate_ko_matches, is_team_currently_playing, ko_match_queue, ko_standing_status,
    ko_tree, update_ko_standing, KoBracket, KoStandingUpdate, KoTreeNode, KoTreeValidation,
    MatchRef, MatchStatus, QualificationMatch, SetWinnerTeam, StandingId, TeamId, Tournament,
    TournamentError,
};
use common::*;
use std::collections::HashSet;
use uuid::Uuid;

/// Tournament from [`tournament_with_edge_tie`] with a generated bracket and every team checked in.
fn with_bracket() -> (Tournament, Vec<TeamId>) {
    let mut t = tournament_with_edge_tie();
    let seeds = seeds_with_edge_pick(&t, 17);
    generate_ko_matches(&mut t, ORGANIZER, &seeds).unwrap();
    check_in_all(&mut t, t0());
    (t, seeds)
}

fn drinks(
    t: &mut Tournament,
    standing: StandingId,
    team: TeamId,
    minute: i64,
) -> Result<(), TournamentError> {
    let update = KoStandingUpdate {
        team_set: None,
        drinks_pickup: Some(team),
    };
    update_ko_standing(t, ORGANIZER, standing, update, at(minute))
}

fn set_winner(
    t: &mut Tournament,
    standing: StandingId,
    team: Option<TeamId>,
    minute: i64,
) -> Result<(), TournamentError> {
    let update = KoStandingUpdate {
        team_set: Some(SetWinnerTeam { team_id: team }),
        drinks_pickup: None,
    };
    update_ko_standing(t, ORGANIZER, standing, update, at(minute))
}

/// Both leaves of a first round standing pick up drinks; the standing starts.
fn start_first_round(t: &mut Tournament, standing: StandingId, minute: i64) {
    let leaves = t.ko_standings.get(standing).unwrap().preceding_standings().to_vec();
    for leaf in leaves {
        let team = t.ko_standings.get(leaf).unwrap().team().unwrap();
        drinks(t, leaf, team, minute).unwrap();
    }
}

/// Decide `standing` and everything below it; the first preceding standing always wins.
fn play_out(t: &mut Tournament, standing: StandingId, minute: i64) {
    let children = t.ko_standings.get(standing).unwrap().preceding_standings().to_vec();
    if children.is_empty() {
        return;
    }
    for &child in &children {
        play_out(t, child, minute);
    }
    for &child in &children {
        let team = t.ko_standings.get(child).unwrap().team().unwrap();
        drinks(t, child, team, minute).unwrap();
    }
    let winner = t.ko_standings.get(children[0]).unwrap().team();
    set_winner(t, standing, winner, minute).unwrap();
}

fn first_round(t: &Tournament) -> Vec<StandingId> {
    t.ko_standings
        .iter()
        .filter(|s| {
            !s.is_leaf()
                && s.preceding_standings()
                    .iter()
                    .all(|&p| t.ko_standings.get(p).unwrap().is_leaf())
        })
        .map(|s| s.id)
        .collect()
}

fn depth(node: &KoTreeNode) -> usize {
    node.preceding_standings
        .iter()
        .map(|c| depth(c) + 1)
        .max()
        .unwrap_or(0)
}

#[test]
fn generation_requires_finished_qualification() {
    let mut t = tournament_with_teams(16);
    let ids = team_ids(&t);
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &ids),
        Err(TournamentError::QualificationIncomplete)
    );

    let mut t = tournament_with_edge_tie();
    let ids = team_ids(&t);
    t.qualification_matches
        .push(QualificationMatch::new(ids[0], ids[1]));
    let seeds = seeds_with_edge_pick(&t, 15);
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::QualificationIncomplete)
    );
    assert!(t.ko_standings.is_empty());
}

#[test]
fn generation_requires_organizer() {
    let mut t = tournament_with_edge_tie();
    let seeds = seeds_with_edge_pick(&t, 15);
    assert_eq!(
        generate_ko_matches(&mut t, "guest", &seeds),
        Err(TournamentError::NotOrganizer)
    );
}

#[test]
fn exactly_16_distinct_teams_are_required() {
    let mut t = tournament_with_edge_tie();
    let mut seeds = seeds_with_edge_pick(&t, 15);
    seeds.pop();
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::WrongNumberOfTeams {
            expected: 16,
            selected: 15
        })
    );

    let mut seeds = seeds_with_edge_pick(&t, 15);
    seeds[15] = seeds[3];
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::DuplicateTeamSelected(seeds[3]))
    );
}

#[test]
fn guaranteed_teams_must_lead_in_score_order() {
    let mut t = tournament_with_edge_tie();
    let mut seeds = seeds_with_edge_pick(&t, 15);
    seeds.swap(0, 1);
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::SeedingOrder)
    );
}

#[test]
fn team_below_the_edge_is_rejected() {
    let mut t = tournament_with_edge_tie();
    let ids = team_ids(&t);
    let seeds = seeds_with_edge_pick(&t, 19);
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::DisqualifiedTeamSelected(ids[19]))
    );
}

#[test]
fn team_outside_the_tournament_is_not_an_edge_team() {
    let mut t = tournament_with_edge_tie();
    let mut seeds = seeds_with_edge_pick(&t, 15);
    let stranger = Uuid::new_v4();
    seeds[15] = stranger;
    assert_eq!(
        generate_ko_matches(&mut t, ORGANIZER, &seeds),
        Err(TournamentError::NotAnEdgeTeam(stranger))
    );
}

#[test]
fn any_tied_edge_team_may_take_the_last_place() {
    for pick in 15..19 {
        let mut t = tournament_with_edge_tie();
        let seeds = seeds_with_edge_pick(&t, pick);
        generate_ko_matches(&mut t, ORGANIZER, &seeds).unwrap();
    }
}

#[test]
fn bracket_has_31_standings_and_depth_4() {
    let (t, seeds) = with_bracket();
    assert_eq!(t.ko_standings.len(), 31);
    assert_eq!(t.ko_standings.evaluate_validity(), KoTreeValidation::Ok);

    let leaves: Vec<TeamId> = t
        .ko_standings
        .iter()
        .filter(|s| s.is_leaf())
        .map(|s| s.team().unwrap())
        .collect();
    assert_eq!(leaves.len(), 16);
    assert_eq!(leaves.iter().collect::<HashSet<_>>().len(), 16);

    let tree = ko_tree(&t).unwrap();
    assert_eq!(depth(&tree), 4);
    assert!(tree.team.is_none());

    // first round pairs seed i with seed 15 - i
    for standing in first_round(&t) {
        let teams: Vec<TeamId> = t
            .ko_standings
            .preceding_teams(standing)
            .into_iter()
            .flatten()
            .collect();
        let i = seeds.iter().position(|&s| s == teams[0]).unwrap();
        assert_eq!(teams[1], seeds[15 - i]);
    }
}

#[test]
fn hand_built_trees_are_checked() {
    let teams: Vec<TeamId> = (0..16).map(|_| Uuid::new_v4()).collect();

    let mut shallow = KoBracket::new();
    let a = shallow.push_leaf(teams[0]);
    let b = shallow.push_leaf(teams[1]);
    shallow.push_parent([a, b], None).unwrap();
    assert_eq!(shallow.evaluate_validity(), KoTreeValidation::WrongDepth);
    assert_eq!(KoBracket::new().evaluate_validity(), KoTreeValidation::WrongDepth);

    let mut seeds = teams.clone();
    seeds[15] = seeds[0];
    assert_eq!(
        KoBracket::build(&seeds).evaluate_validity(),
        KoTreeValidation::DuplicateParticipants
    );
    assert_eq!(KoBracket::build(&teams).evaluate_validity(), KoTreeValidation::Ok);

    let mut bracket = KoBracket::new();
    let a = bracket.push_leaf(teams[0]);
    let b = bracket.push_leaf(teams[1]);
    assert_eq!(
        bracket.push_parent([a, b], Some(teams[2])),
        Err(TournamentError::TeamNotInPrecedingStandings)
    );
    let parent = bracket.push_parent([a, b], Some(teams[1])).unwrap();
    assert_eq!(bracket.get(parent).unwrap().team(), Some(teams[1]));
    assert_eq!(bracket.root(), Some(parent));
    assert_eq!(bracket.children_from_links(parent), vec![a, b]);
}

#[test]
fn first_round_is_queued_and_fills_tables() {
    let (mut t, _) = with_bracket();
    let queue = ko_match_queue(&t);
    let mut expected = first_round(&t);
    expected.sort_unstable();
    let mut queued = queue.clone();
    queued.sort_unstable();
    assert_eq!(queued, expected);

    let table = add_table(&mut t, ORGANIZER, "Centre").unwrap();
    assert_eq!(
        t.table(table).unwrap().current_match(),
        Some(MatchRef::Ko(queue[0]))
    );
    let standing = t.ko_standings.get(queue[0]).unwrap();
    assert_eq!(
        ko_standing_status(&t, standing),
        MatchStatus::QueuedCollectingDrinks
    );
}

#[test]
fn drinks_pickup_starts_next_match() {
    let (mut t, _) = with_bracket();
    let standing = first_round(&t)[0];
    let leaves = t.ko_standings.get(standing).unwrap().preceding_standings().to_vec();
    let team_a = t.ko_standings.get(leaves[0]).unwrap().team().unwrap();
    let team_b = t.ko_standings.get(leaves[1]).unwrap().team().unwrap();

    assert!(matches!(
        drinks(&mut t, leaves[0], team_b, 1),
        Err(TournamentError::NotAParticipant { .. })
    ));

    drinks(&mut t, leaves[0], team_a, 1).unwrap();
    assert!(!t.ko_standings.get(standing).unwrap().times.has_started());
    assert!(matches!(
        drinks(&mut t, leaves[0], team_a, 2),
        Err(TournamentError::DrinksAlreadyCollected { .. })
    ));

    drinks(&mut t, leaves[1], team_b, 3).unwrap();
    let s = t.ko_standings.get(standing).unwrap();
    assert_eq!(s.times.start_time(), Some(at(3)));
    assert_eq!(ko_standing_status(&t, s), MatchStatus::Playing);
    assert!(is_team_currently_playing(&t, team_a));
}

#[test]
fn drinks_pickup_requires_checked_in_team() {
    let mut t = tournament_with_edge_tie();
    let seeds = seeds_with_edge_pick(&t, 16);
    generate_ko_matches(&mut t, ORGANIZER, &seeds).unwrap();
    let leaf = t.ko_standings.iter().find(|s| s.is_leaf()).unwrap();
    let (leaf, team) = (leaf.id, leaf.team().unwrap());
    assert_eq!(
        drinks(&mut t, leaf, team, 1),
        Err(TournamentError::TeamsNotCheckedIn)
    );
}

#[test]
fn winner_moves_up_and_frees_the_table() {
    let (mut t, _) = with_bracket();
    let table = add_table(&mut t, ORGANIZER, "Centre").unwrap();
    let standing = match t.table(table).unwrap().current_match() {
        Some(MatchRef::Ko(id)) => id,
        other => panic!("expected a KO match on the table, got {other:?}"),
    };
    let teams: Vec<TeamId> = t
        .ko_standings
        .preceding_teams(standing)
        .into_iter()
        .flatten()
        .collect();

    assert_eq!(
        set_winner(&mut t, standing, Some(teams[0]), 5),
        Err(TournamentError::MatchNotStarted)
    );
    start_first_round(&mut t, standing, 5);

    let outsider = t.teams.iter().find(|x| !teams.contains(&x.id)).unwrap().id;
    assert_eq!(
        set_winner(&mut t, standing, Some(outsider), 10),
        Err(TournamentError::TeamNotInPrecedingStandings)
    );

    set_winner(&mut t, standing, Some(teams[1]), 10).unwrap();
    let s = t.ko_standings.get(standing).unwrap();
    assert_eq!(s.team(), Some(teams[1]));
    assert_eq!(s.times.end_time(), Some(at(10)));
    assert!(!is_team_currently_playing(&t, teams[1]));

    // the table moved on to another first round match
    match t.table(table).unwrap().current_match() {
        Some(MatchRef::Ko(next)) => assert_ne!(next, standing),
        other => panic!("expected the table to be reassigned, got {other:?}"),
    }
}

#[test]
fn leaves_cannot_get_a_winner() {
    let (mut t, _) = with_bracket();
    let leaf = t.ko_standings.iter().find(|s| s.is_leaf()).unwrap();
    let (leaf, team) = (leaf.id, leaf.team());
    assert_eq!(
        set_winner(&mut t, leaf, team, 1),
        Err(TournamentError::LeafStandingImmutable)
    );
}

#[test]
fn second_round_waits_for_both_first_round_winners() {
    let (mut t, _) = with_bracket();
    let rounds = first_round(&t);
    let parent = t.ko_standings.get(rounds[0]).unwrap().next_standing().unwrap();
    let [left, right] = {
        let p = t.ko_standings.get(parent).unwrap().preceding_standings();
        [p[0], p[1]]
    };

    start_first_round(&mut t, left, 1);
    let winner = t.ko_standings.preceding_teams(left)[0].unwrap();
    set_winner(&mut t, left, Some(winner), 2).unwrap();
    assert!(!ko_match_queue(&t).contains(&parent));

    // opponent for the second round is still open
    assert_eq!(
        drinks(&mut t, left, winner, 3),
        Err(TournamentError::OpponentNotDecided)
    );

    start_first_round(&mut t, right, 4);
    let other = t.ko_standings.preceding_teams(right)[1].unwrap();
    set_winner(&mut t, right, Some(other), 5).unwrap();
    assert!(ko_match_queue(&t).contains(&parent));

    drinks(&mut t, left, winner, 6).unwrap();
    drinks(&mut t, right, other, 7).unwrap();
    assert_eq!(
        t.ko_standings.get(parent).unwrap().times.start_time(),
        Some(at(7))
    );

    // decided next standing locks the first round
    set_winner(&mut t, parent, Some(winner), 8).unwrap();
    assert_eq!(
        set_winner(&mut t, left, None, 9),
        Err(TournamentError::NextStandingDecided)
    );
}

#[test]
fn clearing_a_winner_only_clears_the_team() {
    let (mut t, _) = with_bracket();
    let standing = first_round(&t)[0];
    start_first_round(&mut t, standing, 1);
    let winner = t.ko_standings.preceding_teams(standing)[0].unwrap();
    set_winner(&mut t, standing, Some(winner), 2).unwrap();

    set_winner(&mut t, standing, None, 3).unwrap();
    let s = t.ko_standings.get(standing).unwrap();
    assert_eq!(s.team(), None);
    assert_eq!(s.times.end_time(), Some(at(2)));
}

#[test]
fn champion_has_no_following_match() {
    let (mut t, seeds) = with_bracket();
    let root = t.ko_standings.root().unwrap();
    play_out(&mut t, root, 1);

    let champion = t.ko_standings.get(root).unwrap().team().unwrap();
    assert_eq!(champion, seeds[0]);
    assert!(t.ko_standings.iter().all(|s| !s.times.is_playing()));
    assert_eq!(
        drinks(&mut t, root, champion, 2),
        Err(TournamentError::NoFollowingMatch)
    );
}

#[test]
fn tree_view_requires_a_bracket() {
    let t = tournament_with_edge_tie();
    assert_eq!(ko_tree(&t), Err(TournamentError::KoPhaseNotFound));
}

#[test]
fn tree_view_names_leaf_teams() {
    let (t, seeds) = with_bracket();
    let tree = ko_tree(&t).unwrap();
    let mut node = &tree;
    while let Some(child) = node.preceding_standings.first() {
        node = child;
    }
    let team = node.team.as_ref().unwrap();
    assert_eq!(team.id, seeds[0]);
    assert_eq!(team.name, "Team 00");
}

#[test]
fn regeneration_replaces_bracket_and_releases_tables() {
    let (mut t, _) = with_bracket();
    let table = add_table(&mut t, ORGANIZER, "Centre").unwrap();
    assert!(matches!(
        t.table(table).unwrap().current_match(),
        Some(MatchRef::Ko(_))
    ));

    let seeds = seeds_with_edge_pick(&t, 18);
    generate_ko_matches(&mut t, ORGANIZER, &seeds).unwrap();
    assert_eq!(t.ko_standings.len(), 31);
    let leaves: HashSet<TeamId> = t
        .ko_standings
        .iter()
        .filter_map(|s| s.team())
        .collect();
    assert!(leaves.contains(&seeds[15]));
    // released, then handed to a first round match of the new bracket
    match t.table(table).unwrap().current_match() {
        Some(MatchRef::Ko(id)) => assert!(first_round(&t).contains(&id)),
        other => panic!("expected a KO match on the table, got {other:?}"),
    }
    assert_eq!(t.tables.iter().filter(|x| !x.is_free()).count(), 1);
}
