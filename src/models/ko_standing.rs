//! KO phase: standings (bracket nodes) stored in an arena and linked by index.

use crate::models::error::{Result, TournamentError};
use crate::models::game::MatchTimes;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Index of a standing inside its tournament's [`KoBracket`].
pub type StandingId = usize;

/// Rounds between the leaves and the final.
pub const KO_TREE_DEPTH: usize = 4;

/// Teams seeded into the KO phase.
pub const KO_TEAM_COUNT: usize = 1 << KO_TREE_DEPTH;

/// Outcome of checking a freshly built tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KoTreeValidation {
    Ok,
    WrongDepth,
    DuplicateParticipants,
    MissingParticipant,
}

/// One node of the KO tree. A leaf (no preceding standings) holds a seeded team;
/// any other node is a match whose `team` is the winner of its two preceding standings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KoStanding {
    pub id: StandingId,
    #[serde(flatten)]
    pub times: MatchTimes,
    next_standing: Option<StandingId>,
    preceding_standings: Vec<StandingId>,
    team: Option<TeamId>,
    /// The team of this standing picked up its drinks for the next standing's match.
    pub drinks_collected: bool,
}

impl KoStanding {
    pub fn next_standing(&self) -> Option<StandingId> {
        self.next_standing
    }

    pub fn preceding_standings(&self) -> &[StandingId] {
        &self.preceding_standings
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    /// Initial (round 0) standing.
    pub fn is_leaf(&self) -> bool {
        self.preceding_standings.is_empty()
    }
}

/// Flat arena of all standings of one tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KoBracket {
    standings: Vec<KoStanding>,
}

impl KoBracket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full tree from ordered seeds: leaves are cross-paired
    /// (`seed[i]` next to `seed[last - i]`), then adjacent nodes are paired until one root remains.
    pub fn build(seeds: &[TeamId]) -> Self {
        let mut bracket = Self::new();
        let n = seeds.len();

        let mut layer = Vec::with_capacity(n);
        for i in 0..n / 2 {
            layer.push(bracket.push_leaf(seeds[i]));
            layer.push(bracket.push_leaf(seeds[n - 1 - i]));
        }

        // (r)[2n] and (r)[2n+1] fight for the spot (r+1)[n]
        while layer.len() > 1 {
            layer = layer
                .chunks_exact(2)
                .map(|pair| bracket.link_parent(pair[0], pair[1]))
                .collect();
        }
        bracket
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KoStanding> {
        self.standings.iter()
    }

    pub fn get(&self, id: StandingId) -> Option<&KoStanding> {
        self.standings.get(id)
    }

    pub fn get_mut(&mut self, id: StandingId) -> Option<&mut KoStanding> {
        self.standings.get_mut(id)
    }

    pub(crate) fn standing(&self, id: StandingId) -> Result<&KoStanding> {
        self.get(id).ok_or(TournamentError::StandingNotFound(id))
    }

    pub fn push_leaf(&mut self, team: TeamId) -> StandingId {
        let id = self.standings.len();
        self.standings.push(KoStanding {
            id,
            times: MatchTimes::default(),
            next_standing: None,
            preceding_standings: Vec::new(),
            team: Some(team),
            drinks_collected: false,
        });
        id
    }

    /// Add a non-leaf standing over two existing, not yet linked standings.
    /// A given team must be one of the preceding standings' teams.
    pub fn push_parent(
        &mut self,
        preceding: [StandingId; 2],
        team: Option<TeamId>,
    ) -> Result<StandingId> {
        for &p in &preceding {
            self.standing(p)?;
        }
        if let Some(team) = team {
            if !preceding.iter().any(|&p| self.standings[p].team == Some(team)) {
                return Err(TournamentError::TeamNotInPrecedingStandings);
            }
        }
        let id = self.link_parent(preceding[0], preceding[1]);
        self.standings[id].team = team;
        Ok(id)
    }

    fn link_parent(&mut self, left: StandingId, right: StandingId) -> StandingId {
        let id = self.standings.len();
        self.standings.push(KoStanding {
            id,
            times: MatchTimes::default(),
            next_standing: None,
            preceding_standings: vec![left, right],
            team: None,
            drinks_collected: false,
        });
        // the child owns the relationship
        self.standings[left].next_standing = Some(id);
        self.standings[right].next_standing = Some(id);
        id
    }

    /// The final: the only standing without a next standing.
    pub fn root(&self) -> Option<StandingId> {
        self.standings
            .iter()
            .find(|s| s.next_standing.is_none())
            .map(|s| s.id)
    }

    /// Teams of the two preceding standings (empty for a leaf).
    pub fn preceding_teams(&self, id: StandingId) -> Vec<Option<TeamId>> {
        self.get(id)
            .map(|s| {
                s.preceding_standings
                    .iter()
                    .map(|&p| self.standings[p].team)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set or clear the winner of a non-leaf standing.
    pub fn set_team(&mut self, id: StandingId, team: Option<TeamId>) -> Result<()> {
        let standing = self.standing(id)?;
        if standing.is_leaf() {
            return Err(TournamentError::LeafStandingImmutable);
        }
        if let Some(team) = team {
            let matching = self
                .preceding_teams(id)
                .into_iter()
                .filter(|&t| t == Some(team))
                .count();
            if matching != 1 {
                return Err(TournamentError::TeamNotInPrecedingStandings);
            }
        }
        self.standings[id].team = team;
        Ok(())
    }

    /// Children of a standing, derived from the `next_standing` link of every node
    /// rather than from the cached preceding list.
    pub fn children_from_links(&self, id: StandingId) -> Vec<StandingId> {
        self.standings
            .iter()
            .filter(|s| s.next_standing == Some(id))
            .map(|s| s.id)
            .collect()
    }

    /// Check that the tree is complete with [`KO_TREE_DEPTH`] rounds and no team is seeded twice.
    pub fn evaluate_validity(&self) -> KoTreeValidation {
        let Some(root) = self.root() else {
            return KoTreeValidation::WrongDepth;
        };
        if !self.has_depth(root, KO_TREE_DEPTH) {
            return KoTreeValidation::WrongDepth;
        }

        let mut seen = HashSet::new();
        for leaf in self.initial_standings(root) {
            match self.standings[leaf].team {
                None => return KoTreeValidation::MissingParticipant,
                Some(team) if !seen.insert(team) => {
                    return KoTreeValidation::DuplicateParticipants
                }
                Some(_) => {}
            }
        }
        KoTreeValidation::Ok
    }

    fn has_depth(&self, id: StandingId, depth: usize) -> bool {
        let standing = &self.standings[id];
        match (standing.preceding_standings.len(), depth) {
            (0, 0) => true,
            (2, d) if d > 0 => standing
                .preceding_standings
                .iter()
                .all(|&p| self.has_depth(p, d - 1)),
            _ => false,
        }
    }

    /// Leaves below `id`, left to right.
    pub fn initial_standings(&self, id: StandingId) -> Vec<StandingId> {
        let standing = &self.standings[id];
        if standing.is_leaf() {
            return vec![id];
        }
        standing
            .preceding_standings
            .iter()
            .flat_map(|&p| self.initial_standings(p))
            .collect()
    }

    /// Whether both inputs of this match are decided: each preceding standing is a leaf or has ended.
    pub fn have_preceding_matches_ended(&self, id: StandingId) -> bool {
        self.get(id).is_some_and(|s| {
            s.preceding_standings.iter().all(|&p| {
                let prev = &self.standings[p];
                prev.is_leaf() || prev.times.is_finished()
            })
        })
    }
}
