//! Team and TeamView data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, standings and lookups).
pub type TeamId = Uuid;

/// A team registered for exactly one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Unique within the tournament.
    pub name: String,
    pub checked_in: bool,
    /// Scheduling tie-break: set on check-in and whenever the team finishes a match.
    pub available_since: Option<DateTime<Utc>>,
}

impl Team {
    /// Create a new, not yet checked-in team with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            checked_in: false,
            available_since: None,
        }
    }

    /// Mark the team as present at the venue.
    pub fn check_in(&mut self, now: DateTime<Utc>) {
        self.checked_in = true;
        self.mark_available(now);
    }

    pub fn mark_available(&mut self, now: DateTime<Utc>) {
        self.available_since = Some(now);
    }
}

/// Listing view of a team (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    pub id: TeamId,
    pub name: String,
    pub checked_in: bool,
    pub currently_playing: bool,
}
