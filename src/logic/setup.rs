//! Setup phase: tournament settings that may change until qualification starts.

use crate::models::{Result, Tournament};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Fields an organizer may change. `None` leaves a field as is.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    pub registration_end: Option<DateTime<Utc>>,
}

/// Apply an update. Name and description can always change; max participants and
/// registration end only before qualification matches exist. All or nothing.
pub fn update_tournament(
    tournament: &mut Tournament,
    user: &str,
    update: TournamentUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    tournament.ensure_organizer(user)?;

    let mut updated = tournament.clone();
    if let Some(max_participants) = update.max_participants {
        updated.set_max_participants(max_participants)?;
    }
    if let Some(registration_end) = update.registration_end {
        updated.set_registration_end(registration_end, now)?;
    }
    if let Some(name) = update.name {
        updated.name = name.trim().to_string();
    }
    if let Some(description) = update.description {
        updated.description = Some(description);
    }

    *tournament = updated;
    log::debug!("Updated tournament {}", tournament.id);
    Ok(())
}
