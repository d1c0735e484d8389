//! Bulk team import from CSV (organizer only).

use crate::logic::teams::{add_team, SignupTeamResult};
use crate::models::{validate_name, Result, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
struct TeamRecord {
    name: String,
}

/// Read a CSV with a `name` header and register every row like a signup.
///
/// The whole file is parsed and every name validated before the first team is added,
/// so a malformed file adds nothing. Returns the outcome per row, in file order.
pub fn import_teams_csv<R: Read>(
    tournament: &mut Tournament,
    user: &str,
    reader: R,
    now: DateTime<Utc>,
) -> Result<Vec<(String, SignupTeamResult)>> {
    tournament.ensure_organizer(user)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut names = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let record: TeamRecord =
            result.map_err(|e| TournamentError::ImportFailed(e.to_string()))?;
        validate_name(&record.name)
            .map_err(|e| TournamentError::ImportFailed(format!("row {}: {}", i + 1, e)))?;
        names.push(record.name);
    }

    let mut outcomes = Vec::with_capacity(names.len());
    for name in names {
        let result = add_team(tournament, user, &name, now)?;
        outcomes.push((name, result));
    }
    log::info!(
        "Imported {} team rows into tournament {}",
        outcomes.len(),
        tournament.id
    );
    Ok(outcomes)
}
