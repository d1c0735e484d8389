//! Table management and the allocator that hands free tables to queued matches.

use crate::logic::scheduling::{ko_match_queue, qualification_match_queue};
use crate::models::{
    validate_name, BeerPongTable, MatchRef, Result, TableId, Tournament, TournamentError,
};

/// How often a table write is retried after a version conflict before the conflict is returned.
pub const TABLE_ASSIGN_ATTEMPTS: usize = 3;

/// Add a table (organizer only) and immediately offer it to both queues.
pub fn add_table(tournament: &mut Tournament, user: &str, name: &str) -> Result<TableId> {
    tournament.ensure_organizer(user)?;
    let name = validate_name(name)?;
    if tournament.tables.iter().any(|t| t.name == name) {
        return Err(TournamentError::DuplicateTableName);
    }
    let table = BeerPongTable::new(name);
    let id = table.id;
    tournament.tables.push(table);
    log::info!("Added table {} to tournament {}", id, tournament.id);

    schedule_qualification_matches(tournament)?;
    schedule_ko_matches(tournament)?;
    Ok(id)
}

pub fn rename_table(
    tournament: &mut Tournament,
    user: &str,
    table_id: TableId,
    name: &str,
) -> Result<()> {
    tournament.ensure_organizer(user)?;
    let name = validate_name(name)?;
    tournament.table(table_id)?;
    if tournament
        .tables
        .iter()
        .any(|t| t.id != table_id && t.name == name)
    {
        return Err(TournamentError::DuplicateTableName);
    }
    tournament.table_mut(table_id)?.name = name.to_string();
    Ok(())
}

/// Remove a free table.
pub fn delete_table(tournament: &mut Tournament, user: &str, table_id: TableId) -> Result<()> {
    tournament.ensure_organizer(user)?;
    if !tournament.table(table_id)?.is_free() {
        return Err(TournamentError::TableOccupied(table_id));
    }
    tournament.tables.retain(|t| t.id != table_id);
    Ok(())
}

/// Write `match_ref` onto a table, re-reading its version after a conflict.
/// `version` may predate this borrow (the free-table snapshot of a scheduling pass).
fn occupy_table(
    tournament: &mut Tournament,
    table_id: TableId,
    match_ref: MatchRef,
    mut version: u64,
) -> Result<()> {
    let mut attempt = 1;
    loop {
        let table = tournament.table_mut(table_id)?;
        match table.occupy(match_ref, version) {
            Err(TournamentError::TableVersionConflict(_)) if attempt < TABLE_ASSIGN_ATTEMPTS => {
                log::warn!(
                    "Table {} changed while assigning {} (attempt {}), retrying",
                    table_id,
                    match_ref,
                    attempt
                );
                version = table.version();
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Free the table held by `match_ref`. Returns `false` if the match held no table.
pub fn release_table(tournament: &mut Tournament, match_ref: MatchRef) -> Result<bool> {
    let Some(table) = tournament.table_of(match_ref) else {
        return Ok(false);
    };
    let table_id = table.id;
    let mut version = table.version();
    let mut attempt = 1;
    loop {
        let table = tournament.table_mut(table_id)?;
        match table.release(version) {
            Ok(()) => {
                log::debug!("Released table {} from {}", table_id, match_ref);
                return Ok(true);
            }
            Err(TournamentError::TableVersionConflict(_)) if attempt < TABLE_ASSIGN_ATTEMPTS => {
                version = table.version();
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Pair free tables with the queue, in order, until either runs out.
fn assign_free_tables(tournament: &mut Tournament, queue: Vec<MatchRef>) -> Result<()> {
    let free: Vec<(TableId, u64)> = tournament
        .tables
        .iter()
        .filter(|t| t.is_free())
        .map(|t| (t.id, t.version()))
        .collect();
    if free.is_empty() {
        log::debug!("No free tables in tournament {}", tournament.id);
        return Ok(());
    }

    for ((table_id, version), match_ref) in free.into_iter().zip(queue) {
        occupy_table(tournament, table_id, match_ref, version)?;
        log::info!("Assigned table {} to {}", table_id, match_ref);
    }
    Ok(())
}

/// Give every free table to the next match of the qualification queue. Idempotent.
pub fn schedule_qualification_matches(tournament: &mut Tournament) -> Result<()> {
    let queue = qualification_match_queue(tournament)
        .into_iter()
        .map(|m| MatchRef::Qualification(m.id))
        .collect();
    assign_free_tables(tournament, queue)
}

/// Give every free table to the next match of the KO queue. Idempotent.
pub fn schedule_ko_matches(tournament: &mut Tournament) -> Result<()> {
    let queue = ko_match_queue(tournament)
        .into_iter()
        .map(MatchRef::Ko)
        .collect();
    assign_free_tables(tournament, queue)
}
