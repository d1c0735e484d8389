//! Physical beer pong tables, the scarce resource matches are scheduled onto.

use crate::models::error::{Result, TournamentError};
use crate::models::game::MatchRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a table.
pub type TableId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BeerPongTable {
    pub id: TableId,
    /// Unique within the tournament.
    pub name: String,
    current_match: Option<MatchRef>,
    /// Bumped on every write to `current_match`; writers must present the version they read.
    version: u64,
}

impl BeerPongTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            current_match: None,
            version: 0,
        }
    }

    pub fn current_match(&self) -> Option<MatchRef> {
        self.current_match
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_free(&self) -> bool {
        self.current_match.is_none()
    }

    /// Assign a match to this free table.
    pub fn occupy(&mut self, match_ref: MatchRef, expected_version: u64) -> Result<()> {
        self.check_version(expected_version)?;
        if self.current_match.is_some() {
            return Err(TournamentError::TableOccupied(self.id));
        }
        self.current_match = Some(match_ref);
        self.version += 1;
        Ok(())
    }

    /// Free the table.
    pub fn release(&mut self, expected_version: u64) -> Result<()> {
        self.check_version(expected_version)?;
        self.current_match = None;
        self.version += 1;
        Ok(())
    }

    fn check_version(&self, expected_version: u64) -> Result<()> {
        if self.version != expected_version {
            return Err(TournamentError::TableVersionConflict(self.id));
        }
        Ok(())
    }
}

/// Short reference to a table (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub id: TableId,
    pub name: String,
}

impl TableView {
    pub fn from_table(table: &BeerPongTable) -> Self {
        Self {
            id: table.id,
            name: table.name.clone(),
        }
    }
}
