pub mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::filter::Constraint;
use crate::types::{Board, BoardKind, CardRecord, Column};

/// Abstract store traits for board definitions and card rows.
/// Implementations: MemoryStore (in-process, also the test fake);
/// any remote transport satisfying the same contract works.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("write rejected: {0}")]
    WriteRejected(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Board definition store: owns board and column records.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<Board>, StoreError>;

    /// Fetch a board with its columns, ordered by position.
    async fn get_board(&self, board_id: &str) -> Result<Board, StoreError>;

    /// Insert a new board record (columns are inserted separately).
    /// Returns the created board with its assigned id.
    async fn insert_board(&self, name: &str, kind: BoardKind) -> Result<Board, StoreError>;

    async fn rename_board(&self, board_id: &str, name: &str) -> Result<(), StoreError>;

    /// Point update of the board's default-column designation.
    async fn set_default_column(
        &self,
        board_id: &str,
        column_id: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Delete a board. Cascades to its columns.
    async fn delete_board(&self, board_id: &str) -> Result<(), StoreError>;

    /// Insert one column row; returns it with its assigned id.
    async fn insert_column(&self, column: Column) -> Result<Column, StoreError>;

    /// Point update of one existing column row.
    async fn update_column(&self, column: &Column) -> Result<(), StoreError>;

    async fn delete_column(&self, column_id: &str) -> Result<(), StoreError>;
}

/// Card row store, implemented per card kind (tasks, customers).
///
/// `query` is the only bulk read; constraints come from the filter
/// engine and are applied store-side. `update_status` is the one partial
/// write the reconciliation core issues (drag moves); everything else is
/// a whole-row update.
#[async_trait]
pub trait CardStore<C: CardRecord>: Send + Sync {
    /// Fetch card rows, optionally partitioned by board id (task boards
    /// pass their id; the customer board has no partition and passes
    /// `None`). Row order is the fetch order the caller must preserve.
    async fn query(
        &self,
        board_id: Option<&str>,
        constraints: &[Constraint],
    ) -> Result<Vec<C>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<C>, StoreError>;

    /// Insert one row. An empty id is replaced with a store-assigned
    /// one; a non-empty id is honored as-is.
    async fn insert(&self, card: C) -> Result<C, StoreError>;

    /// Whole-row update of one existing card.
    async fn update(&self, card: &C) -> Result<(), StoreError>;

    /// Partial update of the status/column-membership field only.
    async fn update_status(&self, id: &str, status: &str) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Push channel for newly inserted rows. A separate, additive read
    /// path (notifications); it never mutates board state.
    fn subscribe_inserts(&self) -> broadcast::Receiver<C>;
}
