//! Board configuration editor.
//!
//! CRUD over board and column records. Structural edits happen on a
//! local `Board` value; every save re-sequences positions to a
//! contiguous 0..n-1 before persisting, and persists new (id-less)
//! columns via insert while existing ones get point updates — never a
//! bulk replace, so concurrent edits to unrelated columns are not
//! clobbered.

use std::sync::Arc;

use crate::reconciler::BoardError;
use crate::storage::BoardStore;
use crate::types::{Board, BoardKind, Column};

/// Columns a freshly created board starts with.
const DEFAULT_COLUMNS: [(&str, bool); 3] =
    [("To Do", false), ("In Progress", false), ("Done", true)];

/// Restore the position invariant: 0..n-1, no gaps, no duplicates,
/// following current vector order.
pub fn resequence(columns: &mut [Column]) {
    for (index, column) in columns.iter_mut().enumerate() {
        column.position = index as u32;
    }
}

pub struct BoardEditor<S: BoardStore> {
    store: Arc<S>,
}

impl<S: BoardStore> BoardEditor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a board with the fixed three-column default (two ordinary
    /// columns plus one flagged success); the first column is the
    /// default placement.
    pub async fn create_board(&self, name: &str, kind: BoardKind) -> Result<Board, BoardError> {
        let mut board = self.store.insert_board(name, kind).await?;
        for (title, is_success) in DEFAULT_COLUMNS {
            board.columns.push(Column {
                id: String::new(),
                board_id: board.id.clone(),
                title: title.to_string(),
                is_success,
                position: 0,
            });
        }
        self.save_columns(&mut board).await?;

        let default_id = board.first_column_id().map(|id| id.to_string());
        board.default_column_id = default_id.clone();
        self.store
            .set_default_column(&board.id, default_id.as_deref())
            .await?;
        Ok(board)
    }

    pub async fn rename_board(&self, board: &mut Board, name: &str) -> Result<(), BoardError> {
        self.store.rename_board(&board.id, name).await?;
        board.name = name.to_string();
        Ok(())
    }

    /// Delete a board; column deletion cascades in the store.
    pub async fn delete_board(&self, board_id: &str) -> Result<(), BoardError> {
        self.store.delete_board(board_id).await?;
        Ok(())
    }

    /// Append a new, not-yet-persisted column. It gets its id on save.
    pub fn add_column(&self, board: &mut Board, title: &str) {
        board.columns.push(Column {
            id: String::new(),
            board_id: board.id.clone(),
            title: title.to_string(),
            is_success: false,
            position: 0,
        });
        resequence(&mut board.columns);
    }

    pub fn rename_column(&self, board: &mut Board, column_id: &str, title: &str) -> Result<(), BoardError> {
        let column = board
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| BoardError::UnknownColumn(column_id.to_string()))?;
        column.title = title.to_string();
        Ok(())
    }

    /// Splice-reorder the column list itself, same rule as a card drag.
    pub fn reorder_column(&self, board: &mut Board, from_index: usize, to_index: usize) {
        if from_index >= board.columns.len() || from_index == to_index {
            return;
        }
        let column = board.columns.remove(from_index);
        let index = to_index.min(board.columns.len());
        board.columns.insert(index, column);
        resequence(&mut board.columns);
    }

    /// Flag exactly one column as the success/terminal column.
    pub fn set_success_column(&self, board: &mut Board, column_id: &str) -> Result<(), BoardError> {
        if board.column(column_id).is_none() {
            return Err(BoardError::UnknownColumn(column_id.to_string()));
        }
        for column in &mut board.columns {
            column.is_success = column.id == column_id;
        }
        Ok(())
    }

    /// Designate the default (initial placement) column and persist the
    /// designation.
    pub async fn set_default_column(
        &self,
        board: &mut Board,
        column_id: &str,
    ) -> Result<(), BoardError> {
        if board.column(column_id).is_none() {
            return Err(BoardError::UnknownColumn(column_id.to_string()));
        }
        board.default_column_id = Some(column_id.to_string());
        self.store
            .set_default_column(&board.id, Some(column_id))
            .await?;
        Ok(())
    }

    /// Remove a column: local splice plus point delete, then persist the
    /// shifted positions of the remaining columns.
    pub async fn remove_column(
        &self,
        board: &mut Board,
        column_id: &str,
    ) -> Result<(), BoardError> {
        let before = board.columns.len();
        board.columns.retain(|c| c.id != column_id);
        if board.columns.len() == before {
            return Err(BoardError::UnknownColumn(column_id.to_string()));
        }
        resequence(&mut board.columns);
        if board.default_column_id.as_deref() == Some(column_id) {
            let fallback = board.first_column_id().map(|id| id.to_string());
            board.default_column_id = fallback.clone();
            self.store
                .set_default_column(&board.id, fallback.as_deref())
                .await?;
        }
        self.store.delete_column(column_id).await?;
        self.save_columns(board).await
    }

    /// Persist the column list: re-sequence, insert id-less columns
    /// (writing the assigned ids back), point-update the rest.
    pub async fn save_columns(&self, board: &mut Board) -> Result<(), BoardError> {
        resequence(&mut board.columns);
        for column in &mut board.columns {
            if column.id.is_empty() {
                let created = self.store.insert_column(column.clone()).await?;
                column.id = created.id;
            } else {
                self.store.update_column(column).await?;
            }
        }
        Ok(())
    }
}
