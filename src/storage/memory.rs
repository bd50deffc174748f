//! In-memory store backend.
//!
//! Serves as the injectable store handle for tests and as the reference
//! implementation of the store contract. Rows live in insertion-ordered
//! vectors so query order is stable across reloads; writes can be made
//! to fail on demand to exercise the fail-open mutation path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{BoardStore, CardStore, StoreError};
use crate::filter::{self, Constraint};
use crate::types::{Board, BoardKind, CardRecord, Column, Customer, Task};

const INSERT_CHANNEL_CAPACITY: usize = 64;

/// One entity table: insertion-ordered rows plus an insert push channel.
struct Table<C: CardRecord> {
    rows: RwLock<Vec<C>>,
    inserts: broadcast::Sender<C>,
}

impl<C: CardRecord> Table<C> {
    fn new() -> Self {
        let (inserts, _) = broadcast::channel(INSERT_CHANNEL_CAPACITY);
        Self {
            rows: RwLock::new(Vec::new()),
            inserts,
        }
    }

    fn query(&self, board_id: Option<&str>, constraints: &[Constraint]) -> Vec<C> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .filter(|row| match board_id {
                Some(id) => row.board_id() == Some(id),
                None => true,
            })
            .filter(|row| filter::matches(constraints, *row))
            .cloned()
            .collect()
    }

    fn get(&self, id: &str) -> Option<C> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }

    fn insert(&self, mut card: C) -> C {
        if card.id().is_empty() {
            card.set_id(Uuid::new_v4().to_string());
        }
        self.rows.write().unwrap().push(card.clone());
        // Nobody listening is fine; the channel is an additive side path.
        let _ = self.inserts.send(card.clone());
        card
    }

    fn update(&self, card: &C) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.iter_mut().find(|row| row.id() == card.id()) {
            Some(row) => {
                *row = card.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "card",
                id: card.id().to_string(),
            }),
        }
    }

    fn update_status(&self, id: &str, status: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                row.set_status(status.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "card",
                id: id.to_string(),
            }),
        }
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(StoreError::NotFound {
                entity: "card",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Board row as stored; columns live in their own table.
#[derive(Clone)]
struct BoardRow {
    id: String,
    name: String,
    kind: BoardKind,
    default_column_id: Option<String>,
}

/// In-memory implementation of `BoardStore` and `CardStore` for both
/// card kinds.
pub struct MemoryStore {
    boards: RwLock<Vec<BoardRow>>,
    columns: RwLock<Vec<Column>>,
    tasks: Table<Task>,
    customers: Table<Customer>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            boards: RwLock::new(Vec::new()),
            columns: RwLock::new(Vec::new()),
            tasks: Table::new(),
            customers: Table::new(),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail (until cleared). Lets tests
    /// exercise the optimistic fail-open path.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent read fail (until cleared).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::WriteRejected("injected write failure".into()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("injected read failure".into()));
        }
        Ok(())
    }

    fn board_row(&self, board_id: &str) -> Result<BoardRow, StoreError> {
        self.boards
            .read()
            .unwrap()
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "board",
                id: board_id.to_string(),
            })
    }

    fn columns_of(&self, board_id: &str) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    fn assemble(&self, row: BoardRow) -> Board {
        let columns = self.columns_of(&row.id);
        Board {
            id: row.id,
            name: row.name,
            kind: row.kind,
            columns,
            default_column_id: row.default_column_id,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_boards(&self) -> Result<Vec<Board>, StoreError> {
        self.check_read()?;
        let rows: Vec<BoardRow> = self.boards.read().unwrap().clone();
        Ok(rows.into_iter().map(|row| self.assemble(row)).collect())
    }

    async fn get_board(&self, board_id: &str) -> Result<Board, StoreError> {
        self.check_read()?;
        let row = self.board_row(board_id)?;
        Ok(self.assemble(row))
    }

    async fn insert_board(&self, name: &str, kind: BoardKind) -> Result<Board, StoreError> {
        self.check_write()?;
        let row = BoardRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            default_column_id: None,
        };
        self.boards.write().unwrap().push(row.clone());
        Ok(self.assemble(row))
    }

    async fn rename_board(&self, board_id: &str, name: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut boards = self.boards.write().unwrap();
        match boards.iter_mut().find(|b| b.id == board_id) {
            Some(board) => {
                board.name = name.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "board",
                id: board_id.to_string(),
            }),
        }
    }

    async fn set_default_column(
        &self,
        board_id: &str,
        column_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut boards = self.boards.write().unwrap();
        match boards.iter_mut().find(|b| b.id == board_id) {
            Some(board) => {
                board.default_column_id = column_id.map(|id| id.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "board",
                id: board_id.to_string(),
            }),
        }
    }

    async fn delete_board(&self, board_id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut boards = self.boards.write().unwrap();
        let before = boards.len();
        boards.retain(|b| b.id != board_id);
        if boards.len() == before {
            return Err(StoreError::NotFound {
                entity: "board",
                id: board_id.to_string(),
            });
        }
        // Cascade.
        self.columns.write().unwrap().retain(|c| c.board_id != board_id);
        Ok(())
    }

    async fn insert_column(&self, mut column: Column) -> Result<Column, StoreError> {
        self.check_write()?;
        if column.id.is_empty() {
            column.id = Uuid::new_v4().to_string();
        }
        self.columns.write().unwrap().push(column.clone());
        Ok(column)
    }

    async fn update_column(&self, column: &Column) -> Result<(), StoreError> {
        self.check_write()?;
        let mut columns = self.columns.write().unwrap();
        match columns.iter_mut().find(|c| c.id == column.id) {
            Some(existing) => {
                *existing = column.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "column",
                id: column.id.clone(),
            }),
        }
    }

    async fn delete_column(&self, column_id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut columns = self.columns.write().unwrap();
        let before = columns.len();
        columns.retain(|c| c.id != column_id);
        if columns.len() == before {
            return Err(StoreError::NotFound {
                entity: "column",
                id: column_id.to_string(),
            });
        }
        Ok(())
    }
}

macro_rules! impl_card_store {
    ($card:ty, $table:ident) => {
        #[async_trait]
        impl CardStore<$card> for MemoryStore {
            async fn query(
                &self,
                board_id: Option<&str>,
                constraints: &[Constraint],
            ) -> Result<Vec<$card>, StoreError> {
                self.check_read()?;
                Ok(self.$table.query(board_id, constraints))
            }

            async fn get(&self, id: &str) -> Result<Option<$card>, StoreError> {
                self.check_read()?;
                Ok(self.$table.get(id))
            }

            async fn insert(&self, card: $card) -> Result<$card, StoreError> {
                self.check_write()?;
                Ok(self.$table.insert(card))
            }

            async fn update(&self, card: &$card) -> Result<(), StoreError> {
                self.check_write()?;
                self.$table.update(card)
            }

            async fn update_status(&self, id: &str, status: &str) -> Result<(), StoreError> {
                self.check_write()?;
                self.$table.update_status(id, status)
            }

            async fn delete(&self, id: &str) -> Result<(), StoreError> {
                self.check_write()?;
                self.$table.delete(id)
            }

            fn subscribe_inserts(&self) -> broadcast::Receiver<$card> {
                self.$table.inserts.subscribe()
            }
        }
    };
}

impl_card_store!(Task, tasks);
impl_card_store!(Customer, customers);
