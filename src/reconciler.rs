//! Board reconciliation core.
//!
//! Builds the in-memory partitioned board (column buckets of card ids
//! plus a card map) from flat store rows, and applies local mutations
//! optimistically: the runtime projection changes synchronously, the
//! store write happens afterwards. A failed write is logged and NOT
//! rolled back — the divergence heals on the next full `load`.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::completion;
use crate::drag::{self, DragGesture, DropDecision};
use crate::filter::{self, FilterCriteria};
use crate::stage::StageClassifier;
use crate::storage::{CardStore, StoreError};
use crate::types::{Board, BoardKind, BoardSummary, CardRecord, ColumnSummary, Customer, Task};
use crate::validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One column's bucket in the runtime projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBucket {
    pub column_id: String,
    pub title: String,
    /// Ordered card ids; fetch order on load, splice order afterwards.
    pub card_ids: Vec<String>,
}

/// The reconciled projection of one board: derived, rebuildable, never
/// the source of truth.
///
/// Invariants: every id in a bucket has an entry in `cards`; an id
/// appears in at most one bucket. Cards whose resolved column is not on
/// the board stay in `cards` but in no bucket (hidden from view, not
/// deleted from storage).
#[derive(Debug, Clone)]
pub struct RuntimeBoard<C: CardRecord> {
    pub board: Board,
    pub buckets: Vec<ColumnBucket>,
    pub cards: HashMap<String, C>,
    /// Per-card mutation counter. Rapid edits to one card can race at
    /// the store; the token lets a completed write detect that a newer
    /// local edit has superseded it (logged, not prevented). While every
    /// mutation holds `&mut` access across its await the check cannot
    /// fire; it matters once the projection is shared (e.g. behind a
    /// lock released between the apply and the persist).
    seq: HashMap<String, u64>,
}

impl<C: CardRecord> RuntimeBoard<C> {
    pub fn empty(board: Board) -> Self {
        let buckets = board
            .columns
            .iter()
            .map(|col| ColumnBucket {
                column_id: col.id.clone(),
                title: col.title.clone(),
                card_ids: Vec::new(),
            })
            .collect();
        Self {
            board,
            buckets,
            cards: HashMap::new(),
            seq: HashMap::new(),
        }
    }

    pub fn bucket(&self, column_id: &str) -> Option<&ColumnBucket> {
        self.buckets.iter().find(|b| b.column_id == column_id)
    }

    fn bucket_mut(&mut self, column_id: &str) -> Option<&mut ColumnBucket> {
        self.buckets.iter_mut().find(|b| b.column_id == column_id)
    }

    /// Buckets as the view renders them. With `show_completed` off, the
    /// terminal column's bucket is emptied wholesale (per-card filtering
    /// is not needed; the persisted state is untouched).
    pub fn rendered_buckets(&self, show_completed: bool) -> Vec<ColumnBucket> {
        let terminal = completion::terminal_column_id(&self.board);
        self.buckets
            .iter()
            .map(|bucket| {
                if !show_completed && Some(bucket.column_id.as_str()) == terminal {
                    ColumnBucket {
                        card_ids: Vec::new(),
                        ..bucket.clone()
                    }
                } else {
                    bucket.clone()
                }
            })
            .collect()
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            id: self.board.id.clone(),
            name: self.board.name.clone(),
            kind: self.board.kind,
            columns: self
                .buckets
                .iter()
                .map(|bucket| ColumnSummary {
                    id: bucket.column_id.clone(),
                    title: bucket.title.clone(),
                    card_count: bucket.card_ids.len(),
                })
                .collect(),
        }
    }

    /// A card is overdue when its due date has passed and it has not
    /// reached the terminal column.
    pub fn is_overdue(&self, card_id: &str, today: chrono::NaiveDate) -> bool {
        let Some(card) = self.cards.get(card_id) else {
            return false;
        };
        let done = completion::terminal_column_id(&self.board)
            .and_then(|terminal| self.bucket(terminal))
            .map(|bucket| bucket.card_ids.iter().any(|id| id == card_id))
            .unwrap_or(false);
        !done && card.due_date().map(|d| d < today).unwrap_or(false)
    }

    fn bump_seq(&mut self, card_id: &str) -> u64 {
        let entry = self.seq.entry(card_id.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    fn current_seq(&self, card_id: &str) -> u64 {
        self.seq.get(card_id).copied().unwrap_or(0)
    }

    /// Remove `card_id` from the source bucket and insert it into the
    /// destination at `dest_index`. Only the dragged id changes bucket
    /// membership, so siblings retain relative order.
    fn splice_move(
        &mut self,
        card_id: &str,
        source_column_id: &str,
        source_index: usize,
        dest_column_id: &str,
        dest_index: usize,
    ) -> Result<(), BoardError> {
        // Validate both ends before touching anything; a failed move
        // must leave the projection exactly as it was.
        if self.bucket(dest_column_id).is_none() {
            return Err(BoardError::UnknownColumn(dest_column_id.to_string()));
        }
        let source = self
            .bucket_mut(source_column_id)
            .ok_or_else(|| BoardError::UnknownColumn(source_column_id.to_string()))?;
        if source.card_ids.get(source_index).map(String::as_str) == Some(card_id) {
            source.card_ids.remove(source_index);
        } else if let Some(pos) = source.card_ids.iter().position(|id| id == card_id) {
            // Bookkeeping drifted; fall back to removal by id.
            log::debug!(
                "card {card_id} not at index {source_index} of column {source_column_id}, removing by id"
            );
            source.card_ids.remove(pos);
        } else {
            return Err(BoardError::CardNotFound(card_id.to_string()));
        }

        let dest = self
            .bucket_mut(dest_column_id)
            .ok_or_else(|| BoardError::UnknownColumn(dest_column_id.to_string()))?;
        let index = dest_index.min(dest.card_ids.len());
        dest.card_ids.insert(index, card_id.to_string());
        Ok(())
    }

    /// Remove the id from `cards` and scrub it from every bucket.
    /// Scrubbing all buckets is deliberate: the id should be in one, but
    /// the operation must stay safe when bookkeeping has drifted.
    fn remove_everywhere(&mut self, card_id: &str) -> Option<C> {
        let card = self.cards.remove(card_id);
        for bucket in &mut self.buckets {
            bucket.card_ids.retain(|id| id != card_id);
        }
        self.seq.remove(card_id);
        card
    }
}

/// Computes a fetched card's target column and the status value written
/// back when it moves.
pub trait ColumnResolver<C>: Send + Sync {
    fn resolve(&self, card: &C, board: &Board) -> Option<String>;
    fn status_value(&self, board: &Board, column_id: &str) -> String;
}

/// Task cards: `status` is literally a column id. Empty or unknown
/// status falls back to the board's default column, then the first
/// column.
pub struct StatusIsColumnId;

impl ColumnResolver<Task> for StatusIsColumnId {
    fn resolve(&self, card: &Task, board: &Board) -> Option<String> {
        if !card.status.is_empty() && board.column(&card.status).is_some() {
            return Some(card.status.clone());
        }
        if let Some(default) = &board.default_column_id {
            if board.column(default).is_some() {
                return Some(default.clone());
            }
        }
        board.first_column_id().map(|id| id.to_string())
    }

    fn status_value(&self, _board: &Board, column_id: &str) -> String {
        column_id.to_string()
    }
}

/// Customer cards: the free-text `status` label is classified into a
/// pipeline stage; the stage names the column. Moving a customer writes
/// the destination column's title back as the new label.
pub struct StageResolver {
    classifier: Box<dyn StageClassifier>,
}

impl StageResolver {
    pub fn new(classifier: Box<dyn StageClassifier>) -> Self {
        Self { classifier }
    }
}

impl ColumnResolver<Customer> for StageResolver {
    fn resolve(&self, card: &Customer, _board: &Board) -> Option<String> {
        Some(self.classifier.classify(&card.status).column_id().to_string())
    }

    fn status_value(&self, board: &Board, column_id: &str) -> String {
        board
            .column(column_id)
            .map(|col| col.title.clone())
            .unwrap_or_else(|| column_id.to_string())
    }
}

/// Outcome of a drag move, as the view needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    /// Destination is the terminal column — trigger the celebration.
    pub completed: bool,
}

/// The board reconciler. Holds an injected store handle (never a global)
/// and a column resolver for the card kind.
pub struct Reconciler<C: CardRecord, S: CardStore<C>> {
    store: Arc<S>,
    resolver: Box<dyn ColumnResolver<C>>,
}

impl<S: CardStore<Task>> Reconciler<Task, S> {
    pub fn for_tasks(store: Arc<S>) -> Self {
        Self::new(store, Box::new(StatusIsColumnId))
    }
}

impl<S: CardStore<Customer>> Reconciler<Customer, S> {
    pub fn for_customers(store: Arc<S>, classifier: Box<dyn StageClassifier>) -> Self {
        Self::new(store, Box::new(StageResolver::new(classifier)))
    }
}

impl<C: CardRecord, S: CardStore<C>> Reconciler<C, S> {
    pub fn new(store: Arc<S>, resolver: Box<dyn ColumnResolver<C>>) -> Self {
        Self { store, resolver }
    }

    /// Fetch and partition. A fetch failure propagates — no partial
    /// board is ever built. Reload with unchanged backing data is
    /// idempotent: fetch order is the only source of within-column
    /// order.
    pub async fn load(
        &self,
        board: &Board,
        criteria: &FilterCriteria,
    ) -> Result<RuntimeBoard<C>, BoardError> {
        let constraints = filter::translate(criteria);
        let partition = match board.kind {
            BoardKind::Task => Some(board.id.as_str()),
            BoardKind::Workflow => None,
        };
        let rows = self.store.query(partition, &constraints).await?;

        let mut runtime = RuntimeBoard::empty(board.clone());
        for card in rows {
            if let Some(column_id) = self.resolver.resolve(&card, board) {
                if let Some(bucket) = runtime.bucket_mut(&column_id) {
                    bucket.card_ids.push(card.id().to_string());
                }
            }
            // The row is kept even when it landed in no bucket.
            runtime.cards.insert(card.id().to_string(), card);
        }
        Ok(runtime)
    }

    /// Apply a drag gesture: splice the buckets, relabel the card's
    /// status, persist a single status write.
    pub async fn move_card(
        &self,
        runtime: &mut RuntimeBoard<C>,
        gesture: &DragGesture,
    ) -> Result<MoveOutcome, BoardError> {
        let (dest_column_id, dest_index) = match drag::decide(gesture) {
            DropDecision::Ignore => {
                return Ok(MoveOutcome {
                    moved: false,
                    completed: false,
                })
            }
            DropDecision::Move {
                dest_column_id,
                dest_index,
            } => (dest_column_id, dest_index),
        };

        if !runtime.cards.contains_key(&gesture.card_id) {
            return Err(BoardError::CardNotFound(gesture.card_id.clone()));
        }
        runtime.splice_move(
            &gesture.card_id,
            &gesture.source_column_id,
            gesture.source_index,
            &dest_column_id,
            dest_index,
        )?;

        let status = self.resolver.status_value(&runtime.board, &dest_column_id);
        if let Some(card) = runtime.cards.get_mut(&gesture.card_id) {
            card.set_status(status.clone());
        }
        let seq = runtime.bump_seq(&gesture.card_id);
        let completed = completion::is_terminal(&runtime.board, &dest_column_id);

        if let Err(err) = self.store.update_status(&gesture.card_id, &status).await {
            log::warn!(
                "status write for card {} failed, keeping local state: {err}",
                gesture.card_id
            );
        } else if runtime.current_seq(&gesture.card_id) != seq {
            // Defensive: unreachable while callers hold `&mut` across
            // the await (see the `seq` field doc).
            log::debug!(
                "status write for card {} superseded by a newer local edit",
                gesture.card_id
            );
        }

        Ok(MoveOutcome {
            moved: true,
            completed,
        })
    }

    /// Replace the card's entry in the card map. Does not move it
    /// between buckets — callers invoke `move_card` separately when an
    /// edit changes column membership.
    pub async fn update_card(
        &self,
        runtime: &mut RuntimeBoard<C>,
        card: C,
    ) -> Result<(), BoardError> {
        card.validate()?;
        let id = card.id().to_string();
        if !runtime.cards.contains_key(&id) {
            return Err(BoardError::CardNotFound(id));
        }
        runtime.cards.insert(id.clone(), card.clone());
        let seq = runtime.bump_seq(&id);

        if let Err(err) = self.store.update(&card).await {
            log::warn!("update for card {id} failed, keeping local state: {err}");
        } else if runtime.current_seq(&id) != seq {
            log::debug!("update for card {id} superseded by a newer local edit");
        }
        Ok(())
    }

    /// Remove the card locally (map and every bucket) before the
    /// asynchronous delete confirms.
    pub async fn delete_card(
        &self,
        runtime: &mut RuntimeBoard<C>,
        card_id: &str,
    ) -> Result<(), BoardError> {
        if runtime.remove_everywhere(card_id).is_none() {
            return Err(BoardError::CardNotFound(card_id.to_string()));
        }
        if let Err(err) = self.store.delete(card_id).await {
            log::warn!("delete for card {card_id} failed, keeping local state: {err}");
        }
        Ok(())
    }

    /// Add a card created by a quick-add/template flow: append it to the
    /// bucket its status resolves to (the default column when the status
    /// is empty) and persist the insert.
    pub async fn insert_card(
        &self,
        runtime: &mut RuntimeBoard<C>,
        mut card: C,
    ) -> Result<(), BoardError> {
        card.validate()?;
        if card.id().is_empty() {
            card.set_id(Uuid::new_v4().to_string());
        }
        let id = card.id().to_string();

        if let Some(column_id) = self.resolver.resolve(&card, &runtime.board) {
            if let Some(bucket) = runtime.bucket_mut(&column_id) {
                bucket.card_ids.push(id.clone());
            }
        }
        runtime.cards.insert(id.clone(), card.clone());
        runtime.bump_seq(&id);

        match self.store.insert(card).await {
            Ok(created) => {
                if created.id() != id {
                    log::warn!(
                        "store assigned id {} to locally inserted card {id}",
                        created.id()
                    );
                }
            }
            Err(err) => {
                log::warn!("insert for card {id} failed, keeping local state: {err}");
            }
        }
        Ok(())
    }

    /// Append a note to the card's ordered note list and persist the
    /// whole row.
    pub async fn add_note(
        &self,
        runtime: &mut RuntimeBoard<C>,
        card_id: &str,
        note: &str,
    ) -> Result<(), BoardError> {
        let card = runtime
            .cards
            .get_mut(card_id)
            .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;
        card.notes_mut().push(note.to_string());
        let card = card.clone();
        let seq = runtime.bump_seq(card_id);

        if let Err(err) = self.store.update(&card).await {
            log::warn!("note write for card {card_id} failed, keeping local state: {err}");
        } else if runtime.current_seq(card_id) != seq {
            log::debug!("note write for card {card_id} superseded by a newer local edit");
        }
        Ok(())
    }
}
