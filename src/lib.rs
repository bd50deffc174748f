//! Reconciliation core for customer/task kanban boards backed by a
//! remote row store: fetch-and-partition, optimistic mutation with
//! asynchronous persistence, drag-and-drop reordering, filtering, and
//! board configuration editing.

pub mod completion;
pub mod drag;
pub mod editor;
pub mod filter;
pub mod reconciler;
pub mod stage;
pub mod storage;
pub mod types;
pub mod validate;

pub use completion::{is_terminal, CelebrationTracker};
pub use drag::{DragGesture, DropDecision};
pub use editor::BoardEditor;
pub use filter::{Constraint, FilterCriteria};
pub use reconciler::{BoardError, MoveOutcome, Reconciler, RuntimeBoard};
pub use stage::{CustomerStage, KeywordClassifier, StageClassifier};
pub use storage::{memory::MemoryStore, BoardStore, CardStore, StoreError};
pub use types::{Board, BoardKind, CardRecord, Column, Customer, Priority, Task};
