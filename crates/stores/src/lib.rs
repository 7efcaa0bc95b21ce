//! Stateful workflow stores for video generation.
//!
//! - [`generation::GenerationStore`] submits requests (with retry) and runs
//!   one cancellable polling loop per accepted task.
//! - [`history::HistoryStore`] lists past tasks, merges client placeholders
//!   with confirmed records and applies client-side filters.
//! - [`refresher`] keeps the history in step with generation events.
//!
//! Each store owns its state behind a single [`tokio::sync::RwLock`];
//! callers read it through `snapshot()`.

pub mod config;
pub mod events;
pub mod generation;
pub mod history;
pub mod poller;
pub mod refresher;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use config::StoreConfig;
pub use events::GenerationEvent;
pub use generation::{GenerationError, GenerationState, GenerationStore};
pub use history::{HistoryError, HistoryQuery, HistoryState, HistoryStore};
