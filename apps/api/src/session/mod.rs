//! Client-side editing session: optimistic local edits, a coalescing edit
//! buffer and the autosave scheduler that decides when to flush it.

mod buffer;
mod editor;
mod scheduler;
mod state;

pub use buffer::EditBuffer;
pub use editor::{EditingSession, SaveError, SaveStatus, SessionConfig, DEFAULT_DEBOUNCE};
pub use scheduler::{AutosaveScheduler, Decision, SchedulerState};
pub use state::SessionState;
