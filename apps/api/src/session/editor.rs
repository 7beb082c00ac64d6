use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::resume::{ResumeDocument, ResumePatch};
use crate::session::buffer::EditBuffer;
use crate::session::scheduler::{AutosaveScheduler, Decision};
use crate::session::state::SessionState;
use crate::store::{DocumentStore, StoreError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiet period after the last edit before an automatic flush.
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// What the user is told when a flush fails. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Check your input: {0}")]
    CheckInput(String),

    #[error("Resume not found")]
    NotFound,

    #[error("Save failed: {0}")]
    SaveFailed(String),
}

impl From<StoreError> for SaveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => SaveError::CheckInput(msg),
            StoreError::NotFound => SaveError::NotFound,
            StoreError::Backend(msg) => SaveError::SaveFailed(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved { at: DateTime<Utc> },
    Failed(SaveError),
}

type SaveReply = oneshot::Sender<Result<ResumeDocument, SaveError>>;
type FlushResult = Result<ResumeDocument, StoreError>;

enum Command {
    Edited,
    /// `covers` is the sequence number of the last edit the caller needs persisted.
    SaveNow { covers: u64, reply: SaveReply },
}

struct Shared {
    state: SessionState,
    buffer: EditBuffer,
    /// Sequence number of the most recent edit.
    recorded: u64,
}

impl Shared {
    fn record(&mut self, patch: ResumePatch) -> u64 {
        self.state.apply(&patch);
        self.buffer.record(patch);
        self.recorded += 1;
        self.recorded
    }
}

/// One open editor on one resume.
///
/// Edits are applied to the local document and the edit buffer synchronously;
/// a driver task decides when to flush the buffer to the [`DocumentStore`].
/// Dropping the session stops the driver, so an armed debounce never fires.
/// A flush already sent still completes, but its result is no longer applied.
pub struct EditingSession {
    id: Uuid,
    shared: Arc<Mutex<Shared>>,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    driver: JoinHandle<()>,
}

impl EditingSession {
    /// Loads the document and starts the session. `NotFound` means there is no
    /// session at all, not an empty one.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        id: Uuid,
        config: SessionConfig,
    ) -> Result<Self, StoreError> {
        let document = store.fetch(id).await?;
        info!("Opened editing session for resume {id}");
        Ok(Self::start(store, document, config))
    }

    /// Starts a session on an already-loaded document. Must run inside a tokio runtime.
    pub fn start(
        store: Arc<dyn DocumentStore>,
        document: ResumeDocument,
        config: SessionConfig,
    ) -> Self {
        let id = document.id;
        let shared = Arc::new(Mutex::new(Shared {
            state: SessionState::new(document),
            buffer: EditBuffer::new(),
            recorded: 0,
        }));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);

        let driver = Driver {
            id,
            store,
            shared: Arc::clone(&shared),
            scheduler: AutosaveScheduler::new(config.debounce),
            commands: command_rx,
            status: status_tx,
            waiting: Vec::new(),
        };

        Self {
            id,
            shared,
            commands,
            status,
            driver: tokio::spawn(driver.run()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot of the document as the user currently sees it.
    pub fn document(&self) -> ResumeDocument {
        self.shared.lock().state.document().clone()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.shared.lock().buffer.is_empty()
    }

    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Applies `patch` locally and (re)arms the debounce. Never waits.
    pub fn edit(&self, patch: ResumePatch) {
        if patch.is_empty() {
            return;
        }
        self.shared.lock().record(patch);
        // Fails only once the driver is gone; the edit is still visible locally.
        let _ = self.commands.send(Command::Edited);
    }

    /// Applies `patch` and flushes everything buffered without waiting for the
    /// debounce. Runs after any flush already in flight.
    pub async fn save_now(&self, patch: ResumePatch) -> Result<ResumeDocument, SaveError> {
        let covers = {
            let mut shared = self.shared.lock();
            if patch.is_empty() {
                shared.recorded
            } else {
                shared.record(patch)
            }
        };

        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::SaveNow { covers, reply })
            .map_err(|_| SaveError::SaveFailed("editing session closed".to_string()))?;
        outcome
            .await
            .map_err(|_| SaveError::SaveFailed("editing session closed".to_string()))?
    }

    /// Leaves the editor. Buffered edits that were not flushed are dropped.
    pub fn discard(self) {}
}

impl Drop for EditingSession {
    fn drop(&mut self) {
        self.driver.abort();
        debug!("Closed editing session for resume {}", self.id);
    }
}

struct InFlight {
    covers: u64,
    handle: JoinHandle<FlushResult>,
}

struct Driver {
    id: Uuid,
    store: Arc<dyn DocumentStore>,
    shared: Arc<Mutex<Shared>>,
    scheduler: AutosaveScheduler,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<SaveStatus>,
    /// Explicit saves not answered yet, with the last edit each one needs.
    waiting: Vec<(u64, SaveReply)>,
}

impl Driver {
    async fn run(mut self) {
        let mut in_flight: Option<InFlight> = None;

        loop {
            let deadline = self.scheduler.deadline();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Edited) => {
                        self.scheduler.edit_recorded(Instant::now());
                    }
                    Some(Command::SaveNow { covers, reply }) => {
                        self.waiting.push((covers, reply));
                        if self.scheduler.save_requested() == Decision::StartFlush {
                            in_flight = self.begin_flush();
                        }
                    }
                    None => break,
                },
                joined = settle(&mut in_flight) => {
                    let covers = in_flight.take().map_or(0, |flight| flight.covers);
                    self.finish_flush(covers, joined);
                    if self.scheduler.flush_settled() == Decision::StartFlush {
                        in_flight = self.begin_flush();
                    }
                }
                _ = wait_until(deadline) => {
                    if self.scheduler.timer_fired(Instant::now()) == Decision::StartFlush {
                        in_flight = self.begin_flush();
                    }
                }
            }
        }
    }

    /// Drains the buffer and sends it. An empty drain settles on the spot without I/O.
    fn begin_flush(&mut self) -> Option<InFlight> {
        loop {
            let drained = {
                let mut shared = self.shared.lock();
                let covers = shared.recorded;
                shared.buffer.drain().map(|patch| (patch, covers))
            };

            if let Some((patch, covers)) = drained {
                debug!(
                    "Flushing {:?} for resume {}",
                    patch.touched_fields(),
                    self.id
                );
                self.status.send_replace(SaveStatus::Saving);
                let store = Arc::clone(&self.store);
                let id = self.id;
                // Own task: a sent persist is never cancelled, even if the session goes away.
                let handle = tokio::spawn(async move { store.update(id, &patch).await });
                return Some(InFlight { covers, handle });
            }

            debug!("Nothing buffered for resume {}", self.id);
            let current = self.shared.lock().state.document().clone();
            self.answer_waiting(u64::MAX, Ok(current));
            if self.scheduler.flush_settled() != Decision::StartFlush {
                return None;
            }
        }
    }

    fn finish_flush(&mut self, covers: u64, joined: Result<FlushResult, JoinError>) {
        let outcome = match joined {
            Ok(Ok(confirmed)) => {
                {
                    let mut shared = self.shared.lock();
                    let Shared { state, buffer, .. } = &mut *shared;
                    state.adopt(confirmed.clone(), buffer.pending());
                }
                self.status
                    .send_replace(SaveStatus::Saved { at: Utc::now() });
                Ok(confirmed)
            }
            Ok(Err(err)) => {
                warn!("Autosave failed for resume {}, update dropped: {err}", self.id);
                Err(SaveError::from(err))
            }
            Err(err) => {
                warn!("Autosave task for resume {} did not finish: {err}", self.id);
                Err(SaveError::SaveFailed(err.to_string()))
            }
        };

        if let Err(err) = &outcome {
            self.status.send_replace(SaveStatus::Failed(err.clone()));
        }
        self.answer_waiting(covers, outcome);
    }

    fn answer_waiting(&mut self, covers: u64, outcome: Result<ResumeDocument, SaveError>) {
        let (ready, still_waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|(needed, _)| *needed <= covers);
        self.waiting = still_waiting;
        for (_, reply) in ready {
            let _ = reply.send(outcome.clone());
        }
    }
}

async fn settle(in_flight: &mut Option<InFlight>) -> Result<FlushResult, JoinError> {
    match in_flight {
        Some(flight) => (&mut flight.handle).await,
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
