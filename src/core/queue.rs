/// FIFO job queue shared between request handlers and the display worker.
///
/// The id counter, queue depth and current-job snapshot live behind one mutex that is
/// only ever held for a few field updates, never across a render or a queue wait.
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::job::{InvalidJobError, Job, JobId, JobKind, JobRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Rendering,
}

/// Point-in-time view for status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub current_job_id: Option<JobId>,
    pub current_job_kind: Option<JobKind>,
    pub queue_depth: usize,
    pub state: WorkerState,
}

struct QueueState {
    next_id: JobId,
    depth: usize,
    current: Option<(JobId, JobKind)>,
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected producer/consumer pair. Ids start at 1.
pub fn job_queue() -> (JobSender, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = Arc::new(Mutex::new(QueueState {
        next_id: 1,
        depth: 0,
        current: None,
    }));
    (
        JobSender {
            tx,
            state: state.clone(),
        },
        JobReceiver { rx, state },
    )
}

/// Producer side. Cheap to clone; pushing never waits on the worker.
#[derive(Clone)]
pub struct JobSender {
    tx: mpsc::UnboundedSender<Job>,
    state: Arc<Mutex<QueueState>>,
}

impl JobSender {
    /// Validate the request, give it the next id and append it.
    pub fn push(&self, request: JobRequest) -> Result<JobId, InvalidJobError> {
        let mut state = lock(&self.state);
        let job = request.into_job(state.next_id)?;
        let id = job.id();
        let kind = job.kind();
        state.next_id += 1;

        // Sending under the lock keeps channel order identical to id order.
        if self.tx.send(job).is_err() {
            warn!("Job {} ({}) dropped: display worker has stopped", id, kind);
            return Ok(id);
        }
        state.depth += 1;
        debug!("Queued job {} ({}), depth {}", id, kind, state.depth);
        Ok(id)
    }

    /// Drop the current-job marker. Used when the worker is torn down mid-job and
    /// will never call `finish` itself.
    pub fn release_current(&self) {
        lock(&self.state).current = None;
    }

    pub fn status(&self) -> StatusSnapshot {
        let state = lock(&self.state);
        StatusSnapshot {
            current_job_id: state.current.map(|(id, _)| id),
            current_job_kind: state.current.map(|(_, kind)| kind),
            queue_depth: state.depth,
            state: if state.current.is_some() {
                WorkerState::Rendering
            } else {
                WorkerState::Idle
            },
        }
    }
}

/// Consumer side, owned by the worker.
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<Job>,
    state: Arc<Mutex<QueueState>>,
}

impl JobReceiver {
    /// Wait for the next job. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Job> {
        self.rx.recv().await
    }

    /// Publish a popped job as the current one.
    pub fn begin(&self, job: &Job) {
        let mut state = lock(&self.state);
        state.depth = state.depth.saturating_sub(1);
        state.current = Some((job.id(), job.kind()));
    }

    pub fn finish(&self) {
        lock(&self.state).current = None;
    }
}
