/// Display manager: the façade request handlers talk to.
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::cancel::CancellationSignal;
use crate::core::job::{InvalidJobError, JobId, JobRequest};
use crate::core::queue::{JobSender, StatusSnapshot, job_queue};
use crate::core::worker::Worker;
use crate::sink::PixelSink;

pub struct DisplayManager {
    queue: JobSender,
    cancel: CancellationSignal,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DisplayManager {
    /// Move the sink into a freshly spawned worker. Must be called inside a tokio runtime.
    pub fn start(sink: Box<dyn PixelSink>) -> Self {
        let (queue, jobs) = job_queue();
        let cancel = CancellationSignal::new();
        let worker = Worker::new(sink, jobs, cancel.clone());
        let handle = tokio::spawn(worker.run());

        Self {
            queue,
            cancel,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Append a job. Never waits for the worker.
    pub fn enqueue(&self, request: JobRequest) -> Result<JobId, InvalidJobError> {
        self.queue.push(request)
    }

    /// Stop whatever is on the panel now. Queued jobs are untouched; harmless when idle.
    pub fn cancel_current(&self) {
        debug!("Stop requested for current job");
        self.cancel.raise();
    }

    /// Queue a blank. Runs after everything already queued.
    pub fn clear(&self) -> Result<JobId, InvalidJobError> {
        self.enqueue(JobRequest::clear())
    }

    pub fn status(&self) -> StatusSnapshot {
        self.queue.status()
    }

    /// Stop the worker at its next wait point. Jobs still queued are dropped.
    pub async fn shutdown(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
            self.queue.release_current();
            info!("Display worker stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::{JobKind, JobPayload, TextStrip};
    use crate::core::queue::WorkerState;
    use crate::sink::testing::{RecordingSink, SinkEvent, solid};
    use std::time::Duration;
    use tokio::time::{Instant, sleep, sleep_until};

    const W: u32 = 16;
    const H: u32 = 16;

    fn start() -> (DisplayManager, RecordingSink) {
        let sink = RecordingSink::new(W, H);
        let manager = DisplayManager::start(Box::new(sink.clone()));
        (manager, sink)
    }

    fn image(r: u8, secs: Option<f64>) -> JobRequest {
        JobRequest::new(JobPayload::Image(solid(W, H, r, 0, 0))).with_duration(secs)
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_display_in_enqueue_order() {
        let (manager, sink) = start();
        let ids: Vec<JobId> = (1..=5)
            .map(|r| manager.enqueue(image(r, Some(0.1))).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        sleep(Duration::from_secs(1)).await;
        let shown: Vec<u8> = sink.pixels().iter().map(|p| p[0]).collect();
        assert_eq!(shown, vec![1, 2, 3, 4, 5]);
        assert_eq!(manager.status().queue_depth, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_when_idle_is_noop() {
        let (manager, sink) = start();
        let before = manager.status();
        manager.cancel_current();
        manager.cancel_current();
        assert_eq!(manager.status(), before);
        assert_eq!(before.state, WorkerState::Idle);

        // The stale stop does not leak into the next job
        manager.enqueue(image(9, Some(0.5))).unwrap();
        manager.clear().unwrap();
        sleep(Duration::from_secs(2)).await;

        let events = sink.events();
        let [SinkEvent::Frame { at: shown, .. }, SinkEvent::Blank { at: blanked }] = events.as_slice()
        else {
            panic!("unexpected events {events:?}");
        };
        assert!(*blanked - *shown >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_bounds() {
        let (manager, sink) = start();
        manager.enqueue(image(1, Some(0.5))).unwrap();
        manager.clear().unwrap();
        sleep(Duration::from_secs(1)).await;

        let events = sink.events();
        let [SinkEvent::Frame { at: shown, .. }, SinkEvent::Blank { at: blanked }] = events.as_slice()
        else {
            panic!("unexpected events {events:?}");
        };
        let held = *blanked - *shown;
        assert!(held >= Duration::from_millis(500), "held {held:?}");
        assert!(held <= Duration::from_millis(550), "held {held:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_job_waits_for_stop() {
        let (manager, sink) = start();
        let first = manager.enqueue(image(1, None)).unwrap();
        let second = manager.enqueue(image(2, Some(0.2))).unwrap();

        // New work does not preempt an unbounded job
        sleep(Duration::from_secs(60)).await;
        let status = manager.status();
        assert_eq!(status.current_job_id, Some(first));
        assert_eq!(status.queue_depth, 1);

        manager.cancel_current();
        sleep(Duration::from_millis(100)).await;
        let status = manager.status();
        assert_eq!(status.current_job_id, Some(second));
        assert_eq!(status.queue_depth, 0);

        // Cancelling the first job did not cut the second one short
        sleep(Duration::from_millis(300)).await;
        assert_eq!(manager.status().current_job_id, None);
        let shown: Vec<u8> = sink.pixels().iter().map(|p| p[0]).collect();
        assert_eq!(shown, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_text_clear_scenario() {
        let (manager, sink) = start();
        let t0 = Instant::now();

        let image_id = manager.enqueue(image(50, Some(5.0))).unwrap();
        let strip = TextStrip {
            pixmap: solid(40, H, 255, 255, 255),
            text_width: 40,
        };
        let text_id = manager
            .enqueue(JobRequest::new(JobPayload::Text(strip)).with_duration(Some(3.0)))
            .unwrap();
        manager.clear().unwrap();

        let status = manager.status();
        assert!(
            (status.queue_depth == 3 && status.current_job_id.is_none())
                || (status.queue_depth == 2 && status.current_job_id == Some(image_id))
        );

        sleep_until(t0 + Duration::from_millis(100)).await;
        let status = manager.status();
        assert_eq!(status.current_job_id, Some(image_id));
        assert_eq!(status.current_job_kind, Some(JobKind::Image));
        assert_eq!(status.queue_depth, 2);

        sleep_until(t0 + Duration::from_millis(5200)).await;
        let status = manager.status();
        assert_eq!(status.current_job_id, Some(text_id));
        assert_eq!(status.current_job_kind, Some(JobKind::Text));
        assert_eq!(status.queue_depth, 1);

        sleep_until(t0 + Duration::from_millis(8500)).await;
        let status = manager.status();
        assert_eq!(status.current_job_id, None);
        assert_eq!(status.current_job_kind, None);
        assert_eq!(status.queue_depth, 0);
        assert_eq!(status.state, WorkerState::Idle);
        assert!(matches!(sink.events().last(), Some(SinkEvent::Blank { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_does_not_stop_worker() {
        let sink = RecordingSink::new(W, H).failing(1);
        let manager = DisplayManager::start(Box::new(sink.clone()));

        manager.enqueue(image(1, None)).unwrap();
        manager.enqueue(image(2, Some(0.1))).unwrap();
        sleep(Duration::from_millis(500)).await;

        let shown: Vec<u8> = sink.pixels().iter().map(|p| p[0]).collect();
        assert_eq!(shown, vec![2]);
        assert_eq!(manager.status().current_job_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_runs_briefly() {
        let (manager, sink) = start();
        manager
            .enqueue(JobRequest::new(JobPayload::Noop).with_duration(Some(100.0)))
            .unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.status().current_job_id, None);
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_job_rejected() {
        let (manager, _sink) = start();
        let err = manager.enqueue(image(1, Some(-1.0))).unwrap_err();
        assert_eq!(err, InvalidJobError::NonPositiveDuration(-1.0));
        assert_eq!(manager.status().queue_depth, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_unbounded_job() {
        let (manager, _sink) = start();
        manager.enqueue(image(1, None)).unwrap();
        sleep(Duration::from_millis(100)).await;

        assert_eq!(manager.status().state, WorkerState::Rendering);

        manager.shutdown().await;
        let status = manager.status();
        assert_eq!(status.current_job_id, None);
        assert_eq!(status.state, WorkerState::Idle);

        // Enqueue after shutdown is accepted but never displayed
        assert!(manager.enqueue(image(2, Some(1.0))).is_ok());
        manager.shutdown().await;
    }
}
