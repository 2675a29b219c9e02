/// Display worker: the single consumer of the job queue and the only owner of the sink.
use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::cancel::CancellationSignal;
use crate::core::job::{Job, JobPayload};
use crate::core::queue::JobReceiver;
use crate::render::RenderError;
use crate::render::engine::{self, Playback};
use crate::sink::PixelSink;

pub struct Worker {
    sink: Box<dyn PixelSink>,
    jobs: JobReceiver,
    cancel: CancellationSignal,
}

impl Worker {
    pub fn new(sink: Box<dyn PixelSink>, jobs: JobReceiver, cancel: CancellationSignal) -> Self {
        Self { sink, jobs, cancel }
    }

    /// Run jobs one at a time until the queue closes or the task is aborted.
    pub async fn run(mut self) {
        info!(
            "Display worker started ({}x{})",
            self.sink.width(),
            self.sink.height()
        );

        while let Some(job) = self.jobs.recv().await {
            // A stop aimed at the previous job must not hit this one
            self.cancel.reset();
            self.jobs.begin(&job);

            let (id, kind) = (job.id(), job.kind());
            info!("Job {} ({}) started, duration {:?}", id, kind, job.duration());
            let started = Instant::now();

            match self.render(&job).await {
                Ok(()) if self.cancel.is_set() => {
                    info!("Job {} ({}) stopped after {:.2?}", id, kind, started.elapsed());
                }
                Ok(()) => {
                    info!("Job {} ({}) finished after {:.2?}", id, kind, started.elapsed());
                }
                Err(e) => {
                    warn!("Job {} ({}) abandoned: {}", id, kind, e);
                }
            }

            self.jobs.finish();
        }

        info!("Job queue closed, display worker exiting");
    }

    async fn render(&mut self, job: &Job) -> Result<(), RenderError> {
        let playback = Playback::start(job.duration(), &self.cancel);
        let sink = self.sink.as_mut();

        match job.payload() {
            JobPayload::Image(frame) | JobPayload::Weather(frame) => {
                engine::show_still(sink, frame, &playback).await
            }
            JobPayload::Animation(frames) => engine::play_animation(sink, frames, &playback).await,
            JobPayload::Text(strip) => engine::scroll_text(sink, strip, &playback).await,
            JobPayload::Clear => engine::clear(sink).await,
            JobPayload::Noop => {
                engine::noop().await;
                Ok(())
            }
        }
    }
}
