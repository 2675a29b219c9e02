/// Render routines: each drives the sink for one job until the job expires or is
/// cancelled. The stop condition is checked before every frame write, so a stop
/// request takes effect within one frame hold.
use std::time::Duration;
use tiny_skia::Pixmap;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::core::cancel::CancellationSignal;
use crate::core::job::{AnimationFrame, TextStrip};
use crate::render::RenderError;
use crate::render::fit::fit_to;
use crate::render::scroll::{ScrollCursor, compose_viewport};
use crate::sink::PixelSink;

/// How often a still image re-checks its stop condition
pub const STILL_POLL: Duration = Duration::from_millis(50);
/// Floor for animation frame delays from broken metadata
pub const MIN_FRAME_HOLD: Duration = Duration::from_millis(10);
/// One column of scroll per tick
pub const SCROLL_TICK: Duration = Duration::from_millis(20);
/// Blank stays up at least this long before the next job
pub const CLEAR_HOLD: Duration = Duration::from_millis(50);
pub const NOOP_YIELD: Duration = Duration::from_millis(10);

/// Timing and stop state for one job.
pub struct Playback<'a> {
    started: Instant,
    duration: Option<Duration>,
    cancel: &'a CancellationSignal,
}

impl<'a> Playback<'a> {
    pub fn start(duration: Option<Duration>, cancel: &'a CancellationSignal) -> Self {
        Self {
            started: Instant::now(),
            duration,
            cancel,
        }
    }

    pub fn should_stop(&self) -> bool {
        self.cancel.is_set() || self.remaining().is_some_and(|r| r.is_zero())
    }

    /// Time left before expiry; `None` for an unbounded job.
    fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|d| d.saturating_sub(self.started.elapsed()))
    }

    /// Sleep for `hold`, or less if the job expires sooner.
    async fn hold(&self, hold: Duration) {
        let hold = match self.remaining() {
            Some(left) => hold.min(left),
            None => hold,
        };
        time::sleep(hold).await;
    }
}

/// Static image and weather: one write, then wait. The panel keeps the last frame.
pub async fn show_still(
    sink: &mut dyn PixelSink,
    frame: &Pixmap,
    playback: &Playback<'_>,
) -> Result<(), RenderError> {
    if playback.should_stop() {
        return Ok(());
    }
    let fitted = fit_to(frame, sink.width(), sink.height())?;
    sink.show(&fitted)?;

    while !playback.should_stop() {
        playback.hold(STILL_POLL).await;
    }
    Ok(())
}

/// Loop the frames forever, each held for its own delay.
pub async fn play_animation(
    sink: &mut dyn PixelSink,
    frames: &[AnimationFrame],
    playback: &Playback<'_>,
) -> Result<(), RenderError> {
    let (w, h) = (sink.width(), sink.height());
    let fitted = frames
        .iter()
        .map(|f| -> Result<(Pixmap, Duration), RenderError> {
            Ok((fit_to(&f.pixmap, w, h)?, f.delay))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if fitted.is_empty() {
        return Ok(());
    }
    debug!("Playing animation: {} frames", fitted.len());

    let mut index = 0;
    while !playback.should_stop() {
        let (pixmap, delay) = &fitted[index];
        sink.show(pixmap)?;
        trace!("Animation frame {}", index);
        time::sleep((*delay).max(MIN_FRAME_HOLD)).await;
        index = (index + 1) % fitted.len();
    }
    Ok(())
}

/// Scroll the strip right to left, one column per tick, looping seamlessly.
pub async fn scroll_text(
    sink: &mut dyn PixelSink,
    strip: &TextStrip,
    playback: &Playback<'_>,
) -> Result<(), RenderError> {
    let (w, h) = (sink.width(), sink.height());
    let mut viewport = Pixmap::new(w, h).ok_or(RenderError::Canvas(w, h))?;
    let mut cursor = ScrollCursor::new(strip.text_width, w);
    debug!(
        "Scrolling text: {} px wide, period {}",
        strip.text_width,
        cursor.period()
    );

    while !playback.should_stop() {
        compose_viewport(&strip.pixmap, &cursor, &mut viewport);
        sink.show(&viewport)?;
        cursor.advance();
        time::sleep(SCROLL_TICK).await;
    }
    Ok(())
}

/// Blank the panel and keep it blank briefly. Duration does not apply.
pub async fn clear(sink: &mut dyn PixelSink) -> Result<(), RenderError> {
    sink.blank()?;
    time::sleep(CLEAR_HOLD).await;
    Ok(())
}

pub async fn noop() {
    time::sleep(NOOP_YIELD).await;
}
