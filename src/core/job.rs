/// Job model: one immutable display request.
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tiny_skia::Pixmap;

pub type JobId = u64;

/// One frame of an animation together with how long it stays on the panel
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub pixmap: Pixmap,
    pub delay: Duration,
}

/// Pre-rendered text for the scroll routine. `text_width` is the logical width of
/// the text; the pixmap may be narrower (clipped) or wider (trailing blank).
#[derive(Debug, Clone)]
pub struct TextStrip {
    pub pixmap: Pixmap,
    pub text_width: u32,
}

/// What to show. Clear and Noop carry nothing, so "no payload" holds by construction.
#[derive(Debug, Clone)]
pub enum JobPayload {
    Image(Pixmap),
    Animation(Vec<AnimationFrame>),
    Text(TextStrip),
    Weather(Pixmap),
    Clear,
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Image,
    AnimatedImage,
    Text,
    Weather,
    Clear,
    Noop,
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::Image(_) => JobKind::Image,
            JobPayload::Animation(_) => JobKind::AnimatedImage,
            JobPayload::Text(_) => JobKind::Text,
            JobPayload::Weather(_) => JobKind::Weather,
            JobPayload::Clear => JobKind::Clear,
            JobPayload::Noop => JobKind::Noop,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobKind::Image => "image",
            JobKind::AnimatedImage => "animated_image",
            JobKind::Text => "text",
            JobKind::Weather => "weather",
            JobKind::Clear => "clear",
            JobKind::Noop => "noop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidJobError {
    #[error("duration must be a positive number of seconds, got {0}")]
    NonPositiveDuration(f64),
    #[error("duration {0} is not representable")]
    DurationOutOfRange(f64),
    #[error("animation has no frames")]
    EmptyAnimation,
    #[error("text strip has zero width")]
    EmptyTextStrip,
}

/// Seconds to a hold time. `None` stays `None`; zero, negative and NaN are rejected.
pub fn parse_duration(seconds: Option<f64>) -> Result<Option<Duration>, InvalidJobError> {
    match seconds {
        None => Ok(None),
        Some(secs) if secs.is_nan() || secs <= 0.0 => Err(InvalidJobError::NonPositiveDuration(secs)),
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|_| InvalidJobError::DurationOutOfRange(secs)),
    }
}

/// A display request as built by the caller, before it has an id.
#[derive(Debug, Clone)]
pub struct JobRequest {
    payload: JobPayload,
    /// Seconds; `None` displays until cancelled
    duration: Option<f64>,
}

impl JobRequest {
    pub fn new(payload: JobPayload) -> Self {
        Self {
            payload,
            duration: None,
        }
    }

    pub fn clear() -> Self {
        Self::new(JobPayload::Clear)
    }

    pub fn with_duration(mut self, seconds: Option<f64>) -> Self {
        self.duration = seconds;
        self
    }

    /// Check the job invariants and stamp the request with its id.
    pub(crate) fn into_job(self, id: JobId) -> Result<Job, InvalidJobError> {
        let duration = parse_duration(self.duration)?;

        match &self.payload {
            JobPayload::Animation(frames) if frames.is_empty() => {
                return Err(InvalidJobError::EmptyAnimation);
            }
            JobPayload::Text(strip) if strip.text_width == 0 => {
                return Err(InvalidJobError::EmptyTextStrip);
            }
            _ => {}
        }

        Ok(Job {
            id,
            duration,
            payload: self.payload,
        })
    }
}

/// An accepted, immutable job. Only the queue constructs these.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    duration: Option<Duration>,
    payload: JobPayload,
}

impl Job {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.payload.kind()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn payload(&self) -> &JobPayload {
        &self.payload
    }
}
