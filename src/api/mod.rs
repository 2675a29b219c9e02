/// HTTP control surface for the display.
///
/// Handlers validate and fully prepare a job (fetch, decode, rasterize) before it
/// reaches the queue, so a request either enqueues a complete job or nothing.
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::core::job::parse_duration;
use crate::core::manager::DisplayManager;
use crate::source::fetch::MediaFetcher;
use crate::source::text::TextRenderer;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<DisplayManager>,
    pub fetcher: MediaFetcher,
    /// `None` when no font could be loaded; text and weather answer 503
    pub text: Option<Arc<TextRenderer>>,
    pub width: u32,
    pub height: u32,
    pub default_duration: f64,
}

impl AppState {
    /// Resolve a request's `duration` field: missing takes the default, `null` means
    /// until stopped.
    fn duration(&self, field: Option<Option<f64>>) -> Result<Option<f64>, ApiError> {
        let seconds = field.unwrap_or(Some(self.default_duration));
        parse_duration(seconds)?;
        Ok(seconds)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/matrix/status", get(handlers::status))
        .route("/matrix/clear", post(handlers::clear))
        .route("/matrix/stop", post(handlers::stop))
        .route("/matrix/show/image", post(handlers::show_image))
        .route("/matrix/show/text", post(handlers::show_text))
        .route("/matrix/show/weather", post(handlers::show_weather))
        .with_state(state)
}
