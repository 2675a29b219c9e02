use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Local;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use tracing::info;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::core::job::{JobPayload, JobRequest};
use crate::core::queue::StatusSnapshot;
use crate::source::fetch::parse_url;
use crate::source::image::{DecodedImage, decode};
use crate::source::weather::render_weather;

/// Missing field stays `None`; an explicit `null` becomes `Some(None)`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Longest text accepted for scrolling, in characters
const MAX_TEXT_CHARS: usize = 1024;

fn default_template() -> String {
    "current".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ShowImageRequest {
    pub url: String,
    #[serde(default, deserialize_with = "explicit_null")]
    pub duration: Option<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ShowTextRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "explicit_null")]
    pub duration: Option<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ShowWeatherRequest {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default, deserialize_with = "explicit_null")]
    pub duration: Option<Option<f64>>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.manager.status())
}

pub async fn clear(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let job_id = state.manager.clear()?;
    info!("Queued clear as job {}", job_id);
    Ok(Json(json!({ "ok": true })))
}

pub async fn stop(State(state): State<AppState>) -> Json<Value> {
    state.manager.cancel_current();
    Json(json!({ "ok": true }))
}

pub async fn show_image(
    State(state): State<AppState>,
    payload: Result<Json<ShowImageRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    let duration = state.duration(req.duration)?;
    let url = parse_url(&req.url)?;

    let bytes = state.fetcher.fetch(url).await?;
    let decoded = blocking(move || decode(&bytes)).await??;
    let animated = decoded.is_animated();
    let payload = match decoded {
        DecodedImage::Still(pixmap) => JobPayload::Image(pixmap),
        DecodedImage::Animated(frames) => JobPayload::Animation(frames),
    };

    let job_id = state
        .manager
        .enqueue(JobRequest::new(payload).with_duration(duration))?;
    info!(
        "Queued {} job {} from {}",
        if animated { "animation" } else { "image" },
        job_id,
        req.url
    );
    Ok(Json(json!({ "ok": true, "job_id": job_id, "animated": animated })))
}

pub async fn show_text(
    State(state): State<AppState>,
    payload: Result<Json<ShowTextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    if req.text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "text must be at most {} characters",
            MAX_TEXT_CHARS
        )));
    }
    let duration = state.duration(req.duration)?;
    let renderer = state.text.clone().ok_or(ApiError::NoFont)?;

    let height = state.height;
    let text = req.text;
    let strip = blocking(move || renderer.render_strip(&text, height)).await??;

    let job_id = state
        .manager
        .enqueue(JobRequest::new(JobPayload::Text(strip)).with_duration(duration))?;
    info!("Queued text job {}", job_id);
    Ok(Json(json!({ "ok": true, "job_id": job_id })))
}

pub async fn show_weather(
    State(state): State<AppState>,
    payload: Result<Json<ShowWeatherRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    if req.template.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "template must be at most {} characters",
            MAX_TEXT_CHARS
        )));
    }
    let duration = state.duration(req.duration)?;
    let renderer = state.text.clone().ok_or(ApiError::NoFont)?;

    let (w, h) = (state.width, state.height);
    let template = req.template;
    let frame = blocking(move || render_weather(&renderer, &template, w, h, Local::now())).await??;

    let job_id = state
        .manager
        .enqueue(JobRequest::new(JobPayload::Weather(frame)).with_duration(duration))?;
    info!("Queued weather job {}", job_id);
    Ok(Json(json!({ "ok": true, "job_id": job_id })))
}
