//! Frame sources: everything that turns a request into pixels before it is queued.
//!
//! - `fetch`: download media over HTTP
//! - `image`: decode still images (and dispatch GIFs to `gif`)
//! - `gif`: composite animated GIF frames with their delays
//! - `text`: rasterize text into a scroll strip
//! - `weather`: render the weather/status template

pub mod fetch;
pub mod gif;
pub mod image;
pub mod text;
pub mod weather;

use thiserror::Error;

/// Largest decoded frame accepted from a request, in pixels
pub const MAX_FRAME_PIXELS: u64 = 4096 * 4096;
/// Upper bound on decoded animation memory, RGBA bytes across all frames
pub const MAX_ANIMATION_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
    #[error("failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("HTTP {0} fetching image")]
    Status(u16),
    #[error("not a valid image: {0}")]
    Decode(#[from] ::image::ImageError),
    #[error("not a valid GIF: {0}")]
    Gif(#[from] ::gif::DecodingError),
    #[error("image has no frames")]
    NoFrames,
    #[error("image of {0}x{1} pixels is not supported")]
    Size(u32, u32),
    #[error("animation is too large to decode")]
    AnimationTooLarge,
    #[error("font error: {0}")]
    Font(String),
}
