pub mod engine;
pub mod fit;
pub mod scroll;

use thiserror::Error;

use crate::sink::SinkError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("cannot allocate a {0}x{1} canvas")]
    Canvas(u32, u32),
}
