/// Pixel sinks: the one device that actually lights pixels.
///
/// A sink is moved into the display worker at start-up; nothing else in the process
/// keeps a handle that can write frames.
pub mod framebuffer;
pub mod headless;
pub mod png;
pub mod raw;

use anyhow::{Context, Result};
use thiserror::Error;
use tiny_skia::Pixmap;
use tracing::info;

use crate::config::{OutputMode, PlayerConfig};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("frame is {got_w}x{got_h}, sink is {want_w}x{want_h}")]
    SizeMismatch {
        got_w: u32,
        got_h: u32,
        want_w: u32,
        want_h: u32,
    },
}

pub trait PixelSink: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Display the frame immediately. The frame must match the sink size.
    fn show(&mut self, frame: &Pixmap) -> Result<(), SinkError>;

    /// Turn every pixel off.
    fn blank(&mut self) -> Result<(), SinkError>;
}

/// Construct the sink selected in the config. Failure here is fatal for the service.
pub fn open_sink(config: &PlayerConfig) -> Result<Box<dyn PixelSink>> {
    let (w, h) = (config.width, config.height);
    if w == 0 || h == 0 {
        anyhow::bail!("Invalid panel size {}x{}", w, h);
    }

    let sink: Box<dyn PixelSink> = match config.output_mode {
        OutputMode::Png => Box::new(
            png::PngSink::new(&config.output_path, w, h, config.brightness)
                .context("Failed to set up PNG output")?,
        ),
        OutputMode::Framebuffer => Box::new(
            framebuffer::FramebufferSink::open(&config.output_path, w, h, config.brightness)
                .with_context(|| {
                    format!("Failed to open framebuffer {}", config.output_path.display())
                })?,
        ),
        OutputMode::Raw => Box::new(raw::RawSink::stdout(w, h, config.brightness)),
        OutputMode::Headless => Box::new(headless::HeadlessSink::new(w, h)),
    };

    info!("Pixel sink ready: {:?} {}x{}", config.output_mode, w, h);
    Ok(sink)
}

pub(crate) fn check_size(frame: &Pixmap, width: u32, height: u32) -> Result<(), SinkError> {
    if frame.width() != width || frame.height() != height {
        return Err(SinkError::SizeMismatch {
            got_w: frame.width(),
            got_h: frame.height(),
            want_w: width,
            want_h: height,
        });
    }
    Ok(())
}

/// Flatten a frame to packed RGB888 with software brightness (0-100) applied.
///
/// Frames are premultiplied, so the stored channels already equal the colour
/// composited over the panel's black background.
pub fn to_rgb(frame: &Pixmap, brightness: u8) -> Vec<u8> {
    let level = brightness.min(100) as u16;
    let mut out = Vec::with_capacity((frame.width() * frame.height() * 3) as usize);
    for px in frame.data().chunks_exact(4) {
        for &c in &px[..3] {
            out.push((c as u16 * level / 100) as u8);
        }
    }
    out
}
