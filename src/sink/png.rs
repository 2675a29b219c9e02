/// PNG output: every frame replaces one image file. Handy for development.
/// Frames are written beside the target and renamed over it, so a reader never
/// sees a half-written file.
use std::path::{Path, PathBuf};
use tiny_skia::Pixmap;
use tracing::trace;

use crate::sink::{PixelSink, SinkError, check_size, to_rgb};

pub struct PngSink {
    path: PathBuf,
    staging: PathBuf,
    width: u32,
    height: u32,
    brightness: u8,
}

impl PngSink {
    pub fn new(path: &Path, width: u32, height: u32, brightness: u8) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");
        let mut sink = Self {
            path: path.to_path_buf(),
            staging: PathBuf::from(staging),
            width,
            height,
            brightness,
        };
        // Fails early if the location is not writable
        sink.blank()?;
        Ok(sink)
    }

    fn write_rgb(&self, rgb: Vec<u8>) -> Result<(), SinkError> {
        image::save_buffer_with_format(
            &self.staging,
            &rgb,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        std::fs::rename(&self.staging, &self.path)?;
        trace!("Wrote frame to {}", self.path.display());
        Ok(())
    }
}

impl PixelSink for PngSink {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show(&mut self, frame: &Pixmap) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        self.write_rgb(to_rgb(frame, self.brightness))
    }

    fn blank(&mut self) -> Result<(), SinkError> {
        self.write_rgb(vec![0; (self.width * self.height * 3) as usize])
    }
}
