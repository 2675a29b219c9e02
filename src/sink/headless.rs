/// Headless output: frames are counted and dropped.
use tiny_skia::Pixmap;
use tracing::trace;

use crate::sink::{PixelSink, SinkError, check_size};

pub struct HeadlessSink {
    width: u32,
    height: u32,
    frames: u64,
}

impl HeadlessSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: 0,
        }
    }
}

impl PixelSink for HeadlessSink {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show(&mut self, frame: &Pixmap) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        self.frames += 1;
        trace!("Headless frame {}", self.frames);
        Ok(())
    }

    fn blank(&mut self) -> Result<(), SinkError> {
        trace!("Headless blank");
        Ok(())
    }
}
