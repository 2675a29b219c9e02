/// Raw output: packed RGB888 frames on a byte stream (stdout by default),
/// for piping into an emulator or a matrix driver process.
use std::io::Write;
use tiny_skia::Pixmap;

use crate::sink::{PixelSink, SinkError, check_size, to_rgb};

pub struct RawSink<W: Write + Send> {
    out: W,
    width: u32,
    height: u32,
    brightness: u8,
}

impl RawSink<std::io::Stdout> {
    pub fn stdout(width: u32, height: u32, brightness: u8) -> Self {
        Self::new(std::io::stdout(), width, height, brightness)
    }
}

impl<W: Write + Send> RawSink<W> {
    pub fn new(out: W, width: u32, height: u32, brightness: u8) -> Self {
        Self {
            out,
            width,
            height,
            brightness,
        }
    }

    fn write_frame(&mut self, rgb: &[u8]) -> Result<(), SinkError> {
        self.out.write_all(rgb)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> PixelSink for RawSink<W> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show(&mut self, frame: &Pixmap) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        let rgb = to_rgb(frame, self.brightness);
        self.write_frame(&rgb)
    }

    fn blank(&mut self) -> Result<(), SinkError> {
        let rgb = vec![0; (self.width * self.height * 3) as usize];
        self.write_frame(&rgb)
    }
}
