/// Linux fbdev output. Frames are converted to little-endian RGB565 and written
/// from offset 0 of the device.
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tiny_skia::Pixmap;

use crate::sink::{PixelSink, SinkError, check_size, to_rgb};

pub struct FramebufferSink {
    device: File,
    width: u32,
    height: u32,
    brightness: u8,
}

impl FramebufferSink {
    pub fn open(path: &Path, width: u32, height: u32, brightness: u8) -> Result<Self, SinkError> {
        let device = OpenOptions::new().write(true).open(path)?;
        Ok(Self {
            device,
            width,
            height,
            brightness,
        })
    }

    fn write_rgb565(&mut self, raw: &[u8]) -> Result<(), SinkError> {
        self.device.seek(SeekFrom::Start(0))?;
        self.device.write_all(raw)?;
        self.device.flush()?;
        Ok(())
    }
}

fn rgb888_to_rgb565(rgb888: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(rgb888.len() / 3 * 2);
    for chunk in rgb888.chunks_exact(3) {
        let (r, g, b) = (chunk[0], chunk[1], chunk[2]);
        let mut rgb565: u16 = (r as u16 & 0b11111000) << 8;
        rgb565 |= (g as u16 & 0b11111100) << 3;
        rgb565 |= (b as u16) >> 3;
        raw.extend(rgb565.to_le_bytes());
    }
    raw
}

impl PixelSink for FramebufferSink {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show(&mut self, frame: &Pixmap) -> Result<(), SinkError> {
        check_size(frame, self.width, self.height)?;
        let raw = rgb888_to_rgb565(&to_rgb(frame, self.brightness));
        self.write_rgb565(&raw)
    }

    fn blank(&mut self) -> Result<(), SinkError> {
        let raw = vec![0; (self.width * self.height * 2) as usize];
        self.write_rgb565(&raw)
    }
}
