use std::path::PathBuf;
use std::time::Duration;

/// Top-level player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub width: u32,
    pub height: u32,
    pub bind: String,
    pub port: u16,
    pub output_mode: OutputMode,
    pub output_path: PathBuf,
    /// Software brightness (0-100)
    pub brightness: u8,
    pub font_path: PathBuf,
    /// Applied when a request omits `duration`
    pub default_duration: f64,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Save each frame as PNG (for testing)
    #[default]
    Png,
    /// Write RGB565 to a Linux fbdev device (production)
    Framebuffer,
    /// Output raw RGB pixels to stdout (for piping into an emulator)
    Raw,
    /// Discard frames, only log them
    Headless,
}

impl OutputMode {
    /// Frames go to stdout, so nothing else may write there
    pub fn uses_stdout(self) -> bool {
        matches!(self, OutputMode::Raw)
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputMode::Png),
            "framebuffer" | "fb" => Ok(OutputMode::Framebuffer),
            "raw" | "stdout" => Ok(OutputMode::Raw),
            "headless" | "none" | "null" => Ok(OutputMode::Headless),
            _ => Err(format!("Unknown output mode: {s}")),
        }
    }
}
