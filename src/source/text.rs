/// Text rasterization with rusttype.
/// Produces the single-line strips the scroll routine slides across the panel.
use rusttype::{Font, Scale, point};
use std::path::Path;
use tiny_skia::{Color, Pixmap};
use tracing::{debug, info};

use crate::core::job::TextStrip;
use crate::source::SourceError;

/// Glyph height relative to the panel height
const TEXT_HEIGHT_RATIO: f32 = 0.5;
/// Widest strip ever rasterized
pub const MAX_STRIP_WIDTH: u32 = 16_384;

pub struct TextRenderer {
    font: Font<'static>,
}

impl TextRenderer {
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let data = std::fs::read(path)
            .map_err(|e| SourceError::Font(format!("{}: {}", path.display(), e)))?;
        let font = Font::try_from_vec(data)
            .ok_or_else(|| SourceError::Font(format!("{}: not a TrueType font", path.display())))?;
        info!("Loaded font {}", path.display());
        Ok(Self { font })
    }

    /// Advance width of `text` in pixels at the given glyph size
    pub fn measure(&self, text: &str, size: f32) -> u32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| (g.position().x + g.unpositioned().h_metrics().advance_width).ceil())
            .unwrap_or(0.0)
            .max(0.0) as u32
    }

    /// Height of one line (ascent to descent) at the given size
    pub fn line_height(&self, size: f32) -> f32 {
        let v = self.font.v_metrics(Scale::uniform(size));
        (v.ascent - v.descent).ceil()
    }

    /// Draw one line with its top edge at `top`, blending over what is already there.
    pub fn draw_line(
        &self,
        target: &mut Pixmap,
        text: &str,
        x: i32,
        top: i32,
        size: f32,
        (r, g, b): (u8, u8, u8),
    ) {
        let scale = Scale::uniform(size);
        let ascent = self.font.v_metrics(scale).ascent;
        let tw = target.width() as i32;
        let th = target.height() as i32;
        let data = target.data_mut();

        for glyph in self
            .font
            .layout(text, scale, point(x as f32, top as f32 + ascent))
        {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || px >= tw || py < 0 || py >= th || v <= 0.0 {
                    return;
                }
                let idx = ((py * tw + px) * 4) as usize;
                let a = v.min(1.0);
                // Premultiplied source-over
                data[idx] = (r as f32 * a + data[idx] as f32 * (1.0 - a)) as u8;
                data[idx + 1] = (g as f32 * a + data[idx + 1] as f32 * (1.0 - a)) as u8;
                data[idx + 2] = (b as f32 * a + data[idx + 2] as f32 * (1.0 - a)) as u8;
                data[idx + 3] = (255.0 * a + data[idx + 3] as f32 * (1.0 - a)) as u8;
            });
        }
    }

    /// Render `text` white on black into a strip as tall as the panel, vertically centred.
    pub fn render_strip(&self, text: &str, height: u32) -> Result<TextStrip, SourceError> {
        let line = text.replace(['\r', '\n'], " ");
        let size = (height as f32 * TEXT_HEIGHT_RATIO).max(6.0);
        let text_width = self.measure(&line, size);
        if text_width > MAX_STRIP_WIDTH {
            return Err(SourceError::Size(text_width, height));
        }

        let width = text_width.max(1);
        let mut pixmap = Pixmap::new(width, height).ok_or(SourceError::Size(width, height))?;
        pixmap.fill(Color::BLACK);

        let top = ((height as f32 - self.line_height(size)) / 2.0).floor() as i32;
        self.draw_line(&mut pixmap, &line, 0, top, size, (255, 255, 255));

        debug!("Rendered text strip '{}' ({}x{})", line, text_width, height);
        Ok(TextStrip { pixmap, text_width })
    }
}
