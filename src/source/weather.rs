/// Weather/status template renderer.
/// Lays out a title, the template name and the local time, centred on a navy panel.
use chrono::{DateTime, Local};
use tiny_skia::{Color, Pixmap};

use crate::source::SourceError;
use crate::source::text::TextRenderer;

const BACKGROUND: (u8, u8, u8) = (0, 0, 128);
const FOREGROUND: (u8, u8, u8) = (255, 255, 0);
const CLOCK: (u8, u8, u8) = (255, 255, 255);

pub fn render_weather(
    text: &TextRenderer,
    template: &str,
    width: u32,
    height: u32,
    now: DateTime<Local>,
) -> Result<Pixmap, SourceError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(SourceError::Size(width, height))?;
    let (r, g, b) = BACKGROUND;
    pixmap.fill(Color::from_rgba8(r, g, b, 255));

    let lines = [
        ("Weather:".to_string(), FOREGROUND),
        (template.to_string(), FOREGROUND),
        (now.format("%H:%M").to_string(), CLOCK),
    ];

    // Largest size at which every line fits the width, capped by the height
    let mut size = height as f32 / lines.len() as f32;
    for (line, _) in &lines {
        let w = text.measure(line, size);
        if w > width {
            size = size * width as f32 / w as f32;
        }
    }
    let size = size.max(4.0);

    let line_height = text.line_height(size);
    let total = line_height * lines.len() as f32;
    let start_y = ((height as f32 - total) / 2.0).max(0.0);

    for (i, (line, color)) in lines.iter().enumerate() {
        let w = text.measure(line, size) as i32;
        let x = ((width as i32 - w) / 2).max(0);
        let top = (start_y + i as f32 * line_height) as i32;
        text.draw_line(&mut pixmap, line, x, top, size, *color);
    }

    Ok(pixmap)
}
