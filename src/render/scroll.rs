/// Scroll indexing for text strips.
///
/// The strip is treated as a loop of `text_width + viewport_width` columns: the text
/// followed by one viewport of blank space, so the tail of the text leaves the panel
/// before its head comes back in.
use tiny_skia::{Color, Pixmap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCursor {
    offset: u32,
    period: u32,
}

impl ScrollCursor {
    pub fn new(text_width: u32, viewport_width: u32) -> Self {
        Self {
            offset: 0,
            period: (text_width + viewport_width).max(1),
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn advance(&mut self) {
        self.offset = (self.offset + 1) % self.period;
    }
}

/// Copy the viewport `[offset, offset + out.width())` of the looped strip into `out`.
/// A window that runs past the end of the loop continues from column 0.
pub fn compose_viewport(strip: &Pixmap, cursor: &ScrollCursor, out: &mut Pixmap) {
    out.fill(Color::BLACK);

    let view_w = out.width();
    let start = cursor.offset();
    let end = start + view_w;
    let period = cursor.period();

    let head_end = end.min(period);
    copy_columns(strip, out, start, head_end, 0);
    if end > period {
        copy_columns(strip, out, 0, end - period, head_end - start);
    }
}

/// Copy strip columns `[from, to)` into `out` starting at column `dst_x`.
/// Columns beyond the strip's pixel width stay blank.
fn copy_columns(strip: &Pixmap, out: &mut Pixmap, from: u32, to: u32, dst_x: u32) {
    let to = to.min(strip.width());
    if from >= to {
        return;
    }
    let cols = (to - from).min(out.width().saturating_sub(dst_x)) as usize;
    if cols == 0 {
        return;
    }

    let rows = strip.height().min(out.height()) as usize;
    let src_stride = strip.width() as usize * 4;
    let dst_stride = out.width() as usize * 4;
    let src = strip.data();
    let dst = out.data_mut();

    for y in 0..rows {
        let s = y * src_stride + from as usize * 4;
        let d = y * dst_stride + dst_x as usize * 4;
        dst[d..d + cols * 4].copy_from_slice(&src[s..s + cols * 4]);
    }
}
