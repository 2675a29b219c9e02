/// Scale-to-cover: the image is scaled until it covers the panel, keeping its
/// aspect ratio, and the overflow is cropped evenly from both sides.
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::render::RenderError;

pub fn fit_to(src: &Pixmap, width: u32, height: u32) -> Result<Pixmap, RenderError> {
    if src.width() == width && src.height() == height {
        return Ok(src.clone());
    }

    let mut out = Pixmap::new(width, height).ok_or(RenderError::Canvas(width, height))?;
    out.fill(Color::BLACK);

    let src_w = src.width() as f32;
    let src_h = src.height() as f32;
    let dst_w = width as f32;
    let dst_h = height as f32;

    let scale = (dst_w / src_w).max(dst_h / src_h);
    let sx = (dst_w - src_w * scale) / 2.0;
    let sy = (dst_h - src_h * scale) / 2.0;
    let transform = Transform::from_scale(scale, scale).post_translate(sx, sy);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::{Paint, Rect};

    fn pixel(p: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = p.pixel(x, y).unwrap();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_same_size_is_untouched() {
        let mut src = Pixmap::new(16, 8).unwrap();
        src.fill(Color::from_rgba8(1, 2, 3, 255));
        let out = fit_to(&src, 16, 8).unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn test_wide_image_is_center_cropped() {
        // Left half red, right half blue
        let mut src = Pixmap::new(128, 64).unwrap();
        src.fill(Color::from_rgba8(255, 0, 0, 255));
        let mut blue = Paint::default();
        blue.set_color_rgba8(0, 0, 255, 255);
        src.fill_rect(
            Rect::from_xywh(64.0, 0.0, 64.0, 64.0).unwrap(),
            &blue,
            Transform::identity(),
            None,
        );

        let out = fit_to(&src, 64, 64).unwrap();
        assert_eq!((out.width(), out.height()), (64, 64));

        // Source columns 32..96 survive the crop
        let left = pixel(&out, 4, 32);
        let right = pixel(&out, 60, 32);
        assert!(left[0] > 200 && left[2] < 50, "left was {left:?}");
        assert!(right[2] > 200 && right[0] < 50, "right was {right:?}");
    }

    #[test]
    fn test_small_image_is_scaled_up_to_cover() {
        let mut src = Pixmap::new(8, 8).unwrap();
        src.fill(Color::from_rgba8(0, 255, 0, 255));
        let out = fit_to(&src, 64, 32).unwrap();
        for (x, y) in [(2, 2), (32, 16), (61, 29)] {
            let p = pixel(&out, x, y);
            assert!(p[1] > 200 && p[3] == 255, "({x},{y}) was {p:?}");
        }
    }
}
