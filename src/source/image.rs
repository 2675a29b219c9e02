/// Still image decoding. GIF input is handed to the GIF decoder so animations keep
/// their frames; a GIF with a single frame comes back as a still.
use image::{ImageFormat, RgbaImage};
use tiny_skia::Pixmap;
use tracing::debug;

use crate::core::job::AnimationFrame;
use crate::source::SourceError;
use crate::source::gif::decode_gif;

#[derive(Debug)]
pub enum DecodedImage {
    Still(Pixmap),
    Animated(Vec<AnimationFrame>),
}

impl DecodedImage {
    pub fn is_animated(&self) -> bool {
        matches!(self, DecodedImage::Animated(_))
    }
}

pub fn decode(bytes: &[u8]) -> Result<DecodedImage, SourceError> {
    if image::guess_format(bytes).ok() == Some(ImageFormat::Gif) {
        let mut frames = decode_gif(bytes)?;
        if frames.len() > 1 {
            return Ok(DecodedImage::Animated(frames));
        }
        let first = frames.pop().ok_or(SourceError::NoFrames)?;
        return Ok(DecodedImage::Still(first.pixmap));
    }

    let img = image::load_from_memory(bytes)?;
    debug!("Decoded {}x{} still image", img.width(), img.height());
    pixmap_from_rgba(&img.to_rgba8())
}

/// Convert straight-alpha RGBA into a premultiplied pixmap.
fn pixmap_from_rgba(rgba: &RgbaImage) -> Result<DecodedImage, SourceError> {
    let (w, h) = (rgba.width(), rgba.height());
    let mut pixmap = Pixmap::new(w, h).ok_or(SourceError::Size(w, h))?;
    premultiply_into(rgba.as_raw(), pixmap.data_mut());
    Ok(DecodedImage::Still(pixmap))
}

/// Premultiply straight RGBA `src` into `dst`. Both are 4 bytes per pixel.
pub(crate) fn premultiply_into(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3] as u16;
        d[0] = (s[0] as u16 * a / 255) as u8;
        d[1] = (s[1] as u16 * a / 255) as u8;
        d[2] = (s[2] as u16 * a / 255) as u8;
        d[3] = s[3];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_still() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let decoded = decode(&png_bytes(&img)).unwrap();
        assert!(!decoded.is_animated());

        let DecodedImage::Still(pixmap) = decoded else {
            panic!("expected still");
        };
        assert_eq!((pixmap.width(), pixmap.height()), (3, 2));
        assert_eq!(&pixmap.data()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_transparent_pixels_are_premultiplied() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([200, 100, 50, 0]));
        let DecodedImage::Still(pixmap) = decode(&png_bytes(&img)).unwrap() else {
            panic!("expected still");
        };
        assert_eq!(pixmap.data(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(SourceError::Decode(_))
        ));
    }
}
