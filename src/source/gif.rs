/// Animated GIF decoding.
/// Sub-frames are composited onto a full-size canvas so every output frame is complete.
use gif::DisposalMethod;
use std::time::Duration;
use tiny_skia::Pixmap;
use tracing::debug;

use crate::core::job::AnimationFrame;
use crate::source::{MAX_ANIMATION_BYTES, MAX_FRAME_PIXELS, SourceError};
use crate::source::image::premultiply_into;

pub fn decode_gif(bytes: &[u8]) -> Result<Vec<AnimationFrame>, SourceError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(bytes)?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    // The header alone decides the canvas size, so check it before allocating
    check_budget(width, height, 1)?;
    let stride = width as usize * 4;

    // Straight RGBA, transparent until something is drawn
    let mut canvas = vec![0u8; stride * height as usize];
    let mut frames = Vec::new();
    let mut total_ms = 0u64;

    while let Some(frame) = decoder.read_next_frame()? {
        // GIF delay is in centiseconds
        let delay_ms = frame.delay as u64 * 10;
        let previous = (frame.dispose == DisposalMethod::Previous).then(|| canvas.clone());

        let fx = frame.left as usize;
        let fy = frame.top as usize;
        let fw = frame.width as usize;
        let fh = frame.height as usize;

        for y in 0..fh {
            let cy = fy + y;
            if cy >= height as usize {
                break;
            }
            for x in 0..fw {
                let cx = fx + x;
                if cx >= width as usize {
                    break;
                }
                let s = (y * fw + x) * 4;
                let Some(px) = frame.buffer.get(s..s + 4) else {
                    continue;
                };
                // GIF transparency is all or nothing
                if px[3] > 0 {
                    let d = cy * stride + cx * 4;
                    canvas[d..d + 4].copy_from_slice(px);
                }
            }
        }

        check_budget(width, height, frames.len() + 1)?;
        let mut pixmap = Pixmap::new(width, height).ok_or(SourceError::Size(width, height))?;
        premultiply_into(&canvas, pixmap.data_mut());
        frames.push(AnimationFrame {
            pixmap,
            delay: Duration::from_millis(delay_ms),
        });
        total_ms += delay_ms;

        match frame.dispose {
            DisposalMethod::Background => {
                for y in fy..(fy + fh).min(height as usize) {
                    let start = y * stride + fx.min(width as usize) * 4;
                    let end = y * stride + (fx + fw).min(width as usize) * 4;
                    canvas[start..end].fill(0);
                }
            }
            DisposalMethod::Previous => {
                if let Some(prev) = previous {
                    canvas = prev;
                }
            }
            _ => {}
        }
    }

    if frames.is_empty() {
        return Err(SourceError::NoFrames);
    }
    debug!("Decoded GIF: {} frames, {}ms per loop", frames.len(), total_ms);
    Ok(frames)
}

/// Reject a canvas, or a run of `frames` canvases, that would not fit the decode budget.
fn check_budget(width: u32, height: u32, frames: usize) -> Result<(), SourceError> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels > MAX_FRAME_PIXELS {
        return Err(SourceError::Size(width, height));
    }
    if pixels * 4 * frames as u64 > MAX_ANIMATION_BYTES {
        return Err(SourceError::AnimationTooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::image::{DecodedImage, decode};

    /// Encode solid 4x4 frames with the given colours and delays (centiseconds)
    fn encode(frames: &[([u8; 3], u16)]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, 4, 4, &[]).unwrap();
            for &(rgb, delay) in frames {
                let mut rgba: Vec<u8> = (0..16).flat_map(|_| [rgb[0], rgb[1], rgb[2], 255]).collect();
                let mut frame = gif::Frame::from_rgba_speed(4, 4, &mut rgba, 10);
                frame.delay = delay;
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_frames_and_delays() {
        let bytes = encode(&[([255, 0, 0], 10), ([0, 255, 0], 20), ([0, 0, 255], 5)]);
        let frames = decode_gif(&bytes).unwrap();
        assert_eq!(frames.len(), 3);

        let delays: Vec<u64> = frames.iter().map(|f| f.delay.as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 50]);

        let dominant: Vec<usize> = frames
            .iter()
            .map(|f| {
                let px = &f.pixmap.data()[..3];
                (0..3).max_by_key(|&i| px[i]).unwrap()
            })
            .collect();
        assert_eq!(dominant, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_frame_gif_is_still() {
        let bytes = encode(&[([255, 255, 255], 0)]);
        assert!(matches!(decode(&bytes).unwrap(), DecodedImage::Still(_)));

        let bytes = encode(&[([255, 255, 255], 0), ([0, 0, 0], 0)]);
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.is_animated());
    }

    #[test]
    fn test_oversized_screen_rejected_before_allocating() {
        // A 1x1 frame on a 65535x65535 logical screen
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, 65535, 65535, &[]).unwrap();
            let mut rgba = vec![255, 0, 0, 255];
            let frame = gif::Frame::from_rgba_speed(1, 1, &mut rgba, 10);
            encoder.write_frame(&frame).unwrap();
        }
        assert!(out.len() < 1024);
        assert!(matches!(
            decode_gif(&out),
            Err(SourceError::Size(65535, 65535))
        ));
    }

    #[test]
    fn test_decode_budget() {
        assert!(check_budget(64, 64, 1).is_ok());
        assert!(check_budget(4096, 4096, 1).is_ok());
        assert!(matches!(check_budget(4097, 4096, 1), Err(SourceError::Size(..))));
        assert!(matches!(check_budget(0, 10, 1), Err(SourceError::Size(..))));
        // 4 MB frames: 64 fit, the 65th does not
        assert!(check_budget(1024, 1024, 64).is_ok());
        assert!(matches!(
            check_budget(1024, 1024, 65),
            Err(SourceError::AnimationTooLarge)
        ));
    }

    #[test]
    fn test_truncated_gif_is_an_error() {
        let bytes = encode(&[([255, 0, 0], 10)]);
        assert!(decode_gif(&bytes[..10]).is_err());
    }
}
