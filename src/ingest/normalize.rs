use anyhow::{anyhow, Result};

use crate::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(feature = "ingest-v4l2"), allow(dead_code))]
pub(crate) enum PixelFormat {
    Rgb24,
    Yuyv,
}

#[cfg_attr(not(feature = "ingest-v4l2"), allow(dead_code))]
pub(crate) fn normalize_to_frame(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<Frame> {
    match format {
        PixelFormat::Rgb24 => {
            // drivers may hand back a buffer padded past the last row
            let expected = width as usize * height as usize * 3;
            let pixels = pixels.get(..expected).unwrap_or(pixels);
            Frame::from_rgb(width, height, pixels.to_vec())
        }
        PixelFormat::Yuyv => Frame::from_rgb(width, height, yuyv_to_rgb(pixels, width, height)?),
    }
}

/// Packed 4:2:2 (Y0 U Y1 V) to RGB24 using BT.601 full-range coefficients.
fn yuyv_to_rgb(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("YUYV frame dimensions overflow"))?;
    if width % 2 != 0 {
        return Err(anyhow!("YUYV frame width must be even, got {}", width));
    }
    let expected = pixel_count * 2;
    if pixels.len() < expected {
        return Err(anyhow!(
            "YUYV frame length mismatch: expected {}, got {}",
            expected,
            pixels.len()
        ));
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    for chunk in pixels[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0], chunk[2]] {
            let y = y as f32;
            rgb.push(clamp_to_u8(y + 1.402_f32 * v));
            rgb.push(clamp_to_u8(y - 0.344_136_f32 * u - 0.714_136_f32 * v));
            rgb.push(clamp_to_u8(y + 1.772_f32 * u));
        }
    }
    Ok(rgb)
}

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_yuyv_is_gray() -> Result<()> {
        let yuyv = vec![128u8; 2 * 2 * 2];
        let frame = normalize_to_frame(&yuyv, 2, 2, PixelFormat::Yuyv)?;
        assert_eq!(frame.pixel(0, 0), [128, 128, 128]);
        assert_eq!(frame.pixel(1, 1), [128, 128, 128]);
        Ok(())
    }

    #[test]
    fn yuyv_rejects_short_buffer() {
        let err = normalize_to_frame(&[0u8; 6], 2, 2, PixelFormat::Yuyv).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn rgb_pass_through_validates_length() -> Result<()> {
        let pixels = vec![1u8; 9];
        let frame = normalize_to_frame(&pixels, 1, 3, PixelFormat::Rgb24)?;
        assert_eq!(frame.pixel(0, 2), [1, 1, 1]);
        assert!(normalize_to_frame(&pixels, 2, 3, PixelFormat::Rgb24).is_err());
        Ok(())
    }
}
