// src/image.rs

//! PNG codec glue. Everything is normalised to 8-bit straight-alpha RGBA.

use crate::color::Color;
use crate::error::RenderError;
use std::io::Cursor;

/// A decoded image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

/// Decodes PNG bytes. Without `with_alpha` every pixel comes out opaque.
pub fn decode_png(bytes: &[u8], with_alpha: bool) -> Result<DecodedImage, RenderError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| RenderError::DecodeFailure(e.to_string()))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| RenderError::DecodeFailure(e.to_string()))?;
    let data = &buf[..info.buffer_size()];

    let pixels: Vec<Color> = match info.color_type {
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .map(|p| Color::rgb(p[0], p[1], p[2]))
            .collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .map(|p| Color::rgba(p[0], p[0], p[0], p[1]))
            .collect(),
        png::ColorType::Grayscale => data.iter().map(|&v| Color::rgb(v, v, v)).collect(),
        png::ColorType::Indexed => {
            return Err(RenderError::DecodeFailure(
                "palette was not expanded".to_string(),
            ))
        }
    };

    let expected = info.width as usize * info.height as usize;
    if pixels.len() != expected {
        return Err(RenderError::DecodeFailure(format!(
            "decoded {} pixels, expected {}",
            pixels.len(),
            expected
        )));
    }
    let pixels = if with_alpha {
        pixels
    } else {
        pixels.into_iter().map(|c| c.with_alpha(255)).collect()
    };
    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// Encodes straight-alpha pixels as an RGBA PNG.
pub fn encode_png(width: u32, height: u32, pixels: &[Color]) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::EncodeFailure(e.to_string()))?;
        let data: Vec<u8> = pixels.iter().flat_map(|c| [c.r, c.g, c.b, c.a]).collect();
        writer
            .write_image_data(&data)
            .map_err(|e| RenderError::EncodeFailure(e.to_string()))?;
    }
    Ok(out)
}
