//! Offline stand-in images used when no Gemini key is configured.

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage};

use crate::gemini::{GenerationError, ImageModel};
use crate::models::PageType;

fn page_color(page_type: PageType) -> [u8; 3] {
    match page_type {
        PageType::Cover => [0xE1, 0x1D, 0x48],    // rose
        PageType::Details => [0xB4, 0x8A, 0x3C],  // gold
        PageType::Location => [0x6B, 0x8F, 0x71], // sage
        PageType::Rsvp => [0x47, 0x55, 0x69],     // slate
    }
}

fn dimensions(model: ImageModel) -> (u32, u32) {
    match model {
        ImageModel::Fast => (150, 200),
        ImageModel::HighFidelity => (300, 400),
    }
}

/// Renders a 3:4 cream card with a tinted frame and returns it base64 encoded.
pub fn render_page(page_type: PageType, model: ImageModel) -> Result<String, GenerationError> {
    let (width, height) = dimensions(model);
    let frame = width / 12;
    let [r, g, b] = page_color(page_type);

    let img = RgbImage::from_fn(width, height, |x, y| {
        let edge = x.min(y).min(width - 1 - x).min(height - 1 - y);
        if edge < frame {
            Rgb([r, g, b])
        } else {
            // soft vertical fade towards the tint
            let t = y as f32 / height as f32 * 0.15;
            let mix = |paper: u8, tint: u8| (paper as f32 * (1.0 - t) + tint as f32 * t) as u8;
            Rgb([mix(0xFA, r), mix(0xF6, g), mix(0xEE, b)])
        }
    });

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| GenerationError::Placeholder(e.to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png_with_three_by_four_shape() {
        let encoded = render_page(PageType::Cover, ImageModel::Fast).unwrap();
        // PNG signature in base64
        assert!(encoded.starts_with("iVBORw0KGgo"));

        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (150, 200));
    }

    #[test]
    fn high_quality_placeholder_is_larger() {
        let hq = render_page(PageType::Rsvp, ImageModel::HighFidelity).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(hq).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (300, 400));
    }
}
