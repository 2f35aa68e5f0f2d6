// PNG data-URI encoding of the surface, and decoding of uploaded images.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;
use tracing::debug;

use super::canvas::Canvas;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("surface has no pixels ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported data uri: {0}")]
    UnsupportedDataUri(String),
}

/// Encode the canvas as `data:image/png;base64,...`.
pub fn encode_png_data_uri(canvas: &Canvas) -> Result<String, ExportError> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ExportError::EmptySurface {
            width: canvas.width,
            height: canvas.height,
        });
    }

    let rgba = canvas.to_rgba_bytes();
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        &rgba,
        canvas.width,
        canvas.height,
        ExtendedColorType::Rgba8,
    )?;
    debug!(bytes = png.len(), "Encoded surface as PNG");

    Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(&png)))
}

/// Decode either a `data:<mime>;base64,<payload>` URI or a bare base64 payload.
pub fn decode_image(encoded: &str) -> Result<RgbaImage, ExportError> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| ExportError::UnsupportedDataUri(truncate(encoded)))?;
            if !meta.ends_with(";base64") {
                return Err(ExportError::UnsupportedDataUri(truncate(encoded)));
            }
            data
        }
        None => encoded,
    };

    let bytes = STANDARD.decode(payload.trim())?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    debug!(
        width = image.width(),
        height = image.height(),
        "Decoded image"
    );
    Ok(image)
}

fn truncate(s: &str) -> String {
    s.chars().take(32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn encoded_surface_decodes_to_same_pixels() {
        let mut canvas = Canvas::new(3, 2, Color32::TRANSPARENT);
        canvas.set_pixel(2, 1, Color32::from_rgb(200, 100, 50));

        let uri = encode_png_data_uri(&canvas).unwrap();
        assert!(uri.starts_with(PNG_DATA_URI_PREFIX));

        let image = decode_image(&uri).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [200, 100, 50, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn bare_base64_is_accepted() {
        let canvas = Canvas::new(1, 1, Color32::WHITE);
        let uri = encode_png_data_uri(&canvas).unwrap();
        let bare = uri.trim_start_matches(PNG_DATA_URI_PREFIX);
        assert_eq!(decode_image(bare).unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn empty_surface_is_an_error() {
        let canvas = Canvas::new(0, 10, Color32::WHITE);
        assert!(matches!(
            encode_png_data_uri(&canvas),
            Err(ExportError::EmptySurface { width: 0, height: 10 })
        ));
    }

    #[test]
    fn malformed_inputs_are_errors() {
        assert!(matches!(
            decode_image("data:image/png,rawbytes"),
            Err(ExportError::UnsupportedDataUri(_))
        ));
        assert!(matches!(decode_image("!!!"), Err(ExportError::Base64(_))));
        assert!(matches!(
            decode_image(&STANDARD.encode(b"not an image")),
            Err(ExportError::Image(_))
        ));
    }
}
