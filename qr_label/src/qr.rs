use crate::error::QrLabelError;
use image::{GrayImage, Luma};
use log::debug;
use qrcode::QrCode;

/// Rendered size of one QR module, in pixels.
const MODULE_PIXELS: u32 = 10;

/// Width of the quiet zone the renderer adds on each side, in modules.
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Encode `text` into a black-on-white QR raster.
///
/// The smallest symbol version that fits the payload is selected
/// automatically. Callers are expected to pass non-empty text.
pub fn encode(text: &str) -> Result<GrayImage, QrLabelError> {
    debug!("encoding qr payload ({} bytes)", text.len());

    let code = QrCode::new(text.as_bytes())?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_deterministic() {
        let a = encode("https://example.org").unwrap();
        let b = encode("https://example.org").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn encode_has_quiet_zone_and_finder() {
        let img = encode("https://example.org").unwrap();

        // square, and a whole number of 10px modules including the border
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % MODULE_PIXELS, 0);

        // quiet zone corner is white, first finder module is black
        let border = QUIET_ZONE_MODULES * MODULE_PIXELS;
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(img.get_pixel(border, border).0[0], 0);
    }

    #[test]
    fn encode_round_trips_through_a_decoder() {
        let img = encode("https://example.org").unwrap();

        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);

        let (_meta, content) = grids[0].decode().unwrap();
        assert_eq!(content, "https://example.org");
    }

    #[test]
    fn longer_payload_yields_bigger_symbol() {
        let short = encode("https://example.org").unwrap();
        let long = encode(&format!("https://example.org/{}", "x".repeat(200))).unwrap();
        assert!(long.width() > short.width());
    }
}
