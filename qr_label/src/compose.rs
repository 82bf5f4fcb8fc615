use crate::error::QrLabelError;
use image::GrayImage;
use log::debug;
use printpdf::{BuiltinFont, ImageTransform, Mm, PdfDocument};

pub const PAGE_WIDTH_MM: f32 = 200.0;
pub const PAGE_HEIGHT_MM: f32 = 250.0;

const PT_TO_MM: f32 = 25.4 / 72.0;

// Layout in PDF points on the 200x250mm page: the QR sits in a fixed
// 100x100pt box, the description is a single centered line below it.
const IMAGE_ORIGIN_X_PT: f32 = 50.0;
const IMAGE_ORIGIN_Y_PT: f32 = 400.0;
const IMAGE_BOX_PT: f32 = 100.0;
const TEXT_CENTER_X_PT: f32 = 100.0;
const TEXT_BASELINE_Y_PT: f32 = 380.0;
const FONT_SIZE_PT: f32 = 12.0;

// Helvetica metrics are not exposed for builtin fonts; half an em per glyph
// is close enough to center short labels.
const GLYPH_ADVANCE_EM: f32 = 0.5;

const IMAGE_DPI: f32 = 300.0;

/// Lay out the QR image and description on a single fixed-size page and
/// return the finished PDF bytes.
///
/// The description is never wrapped or truncated; text wider than the page
/// simply overflows.
pub fn compose(qr: &GrayImage, description: &str) -> Result<Vec<u8>, QrLabelError> {
    debug!("composing pdf page for description {:?}", description);

    let (doc, page, layer) = PdfDocument::new(
        "QR label",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let (width, height) = qr.dimensions();
    let gray = printpdf::image_crate::GrayImage::from_raw(width, height, qr.as_raw().clone())
        .ok_or(QrLabelError::InvalidImage)?;
    let pdf_image =
        printpdf::Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageLuma8(gray));

    // scale the raster to the fixed box regardless of its native resolution
    let target_mm = IMAGE_BOX_PT * PT_TO_MM;
    let natural_w_mm = width as f32 * 25.4 / IMAGE_DPI;
    let natural_h_mm = height as f32 * 25.4 / IMAGE_DPI;

    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(IMAGE_ORIGIN_X_PT * PT_TO_MM)),
            translate_y: Some(Mm(IMAGE_ORIGIN_Y_PT * PT_TO_MM)),
            scale_x: Some(target_mm / natural_w_mm),
            scale_y: Some(target_mm / natural_h_mm),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let text_width_pt = description.chars().count() as f32 * FONT_SIZE_PT * GLYPH_ADVANCE_EM;
    let text_x = Mm((TEXT_CENTER_X_PT - text_width_pt / 2.0) * PT_TO_MM);
    layer.use_text(
        description,
        FONT_SIZE_PT,
        text_x,
        Mm(TEXT_BASELINE_Y_PT * PT_TO_MM),
        &font,
    );

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr;

    #[test]
    fn compose_produces_pdf_bytes() {
        let img = qr::encode("https://example.org").unwrap();
        let bytes = compose(&img, "Asset 42").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!bytes.is_empty());
    }

    #[test]
    fn long_description_still_composes() {
        let img = qr::encode("https://example.org").unwrap();
        let description = "very long description ".repeat(40);
        let bytes = compose(&img, &description).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn page_is_declared_200_by_250_mm() {
        let img = qr::encode("https://example.org").unwrap();
        let long = "very long description ".repeat(40);

        // 200mm x 250mm is 566.93pt x 708.66pt, whatever the description
        for description in ["Asset 42", long.as_str()] {
            let bytes = compose(&img, description).unwrap();
            let text = String::from_utf8_lossy(&bytes);
            let at = text.find("/MediaBox").expect("page has a MediaBox");
            let media_box: String = text[at..].chars().take(60).collect();
            assert!(media_box.contains("566.9"), "unexpected MediaBox: {media_box}");
            assert!(media_box.contains("708.6"), "unexpected MediaBox: {media_box}");
        }
    }
}
