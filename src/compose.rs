use crate::error::{GenerateError, Warning};
use crate::font::FontChain;
use crate::qr::MAX_IMAGE_SIDE;
use image::{imageops, Rgb, RgbImage};

/// Margin around the QR code and caption, in pixels.
pub const PADDING: u32 = 20;

pub struct ComposedImage {
    pub image: RgbImage,
    pub warnings: Vec<Warning>,
}

/// Draws `caption` centered below `qr`.
///
/// Without a caption the QR image is returned as is. Otherwise the canvas is
/// `max(qr_w, text_w) + 2 * PADDING` wide and `qr_h + text_h + 2 * PADDING`
/// tall; the QR code sits one padding unit from the top and the caption starts
/// at `qr_h + PADDING`, right where the QR code ends.
///
/// Fails with [`GenerateError::ImageTooLarge`] when the canvas would exceed
/// [`MAX_IMAGE_SIDE`] on either side.
pub fn compose(
    qr: RgbImage,
    caption: Option<&str>,
    font_size: u32,
    fonts: &FontChain,
    fg: Rgb<u8>,
    bg: Rgb<u8>,
) -> Result<ComposedImage, GenerateError> {
    let Some(caption) = caption else {
        return Ok(ComposedImage {
            image: qr,
            warnings: Vec::new(),
        });
    };

    let resolved = fonts.resolve(font_size);
    let (text_w, text_h) = resolved.handle.measure(caption);

    let width = qr.width().max(text_w).checked_add(PADDING * 2);
    let height = qr
        .height()
        .checked_add(text_h)
        .and_then(|h| h.checked_add(PADDING * 2));
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) if w <= MAX_IMAGE_SIDE && h <= MAX_IMAGE_SIDE => (w, h),
        _ => return Err(GenerateError::ImageTooLarge),
    };

    let mut canvas = RgbImage::from_pixel(width, height, bg);

    let qr_x = (width - qr.width()) / 2;
    imageops::replace(&mut canvas, &qr, qr_x as i64, PADDING as i64);

    let text_x = (width - text_w) / 2;
    let text_y = qr.height() + PADDING;
    resolved
        .handle
        .draw(&mut canvas, fg, text_x as i32, text_y as i32, caption);

    tracing::debug!(width, height, text_w, text_h, "composed caption");

    Ok(ComposedImage {
        image: canvas,
        warnings: resolved.warning.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn checker(side: u32) -> RgbImage {
        RgbImage::from_fn(side, side, |x, y| if (x + y) % 2 == 0 { BLACK } else { WHITE })
    }

    fn builtin_chain() -> FontChain {
        FontChain::new(vec![])
    }

    #[test]
    fn no_caption_passes_through() {
        let qr = checker(30);
        let out = compose(qr.clone(), None, 20, &builtin_chain(), BLACK, WHITE).unwrap();
        assert_eq!(out.image, qr);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn caption_layout_follows_padding() {
        let qr = checker(50);
        let fonts = builtin_chain();
        let (tw, th) = fonts.resolve(16).handle.measure("Hi");

        let out = compose(qr.clone(), Some("Hi"), 16, &fonts, BLACK, WHITE).unwrap();
        assert_eq!(out.image.width(), 50.max(tw) + 40);
        assert_eq!(out.image.height(), 50 + th + 40);
        assert_eq!(out.warnings, vec![Warning::FallbackFont]);

        // QR pasted at (20, 20) untouched.
        for (x, y, p) in qr.enumerate_pixels() {
            assert_eq!(out.image.get_pixel(x + 20, y + 20), p);
        }
        // Top margin is background.
        assert!((0..out.image.width()).all(|x| *out.image.get_pixel(x, 0) == WHITE));
    }

    #[test]
    fn wide_caption_centers_qr() {
        let qr = RgbImage::from_pixel(10, 10, BLACK);
        let caption = "a much longer caption";
        let fonts = builtin_chain();
        let (tw, _) = fonts.resolve(8).handle.measure(caption);

        let out = compose(qr, Some(caption), 8, &fonts, BLACK, WHITE).unwrap();
        assert_eq!(out.image.width(), tw + 40);

        let qr_x = (out.image.width() - 10) / 2;
        assert_eq!(*out.image.get_pixel(qr_x, 20), BLACK);
        assert_eq!(*out.image.get_pixel(qr_x - 1, 20), WHITE);
    }

    #[test]
    fn caption_pixels_use_foreground() {
        let red = Rgb([255, 0, 0]);
        let qr = RgbImage::from_pixel(40, 40, WHITE);
        let out = compose(qr, Some("X"), 16, &builtin_chain(), red, WHITE).unwrap();

        let caption_rows = 60..out.image.height();
        let found = out
            .image
            .enumerate_pixels()
            .any(|(_, y, p)| caption_rows.contains(&y) && *p == red);
        assert!(found);
    }

    #[test]
    fn oversized_caption_is_rejected() {
        let qr = checker(30);
        let caption = "x".repeat(40);
        let result = compose(qr, Some(&caption), u32::MAX, &builtin_chain(), BLACK, WHITE);
        assert!(matches!(result, Err(GenerateError::ImageTooLarge)));
    }

    #[test]
    fn canvas_at_limit_is_accepted() {
        // 8 px glyphs: 2043 chars + 40 padding = 16384 wide.
        let qr = checker(10);
        let caption = "x".repeat(2043);
        let out = compose(qr.clone(), Some(&caption), 8, &builtin_chain(), BLACK, WHITE).unwrap();
        assert_eq!(out.image.width(), MAX_IMAGE_SIDE);

        let caption = "x".repeat(2044);
        let result = compose(qr, Some(&caption), 8, &builtin_chain(), BLACK, WHITE);
        assert!(matches!(result, Err(GenerateError::ImageTooLarge)));
    }
}
