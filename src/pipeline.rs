use crate::args::EcArg;
use crate::compose::{compose, ComposedImage};
use crate::error::{GenerateError, SaveError};
use crate::font::FontChain;
use crate::qr::encode;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Everything needed to produce one image.
///
/// Only constructible through [`GenerationRequest::new`] or
/// [`GenerationRequest::from_form`], so the payload is never empty.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    payload: String,
    caption: Option<String>,
    module_size: u32,
    caption_font_size: u32,
    foreground: Rgb<u8>,
    background: Rgb<u8>,
    error_correction: EcArg,
}

impl GenerationRequest {
    /// Takes payload and caption exactly as given; only an empty payload is
    /// rejected, and an empty caption counts as none.
    pub fn new(payload: &str, caption: Option<&str>) -> Result<Self, GenerateError> {
        if payload.is_empty() {
            return Err(GenerateError::EmptyPayload);
        }

        let caption = caption.filter(|c| !c.is_empty()).map(str::to_string);

        Ok(Self {
            payload: payload.to_string(),
            caption,
            module_size: 10,
            caption_font_size: 20,
            foreground: Rgb([0, 0, 0]),
            background: Rgb([255, 255, 255]),
            error_correction: EcArg::H,
        })
    }

    /// Request from the window's text fields, which are trimmed first.
    pub fn from_form(payload: &str, caption: &str) -> Result<Self, GenerateError> {
        Self::new(payload.trim(), Some(caption.trim()))
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn module_size(mut self, size: u32) -> Self {
        self.module_size = size;
        self
    }

    pub fn caption_font_size(mut self, size: u32) -> Self {
        self.caption_font_size = size;
        self
    }

    pub fn colors(mut self, foreground: Rgb<u8>, background: Rgb<u8>) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn error_correction(mut self, level: EcArg) -> Self {
        self.error_correction = level;
        self
    }
}

/// Result of a successful generation.
pub struct Generated {
    pub version: i16,
    pub modules: usize,
    pub composed: ComposedImage,
}

impl Generated {
    pub fn image(&self) -> &RgbImage {
        &self.composed.image
    }
}

/// Encodes the request and draws its caption, if any.
pub fn generate(request: &GenerationRequest, fonts: &FontChain) -> Result<Generated, GenerateError> {
    let encoded = encode(
        &request.payload,
        request.error_correction.into(),
        request.module_size,
        request.foreground,
        request.background,
    )?;

    tracing::info!(
        version = encoded.version,
        modules = encoded.modules,
        level = %request.error_correction.letter(),
        "generated QR code"
    );

    let composed = compose(
        encoded.image,
        request.caption.as_deref(),
        request.caption_font_size,
        fonts,
        request.foreground,
        request.background,
    )?;

    Ok(Generated {
        version: encoded.version,
        modules: encoded.modules,
        composed,
    })
}

/// Writes `image` to `path`, the format picked from the extension.
pub fn save(image: &RgbImage, path: &Path) -> Result<(), SaveError> {
    image.save(path).map_err(|source| SaveError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "saved image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            GenerationRequest::new("", Some("caption")),
            Err(GenerateError::EmptyPayload)
        ));
    }

    #[test]
    fn payload_is_kept_verbatim() {
        let request = GenerationRequest::new(" hi ", Some(" caption ")).unwrap();
        assert_eq!(request.payload(), " hi ");
        assert_eq!(request.caption(), Some(" caption "));

        let request = GenerationRequest::new("   ", Some("")).unwrap();
        assert_eq!(request.payload(), "   ");
        assert_eq!(request.caption(), None);
    }

    #[test]
    fn form_fields_are_trimmed() {
        let request = GenerationRequest::from_form(" data ", "  ").unwrap();
        assert_eq!(request.payload(), "data");
        assert_eq!(request.caption(), None);

        let request = GenerationRequest::from_form("data", " Scan me ").unwrap();
        assert_eq!(request.caption(), Some("Scan me"));

        assert!(matches!(
            GenerationRequest::from_form("  \t ", "caption"),
            Err(GenerateError::EmptyPayload)
        ));
    }

    #[test]
    fn generate_reports_symbol_metadata() {
        let request = GenerationRequest::new("HELLO", None).unwrap();
        let generated = generate(&request, &FontChain::new(vec![])).unwrap();
        assert_eq!(generated.version, 1);
        assert_eq!(generated.modules, 21);
        assert_eq!(generated.image().width(), 290);
    }

    #[test]
    fn huge_caption_font_is_an_error() {
        let caption = "x".repeat(40);
        let request = GenerationRequest::new("HELLO", Some(&caption))
            .unwrap()
            .caption_font_size(u32::MAX);
        assert!(matches!(
            generate(&request, &FontChain::new(vec![])),
            Err(GenerateError::ImageTooLarge)
        ));
    }
}
