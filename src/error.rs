use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no data to encode: enter the data for the QR code")]
    EmptyPayload,

    #[error("module size must be at least 1 pixel")]
    InvalidModuleSize,

    #[error(
        "requested image is too large, the limit is {} pixels per side",
        crate::qr::MAX_IMAGE_SIDE
    )]
    ImageTooLarge,

    #[error("failed to generate QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

#[derive(Debug, Error)]
#[error("failed to save image to {}: {source}", path.display())]
pub struct SaveError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Problems that did not stop generation but the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// None of the named caption fonts could be loaded.
    FallbackFont,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::FallbackFont => {
                write!(f, "system font not found, using the built-in default font")
            }
        }
    }
}
