use crate::error::GenerateError;
use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::Array2;
use qrcode::{EcLevel, QrCode, Version};

/// Quiet zone around the module grid, in modules.
pub const BORDER: usize = 4;

/// Largest width or height, in pixels, of any image the pipeline builds.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Dark/light module grid of an encoded symbol, indexed `[[y, x]]`.
pub struct QrMatrix {
    version: i16,
    modules: Array2<bool>,
}

impl QrMatrix {
    pub fn width(&self) -> usize {
        self.modules.nrows()
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[[y, x]]
    }

    /// Renders the grid with a `BORDER`-module quiet zone, `module_size` pixels per module.
    pub fn render(
        &self,
        module_size: u32,
        fg: Rgb<u8>,
        bg: Rgb<u8>,
    ) -> Result<RgbImage, GenerateError> {
        let width = self.width();
        let side = u32::try_from(width + 2 * BORDER)
            .ok()
            .and_then(|modules| modules.checked_mul(module_size))
            .filter(|&side| side <= MAX_IMAGE_SIDE)
            .ok_or(GenerateError::ImageTooLarge)?;

        Ok(ImageBuffer::from_fn(side, side, |x, y| {
            let mx = (x / module_size) as usize;
            let my = (y / module_size) as usize;

            let inside = (BORDER..BORDER + width).contains(&mx)
                && (BORDER..BORDER + width).contains(&my);

            if inside && self.modules[[my - BORDER, mx - BORDER]] {
                fg
            } else {
                bg
            }
        }))
    }
}

/// Encodes `text` at the smallest version that fits it at `ec_level`.
pub fn generate_qr_data(text: &str, ec_level: EcLevel) -> Result<QrMatrix, GenerateError> {
    let code = QrCode::with_error_correction_level(text, ec_level)?;

    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };
    let width = code.width();
    let colors = code.to_colors();

    let modules = Array2::from_shape_fn((width, width), |(y, x)| {
        matches!(colors[y * width + x], qrcode::Color::Dark)
    });

    tracing::debug!(version, width, "encoded QR symbol");

    Ok(QrMatrix { version, modules })
}

/// Encoder output: the rendered image plus the symbol metadata the CLI reports.
pub struct EncodedQr {
    pub version: i16,
    pub modules: usize,
    pub image: RgbImage,
}

pub fn encode(
    text: &str,
    ec_level: EcLevel,
    module_size: u32,
    fg: Rgb<u8>,
    bg: Rgb<u8>,
) -> Result<EncodedQr, GenerateError> {
    if module_size == 0 {
        return Err(GenerateError::InvalidModuleSize);
    }

    let matrix = generate_qr_data(text, ec_level)?;
    let image = matrix.render(module_size, fg, bg)?;

    Ok(EncodedQr {
        version: matrix.version(),
        modules: matrix.width(),
        image,
    })
}
