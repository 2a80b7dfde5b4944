//! Caption font resolution.
//!
//! Fonts are looked up through an ordered [`FontChain`] of [`FontSource`]s.
//! The first source that loads wins; when all of them fail the chain hands
//! back the built-in 8x8 bitmap glyphs together with a
//! [`Warning::FallbackFont`].

use crate::error::Warning;
use ab_glyph::{point, Font, FontVec, GlyphId, InvalidFont, OutlinedGlyph, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use imageproc::pixelops::weighted_sum;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Named system fonts tried in order.
pub const SYSTEM_FONTS: &[&str] = &["meiryo.ttc", "msgothic.ttc"];

/// Side of a built-in glyph in pixels before scaling.
const GLYPH_SIDE: u32 = 8;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font {0} not found")]
    NotFound(String),

    #[error("failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid font data in {}: {source}", path.display())]
    Invalid { path: PathBuf, source: InvalidFont },
}

/// A loaded caption font at a fixed pixel size.
pub enum FontHandle {
    Scalable { font: FontVec, scale: PxScale },
    Builtin { factor: u32 },
}

impl FontHandle {
    /// Built-in bitmap glyphs scaled to roughly `size` pixels tall.
    pub fn builtin(size: u32) -> Self {
        let factor = ((size as f32 / GLYPH_SIDE as f32).round() as u32).max(1);
        FontHandle::Builtin { factor }
    }

    /// Wraps a scalable font so that its em square is `size` pixels.
    pub fn scalable(font: FontVec, size: u32) -> Self {
        let px = size as f32;
        let scale = match font.units_per_em() {
            Some(units) if units > 0.0 => PxScale::from(px * font.height_unscaled() / units),
            _ => PxScale::from(px),
        };
        FontHandle::Scalable { font, scale }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontHandle::Builtin { .. })
    }

    /// Width and height of the box `text` occupies when drawn.
    ///
    /// For scalable fonts this is the ink box of the laid out glyphs.
    /// Sizes saturate at `u32::MAX` instead of overflowing.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            FontHandle::Scalable { font, scale } => {
                let glyphs = layout(font, *scale, text);
                match ink_bounds(&glyphs) {
                    Some(ink) => (
                        (ink.max_x - ink.min_x) as u32,
                        (ink.max_y - ink.min_y) as u32,
                    ),
                    None => (0, 0),
                }
            }
            FontHandle::Builtin { factor } => {
                let side = GLYPH_SIDE.saturating_mul(*factor);
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                (side.saturating_mul(chars), side)
            }
        }
    }

    /// Draws `text` so its measured box has its top-left corner at `(x, y)`,
    /// clipped to the canvas.
    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            FontHandle::Scalable { font, scale } => {
                draw_outlined(canvas, color, x, y, &layout(font, *scale, text))
            }
            FontHandle::Builtin { factor } => draw_builtin(canvas, color, x, y, *factor, text),
        }
    }
}

/// Glyph outlines positioned on a single line with the baseline at the ascent.
fn layout(font: &FontVec, scale: PxScale, text: &str) -> Vec<OutlinedGlyph> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0;
    let mut previous: Option<GlyphId> = None;
    let mut glyphs = Vec::new();

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, id);
        }

        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            glyphs.push(outlined);
        }
    }

    glyphs
}

/// Pixel-aligned union of the glyph bounds.
struct InkBox {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

fn ink_bounds(glyphs: &[OutlinedGlyph]) -> Option<InkBox> {
    glyphs.iter().map(OutlinedGlyph::px_bounds).fold(None, |ink, b| {
        Some(match ink {
            None => InkBox {
                min_x: b.min.x,
                min_y: b.min.y,
                max_x: b.max.x,
                max_y: b.max.y,
            },
            Some(ink) => InkBox {
                min_x: ink.min_x.min(b.min.x),
                min_y: ink.min_y.min(b.min.y),
                max_x: ink.max_x.max(b.max.x),
                max_y: ink.max_y.max(b.max.y),
            },
        })
    })
}

fn draw_outlined(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, glyphs: &[OutlinedGlyph]) {
    let Some(ink) = ink_bounds(glyphs) else {
        return;
    };

    for glyph in glyphs {
        let bounds = glyph.px_bounds();
        let origin_x = x + (bounds.min.x - ink.min_x) as i32;
        let origin_y = y + (bounds.min.y - ink.min_y) as i32;

        glyph.draw(|gx, gy, coverage| {
            let px = origin_x + gx as i32;
            let py = origin_y + gy as i32;
            if px < 0 || py < 0 || px as u32 >= canvas.width() || py as u32 >= canvas.height() {
                return;
            }

            let coverage = coverage.clamp(0.0, 1.0);
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            *pixel = weighted_sum(*pixel, color, 1.0 - coverage, coverage);
        });
    }
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_builtin(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, factor: u32, text: &str) {
    let side = i32::try_from(GLYPH_SIDE.saturating_mul(factor)).unwrap_or(i32::MAX);
    let factor = i32::try_from(factor).unwrap_or(i32::MAX);

    for (i, c) in text.chars().enumerate() {
        let Some(origin_x) = i32::try_from(i)
            .ok()
            .and_then(|i| i.checked_mul(side))
            .and_then(|offset| x.checked_add(offset))
        else {
            return;
        };

        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_SIDE {
                // Bit 0 is the leftmost pixel.
                if (*bits >> col) & 1 == 0 {
                    continue;
                }

                let px = origin_x.saturating_add((col as i32).saturating_mul(factor));
                let py = y.saturating_add((row as i32).saturating_mul(factor));
                fill_block(canvas, color, px, py, factor);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, side: i32) {
    // Only the part of the block that overlaps the canvas.
    let x0 = x.max(0) as i64;
    let y0 = y.max(0) as i64;
    let x1 = (x as i64 + side as i64).min(canvas.width() as i64);
    let y1 = (y as i64 + side as i64).min(canvas.height() as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// One candidate in the font fallback chain.
pub trait FontSource {
    /// Human readable name for logs.
    fn name(&self) -> String;

    fn load(&self, size: u32) -> Result<FontHandle, FontError>;
}

fn load_font_file(path: &Path, size: u32) -> Result<FontHandle, FontError> {
    let data = fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Collections (.ttc) hold several faces; the first one is the regular face.
    let font = FontVec::try_from_vec_and_index(data, 0).map_err(|source| FontError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(FontHandle::scalable(font, size))
}

/// A font at an explicit path.
pub struct FileFont(pub PathBuf);

impl FontSource for FileFont {
    fn name(&self) -> String {
        self.0.display().to_string()
    }

    fn load(&self, size: u32) -> Result<FontHandle, FontError> {
        load_font_file(&self.0, size)
    }
}

/// A font looked up by file name under a set of font directories.
///
/// The directory walk runs once; its result, found or not, is reused for the
/// life of the source.
pub struct SystemFont {
    file_name: String,
    search_dirs: Vec<PathBuf>,
    located: OnceCell<Option<PathBuf>>,
}

impl SystemFont {
    pub fn new(file_name: &str) -> Self {
        Self::in_dirs(file_name, default_font_dirs())
    }

    pub fn in_dirs(file_name: &str, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            file_name: file_name.to_string(),
            search_dirs,
            located: OnceCell::new(),
        }
    }

    fn locate(&self) -> Option<PathBuf> {
        self.located.get_or_init(|| self.search()).clone()
    }

    fn search(&self) -> Option<PathBuf> {
        tracing::debug!(font = %self.file_name, "searching font directories");
        self.search_dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| WalkDir::new(dir).follow_links(true).into_iter())
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry.file_type().is_file()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|n| n.eq_ignore_ascii_case(&self.file_name))
            })
            .map(|entry| entry.into_path())
    }
}

impl FontSource for SystemFont {
    fn name(&self) -> String {
        self.file_name.clone()
    }

    fn load(&self, size: u32) -> Result<FontHandle, FontError> {
        let path = self
            .locate()
            .ok_or_else(|| FontError::NotFound(self.file_name.clone()))?;
        load_font_file(&path, size)
    }
}

pub fn default_font_dirs() -> Vec<PathBuf> {
    [
        r"C:\Windows\Fonts",
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

pub struct ResolvedFont {
    pub handle: FontHandle,
    pub warning: Option<Warning>,
}

/// Ordered list of font sources; see the module docs.
pub struct FontChain {
    sources: Vec<Box<dyn FontSource>>,
}

impl Default for FontChain {
    fn default() -> Self {
        Self::new(
            SYSTEM_FONTS
                .iter()
                .map(|name| Box::new(SystemFont::new(name)) as Box<dyn FontSource>)
                .collect(),
        )
    }
}

impl FontChain {
    pub fn new(sources: Vec<Box<dyn FontSource>>) -> Self {
        Self { sources }
    }

    /// Default chain with `path` tried first.
    pub fn with_file(path: PathBuf) -> Self {
        let mut chain = Self::default();
        chain.sources.insert(0, Box::new(FileFont(path)));
        chain
    }

    pub fn resolve(&self, size: u32) -> ResolvedFont {
        for source in &self.sources {
            match source.load(size) {
                Ok(handle) => {
                    tracing::debug!(font = %source.name(), size, "loaded caption font");
                    return ResolvedFont {
                        handle,
                        warning: None,
                    };
                }
                Err(e) => tracing::debug!("font candidate rejected: {e}"),
            }
        }

        tracing::warn!("{}", Warning::FallbackFont);
        ResolvedFont {
            handle: FontHandle::builtin(size),
            warning: Some(Warning::FallbackFont),
        }
    }
}
