//! Drawing the label text onto a copy of the image.
//!
//! The text goes on a transparent layer the size of the source: first a filled
//! background box, then the lines of text. The layer is alpha-composited over
//! an RGBA copy of the source, so the source itself is never touched.

use crate::error::{Error, Result};
use crate::layout::TextLayout;
use crate::text_format::{format_text, DEFAULT_COLUMNS};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Fonts tried in order when none is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "Impact.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf",
    "/Library/Fonts/Impact.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "C:\\Windows\\Fonts\\impact.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/ttf-bitstream-vera/Vera.ttf",
];

/// How the overlay looks and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Top-left corner of the background box.
    pub position: (i32, i32),
    pub text_color: [u8; 4],
    pub background: [u8; 4],
    /// Maximum characters per line before wrapping.
    pub columns: usize,
    pub font_size: f32,
    /// Extra pixels between lines.
    pub line_spacing: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            position: (0, 0),
            text_color: [0, 0, 0, 255],
            background: [255, 255, 255, 100],
            columns: DEFAULT_COLUMNS,
            font_size: 28.0,
            line_spacing: 4,
        }
    }
}

/// A parsed TrueType/OpenType font.
pub struct OverlayFont {
    font: FontVec,
    source: PathBuf,
}

impl fmt::Debug for OverlayFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayFont")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl OverlayFont {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Render(format!("cannot read font {}: {}", path.display(), e)))?;
        let mut font = Self::from_bytes(bytes)?;
        font.source = path.to_path_buf();
        log::debug!("Using font {}", path.display());
        Ok(font)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| Error::Render(format!("invalid font data: {}", e)))?;
        Ok(Self {
            font,
            source: PathBuf::from("<memory>"),
        })
    }

    /// Loads `path` when given, otherwise the first installed entry of [`FONT_CANDIDATES`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::discover(),
        }
    }

    pub fn discover() -> Result<Self> {
        FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
            .ok_or_else(|| {
                Error::Render("no usable font found; pass one explicitly with --font".into())
            })
            .and_then(Self::from_path)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn line_height(&self, scale: PxScale) -> u32 {
        self.font.as_scaled(scale).height().ceil() as u32
    }
}

/// Pixel size of `text` drawn line by line with `spacing` pixels between lines.
pub fn measure_multiline(
    font: &OverlayFont,
    scale: PxScale,
    text: &str,
    spacing: u32,
) -> (u32, u32) {
    if text.is_empty() {
        return (0, 0);
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let width = lines
        .iter()
        .map(|line| text_size(scale, &font.font, line).0)
        .max()
        .unwrap_or(0);
    let count = lines.len() as u32;
    let height = count * font.line_height(scale) + (count - 1) * spacing;
    (width, height)
}

/// Returns a copy of `image` with `text` wrapped, boxed and drawn at `style.position`.
pub fn add_text_to_image(
    image: &DynamicImage,
    text: &str,
    style: &OverlayStyle,
    font: &OverlayFont,
) -> RgbaImage {
    let (width, height) = (image.width(), image.height());
    let mut layer = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));

    let formatted = format_text(text, style.columns);
    let scale = PxScale::from(style.font_size);
    let text_size = measure_multiline(font, scale, &formatted, style.line_spacing);
    let layout = TextLayout::compute(text_size, style.position);

    if let Some(rect) = layout.box_rect() {
        draw_filled_rect_mut(&mut layer, rect, Rgba(style.background));
    }

    let (text_x, text_y) = layout.text_position();
    let advance = (font.line_height(scale) + style.line_spacing) as i32;
    for (i, line) in formatted.split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        draw_text_mut(
            &mut layer,
            Rgba(style.text_color),
            text_x,
            text_y + i as i32 * advance,
            scale,
            &font.font,
            line,
        );
    }

    let mut composed = image.to_rgba8();
    imageops::overlay(&mut composed, &layer, 0, 0);
    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn system_font() -> Option<OverlayFont> {
        match OverlayFont::discover() {
            Ok(font) => Some(font),
            Err(_) => {
                eprintln!("skipping test: no system font found");
                None
            }
        }
    }

    fn gray(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160])))
    }

    #[test]
    fn test_missing_font_is_render_error() {
        let err = OverlayFont::from_path("/no/such/font.ttf").unwrap_err();
        assert!(matches!(err, Error::Render(_)));
        let err = OverlayFont::from_bytes(b"not a font".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_output_keeps_dimensions() {
        let Some(font) = system_font() else { return };
        let source = gray(320, 200);
        let style = OverlayStyle::default();
        let out = add_text_to_image(&source, "Water , Pool , Swimming Pool", &style, &font);
        assert_eq!(out.dimensions(), (320, 200));
    }

    #[test]
    fn test_box_is_translucent_white() {
        let Some(font) = system_font() else { return };
        let source = gray(400, 200);
        let out = add_text_to_image(&source, "Water", &OverlayStyle::default(), &font);

        // Top-left pixel is inside the box but outside any glyph.
        let pixel = out.get_pixel(0, 0);
        let expected_red = (40.0 + (255.0 - 40.0) * 100.0 / 255.0) as i32;
        assert!((pixel[0] as i32 - expected_red).abs() <= 2, "{:?}", pixel);
        assert_eq!(pixel[3], 255);

        // Bottom-right corner is untouched.
        assert_eq!(*out.get_pixel(399, 199), Rgba([40, 90, 160, 255]));
    }

    #[test]
    fn test_empty_text_leaves_image_unchanged() {
        let Some(font) = system_font() else { return };
        let source = gray(50, 40);
        let out = add_text_to_image(&source, "", &OverlayStyle::default(), &font);
        assert_eq!(out, source.to_rgba8());
    }

    #[test]
    fn test_measure_grows_with_lines() {
        let Some(font) = system_font() else { return };
        let scale = PxScale::from(28.0);
        let one = measure_multiline(&font, scale, "Water , Pool", 4);
        let two = measure_multiline(&font, scale, "Water , Pool\nTub", 4);
        assert_eq!(one.0, two.0);
        assert_eq!(two.1, 2 * one.1 + 4);
        assert_eq!(measure_multiline(&font, scale, "", 4), (0, 0));
    }

    #[test]
    fn test_style_defaults() {
        let style = OverlayStyle::default();
        assert_eq!(style.background, [255, 255, 255, 100]);
        assert_eq!(style.text_color, [0, 0, 0, 255]);
        assert_eq!(style.columns, 60);
        assert_eq!(style.position, (0, 0));
    }
}
