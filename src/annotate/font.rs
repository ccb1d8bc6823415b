use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};

/// Font looked up when no explicit font is configured
pub const DEFAULT_FONT_NAME: &str = "DejaVuSans.ttf";

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Font used to draw labels
pub enum LabelFont {
    TrueType(FontVec),
    /// Built-in 5x7 bitmap font, scaled to the requested size
    Builtin,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::TrueType(_) => f.write_str("LabelFont::TrueType"),
            LabelFont::Builtin => f.write_str("LabelFont::Builtin"),
        }
    }
}

impl LabelFont {
    /// Load the requested font, then DejaVuSans from well-known places.
    /// Never fails: falls back to the built-in bitmap font.
    pub fn load(requested: Option<&Path>) -> Self {
        for path in candidate_paths(requested) {
            match Self::try_load(&path) {
                Ok(font) => {
                    tracing::debug!(font = %path.display(), "label font loaded");
                    return font;
                }
                Err(err) => tracing::trace!(font = %path.display(), %err, "font candidate skipped"),
            }
        }

        tracing::debug!("no TrueType font available, using built-in bitmap font");
        LabelFont::Builtin
    }

    fn try_load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("invalid font: {}", e))?;
        Ok(LabelFont::TrueType(font))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, LabelFont::Builtin)
    }

    /// Rendered (width, height) of `text` at `size` pixels
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match self {
            LabelFont::TrueType(font) => text_size(PxScale::from(size as f32), font, text),
            LabelFont::Builtin => {
                let count = text.chars().count() as u32;
                if count == 0 {
                    return (0, 0);
                }
                let s = bitmap_scale(size);
                (count * GLYPH_ADVANCE * s - s, GLYPH_HEIGHT * s)
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y), clipped to the canvas
    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, size: u32, text: &str) {
        match self {
            LabelFont::TrueType(font) => {
                draw_text_mut(canvas, color, x, y, PxScale::from(size as f32), font, text);
            }
            LabelFont::Builtin => draw_bitmap_text(canvas, color, x, y, bitmap_scale(size), text),
        }
    }
}

fn candidate_paths(requested: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = requested {
        paths.push(path.to_path_buf());
    }
    paths.push(PathBuf::from(DEFAULT_FONT_NAME));
    paths.extend(SYSTEM_FONT_DIRS.iter().map(|dir| Path::new(dir).join(DEFAULT_FONT_NAME)));
    paths
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

fn bitmap_scale(size: u32) -> u32 {
    ((size + 4) / 8).max(1)
}

fn draw_bitmap_text(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let s = scale as i64;

    for (i, ch) in text.chars().enumerate() {
        let columns = glyph(ch);
        let cell_x = x as i64 + (i as i64) * GLYPH_ADVANCE as i64 * s;

        for (col, bits) in columns.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT as i64 {
                if (bits >> row) & 1 == 0 {
                    continue;
                }
                let px = cell_x + col as i64 * s;
                let py = y as i64 + row * s;
                for dy in 0..s {
                    for dx in 0..s {
                        let (cx, cy) = (px + dx, py + dy);
                        if cx >= 0 && cy >= 0 && cx < w && cy < h {
                            canvas.put_pixel(cx as u32, cy as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Column bitmaps for printable ASCII; bit 0 is the top row
fn glyph(ch: char) -> &'static [u8; 5] {
    let code = ch as u32;
    if (0x20..=0x7e).contains(&code) {
        &FONT_5X7[(code - 0x20) as usize]
    } else {
        &FONT_5X7[('?' as u32 - 0x20) as usize]
    }
}

#[rustfmt::skip]
static FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];
