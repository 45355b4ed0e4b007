//! Caption compositing over generated images.
//!
//! Decodes the image, draws the caption at the top-left with a dark stroked
//! outline under a light fill, and re-encodes to PNG. Pixel dimensions are
//! never changed; caption size scales with image width.

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};

const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 204]);
const FILL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Overlay `caption` onto the encoded image and return it re-encoded as PNG.
pub fn apply_watermark(image_bytes: &[u8], caption: &str) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| Error::MalformedResponse(format!("Lỗi dữ liệu ảnh: {e}")))?;
    let mut img = decoded.to_rgba8();

    draw_caption(&mut img, caption);

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| Error::Unknown(format!("PNG encode failed: {e}")))?;
    Ok(out)
}

fn draw_caption(img: &mut RgbaImage, caption: &str) {
    // Same proportions the canvas version used: font = max(24, width/50),
    // stroke = font/8, anchored at (0.5*font, 1.5*font).
    let font_px = (img.width() / 50).max(24);
    let scale = (font_px / GLYPH_ROWS).max(1);
    let stroke = (font_px / 8).max(1);

    let origin_x = (font_px / 2) as i64;
    let baseline_y = (font_px + font_px / 2) as i64;
    let top_y = baseline_y - (GLYPH_ROWS * scale) as i64;

    let advance = ((GLYPH_COLS + 1) * scale) as i64;
    let mut pen_x = origin_x;

    for ch in caption.chars() {
        if let Some(rows) = glyph(ch.to_ascii_uppercase()) {
            draw_glyph(img, rows, pen_x, top_y, scale, stroke, STROKE_COLOR);
            draw_glyph(img, rows, pen_x, top_y, scale, 0, FILL_COLOR);
        }
        pen_x += advance;
    }
}

fn draw_glyph(
    img: &mut RgbaImage,
    rows: &[u8; 7],
    x0: i64,
    y0: i64,
    scale: u32,
    dilate: u32,
    color: Rgba<u8>,
) {
    let (width, height) = (img.width() as i64, img.height() as i64);
    for (ry, row) in rows.iter().enumerate() {
        for rx in 0..GLYPH_COLS {
            if row & (0b1_0000 >> rx) == 0 {
                continue;
            }
            let cell_x = x0 + (rx * scale) as i64;
            let cell_y = y0 + (ry as u32 * scale) as i64;
            for dy in -(dilate as i64)..(scale + dilate) as i64 {
                for dx in -(dilate as i64)..(scale + dilate) as i64 {
                    let (x, y) = (cell_x + dx, cell_y + dy);
                    if x >= 0 && x < width && y >= 0 && y < height {
                        img.put_pixel(x as u32, y as u32, color);
                    }
                }
            }
        }
    }
}

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;

/// 5x7 bitmap face covering A-Z, 0-9 and basic punctuation. Characters
/// outside the face are skipped but still advance the pen.
fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    let rows: &[u8; 7] = match ch {
        'A' => &[0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => &[0b01111, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b01111],
        'D' => &[0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => &[0b01111, 0b10000, 0b10000, 0b10011, 0b10001, 0b10001, 0b01111],
        'H' => &[0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => &[0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => &[0b00001, 0b00001, 0b00001, 0b00001, 0b10001, 0b10001, 0b01110],
        'K' => &[0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => &[0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => &[0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => &[0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => &[0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => &[0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => &[0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => &[0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => &[0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => &[0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => &[0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => &[0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => &[0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => &[0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => &[0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => &[0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '-' => &[0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        '.' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
        '/' => &[0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        _ => return None,
    };
    Some(rows)
}
