//! # Display Rendering
//!
//! Lays out the tag's screen and draws it into a [`Frame`]:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Blood Glucose        10.4               │
//! │                       →                  │
//! │  Direction                               │
//! │                                          │
//! │                       19:24              │
//! └──────────────────────────────────────────┘
//! ```
//!
//! The background bitmap and the "Direction" caption form the static layer.
//! On top of it go exactly four [`RenderedField`]s: time, label, glucose and
//! direction. Positions are the left edge and vertical centre of the text.
//!
//! The mono fonts only cover ASCII, so trend arrows are drawn as line
//! primitives sized to the field's font.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_7X13_BOLD, FONT_9X18_BOLD},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{BinaryColor, Rgb888},
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};
use std::fs;
use std::path::{Path, PathBuf};
use tinybmp::Bmp;

use crate::frame::Frame;

/// Background image, relative to the asset directory.
pub const BACKGROUND_PATH: &str = "bmps/nightscout.bmp";

pub const GLUCOSE_LABEL: &str = "Blood Glucose";
const DIRECTION_CAPTION: &str = "Direction";
const DIRECTION_CAPTION_POS: Point = Point::new(40, 60);

const TIME_POS: Point = Point::new(200, 100);
const LABEL_POS: Point = Point::new(40, 25);
const GLUCOSE_POS: Point = Point::new(200, 25);
const DIRECTION_POS: Point = Point::new(200, 50);

/// Fonts available on the tag, named after the assets they stand in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontRef {
    Impact30,
    Impact24,
    ArialBoldItalic12,
}

impl FontRef {
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            FontRef::Impact30 => &FONT_10X20,
            FontRef::Impact24 => &FONT_9X18_BOLD,
            FontRef::ArialBoldItalic12 => &FONT_7X13_BOLD,
        }
    }
}

/// One text region of the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedField {
    pub font: FontRef,
    pub position: Point,
    pub text: String,
}

impl RenderedField {
    fn new(font: FontRef, position: Point, text: impl Into<String>) -> Self {
        Self {
            font,
            position,
            text: text.into(),
        }
    }
}

/// The four fields for one cycle: time, label, glucose value, direction.
pub fn layout(time: &str, glucose: &str, glyph: &str) -> [RenderedField; 4] {
    [
        RenderedField::new(FontRef::Impact30, TIME_POS, time),
        RenderedField::new(FontRef::Impact24, LABEL_POS, GLUCOSE_LABEL),
        RenderedField::new(FontRef::Impact24, GLUCOSE_POS, glucose),
        RenderedField::new(FontRef::ArialBoldItalic12, DIRECTION_POS, glyph),
    ]
}

/// Draws the static layer and text fields into a frame.
///
/// Infallible from the caller's side: a missing or unreadable background is
/// logged once and replaced by plain paper.
pub struct DisplayRenderer {
    background: Option<Vec<u8>>,
}

impl DisplayRenderer {
    /// Load the background from `asset_dir`.
    pub fn load(asset_dir: &Path) -> Self {
        let path: PathBuf = asset_dir.join(BACKGROUND_PATH);
        match fs::read(&path) {
            Ok(bytes) => Self {
                background: Some(bytes),
            },
            Err(e) => {
                log::warn!("Background {} unavailable ({e}), using blank", path.display());
                Self::blank()
            }
        }
    }

    /// Renderer without a background image.
    pub fn blank() -> Self {
        Self { background: None }
    }

    /// Renderer over in-memory BMP bytes.
    pub fn with_background(bytes: Vec<u8>) -> Self {
        Self {
            background: Some(bytes),
        }
    }

    /// Draw a complete frame: paper, background, caption, then the fields.
    pub fn render(&self, frame: &mut Frame, fields: &[RenderedField]) {
        frame.clear_to(BinaryColor::Off);
        self.draw_background(frame);
        draw_text(frame, FontRef::Impact24, DIRECTION_CAPTION_POS, DIRECTION_CAPTION);
        for field in fields {
            draw_text(frame, field.font, field.position, &field.text);
        }
        log::debug!("Rendered {} fields, {} ink pixels", fields.len(), frame.ink_count());
    }

    fn draw_background(&self, frame: &mut Frame) {
        let Some(bytes) = self.background.as_deref() else {
            return;
        };
        match Bmp::<Rgb888>::from_slice(bytes) {
            Ok(bmp) => {
                let inked = bmp.pixels().map(|Pixel(point, color)| {
                    let ink = if is_dark(color) {
                        BinaryColor::On
                    } else {
                        BinaryColor::Off
                    };
                    Pixel(point, ink)
                });
                frame.draw_iter(inked).ok();
            }
            Err(e) => log::warn!("Background is not a usable BMP: {e:?}"),
        }
    }
}

/// Rec. 601 luma below mid-grey counts as ink.
fn is_dark(color: Rgb888) -> bool {
    let luma = 299 * u32::from(color.r()) + 587 * u32::from(color.g()) + 114 * u32::from(color.b());
    luma < 128 * 1000
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arrow {
    Right,
    Up,
    Down,
}

impl Arrow {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '→' => Some(Arrow::Right),
            '↑' => Some(Arrow::Up),
            '↓' => Some(Arrow::Down),
            _ => None,
        }
    }
}

/// Draw `text` left-anchored and vertically centred on `position`.
fn draw_text(frame: &mut Frame, font: FontRef, position: Point, text: &str) {
    let mono = font.mono();
    let style = MonoTextStyle::new(mono, BinaryColor::On);
    let advance = (mono.character_size.width + mono.character_spacing) as i32;
    let arrow_size = mono.character_size.height as i32;

    let mut x = position.x;
    let mut run_start = 0;
    for (index, ch) in text.char_indices() {
        let Some(arrow) = Arrow::from_char(ch) else {
            continue;
        };
        let run = &text[run_start..index];
        if !run.is_empty() {
            Text::with_baseline(run, Point::new(x, position.y), style, Baseline::Middle)
                .draw(frame)
                .ok();
            x += advance * run.chars().count() as i32;
        }
        draw_arrow(frame, arrow, Point::new(x, position.y), arrow_size);
        x += arrow_size + mono.character_spacing as i32;
        run_start = index + ch.len_utf8();
    }

    let rest = &text[run_start..];
    if !rest.is_empty() {
        Text::with_baseline(rest, Point::new(x, position.y), style, Baseline::Middle)
            .draw(frame)
            .ok();
    }
}

/// Arrow inside a `size`×`size` box whose left edge is `origin.x`, centred on `origin.y`.
fn draw_arrow(frame: &mut Frame, arrow: Arrow, origin: Point, size: i32) {
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 2);
    let half = size / 2;
    let head = (size / 3).max(2);
    let left = origin.x + 1;
    let right = origin.x + size - 2;
    let center_x = origin.x + half;
    let top = origin.y - half + 1;
    let bottom = origin.y + half - 1;

    let (shaft, tip, barbs) = match arrow {
        Arrow::Right => (
            Line::new(Point::new(left, origin.y), Point::new(right, origin.y)),
            Point::new(right, origin.y),
            [
                Point::new(right - head, origin.y - head),
                Point::new(right - head, origin.y + head),
            ],
        ),
        Arrow::Up => (
            Line::new(Point::new(center_x, bottom), Point::new(center_x, top)),
            Point::new(center_x, top),
            [
                Point::new(center_x - head, top + head),
                Point::new(center_x + head, top + head),
            ],
        ),
        Arrow::Down => (
            Line::new(Point::new(center_x, top), Point::new(center_x, bottom)),
            Point::new(center_x, bottom),
            [
                Point::new(center_x - head, bottom - head),
                Point::new(center_x + head, bottom - head),
            ],
        ),
    };

    shaft.into_styled(stroke).draw(frame).ok();
    for barb in barbs {
        Line::new(barb, tip).into_styled(stroke).draw(frame).ok();
    }
}

/// ASCII preview of a frame, one character per 2×4 pixel cell.
pub fn ascii_art(frame: &Frame) -> String {
    const CELL_W: u32 = 2;
    const CELL_H: u32 = 4;

    let cols = frame.width().div_ceil(CELL_W);
    let rows = frame.height().div_ceil(CELL_H);
    let mut out = String::with_capacity(((cols + 3) * (rows + 2)) as usize);

    let border: String = "-".repeat(cols as usize);
    out.push('+');
    out.push_str(&border);
    out.push_str("+\n");
    for row in 0..rows {
        out.push('|');
        for col in 0..cols {
            let inked = (0..CELL_H)
                .flat_map(|dy| (0..CELL_W).map(move |dx| (dx, dy)))
                .filter(|&(dx, dy)| frame.pixel(col * CELL_W + dx, row * CELL_H + dy).is_on())
                .count();
            out.push(match inked {
                0 => ' ',
                1..=2 => '.',
                3..=5 => '+',
                _ => '#',
            });
        }
        out.push_str("|\n");
    }
    out.push('+');
    out.push_str(&border);
    out.push_str("+\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_in(frame: &Frame, x0: u32, y0: u32, x1: u32, y1: u32) -> u32 {
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if frame.pixel(x, y).is_on() {
                    count += 1;
                }
            }
        }
        count
    }

    /// 2×2, 24-bit BMP: bottom-up rows, each padded to 4 bytes.
    fn tiny_bmp() -> Vec<u8> {
        let mut bmp = Vec::new();
        let pixel_bytes: [u8; 16] = [
            // bottom row: black, white, padding
            0, 0, 0, 255, 255, 255, 0, 0, //
            // top row: white, black, padding
            255, 255, 255, 0, 0, 0, 0, 0,
        ];
        let data_offset = 14u32 + 40;
        let file_size = data_offset + pixel_bytes.len() as u32;

        bmp.extend_from_slice(b"BM");
        bmp.extend_from_slice(&file_size.to_le_bytes());
        bmp.extend_from_slice(&[0, 0, 0, 0]);
        bmp.extend_from_slice(&data_offset.to_le_bytes());
        bmp.extend_from_slice(&40u32.to_le_bytes());
        bmp.extend_from_slice(&2i32.to_le_bytes());
        bmp.extend_from_slice(&2i32.to_le_bytes());
        bmp.extend_from_slice(&1u16.to_le_bytes());
        bmp.extend_from_slice(&24u16.to_le_bytes());
        bmp.extend_from_slice(&0u32.to_le_bytes());
        bmp.extend_from_slice(&(pixel_bytes.len() as u32).to_le_bytes());
        bmp.extend_from_slice(&2835i32.to_le_bytes());
        bmp.extend_from_slice(&2835i32.to_le_bytes());
        bmp.extend_from_slice(&0u32.to_le_bytes());
        bmp.extend_from_slice(&0u32.to_le_bytes());
        bmp.extend_from_slice(&pixel_bytes);
        bmp
    }

    #[test]
    fn test_layout_has_four_fixed_fields() {
        let fields = layout("19:24", "10.4", "→");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], RenderedField::new(FontRef::Impact30, Point::new(200, 100), "19:24"));
        assert_eq!(fields[1].text, GLUCOSE_LABEL);
        assert_eq!(fields[1].position, Point::new(40, 25));
        assert_eq!(fields[2].text, "10.4");
        assert_eq!(fields[2].position, Point::new(200, 25));
        assert_eq!(fields[3].font, FontRef::ArialBoldItalic12);
        assert_eq!(fields[3].position, Point::new(200, 50));
    }

    #[test]
    fn test_render_draws_each_field_region() {
        let mut frame = Frame::default();
        DisplayRenderer::blank().render(&mut frame, &layout("19:24", "10.4", "→"));

        // label, glucose, direction, caption, time
        assert!(ink_in(&frame, 40, 15, 160, 35) > 0);
        assert!(ink_in(&frame, 200, 15, 240, 35) > 0);
        assert!(ink_in(&frame, 200, 42, 215, 58) > 0);
        assert!(ink_in(&frame, 40, 50, 130, 70) > 0);
        assert!(ink_in(&frame, 200, 90, 250, 110) > 0);
        // nothing in the bottom-left corner
        assert_eq!(ink_in(&frame, 0, 110, 30, 128), 0);
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let mut frame = Frame::default();
        frame.clear_to(BinaryColor::On);
        DisplayRenderer::blank().render(&mut frame, &[]);
        assert_eq!(ink_in(&frame, 0, 0, 30, 128), 0);
    }

    #[test]
    fn test_arrows_are_drawn_not_substituted() {
        let mut arrows = Frame::default();
        draw_text(&mut arrows, FontRef::ArialBoldItalic12, Point::new(10, 20), "↑↓");
        let mut ascii = Frame::default();
        draw_text(&mut ascii, FontRef::ArialBoldItalic12, Point::new(10, 20), "??");
        assert!(arrows.ink_count() > 0);
        assert_ne!(arrows, ascii);
    }

    #[test]
    fn test_fallback_glyph_is_text() {
        let mut frame = Frame::default();
        draw_text(&mut frame, FontRef::ArialBoldItalic12, Point::new(10, 20), "---");
        assert!(frame.ink_count() > 0);
    }

    #[test]
    fn test_background_bitmap_is_drawn() {
        let mut frame = Frame::default();
        DisplayRenderer::with_background(tiny_bmp()).render(&mut frame, &[]);
        assert!(frame.pixel(0, 1).is_on());
        assert!(frame.pixel(1, 1).is_off());
        assert!(frame.pixel(0, 0).is_off());
        assert!(frame.pixel(1, 0).is_on());
    }

    #[test]
    fn test_bad_background_falls_back_to_blank() {
        let mut frame = Frame::default();
        DisplayRenderer::with_background(b"not a bitmap".to_vec()).render(&mut frame, &[]);
        assert_eq!(ink_in(&frame, 0, 0, 30, 40), 0);
    }

    #[test]
    fn test_shipped_background_loads() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let renderer = DisplayRenderer::load(&assets);
        assert!(renderer.background.is_some());

        let mut frame = Frame::default();
        renderer.render(&mut frame, &[]);
        // border
        assert!(frame.pixel(0, 0).is_on());
        assert!(frame.pixel(295, 127).is_on());
        assert!(frame.pixel(10, 10).is_off());
    }

    #[test]
    fn test_missing_background_file() {
        let renderer = DisplayRenderer::load(Path::new("/nonexistent/assets"));
        assert!(renderer.background.is_none());
    }

    #[test]
    fn test_ascii_art_dimensions() {
        let mut frame = Frame::default();
        frame.set_pixel(0, 0, BinaryColor::On);
        let art = ascii_art(&frame);
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 32 + 2);
        assert!(lines.iter().all(|line| line.chars().count() == 148 + 2));
        assert!(lines[1].starts_with("|."));
    }
}
