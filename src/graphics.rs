use std::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};

use crate::fonts::FontHandle;

/// Ink extent of a text run relative to its draw origin (top-left of the
/// line box, baseline at origin + ascent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl TextBox {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// Measure `text` as it would be drawn at (0, 0).
pub fn text_bbox(font: &FontHandle, text: &str) -> TextBox {
    match font {
        FontHandle::TrueType { font, px } => truetype_bbox(font, *px, text),
        FontHandle::Builtin(mono) => mono_bbox(mono, text),
    }
}

// Mono fonts have no ink metrics; the box is the run of character cells.
fn mono_bbox(mono: &MonoFont<'_>, text: &str) -> TextBox {
    let n = text.chars().count() as i32;
    if n == 0 {
        return TextBox::default();
    }
    let advance = (mono.character_size.width + mono.character_spacing) as i32;
    TextBox {
        x0: 0,
        y0: 0,
        x1: n * advance - mono.character_spacing as i32,
        y1: mono.character_size.height as i32,
    }
}

fn truetype_bbox(font: &Font<'static>, px: f32, text: &str) -> TextBox {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    font.layout(text, scale, point(0.0, ascent))
        .filter_map(|g| g.pixel_bounding_box())
        .fold(None, |acc: Option<TextBox>, bb| {
            Some(match acc {
                None => TextBox { x0: bb.min.x, y0: bb.min.y, x1: bb.max.x, y1: bb.max.y },
                Some(t) => TextBox {
                    x0: t.x0.min(bb.min.x),
                    y0: t.y0.min(bb.min.y),
                    x1: t.x1.max(bb.max.x),
                    y1: t.y1.max(bb.max.y),
                },
            })
        })
        .unwrap_or_default()
}

/// Draw `text` with its line box origin at (x, y). Pixels falling outside
/// the canvas are clipped.
pub fn draw_text(img: &mut RgbImage, font: &FontHandle, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    match font {
        FontHandle::TrueType { font, px } => {
            let scale = Scale::uniform(*px);
            let ascent = font.v_metrics(scale).ascent;
            for g in font.layout(text, scale, point(x as f32, y as f32 + ascent)) {
                if let Some(bb) = g.pixel_bounding_box() {
                    g.draw(|gx, gy, v| {
                        blend(img, gx as i32 + bb.min.x, gy as i32 + bb.min.y, color, v);
                    });
                }
            }
        }
        FontHandle::Builtin(mono) => {
            let color = Rgb888::new(color.0[0], color.0[1], color.0[2]);
            let style = MonoTextStyle::new(mono, color);
            let drawn = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                .draw(&mut Canvas(img));
            if let Err(never) = drawn {
                match never {}
            }
        }
    }
}

/// `DrawTarget` view of an RGB buffer; pixels off the canvas are dropped.
struct Canvas<'a>(&'a mut RgbImage);

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            blend(self.0, p.x, p.y, Rgb([c.r(), c.g(), c.b()]), 1.0);
        }
        Ok(())
    }
}

/// Mix `color` into the pixel at (x, y) with coverage `v`; off-canvas is a no-op.
fn blend(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, v: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 || v <= 0.0 {
        return;
    }
    let a = v.min(1.0);
    let dst = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * (1.0 - a)).round() as u8;
    }
}

/// One pixel outline around the canvas edge.
pub fn draw_border(img: &mut RgbImage, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        img.put_pixel(x, 0, color);
        img.put_pixel(x, h - 1, color);
    }
    for y in 0..h {
        img.put_pixel(0, y, color);
        img.put_pixel(w - 1, y, color);
    }
}
