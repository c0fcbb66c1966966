use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::barcode;
use crate::consts::{
    BAND_GAP, BG, BORDER, FG, LABEL_H, LABEL_W, PAD_BOTTOM, PAD_TOP, PAD_X, SMALL_PX, TITLE_PX,
};
use crate::fonts;
use crate::graphics::{draw_border, draw_text, text_bbox};
use crate::Result;

/// Pixel rectangle on the label canvas. May extend past the edges when
/// text is wider than the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Where each element of a composed label landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    pub title: Rect,
    pub code: Rect,
    pub unit: Rect,
    /// `None` when the band between the text rows had no room.
    pub barcode: Option<Rect>,
}

/// Compose one `LABEL_W` x `LABEL_H` label: bold name on top, Code-128 in
/// the middle, code value bottom-left and unit bottom-right.
pub fn compose_label(name: &str, code: &str, unit: &str) -> Result<RgbImage> {
    compose_with_layout(name, code, unit).map(|(img, _)| img)
}

/// Like [`compose_label`], also reporting element positions.
pub fn compose_with_layout(name: &str, code: &str, unit: &str) -> Result<(RgbImage, LabelLayout)> {
    let bars = barcode::render(code)?;

    let (lw, lh) = (LABEL_W as i32, LABEL_H as i32);
    let mut img = RgbImage::from_pixel(LABEL_W, LABEL_H, Rgb(BG));
    let fg = Rgb(FG);

    // Product name, top center
    let title_font = fonts::resolve(TITLE_PX, true);
    let tb = text_bbox(&title_font, name);
    let title = Rect {
        x: (lw - tb.width()).div_euclid(2),
        y: PAD_TOP as i32,
        w: tb.width(),
        h: tb.height(),
    };
    draw_text(&mut img, &title_font, title.x, title.y, name, fg);

    // Bottom row: code left, unit right, sharing the code's baseline
    let small_font = fonts::resolve(SMALL_PX, false);
    let cb = text_bbox(&small_font, code);
    let bottom_y = lh - PAD_BOTTOM as i32 - cb.height();
    let code_rect = Rect { x: PAD_X as i32, y: bottom_y, w: cb.width(), h: cb.height() };
    draw_text(&mut img, &small_font, code_rect.x, bottom_y, code, fg);

    let ub = text_bbox(&small_font, unit);
    let unit_rect = Rect {
        x: lw - PAD_X as i32 - ub.width(),
        y: bottom_y,
        w: ub.width(),
        h: ub.height(),
    };
    draw_text(&mut img, &small_font, unit_rect.x, bottom_y, unit, fg);

    // Barcode band between the two text rows
    let band_top = title.y + title.h + BAND_GAP as i32;
    let band_bottom = bottom_y - BAND_GAP as i32;
    let band_h = band_bottom - band_top;

    let max_w = (LABEL_W - 2 * PAD_X) as f64;
    let scale = (max_w / bars.width() as f64).min(band_h as f64 / bars.height() as f64);
    let new_w = (bars.width() as f64 * scale) as i32;
    let new_h = (bars.height() as f64 * scale) as i32;

    let barcode_rect = if band_h <= 0 || new_w <= 0 || new_h <= 0 {
        log::warn!("no room for barcode {code} (band {band_top}..{band_bottom})");
        None
    } else {
        let scaled = imageops::resize(&bars, new_w as u32, new_h as u32, FilterType::Lanczos3);
        let rect = Rect {
            x: (lw - new_w).div_euclid(2),
            y: band_top + (band_h - new_h).div_euclid(2),
            w: new_w,
            h: new_h,
        };
        imageops::replace(&mut img, &scaled, rect.x as i64, rect.y as i64);
        Some(rect)
    };
    log::debug!("label {code}: title {title:?}, barcode {barcode_rect:?}, scale {scale:.3}");

    draw_border(&mut img, Rgb(BORDER));

    let layout = LabelLayout { title, code: code_rect, unit: unit_rect, barcode: barcode_rect };
    Ok((img, layout))
}
