use image::imageops;
use image::{Rgb, RgbImage};

use crate::consts::{GRID_BG, GRID_GAP, LABEL_H, LABEL_W};
use crate::{LabelError, Result};

/// Top-left pixel of cell `index` in a `columns`-wide contact sheet.
pub fn cell_origin(index: usize, columns: u32) -> (u32, u32) {
    let row = index as u32 / columns;
    let col = index as u32 % columns;
    (
        GRID_GAP + col * (LABEL_W + GRID_GAP),
        GRID_GAP + row * (LABEL_H + GRID_GAP),
    )
}

/// Tile labels row-major into one contact sheet with a `GRID_GAP` margin
/// and gutter.
///
/// An empty slice gives a sheet `GRID_GAP` pixels high with no cells;
/// zero columns is an error.
pub fn assemble_grid(images: &[RgbImage], columns: u32) -> Result<RgbImage> {
    if columns == 0 {
        return Err(LabelError::InvalidColumns);
    }
    let rows = (images.len() as u32).div_ceil(columns);
    let w = columns * LABEL_W + (columns - 1) * GRID_GAP + 2 * GRID_GAP;
    // rows == 0 collapses to one gap: -gap + 2*gap
    let h = rows * LABEL_H + (rows * GRID_GAP + GRID_GAP);

    let mut sheet = RgbImage::from_pixel(w, h, Rgb(GRID_BG));
    for (idx, label) in images.iter().enumerate() {
        let (x, y) = cell_origin(idx, columns);
        imageops::replace(&mut sheet, label, x as i64, y as i64);
    }
    log::debug!("grid: {} labels, {columns}x{rows}, {w}x{h} px", images.len());
    Ok(sheet)
}
