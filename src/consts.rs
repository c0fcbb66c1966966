// Label geometry and rendering constants (2x oversampled 50x25 mm thermal label)
pub const LABEL_W: u32 = 800;
pub const LABEL_H: u32 = 400;
pub const DPI: u32 = 406;

pub const PAD_X: u32 = 24;
pub const PAD_TOP: u32 = 16;
pub const PAD_BOTTOM: u32 = 12;
pub const BAND_GAP: u32 = 12;    // between text rows and the barcode band

pub const TITLE_PX: f32 = 32.0;
pub const SMALL_PX: f32 = 24.0;

pub const BG: [u8; 3] = [255, 255, 255];
pub const FG: [u8; 3] = [0, 0, 0];
pub const BORDER: [u8; 3] = [0xCC, 0xCC, 0xCC];

// Code-128 raster (millimetres, converted at DPI)
pub const MODULE_W_MM: f32 = 0.5;
pub const MODULE_H_MM: f32 = 18.0;
pub const QUIET_ZONE_MM: f32 = 3.0;

// Contact sheet
pub const GRID_COLUMNS: u32 = 2;
pub const GRID_GAP: u32 = 10;
pub const GRID_BG: [u8; 3] = [0xF0, 0xF0, 0xF0];

// Output file names
pub const GRID_FILE: &str = "ALL_LABELS_GRID.png";
pub const PDF_FILE: &str = "ALL_LABELS.pdf";

/// Millimetres to whole pixels at `DPI`, never less than one.
pub fn mm_to_px(mm: f32) -> u32 {
    ((mm * DPI as f32 / 25.4).round() as u32).max(1)
}
