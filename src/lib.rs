//! Barcode label sheets for the raw material store.
//! - One 800x400 PNG per catalog item (50x25 mm at 406 dpi effective)
//! - Code-128 symbol scaled between a bold title and a code/unit footer
//! - Contact-sheet PNG of every label plus a one-label-per-page PDF

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod barcode;
pub mod builder;
pub mod catalog;
pub mod consts;
pub mod fonts;
pub mod graphics;
pub mod grid;
pub mod output;
pub mod pdf;

pub use builder::{compose_label, compose_with_layout, LabelLayout, Rect};
pub use catalog::{Product, CATALOG};
pub use grid::assemble_grid;
pub use pdf::{save_document, write_document};

/// Errors that abort label generation
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Cannot encode {0:?} as Code-128: {1}")]
    InvalidBarcode(String, String),

    #[error("Grid needs at least one column")]
    InvalidColumns,

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LabelError>;

/// Files produced by one run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub labels: Vec<PathBuf>,
    pub grid: PathBuf,
    /// `None` when there were no labels to paginate.
    pub document: Option<PathBuf>,
}

/// Generate every label in `products` into `out_dir`, then the grid sheet
/// and the PDF. Stops at the first error; files already written stay.
pub fn run_catalog(products: &[Product], out_dir: &Path) -> Result<Report> {
    log::info!("Output directory: {}", out_dir.display());
    log::info!("Generating {} barcode labels...", products.len());

    let mut report = Report::default();
    let mut images = Vec::with_capacity(products.len());

    for p in products {
        let img = compose_label(p.name, p.code, p.unit)?;
        let path = out_dir.join(format!("{}.png", p.code));
        output::save_png(&img, consts::DPI, &path)?;
        log::info!("  Created: {}.png  ({})", p.code, p.name);
        report.labels.push(path);
        images.push(img);
    }

    let sheet = assemble_grid(&images, consts::GRID_COLUMNS)?;
    report.grid = out_dir.join(consts::GRID_FILE);
    output::save_png(&sheet, consts::DPI, &report.grid)?;
    log::info!("  Combined grid: {}", consts::GRID_FILE);

    if !images.is_empty() {
        let path = out_dir.join(consts::PDF_FILE);
        save_document(&images, &path)?;
        log::info!("  Combined PDF:  {}", consts::PDF_FILE);
        report.document = Some(path);
    }

    log::info!(
        "Done! {} labels + grid + PDF saved to {}",
        images.len(),
        out_dir.display()
    );
    Ok(report)
}

/// [`run_catalog`] over the built-in [`CATALOG`].
pub fn run(out_dir: &Path) -> Result<Report> {
    run_catalog(CATALOG, out_dir)
}
