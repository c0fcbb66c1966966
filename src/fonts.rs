use std::path::Path;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::MonoFont;
use rusttype::Font;

// Candidate font files per platform, tried in order.
#[cfg(target_os = "macos")]
const BOLD_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNSText-Bold.otf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
];
#[cfg(target_os = "macos")]
const REGULAR_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNSText.otf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

#[cfg(target_os = "windows")]
const BOLD_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\segoeuib.ttf",
    "C:\\Windows\\Fonts\\tahomabd.ttf",
];
#[cfg(target_os = "windows")]
const REGULAR_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\tahoma.ttf",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

/// A font ready for measuring and drawing at one pixel size.
pub enum FontHandle {
    TrueType { font: Font<'static>, px: f32 },
    /// Bundled `embedded-graphics` mono font, picked by [`mono_for`].
    Builtin(&'static MonoFont<'static>),
}

impl FontHandle {
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontHandle::Builtin(_))
    }
}

/// Load the first usable system font for `px` and weight, or the bundled
/// mono font if none of the candidates load. Never fails.
pub fn resolve(px: f32, bold: bool) -> FontHandle {
    let paths = if bold { BOLD_CANDIDATES } else { REGULAR_CANDIDATES };
    resolve_from(paths, px)
}

/// Same as [`resolve`] over an explicit candidate list.
pub fn resolve_from<P: AsRef<Path>>(paths: &[P], px: f32) -> FontHandle {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                log::debug!("skip font {}: {e}", path.display());
                continue;
            }
        };
        match Font::try_from_vec(bytes) {
            Some(font) => {
                log::debug!("font {} at {px}px", path.display());
                return FontHandle::TrueType { font, px };
            }
            None => log::debug!("skip font {}: not a usable font file", path.display()),
        }
    }
    let mono = mono_for(px);
    log::debug!(
        "no system font for {px}px, using built-in {}x{} mono font",
        mono.character_size.width,
        mono.character_size.height
    );
    FontHandle::Builtin(mono)
}

// ======== Built-in fallback ========

/// Largest bundled mono font whose cell fits in `px`, or the smallest one.
pub fn mono_for(px: f32) -> &'static MonoFont<'static> {
    const SIZES: [&MonoFont<'static>; 4] = [&FONT_10X20, &FONT_9X15, &FONT_7X13, &FONT_6X10];
    SIZES
        .into_iter()
        .find(|f| f.character_size.height as f32 <= px)
        .unwrap_or(&FONT_6X10)
}
