use image::{Rgb, RgbImage};

use crate::consts::{mm_to_px, BG, FG, MODULE_H_MM, MODULE_W_MM, QUIET_ZONE_MM};
use crate::{LabelError, Result};

// Code-128 bar/space widths, indexed by symbol value. 106 is the stop pattern.
const PATTERNS: [&[u8]; 107] = [
    b"212222", b"222122", b"222221", b"121223", b"121322", b"131222", b"122213", b"122312",
    b"132212", b"221213", b"221312", b"231212", b"112232", b"122132", b"122231", b"113222",
    b"123122", b"123221", b"223211", b"221132", b"221231", b"213212", b"223112", b"312131",
    b"311222", b"321122", b"321221", b"312212", b"322112", b"322211", b"212123", b"212321",
    b"232121", b"111323", b"131123", b"131321", b"112313", b"132113", b"132311", b"211313",
    b"231113", b"231311", b"112133", b"112331", b"132131", b"113123", b"113321", b"133121",
    b"313121", b"211331", b"231131", b"213113", b"213311", b"213131", b"311123", b"311321",
    b"331121", b"312113", b"312311", b"332111", b"314111", b"221411", b"431111", b"111224",
    b"111422", b"121124", b"121421", b"141122", b"141221", b"112214", b"112412", b"122114",
    b"122411", b"142112", b"142211", b"241211", b"221114", b"413111", b"241112", b"134111",
    b"111242", b"121142", b"121241", b"114212", b"124112", b"124211", b"411212", b"421112",
    b"421211", b"212141", b"214121", b"412121", b"111143", b"111341", b"131141", b"114113",
    b"114311", b"411113", b"411311", b"113141", b"114131", b"311141", b"411131", b"211412",
    b"211214", b"211232", b"2331112",
];

const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    /// Plain A/B set able to carry `byte`. Control characters need A,
    /// lowercase and the tail of ASCII need B.
    fn for_byte(byte: u8) -> CodeSet {
        if byte < 32 { CodeSet::A } else { CodeSet::B }
    }

    fn accepts(self, byte: u8) -> bool {
        match self {
            CodeSet::A => byte < 96,
            CodeSet::B => byte >= 32,
            CodeSet::C => false,
        }
    }

    fn value(self, byte: u8) -> u8 {
        match (self, byte) {
            (CodeSet::A, b) if b < 32 => b + 64,
            _ => byte - 32,
        }
    }

    fn switch_value(self) -> u8 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Encode `code` into Code-128 symbol values: start, data, check, stop.
///
/// Digit runs of four or more (leading or trailing) or six or more (inside
/// the value) are packed as Code C pairs; everything else goes through
/// Code B, switching to Code A for control characters.
pub fn encode(code: &str) -> Result<Vec<u8>> {
    if code.is_empty() {
        return Err(LabelError::InvalidBarcode(code.into(), "empty value".into()));
    }
    if let Some(c) = code.chars().find(|c| !c.is_ascii()) {
        return Err(LabelError::InvalidBarcode(
            code.into(),
            format!("{c:?} is outside ASCII"),
        ));
    }

    let bytes = code.as_bytes();
    let mut values = Vec::with_capacity(bytes.len() + 3);

    let mut set = if digit_run(bytes) >= 4 {
        CodeSet::C
    } else {
        CodeSet::for_byte(bytes[0])
    };
    values.push(match set {
        CodeSet::A => START_A,
        CodeSet::B => START_B,
        CodeSet::C => START_C,
    });

    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        let run = digit_run(rest);

        if set == CodeSet::C {
            if run >= 2 {
                values.push((rest[0] - b'0') * 10 + (rest[1] - b'0'));
                i += 2;
                continue;
            }
            set = CodeSet::for_byte(rest[0]);
            values.push(set.switch_value());
            continue;
        }

        if run >= 6 || (run >= 4 && run == rest.len()) {
            // Odd runs leave their first digit in the current set.
            if run % 2 == 1 {
                values.push(set.value(rest[0]));
                i += 1;
            }
            set = CodeSet::C;
            values.push(CODE_C);
            continue;
        }

        let byte = rest[0];
        if !set.accepts(byte) {
            set = CodeSet::for_byte(byte);
            values.push(set.switch_value());
        }
        values.push(set.value(byte));
        i += 1;
    }

    values.push(checksum(&values));
    values.push(STOP);
    Ok(values)
}

/// Modulo-103 weighted sum over start + data symbols.
fn checksum(values: &[u8]) -> u8 {
    let sum: u32 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| i.max(1) as u32 * v as u32)
        .sum();
    (sum % 103) as u8
}

/// Module sequence for `code`, `true` for bar, without quiet zones.
pub fn modules(code: &str) -> Result<Vec<bool>> {
    let values = encode(code)?;
    let mut out = Vec::with_capacity(values.len() * 11 + 2);
    for v in values {
        for (i, w) in PATTERNS[v as usize].iter().enumerate() {
            let bar = i % 2 == 0;
            out.extend(std::iter::repeat(bar).take((w - b'0') as usize));
        }
    }
    Ok(out)
}

/// Render `code` as a Code-128 raster: black bars on white, quiet zone on
/// both sides, no human readable text.
pub fn render(code: &str) -> Result<RgbImage> {
    let mods = modules(code)?;
    let module_w = mm_to_px(MODULE_W_MM);
    let bar_h = mm_to_px(MODULE_H_MM);
    let quiet = mm_to_px(QUIET_ZONE_MM);

    let w = quiet * 2 + mods.len() as u32 * module_w;
    let mut img = RgbImage::from_pixel(w, bar_h, Rgb(BG));
    for (m, _) in mods.iter().enumerate().filter(|(_, bar)| **bar) {
        let x0 = quiet + m as u32 * module_w;
        for x in x0..x0 + module_w {
            for y in 0..bar_h {
                img.put_pixel(x, y, Rgb(FG));
            }
        }
    }
    log::debug!("barcode {code}: {} modules, {}x{} px", mods.len(), w, bar_h);
    Ok(img)
}

// ======== Reading back ========

/// Decode one horizontal scanline of a rendered symbol. Pixels darker than
/// mid-gray count as bars. Returns `None` if the row does not hold a valid
/// Code-128 symbol with a matching check digit.
pub fn scan_row(img: &RgbImage, y: u32) -> Option<String> {
    if y >= img.height() {
        return None;
    }
    let row: Vec<bool> = (0..img.width())
        .map(|x| {
            let Rgb([r, g, b]) = *img.get_pixel(x, y);
            (r as u32 + g as u32 + b as u32) / 3 < 128
        })
        .collect();
    decode_modules(&row)
}

/// Decode a bar/space run sequence (any pixel scale) into the encoded text.
pub fn decode_modules(row: &[bool]) -> Option<String> {
    let start = row.iter().position(|b| *b)?;
    let mut runs = Vec::new();
    let mut cur = true;
    let mut len = 0u32;
    for &b in &row[start..] {
        if b == cur {
            len += 1;
        } else {
            runs.push(len);
            cur = b;
            len = 1;
        }
    }
    if cur {
        runs.push(len);
    }

    let mut values = Vec::new();
    for chunk in runs.chunks(6) {
        if chunk.len() < 6 {
            return None;
        }
        let total: u32 = chunk.iter().sum();
        let unit = total as f32 / 11.0;
        let widths: Vec<u8> = chunk
            .iter()
            .map(|w| b'0' + ((*w as f32 / unit).round() as u8).clamp(1, 4))
            .collect();
        if widths == b"233111" {
            values.push(STOP);
            break;
        }
        values.push(PATTERNS[..STOP as usize].iter().position(|p| *p == widths.as_slice())? as u8);
    }

    if values.last() != Some(&STOP) || values.len() < 4 {
        return None;
    }
    let check = values[values.len() - 2];
    let body = &values[..values.len() - 2];
    if checksum(body) != check {
        return None;
    }

    let mut set = match body[0] {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        _ => return None,
    };
    let mut out = String::new();
    let mut shifted = false;
    for &v in &body[1..] {
        let active = match (shifted, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, CodeSet::B) => CodeSet::A,
            _ => set,
        };
        shifted = false;
        match (active, v) {
            (CodeSet::C, 0..=99) => out.push_str(&format!("{v:02}")),
            (_, CODE_A) => set = CodeSet::A,
            (_, CODE_B) if active != CodeSet::B => set = CodeSet::B,
            (_, CODE_C) if active != CodeSet::C => set = CodeSet::C,
            (CodeSet::A | CodeSet::B, SHIFT) => shifted = true,
            (CodeSet::A, 64..=95) => out.push((v - 64) as char),
            (CodeSet::A | CodeSet::B, 0..=95) => out.push((v + 32) as char),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_eleven_modules() {
        for (i, p) in PATTERNS[..STOP as usize].iter().enumerate() {
            let sum: u32 = p.iter().map(|w| (w - b'0') as u32).sum();
            assert_eq!(sum, 11, "pattern {i}");
        }
        let stop: u32 = PATTERNS[STOP as usize].iter().map(|w| (w - b'0') as u32).sum();
        assert_eq!(stop, 13);
    }

    #[test]
    fn test_encode_code_b() {
        let values = encode("RM-TEA").unwrap();
        assert_eq!(values[0], START_B);
        assert_eq!(&values[1..7], &[50, 45, 13, 52, 37, 33]);
        assert_eq!(*values.last().unwrap(), STOP);
    }

    #[test]
    fn test_checksum() {
        // START_B(104) + 1*'A'(33) = 137 -> 137 % 103 = 34
        let values = encode("A").unwrap();
        assert_eq!(values, vec![START_B, 33, 34, STOP]);
    }

    #[test]
    fn test_digits_use_code_c() {
        let values = encode("123456").unwrap();
        assert_eq!(&values[..4], &[START_C, 12, 34, 56]);
    }

    #[test]
    fn test_odd_trailing_digits() {
        let values = encode("RM-12345").unwrap();
        // R M - 1 then switch to C for 23 45
        assert_eq!(&values[1..5], &[50, 45, 13, 17]);
        assert_eq!(&values[5..8], &[CODE_C, 23, 45]);
    }

    #[test]
    fn test_control_character_switches_to_a() {
        let values = encode("a\tb").unwrap();
        assert_eq!(values[0], START_B);
        assert_eq!(&values[1..5], &[65, CODE_A, 73, CODE_B]);
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(matches!(encode("RM-Ω"), Err(LabelError::InvalidBarcode(..))));
        assert!(matches!(render("çay"), Err(LabelError::InvalidBarcode(..))));
        assert!(matches!(encode(""), Err(LabelError::InvalidBarcode(..))));
    }

    /// Bar/space modules from a run of published symbol widths.
    fn widths_to_modules(symbols: &[&str]) -> Vec<bool> {
        let mut out = Vec::new();
        for sym in symbols {
            for (i, w) in sym.bytes().enumerate() {
                out.extend(std::iter::repeat(i % 2 == 0).take((w - b'0') as usize));
            }
        }
        out
    }

    #[test]
    fn test_modules_match_published_widths() {
        // START B, R M - T E A, check 874 % 103 = 50 ('R'), STOP
        let tea = widths_to_modules(&[
            "211214", "231131", "113123", "122132", "213311", "132113", "111323", "231131",
            "2331112",
        ]);
        assert_eq!(tea.len(), 101);
        assert_eq!(modules("RM-TEA").unwrap(), tea);

        // START C, 12 34 56, check 353 % 103 = 44, STOP
        let digits =
            widths_to_modules(&["211232", "112232", "131123", "331121", "132131", "2331112"]);
        assert_eq!(modules("123456").unwrap(), digits);
    }

    #[test]
    fn test_render_dimensions() {
        let img = render("RM-TEA").unwrap();
        // start + 6 data + check = 8 symbols * 11 + 13 stop modules
        let module_w = mm_to_px(MODULE_W_MM);
        let quiet = mm_to_px(QUIET_ZONE_MM);
        assert_eq!(img.width(), 2 * quiet + 101 * module_w);
        assert_eq!(img.height(), mm_to_px(MODULE_H_MM));
        assert_eq!(*img.get_pixel(0, 0), Rgb(BG));
        assert_eq!(*img.get_pixel(quiet, 0), Rgb(FG));
    }

    #[test]
    fn test_scan_round_trip() {
        for code in ["RM-TEA", "RM-OSMG", "12345678", "x9", "RM-12345", "a\tb"] {
            let img = render(code).unwrap();
            assert_eq!(scan_row(&img, img.height() / 2).as_deref(), Some(code));
        }
    }

    #[test]
    fn test_scan_rejects_blank_row() {
        let img = RgbImage::from_pixel(100, 10, Rgb(BG));
        assert_eq!(scan_row(&img, 5), None);
    }
}
