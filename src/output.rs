use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::RgbImage;

use crate::Result;

/// Pixels per metre for a dots-per-inch value, as stored in the PNG pHYs chunk.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

/// Encode `img` as 8-bit RGB PNG with `dpi` resolution metadata.
pub fn write_png<W: Write>(img: &RgbImage, dpi: u32, out: W) -> Result<()> {
    let mut encoder = png::Encoder::new(out, img.width(), img.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = dpi_to_ppm(dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header()?;
    writer.write_image_data(img.as_raw())?;
    writer.finish()?;
    Ok(())
}

pub fn save_png<P: AsRef<Path>>(img: &RgbImage, dpi: u32, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    write_png(img, dpi, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn encode_png(img: &RgbImage, dpi: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_png(img, dpi, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_ppm_for_label_dpi() {
        assert_eq!(dpi_to_ppm(406), 15984);
        assert_eq!(dpi_to_ppm(72), 2835);
    }

    #[test]
    fn test_png_carries_dpi() {
        let img = RgbImage::from_pixel(8, 4, Rgb([1, 2, 3]));
        let bytes = encode_png(&img, 406);

        let reader = png::Decoder::new(Cursor::new(&bytes)).read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.xppu, 15984);
        assert_eq!(dims.yppu, 15984);
        assert!(matches!(dims.unit, png::Unit::Meter));

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_encoding_is_stable() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8 * 16, y as u8 * 16, 0]));
        assert_eq!(encode_png(&img, 406), encode_png(&img, 406));
    }
}
