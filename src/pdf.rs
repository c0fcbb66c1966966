//! Paginated PDF output: one label image per page, page sized to the
//! image's physical size at the label DPI.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::consts::DPI;
use crate::{LabelError, Result};

/// Image resource name used on every page.
const IMAGE_NAME: &str = "Im0";

/// Page size in points (1/72 in) for an image printed at `dpi`.
pub fn page_size_pt(img: &RgbImage, dpi: u32) -> (f32, f32) {
    let k = 72.0 / dpi as f32;
    (img.width() as f32 * k, img.height() as f32 * k)
}

/// Write `images` as a PDF, one page each, in order. Writes nothing for an
/// empty slice.
pub fn write_document<W: Write>(images: &[RgbImage], out: &mut W) -> Result<()> {
    if images.is_empty() {
        return Ok(());
    }
    let mut doc = build_document(images)?;
    doc.save_to(out).map_err(|e| LabelError::Pdf(e.to_string()))?;
    Ok(())
}

/// Save `images` as a PDF at `path`. No file is created for an empty slice.
pub fn save_document<P: AsRef<Path>>(images: &[RgbImage], path: P) -> Result<()> {
    if images.is_empty() {
        log::debug!("no labels, skipping {}", path.as_ref().display());
        return Ok(());
    }
    let mut file = BufWriter::new(File::create(path)?);
    write_document(images, &mut file)?;
    file.flush()?;
    Ok(())
}

fn build_document(images: &[RgbImage]) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(images.len());
    for img in images {
        kids.push(add_page(&mut doc, pages_id, img)?.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, img: &RgbImage) -> Result<ObjectId> {
    let (w_pt, h_pt) = page_size_pt(img, DPI);

    let image_id = doc.add_object(image_xobject(img)?);

    // Scale the unit image square to the full page.
    let ops = format!("q\n{w_pt:.4} 0 0 {h_pt:.4} 0 0 cm\n/{IMAGE_NAME} Do\nQ\n");
    let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), w_pt.into(), h_pt.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });
    Ok(page_id)
}

/// Flate-compressed DeviceRGB image XObject.
fn image_xobject(img: &RgbImage) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(img.as_raw())?;
    let data = encoder.finish()?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => img.width() as i64,
        "Height" => img.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use image::Rgb;
    use std::io::Read;

    fn solid(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(80, 40, Rgb(rgb))
    }

    fn first_pixel_of_page(doc: &Document, page_id: ObjectId) -> Vec<u8> {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_ref = xobjects.get(IMAGE_NAME.as_bytes()).unwrap().as_reference().unwrap();
        let stream = doc.get_object(image_ref).unwrap().as_stream().unwrap();
        let mut raw = Vec::new();
        ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut raw).unwrap();
        raw[..3].to_vec()
    }

    fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f64> {
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| match o {
                Object::Integer(i) => *i as f64,
                Object::Real(r) => *r as f64,
                other => panic!("MediaBox entry {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_page_size() {
        let img = RgbImage::new(800, 400);
        let (w, h) = page_size_pt(&img, 406);
        assert!((w - 141.871).abs() < 0.01);
        assert!((h - 70.936).abs() < 0.01);
    }

    #[test]
    fn test_one_page_per_image_in_order() {
        let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [9, 9, 9]];
        let images: Vec<_> = colors.iter().map(|c| solid(*c)).collect();

        let mut buf = Vec::new();
        write_document(&images, &mut buf).unwrap();
        assert!(buf.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&buf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), colors.len());
        for ((_, page_id), color) in pages.iter().zip(colors.iter()) {
            assert_eq!(first_pixel_of_page(&doc, *page_id), color.to_vec());
        }
    }

    #[test]
    fn test_written_media_box_is_label_at_dpi() {
        let labels = vec![RgbImage::new(800, 400); 3];
        let mut buf = Vec::new();
        write_document(&labels, &mut buf).unwrap();

        let doc = Document::load_mem(&buf).unwrap();
        for (_, page_id) in doc.get_pages() {
            let mb = media_box(&doc, page_id);
            assert_eq!(mb.len(), 4);
            assert_eq!(&mb[..2], &[0.0, 0.0]);
            assert!((mb[2] - 141.871).abs() < 0.01, "{mb:?}");
            assert!((mb[3] - 70.936).abs() < 0.01, "{mb:?}");
        }
    }

    #[test]
    fn test_empty_writes_nothing() {
        let mut buf = Vec::new();
        write_document(&[], &mut buf).unwrap();
        assert!(buf.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.pdf");
        save_document(&[], &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_save_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.pdf");
        save_document(&[solid([1, 2, 3]), solid([4, 5, 6])], &path).unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
