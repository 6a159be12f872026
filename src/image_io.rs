// src/image_io.rs - Page set loading/saving (PDF, image directories) and mask files

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use log::{debug, info, warn};
use lopdf::{dictionary, Document, Object, Stream};

use crate::errors::{Result, WatermarkError};
use crate::image_utils::to_gray;

const PAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A4 in inches
const A4_INCHES: (f32, f32) = (8.27, 11.69);

fn has_page_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Image files directly inside `dir_path`, sorted by file name
pub fn list_page_files<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(WatermarkError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(WatermarkError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.is_file() && has_page_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// A blank white A4 page at `dpi`
pub fn placeholder_page(dpi: u32) -> RgbImage {
    let width = (A4_INCHES.0 * dpi as f32).round().max(1.0) as u32;
    let height = (A4_INCHES.1 * dpi as f32).round().max(1.0) as u32;
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

/// Load a page set from a PDF, a directory of page images or a single image.
///
/// Never fails: anything unreadable degrades to a single placeholder page.
pub fn load_pages<P: AsRef<Path>>(path: P, dpi: u32) -> Vec<RgbImage> {
    let path = path.as_ref();
    match try_load_pages(path) {
        Ok(pages) if !pages.is_empty() => {
            info!("Loaded {} pages from {}", pages.len(), path.display());
            pages
        }
        Ok(_) => {
            warn!("No pages found in {}, using a placeholder page", path.display());
            vec![placeholder_page(dpi)]
        }
        Err(e) => {
            warn!("Could not load {}: {}. Using a placeholder page.", path.display(), e);
            vec![placeholder_page(dpi)]
        }
    }
}

fn try_load_pages(path: &Path) -> Result<Vec<RgbImage>> {
    if path.is_dir() {
        list_page_files(path)?
            .iter()
            .map(|file| Ok(image::open(file)?.to_rgb8()))
            .collect()
    } else if is_pdf(path) {
        load_pdf_pages(path)
    } else if path.is_file() {
        Ok(vec![image::open(path)?.to_rgb8()])
    } else {
        Err(WatermarkError::InvalidPath(path.to_path_buf()))
    }
}

/// The largest embedded image of every page; pages without a decodable image are skipped
fn load_pdf_pages(path: &Path) -> Result<Vec<RgbImage>> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();

    for (page_num, page_id) in doc.get_pages() {
        let (resource_dict, resource_ids) = doc.get_page_resources(page_id)?;

        let mut dicts: Vec<&lopdf::Dictionary> = resource_dict.into_iter().collect();
        for id in resource_ids {
            dicts.push(doc.get_dictionary(id)?);
        }

        let mut best: Option<RgbImage> = None;
        for dict in dicts {
            for stream in image_streams(&doc, dict) {
                match decode_image_stream(stream) {
                    Ok(img) => {
                        let area = |i: &RgbImage| i.width() as u64 * i.height() as u64;
                        if best.as_ref().map_or(true, |b| area(&img) > area(b)) {
                            best = Some(img);
                        }
                    }
                    Err(e) => debug!("Page {}: skipping undecodable image: {}", page_num, e),
                }
            }
        }

        match best {
            Some(img) => pages.push(img),
            None => warn!("Page {} has no decodable image, skipped", page_num),
        }
    }

    Ok(pages)
}

fn image_streams<'a>(doc: &'a Document, resources: &'a lopdf::Dictionary) -> Vec<&'a Stream> {
    let xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(d)) => d,
        Ok(Object::Reference(id)) => match doc.get_object(*id).and_then(Object::as_dict) {
            Ok(d) => d,
            Err(_) => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut streams = Vec::new();
    for (_, value) in xobjects.iter() {
        let stream = match value {
            Object::Reference(id) => match doc.get_object(*id).and_then(Object::as_stream) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Object::Stream(s) => s,
            _ => continue,
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|name| name == b"Image")
            .unwrap_or(false);
        if is_image {
            streams.push(stream);
        }
    }
    streams
}

fn dict_u32(dict: &lopdf::Dictionary, key: &[u8]) -> Result<u32> {
    match dict.get(key) {
        Ok(Object::Integer(i)) if *i >= 0 && *i <= u32::MAX as i64 => Ok(*i as u32),
        _ => Err(WatermarkError::Other(format!(
            "Image stream has no valid {}",
            String::from_utf8_lossy(key)
        ))),
    }
}

fn first_filter(dict: &lopdf::Dictionary) -> Option<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.clone()),
        Ok(Object::Array(arr)) => arr.first().and_then(|o| o.as_name().ok()).map(|n| n.to_vec()),
        _ => None,
    }
}

fn decode_image_stream(stream: &Stream) -> Result<RgbImage> {
    if first_filter(&stream.dict).as_deref() == Some(b"DCTDecode".as_slice()) {
        return Ok(image::load_from_memory(&stream.content)?.to_rgb8());
    }

    let width = dict_u32(&stream.dict, b"Width")?;
    let height = dict_u32(&stream.dict, b"Height")?;
    let bits = dict_u32(&stream.dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return Err(WatermarkError::Other(format!("{} bits per component unsupported", bits)));
    }

    let data = if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content()?
    } else {
        stream.content.clone()
    };

    let pixels = width as usize * height as usize;
    let short = || WatermarkError::Other("Image stream data too short".to_string());
    if data.len() >= pixels * 3 {
        RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).ok_or_else(short)
    } else if data.len() >= pixels {
        let gray = GrayImage::from_raw(width, height, data[..pixels].to_vec()).ok_or_else(short)?;
        Ok(DynamicImage::ImageLuma8(gray).to_rgb8())
    } else {
        Err(short())
    }
}

/// Read a mask; colour files are converted to gray
pub fn load_mask_file(path: &Path) -> Result<GrayImage> {
    let img = image::open(path)?;
    Ok(match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => to_gray(&other.to_rgb8()),
    })
}

/// Write a mask as a single-channel PNG
pub fn save_mask_file(mask: &GrayImage, path: &Path) -> Result<()> {
    mask.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

pub fn encode_jpeg(page: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(page)?;
    Ok(buf)
}

/// Pack pages into a PDF, one JPEG image per page sized at `dpi`
pub fn pages_to_pdf(pages: &[RgbImage], dpi: u32, quality: u8) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let scale = 72.0 / dpi.max(1) as f32;
    let mut kids = Vec::with_capacity(pages.len());

    for page in pages {
        let (width, height) = page.dimensions();
        let jpeg = encode_jpeg(page, quality)?;

        let image_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )));

        let (page_w, page_h) = (width as f32 * scale, height as f32 * scale);
        let content = format!("q {:.2} 0 0 {:.2} 0 0 cm /Page Do Q", page_w, page_h).into_bytes();
        let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content)));

        let mut xobject_dict = lopdf::Dictionary::new();
        xobject_dict.set("Page", Object::Reference(image_id));
        let resources_id = doc.add_object(dictionary! {
            "XObject" => Object::Dictionary(xobject_dict),
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(page_w),
                Object::from(page_h),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
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

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| WatermarkError::Other(format!("PDF write failed: {}", e)))?;
    Ok(buf)
}

/// Save pages to `dest` and return the number of bytes written.
///
/// A `.pdf` destination gets a single document; anything else is treated as a
/// directory of `page_0001.jpg`, `page_0002.jpg`, ...
pub fn save_pages<P: AsRef<Path>>(pages: &[RgbImage], dest: P, dpi: u32, quality: u8) -> Result<u64> {
    let dest = dest.as_ref();
    if pages.is_empty() {
        return Err(WatermarkError::EmptyPageSet);
    }

    if is_pdf(dest) {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = pages_to_pdf(pages, dpi, quality)?;
        fs::write(dest, &bytes)?;
        info!("Saved {} pages to {} ({} bytes)", pages.len(), dest.display(), bytes.len());
        return Ok(bytes.len() as u64);
    }

    fs::create_dir_all(dest)?;
    let mut total = 0u64;
    for (i, page) in pages.iter().enumerate() {
        let bytes = encode_jpeg(page, quality)?;
        let file = dest.join(format!("page_{:04}.jpg", i + 1));
        fs::write(&file, &bytes)?;
        total += bytes.len() as u64;
    }
    info!("Saved {} pages to {} ({} bytes)", pages.len(), dest.display(), total);
    Ok(total)
}
