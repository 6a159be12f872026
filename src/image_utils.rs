use image::{GrayImage, Luma, Rgb, RgbImage};
use image::imageops::FilterType;

/// Mask value for a selected pixel
pub const MASK_ON: u8 = 255;
/// Mask value for an unselected pixel
pub const MASK_OFF: u8 = 0;

/// Fit `(width, height)` inside `max_width` x `max_height`, keeping the aspect ratio.
/// Never upscales.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio).min(1.0);

    let new_width = ((width as f64 * ratio) as u32).max(1);
    let new_height = ((height as f64 * ratio) as u32).max(1);
    (new_width, new_height)
}

/// Resize a page to exact dimensions
pub fn resize_page(image: &RgbImage, dimensions: (u32, u32)) -> RgbImage {
    if image.dimensions() == dimensions {
        return image.clone();
    }
    image::imageops::resize(image, dimensions.0, dimensions.1, FilterType::Triangle)
}

/// Resize a mask keeping it binary (nearest neighbour)
pub fn resize_mask_nearest(mask: &GrayImage, dimensions: (u32, u32)) -> GrayImage {
    if mask.dimensions() == dimensions {
        return mask.clone();
    }
    image::imageops::resize(mask, dimensions.0, dimensions.1, FilterType::Nearest)
}

/// Resize a mask with an area-averaging filter; edges may become partial values
pub fn resize_mask_area(mask: &GrayImage, dimensions: (u32, u32)) -> GrayImage {
    if mask.dimensions() == dimensions {
        return mask.clone();
    }
    image::imageops::resize(mask, dimensions.0, dimensions.1, FilterType::Triangle)
}

/// Luma of an RGB pixel with the fixed-point BT.601 weights used for scanned documents
#[inline]
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + 8192) >> 14) as u8
}

/// Convert an RGB page to grayscale
pub fn to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| Luma([luma(image.get_pixel(x, y))]))
}

/// Replicate a single-channel mask into three channels
pub fn gray_to_rgb(mask: &GrayImage) -> RgbImage {
    let (width, height) = mask.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let v = mask.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// 255 where `lower <= value <= upper`, 0 elsewhere. An inverted range selects nothing.
pub fn in_range_gray(image: &GrayImage, lower: u8, upper: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0];
        Luma([if lower <= v && v <= upper { MASK_ON } else { MASK_OFF }])
    })
}

/// Per-channel range test on an RGB pixel
#[inline]
pub fn rgb_in_range(pixel: &Rgb<u8>, lower: [u8; 3], upper: [u8; 3]) -> bool {
    (0..3).all(|c| lower[c] <= pixel[c] && pixel[c] <= upper[c])
}

/// Pixel-wise bitwise AND of two equally sized masks
pub fn mask_and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_masks(a, b, |x, y| x & y)
}

/// Pixel-wise bitwise OR of two equally sized masks
pub fn mask_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_masks(a, b, |x, y| x | y)
}

fn zip_masks(a: &GrayImage, b: &GrayImage, op: impl Fn(u8, u8) -> u8) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    let data = a.as_raw().iter().zip(b.as_raw().iter()).map(|(&x, &y)| op(x, y)).collect();
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Force every non-zero pixel to 255
pub fn binarize(mask: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    for v in out.iter_mut() {
        if *v != MASK_OFF {
            *v = MASK_ON;
        }
    }
    out
}

/// Number of selected pixels
pub fn count_selected(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v != MASK_OFF).count()
}

/// Blend a mask over an image (70% image, 30% mask) for previews
pub fn blend_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let p = image.get_pixel(x, y);
        let m = if x < mask.width() && y < mask.height() {
            mask.get_pixel(x, y)[0] as f32
        } else {
            0.0
        };
        let blend = |c: u8| (c as f32 * 0.7 + m * 0.3).round().clamp(0.0, 255.0) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}
