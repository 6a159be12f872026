use image::{GrayImage, Luma, Rgb, RgbImage};

use watermark_remover_lib::{median_image, ImageStore};

fn flat(w: u32, h: u32, v: u8) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([v, v / 2, 255 - v]))
}

#[test]
fn single_page_is_returned_unchanged() {
    let page = RgbImage::from_fn(5, 4, |x, y| Rgb([x as u8, y as u8, 9]));
    assert_eq!(median_image(&[page.clone()], 1).unwrap(), page);
}

#[test]
fn median_is_per_pixel_and_per_channel() {
    let pages = vec![flat(3, 3, 10), flat(3, 3, 200), flat(3, 3, 50)];
    let median = median_image(&pages, 3).unwrap();
    assert_eq!(*median.get_pixel(1, 1), Rgb([50, 25, 205]));
}

#[test]
fn order_of_the_sampled_pages_does_not_matter() {
    let a = vec![flat(4, 4, 10), flat(4, 4, 90), flat(4, 4, 40), flat(4, 4, 250)];
    let b = vec![a[2].clone(), a[0].clone(), a[1].clone(), a[3].clone()];
    assert_eq!(median_image(&a, 3).unwrap(), median_image(&b, 3).unwrap());
}

#[test]
fn recurring_mark_survives_the_median() {
    let pages: Vec<RgbImage> = (0..5)
        .map(|i| {
            RgbImage::from_fn(10, 10, |x, y| {
                if x == 5 && y == 5 {
                    Rgb([100, 100, 100])
                } else {
                    Rgb([(i * 40) as u8, 255, 255])
                }
            })
        })
        .collect();
    let median = median_image(&pages, 5).unwrap();
    assert_eq!(*median.get_pixel(5, 5), Rgb([100, 100, 100]));
    assert_eq!(*median.get_pixel(0, 0), Rgb([80, 255, 255]));
}

#[test]
fn store_clamps_and_caches_sample_counts() {
    let pages: Vec<RgbImage> = (0..4).map(|i| flat(6, 6, i * 60)).collect();
    let mut store = ImageStore::new(pages, 100, 100, 50).unwrap();

    assert_eq!(store.median_sample_count(), 1);
    assert_eq!(store.display_image(), store.current_working_page());

    store.set_median_sample_count(40).unwrap();
    assert_eq!(store.median_sample_count(), 4);
    assert_ne!(store.display_image(), store.current_working_page());

    store.set_median_sample_count(0).unwrap();
    assert_eq!(store.median_sample_count(), 1);
    store.set_median_sample_count(4).unwrap();
    assert_eq!(store.cached_median_count(), 2);
}

#[test]
fn store_bounds_working_size_without_upscaling() {
    let pages = vec![flat(400, 200, 1), flat(400, 200, 2)];
    let store = ImageStore::new(pages, 100, 100, 50).unwrap();
    assert_eq!(store.working_dimensions(), (100, 50));
    assert_eq!(store.original_pages()[0].dimensions(), (400, 200));

    let small = ImageStore::new(vec![flat(30, 20, 1)], 100, 100, 50).unwrap();
    assert_eq!(small.working_dimensions(), (30, 20));
}

#[test]
fn masked_median_is_restricted_to_the_mask() {
    let store = ImageStore::new(vec![flat(4, 4, 120)], 100, 100, 50).unwrap();
    let mut mask = GrayImage::new(4, 4);
    mask.put_pixel(1, 2, Luma([255]));
    let masked = store.masked_median_gray(&mask);
    assert_ne!(masked.get_pixel(1, 2)[0], 0);
    assert_eq!(masked.get_pixel(0, 0)[0], 0);
}

#[test]
fn empty_page_set_is_an_error() {
    assert!(ImageStore::new(Vec::new(), 100, 100, 50).is_err());
    assert!(median_image(&[], 3).is_err());
}
