use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};
use tiff::encoder::{TiffEncoder, colortype};

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create image parent dirs");
    }
}

/// 8-bit grayscale ramp offset by `seed`.
pub fn write_gray_png(path: &Path, width: u32, height: u32, seed: u8) {
    ensure_parent(path);
    GrayImage::from_fn(width, height, |x, y| {
        Luma([seed.wrapping_add((x + y * width) as u8)])
    })
    .save(path)
    .expect("write gray png");
}

/// RGB image whose channels hold distinct constant offsets.
pub fn write_rgb_png(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    RgbImage::from_fn(width, height, |x, _| Rgb([x as u8, 10 + x as u8, 200]))
        .save(path)
        .expect("write rgb png");
}

/// Multi-page 16-bit TIFF, one page per entry of `offsets`.
pub fn write_tiff_stack(path: &Path, width: u32, height: u32, offsets: &[u16]) {
    ensure_parent(path);
    let file = BufWriter::new(File::create(path).expect("create tiff"));
    let mut encoder = TiffEncoder::new(file).expect("tiff encoder");
    let len = (width * height) as u16;
    for offset in offsets {
        let data: Vec<u16> = (0..len).map(|value| value + offset).collect();
        encoder
            .write_image::<colortype::Gray16>(width, height, &data)
            .expect("write tiff page");
    }
}
