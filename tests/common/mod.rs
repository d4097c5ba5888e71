#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// Writes a PNG whose pixel at (x, y) is `[x % 256, y % 256, 0]`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
    image.save(path).expect("write png file");
}

/// Writes a template JSON file under `dir`.
pub fn write_template(dir: &Path, name: &str, json: &str) {
    fs::create_dir_all(dir).expect("create templates dir");
    fs::write(dir.join(format!("{name}.json")), json).expect("write template file");
}

pub fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).expect("read image dimensions")
}
