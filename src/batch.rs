//! Bulk cropping of an input folder.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, GenericImageView};
use walkdir::WalkDir;

use crate::error::BulkCropError;
use crate::geometry::CropRect;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Summary of a finished batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropReport {
    /// Output files written, in processing order.
    pub written: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl CropReport {
    pub fn processed(&self) -> usize {
        self.written.len()
    }
}

impl fmt::Display for CropReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.written.is_empty() {
            return writeln!(f, "No images were cropped.");
        }
        writeln!(
            f,
            "Cropped {} image(s) into '{}'.",
            self.processed(),
            self.output_dir.display()
        )
    }
}

/// Lists the PNG/JPEG files directly inside `dir`, sorted by file name.
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>, BulkCropError> {
    if !dir.is_dir() {
        return Err(BulkCropError::InputMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| BulkCropError::Scan {
            path: dir.to_path_buf(),
            message: source.to_string(),
        })?;

        if entry.file_type().is_file() && is_image(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Returns the first image `image_files` would process, if any.
pub fn first_image(dir: &Path) -> Result<Option<PathBuf>, BulkCropError> {
    Ok(image_files(dir)?.into_iter().next())
}

/// Crops every image in `input_dir` to `rect`, writing results under the same
/// file names into `output_dir` (created if needed).
///
/// The run stops at the first failure; files already written stay in place.
pub fn crop_all(
    input_dir: &Path,
    output_dir: &Path,
    rect: CropRect,
) -> Result<CropReport, BulkCropError> {
    let files = image_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut report = CropReport {
        written: Vec::with_capacity(files.len()),
        output_dir: output_dir.to_path_buf(),
    };

    for input in files {
        let Some(file_name) = input.file_name() else {
            continue;
        };
        let output = output_dir.join(file_name);
        crop_file(&input, &output, rect)?;
        tracing::info!(file = %file_name.to_string_lossy(), "cropped");
        report.written.push(output);
    }

    Ok(report)
}

/// Crops a single image file.
///
/// The output is always `rect.width()` x `rect.height()`. Parts of the
/// rectangle that fall outside the source image are left black
/// (transparent for images with alpha).
pub fn crop_file(input: &Path, output: &Path, rect: CropRect) -> Result<(), BulkCropError> {
    let image = image::open(input).map_err(|source| BulkCropError::Image {
        path: input.to_path_buf(),
        source,
    })?;

    crop_padded(&image, rect)
        .save(output)
        .map_err(|source| BulkCropError::Image {
            path: output.to_path_buf(),
            source,
        })
}

fn crop_padded(image: &DynamicImage, rect: CropRect) -> DynamicImage {
    let (width, height) = image.dimensions();
    let overlap = rect.fit_within(width, height);
    if overlap == Some(rect) {
        return image.crop_imm(rect.left(), rect.top(), rect.width(), rect.height());
    }

    let mut canvas = DynamicImage::new(rect.width(), rect.height(), image.color());
    if let Some(overlap) = overlap {
        tracing::debug!(%rect, %overlap, "padding crop beyond image bounds");
        let patch = image.crop_imm(
            overlap.left(),
            overlap.top(),
            overlap.width(),
            overlap.height(),
        );
        imageops::replace(
            &mut canvas,
            &patch,
            i64::from(overlap.left() - rect.left()),
            i64::from(overlap.top() - rect.top()),
        );
    }
    canvas
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(path: &Path, width: u32, height: u32) {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        image.save(path).expect("write png");
    }

    #[test]
    fn image_files_filters_and_sorts() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write_png(&temp.path().join("b.png"), 4, 4);
        write_png(&temp.path().join("a.PNG"), 4, 4);
        fs::write(temp.path().join("notes.txt"), "skip").unwrap();
        fs::create_dir(temp.path().join("nested.png")).unwrap();

        let files = image_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn image_files_on_missing_dir_fails() {
        let temp = tempfile::tempdir().expect("create temp dir");
        assert!(matches!(
            image_files(&temp.path().join("missing")),
            Err(BulkCropError::InputMissing { .. })
        ));
    }

    #[test]
    fn crop_all_crops_top_left_corner() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let input = temp.path().join("input");
        let output = temp.path().join("output");
        fs::create_dir_all(&input).unwrap();
        write_png(&input.join("photo.png"), 200, 150);

        let rect = CropRect::new(0, 0, 100, 100).unwrap();
        let report = crop_all(&input, &output, rect).unwrap();

        assert_eq!(report.processed(), 1);
        let cropped = image::open(output.join("photo.png")).unwrap();
        assert_eq!(cropped.dimensions(), (100, 100));
        assert_eq!(cropped.to_rgb8().get_pixel(99, 99), &Rgb([99, 99, 0]));
    }

    #[test]
    fn crop_all_offsets_region() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let input = temp.path().join("input");
        let output = temp.path().join("output");
        fs::create_dir_all(&input).unwrap();
        write_png(&input.join("a.png"), 64, 64);

        let rect = CropRect::new(10, 20, 30, 50).unwrap();
        crop_all(&input, &output, rect).unwrap();

        let cropped = image::open(output.join("a.png")).unwrap().to_rgb8();
        assert_eq!(cropped.dimensions(), (20, 30));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([10, 20, 0]));
    }

    #[test]
    fn crop_all_with_no_images_reports_zero() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let input = temp.path().join("input");
        fs::create_dir_all(&input).unwrap();

        let report = crop_all(&input, &temp.path().join("out"), CropRect::new(0, 0, 1, 1).unwrap())
            .unwrap();
        assert_eq!(report.processed(), 0);
        assert!(temp.path().join("out").is_dir());
        assert_eq!(report.to_string(), "No images were cropped.\n");
    }

    #[test]
    fn mixed_sizes_all_get_rect_sized_outputs() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let input = temp.path().join("input");
        let output = temp.path().join("output");
        fs::create_dir_all(&input).unwrap();
        write_png(&input.join("a.png"), 200, 150);
        write_png(&input.join("b.png"), 80, 80);

        let rect = CropRect::new(0, 0, 100, 100).unwrap();
        let report = crop_all(&input, &output, rect).unwrap();
        assert_eq!(report.processed(), 2);

        let a = image::open(output.join("a.png")).unwrap().to_rgb8();
        let b = image::open(output.join("b.png")).unwrap().to_rgb8();
        assert_eq!(a.dimensions(), (100, 100));
        assert_eq!(b.dimensions(), (100, 100));
        assert_eq!(b.get_pixel(79, 79), &Rgb([79, 79, 0]));
        assert_eq!(b.get_pixel(80, 10), &Rgb([0, 0, 0]));
        assert_eq!(b.get_pixel(99, 99), &Rgb([0, 0, 0]));
    }

    #[test]
    fn region_past_image_edge_is_padded() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("small.png");
        let target = temp.path().join("out.png");
        write_png(&source, 60, 40);

        let rect = CropRect::new(50, 30, 70, 50).unwrap();
        crop_file(&source, &target, rect).unwrap();

        let cropped = image::open(&target).unwrap().to_rgb8();
        assert_eq!(cropped.dimensions(), (20, 20));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([50, 30, 0]));
        assert_eq!(cropped.get_pixel(9, 9), &Rgb([59, 39, 0]));
        assert_eq!(cropped.get_pixel(10, 0), &Rgb([0, 0, 0]));
        assert_eq!(cropped.get_pixel(0, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn region_entirely_outside_image_is_blank() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("tiny.png");
        let target = temp.path().join("out.png");
        write_png(&source, 10, 10);

        let rect = CropRect::new(50, 50, 80, 80).unwrap();
        crop_file(&source, &target, rect).unwrap();

        let cropped = image::open(&target).unwrap().to_rgb8();
        assert_eq!(cropped.dimensions(), (30, 30));
        assert!(cropped.pixels().all(|p| p == &Rgb([0, 0, 0])));
    }
}
