#![allow(dead_code)]

use bulkcrop::geometry::CropRect;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(256);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image dimensions from tiny to larger than the default preview box.
pub fn arb_image_size() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=6000, 1u32..=6000)
}

/// An image size together with a crop rectangle inside it.
pub fn arb_size_and_rect() -> impl Strategy<Value = ((u32, u32), CropRect)> {
    arb_image_size().prop_flat_map(|(w, h)| {
        (0..w, 0..h).prop_flat_map(move |(left, top)| {
            ((left + 1)..=w, (top + 1)..=h).prop_map(move |(right, bottom)| {
                let rect = CropRect::new(left, top, right, bottom)
                    .expect("strategy produces non-empty rects");
                ((w, h), rect)
            })
        })
    })
}

/// `(left, top, width, height)` with positive extent.
pub fn arb_region() -> impl Strategy<Value = (i64, i64, i64, i64)> {
    (-5000i64..5000, -5000i64..5000, 1i64..5000, 1i64..5000)
}
