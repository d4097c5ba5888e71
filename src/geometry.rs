//! Rectangles in the two coordinate spaces the tool works with.
//!
//! - [`CropRect`]: integer pixels of the original image, `right`/`bottom`
//!   exclusive, never empty.
//! - [`PreviewRect`]: floating-point positions on the scaled-down preview,
//!   as delivered by pointer events.

use std::fmt;

use crate::template::Template;

/// A non-empty crop region in original-image pixels.
///
/// Invariant: `left < right` and `top < bottom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl CropRect {
    /// Creates a rectangle, or `None` if it would be empty.
    #[inline]
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Option<Self> {
        (left < right && top < bottom).then_some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Places a template on an image of the given size.
    ///
    /// Each bound is clamped into the image; `None` means the template does
    /// not overlap the image at all.
    pub fn from_template(template: &Template, image_width: u32, image_height: u32) -> Option<Self> {
        let clamp = |value: i64, max: u32| value.clamp(0, i64::from(max)) as u32;
        Self::new(
            clamp(template.left(), image_width),
            clamp(template.top(), image_height),
            clamp(template.right(), image_width),
            clamp(template.bottom(), image_height),
        )
    }

    /// The part of this rectangle that overlaps an image of the given size.
    pub fn fit_within(&self, image_width: u32, image_height: u32) -> Option<Self> {
        Self::new(
            self.left.min(image_width),
            self.top.min(image_height),
            self.right.min(image_width),
            self.bottom.min(image_height),
        )
    }

    /// Converts the rectangle into a named template.
    pub fn to_template(&self, name: impl Into<String>) -> Template {
        Template::from_bounds(
            name,
            i64::from(self.left),
            i64::from(self.top),
            i64::from(self.right),
            i64::from(self.bottom),
        )
        .unwrap_or_else(|_| unreachable!("CropRect is never empty"))
    }

    #[inline]
    pub fn left(&self) -> u32 {
        self.left
    }

    #[inline]
    pub fn top(&self) -> u32 {
        self.top
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.right
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

impl fmt::Debug for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropRect")
            .field("left", &self.left)
            .field("top", &self.top)
            .field("right", &self.right)
            .field("bottom", &self.bottom)
            .finish()
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left={}, top={}, right={}, bottom={} ({}x{})",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}

/// A position on the preview canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamps the point onto a `width` x `height` canvas.
    #[inline]
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        Self::new(self.x.clamp(0.0, width), self.y.clamp(0.0, height))
    }
}

/// A rectangle on the preview canvas (min corner, max corner).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PreviewRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PreviewRect {
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Spans two arbitrary corners, ordering them so `x0 <= x1`, `y0 <= y1`.
    #[inline]
    pub fn spanning(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}
