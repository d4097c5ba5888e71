//! The interactive crop selection.
//!
//! A selection is driven by pointer events on the preview canvas:
//!
//! ```text
//!            press                release (big enough)
//!   Idle ───────────▶ Dragging ───────────────────────▶ Selected
//!    ▲                 │  ▲ motion                         │
//!    └─────────────────┘  └─────┘                          │ press
//!     release (too small)                                  ▼
//!                                                       Dragging
//! ```
//!
//! A template can also be applied directly, which jumps to `Selected` (or
//! back to `Idle` when the template does not fit the image).

use std::fmt;

use crate::geometry::{CropRect, Point, PreviewRect};
use crate::preview::PreviewScale;
use crate::template::Template;

/// Drags narrower or shorter than this many preview pixels are discarded.
pub const MIN_SELECTION_SIZE: f64 = 2.0;

/// Where the active crop rectangle came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    Template(String),
    Manual,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSource::Template(name) => write!(f, "template '{}'", name),
            SelectionSource::Manual => write!(f, "manual selection"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectionState {
    Idle,
    Dragging {
        anchor: Point,
        current: Point,
    },
    Selected {
        rect: CropRect,
        source: SelectionSource,
    },
}

/// Result of releasing the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The drag was mapped to this original-space rectangle.
    Selected(CropRect),
    /// The drag was below [`MIN_SELECTION_SIZE`]; nothing is selected.
    TooSmall,
    /// No drag was in progress.
    Ignored,
}

/// Selection state bound to one preview.
#[derive(Clone, Debug)]
pub struct Selection {
    scale: PreviewScale,
    state: SelectionState,
}

impl Selection {
    pub fn new(scale: PreviewScale) -> Self {
        Self {
            scale,
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn scale(&self) -> &PreviewScale {
        &self.scale
    }

    /// The active crop rectangle, if a selection has been made.
    pub fn crop_rect(&self) -> Option<CropRect> {
        match &self.state {
            SelectionState::Selected { rect, .. } => Some(*rect),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&SelectionSource> {
        match &self.state {
            SelectionState::Selected { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The rectangle to draw on the preview for the current state.
    pub fn overlay(&self) -> Option<PreviewRect> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging { anchor, current } => {
                Some(PreviewRect::spanning(*anchor, *current))
            }
            SelectionState::Selected { rect, .. } => Some(self.scale.to_preview(rect)),
        }
    }

    /// Starts a drag at `point`, discarding any previous selection.
    ///
    /// Returns the zero-size marker to draw at the anchor.
    pub fn press(&mut self, point: Point) -> PreviewRect {
        let anchor = self.clamp(point);
        self.state = SelectionState::Dragging {
            anchor,
            current: anchor,
        };
        PreviewRect::spanning(anchor, anchor)
    }

    /// Updates the drag; returns the rectangle to redraw, if dragging.
    pub fn motion(&mut self, point: Point) -> Option<PreviewRect> {
        let point = self.clamp(point);
        match &mut self.state {
            SelectionState::Dragging { anchor, current } => {
                *current = point;
                Some(PreviewRect::spanning(*anchor, point))
            }
            _ => None,
        }
    }

    /// Finishes the drag at `point`.
    pub fn release(&mut self, point: Point) -> ReleaseOutcome {
        let anchor = match self.state {
            SelectionState::Dragging { anchor, .. } => anchor,
            _ => return ReleaseOutcome::Ignored,
        };

        let drawn = PreviewRect::spanning(anchor, self.clamp(point));
        if drawn.width() < MIN_SELECTION_SIZE || drawn.height() < MIN_SELECTION_SIZE {
            tracing::debug!(?drawn, "selection too small");
            self.clear();
            return ReleaseOutcome::TooSmall;
        }

        match self.scale.to_original(&drawn) {
            Some(rect) => {
                tracing::debug!(?drawn, %rect, "mapped selection to original");
                self.state = SelectionState::Selected {
                    rect,
                    source: SelectionSource::Manual,
                };
                ReleaseOutcome::Selected(rect)
            }
            None => {
                self.clear();
                ReleaseOutcome::TooSmall
            }
        }
    }

    /// Selects the region described by `template`, clamped to the image.
    ///
    /// Returns `None` (and clears the selection) when the template lies
    /// entirely outside the image.
    pub fn apply_template(&mut self, template: &Template) -> Option<CropRect> {
        let (width, height) = self.scale.original_size();
        match CropRect::from_template(template, width, height) {
            Some(rect) => {
                self.state = SelectionState::Selected {
                    rect,
                    source: SelectionSource::Template(template.name().to_string()),
                };
                Some(rect)
            }
            None => {
                self.clear();
                None
            }
        }
    }

    /// Drops any drag or selection.
    pub fn clear(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// A one-line description of the state, suitable for a status bar.
    pub fn status(&self) -> String {
        match &self.state {
            SelectionState::Idle => {
                "Drag on the preview or apply a template to select the crop area.".to_string()
            }
            SelectionState::Dragging { .. } => "Selecting...".to_string(),
            SelectionState::Selected { rect, source } => {
                format!("Selected area ({}): {}", source, rect)
            }
        }
    }

    fn clamp(&self, point: Point) -> Point {
        let (width, height) = self.scale.preview_size();
        point.clamp_to(f64::from(width), f64::from(height))
    }
}
