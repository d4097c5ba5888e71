//! Crop templates: named, normalized crop rectangles.
//!
//! A template file is a small JSON object. The origin (`left`, `top`) is
//! always required, while the extent can be written in one of three
//! equivalent forms:
//!
//! - explicit exclusive bounds: `right` and `bottom`
//! - a size: `width` and `height` (a single one of them means a square)
//! - a square: `size`
//!
//! Every form is normalized into a [`Template`] on construction, so a
//! `Template` value always has `right > left` and `bottom > top`.
//!
//! # Example
//!
//! ```
//! use bulkcrop::template::Template;
//!
//! let a = Template::from_json_str(r#"{"left": 0, "top": 0, "size": 100}"#, "a").unwrap();
//! let b = Template::from_json_str(
//!     r#"{"left": 0, "top": 0, "right": 100, "bottom": 100}"#,
//!     "b",
//! )
//! .unwrap();
//! assert_eq!(a.bounds(), b.bounds());
//! ```

pub mod store;

pub use store::TemplateStore;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TemplateError;

/// Name of the template used when none is requested explicitly.
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Built-in region used when the store has no `default` template.
const BUILTIN_LEFT: i64 = 1381;
const BUILTIN_TOP: i64 = 119;
const BUILTIN_SIZE: i64 = 273;

/// A normalized crop template.
///
/// Coordinates are pixel offsets from the top-left corner of the image;
/// `right` and `bottom` are exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    name: String,
    description: String,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl Template {
    /// Builds a template from explicit exclusive bounds.
    ///
    /// # Errors
    /// Returns [`TemplateError::NonPositiveSize`] unless `right > left` and
    /// `bottom > top`.
    pub fn from_bounds(
        name: impl Into<String>,
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
    ) -> Result<Self, TemplateError> {
        let (Some(width), Some(height)) = (right.checked_sub(left), bottom.checked_sub(top))
        else {
            return Err(TemplateError::OutOfRange);
        };
        if width <= 0 || height <= 0 {
            return Err(TemplateError::NonPositiveSize { width, height });
        }

        Ok(Self {
            name: name.into(),
            description: String::new(),
            left,
            top,
            right,
            bottom,
        })
    }

    /// The region used when no template has been authored yet.
    pub fn builtin_default() -> Self {
        Self {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            description: "Built-in default region".to_string(),
            left: BUILTIN_LEFT,
            top: BUILTIN_TOP,
            right: BUILTIN_LEFT + BUILTIN_SIZE,
            bottom: BUILTIN_TOP + BUILTIN_SIZE,
        }
    }

    /// Parses and normalizes a template from JSON text.
    ///
    /// `fallback_name` is used when the document has no (or an empty) `name`.
    pub fn from_json_str(json: &str, fallback_name: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(json).map_err(|source| TemplateError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_value(&value, fallback_name)
    }

    /// Normalizes an already-parsed JSON document.
    pub fn from_value(value: &Value, fallback_name: &str) -> Result<Self, TemplateError> {
        let map = value.as_object().ok_or(TemplateError::NotAnObject)?;

        let left = int_field(map, "left")?.ok_or(TemplateError::MissingOrigin)?;
        let top = int_field(map, "top")?.ok_or(TemplateError::MissingOrigin)?;

        let right = int_field(map, "right")?;
        let bottom = int_field(map, "bottom")?;

        // Explicit bounds take precedence over any width/height also present.
        let (right, bottom) = match (right, bottom) {
            (Some(right), Some(bottom)) => (right, bottom),
            _ => {
                let (width, height) = extent(map)?;
                left.checked_add(width)
                    .zip(top.checked_add(height))
                    .ok_or(TemplateError::OutOfRange)?
            }
        };

        let mut template = Self::from_bounds(
            text_field(map, "name").unwrap_or_else(|| fallback_name.to_string()),
            left,
            top,
            right,
            bottom,
        )?;
        template.description = text_field(map, "description").unwrap_or_default();
        Ok(template)
    }

    /// Returns a copy of this template with a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy of this template with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn left(&self) -> i64 {
        self.left
    }

    pub fn top(&self) -> i64 {
        self.top
    }

    pub fn right(&self) -> i64 {
        self.right
    }

    pub fn bottom(&self) -> i64 {
        self.bottom
    }

    /// Width in pixels, always positive.
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    /// Height in pixels, always positive.
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Returns `(left, top, right, bottom)`.
    pub fn bounds(&self) -> (i64, i64, i64, i64) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// Renders the canonical JSON form written when a selection is exported.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&CanonicalTemplate {
            name: &self.name,
            description: Some(self.description.as_str()).filter(|d| !d.is_empty()),
            left: self.left,
            top: self.top,
            right: self.right,
            bottom: self.bottom,
            width: self.width(),
            height: self.height(),
        })
    }
}

#[derive(Serialize)]
struct CanonicalTemplate<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    width: i64,
    height: i64,
}

/// Resolves `(width, height)` from the `width`/`height` or `size` forms.
fn extent(map: &Map<String, Value>) -> Result<(i64, i64), TemplateError> {
    let width = int_field(map, "width")?;
    let height = int_field(map, "height")?;

    match (width, height) {
        (Some(width), Some(height)) => Ok((width, height)),
        (Some(side), None) | (None, Some(side)) => Ok((side, side)),
        (None, None) => {
            let size = int_field(map, "size")?.ok_or(TemplateError::MissingDimensions)?;
            Ok((size, size))
        }
    }
}

/// Reads an integer field; `null` and absent both yield `None`.
///
/// Floats are truncated toward zero and numeric strings are accepted, so
/// hand-written files like `{"left": "10", "top": 5.0}` still load.
fn int_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, TemplateError> {
    let invalid = || TemplateError::InvalidField { field };

    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .map(Some)
                .ok_or_else(invalid)
        }
        Some(_) => Err(invalid()),
    }
}

/// Reads an optional text field.
///
/// Empty values (`null`, `false`, zero, `""`, `[]`, `{}`) count as absent;
/// any other non-string value is kept in its JSON spelling.
fn text_field(map: &Map<String, Value>, field: &str) -> Option<String> {
    match map.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
