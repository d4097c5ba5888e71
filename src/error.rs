use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, normalizing, or storing crop templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{name}' not found in '{}'.{}", .dir.display(), available_hint(.available))]
    NotFound {
        name: String,
        dir: PathBuf,
        available: Vec<String>,
    },

    #[error("Template must contain integer 'left' and 'top' fields")]
    MissingOrigin,

    #[error("Template field '{field}' is not an integer")]
    InvalidField { field: &'static str },

    #[error("Template must define 'right'/'bottom', or 'width'/'height', or 'size'")]
    MissingDimensions,

    #[error("Invalid template dimensions {width}x{height} (must be positive)")]
    NonPositiveSize { width: i64, height: i64 },

    #[error("Template coordinates are out of range")]
    OutOfRange,

    #[error("Template must be a JSON object")]
    NotAnObject,

    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write template {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template JSON from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render template JSON for {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid template name '{name}': expected a plain name without path separators")]
    InvalidName { name: String },

    #[error("Destination {path} already exists (use --overwrite to replace it)")]
    AlreadyExists { path: PathBuf },
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" Available: {}.", available.join(", "))
    }
}

/// The main error type for bulkcrop operations.
#[derive(Debug, Error)]
pub enum BulkCropError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input folder '{}' does not exist", .path.display())]
    InputMissing { path: PathBuf },

    #[error("No PNG or JPEG images found in '{}'", .path.display())]
    NoImages { path: PathBuf },

    #[error("Failed to process image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to scan folder {path}: {message}")]
    Scan { path: PathBuf, message: String },

    #[error("Template '{name}' does not cover any pixels")]
    EmptyRegion { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_available_templates() {
        let err = TemplateError::NotFound {
            name: "missing".into(),
            dir: PathBuf::from("templates"),
            available: vec!["alpha".into(), "beta".into()],
        };
        assert_eq!(
            err.to_string(),
            "Template 'missing' not found in 'templates'. Available: alpha, beta."
        );
    }

    #[test]
    fn not_found_without_templates_has_no_hint() {
        let err = TemplateError::NotFound {
            name: "missing".into(),
            dir: PathBuf::from("templates"),
            available: vec![],
        };
        assert_eq!(err.to_string(), "Template 'missing' not found in 'templates'.");
    }

    #[test]
    fn render_failure_is_not_reported_as_parse() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TemplateError::Render {
            path: PathBuf::from("out/picked.json"),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("Failed to render template JSON for out/picked.json: "));
    }
}
