//! Run configuration.
//!
//! All directories are explicit values handed to the components that need
//! them; nothing is read from process-wide state after start-up.

use std::path::PathBuf;

use crate::preview::PreviewBounds;
use crate::template::TemplateStore;

pub const DEFAULT_INPUT_DIR: &str = "input";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Directories and display limits for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Folder scanned for images to crop.
    pub input_dir: PathBuf,
    /// Folder receiving cropped images (created on demand).
    pub output_dir: PathBuf,
    /// Folder holding `<name>.json` templates.
    pub templates_dir: PathBuf,
    pub preview: PreviewBounds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            preview: PreviewBounds::default(),
        }
    }
}

impl Settings {
    /// Opens the template store described by these settings.
    pub fn template_store(&self) -> TemplateStore {
        TemplateStore::new(&self.templates_dir)
    }
}
