//! On-disk template storage.
//!
//! Templates live as `<identifier>.json` files in a single directory that is
//! handed to [`TemplateStore::new`]. Imported and exported files are copied
//! verbatim; only manual selections are rendered through
//! [`Template::to_json_string`].

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Template;
use crate::error::TemplateError;

const TEMPLATE_EXTENSION: &str = "json";
const MAX_IDENTIFIER_LEN: usize = 64;
const FALLBACK_IDENTIFIER: &str = "template";

static UNSAFE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_-]+").expect("identifier pattern is valid")
});

/// A directory of named crop templates.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing template `name`.
    ///
    /// # Errors
    /// [`TemplateError::InvalidName`] unless `name` is a plain file stem, so
    /// lookups never leave the store directory.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, TemplateError> {
        if !is_plain_stem(name) {
            return Err(TemplateError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.file_for(name))
    }

    /// Returns true if a template file named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    /// Lists stored template names (file stems), sorted.
    ///
    /// A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<String>, TemplateError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_err = |source: std::io::Error| TemplateError::Read {
            path: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if !path.is_file() || !has_json_extension(&path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Loads and normalizes template `name`.
    ///
    /// # Errors
    /// [`TemplateError::NotFound`] (with the available names) when no file
    /// matches, or any normalization error when the file is malformed.
    pub fn load(&self, name: &str) -> Result<Template, TemplateError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(self.not_found(name));
        }

        let template = read_template_file(&path, name)?;
        tracing::debug!(
            name,
            left = template.left(),
            top = template.top(),
            width = template.width(),
            height = template.height(),
            "loaded template"
        );
        Ok(template)
    }

    /// Imports an external template file and returns its stored identifier.
    ///
    /// The file must normalize like any stored template. Its identifier is
    /// derived from the declared `name` (or the file name) with
    /// [`identifier_for`]; without `overwrite`, a numeric suffix is appended
    /// until the identifier is free.
    pub fn import(&self, source: &Path, overwrite: bool) -> Result<String, TemplateError> {
        let content = fs::read_to_string(source).map_err(|e| TemplateError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| TemplateError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(FALLBACK_IDENTIFIER);
        let template = Template::from_value(&value, stem)?;

        let base = identifier_for(template.name());
        let identifier = if overwrite {
            base
        } else {
            self.unique_identifier(&base)
        };

        self.write_raw(&identifier, &content)?;
        tracing::info!(source = %source.display(), identifier = %identifier, "imported template");
        Ok(identifier)
    }

    /// Copies template `name` to `destination` and returns the final path.
    ///
    /// A directory destination receives `<name>.json`; any other destination
    /// is forced to carry a `.json` extension.
    pub fn export(
        &self,
        name: &str,
        destination: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, TemplateError> {
        let source = self.path_for(name)?;
        if !source.is_file() {
            return Err(self.not_found(name));
        }

        let content = fs::read_to_string(&source).map_err(|e| TemplateError::Read {
            path: source.clone(),
            source: e,
        })?;

        let target = resolve_destination(destination, name);
        write_new_file(&target, &content, overwrite)?;
        tracing::info!(name, target = %target.display(), "exported template");
        Ok(target)
    }

    /// Stores a template built in-process (e.g. a drawn selection) and
    /// returns its identifier.
    pub fn save(&self, template: &Template, overwrite: bool) -> Result<String, TemplateError> {
        let base = identifier_for(template.name());
        let identifier = if overwrite {
            base
        } else {
            self.unique_identifier(&base)
        };

        let content = render(template, &self.file_for(&identifier))?;
        self.write_raw(&identifier, &content)?;
        tracing::info!(identifier = %identifier, "saved template");
        Ok(identifier)
    }

    // Identifiers come from `identifier_for` and are always plain stems.
    fn file_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{identifier}.{TEMPLATE_EXTENSION}"))
    }

    fn unique_identifier(&self, base: &str) -> String {
        if !self.file_for(base).exists() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.file_for(candidate).exists())
            .unwrap_or_else(|| base.to_string())
    }

    fn write_raw(&self, identifier: &str, content: &str) -> Result<(), TemplateError> {
        let path = self.file_for(identifier);
        fs::create_dir_all(&self.dir).map_err(|source| TemplateError::Write {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| TemplateError::Write { path, source })
    }

    fn not_found(&self, name: &str) -> TemplateError {
        TemplateError::NotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
            available: self.list().unwrap_or_default(),
        }
    }
}

/// Writes `template` in canonical form to `destination` (same destination
/// rules as [`TemplateStore::export`]) and returns the final path.
pub fn write_template_file(
    template: &Template,
    destination: &Path,
    overwrite: bool,
) -> Result<PathBuf, TemplateError> {
    let target = resolve_destination(destination, &identifier_for(template.name()));
    let content = render(template, &target)?;
    write_new_file(&target, &content, overwrite)?;
    tracing::info!(target = %target.display(), "wrote template file");
    Ok(target)
}

/// Derives a filesystem-safe identifier from a free-form template name.
///
/// Runs of characters other than ASCII letters, digits, `-` and `_` collapse
/// into a single `_`; the result is lower-cased, stripped of surrounding
/// underscores and capped at 64 characters.
pub fn identifier_for(name: &str) -> String {
    let replaced = UNSAFE_RUN.replace_all(name, "_").to_lowercase();
    let mut identifier = replaced.trim_matches('_').to_string();
    identifier.truncate(MAX_IDENTIFIER_LEN);
    let identifier = identifier.trim_end_matches('_');

    if identifier.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        identifier.to_string()
    }
}

fn read_template_file(path: &Path, fallback_name: &str) -> Result<Template, TemplateError> {
    let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| TemplateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Template::from_value(&value, fallback_name)
}

fn render(template: &Template, path: &Path) -> Result<String, TemplateError> {
    template
        .to_json_string()
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|source| TemplateError::Render {
            path: path.to_path_buf(),
            source,
        })
}

fn resolve_destination(destination: &Path, name: &str) -> PathBuf {
    if destination.is_dir() {
        return destination.join(format!("{name}.{TEMPLATE_EXTENSION}"));
    }
    if has_json_extension(destination) {
        return destination.to_path_buf();
    }

    let mut file_name = destination.as_os_str().to_os_string();
    file_name.push(".");
    file_name.push(TEMPLATE_EXTENSION);
    PathBuf::from(file_name)
}

fn write_new_file(path: &Path, content: &str, overwrite: bool) -> Result<(), TemplateError> {
    if path.exists() && !overwrite {
        return Err(TemplateError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    fs::write(path, content).map_err(|source| TemplateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// A stored template name must name a file directly inside the store.
fn is_plain_stem(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}
