//! Bulkcrop: crop a whole folder of images to one region.
//!
//! The region comes from a named JSON template, from a built-in default, or
//! from a rectangle drawn on a scaled-down preview of the first image.
//!
//! # Modules
//!
//! - [`template`]: Template records, normalization and the on-disk store
//! - [`geometry`]: Crop rectangles in original and preview space
//! - [`preview`]: Preview scaling and the preview/original coordinate mapping
//! - [`selection`]: The drag-to-select state machine
//! - [`batch`]: Cropping every image of a folder
//! - [`error`]: Error types for bulkcrop operations

pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod preview;
pub mod selection;
pub mod template;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use error::{BulkCropError, TemplateError};

use config::Settings;
use geometry::{CropRect, Point};
use preview::PreviewBounds;
use selection::{ReleaseOutcome, Selection};
use template::store::write_template_file;
use template::{Template, TemplateStore, DEFAULT_TEMPLATE_NAME};

/// The bulkcrop CLI application.
#[derive(Parser)]
#[command(name = "bulkcrop")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Template to crop with (defaults to 'default', or the built-in region).
    #[arg(short, long)]
    template: Option<String>,

    /// List available templates and exit.
    #[arg(short, long)]
    list_templates: bool,

    #[command(flatten)]
    paths: PathArgs,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Directory options shared by every subcommand.
#[derive(clap::Args)]
struct PathArgs {
    /// Folder with the images to crop.
    #[arg(short, long, global = true, env = "BULKCROP_INPUT", default_value = config::DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Folder receiving the cropped images.
    #[arg(short, long, global = true, env = "BULKCROP_OUTPUT", default_value = config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Folder holding template files.
    #[arg(long, global = true, env = "BULKCROP_TEMPLATES_DIR", default_value = config::DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Copy an external template file into the template folder.
    Import(ImportArgs),
    /// Copy a stored template to another location.
    Export(ExportArgs),
    /// Write a scaled-down preview of the first input image.
    Preview(PreviewArgs),
    /// Select a region by replaying a drag on the preview.
    Select(SelectArgs),
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Template JSON file to import.
    file: PathBuf,

    /// Replace a stored template with the same name instead of renaming.
    #[arg(long)]
    overwrite: bool,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Name of the stored template.
    name: String,

    /// Destination file or directory.
    destination: PathBuf,

    /// Replace the destination if it exists.
    #[arg(long)]
    overwrite: bool,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// Where to write the preview image.
    #[arg(long, default_value = "preview.png")]
    out: PathBuf,

    /// Outline this template on the preview.
    #[arg(short, long)]
    template: Option<String>,

    #[command(flatten)]
    bounds: BoundsArgs,
}

#[derive(clap::Args)]
struct SelectArgs {
    /// Drag start on the preview, as X,Y.
    #[arg(long, value_parser = parse_point)]
    from: Point,

    /// Drag end on the preview, as X,Y.
    #[arg(long, value_parser = parse_point)]
    to: Point,

    /// Store the selection as a template with this name.
    #[arg(long)]
    save: Option<String>,

    /// Also write the selection as a template file to this path.
    #[arg(long)]
    write: Option<PathBuf>,

    /// Description stored with the template.
    #[arg(long)]
    description: Option<String>,

    /// Replace existing templates or files.
    #[arg(long)]
    overwrite: bool,

    /// Crop all input images with the selection.
    #[arg(long)]
    apply: bool,

    #[command(flatten)]
    bounds: BoundsArgs,
}

#[derive(clap::Args, Default)]
struct BoundsArgs {
    /// Maximum preview width in pixels [default: 1000].
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum preview height in pixels [default: 700].
    #[arg(long)]
    max_height: Option<u32>,
}

impl BoundsArgs {
    /// Applies the flags given on the command line on top of `base`.
    fn over(&self, base: PreviewBounds) -> PreviewBounds {
        PreviewBounds {
            max_width: self.max_width.unwrap_or(base.max_width).max(1),
            max_height: self.max_height.unwrap_or(base.max_height).max(1),
        }
    }
}

/// Run the bulkcrop CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), BulkCropError> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let settings = Settings {
        input_dir: cli.paths.input,
        output_dir: cli.paths.output,
        templates_dir: cli.paths.templates_dir,
        ..Settings::default()
    };
    let store = settings.template_store();

    if cli.list_templates {
        return run_list(&store);
    }

    match cli.command {
        Some(Commands::Import(args)) => run_import(&store, args),
        Some(Commands::Export(args)) => run_export(&store, args),
        Some(Commands::Preview(args)) => run_preview(&settings, &store, args),
        Some(Commands::Select(args)) => run_select(&settings, &store, args),
        None => run_crop(&settings, &store, cli.template.as_deref()),
    }
}

/// Resolves the template to crop with.
///
/// An explicit name must exist. Without one, the stored `default` template
/// wins over the built-in region.
pub fn resolve_template(
    store: &TemplateStore,
    name: Option<&str>,
) -> Result<Template, TemplateError> {
    match name {
        Some(name) => store.load(name),
        None if store.contains(DEFAULT_TEMPLATE_NAME) => store.load(DEFAULT_TEMPLATE_NAME),
        None => {
            tracing::info!("no '{DEFAULT_TEMPLATE_NAME}' template stored, using built-in region");
            Ok(Template::builtin_default())
        }
    }
}

fn run_list(store: &TemplateStore) -> Result<(), BulkCropError> {
    let names = store.list()?;
    if names.is_empty() {
        println!("No templates found in '{}'.", store.dir().display());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn run_import(store: &TemplateStore, args: ImportArgs) -> Result<(), BulkCropError> {
    let identifier = store.import(&args.file, args.overwrite)?;
    println!("Imported template '{}'.", identifier);
    Ok(())
}

fn run_export(store: &TemplateStore, args: ExportArgs) -> Result<(), BulkCropError> {
    let path = store.export(&args.name, &args.destination, args.overwrite)?;
    println!("Exported template '{}' to '{}'.", args.name, path.display());
    Ok(())
}

/// Crops the input folder with a template.
fn run_crop(
    settings: &Settings,
    store: &TemplateStore,
    template_name: Option<&str>,
) -> Result<(), BulkCropError> {
    require_input(&settings.input_dir)?;

    let template = resolve_template(store, template_name)?;
    // Negative offsets clamp to 0; crop_file pads whatever lies past an image edge.
    let rect = CropRect::from_template(&template, u32::MAX, u32::MAX).ok_or_else(|| {
        BulkCropError::EmptyRegion {
            name: template.name().to_string(),
        }
    })?;

    println!("Using template '{}': {}", template.name(), rect);
    crop_and_report(settings, rect)
}

fn run_preview(
    settings: &Settings,
    store: &TemplateStore,
    args: PreviewArgs,
) -> Result<(), BulkCropError> {
    let first = first_input_image(&settings.input_dir)?;
    let (preview, scale) = preview::load_preview(&first, args.bounds.over(settings.preview))?;
    let mut canvas = preview.to_rgba8();

    let mut selection = Selection::new(scale);
    if let Some(name) = args.template.as_deref() {
        let template = store.load(name)?;
        if selection.apply_template(&template).is_none() {
            println!("Template '{}' does not fit inside the image.", template.name());
        }
    }
    if let Some(overlay) = selection.overlay() {
        preview::draw_overlay(
            &mut canvas,
            &overlay,
            preview::OVERLAY_COLOR,
            preview::OVERLAY_THICKNESS,
        );
    }

    canvas
        .save(&args.out)
        .map_err(|source| BulkCropError::Image {
            path: args.out.clone(),
            source,
        })?;

    let (width, height) = scale.preview_size();
    println!(
        "Preview of '{}' written to '{}' ({}x{}, scale {:.3}).",
        first.display(),
        args.out.display(),
        width,
        height,
        scale.scale()
    );
    println!("{}", selection.status());
    Ok(())
}

fn run_select(
    settings: &Settings,
    store: &TemplateStore,
    args: SelectArgs,
) -> Result<(), BulkCropError> {
    let first = first_input_image(&settings.input_dir)?;
    let (width, height) =
        image::image_dimensions(&first).map_err(|source| BulkCropError::Image {
            path: first.clone(),
            source,
        })?;
    let scale = preview::PreviewScale::fit(width, height, args.bounds.over(settings.preview));

    let mut selection = Selection::new(scale);
    selection.press(args.from);
    selection.motion(args.to);
    let rect = match selection.release(args.to) {
        ReleaseOutcome::Selected(rect) => rect,
        ReleaseOutcome::TooSmall | ReleaseOutcome::Ignored => {
            println!("Selection too small, try again.");
            if args.apply {
                println!("Operation cancelled before cropping.");
            }
            return Ok(());
        }
    };
    println!("{}", selection.status());

    let template = rect
        .to_template(args.save.as_deref().unwrap_or("manual"))
        .with_description(args.description.unwrap_or_default());

    if args.save.is_some() {
        let identifier = store.save(&template, args.overwrite)?;
        println!("Saved template '{}'.", identifier);
    }
    if let Some(path) = args.write.as_deref() {
        let written = write_template_file(&template, path, args.overwrite)?;
        println!("Wrote template file '{}'.", written.display());
    }
    if args.apply {
        crop_and_report(settings, rect)?;
    }
    Ok(())
}

fn crop_and_report(settings: &Settings, rect: CropRect) -> Result<(), BulkCropError> {
    let report = batch::crop_all(&settings.input_dir, &settings.output_dir, rect)?;
    if report.processed() == 0 {
        println!(
            "No PNG or JPEG images found in '{}'.",
            settings.input_dir.display()
        );
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn require_input(dir: &Path) -> Result<(), BulkCropError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(BulkCropError::InputMissing {
            path: dir.to_path_buf(),
        })
    }
}

fn first_input_image(dir: &Path) -> Result<PathBuf, BulkCropError> {
    batch::first_image(dir)?.ok_or_else(|| BulkCropError::NoImages {
        path: dir.to_path_buf(),
    })
}

/// Parses an `X,Y` pair of preview coordinates.
fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", s.trim(), e))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}
