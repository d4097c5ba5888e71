//! Integration tests for the template store and applying templates.

use std::fs;

use bulkcrop::batch::crop_all;
use bulkcrop::geometry::CropRect;
use bulkcrop::template::{Template, TemplateStore};
use bulkcrop::TemplateError;

mod common;
use common::{dimensions, write_png};

#[test]
fn import_export_load_cycle() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = TemplateStore::new(temp.path().join("templates"));

    let source = temp.path().join("Product Shot.json");
    let content = r#"{"description": "shop thumbnails", "left": 40, "top": 30, "width": 64}"#;
    fs::write(&source, content).expect("write source template");

    let id = store.import(&source, false).expect("import template");
    assert_eq!(id, "product_shot");
    assert_eq!(store.list().unwrap(), vec!["product_shot"]);

    let template = store.load(&id).expect("load imported template");
    assert_eq!(template.name(), "product_shot");
    assert_eq!(template.description(), "shop thumbnails");
    assert_eq!(template.bounds(), (40, 30, 104, 94));

    let exported = store
        .export(&id, &temp.path().join("exported.txt"), false)
        .expect("export template");
    assert_eq!(exported, temp.path().join("exported.txt.json"));
    assert_eq!(fs::read_to_string(exported).unwrap(), content);
}

#[test]
fn declared_name_drives_identifier() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = TemplateStore::new(temp.path().join("templates"));
    let source = temp.path().join("whatever.json");
    fs::write(
        &source,
        r#"{"name": "Team  Photos / 2024", "left": 0, "top": 0, "size": 8}"#,
    )
    .unwrap();

    assert_eq!(store.import(&source, false).unwrap(), "team_photos_2024");
    assert_eq!(store.import(&source, false).unwrap(), "team_photos_2024_2");
}

#[test]
fn missing_template_hint_lists_names() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = TemplateStore::new(temp.path());
    fs::write(store.path_for("a").unwrap(), r#"{"left": 0, "top": 0, "size": 1}"#).unwrap();
    fs::write(store.path_for("b").unwrap(), r#"{"left": 0, "top": 0, "size": 1}"#).unwrap();

    let message = store.load("c").unwrap_err().to_string();
    assert!(message.contains("Template 'c' not found"));
    assert!(message.ends_with("Available: a, b."));
}

#[test]
fn unreadable_import_source_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let store = TemplateStore::new(temp.path().join("templates"));
    assert!(matches!(
        store.import(&temp.path().join("missing.json"), false),
        Err(TemplateError::Read { .. })
    ));
}

#[test]
fn corner_template_crops_top_left() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("input");
    write_png(&input.join("photo.png"), 200, 150);

    let template = Template::from_json_str(
        r#"{"left": 0, "top": 0, "width": 100, "height": 100}"#,
        "corner",
    )
    .unwrap();
    let rect = CropRect::from_template(&template, 200, 150).unwrap();

    let output = temp.path().join("output");
    let report = crop_all(&input, &output, rect).unwrap();
    assert_eq!(report.processed(), 1);
    assert_eq!(dimensions(&output.join("photo.png")), (100, 100));

    let pixel = *image::open(output.join("photo.png"))
        .unwrap()
        .to_rgb8()
        .get_pixel(42, 7);
    assert_eq!(pixel, image::Rgb([42, 7, 0]));
}
