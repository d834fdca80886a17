use anyhow::Result;
use serde_json::json;
use template_sync::{
    changes::full_change_set,
    clients::store::{LocalTemplateStore, StoreError},
    models::{change::ChangeRecord, registry::FolderRegistry},
};

use crate::common::{CART_FOLDER, NEWSLETTER_FOLDER, record, write_local};

/// Test: A written pair reads back with the body split from the metadata
#[test]
fn test_write_then_read_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    let metadata = record(json!({
        "templateId": 101,
        "name": "Cart Reminder",
        "html": "<p>embedded copy</p>",
        "mergeDataFeedContext": false,
    }));
    let html = "<html><body>Come back!</body></html>";

    let name = store.write(CART_FOLDER, "Cart Reminder", &metadata, html)?;
    assert_eq!(name, "cart_reminder");

    let template = store.read(CART_FOLDER, &name)?;

    assert!(!template.metadata.contains_key("html"));
    assert_eq!(template.metadata["templateId"], json!(101));
    assert_eq!(template.metadata["mergeDataFeedContext"], json!(false));
    assert_eq!(template.html, html);

    Ok(())
}

/// Test: Metadata is written as 4-space indented JSON
#[test]
fn test_metadata_is_pretty_printed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    store.write(CART_FOLDER, "pretty", &record(json!({ "name": "pretty" })), "")?;

    let raw = std::fs::read_to_string(store.metadata_path(CART_FOLDER, "pretty"))?;
    assert_eq!(raw, "{\n    \"name\": \"pretty\"\n}");

    Ok(())
}

/// Test: Names that sanitize identically overwrite each other
#[test]
fn test_sanitization_collision_overwrites() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    store.write(CART_FOLDER, "Sale!", &record(json!({ "v": 1 })), "first")?;
    store.write(CART_FOLDER, "sale?", &record(json!({ "v": 2 })), "second")?;

    assert_eq!(store.list_candidates(CART_FOLDER)?, vec!["sale_".to_string()]);

    let template = store.read(CART_FOLDER, "sale_")?;
    assert_eq!(template.metadata["v"], json!(2));
    assert_eq!(template.html, "second");

    Ok(())
}

/// Test: A template with only one of its two files is reported as a missing pair
#[test]
fn test_missing_html_is_missing_pair() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    write_local(&store, CART_FOLDER, "orphan");
    std::fs::remove_file(store.html_path(CART_FOLDER, "orphan"))?;

    let result = store.read(CART_FOLDER, "orphan");
    assert!(
        matches!(result, Err(StoreError::MissingPair { .. })),
        "Expected missing pair, got: {:?}",
        result
    );

    Ok(())
}

/// Test: Metadata that is not a JSON object is rejected
#[test]
fn test_non_object_metadata_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    write_local(&store, CART_FOLDER, "broken");
    std::fs::write(store.metadata_path(CART_FOLDER, "broken"), "[1, 2, 3]")?;

    assert!(matches!(
        store.read(CART_FOLDER, "broken"),
        Err(StoreError::Json { .. })
    ));

    Ok(())
}

/// Test: Candidates come only from metadata files
#[test]
fn test_list_candidates_uses_metadata_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());

    write_local(&store, CART_FOLDER, "beta");
    write_local(&store, CART_FOLDER, "alpha");
    std::fs::write(dir.path().join(CART_FOLDER).join("stray.html"), "<p/>")?;
    std::fs::write(dir.path().join(CART_FOLDER).join("notes.txt"), "notes")?;

    assert_eq!(
        store.list_candidates(CART_FOLDER)?,
        vec!["alpha".to_string(), "beta".to_string()]
    );
    assert!(store.list_candidates("does/not/exist")?.is_empty());

    Ok(())
}

/// Test: A full scan finds every template under existing registry folders
#[test]
fn test_full_change_set_covers_every_existing_folder() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalTemplateStore::new(dir.path());
    let registry = FolderRegistry::default();

    write_local(&store, CART_FOLDER, "cart_one");
    write_local(&store, CART_FOLDER, "cart_two");
    write_local(&store, NEWSLETTER_FOLDER, "issue_1");
    write_local(&store, "unmapped/folder", "ignored");

    let first = full_change_set(&registry, &store)?;
    let second = full_change_set(&registry, &store)?;

    let expected = [
        ChangeRecord::new(CART_FOLDER, "cart_one"),
        ChangeRecord::new(CART_FOLDER, "cart_two"),
        ChangeRecord::new(NEWSLETTER_FOLDER, "issue_1"),
    ];

    assert_eq!(first.len(), 3);
    assert!(expected.iter().all(|change| first.contains(change)));
    assert_eq!(first, second, "Full scan should be idempotent");

    Ok(())
}

/// Test: A registry file overrides the built-in folder table
#[test]
fn test_registry_loaded_from_json_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("folders.json");
    std::fs::write(&path, r#"{ "1": "templates/transactional/receipts_1" }"#)?;

    let registry = FolderRegistry::from_json_file(&path)?;

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.folder_for("1"),
        "templates/transactional/receipts_1"
    );
    assert_eq!(registry.folder_for("64268"), "unknown");

    Ok(())
}
