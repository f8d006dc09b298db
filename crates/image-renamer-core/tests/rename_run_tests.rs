mod common;

use common::Workspace;
use image_renamer_core::report::{DUPLICATE_REPORT, UNMATCHED_REPORT};
use image_renamer_core::{Config, Error, ImageRenamer};

#[test]
fn test_duplicate_rows_fan_out_and_leftovers_are_quarantined() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "a.jpg;1", "a.jpg;2", "b.jpg;3"]);
    ws.add_image("a.jpg");
    ws.add_image("b.jpg");
    ws.add_image("c.jpg");

    let summary = ImageRenamer::new(ws.config()).unwrap().run().unwrap();

    assert_eq!(ws.read("images/1.jpg"), "a.jpg");
    assert_eq!(ws.read("images/2.jpg"), "a.jpg");
    assert_eq!(ws.read("images/3.jpg"), "b.jpg");
    assert!(!ws.exists("images/a.jpg"));
    assert!(!ws.exists("images/b.jpg"));
    assert!(!ws.exists("images/c.jpg"));
    assert_eq!(ws.read("NOT_USED_IMAGES/c.jpg"), "c.jpg");

    assert_eq!(
        ws.read(DUPLICATE_REPORT),
        "{\"IMAGE\":\"a.jpg\",\"ID\":\"2\"}"
    );
    assert!(!ws.exists(UNMATCHED_REPORT));

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.unique_rows, 2);
    assert_eq!(summary.duplicate_rows, 1);
    assert_eq!(summary.renamed, 2);
    assert_eq!(summary.copies, 1);
    assert_eq!(summary.leftovers, 1);
    assert_eq!(summary.relocation_failures, 0);
}

#[test]
fn test_missing_image_is_reported_and_run_succeeds() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "missing.jpg;10", "b.jpg;11"]);
    ws.add_image("b.jpg");

    let summary = ImageRenamer::new(ws.config()).unwrap().run().unwrap();

    assert_eq!(ws.read(UNMATCHED_REPORT), "missing.jpg");
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.renamed, 1);
    assert!(ws.exists("images/11.jpg"));
    assert!(!ws.exists(DUPLICATE_REPORT));
}

#[test]
fn test_rows_missing_fields_are_skipped_not_unmatched() {
    let ws = Workspace::new();
    ws.write_manifest(&["NAME;IMAGE;ID", "Chair;a.jpg;", "Table;;5", "Lamp;c.jpg;6"]);
    ws.add_image("a.jpg");
    ws.add_image("c.jpg");

    let summary = ImageRenamer::new(ws.config()).unwrap().run().unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.not_found, 0);
    assert!(!ws.exists(UNMATCHED_REPORT));
    assert!(ws.exists("images/6.jpg"));
    // Never renamed, so it is treated as unused
    assert!(ws.exists("NOT_USED_IMAGES/a.jpg"));
}

#[test]
fn test_nested_images_keep_their_directory() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "boot.png;B-1", "boot.png;B-2"]);
    ws.add_image("shoes/winter/boot.png");
    ws.add_image("shoes/summer/sandal.png");

    let summary = ImageRenamer::new(ws.config()).unwrap().run().unwrap();

    assert_eq!(summary.renamed, 1);
    assert_eq!(ws.read("images/shoes/winter/B-1.png"), "shoes/winter/boot.png");
    assert_eq!(ws.read("images/shoes/winter/B-2.png"), "shoes/winter/boot.png");
    assert_eq!(
        ws.read("NOT_USED_IMAGES/shoes/summer/sandal.png"),
        "shoes/summer/sandal.png"
    );
}

#[test]
fn test_many_rows_across_many_workers() {
    let ws = Workspace::new();
    let mut lines = vec!["IMAGE;ID".to_string()];
    for i in 0..50 {
        ws.add_image(&format!("dir{}/img{}.jpg", i % 4, i));
        lines.push(format!("img{}.jpg;P{}", i, i));
    }
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    ws.write_manifest(&line_refs);

    let config = Config {
        workers: 7,
        ..ws.config()
    };
    let summary = ImageRenamer::new(config).unwrap().run().unwrap();

    assert_eq!(summary.renamed, 50);
    assert_eq!(summary.leftovers, 0);
    for i in 0..50 {
        assert!(ws.exists(&format!("images/dir{}/P{}.jpg", i % 4, i)));
    }
    assert!(!ws.quarantine().exists());
}

#[test]
fn test_dry_run_changes_nothing_but_reports() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "a.jpg;1", "a.jpg;2", "ghost.jpg;3"]);
    ws.add_image("a.jpg");
    ws.add_image("c.jpg");

    let config = Config {
        dry_run: true,
        ..ws.config()
    };
    let summary = ImageRenamer::new(config).unwrap().run().unwrap();

    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.copies, 1);
    assert_eq!(summary.leftovers, 1);
    assert!(ws.exists("images/a.jpg"));
    assert!(ws.exists("images/c.jpg"));
    assert!(!ws.exists("images/1.jpg"));
    assert!(!ws.quarantine().exists());
    assert!(ws.exists(DUPLICATE_REPORT));
    assert_eq!(ws.read(UNMATCHED_REPORT), "ghost.jpg");
}

#[test]
fn test_manifest_is_located_automatically() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "a.jpg;1"]);
    ws.add_image("a.jpg");

    let renamer = ImageRenamer::new(ws.config()).unwrap();
    assert_eq!(renamer.manifest_path().unwrap(), ws.root().join("manifest.csv"));

    let summary = renamer.run().unwrap();
    assert_eq!(summary.manifest, ws.root().join("manifest.csv"));
    assert!(ws.exists("images/1.jpg"));
}

#[test]
fn test_unreadable_manifest_aborts_before_touching_images() {
    let ws = Workspace::new();
    ws.add_image("a.jpg");

    let config = Config {
        manifest: Some(ws.root().join("does-not-exist.csv")),
        ..ws.config()
    };
    let result = ImageRenamer::new(config).unwrap().run();

    assert!(matches!(result, Err(Error::ManifestRead { .. })));
    assert!(ws.exists("images/a.jpg"));
    assert!(!ws.quarantine().exists());
}

#[test]
fn test_no_manifest_found_is_fatal() {
    let ws = Workspace::new();
    ws.add_image("a.jpg");

    let result = ImageRenamer::new(ws.config()).unwrap().run();
    assert!(matches!(result, Err(Error::ManifestNotFound(_))));
}

#[test]
fn test_invalid_worker_count_is_rejected() {
    let ws = Workspace::new();
    let config = Config {
        workers: 0,
        ..ws.config()
    };
    assert!(matches!(
        ImageRenamer::new(config),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_repeated_id_equal_to_image_name_keeps_both_files() {
    let ws = Workspace::new();
    ws.write_manifest(&["IMAGE;ID", "2.jpg;1", "2.jpg;2"]);
    ws.add_image("2.jpg");

    let summary = ImageRenamer::new(ws.config()).unwrap().run().unwrap();

    assert_eq!(ws.read("images/1.jpg"), "2.jpg");
    assert_eq!(ws.read("images/2.jpg"), "2.jpg");
    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.copies, 1);
    assert_eq!(summary.leftovers, 0);
}
