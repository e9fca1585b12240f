//! Integration tests for the ScanMaster CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a scanmaster command
fn scanmaster() -> Command {
    let mut cmd = Command::cargo_bin("scanmaster").unwrap();
    cmd.env_remove("SCANMASTER_AUTHOR")
        .env_remove("SCANMASTER_EDITOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a part and return its ID
fn create_part(tmp: &TempDir, args: &[&str]) -> String {
    let output = scanmaster()
        .current_dir(tmp.path())
        .args(["part", "new", "-f", "id"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "part new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn create_sleeve(tmp: &TempDir) -> String {
    create_part(
        tmp,
        &[
            "--title", "Sleeve", "--type", "tube", "--od", "100", "--id", "80", "--length", "30",
        ],
    )
}

// ============================================================================
// Basic commands
// ============================================================================

#[test]
fn test_help_displays() {
    scanmaster()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("part"));
}

#[test]
fn test_version_displays() {
    scanmaster()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scanmaster"));
}

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ScanMaster project"));

    assert!(tmp.path().join(".scanmaster/config.yaml").exists());
    assert!(tmp.path().join(".scanmaster/custom_items.yaml").exists());
    assert!(tmp.path().join("parts").is_dir());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    scanmaster()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Classify
// ============================================================================

#[test]
fn test_classify_short_hollow_part_is_ring() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["classify", "--type", "tube", "--od", "100", "--id", "80", "--length", "49"])
        .assert()
        .success()
        .stdout("ring\n");
}

#[test]
fn test_classify_threshold_is_exclusive() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["classify", "--type", "ring", "--od", "100", "--id", "80", "--length", "50"])
        .assert()
        .success()
        .stdout("tube\n");
}

#[test]
fn test_classify_solid_round_part() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["classify", "--type", "cylinder", "--diameter", "200", "--length", "20"])
        .assert()
        .success()
        .stdout("disk\n");
}

#[test]
fn test_classify_rectangular_part() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args([
            "classify", "--type", "box", "--length", "300", "--width", "200", "--thickness", "10",
        ])
        .assert()
        .success()
        .stdout("plate\n");
}

#[test]
fn test_classify_json_explains_rule() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args([
            "classify", "--type", "tube", "--od", "100", "--id", "80", "--length", "30", "-f",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("length_to_wall"))
        .stdout(predicate::str::contains("\"geometry\": \"ring\""));
}

#[test]
fn test_classify_keeps_hollow_tag_without_bore() {
    let tmp = TempDir::new().unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["classify", "--type", "tube", "--od", "100", "--length", "30", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tube"))
        .stdout(predicate::str::contains("hollow geometry kept"));
}

#[test]
fn test_classify_rejects_unknown_tag() {
    scanmaster()
        .args(["classify", "--type", "blob", "--od", "10"])
        .assert()
        .failure();
}

// ============================================================================
// Parts
// ============================================================================

#[test]
fn test_part_new_classifies_and_writes_file() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);
    assert!(id.starts_with("PART-"), "unexpected id: {}", id);

    let path = tmp.path().join("parts").join(format!("{}.sm.yaml", id));
    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("geometry: ring"));
    assert!(content.contains("wall_thickness: 10"));
}

#[test]
fn test_part_new_no_classify_keeps_tag() {
    let tmp = setup_test_project();
    let id = create_part(
        &tmp,
        &[
            "--title", "Sleeve", "--type", "tube", "--od", "100", "--id", "80", "--length", "30",
            "--no-classify",
        ],
    );

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "show", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"geometry\": \"tube\""));
}

#[test]
fn test_part_new_requires_title() {
    let tmp = setup_test_project();
    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "new", "--type", "tube"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Title is required"));
}

#[test]
fn test_part_list_and_filters() {
    let tmp = setup_test_project();
    let sleeve = create_sleeve(&tmp);
    let plate = create_part(
        &tmp,
        &[
            "--title", "Cover", "--type", "box", "--length", "300", "--width", "200",
            "--thickness", "10",
        ],
    );

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&sleeve))
        .stdout(predicate::str::contains(&plate));

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list", "--family", "rectangular", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&plate))
        .stdout(predicate::str::contains(&sleeve).not());

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_part_list_empty() {
    let tmp = setup_test_project();
    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No parts found"));
}

#[test]
fn test_part_show_by_prefix() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);
    let prefix = &id[..12];

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "show", prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sleeve"))
        .stdout(predicate::str::contains("(derived)"));
}

#[test]
fn test_part_show_unknown_id_fails() {
    let tmp = setup_test_project();
    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "show", "PART-NOPE"])
        .assert()
        .failure();
}

#[test]
fn test_part_set_length_reclassifies() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id, "--length", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ring"))
        .stdout(predicate::str::contains("tube"));

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "show", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"geometry\": \"tube\""))
        .stdout(predicate::str::contains("\"entity_revision\": 2"));
}

#[test]
fn test_part_set_derived_wall_rejected() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id, "--wall", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("derived"));
}

#[test]
fn test_rejected_set_does_not_remember_material() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id, "--material", "Hastelloy X", "--wall", "5"])
        .assert()
        .failure();

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "list", "material", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hastelloy").not());

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id, "--material", "Hastelloy X"])
        .assert()
        .success();

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "list", "material", "-f", "id"])
        .assert()
        .success()
        .stdout("Hastelloy X\n");
}

#[test]
fn test_part_classify_uses_derived_wall() {
    let tmp = setup_test_project();
    let id = create_part(
        &tmp,
        &[
            "--title", "Liner", "--type", "tube", "--od", "100", "--id", "80", "--length", "60",
            "--no-classify",
        ],
    );
    let path = tmp.path().join("parts").join(format!("{}.sm.yaml", id));
    let content = fs::read_to_string(&path).unwrap();
    let stale = content.replace("wall_thickness: 10", "wall_thickness: 20");
    assert_ne!(stale, content);
    fs::write(&path, stale).unwrap();

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "classify", &id])
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("geometry: tube"));
    assert!(content.contains("wall_thickness: 10"));
}

#[test]
fn test_part_set_explicit_geometry_is_kept() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id, "--type", "bushing"])
        .assert()
        .success();

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "show", &id, "-f", "id"])
        .assert()
        .success();

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "list", "--type", "bushing", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));
}

#[test]
fn test_part_set_nothing_fails() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "set", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_part_classify_dry_run_leaves_file() {
    let tmp = setup_test_project();
    let id = create_part(
        &tmp,
        &[
            "--title", "Sleeve", "--type", "tube", "--od", "100", "--id", "80", "--length", "30",
            "--no-classify",
        ],
    );
    let path = tmp.path().join("parts").join(format!("{}.sm.yaml", id));
    let before = fs::read_to_string(&path).unwrap();

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "classify", &id, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ring"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);

    scanmaster()
        .current_dir(tmp.path())
        .args(["part", "classify", &id])
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("geometry: ring"));
}

// ============================================================================
// Custom items
// ============================================================================

#[test]
fn test_custom_add_and_list() {
    let tmp = setup_test_project();

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "add", "material", "Inconel 718"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"));

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "add", "Material", "inconel 718"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "list", "material", "-f", "id"])
        .assert()
        .success()
        .stdout("Inconel 718\n");
}

#[test]
fn test_part_material_is_remembered() {
    let tmp = setup_test_project();
    create_part(
        &tmp,
        &["--title", "Hub", "--type", "disk", "--material", "Ti-6Al-4V"],
    );

    scanmaster()
        .current_dir(tmp.path())
        .args(["custom", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("material\tTi-6Al-4V"));
}

// ============================================================================
// Solid jobs
// ============================================================================

#[test]
fn test_solid_from_ring_part() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .args(["solid", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("SketchCircle"))
        .stdout(predicate::str::contains("Extrude"));
}

#[test]
fn test_solid_check_valid_and_invalid() {
    let tmp = setup_test_project();
    let id = create_sleeve(&tmp);
    let job = tmp.path().join("job.json");

    scanmaster()
        .current_dir(tmp.path())
        .args(["solid", &id, "-o", "job.json"])
        .assert()
        .success();

    scanmaster()
        .current_dir(tmp.path())
        .args(["solid", "--check", job.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid solid job"));

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, r#"{"id": "empty", "operations": []}"#).unwrap();
    scanmaster()
        .current_dir(tmp.path())
        .args(["solid", "--check", bad.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_solid_unsupported_geometry_fails() {
    let tmp = setup_test_project();
    let id = create_part(&tmp, &["--title", "Ball", "--type", "sphere", "--od", "40"]);

    scanmaster()
        .current_dir(tmp.path())
        .args(["solid", &id])
        .assert()
        .failure();
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn test_validate_clean_project() {
    let tmp = setup_test_project();
    create_sleeve(&tmp);

    scanmaster()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));
}

#[test]
fn test_validate_reports_schema_errors() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join("parts/broken.sm.yaml"),
        "id: PART-01HQ3K4N5M6P7Q8R9S0T1V2W3X\ntitle: Broken\ngeometry: blob\ncreated: 2024-01-01T00:00:00Z\nauthor: tester\n",
    )
    .unwrap();

    scanmaster()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn test_validate_strict_flags_misclassified_part() {
    let tmp = setup_test_project();
    create_part(
        &tmp,
        &[
            "--title", "Sleeve", "--type", "tube", "--od", "100", "--id", "80", "--length", "30",
            "--no-classify",
        ],
    );

    scanmaster()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("should be ring"));

    scanmaster()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();

    scanmaster()
        .current_dir(tmp.path())
        .args(["validate", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(fixed)"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    scanmaster()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scanmaster"));
}
