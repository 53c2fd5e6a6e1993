use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_patch(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let patch = dir.join("change.patch");
    fs::write(&patch, contents).unwrap();
    patch
}

const REPLACE_PATCH: &str = "--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@
 line1
-foo
+bar
 line3
";

#[test]
fn apply_rewrites_the_target_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "line1\nfoo\nline3\n").unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 1/1 hunks"));

    let result = fs::read_to_string(dir.path().join("file.txt")).unwrap();
    assert_eq!(result, "line1\nbar\nline3\n");
}

#[test]
fn dry_run_prints_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "line1\nfoo\nline3\n").unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("line1\nbar\nline3\n"));

    // Target untouched.
    let result = fs::read_to_string(dir.path().join("file.txt")).unwrap();
    assert_eq!(result, "line1\nfoo\nline3\n");
}

#[test]
fn hunk_selection_applies_a_subset() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "a\nb\nc\nd\ne\nf\n").unwrap();
    let patch = write_patch(
        dir.path(),
        "--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@
 a
-b
+B
 c
@@ -4,3 +4,3 @@
 d
-e
+E
 f
",
    );

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .arg("--hunks")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 1/2 hunks"));

    let result = fs::read_to_string(dir.path().join("file.txt")).unwrap();
    assert_eq!(result, "a\nb\nc\nd\nE\nf\n");
}

#[test]
fn apply_creates_a_new_file_from_dev_null() {
    let dir = tempfile::tempdir().unwrap();
    let patch = write_patch(
        dir.path(),
        "--- /dev/null
+++ b/fresh.txt
@@ -0,0 +1,2 @@
+hello
+world
",
    );

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();

    let result = fs::read_to_string(dir.path().join("fresh.txt")).unwrap();
    assert_eq!(result, "hello\nworld");
}

#[test]
fn apply_fails_when_the_target_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn apply_fails_on_a_malformed_patch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "line1\n").unwrap();
    let patch = write_patch(
        dir.path(),
        "--- a/file.txt
+++ b/file.txt
@@ -1,5 +1,1 @@
-line1
+changed
",
    );

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn apply_rejects_an_invalid_hunk_selection() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "line1\nfoo\nline3\n").unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("apply")
        .arg(&patch)
        .arg("--dir")
        .arg(dir.path())
        .arg("--hunks")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1-based"));
}

#[test]
fn show_prints_a_hunk_summary() {
    let dir = tempfile::tempdir().unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("show")
        .arg(&patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("M file.txt (1 hunks)"))
        .stdout(predicate::str::contains("#1 @@ -1,3 +1,3 @@  (+1/-1)"));
}

#[test]
fn show_does_not_need_target_files() {
    let dir = tempfile::tempdir().unwrap();
    let patch = write_patch(dir.path(), REPLACE_PATCH);

    // No file.txt anywhere near the patch; show must still work.
    Command::cargo_bin("patch-review")
        .unwrap()
        .arg("show")
        .arg(&patch)
        .assert()
        .success();
}
