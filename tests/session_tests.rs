use patch_review::editor::LineBuffer;
use patch_review::engine::{apply_all, apply_selected};
use patch_review::parser::parse_diff;
use patch_review::session::{HunkState, ReviewSession, SessionError};
use std::collections::HashSet;

fn parse_single_file(diff: &str) -> patch_review::model::FileDiff {
    let mut files = parse_diff(diff).unwrap();
    assert_eq!(files.len(), 1);
    files.remove(0)
}

#[test]
fn batch_and_interactive_paths_agree() {
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
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
"#;
    let original = "a\nb\nc\nd\ne\nf\n";
    let file = parse_single_file(diff);

    let batch = apply_all(original, &file.hunks);

    let mut session = ReviewSession::new(file, LineBuffer::from_text(original));
    for i in 0..session.hunk_count() {
        session.apply_hunk(i).unwrap();
    }
    assert!(session.is_finished());
    let interactive = session.into_document().to_text();

    assert_eq!(batch, interactive);
    assert_eq!(batch, "a\nB\nc\nd\nE\nf\n");
}

#[test]
fn interactive_offsets_accumulate_across_an_insertion() {
    // First hunk inserts two lines before line 1, second replaces old
    // line 5. After the insertion the replacement must land at 0-based
    // line 6 of the live document.
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
@@ -0,0 +1,2 @@
+x
+y
@@ -5,1 +7,1 @@
-e
+E
"#;
    let original = "a\nb\nc\nd\ne\nf\n";
    let file = parse_single_file(diff);

    let mut session = ReviewSession::new(file, LineBuffer::from_text(original));
    session.apply_hunk(0).unwrap();
    assert_eq!(session.net_line_delta(0), Some(2));
    assert_eq!(session.adjusted_start_line(1).unwrap(), 6);

    session.apply_hunk(1).unwrap();
    assert!(session.is_finished());
    assert_eq!(
        session.into_document().to_text(),
        "x\ny\na\nb\nc\nd\nE\nf\n"
    );
}

#[test]
fn skipping_a_hunk_leaves_later_offsets_unshifted() {
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
@@ -0,0 +1,2 @@
+x
+y
@@ -5,1 +7,1 @@
-e
+E
"#;
    let original = "a\nb\nc\nd\ne\nf\n";
    let file = parse_single_file(diff);

    let mut session = ReviewSession::new(file, LineBuffer::from_text(original));
    session.skip_hunk(0).unwrap();
    assert_eq!(session.net_line_delta(0), None);
    assert_eq!(session.adjusted_start_line(1).unwrap(), 4);

    session.apply_hunk(1).unwrap();
    assert_eq!(session.into_document().to_text(), "a\nb\nc\nd\nE\nf\n");
}

#[test]
fn selected_subset_against_pristine_content() {
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
@@ -2,1 +2,1 @@
-foo
+bar
"#;
    let original = "line1\nfoo\nline3\n";
    let file = parse_single_file(diff);

    let all: HashSet<usize> = [0].into_iter().collect();
    assert_eq!(
        apply_selected(original, &file.hunks, &all),
        "line1\nbar\nline3\n"
    );

    let none = HashSet::new();
    assert_eq!(apply_selected(original, &file.hunks, &none), original);
}

#[test]
fn bulk_apply_halts_on_a_drifted_document() {
    // The document is shorter than the second hunk expects, so the
    // editor rejects that edit; the first hunk stays applied and the
    // session stays open.
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
@@ -1,1 +1,1 @@
-a
+A
@@ -50,1 +50,1 @@
-zz
+ZZ
@@ -60,1 +60,1 @@
-qq
+QQ
"#;
    let original = "a\nb\nc\n";
    let file = parse_single_file(diff);

    let mut session = ReviewSession::new(file, LineBuffer::from_text(original));
    let err = session.apply_all_remaining().unwrap_err();
    assert!(matches!(err, SessionError::EditRejected { index: 1, .. }));

    assert_eq!(session.state(0), Some(HunkState::Applied));
    assert_eq!(session.state(1), Some(HunkState::Pending));
    assert_eq!(session.state(2), Some(HunkState::Pending));
    assert!(!session.is_finished());

    // The user can still resolve the stragglers by skipping them.
    session.skip_hunk(1).unwrap();
    session.skip_hunk(2).unwrap();
    assert!(session.is_finished());
    assert_eq!(session.into_document().to_text(), "A\nb\nc\n");
}

#[test]
fn review_of_a_parsed_new_file_diff_builds_it_from_nothing() {
    let diff = r#"diff --git a/new.txt b/new.txt
new file mode 100644
--- /dev/null
+++ b/new.txt
@@ -0,0 +1,3 @@
+one
+two
+three
"#;
    let file = parse_single_file(diff);

    let mut session = ReviewSession::new(file, LineBuffer::from_text(""));
    session.apply_all_remaining().unwrap();
    assert!(session.is_finished());
    assert_eq!(session.into_document().to_text(), "one\ntwo\nthree");
}

#[test]
fn adjusted_start_lines_match_headers_before_any_work() {
    let diff = r#"--- a/demo.txt
+++ b/demo.txt
@@ -2,1 +2,1 @@
-b
+B
@@ -8,1 +8,1 @@
-h
+H
"#;
    let file = parse_single_file(diff);
    let session = ReviewSession::new(file, LineBuffer::from_text("a\nb\nc\nd\ne\nf\ng\nh\n"));

    assert_eq!(session.adjusted_start_line(0).unwrap(), 1);
    assert_eq!(session.adjusted_start_line(1).unwrap(), 7);
    assert!(matches!(
        session.adjusted_start_line(2),
        Err(SessionError::InvalidHunkIndex(2))
    ));
}
