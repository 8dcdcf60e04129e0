//! Integration tests for the vetting workflow.
//!
//! These tests drive the public API end to end over real temp folders and
//! real SQLite files: index a library, vet an incoming folder, categorize,
//! export, and compose with the review history.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use track_vetter::core::engine::MatchType;
use track_vetter::core::history::ReviewHistory;
use track_vetter::core::index::LibraryIndex;
use track_vetter::core::processing::process_folder;
use track_vetter::core::vetting::{export_new_songs, Vetter};

fn write_track(folder: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = folder.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn setup_library(dir: &TempDir) -> (LibraryIndex, PathBuf) {
    let index = LibraryIndex::open(&dir.path().join("library.db")).unwrap();

    let library = dir.path().join("library");
    std::fs::create_dir_all(&library).unwrap();
    write_track(&library, "The Beatles - Yesterday.mp3", b"yesterday master bytes");
    write_track(&library, "Artist A - Song One.mp3", b"song one master bytes");

    let vetter = Vetter::new(&index);
    let outcome = vetter.index_folder(&library).unwrap();
    assert_eq!(outcome.indexed, 2);

    (index, library)
}

#[test]
fn same_tags_in_different_case_are_exact_metadata_duplicates() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "the beatles - YESTERDAY.mp3", b"a different rip");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    let verdict = &report.duplicates[0].verdict;
    assert!(verdict.is_duplicate);
    assert_eq!(verdict.confidence, 1.0);
    assert_eq!(verdict.match_type, MatchType::ExactMetadata);
    assert!(verdict
        .best_match
        .as_ref()
        .unwrap()
        .path
        .ends_with("The Beatles - Yesterday.mp3"));
}

#[test]
fn byte_identical_file_with_different_name_is_exact_content_duplicate() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    // Unparseable name, no tags, but the same bytes as the library copy
    write_track(&incoming, "track01.mp3", b"yesterday master bytes");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    let verdict = &report.duplicates[0].verdict;
    assert_eq!(verdict.confidence, 1.0);
    assert_eq!(verdict.match_type, MatchType::ExactContent);
}

#[test]
fn near_identical_title_is_a_fuzzy_duplicate_at_low_threshold() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "Artist A - Song On.mp3", b"slightly different bytes");

    let report = vetter.vet_folder(&incoming, 0.7).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    let verdict = &report.duplicates[0].verdict;
    assert_eq!(verdict.match_type, MatchType::FuzzyMetadata);
    assert!(verdict.confidence >= 0.7);
}

#[test]
fn borderline_fuzzy_score_routes_to_uncertain() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    // Scores 0.875 against "Song One": inside the (0.7, 0.9) band
    write_track(&incoming, "Artist A - Song On.mp3", b"slightly different bytes");

    let report = vetter.vet_folder(&incoming, 0.9).unwrap();

    assert!(report.duplicates.is_empty());
    assert!(report.new_files.is_empty());
    assert_eq!(report.uncertain.len(), 1);
}

#[test]
fn unknown_track_is_new() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "Someone Else - Something New.mp3", b"new bytes");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();

    assert!(report.duplicates.is_empty());
    assert!(report.uncertain.is_empty());
    assert_eq!(report.new_files.len(), 1);
}

#[test]
fn empty_folder_produces_zero_report_without_errors() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();

    assert_eq!(report.total_files, 0);
    assert_eq!(report.duplicate_percent(), 0.0);
    assert_eq!(report.new_percent(), 0.0);
}

#[test]
fn vet_report_survives_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "the beatles - Yesterday.mp3", b"other bytes");
    write_track(&incoming, "Fresh Artist - Fresh Song.mp3", b"fresh bytes");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: track_vetter::core::vetting::VettingReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.total_files, report.total_files);
    assert_eq!(back.new_files, report.new_files);
    assert_eq!(back.duplicates.len(), report.duplicates.len());
    assert_eq!(
        back.duplicates[0].verdict.match_type,
        report.duplicates[0].verdict.match_type
    );
}

#[test]
fn exports_write_path_lists() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "Fresh Artist - Fresh Song.mp3", b"fresh bytes");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();

    let output = dir.path().join("new.txt");
    export_new_songs(&report, &output).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("Fresh Artist - Fresh Song.mp3"));
}

#[test]
fn vetting_run_is_persisted_for_audit() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "Fresh Artist - Fresh Song.mp3", b"fresh bytes");

    let report = vetter.vet_folder(&incoming, 0.8).unwrap();
    index.save_vetting_run(&report.to_run_record()).unwrap();

    let runs = index.list_vetting_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].total_files, 1);
    assert_eq!(runs[0].new_files, 1);
}

#[test]
fn processing_splits_new_files_through_history() {
    let dir = TempDir::new().unwrap();
    let (index, _) = setup_library(&dir);
    let history = ReviewHistory::open(&dir.path().join("history.db")).unwrap();
    let vetter = Vetter::new(&index);

    // Reviewed in an earlier session, under a different folder
    history
        .add(
            "Known Artist - Reviewed Track.mp3",
            Path::new("/old/delivery/Known Artist - Reviewed Track.mp3"),
        )
        .unwrap();

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "Known Artist - Reviewed Track.mp3", b"reviewed bytes");
    write_track(&incoming, "Fresh Artist - Fresh Song.mp3", b"fresh bytes");
    write_track(&incoming, "the beatles - Yesterday.mp3", b"dup bytes");

    let outcome = process_folder(&vetter, &history, &incoming, 0.8).unwrap();

    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.already_reviewed.len(), 1);
    assert_eq!(outcome.truly_new.len(), 1);

    let total = outcome.duplicates.len()
        + outcome.already_reviewed.len()
        + outcome.truly_new.len()
        + outcome.uncertain.len();
    assert_eq!(total, outcome.report.total_files);
}

#[test]
fn soft_deleted_tracks_no_longer_count_as_duplicates() {
    let dir = TempDir::new().unwrap();
    let (index, library) = setup_library(&dir);
    let vetter = Vetter::new(&index);

    let incoming = dir.path().join("incoming");
    std::fs::create_dir_all(&incoming).unwrap();
    write_track(&incoming, "the beatles - Yesterday.mp3", b"another rip");

    let before = vetter.vet_folder(&incoming, 0.8).unwrap();
    assert_eq!(before.duplicates.len(), 1);

    index
        .mark_inactive(&library.join("The Beatles - Yesterday.mp3"))
        .unwrap();

    let after = vetter.vet_folder(&incoming, 0.8).unwrap();
    assert!(after.duplicates.is_empty());
    assert_eq!(after.new_files.len(), 1);
}
