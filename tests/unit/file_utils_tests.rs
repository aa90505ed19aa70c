/*!
 * Tests for file and staging directory utilities
 */

use std::path::{Path, PathBuf};

use vertisub::file_utils::{FileManager, FINAL_DIR, SEGMENTS_DIR, SUBS_DIR, WAV_DIR};

use crate::common;

/// The staging layout creates all four working directories
#[test]
fn test_ensure_staging_dirs_shouldCreateFullLayout() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dirs = FileManager::ensure_staging_dirs(temp_dir.path()).unwrap();

    assert_eq!(dirs.segments, temp_dir.path().join(SEGMENTS_DIR));
    assert_eq!(dirs.wav, temp_dir.path().join(WAV_DIR));
    assert_eq!(dirs.subs, temp_dir.path().join(SUBS_DIR));
    assert_eq!(dirs.finals, temp_dir.path().join(FINAL_DIR));

    for dir in [&dirs.segments, &dirs.wav, &dirs.subs, &dirs.finals] {
        assert!(FileManager::dir_exists(dir));
    }
}

/// Creating staging dirs twice is harmless
#[test]
fn test_ensure_staging_dirs_whenCalledTwice_shouldSucceed() {
    let temp_dir = common::create_temp_dir().unwrap();
    FileManager::ensure_staging_dirs(temp_dir.path()).unwrap();
    assert!(FileManager::ensure_staging_dirs(temp_dir.path()).is_ok());
}

/// The final artifact name derives from the input stem
#[test]
fn test_final_output_name_withInputPath_shouldAppendSuffix() {
    assert_eq!(
        FileManager::final_output_name(Path::new("/videos/lecture.mkv")),
        "lecture_vertical.mp4"
    );
    assert_eq!(
        FileManager::final_output_name(Path::new("talk.mp4")),
        "talk_vertical.mp4"
    );
}

/// Video detection is extension-based and case-insensitive
#[test]
fn test_is_video_file_withVariousExtensions_shouldDetectVideos() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();

    let video = common::create_test_file(&dir, "clip.MP4", "x").unwrap();
    let other = common::create_test_file(&dir, "notes.txt", "x").unwrap();
    let bare = common::create_test_file(&dir, "noext", "x").unwrap();

    assert!(FileManager::is_video_file(&video));
    assert!(!FileManager::is_video_file(&other));
    assert!(!FileManager::is_video_file(&bare));
    // Directories are never videos
    assert!(!FileManager::is_video_file(temp_dir.path()));
}

/// find_files locates files by extension, recursively
#[test]
fn test_find_files_withExtension_shouldFindRecursively() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();

    common::create_test_file(&dir, "a.srt", "1").unwrap();
    common::create_test_file(&dir, "b.txt", "2").unwrap();
    let nested = dir.join("nested");
    FileManager::ensure_dir(&nested).unwrap();
    common::create_test_file(&nested, "c.srt", "3").unwrap();

    let found = FileManager::find_files(&dir, "srt").unwrap();
    assert_eq!(found.len(), 2);

    // A leading dot in the extension is accepted too
    let found_dotted = FileManager::find_files(&dir, ".srt").unwrap();
    assert_eq!(found_dotted.len(), 2);
}

/// Video discovery stays at the top level and never picks up the staging
/// clips of an earlier run
#[test]
fn test_list_videos_shouldIgnoreNestedOutputTrees() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();

    common::create_test_file(&dir, "talk.mp4", "x").unwrap();
    common::create_test_file(&dir, "lecture.mkv", "x").unwrap();
    common::create_test_file(&dir, "notes.txt", "x").unwrap();

    // Output tree left behind by a previous folder run
    let staging = dir.join("talk_vertisub").join("segments");
    FileManager::ensure_dir(&staging).unwrap();
    common::create_test_file(&staging, "clip_00.mp4", "x").unwrap();

    let videos = FileManager::list_videos(&dir).unwrap();

    assert_eq!(videos.len(), 2);
    // Sorted by path
    assert!(videos[0].ends_with("lecture.mkv"));
    assert!(videos[1].ends_with("talk.mp4"));
}

/// write_to_file creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("deep").join("nested").join("cues.srt");

    FileManager::write_to_file(&path, "1\n00:00:00,000 --> 00:00:01,000\nhi\n").unwrap();

    assert!(FileManager::file_exists(&path));
    let content = FileManager::read_to_string(&path).unwrap();
    assert!(content.contains("hi"));
}

/// Removing a missing file or directory is not an error
#[test]
fn test_remove_if_exists_withMissingTargets_shouldSucceed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let missing_file = temp_dir.path().join("nope.mp4");
    let missing_dir = temp_dir.path().join("nodir");

    assert!(FileManager::remove_if_exists(&missing_file).is_ok());
    assert!(FileManager::remove_dir_if_exists(&missing_dir).is_ok());
}

/// remove_dir_if_exists removes a populated directory tree
#[test]
fn test_remove_dir_if_exists_withPopulatedDir_shouldRemoveTree() {
    let temp_dir = common::create_temp_dir().unwrap();
    let staging: PathBuf = temp_dir.path().join("segments");
    FileManager::ensure_dir(&staging).unwrap();
    common::create_test_file(&staging, "clip_00.mp4", "x").unwrap();

    FileManager::remove_dir_if_exists(&staging).unwrap();
    assert!(!FileManager::dir_exists(&staging));
}
