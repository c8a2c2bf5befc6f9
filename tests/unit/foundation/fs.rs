use super::*;

fn scratch_dir(tag: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "glyphreel_fs_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    tmp
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn staged_dir_replaces_previous_contents() {
    let root = scratch_dir("replace");
    let target = root.join("chars");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("stale.png"), b"old").unwrap();

    let staged = StagedDir::new(&target).unwrap();
    std::fs::write(staged.path().join("64.png"), b"new").unwrap();
    // The old tree is still visible until commit.
    assert_eq!(entries(&target), vec!["stale.png".to_string()]);

    let out = staged.commit().unwrap();
    assert_eq!(out, target);
    assert_eq!(entries(&target), vec!["64.png".to_string()]);
    // Only the committed directory remains next to it.
    assert_eq!(entries(&root), vec!["chars".to_string()]);
}

#[test]
fn staged_dir_creates_missing_parents() {
    let root = scratch_dir("parents");
    let target = root.join("fonts").join("Mono_chars");

    let staged = StagedDir::new(&target).unwrap();
    std::fs::write(staged.path().join("65.png"), b"A").unwrap();
    staged.commit().unwrap();

    assert!(target.join("65.png").is_file());
}

#[test]
fn dropped_staged_dir_leaves_target_untouched() {
    let root = scratch_dir("drop_dir");
    let target = root.join("chars");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("keep.png"), b"old").unwrap();

    {
        let staged = StagedDir::new(&target).unwrap();
        std::fs::write(staged.path().join("64.png"), b"half").unwrap();
    }

    assert_eq!(entries(&target), vec!["keep.png".to_string()]);
    assert_eq!(entries(&root), vec!["chars".to_string()]);
}

#[test]
fn staged_file_overwrites_existing_target() {
    let root = scratch_dir("file_commit");
    let target = root.join("text.mp4");
    std::fs::write(&target, b"old video").unwrap();

    let staged = StagedFile::new(&target).unwrap();
    assert_ne!(staged.path(), target.as_path());
    std::fs::write(staged.path(), b"new video").unwrap();
    staged.commit().unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"new video");
    assert_eq!(entries(&root), vec!["text.mp4".to_string()]);
}

#[test]
fn dropped_staged_file_removes_partial_output() {
    let root = scratch_dir("file_drop");
    let target = root.join("text.mp4");

    {
        let staged = StagedFile::new(&target).unwrap();
        std::fs::write(staged.path(), b"truncated").unwrap();
    }

    assert!(!target.exists());
    assert!(entries(&root).is_empty());
}

#[test]
fn staged_file_commit_without_output_is_an_error() {
    let root = scratch_dir("file_empty");
    let staged = StagedFile::new(root.join("text.mp4")).unwrap();
    assert!(matches!(
        staged.commit(),
        Err(GlyphreelError::Validation(_))
    ));
}

#[test]
fn sibling_paths_are_hidden_and_tagged() {
    let p = sibling_path(Path::new("out/text.mp4"), "partial").unwrap();
    assert_eq!(p.parent().unwrap(), Path::new("out"));
    let name = p.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(".text.mp4.partial-"));
    assert!(sibling_path(Path::new("/"), "partial").is_err());
}
