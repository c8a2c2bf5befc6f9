use super::*;

fn scratch_dir(tag: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "glyphreel_frames_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    tmp
}

fn write_png(path: &Path, w: u32, h: u32, v: u8) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([v, v, v, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn lists_only_png_files_in_name_order() {
    let dir = scratch_dir("list");
    write_png(&dir.join("0003.png"), 2, 2, 3);
    write_png(&dir.join("0001.png"), 2, 2, 1);
    write_png(&dir.join("0010.png"), 2, 2, 10);
    write_png(&dir.join("0002.png"), 2, 2, 2);
    std::fs::write(dir.join("notes.txt"), b"x").unwrap();
    std::fs::write(dir.join("0000.PNG"), b"x").unwrap();

    let names: Vec<String> = list_frames(&dir)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["0001.png", "0002.png", "0003.png", "0010.png"]);
}

#[test]
fn sort_is_lexicographic_not_numeric() {
    let dir = scratch_dir("lex");
    write_png(&dir.join("10.png"), 1, 1, 0);
    write_png(&dir.join("9.png"), 1, 1, 0);

    let names: Vec<String> = list_frames(&dir)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["10.png", "9.png"]);
}

#[test]
fn empty_or_missing_dir_is_empty_input() {
    let dir = scratch_dir("empty");
    std::fs::write(dir.join("readme.md"), b"x").unwrap();
    assert!(matches!(
        list_frames(&dir),
        Err(GlyphreelError::EmptyInput(_))
    ));
    assert!(matches!(
        FrameSequence::open(&dir.join("nope")),
        Err(GlyphreelError::EmptyInput(_))
    ));
}

#[test]
fn sequence_takes_size_from_first_frame_and_checks_the_rest() {
    let dir = scratch_dir("dims");
    write_png(&dir.join("a.png"), 4, 2, 0);
    write_png(&dir.join("b.png"), 4, 2, 0);
    write_png(&dir.join("c.png"), 2, 4, 0);

    let seq = FrameSequence::open(&dir).unwrap();
    assert_eq!(seq.dimensions(), (4, 2));
    assert_eq!(seq.len(), 3);

    let decoded: Vec<_> = seq.iter().collect();
    assert!(decoded[0].is_ok());
    assert!(decoded[1].is_ok());
    assert!(matches!(decoded[2], Err(GlyphreelError::Validation(_))));
}

#[test]
fn read_frame_decodes_rgba8() {
    let dir = scratch_dir("read");
    let p = dir.join("f.png");
    write_png(&p, 3, 1, 77);
    let f = read_frame_rgba8(&p, (3, 1)).unwrap();
    assert_eq!((f.width, f.height), (3, 1));
    assert_eq!(f.data, vec![77, 77, 77, 255, 77, 77, 77, 255, 77, 77, 77, 255]);
}
