use super::*;

#[test]
fn empty_book_shapes_nothing() {
    let mut book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.resolve_family("Inter").is_none());
    assert!(book.shape("hello", &FontSpec::new("Inter", 48.0, false)).is_none());
}

#[test]
fn mark_ready_bumps_epoch() {
    let mut book = FontBook::new();
    assert!(!book.is_ready());
    let before = book.epoch();
    book.mark_ready();
    assert!(book.is_ready());
    assert!(book.epoch() > before);
}

#[test]
fn garbage_bytes_are_an_asset_error() {
    let mut book = FontBook::new();
    let err = book
        .register_bytes(b"definitely not a font".to_vec(), false)
        .unwrap_err();
    assert!(err.to_string().starts_with("asset error:"));
    assert_eq!(book.epoch(), 0);
}

#[test]
fn bold_suffix_detection() {
    assert!(is_bold_file_name(Path::new("fonts/Inter-Bold.ttf")));
    assert!(is_bold_file_name(Path::new("HindSiliguriBold.otf")));
    assert!(!is_bold_file_name(Path::new("Inter-Regular.ttf")));
}

#[test]
fn load_dir_skips_non_fonts_and_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
    std::fs::write(dir.path().join("Broken.ttf"), b"nope").unwrap();

    let mut book = FontBook::new();
    assert_eq!(book.load_dir(dir.path()).unwrap(), 0);
    assert!(book.is_empty());
}

#[test]
fn load_dir_missing_directory_errors() {
    let mut book = FontBook::new();
    assert!(book.load_dir(Path::new("/definitely/not/here")).is_err());
}
