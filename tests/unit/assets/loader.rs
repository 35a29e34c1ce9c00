use std::io::Cursor;

use super::*;

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn resolve_relative_absolute_and_file_urls() {
    let loader = AssetLoader::new("/srv/assets");
    assert_eq!(
        loader.resolve("bg.png").unwrap(),
        PathBuf::from("/srv/assets/bg.png")
    );
    assert_eq!(
        loader.resolve("/tmp/logo.png").unwrap(),
        PathBuf::from("/tmp/logo.png")
    );
    assert_eq!(
        loader.resolve("file:///tmp/x.png").unwrap(),
        PathBuf::from("/tmp/x.png")
    );
}

#[test]
fn remote_and_inline_references_are_asset_errors() {
    let loader = AssetLoader::new(".");
    for r in [
        "https://example.com/a.png",
        "http://x/y",
        "blob:abcd",
        "data:image/png;base64,AA",
        "",
    ] {
        let err = loader.resolve(r).unwrap_err();
        assert!(err.to_string().starts_with("asset error:"), "{r}: {err}");
    }
}

#[test]
fn load_all_decodes_present_layers_and_skips_broken_ones() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("bg.png"), 4, 2);
    std::fs::write(dir.path().join("broken.png"), b"nope").unwrap();

    let loader = AssetLoader::new(dir.path());
    let config = VideoConfig::default().edit(|c| {
        c.background_image = Some("bg.png".into());
        c.watermark_url = Some("broken.png".into());
        c.logo_url = Some("missing.png".into());
    });

    let assets = LoadedAssets::load_all(&config, &loader);
    let bg = assets.background.expect("background decoded");
    assert_eq!((bg.width, bg.height), (4, 2));
    assert!(assets.watermark.is_none());
    assert!(assets.logo.is_none());
}

#[test]
fn apply_changes_only_touches_changed_layers() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("a.png"), 1, 1);
    write_png(&dir.path().join("b.png"), 2, 2);
    let loader = AssetLoader::new(dir.path());

    let old = VideoConfig::default().edit(|c| {
        c.background_image = Some("a.png".into());
        c.logo_url = Some("a.png".into());
    });
    let mut assets = LoadedAssets::load_all(&old, &loader);
    let logo_before = assets.logo.clone().unwrap();

    let new = old.edit(|c| c.background_image = Some("b.png".into()));
    assets.apply_changes(&new.changes_from(&old), &new, &loader);

    assert_eq!(assets.background.as_ref().unwrap().width, 2);
    assert!(Arc::ptr_eq(assets.logo.as_ref().unwrap(), &logo_before));
}
