use image::{GenericImageView, ImageFormat, RgbImage};
use poster_engine::{prepare_image, PreparedImage, MAX_SIDE};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn save(
    dir: &TempDir,
    name: &str,
    width: u32,
    height: u32,
    format: ImageFormat,
) -> std::path::PathBuf {
    let path = dir.path().join(name);
    RgbImage::from_pixel(width, height, image::Rgb([10, 120, 240]))
        .save_with_format(&path, format)
        .unwrap();
    path
}

#[test]
fn oversized_image_is_downscaled_to_a_temp_copy() {
    let dir = TempDir::new().unwrap();
    let path = save(&dir, "wide.jpg", 2000, 1000, ImageFormat::Jpeg);

    let prepared = prepare_image(&path, MAX_SIDE).unwrap();
    let (width, height) = match &prepared {
        PreparedImage::Resized { width, height, .. } => (*width, *height),
        other => panic!("expected a resized copy, got {other:?}"),
    };
    assert_eq!((width, height), (1350, 675));

    let decoded = image::open(prepared.path()).unwrap();
    assert_eq!(decoded.dimensions(), (1350, 675));
    assert_ne!(prepared.path(), path.as_path());

    let tmp = prepared.path().to_path_buf();
    drop(prepared);
    assert!(!tmp.exists(), "resized copy should be removed on drop");
    assert!(path.exists());
}

#[test]
fn tall_png_keeps_its_format_and_aspect() {
    let dir = TempDir::new().unwrap();
    let path = save(&dir, "tall.png", 900, 2700, ImageFormat::Png);

    let prepared = prepare_image(&path, MAX_SIDE).unwrap();
    let decoded = image::ImageReader::open(prepared.path())
        .unwrap()
        .with_guessed_format()
        .unwrap();
    assert_eq!(decoded.format(), Some(ImageFormat::Png));
    assert_eq!(decoded.into_dimensions().unwrap(), (450, 1350));
}

#[test]
fn image_within_bounds_is_used_as_is() {
    let dir = TempDir::new().unwrap();
    let path = save(&dir, "small.png", 1350, 800, ImageFormat::Png);

    let prepared = prepare_image(&path, MAX_SIDE).unwrap();
    assert!(matches!(prepared, PreparedImage::Original(_)));
    assert_eq!(prepared.path(), path.as_path());
}

#[test]
fn unreadable_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"not an image").unwrap();

    assert!(prepare_image(&path, MAX_SIDE).is_err());
}
