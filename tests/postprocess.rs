//! ImagePostProcessor tests on synthetic frames.

use std::{collections::BTreeSet, fs, path::Path};

use framegif::{CropRect, FilterKind, ImagePostProcessor, PostProcessOptions};
use image::{GenericImageView, Rgb, RgbImage};

fn write_frame(directory: &Path, index: u32, width: u32, height: u32) {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, (index * 40 % 256) as u8])
    });
    image
        .save(directory.join(format!("{index}_frame.png")))
        .expect("Failed to write frame");
}

fn file_names(directory: &Path) -> BTreeSet<String> {
    fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn batch_keeps_file_set_and_crops() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for index in 0..4 {
        write_frame(directory.path(), index, 640, 720);
    }
    let before = file_names(directory.path());

    let processed = ImagePostProcessor::new(directory.path(), PostProcessOptions::default())
        .process_all()
        .expect("post-processing failed");

    assert_eq!(processed, 4);
    assert_eq!(file_names(directory.path()), before);
    for name in &before {
        let image = image::open(directory.path().join(name)).unwrap();
        assert_eq!(image.dimensions(), (504, 540), "{name} not cropped");
    }
}

#[test]
fn small_frames_are_clipped() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frame(directory.path(), 0, 320, 240);

    ImagePostProcessor::new(directory.path(), PostProcessOptions::default())
        .process_all()
        .unwrap();

    let image = image::open(directory.path().join("0_frame.png")).unwrap();
    assert_eq!(image.dimensions(), (320, 240));
}

#[test]
fn custom_filter_and_crop() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frame(directory.path(), 0, 100, 100);

    let options = PostProcessOptions::new()
        .filter(FilterKind::Smooth)
        .crop(CropRect::new(10, 20, 50, 30));
    ImagePostProcessor::new(directory.path(), options)
        .process_all()
        .unwrap();

    let image = image::open(directory.path().join("0_frame.png")).unwrap();
    assert_eq!(image.dimensions(), (50, 30));
}

#[test]
fn disabled_batch_leaves_frames_untouched() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frame(directory.path(), 0, 640, 720);
    let original = fs::read(directory.path().join("0_frame.png")).unwrap();

    let (preview, processed) = ImagePostProcessor::new(
        directory.path(),
        PostProcessOptions::new().enabled(false),
    )
    .run()
    .unwrap();

    assert!(preview.is_none());
    assert_eq!(processed, 0);
    assert_eq!(fs::read(directory.path().join("0_frame.png")).unwrap(), original);
}

#[test]
fn preview_reports_size_without_writing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frame(directory.path(), 0, 640, 720);
    let original = fs::read(directory.path().join("0_frame.png")).unwrap();

    let preview = ImagePostProcessor::new(directory.path(), PostProcessOptions::new())
        .preview()
        .unwrap();

    assert_eq!(preview.original_dimensions, (640, 720));
    assert_eq!(preview.image.dimensions(), (504, 540));
    assert_eq!(file_names(directory.path()).len(), 1);
    assert_eq!(fs::read(directory.path().join("0_frame.png")).unwrap(), original);
}

#[test]
fn preview_of_missing_frame_fails() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let result = ImagePostProcessor::new(directory.path(), PostProcessOptions::new().preview(true))
        .run();
    assert!(result.is_err());
}
