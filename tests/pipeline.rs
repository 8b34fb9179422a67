use std::fs;
use std::path::Path;

use image::Rgb;

use heatframes::painter::{ColorScale, Viridis};
use heatframes::threads::Inline;
use heatframes::{
    render_frames, Catalog, ColormapKind, Error, Origin, Pipeline, RenderConfig, Renderer,
    SnapshotPattern,
};

fn write_frame(dir: &Path, name: &str, values: &[f64]) {
    let text: String = values.iter().map(|v| format!("{}\n", v)).collect();
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn renders_every_frame_on_one_scale() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "t000.csv", &[0.0, 1.0, 2.0, 2.0]);
    write_frame(dir.path(), "t001.csv", &[0.0, 2.0, 4.0, 4.0]);
    write_frame(dir.path(), "t002.csv", &[4.0, 4.0, 4.0, 4.0]);

    let config = RenderConfig::new(dir.path(), 2, 2)
        .threads(2)
        .colormap(ColormapKind::Greyscale)
        .origin(Origin::Upper);
    let report = render_frames(&config).unwrap();
    assert_eq!(report.bound.value(), 4.0);
    assert_eq!(report.frames, 3);

    let first = image::open(dir.path().join("t000.png")).unwrap().to_rgb8();
    let second = image::open(dir.path().join("t001.png")).unwrap().to_rgb8();
    let third = image::open(dir.path().join("t002.png")).unwrap().to_rgb8();

    // 2.0 is half of the batch maximum in the first frame, even though it is
    // that frame's own maximum.
    assert_eq!(first.get_pixel(0, 1), &Rgb([128, 128, 128]));
    assert_eq!(second.get_pixel(0, 1), &Rgb([255, 255, 255]));
    assert!(third.pixels().all(|p| *p == Rgb([255, 255, 255])));
}

#[test]
fn all_zero_batch_renders_lowest_color() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.csv", &[0.0; 6]);
    write_frame(dir.path(), "b.csv", &[0.0; 6]);

    let report = render_frames(&RenderConfig::new(dir.path(), 3, 2)).unwrap();
    assert_eq!(report.bound.value(), 0.0);
    for name in ["a.png", "b.png"] {
        let img = image::open(dir.path().join(name)).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 3));
        assert!(img.pixels().all(|p| *p == Viridis.color(0.0)));
    }
}

#[test]
fn shape_mismatch_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "bad.csv", &[1.0, 2.0, 3.0]);

    let err = render_frames(&RenderConfig::new(dir.path(), 2, 2)).unwrap_err();
    match err {
        Error::ShapeMismatch {
            path,
            expected,
            actual,
        } => {
            assert_eq!((expected, actual), (4, 3));
            assert_eq!(path, dir.path().join("bad.csv"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!dir.path().join("bad.png").exists());
}

#[test]
fn malformed_value_reports_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.csv", &[1.0, 2.0, 3.0, 4.0]);
    fs::write(dir.path().join("b.csv"), "1\n2\nthree\n4\n").unwrap();

    let err = render_frames(&RenderConfig::new(dir.path(), 2, 2).threads(1)).unwrap_err();
    assert!(matches!(err, Error::MalformedValue { line: 3, .. }));
    assert!(!dir.path().join("a.png").exists());
}

#[test]
fn empty_directory_is_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();
    let err = render_frames(&RenderConfig::new(dir.path(), 2, 2)).unwrap_err();
    assert_eq!(err.kind(), "EmptyBatch");
}

#[test]
fn missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = render_frames(&RenderConfig::new(dir.path().join("gone"), 2, 2)).unwrap_err();
    assert_eq!(err.kind(), "DirectoryNotFound");
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let values: Vec<f64> = (0..64).map(|k| (k as f64 * 0.37).sin()).collect();
    write_frame(dir.path(), "wave.csv", &values);
    write_frame(dir.path(), "flat.csv", &[0.5; 64]);

    let config = RenderConfig::new(dir.path(), 8, 8).cell_size(4);
    render_frames(&config).unwrap();
    let before = fs::read(dir.path().join("wave.png")).unwrap();
    render_frames(&config.clone().threads(0)).unwrap();
    assert_eq!(before, fs::read(dir.path().join("wave.png")).unwrap());

    let img = image::open(dir.path().join("wave.png")).unwrap();
    assert_eq!((img.width(), img.height()), (32, 32));
}

#[test]
fn rejects_zero_sized_grid() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.csv", &[1.0]);
    let err = render_frames(&RenderConfig::new(dir.path(), 0, 1)).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn extension_match_is_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.CSV", &[9.0; 4]);
    write_frame(dir.path(), "b.csv", &[1.0; 4]);

    let report = render_frames(&RenderConfig::new(dir.path(), 2, 2)).unwrap();
    assert_eq!(report.frames, 1);
    assert_eq!(report.bound.value(), 1.0);
    assert!(!dir.path().join("a.png").exists());
}

#[test]
fn snapshot_extension_equal_to_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.png", &[1.0; 4]);
    let before = fs::read(dir.path().join("a.png")).unwrap();

    let config = RenderConfig::new(dir.path(), 2, 2).pattern(SnapshotPattern::extension("png"));
    let err = render_frames(&config).unwrap_err();
    assert_eq!(err.kind(), "InvalidConfig");
    assert_eq!(before, fs::read(dir.path().join("a.png")).unwrap());
}

#[test]
fn unvalidated_pipeline_rejects_oversized_cells() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "a.csv", &[1.0, 2.0]);

    let catalog = Catalog::scan(dir.path(), &SnapshotPattern::default()).unwrap();
    let pipeline = Pipeline::new(Inline, Renderer::new(2, 1).cell_size(u32::MAX));
    let err = pipeline.run(&catalog).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert!(!dir.path().join("a.png").exists());
}
