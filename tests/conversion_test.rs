// End-to-end conversion tests through the public library API
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use png2ico::converter::{
    BatchStatus, ConvertConfig, ConvertError, IconConverter, IconSizes, fit_into_square,
    resize_to_square,
};
use png2ico::settings::{AppSettings, load_settings_from_path, save_settings_to_path};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("png2ico-it-{tag}-{nanos}-{seq}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

// RGB without alpha, so the loader has to coerce to RGBA
fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let img = ImageBuffer::from_pixel(width, height, Rgb(color));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    let path = dir.join(name);
    std::fs::write(&path, cursor.into_inner()).expect("write png");
    path
}

fn ico_frame_sizes(bytes: &[u8]) -> Vec<(u32, u32)> {
    assert_eq!(&bytes[0..4], &[0, 0, 1, 0]);
    let count = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;
    (0..count)
        .map(|i| {
            let entry = &bytes[6 + i * 16..6 + (i + 1) * 16];
            let edge = |b: u8| if b == 0 { 256 } else { b as u32 };
            (edge(entry[0]), edge(entry[1]))
        })
        .collect()
}

#[test]
fn full_conversion_workflow() {
    let dir = unique_temp_dir("workflow");
    let input = write_rgb_png(&dir, "workflow_test.png", 128, 128, [0, 255, 0]);
    let output = dir.join("workflow_test.ico");
    let converter = IconConverter::new(ConvertConfig::default());

    assert!(converter.convert_one(&input, Some(&output), None, false));

    let bytes = std::fs::read(&output).expect("read ico");
    assert_eq!(ico_frame_sizes(&bytes).len(), 7);
    let decoded =
        image::load_from_memory_with_format(&bytes, ImageFormat::Ico).expect("decode ico");
    assert_eq!((decoded.width(), decoded.height()), (256, 256));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn wide_source_fits_without_cropping() {
    let source = ImageBuffer::from_pixel(90, 30, Rgba([0, 0, 255, 255]));
    let layout = fit_into_square(90, 30, 48);
    let frame = resize_to_square(&source, 48, image::imageops::FilterType::Lanczos3)
        .expect("resize");

    assert_eq!(frame.dimensions(), (48, 48));
    assert_eq!((layout.width, layout.height), (48, 16));
    // content spans the full width, padding rows stay transparent
    assert!(frame.get_pixel(0, 24).0[3] > 0);
    assert!(frame.get_pixel(47, 24).0[3] > 0);
    assert_eq!(frame.get_pixel(24, 0).0[3], 0);
    assert_eq!(frame.get_pixel(24, 47).0[3], 0);
}

#[test]
fn batch_with_distinct_sizes_into_fresh_directory() {
    let dir = unique_temp_dir("batch-fresh");
    let inputs: Vec<PathBuf> = [50u32, 60, 70]
        .iter()
        .enumerate()
        .map(|(i, &edge)| write_rgb_png(&dir, &format!("test_{i}.png"), edge, edge, [255, 0, 0]))
        .collect();
    let output_dir = dir.join("fresh").join("output");
    let converter = IconConverter::new(ConvertConfig::default());

    let mut progress = Vec::new();
    let result = converter
        .convert_batch(&inputs, Some(&output_dir), None, false, |percent, _| progress.push(percent))
        .expect("batch should run");

    assert_eq!((result.total, result.successful, result.failed), (3, 3, 0));
    assert!(result.details.iter().all(|d| d.status == BatchStatus::Success));
    for i in 0..3 {
        assert!(output_dir.join(format!("test_{i}.ico")).exists());
    }
    assert_eq!(progress.len(), 3);
    assert_eq!(progress.last().copied(), Some(100.0));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_with_failures_reports_in_input_order() {
    let dir = unique_temp_dir("batch-failures");
    let valid = write_rgb_png(&dir, "test.png", 100, 100, [255, 0, 0]);
    let text = dir.join("not_png.txt");
    std::fs::write(&text, "not a png").expect("write text");
    let inputs = vec![valid, dir.join("nonexistent.png"), text];
    let converter = IconConverter::new(ConvertConfig::default());

    let result = converter
        .convert_batch(&inputs, Some(&dir.join("output")), None, false, |_, _| {})
        .expect("batch should run");

    assert_eq!((result.total, result.successful, result.failed), (3, 1, 2));
    let statuses: Vec<BatchStatus> = result.details.iter().map(|d| d.status).collect();
    assert_eq!(statuses, vec![BatchStatus::Success, BatchStatus::Failed, BatchStatus::Failed]);
    for (entry, input) in result.details.iter().zip(&inputs) {
        assert_eq!(&entry.source, input);
    }

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn invalid_sizes_are_rejected_before_conversion() {
    assert!(matches!(IconSizes::parse("16,0"), Err(ConvertError::Validation(_))));
    assert!(matches!(IconSizes::parse(""), Err(ConvertError::Validation(_))));
}

#[test]
fn settings_drive_converter_defaults() {
    let dir = unique_temp_dir("settings");
    let settings_path = dir.join("config.json");
    let settings = AppSettings {
        icon_sizes: vec![24, 16],
        ..AppSettings::default()
    };
    save_settings_to_path(&settings_path, &settings).expect("save settings");

    let config = load_settings_from_path(&settings_path)
        .to_convert_config()
        .expect("valid settings");
    let converter = IconConverter::new(config);

    let input = write_rgb_png(&dir, "s.png", 40, 20, [1, 2, 3]);
    let output = dir.join("s.ico");
    assert!(converter.convert_one(&input, Some(&output), None, false));
    assert_eq!(
        ico_frame_sizes(&std::fs::read(&output).expect("read ico")),
        vec![(24, 24), (16, 16)]
    );

    let _ = std::fs::remove_dir_all(dir);
}
