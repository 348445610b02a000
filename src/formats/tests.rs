use std::fs;

use ndarray::{Array2, IxDyn};
use tempfile::tempdir;

use super::{
    IoError, RawImportForm, RawImportParams, RawSampleType, RawStack, load_params, read_image,
    read_raw, save_params, save_plane_png, spawn_raw_load,
};
use crate::model::{AxisKind, PixelType};

fn params(kind: RawSampleType, width: usize, height: usize) -> RawImportParams {
    RawImportParams {
        image_type: kind,
        width,
        height,
        ..RawImportParams::default()
    }
}

#[test]
fn short_file_is_zero_padded_to_requested_shape() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("short.raw");
    fs::write(&path, [7u8; 10]).expect("write raw");

    let load = read_raw(&path, &params(RawSampleType::U8, 4, 4)).expect("load");
    assert_eq!(load.buffer.shape(), &[4, 4]);
    let values = load.buffer.data.iter().copied().collect::<Vec<_>>();
    assert!(values[..10].iter().all(|value| *value == 7.0));
    assert!(values[10..].iter().all(|value| *value == 0.0));
    assert_eq!(load.report.padded_bytes, 6);
    assert_eq!(load.report.warnings.len(), 1);
}

#[test]
fn long_file_is_truncated_with_warning() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("long.raw");
    fs::write(&path, [1u8; 20]).expect("write raw");

    let load = read_raw(&path, &params(RawSampleType::U8, 4, 4)).expect("load");
    assert_eq!(load.buffer.shape(), &[4, 4]);
    assert_eq!(load.report.truncated_bytes, 4);
    assert_eq!(load.report.padded_bytes, 0);
}

#[test]
fn sixteen_bit_samples_respect_byte_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("u16.raw");
    fs::write(&path, [0x01u8, 0x02, 0x03, 0x04]).expect("write raw");

    let big = read_raw(&path, &params(RawSampleType::U16, 2, 1)).expect("big endian");
    assert_eq!(big.buffer.data[IxDyn(&[0, 0])], f64::from(0x0102u16));

    let little_params = RawImportParams {
        little_endian: true,
        ..params(RawSampleType::U16, 2, 1)
    };
    let little = read_raw(&path, &little_params).expect("little endian");
    assert_eq!(little.buffer.data[IxDyn(&[0, 1])], f64::from(0x0403u16));
    assert_eq!(little.buffer.metadata.pixel_type, PixelType::U16);
}

#[test]
fn float_samples_decode() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("f32.raw");
    let mut bytes = Vec::new();
    bytes.extend(1.5f32.to_le_bytes());
    bytes.extend((-2.0f32).to_le_bytes());
    fs::write(&path, bytes).expect("write raw");

    let float_params = RawImportParams {
        little_endian: true,
        ..params(RawSampleType::F32, 2, 1)
    };
    let load = read_raw(&path, &float_params).expect("load");
    assert_eq!(load.buffer.data[IxDyn(&[0, 0])], 1.5);
    assert_eq!(load.buffer.data[IxDyn(&[0, 1])], -2.0);
}

#[test]
fn offset_gap_and_stack_layout() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stack.raw");
    // 2-byte header, then three 2x1 images separated by 1-byte gaps.
    fs::write(&path, [9, 9, 0, 0, 9, 1, 1, 9, 2, 2]).expect("write raw");

    let stack_params = RawImportParams {
        offset: 2,
        gap: 1,
        num_images: 3,
        ..params(RawSampleType::U8, 2, 1)
    };
    let load = read_raw(&path, &stack_params).expect("load");
    assert_eq!(load.buffer.shape(), &[3, 1, 2]);
    assert_eq!(load.buffer.axis_index(AxisKind::Z), Some(0));
    for z in 0..3 {
        let plane = load.buffer.gray_plane(z).expect("plane");
        assert!(plane.iter().all(|value| *value == z as f64));
    }
}

#[test]
fn rgb_import_adds_channel_axis() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rgb.raw");
    fs::write(&path, [255u8, 0, 0, 0, 255, 0]).expect("write raw");

    let load = read_raw(&path, &params(RawSampleType::Rgb24, 2, 1)).expect("load");
    assert_eq!(load.buffer.shape(), &[1, 2, 3]);
    assert_eq!(load.buffer.axis_index(AxisKind::Channel), Some(2));
}

#[test]
fn white_is_zero_inverts_unsigned_samples() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("wiz.raw");
    fs::write(&path, [0u8, 255]).expect("write raw");

    let inverted = RawImportParams {
        white_is_zero: true,
        ..params(RawSampleType::U8, 2, 1)
    };
    let load = read_raw(&path, &inverted).expect("load");
    assert_eq!(load.buffer.data[IxDyn(&[0, 0])], 255.0);
    assert_eq!(load.buffer.data[IxDyn(&[0, 1])], 0.0);
}

#[test]
fn open_all_files_stacks_siblings_in_name_order() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("b.raw"), [2u8, 2]).expect("write b");
    fs::write(dir.path().join("a.raw"), [1u8, 1]).expect("write a");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write txt");

    let all = RawImportParams {
        open_all_files: true,
        ..params(RawSampleType::U8, 2, 1)
    };
    let load = read_raw(dir.path().join("b.raw"), &all).expect("load");
    assert_eq!(load.buffer.shape(), &[2, 1, 2]);
    assert_eq!(load.report.files.len(), 2);
    assert_eq!(load.buffer.gray_plane(0).expect("first")[[0, 0]], 1.0);
    assert_eq!(load.buffer.gray_plane(1).expect("second")[[0, 0]], 2.0);
}

#[test]
fn virtual_stack_matches_eager_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("volume.raw");
    fs::write(&path, [0u8, 1, 2, 3, 4, 5]).expect("write raw");

    let volume = RawImportParams {
        num_images: 3,
        ..params(RawSampleType::U8, 2, 1)
    };
    let eager = read_raw(&path, &volume).expect("eager");
    let stack = RawStack::open(&path, volume).expect("stack");
    for z in 0..3 {
        let lazy = stack.read_slice(z).expect("slice");
        let eager_plane = eager.buffer.plane(z).expect("plane").to_owned();
        assert_eq!(lazy, eager_plane);
    }
    assert!(matches!(
        stack.read_slice(3),
        Err(IoError::SliceOutOfRange { index: 3, depth: 3 })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let error = read_raw(dir.path().join("absent.raw"), &RawImportParams::default())
        .expect_err("missing file");
    assert!(matches!(error, IoError::Io(_)));
}

#[test]
fn overflowing_gap_or_offset_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tiny.raw");
    fs::write(&path, [1u8; 4]).expect("write raw");

    let huge_gap = RawImportParams {
        gap: u64::MAX,
        num_images: 2,
        ..params(RawSampleType::U8, 2, 2)
    };
    assert!(matches!(
        read_raw(&path, &huge_gap),
        Err(IoError::InvalidParams(_))
    ));
    assert!(matches!(
        RawStack::open(&path, huge_gap),
        Err(IoError::InvalidParams(_))
    ));

    let huge_offset = RawImportParams {
        offset: u64::MAX - 1,
        ..params(RawSampleType::U8, 2, 2)
    };
    assert!(matches!(
        huge_offset.validate(),
        Err(IoError::InvalidParams(_))
    ));

    let many_images = RawImportParams {
        num_images: usize::MAX,
        ..params(RawSampleType::U8, 2, 2)
    };
    assert!(matches!(
        read_raw(&path, &many_images),
        Err(IoError::InvalidParams(_))
    ));
}

#[test]
fn form_rejects_non_numeric_width() {
    let form = RawImportForm {
        width: "wide".to_string(),
        ..RawImportForm::default()
    };
    let error = form.parse().expect_err("non-numeric width");
    assert!(error.to_string().contains("width"));

    let parsed = RawImportForm::default().parse().expect("defaults parse");
    assert_eq!(parsed, RawImportParams::default());
}

#[test]
fn params_persist_as_flat_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("raw.json");
    let saved = RawImportParams {
        image_type: RawSampleType::F32,
        num_images: 384,
        little_endian: true,
        ..RawImportParams::default()
    };
    save_params(&path, &saved).expect("save");
    let text = fs::read_to_string(&path).expect("read json");
    assert!(text.contains("\"32-bit Real\""));
    assert_eq!(load_params(&path).expect("load"), saved);
}

#[test]
fn background_load_delivers_result() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bg.raw");
    fs::write(&path, [5u8; 4]).expect("write raw");

    let handle = spawn_raw_load(&path, params(RawSampleType::U8, 2, 2));
    let load = handle.wait().expect("background load");
    assert!(load.buffer.data.iter().all(|value| *value == 5.0));
}

#[test]
fn plane_png_export_rejects_other_extensions() {
    let dir = tempdir().expect("tempdir");
    let plane = Array2::from_shape_vec((2, 2), vec![0.0, 64.0, 128.0, 255.0]).expect("plane");
    save_plane_png(dir.path().join("plane.png"), &plane, Some((0.0, 255.0))).expect("png");
    let decoded = image::open(dir.path().join("plane.png"))
        .expect("decode")
        .to_luma8();
    assert_eq!(decoded.get_pixel(1, 1).0[0], 255);
    assert!(save_plane_png(dir.path().join("plane.bmp"), &plane, None).is_err());
}

#[test]
fn raster_open_keeps_native_values() {
    let dir = tempdir().expect("tempdir");
    let gray_path = dir.path().join("gray.png");
    let plane = Array2::from_shape_vec((1, 2), vec![0.0, 200.0]).expect("plane");
    save_plane_png(&gray_path, &plane, Some((0.0, 255.0))).expect("png");

    let gray = read_image(&gray_path).expect("open gray");
    assert_eq!(gray.shape(), &[1, 2]);
    assert_eq!(gray.metadata.pixel_type, PixelType::U8);
    assert_eq!(gray.data[IxDyn(&[0, 1])], 200.0);

    let rgb_path = dir.path().join("rgb.png");
    image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]))
        .save(&rgb_path)
        .expect("rgb png");
    let rgb = read_image(&rgb_path).expect("open rgb");
    assert_eq!(rgb.shape(), &[2, 2, 3]);
    assert_eq!(rgb.axis_index(AxisKind::Channel), Some(2));
    assert_eq!(rgb.data[IxDyn(&[1, 1, 2])], 30.0);

    assert!(matches!(
        read_image(dir.path().join("volume.raw")),
        Err(IoError::UnsupportedFormat(_))
    ));
}
