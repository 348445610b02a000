use ndarray::Array;

use super::{AxisKind, CoreError, Dataset, Dim, Metadata, PixelType};

#[test]
fn metadata_roundtrip_json() {
    let mut metadata = Metadata::from_shape(&[4, 5, 3], PixelType::Rgb24);
    metadata
        .extras
        .insert("dataset".into(), serde_json::json!("synthetic"));
    let serialized = serde_json::to_string_pretty(&metadata).expect("serialize metadata");
    let restored: Metadata = serde_json::from_str(&serialized).expect("deserialize metadata");
    assert_eq!(restored, metadata);
    assert_eq!(restored.axis_index(AxisKind::Channel), Some(2));
}

#[test]
fn dataset_rejects_invalid_metadata_shape() {
    let data = Array::from_shape_vec((2, 2), vec![0.0_f64, 1.0, 2.0, 3.0])
        .expect("shape")
        .into_dyn();
    let metadata = Metadata {
        dims: vec![Dim::new(AxisKind::X, 2)],
        ..Metadata::default()
    };
    assert!(Dataset::new(data, metadata).is_err());
}

#[test]
fn volume_metadata_orders_z_y_x() {
    let metadata = Metadata::from_shape(&[3, 4, 5], PixelType::U16);
    assert_eq!(metadata.axis_index(AxisKind::Z), Some(0));
    assert_eq!(metadata.axis_index(AxisKind::Y), Some(1));
    assert_eq!(metadata.axis_index(AxisKind::X), Some(2));
}

#[test]
fn planes_index_the_z_axis() {
    let data = Array::from_shape_fn((3, 2, 2), |(z, _, _)| z as f64).into_dyn();
    let buffer = Dataset::from_data_with_default_metadata(data, PixelType::U8).expect("buffer");
    assert_eq!(buffer.depth(), 3);
    assert_eq!((buffer.height(), buffer.width()), (2, 2));
    let plane = buffer.gray_plane(2).expect("plane");
    assert!(plane.iter().all(|value| *value == 2.0));
    assert!(matches!(
        buffer.plane(3),
        Err(CoreError::SliceOutOfRange { index: 3, depth: 3 })
    ));
}

#[test]
fn rgb_planes_reduce_to_luma() {
    let data = Array::from_shape_vec((1, 1, 3), vec![255.0_f64, 255.0, 255.0])
        .expect("shape")
        .into_dyn();
    let buffer = Dataset::from_data_with_default_metadata(data, PixelType::Rgb24).expect("buffer");
    let gray = buffer.gray_plane(0).expect("gray");
    assert!((gray[[0, 0]] - 255.0).abs() < 1e-9);
    assert!((buffer.sample(0, 0, 0).expect("sample") - 255.0).abs() < 1e-9);
    assert_eq!(buffer.sample(0, 1, 0), None);
}

#[test]
fn integer_ranges_follow_the_source_type() {
    assert_eq!(PixelType::U8.value_range(), Some((0.0, 255.0)));
    assert_eq!(PixelType::I16.value_range(), Some((-32768.0, 32767.0)));
    assert_eq!(PixelType::F32.value_range(), None);
}
