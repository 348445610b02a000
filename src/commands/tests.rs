use std::collections::HashSet;
use std::fs;

use ndarray::{Array2, Array3};
use serde_json::json;
use tempfile::tempdir;

use super::{
    MENU_MANIFEST, MenuItem, OpsError, invert_plane, invoke_command, list_commands, measure_region,
    menu_tree, region_bounds, smooth_plane,
};
use crate::model::{PixelBuffer, PixelType};
use crate::runtime::ViewerSession;
use crate::ui::interaction::{
    CanvasButton, CanvasEvent, ContextAction, EditOutcome, Point, ShapeGeometry, ShapeKind,
};
use crate::ui::stack::OrthoPlane;

fn session_with(data: Array2<f64>, pixel_type: PixelType) -> ViewerSession {
    let mut session = ViewerSession::default();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data.into_dyn(), pixel_type)
            .expect("buffer"),
    );
    session
}

fn drag(session: &mut ViewerSession, from: (f64, f64), to: (f64, f64)) -> u64 {
    session.handle_event(&CanvasEvent::press(CanvasButton::Primary, from.0, from.1));
    session.handle_event(&CanvasEvent::moved(to.0, to.1));
    match session.handle_event(&CanvasEvent::release(CanvasButton::Primary, to.0, to.1)) {
        EditOutcome::Finalized { roi_id } => roi_id,
        other => panic!("expected finalized roi, got {other:?}"),
    }
}

fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> ShapeGeometry {
    ShapeGeometry::Rectangle {
        start: Point::new(x1, y1),
        end: Point::new(x2, y2),
    }
}

#[test]
fn every_manifest_entry_is_registered() {
    let ids = list_commands()
        .into_iter()
        .map(|descriptor| descriptor.id)
        .collect::<HashSet<_>>();
    for item in MENU_MANIFEST {
        if let MenuItem::Command { command, .. } = item {
            assert!(ids.contains(*command), "{command} is not registered");
        }
    }
    for action in ContextAction::ALL {
        assert!(ids.contains(action.command_id()));
    }
}

#[test]
fn menu_tree_nests_submenus_in_manifest_order() {
    let tree = menu_tree();
    let roots = tree.iter().map(|node| node.label.as_str()).collect::<Vec<_>>();
    assert_eq!(roots, vec!["File", "Edit", "Image", "Process", "Analyze"]);

    let stacks = &tree[2].children[0];
    assert_eq!(stacks.label, "Stacks");
    assert_eq!(stacks.children.len(), 4);
    assert!(stacks.children[2].separator);
    assert_eq!(
        stacks.children[3].command.as_deref(),
        Some("image.stacks.orthogonal_views")
    );
    assert_eq!(tree[0].children[1].children[0].label, "Raw...");
}

#[test]
fn measuring_rectangle_on_flat_image() {
    let mut session = session_with(Array2::from_elem((100, 100), 10.0), PixelType::U8);
    let roi_id = drag(&mut session, (10.0, 10.0), (30.0, 30.0));

    let output = session
        .run_command("analyze.measure", &json!({ "roi_id": roi_id }))
        .expect("measure");
    let table = output.measurements.expect("table");
    assert_eq!(table.get_f64("area"), Some(400.0));
    assert_eq!(table.get_f64("mean"), Some(10.0));
    assert_eq!(table.get_f64("min"), Some(10.0));
    assert_eq!(table.get_f64("max"), Some(10.0));
    assert_eq!(session.results().len(), 1);
}

#[test]
fn measurement_clips_to_plane_and_skips_nan() {
    let mut plane = Array2::from_shape_fn((4, 4), |(row, col)| (row * 4 + col) as f64);
    plane[[3, 3]] = f64::NAN;
    let stats = measure_region(&rect(2.0, 2.0, 10.0, 10.0), &plane).expect("stats");
    assert_eq!(stats.area, 4);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 14.0);
    assert!((stats.mean - 35.0 / 3.0).abs() < 1e-12);
    assert_eq!(stats.column_profile, vec![12.0, 11.0]);

    assert!(region_bounds(&rect(-5.0, -5.0, -1.0, -1.0), 4, 4).is_none());
    assert!(matches!(
        measure_region(&rect(5.0, 5.0, 8.0, 8.0), &plane),
        Err(OpsError::EmptyRegion)
    ));
}

#[test]
fn invert_reflects_through_type_range() {
    let mut session = session_with(
        Array2::from_shape_fn((3, 3), |(row, col)| (row * 3 + col) as f64 * 10.0),
        PixelType::U8,
    );
    session
        .run_command("edit.invert", &json!({}))
        .expect("invert");
    let plane = session.gray_plane_at(0).expect("plane");
    assert_eq!(plane[[0, 0]], 255.0);
    assert_eq!(plane[[2, 2]], 175.0);

    let mut floats = Array2::from_shape_vec((1, 3), vec![0.5, 1.0, 2.0])
        .expect("shape")
        .into_dyn();
    invert_plane(floats.view_mut(), PixelType::F32);
    assert_eq!(floats.iter().copied().collect::<Vec<_>>(), vec![2.0, 1.5, 0.5]);
}

#[test]
fn invert_targets_the_slice_of_the_roi() {
    let data = Array3::from_elem((2, 4, 4), 0.0).into_dyn();
    let mut session = ViewerSession::default();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data, PixelType::U8).expect("buffer"),
    );
    session.set_slice(1).expect("slice");
    let roi_id = drag(&mut session, (0.5, 0.5), (3.5, 3.5));
    session.set_slice(0).expect("slice");

    session
        .run_command("edit.invert", &json!({ "roi_id": roi_id }))
        .expect("invert");
    assert_eq!(session.gray_plane_at(0).expect("plane")[[0, 0]], 0.0);
    assert_eq!(session.gray_plane_at(1).expect("plane")[[0, 0]], 255.0);
}

#[test]
fn smooth_spreads_a_spike_and_keeps_flat_regions() {
    let mut plane = Array2::<f64>::zeros((5, 5)).into_dyn();
    plane[[2, 2]] = 90.0;
    smooth_plane(&mut plane.view_mut(), false).expect("smooth");
    assert!((plane[[2, 2]] - 10.0).abs() < 1e-9);
    assert!((plane[[1, 1]] - 10.0).abs() < 1e-9);
    assert_eq!(plane[[0, 0]], 0.0);

    let mut session = session_with(Array2::from_elem((6, 6), 42.0), PixelType::U8);
    session
        .run_command("process.smooth", &json!({}))
        .expect("smooth");
    let smoothed = session.gray_plane_at(0).expect("plane");
    assert!(smoothed.iter().all(|value| *value == 42.0));
}

#[test]
fn unknown_command_does_not_disturb_others() {
    let mut session = session_with(Array2::from_elem((8, 8), 1.0), PixelType::U8);
    let error = session
        .run_command("plugins.missing", &json!({}))
        .expect_err("unknown");
    assert!(matches!(error, OpsError::UnknownCommand(_)));

    assert!(session.run_command("process.smooth", &json!({})).is_ok());
    assert!(matches!(
        invoke_command(&mut session, "analyze.measure", &json!({})),
        Err(OpsError::InvalidParams(_))
    ));
}

#[test]
fn properties_update_and_list_coordinates() {
    let mut session = session_with(Array2::zeros((50, 50)), PixelType::U8);
    session.set_tool(ShapeKind::DynamicLine);
    let roi_id = drag(&mut session, (5.0, 5.0), (25.0, 5.0));

    let output = session
        .run_context_action(roi_id, ContextAction::Properties)
        .expect("properties");
    let table = output.measurements.expect("table");
    assert_eq!(table.values["properties"]["stroke_color"], "red");
    assert!(!table.values.contains_key("coordinates"));

    let output = session
        .run_command(
            "roi.properties",
            &json!({ "roi_id": roi_id, "name": "edge", "list_coordinates": true }),
        )
        .expect("properties");
    let table = output.measurements.expect("table");
    assert_eq!(table.values["coordinates"], json!([[5.0, 5.0], [25.0, 5.0]]));
    let roi = session.editor().store().get(roi_id).expect("roi");
    assert_eq!(roi.properties.name, "edge");

    session
        .run_context_action(roi_id, ContextAction::Delete)
        .expect("delete");
    assert!(session.editor().store().get(roi_id).is_none());
    assert!(matches!(
        session.run_command("roi.delete", &json!({ "roi_id": roi_id })),
        Err(OpsError::UnknownRoi(_))
    ));
}

#[test]
fn raw_import_command_merges_with_last_params() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("words.raw");
    fs::write(&path, [0u8, 1, 0, 2, 0, 3, 0, 4]).expect("write raw");
    let mut session = ViewerSession::default();

    let output = session
        .run_command(
            "file.import.raw",
            &json!({
                "path": path,
                "image_type": "16-bit Unsigned",
                "width": 2,
                "height": 2,
            }),
        )
        .expect("import");
    let table = output.measurements.expect("table");
    assert_eq!(table.values["shape"], json!([2, 2]));
    assert_eq!(session.gray_plane_at(0).expect("plane")[[1, 1]], 4.0);
    assert_eq!(session.raw_params().width, 2);

    let missing = dir.path().join("missing.raw");
    assert!(
        session
            .run_command("file.import.raw", &json!({ "path": missing }))
            .is_err()
    );
    assert_eq!(session.gray_plane_at(0).expect("plane")[[0, 1]], 2.0);
}

#[test]
fn orthogonal_views_follow_clicks() {
    let data = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 100 + y * 10 + x) as f64);
    let mut session = ViewerSession::default();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data.into_dyn(), PixelType::U16)
            .expect("buffer"),
    );

    let output = session
        .run_command("image.stacks.orthogonal_views", &json!({}))
        .expect("ortho");
    let table = output.measurements.expect("table");
    assert_eq!(table.values["cursor"], json!({ "x": 2, "y": 2, "z": 1 }));
    assert_eq!(table.values["refreshed"], json!(["xy", "xz", "yz"]));

    let output = session
        .run_command(
            "image.stacks.orthogonal_views",
            &json!({ "plane": "xz", "row": 2, "col": 4 }),
        )
        .expect("click");
    let table = output.measurements.expect("table");
    assert_eq!(table.values["cursor"], json!({ "x": 4, "y": 2, "z": 2 }));
    assert_eq!(table.values["refreshed"], json!(["xy", "yz"]));
}

#[test]
fn pixel_edits_discard_stale_orthogonal_views() {
    let data = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 100 + y * 10 + x) as f64);
    let mut session = ViewerSession::default();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data.into_dyn(), PixelType::U16)
            .expect("buffer"),
    );
    session
        .run_command("image.stacks.orthogonal_views", &json!({}))
        .expect("ortho");
    assert_eq!(
        session.ortho().expect("views").plane(OrthoPlane::Xz)[[0, 0]],
        20.0
    );

    session
        .run_command("edit.invert", &json!({}))
        .expect("invert");
    assert!(session.ortho().is_none());

    session
        .run_command("image.stacks.orthogonal_views", &json!({}))
        .expect("ortho");
    assert_eq!(
        session.ortho().expect("views").plane(OrthoPlane::Xz)[[0, 0]],
        65515.0
    );

    session
        .run_command("process.smooth", &json!({}))
        .expect("smooth");
    assert!(session.ortho().is_none());
}
