use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::Instant;

use ndarray::Array3;
use serde_json::json;
use tempfile::tempdir;

use super::{
    AppContext, PixelProbe, SessionConfig, StatusLevel, ViewerSession, load_config, save_config,
};
use crate::formats::{RawImportParams, RawSampleType, load_params};
use crate::model::{PixelBuffer, PixelType};
use crate::ui::interaction::{CanvasButton, CanvasEvent, EditOutcome, ShapeKind};

fn layered_session(depth: usize) -> ViewerSession {
    let data = Array3::from_shape_fn((depth, 8, 8), |(z, _, x)| (z * 10 + x) as f64).into_dyn();
    let mut session = ViewerSession::default();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data, PixelType::U8).expect("buffer"),
    );
    session
}

#[test]
fn hover_listener_receives_probe_for_current_slice() {
    let seen = Rc::new(RefCell::new(Vec::<PixelProbe>::new()));
    let sink = Rc::clone(&seen);
    let mut session = ViewerSession::with_hover_listener(
        SessionConfig::default(),
        Box::new(move |probe: &PixelProbe| sink.borrow_mut().push(*probe)),
    );
    let data = Array3::from_shape_fn((2, 8, 8), |(z, _, x)| (z * 10 + x) as f64).into_dyn();
    session.load_buffer(
        PixelBuffer::from_data_with_default_metadata(data, PixelType::U8).expect("buffer"),
    );
    session.set_slice(1).expect("slice");

    let outcome = session.handle_event(&CanvasEvent::moved(3.5, 2.0));
    assert!(matches!(outcome, EditOutcome::Hover { .. }));
    session.handle_event(&CanvasEvent::moved(30.0, 2.0));

    let probes = seen.borrow();
    assert_eq!(probes.len(), 1);
    assert_eq!(
        probes[0],
        PixelProbe {
            x: 3,
            y: 2,
            z: 1,
            value: 13.0
        }
    );
}

#[test]
fn slice_changes_move_new_rois_to_that_slice() {
    let mut session = layered_session(3);
    session.step_slice(false).expect("step");
    assert_eq!(session.navigator().index(), 2);

    session.handle_event(&CanvasEvent::press(CanvasButton::Primary, 1.0, 1.0));
    session.handle_event(&CanvasEvent::moved(4.0, 4.0));
    let outcome = session.handle_event(&CanvasEvent::release(CanvasButton::Primary, 4.0, 4.0));
    let EditOutcome::Finalized { roi_id } = outcome else {
        panic!("expected finalized roi");
    };
    let roi = session.editor().store().get(roi_id).expect("roi");
    assert_eq!(roi.position.z, 2);
}

#[test]
fn playback_ticks_move_the_editor_slice() {
    let mut session = layered_session(3);
    let start = Instant::now();
    let interval = session.navigator().interval();
    assert!(session.toggle_playback(start));
    assert!(!session.tick(start).expect("tick"));
    assert!(session.tick(start + interval).expect("tick"));
    assert_eq!(session.navigator().index(), 1);
    assert_eq!(session.editor().position().z, 1);

    assert!(!session.toggle_playback(start + interval));
    assert!(!session.tick(start + interval * 4).expect("tick"));
    assert_eq!(session.navigator().index(), 1);
}

#[test]
fn failing_command_is_reported_and_session_keeps_working() {
    let mut session = layered_session(2);
    assert!(session.run_command("no.such.command", &json!({})).is_err());
    assert_eq!(
        session.status().last().map(|line| line.level),
        Some(StatusLevel::Error)
    );

    assert!(session.run_command("image.stacks.next", &json!({})).is_ok());
    assert_eq!(session.navigator().index(), 1);
    assert_eq!(
        session.status().last().map(|line| line.level),
        Some(StatusLevel::Info)
    );
}

#[test]
fn empty_measurement_is_a_warning() {
    let mut session = layered_session(1);
    session.set_tool(ShapeKind::Rectangle);
    session.handle_event(&CanvasEvent::press(CanvasButton::Primary, 2.0, 2.0));
    session.handle_event(&CanvasEvent::moved(2.5, 6.0));
    session.handle_event(&CanvasEvent::release(CanvasButton::Primary, 2.5, 6.0));

    assert!(session.run_command("analyze.measure", &json!({})).is_err());
    let last = session.status().last().expect("status");
    assert_eq!(last.level, StatusLevel::Warning);
    assert_eq!(last.message, "Selected region is empty");
    assert_eq!(session.status_text(), Some("Selected region is empty"));
}

#[test]
fn raw_import_remembers_params_between_sessions() {
    let dir = tempdir().expect("tempdir");
    let raw_path = dir.path().join("frames.raw");
    fs::write(&raw_path, (0u8..24).collect::<Vec<_>>()).expect("write raw");
    let params_path = dir.path().join("raw_params.json");
    let config = SessionConfig {
        raw_params_path: Some(params_path.clone()),
        ..SessionConfig::default()
    };

    let mut session = ViewerSession::new(config.clone());
    let params = RawImportParams {
        image_type: RawSampleType::U8,
        width: 4,
        height: 3,
        num_images: 2,
        ..RawImportParams::default()
    };
    let report = session.import_raw(&raw_path, params.clone()).expect("import");
    assert!(report.warnings.is_empty());
    assert_eq!(session.navigator().depth(), 2);
    assert_eq!(load_params(&params_path).expect("saved params"), params);

    let reopened = ViewerSession::new(config);
    assert_eq!(reopened.raw_params(), &params);
}

#[test]
fn virtual_stack_reloads_slice_on_navigation() {
    let dir = tempdir().expect("tempdir");
    let raw_path = dir.path().join("virtual.raw");
    fs::write(&raw_path, [1u8, 1, 1, 1, 9, 9, 9, 9]).expect("write raw");
    let mut session = ViewerSession::default();
    let params = RawImportParams {
        image_type: RawSampleType::U8,
        width: 2,
        height: 2,
        num_images: 2,
        use_virtual_stack: true,
        ..RawImportParams::default()
    };
    session.import_raw(&raw_path, params).expect("import");
    assert!(session.virtual_stack().is_some());
    assert_eq!(session.gray_plane_at(0).expect("plane")[[0, 0]], 1.0);

    session.step_slice(true).expect("step");
    assert_eq!(session.plane_index(1), 0);
    assert_eq!(session.gray_plane_at(1).expect("plane")[[1, 1]], 9.0);
    assert!(session.gray_plane_at(0).is_err());
}

#[test]
fn unreadable_virtual_slice_keeps_current_slice() {
    let dir = tempdir().expect("tempdir");
    let raw_path = dir.path().join("vanishing.raw");
    fs::write(&raw_path, [1u8, 1, 1, 1, 9, 9, 9, 9]).expect("write raw");
    let mut session = ViewerSession::default();
    let params = RawImportParams {
        image_type: RawSampleType::U8,
        width: 2,
        height: 2,
        num_images: 2,
        use_virtual_stack: true,
        ..RawImportParams::default()
    };
    session.import_raw(&raw_path, params).expect("import");
    fs::remove_file(&raw_path).expect("remove raw");

    assert!(session.step_slice(true).is_err());
    assert_eq!(session.navigator().index(), 0);
    assert_eq!(session.editor().position().z, 0);
    assert_eq!(session.gray_plane_at(0).expect("plane")[[0, 0]], 1.0);
    assert!(session.gray_plane_at(1).is_err());
    assert!(session.set_slice(1).is_err());
    assert_eq!(session.navigator().index(), 0);
}

#[test]
fn failed_background_import_keeps_last_params() {
    let dir = tempdir().expect("tempdir");
    let mut session = ViewerSession::default();
    let before = session.raw_params().clone();
    session.start_background_import(
        dir.path().join("missing.raw"),
        RawImportParams {
            width: 9,
            height: 9,
            ..RawImportParams::default()
        },
    );

    let result = loop {
        if let Some(result) = session.poll_background_import() {
            break result;
        }
        std::thread::yield_now();
    };
    assert!(result.is_err());
    assert_eq!(session.raw_params(), &before);
    assert_eq!(
        session.status().last().map(|line| line.level),
        Some(StatusLevel::Error)
    );
}

#[test]
fn failed_import_keeps_current_buffer() {
    let mut session = layered_session(2);
    let missing = tempdir().expect("tempdir").path().join("missing.raw");
    assert!(session.import_raw(&missing, RawImportParams::default()).is_err());
    assert_eq!(session.buffer().map(PixelBuffer::shape), Some(&[2, 8, 8][..]));
}

#[test]
fn background_import_installs_buffer_when_done() {
    let dir = tempdir().expect("tempdir");
    let raw_path = dir.path().join("bg.raw");
    fs::write(&raw_path, [5u8; 16]).expect("write raw");
    let mut session = ViewerSession::default();
    session.start_background_import(
        &raw_path,
        RawImportParams {
            width: 4,
            height: 4,
            ..RawImportParams::default()
        },
    );
    assert!(session.is_loading());

    let report = loop {
        if let Some(result) = session.poll_background_import() {
            break result.expect("background load");
        }
        std::thread::yield_now();
    };
    assert!(report.warnings.is_empty());
    assert!(!session.is_loading());
    assert_eq!(session.gray_plane_at(0).expect("plane")[[3, 3]], 5.0);
    assert_eq!(session.raw_params().width, 4);
}

#[test]
fn config_round_trips_through_yaml_and_rejects_bad_tolerance() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("session.yaml");
    let mut config = SessionConfig::default();
    config.editor.hit_tolerance = 6.0;
    config.default_tool = ShapeKind::Ellipse;
    save_config(&path, &config).expect("save");
    assert_eq!(load_config(&path).expect("load"), config);

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"editor": {"hit_tolerance": 0}}"#).expect("write");
    assert!(load_config(&bad).is_err());

    let session = ViewerSession::new(load_config(&path).expect("load"));
    assert_eq!(session.editor().kind(), ShapeKind::Ellipse);
}

#[test]
fn context_lists_every_command_and_exports_planes() {
    let app = AppContext::new();
    let ids = app
        .command_service()
        .list()
        .into_iter()
        .map(|descriptor| descriptor.id)
        .collect::<Vec<_>>();
    assert!(ids.contains(&"analyze.measure".to_string()));
    assert!(ids.windows(2).all(|pair| pair[0] <= pair[1]));

    let session = layered_session(2);
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("slice.png");
    let buffer = session.buffer().expect("buffer");
    app.io_service()
        .export_plane(&out, buffer, 1)
        .expect("export");
    let reread = app.io_service().read_image(&out).expect("read back");
    assert_eq!(reread.shape(), &[8, 8]);
}
