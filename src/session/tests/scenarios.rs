//! End-to-end editing scenarios.

use super::{draw, open_session};
use crate::error::EditorError;
use crate::model::{AnnotationId, AnnotationPatch, GeometryPatch, ReportId, Shape, Side, Tool};
use crate::persistence::{DraftCache, ReportAnnotations};
use crate::session::{EditorMessage, EditorSession};

fn seeded_payload() -> ReportAnnotations {
    serde_json::from_str(
        r#"{
            "leftFundusAnnotationCoordinates": [
                {"id": "1718000000001", "type": "rectangle", "x": 10, "y": 10, "width": 20, "height": 20,
                 "stroke": "red", "fill": "transparent", "strokeWidth": 2, "label": "hemorrhage"},
                {"id": "1718000000002", "type": "oval", "x": 100, "y": 80, "radiusX": 15, "radiusY": 10,
                 "stroke": "red", "fill": "transparent", "strokeWidth": 2, "label": "optic disc"}
            ],
            "rightFundusAnnotationCoordinates": []
        }"#,
    )
    .expect("valid payload")
}

#[test]
fn test_point_submit_undo_redo() {
    let mut session = open_session();
    draw(&mut session, Tool::Point, Side::Left, (50.0, 50.0), (50.0, 50.0));

    let id = session.submit_label("drusen").expect("report open").expect("committed");

    let left = session.annotations(Side::Left);
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, id);
    assert_eq!(left[0].label, "drusen");
    assert_eq!(
        left[0].shape,
        Shape::Point {
            x: 50.0,
            y: 50.0,
            radius: 5.0
        }
    );
    let store = session.store().expect("report open");
    assert_eq!(store.undo_count(Side::Left), 1);
    assert_eq!(store.redo_count(Side::Left), 0);

    assert!(session.undo(Side::Left).expect("report open"));
    assert!(session.annotations(Side::Left).is_empty());
    let store = session.store().expect("report open");
    assert_eq!(store.undo_count(Side::Left), 0);
    assert_eq!(store.redo_count(Side::Left), 1);

    assert!(session.redo(Side::Left).expect("report open"));
    assert_eq!(session.annotations(Side::Left).len(), 1);
    assert_eq!(session.annotations(Side::Left)[0].label, "drusen");
    let store = session.store().expect("report open");
    assert_eq!(store.undo_count(Side::Left), 1);
    assert_eq!(store.redo_count(Side::Left), 0);
}

#[test]
fn test_up_left_rectangle_keeps_negative_extents() {
    let mut session = open_session();
    draw(&mut session, Tool::Rectangle, Side::Right, (10.0, 10.0), (5.0, 5.0));
    session.submit_label("").expect("report open");

    let committed = &session.annotations(Side::Right)[0];
    assert_eq!(
        committed.shape,
        Shape::Rectangle {
            x: 10.0,
            y: 10.0,
            width: -5.0,
            height: -5.0
        }
    );
    assert_eq!(
        committed.shape.normalized(),
        Shape::Rectangle {
            x: 5.0,
            y: 5.0,
            width: 5.0,
            height: 5.0
        }
    );
}

#[test]
fn test_seed_is_not_undoable() {
    let mut session = EditorSession::default();
    session
        .open_report(ReportId::new("r"), &seeded_payload())
        .expect("valid seed");

    assert_eq!(session.annotations(Side::Left).len(), 2);
    assert_eq!(session.annotations(Side::Right).len(), 0);
    for side in Side::all() {
        assert!(!session.can_undo(side));
        assert!(!session.can_redo(side));
    }
    assert!(!session.has_unsaved_changes());
}

#[test]
fn test_delete_unknown_id_changes_nothing() {
    let mut session = EditorSession::default();
    session
        .open_report(ReportId::new("r"), &seeded_payload())
        .expect("valid seed");

    let removed = session
        .delete_annotation(Side::Left, &AnnotationId::new("nonexistent-id"))
        .expect("report open");

    assert!(removed.is_none());
    assert_eq!(session.annotations(Side::Left).len(), 2);
    let store = session.store().expect("report open");
    assert_eq!(store.undo_count(Side::Left), 0);
}

#[test]
fn test_delete_is_not_undoable() {
    let mut session = EditorSession::default();
    session
        .open_report(ReportId::new("r"), &seeded_payload())
        .expect("valid seed");

    let removed = session
        .delete_annotation(Side::Left, &AnnotationId::new("1718000000001"))
        .expect("report open");

    assert!(removed.is_some());
    assert_eq!(session.annotations(Side::Left).len(), 1);
    assert!(!session.can_undo(Side::Left));
    assert!(session.has_unsaved_changes());
}

#[test]
fn test_save_payload_round_trips_seed() {
    let mut session = EditorSession::default();
    let seed = seeded_payload();
    session.open_report(ReportId::new("r"), &seed).expect("valid seed");

    let payload = session.save_payload().expect("report open");
    assert_eq!(payload, seed);
}

#[test]
fn test_update_via_patch() {
    let mut session = EditorSession::default();
    session
        .open_report(ReportId::new("r"), &seeded_payload())
        .expect("valid seed");
    let id = AnnotationId::new("1718000000002");

    let patch = AnnotationPatch::new()
        .label("optic cup")
        .geometry(GeometryPatch::Oval {
            x: None,
            y: None,
            radius_x: Some(20.0),
            radius_y: None,
        });
    assert!(session.update_annotation(Side::Left, &id, &patch).expect("oval patch"));
    let oval = &session.annotations(Side::Left)[1];
    assert_eq!(oval.label, "optic cup");
    assert_eq!(
        oval.shape,
        Shape::Oval {
            x: 100.0,
            y: 80.0,
            radius_x: 20.0,
            radius_y: 10.0
        }
    );

    let wrong = AnnotationPatch::new().geometry(GeometryPatch::Rectangle {
        x: None,
        y: None,
        width: Some(1.0),
        height: None,
    });
    let err = session.update_annotation(Side::Left, &id, &wrong).unwrap_err();
    assert!(matches!(err, EditorError::ShapeMismatch { .. }));
    assert_eq!(session.annotations(Side::Left)[1].label, "optic cup");
    assert!(!session.can_undo(Side::Left));
}

#[test]
fn test_commands_need_an_open_report() {
    let mut session = EditorSession::default();
    session.set_tool(Some(Tool::Point));

    assert!(!session.pointer_down(Side::Left, crate::model::Position::new(1.0, 1.0)));
    assert!(matches!(session.undo(Side::Left), Err(EditorError::NoActiveReport)));
    assert!(matches!(session.reset_all(), Err(EditorError::NoActiveReport)));
    assert!(session.annotations(Side::Left).is_empty());
    assert!(matches!(
        session.switch_report(ReportId::new("missing")),
        Err(EditorError::UnknownReport(_))
    ));
}

#[test]
fn test_reports_keep_separate_state() {
    let mut session = open_session();
    draw(&mut session, Tool::Point, Side::Left, (1.0, 1.0), (1.0, 1.0));
    session.submit_label("first").expect("report open");

    session
        .open_report(ReportId::new("report-2"), &ReportAnnotations::default())
        .expect("empty report opens");
    assert!(session.annotations(Side::Left).is_empty());
    assert!(!session.can_undo(Side::Left));

    session
        .switch_report(ReportId::new("report-1"))
        .expect("still loaded");
    assert_eq!(session.annotations(Side::Left)[0].label, "first");
    assert!(session.can_undo(Side::Left));

    assert!(session.close_report(&ReportId::new("report-1")));
    assert_eq!(session.active_report(), None);
    assert!(session.reports().contains(&ReportId::new("report-2")));
}

#[test]
fn test_switching_report_discards_provisional_shape() {
    let mut session = open_session();
    session
        .open_report(ReportId::new("report-2"), &ReportAnnotations::default())
        .expect("empty report opens");
    draw(&mut session, Tool::Oval, Side::Left, (0.0, 0.0), (4.0, 4.0));

    session
        .switch_report(ReportId::new("report-1"))
        .expect("still loaded");

    assert!(session.provisional().is_none());
    assert_eq!(session.cancel_label().expect("report open"), None);
    assert!(session.annotations(Side::Left).is_empty());
}

#[test]
fn test_reloading_active_report_discards_pending_label() {
    let mut session = open_session();
    draw(&mut session, Tool::Point, Side::Right, (5.0, 5.0), (5.0, 5.0));

    session
        .open_report(ReportId::new("report-1"), &seeded_payload())
        .expect("seed decodes");

    assert!(session.pending_label().is_none());
    assert_eq!(session.submit_label("stale").expect("report open"), None);
    assert!(session.annotations(Side::Right).is_empty());
    assert_eq!(session.annotations(Side::Left).len(), 2);
    assert!(!session.can_undo(Side::Right));
}

#[test]
fn test_bad_seed_keeps_previous_state() {
    let mut session = open_session();
    draw(&mut session, Tool::Point, Side::Left, (1.0, 1.0), (1.0, 1.0));
    session.submit_label("kept").expect("report open");

    let bad: ReportAnnotations = serde_json::from_str(
        r#"{"leftFundusAnnotationCoordinates": [{"type": "polygon", "x": 0, "y": 0}]}"#,
    )
    .expect("valid JSON");
    assert!(matches!(
        session.open_report(ReportId::new("report-1"), &bad),
        Err(EditorError::Persistence(_))
    ));
    assert_eq!(session.annotations(Side::Left)[0].label, "kept");
}

#[test]
fn test_save_failure_keeps_annotations() {
    let mut session = open_session();
    draw(&mut session, Tool::Point, Side::Right, (3.0, 3.0), (3.0, 3.0));
    session.submit_label("exudate").expect("report open");
    assert!(session.has_unsaved_changes());

    let (_, token) = session.begin_save().expect("report open");
    session.mark_save_failed("timeout").expect("report open");
    assert!(session.has_unsaved_changes());
    assert_eq!(session.annotations(Side::Right).len(), 1);
    let report = ReportId::new("report-1");
    assert_eq!(
        session.tracker(&report).and_then(|t| t.last_error()),
        Some("timeout")
    );

    assert!(session.mark_saved(token).expect("report open"));
    assert!(!session.has_unsaved_changes());
}

#[test]
fn test_draft_written_and_restored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let drafts = DraftCache::new(dir.path());
    let report = ReportId::new("report-1");

    let mut session = EditorSession::default().with_draft_cache(drafts.clone());
    session
        .open_report(report.clone(), &ReportAnnotations::default())
        .expect("empty report opens");
    draw(&mut session, Tool::Rectangle, Side::Left, (0.0, 0.0), (8.0, 6.0));
    session.submit_label("drusen").expect("report open");

    let mut recovered = EditorSession::default().with_draft_cache(drafts.clone());
    assert!(recovered.restore_draft(report.clone()).expect("draft readable"));
    assert_eq!(recovered.annotations(Side::Left)[0].label, "drusen");
    assert!(recovered.has_unsaved_changes());
    assert!(!recovered.can_undo(Side::Left));

    let (_, token) = session.begin_save().expect("report open");
    assert!(session.mark_saved(token).expect("report open"));
    assert!(drafts.load(&report).expect("readable").is_none());
}

#[test]
fn test_edits_during_save_stay_unsaved() {
    let dir = tempfile::tempdir().expect("temp dir");
    let drafts = DraftCache::new(dir.path());
    let report = ReportId::new("report-1");

    let mut session = EditorSession::default().with_draft_cache(drafts.clone());
    session
        .open_report(report.clone(), &ReportAnnotations::default())
        .expect("empty report opens");
    draw(&mut session, Tool::Point, Side::Left, (1.0, 1.0), (1.0, 1.0));
    session.submit_label("first").expect("report open");

    let (payload, token) = session.begin_save().expect("report open");
    assert_eq!(payload.len(), 1);

    draw(&mut session, Tool::Point, Side::Left, (2.0, 2.0), (2.0, 2.0));
    session.submit_label("second").expect("report open");

    assert!(!session.mark_saved(token).expect("report open"));
    assert!(session.has_unsaved_changes());
    let draft = drafts.load(&report).expect("readable").expect("draft kept");
    assert_eq!(draft.len(), 2);

    let (_, token) = session.begin_save().expect("report open");
    assert!(session.mark_saved(token).expect("report open"));
    assert!(!session.has_unsaved_changes());
    assert!(drafts.load(&report).expect("readable").is_none());
}

#[test]
fn test_replay_messages() {
    let mut session = open_session();
    let script: Vec<EditorMessage> = serde_json::from_str(
        r#"[
            {"command": "set_canvas_bounds", "side": "left", "width": 100, "height": 100},
            {"command": "set_tool", "tool": "rectangle"},
            {"command": "pointer_down", "side": "left", "x": 90, "y": 90},
            {"command": "pointer_move", "side": "left", "x": 120, "y": 95},
            {"command": "pointer_up", "side": "left", "x": 130, "y": 99},
            {"command": "submit_label", "label": "lesion"},
            {"command": "set_tool", "tool": "point"},
            {"command": "pointer_down", "side": "right", "x": 5, "y": 5},
            {"command": "cancel_label"},
            {"command": "undo", "side": "right"},
            {"command": "redo", "side": "right"}
        ]"#,
    )
    .expect("valid script");

    for message in script {
        session.update(message).expect("message applies");
    }

    assert_eq!(
        session.annotations(Side::Left)[0].shape,
        Shape::Rectangle {
            x: 90.0,
            y: 90.0,
            width: 10.0,
            height: 9.0
        }
    );
    assert_eq!(session.annotations(Side::Right)[0].label, "");
    assert!(session.can_undo(Side::Right));
    assert!(!session.can_redo(Side::Right));
}
