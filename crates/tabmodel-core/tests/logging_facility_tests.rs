#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::sales_model;
use tabmodel_core::errors::{ExError, ExErrorKind, ModelError};
use tabmodel_core::logging_facility::test_capture::init_test_capture;
use tabmodel_core::{apply, log_op_end, log_op_error, log_op_start, Command, ObjectId, ObjectKind};
use tabmodel_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DOCUMENT_ID, FIELD_DURATION_MS, FIELD_EDGE_COUNT,
    FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_OBJECT_ID, FIELD_VISITED,
};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let events = capture.events();
    let start_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
    assert!(start_events[0].component.is_some());
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ModelError::ObjectNotFound {
        object_id: ObjectId::new(17),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    let error_event = &error_events[0];
    assert_eq!(error_event.level, Level::ERROR);
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field(FIELD_ERR_KIND), Some("NotFound"));
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, object_id = "#12", object_kind = "Measure");

    let start_event = capture
        .events_for_op(op_name)
        .into_iter()
        .next()
        .expect("Should have start event");

    assert_eq!(start_event.field(FIELD_OBJECT_ID), Some("#12"));
    assert_eq!(start_event.field("object_kind"), Some("Measure"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_capture_count_events() {
    let capture = init_test_capture();
    let op1_name = "test_count_events_op1_unique_5";
    let op2_name = "test_count_events_op2_unique_5";

    log_op_start!(op1_name);
    log_op_start!(op2_name);
    log_op_end!(op1_name, duration_ms = 10);

    let start_count = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_START)
            && (e.op.as_deref() == Some(op1_name) || e.op.as_deref() == Some(op2_name))
    });
    let end_count = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_END)
            && (e.op.as_deref() == Some(op1_name) || e.op.as_deref() == Some(op2_name))
    });

    assert_eq!(start_count, 2);
    assert_eq!(end_count, 1);
}

#[test]
fn test_error_conversion_preserves_context() {
    let capture = init_test_capture();
    let op_name = "test_error_conversion_unique_6";

    let err = ModelError::DeletionForbidden {
        object_id: ObjectId::new(3),
        kind: ObjectKind::Perspective,
        reason: "locked".to_string(),
    };
    log_op_error!(op_name, err.clone(), duration_ms = 5);

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::DeletionForbidden);
    assert_eq!(ex_err.object_id(), Some("#3"));

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let error_event = capture.events_for_op(op_name).pop().unwrap();
    assert_eq!(
        error_event.field(FIELD_ERR_CODE),
        Some("ERR_DELETION_FORBIDDEN")
    );
}

#[test]
fn test_apply_brackets_each_command_once() {
    // GIVEN a model and the capture layer
    let capture = init_test_capture();
    let (mut model, f) = sales_model();
    let document = model.document_id().to_string();

    // WHEN one delete command is applied
    apply(&mut model, Command::Delete { object: f.double }).unwrap();

    // THEN exactly one start carries this document and the target
    let starts: Vec<_> = capture
        .events_for_op("delete_object")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_START)
                && e.field(FIELD_DOCUMENT_ID) == Some(document.as_str())
        })
        .collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(
        starts[0].field(FIELD_OBJECT_ID),
        Some(f.double.to_string().as_str())
    );
    assert!(capture
        .events_for_op("delete_object")
        .iter()
        .any(|e| e.event.as_deref() == Some(EVENT_END) && e.field(FIELD_DURATION_MS).is_some()));
}

#[test]
fn test_apply_logs_failures_with_code() {
    let capture = init_test_capture();
    let (mut model, f) = sales_model();

    let result = apply(&mut model, Command::Delete { object: f.amount });
    assert!(result.is_err());

    let failed = capture
        .events_for_op("delete_object")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .any(|e| e.field(FIELD_ERR_CODE) == Some("ERR_DELETION_FORBIDDEN"));
    assert!(failed);
}

#[test]
fn test_rebuild_logs_counts() {
    let capture = init_test_capture();
    let (mut model, _) = sales_model();

    apply(&mut model, Command::RebuildDependencies).unwrap();

    let visited = model.live_objects().len().to_string();
    let rebuilt = capture.count_events(|e| {
        e.field(FIELD_VISITED) == Some(visited.as_str()) && e.field(FIELD_EDGE_COUNT) == Some("2")
    });
    assert!(rebuilt >= 1);
}
