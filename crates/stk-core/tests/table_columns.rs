use stk_core::table::{ColumnMap, TrackTable, FRAME_COLUMN, INTENSITY_COLUMN, TRACK_ID_COLUMN};
use stk_core::StkError;

#[test]
fn rename_lists_must_match_in_length() {
    let err = ColumnMap::from_renames(&["SPOT_ID", "T"], &[TRACK_ID_COLUMN]).unwrap_err();
    assert!(matches!(err, StkError::Parameter(_)));
    assert_eq!(err.info().code, "rename-length-mismatch");
}

#[test]
fn aliases_resolve_to_canonical_columns() {
    let map = ColumnMap::from_renames(
        &["SPOT_ID", "POSITION_T", "CH1"],
        &[TRACK_ID_COLUMN, FRAME_COLUMN, INTENSITY_COLUMN],
    )
    .unwrap();

    let table = TrackTable::from_named_columns(
        &["SPOT_ID", "POSITION_T", "CH1"],
        &[
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
            vec![10.0, 20.0, 30.0],
        ],
        &map,
    )
    .unwrap();

    assert_eq!(table.track_ids(), vec![0, 1]);
    let series = table.select(0).unwrap();
    // Sorted by frame, not by input order.
    assert_eq!(series.frames, vec![0.0, 1.0]);
    assert_eq!(series.intensities, vec![20.0, 10.0]);
}

#[test]
fn missing_column_is_a_parameter_error() {
    let err = TrackTable::from_named_columns(
        &["FRAME"],
        &[vec![0.0]],
        &ColumnMap::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "missing-column");
}

#[test]
fn select_unknown_id_returns_none() {
    let table =
        TrackTable::from_columns(vec![0, 0], vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
    assert!(table.select(3).is_none());
}

#[test]
fn push_track_accumulates_rows_and_retention() {
    let mut table = TrackTable::new();
    table.push_track(0, &[0.0, 0.5], &[1.0, 2.0], Some(3.0));
    table.push_track(1, &[0.0], &[4.0], Some(3.0));
    assert_eq!(table.len(), 3);
    assert_eq!(table.track_ids(), vec![0, 1]);
    assert_eq!(table.retention_time_of(1), Some(3.0));
}
