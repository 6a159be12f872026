use assert_approx_eq::assert_approx_eq;
use tempfile::tempdir;

use watermark_remover_lib::{ParamField, ParameterStore, RemovalMode, RemovalParams, WatermarkError};

#[test]
fn edits_stay_on_the_current_page_by_default() {
    let mut store = ParameterStore::new(3, RemovalParams::default());
    store.select(1);
    store.set_field(ParamField::RMin, 42.0);

    assert_eq!(store.records()[1].r_min, 42);
    assert_eq!(store.records()[0].r_min, 90);
    assert_eq!(store.records()[2].r_min, 90);
}

#[test]
fn broadcast_echoes_every_field_edit() {
    let mut store = ParameterStore::new(4, RemovalParams::default());
    assert!(store.toggle_apply_same_parameters());
    store.select(2);
    store.set_field(ParamField::BMax, 200.0);
    store.set_field(ParamField::Sharpen, 12.0);

    for record in store.records() {
        assert_eq!(record.b_max, 200);
        assert_approx_eq!(record.sharpen_weight, 1.2, 1e-6);
    }

    assert!(!store.toggle_apply_same_parameters());
    store.set_field(ParamField::GMin, 5.0);
    assert_eq!(store.records()[2].g_min, 5);
    assert_eq!(store.records()[0].g_min, 90);
}

#[test]
fn copy_current_to_all() {
    let mut store = ParameterStore::new(3, RemovalParams::default());
    store.set_current(RemovalParams { mode: RemovalMode::Inpaint, r_max: 10, ..RemovalParams::default() });
    store.set_all_parameters_the_same_as_current();
    assert!(store.records().iter().all(|r| r.mode == RemovalMode::Inpaint && r.r_max == 10));
}

#[test]
fn selection_is_clamped_to_the_page_count() {
    let mut store = ParameterStore::new(2, RemovalParams::default());
    store.select(9);
    assert_eq!(store.current_index(), 1);
}

#[test]
fn json_roundtrip_and_count_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("params.json");

    let mut store = ParameterStore::new(2, RemovalParams::default());
    store.select(1);
    store.set_field(ParamField::Mode, 0.0);
    store.save_json(&path).unwrap();

    let mut loaded = ParameterStore::new(2, RemovalParams::default());
    loaded.load_json(&path).unwrap();
    assert_eq!(loaded.records(), store.records());
    assert_eq!(loaded.records()[1].mode, RemovalMode::Inpaint);

    let mut wrong = ParameterStore::new(5, RemovalParams::default());
    let err = wrong.load_json(&path).unwrap_err();
    assert!(matches!(err, WatermarkError::ParameterCount { pages: 5, params: 2 }));
}

#[test]
fn partial_json_records_use_defaults() {
    let record: RemovalParams = serde_json::from_str(r#"{"r_min": 12, "mode": "inpaint"}"#).unwrap();
    assert_eq!(record.r_min, 12);
    assert_eq!(record.g_max, 240);
    assert_eq!(record.mode, RemovalMode::Inpaint);
}
