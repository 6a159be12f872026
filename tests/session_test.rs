use assert_approx_eq::assert_approx_eq;
use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::tempdir;

use watermark_remover_lib::cursor::BrushShape;
use watermark_remover_lib::events::{Command, KeyCode, PointerButton, PointerEvent};
use watermark_remover_lib::image_utils::count_selected;
use watermark_remover_lib::{Config, EditingSession, Mode, WatermarkError};

/// White pages with a gray block standing in for a watermark
fn pages(count: usize) -> Vec<RgbImage> {
    (0..count)
        .map(|i| {
            RgbImage::from_fn(60, 40, |x, y| {
                if (10..30).contains(&x) && (10..30).contains(&y) {
                    Rgb([150, 150, 150])
                } else {
                    Rgb([250, 250, 250 - i as u8])
                }
            })
        })
        .collect()
}

fn session(count: usize) -> EditingSession {
    EditingSession::new(pages(count), Config::default()).unwrap()
}

fn select_rect(session: &mut EditingSession, x0: i32, y0: i32, x1: i32, y1: i32) {
    session.handle_pointer(PointerEvent::press(PointerButton::Left, x0, y0));
    session.handle_pointer(PointerEvent::moved(x1, y0));
    session.handle_pointer(PointerEvent::moved(x1, y1));
    session.handle_pointer(PointerEvent::moved(x0, y1));
    session.handle_pointer(PointerEvent::release(PointerButton::Left, x0, y1));
}

#[test]
fn starts_in_select_with_blank_masks() {
    let session = session(2);
    assert_eq!(session.mode(), Mode::Select);
    assert_eq!(count_selected(session.masks().final_mask()), 0);
    assert_eq!(session.masks().final_mask().dimensions(), (60, 40));
}

#[test]
fn drawn_circle_is_undone_pixel_for_pixel() {
    let config = Config { cursor_size: 5, ..Config::default() };
    let mut session = EditingSession::new(pages(1), config).unwrap();
    session.change_mode(Mode::Draw).unwrap();
    let before = session.masks().snapshot();

    session.handle_pointer(PointerEvent::press(PointerButton::Left, 20, 20));
    session.handle_pointer(PointerEvent::release(PointerButton::Left, 20, 20));
    assert_eq!(session.masks().temp_mask().get_pixel(20, 20)[0], 255);
    assert_eq!(session.masks().temp_mask().get_pixel(20, 26)[0], 0);

    session.undo();
    assert_eq!(session.masks().snapshot(), before);
}

#[test]
fn threshold_erode_dilate_leave_final_untouched() {
    let dir = tempdir().unwrap();
    let mask_path = dir.path().join("committed.png");
    GrayImage::from_fn(60, 40, |x, _| Luma([if x > 45 { 255 } else { 0 }]))
        .save(&mask_path)
        .unwrap();

    let mut session = session(3);
    session.load_mask(&mask_path);
    let committed = session.masks().final_mask().clone();

    select_rect(&mut session, 5, 5, 35, 35);
    session.advance().unwrap();
    assert_eq!(session.mode(), Mode::Threshold);

    session.set_threshold(100, 200);
    let thresholded = count_selected(session.masks().temp_mask_after_threshold());
    assert_eq!(thresholded, 400);

    session.execute(Command::Erode).unwrap();
    session.execute(Command::Dilate).unwrap();
    assert_eq!(session.masks().final_mask(), &committed);
    assert!(count_selected(session.masks().temp_mask_after_threshold()) > 0);
}

#[test]
fn committing_twice_equals_committing_once() {
    let mut session = session(2);
    select_rect(&mut session, 5, 5, 35, 35);
    session.advance().unwrap();
    session.set_threshold(100, 200);
    session.advance().unwrap();

    assert_eq!(session.mode(), Mode::Select);
    let once = session.masks().final_mask().clone();
    assert_eq!(count_selected(&once), 400);
    assert_eq!(count_selected(session.masks().temp_mask()), 0);

    session.change_mode(Mode::Threshold).unwrap();
    session.commit_threshold().unwrap();
    assert_eq!(session.masks().final_mask(), &once);
}

#[test]
fn cancel_discards_the_threshold_result() {
    let mut session = session(1);
    select_rect(&mut session, 5, 5, 35, 35);
    session.advance().unwrap();
    session.handle_key(KeyCode::Escape);

    assert_eq!(session.mode(), Mode::Select);
    assert_eq!(count_selected(session.masks().final_mask()), 0);
    assert_eq!(count_selected(session.masks().temp_mask()), 0);
}

#[test]
fn undo_in_threshold_mode_recomputes_the_result() {
    let mut session = session(1);
    select_rect(&mut session, 5, 5, 35, 35);
    session.advance().unwrap();
    session.set_threshold(100, 200);
    let result = session.masks().temp_mask_after_threshold().clone();

    session.execute(Command::Dilate).unwrap();
    assert_ne!(session.masks().temp_mask_after_threshold(), &result);
    session.undo();
    assert_eq!(session.masks().temp_mask_after_threshold(), &result);
}

#[test]
fn invalid_transition_is_rejected_and_mode_kept() {
    let mut session = session(1);
    session.change_mode(Mode::Adjust).unwrap();
    let err = session.change_mode(Mode::Draw).unwrap_err();
    assert!(matches!(err, WatermarkError::InvalidTransition { from: Mode::Adjust, to: Mode::Draw }));
    assert_eq!(session.mode(), Mode::Adjust);
}

#[test]
fn reselecting_draw_toggles_brush_shape() {
    let mut session = session(1);
    session.change_mode(Mode::Draw).unwrap();
    assert_eq!(session.cursor().shape, BrushShape::Circle);
    session.change_mode(Mode::Draw).unwrap();
    assert_eq!(session.cursor().shape, BrushShape::Square);
}

#[test]
fn wheel_resizes_brush_within_bounds() {
    let mut session = session(1);
    session.change_mode(Mode::Draw).unwrap();
    for _ in 0..100 {
        session.handle_pointer(PointerEvent::wheel(1, 0, 0));
    }
    assert_eq!(session.cursor().size(), 50);
    for _ in 0..100 {
        session.handle_pointer(PointerEvent::wheel(-1, 0, 0));
    }
    assert_eq!(session.cursor().size(), 1);
}

#[test]
fn leaving_adjust_runs_removal_and_reports_progress() {
    let mut session = session(3);
    select_rect(&mut session, 5, 5, 35, 35);
    session.change_mode(Mode::Draw).unwrap();
    session.change_mode(Mode::Adjust).unwrap();

    let mut fractions = Vec::new();
    let mut sink = |f: f32| fractions.push(f);
    session.advance_with(&mut sink).unwrap();

    assert_eq!(session.mode(), Mode::Select);
    assert_eq!(fractions.len(), 3);
    assert_approx_eq!(fractions[0], 1.0 / 3.0, 1e-6);
    assert_approx_eq!(fractions[2], 1.0, 1e-6);

    // the gray block inside the selection was filled with the paper colour
    let page = &session.images().original_pages()[0];
    assert_eq!(*page.get_pixel(20, 20), Rgb([250, 250, 250]));
    assert_eq!(session.params().len(), 3);
}

#[test]
fn page_navigation_moves_the_current_parameter_record() {
    let mut session = session(3);
    assert!(!session.prev_page());
    assert!(session.next_page());
    assert_eq!(session.params().current_index(), 1);
    assert!(session.next_page());
    assert!(!session.next_page());
    assert_eq!(session.params().current_index(), 2);
}

#[test]
fn adjust_preview_cleans_only_the_current_page() {
    let mut session = session(2);
    select_rect(&mut session, 5, 5, 35, 35);
    session.change_mode(Mode::Adjust).unwrap();
    let preview = session.preview_current_page();
    assert_eq!(preview.dimensions(), (60, 40));
    assert_eq!(*preview.get_pixel(20, 20), Rgb([250, 250, 250]));
    assert_eq!(*session.images().original_pages()[0].get_pixel(20, 20), Rgb([150, 150, 150]));
}

#[test]
fn release_point_closes_the_polygon() {
    let mut session = session(1);
    session.handle_pointer(PointerEvent::press(PointerButton::Left, 5, 5));
    session.handle_pointer(PointerEvent::moved(50, 5));
    session.handle_pointer(PointerEvent::release(PointerButton::Left, 50, 35));

    let temp = session.masks().temp_mask();
    assert_eq!(temp.get_pixel(45, 20)[0], 255);
    assert_eq!(temp.get_pixel(10, 30)[0], 0);
    assert!(count_selected(temp) > 500);
    assert!(session.masks().points().is_empty());
}

#[test]
fn unvalidated_config_is_rejected() {
    let config = Config { cursor_min_size: 20, cursor_max_size: 5, ..Config::default() };
    let err = EditingSession::new(pages(1), config).err().unwrap();
    assert!(matches!(err, WatermarkError::Config(_)));
}

#[test]
fn reset_without_history_still_changes_the_mask_generation() {
    let mut session = session(1);
    select_rect(&mut session, 5, 5, 35, 35);
    session.change_mode(Mode::Adjust).unwrap();
    session.execute(Command::Reset).unwrap();
    assert_eq!(session.masks().undo_depth(), 0);

    let before = session.masks().generation();
    session.execute(Command::Reset).unwrap();
    assert_ne!(session.masks().generation(), before);
    assert_eq!(session.masks().undo_depth(), 0);
    assert_eq!(session.masks().redo_depth(), 0);
}
