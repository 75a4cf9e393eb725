#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn bubble_tools_compare_by_type() {
    assert_eq!(Tool::Bubble(BubbleType::Shout), Tool::Bubble(BubbleType::Shout));
    assert_ne!(Tool::Bubble(BubbleType::Shout), Tool::Bubble(BubbleType::Whisper));
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.zoom_intent());
}

#[test]
fn ctrl_or_meta_means_zoom() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.zoom_intent());
    assert!(Modifiers { meta: true, ..Default::default() }.zoom_intent());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.zoom_intent());
}

// =============================================================
// WheelDelta
// =============================================================

#[test]
fn scroll_up_zooms_in() {
    assert_eq!(WheelDelta { dx: 0.0, dy: -3.0 }.zoom_factor(), WHEEL_ZOOM_STEP);
}

#[test]
fn scroll_down_zooms_out() {
    let f = WheelDelta { dx: 0.0, dy: 120.0 }.zoom_factor();
    assert!((f * WHEEL_ZOOM_STEP - 1.0).abs() < 1e-12);
}

#[test]
fn horizontal_scroll_does_not_zoom() {
    assert_eq!(WheelDelta { dx: 40.0, dy: 0.0 }.zoom_factor(), 1.0);
}

// =============================================================
// State
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}

#[test]
fn ui_state_default_has_no_selection() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selected_id.is_none());
}
