// Application state wiring, key dispatch and config files
//
// These tests drive AppState the way the event loop does: poll the
// background channels, feed keys, draw into a test backend.

use crossterm::event::KeyCode;
use hookdash::config::{Config, HexCase, RowColoring};
use hookdash::engine::{DeviceTarget, EnumerateError, LocalEngine};
use hookdash::ui::{AppState, Collaborators, ProcessSelection, Screen, draw, handle_key};
use ratatui::{Terminal, backend::TestBackend};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::common::fakes::{FakeBridge, FakeEnumerator};
use crate::common::helpers::{ctrl, key, type_text};

fn app_with(enumerator: FakeEnumerator, java: bool) -> AppState {
    let mut config = Config::default();
    config.engine.java_available = java;
    let (engine, engine_events) = LocalEngine::new(java);

    AppState::new(
        &config,
        Collaborators {
            bridge: Arc::new(FakeBridge::with_packages(&[("com.example.app", "/data/app/base.apk")])),
            enumerator: Arc::new(enumerator),
            device: DeviceTarget::Usb,
            engine: Rc::new(engine),
            engine_events,
        },
    )
}

fn settle(state: &mut AppState) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        state.poll_background();
        if !state.packages.is_refreshing() && !state.processes.is_refreshing() {
            return;
        }
        assert!(Instant::now() < deadline, "background refresh did not finish");
        thread::sleep(Duration::from_millis(5));
    }
}

fn screen_text(state: &mut AppState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
    terminal.draw(|frame| draw(frame, state)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

// ============================================================================
// AppState
// ============================================================================

#[test]
fn test_starts_on_process_screen_with_both_lists_loaded() {
    let mut state = app_with(FakeEnumerator::with_processes(&[(1234, "com.example.app")]), false);
    assert_eq!(state.current_screen, Screen::Processes);

    settle(&mut state);
    assert_eq!(state.processes.view.number_of_rows(), Some(1));
    assert_eq!(state.packages.view.number_of_rows(), Some(1));
    assert!(state.status.is_some());
}

#[test]
fn test_refresh_error_lands_in_status_bar() {
    let mut state = app_with(FakeEnumerator::failing(EnumerateError::TimedOut), false);
    settle(&mut state);

    // Package refresh may finish last and overwrite the status
    state.processes.refresh();
    settle(&mut state);

    let status = state.status.clone().unwrap();
    assert!(status.is_error);
    assert_eq!(
        status.text,
        "unable to connect to remote frida server: timedout"
    );
}

#[test]
fn test_enter_on_process_selects_and_switches_to_hooks() {
    let mut state = app_with(FakeEnumerator::with_processes(&[(1234, "com.example.app")]), false);
    settle(&mut state);

    assert!(!handle_key(key(KeyCode::Enter), &mut state));

    assert_eq!(state.current_screen, Screen::Hooks);
    assert_eq!(
        state.attached,
        Some(ProcessSelection {
            pid: 1234,
            name: "com.example.app".to_string(),
        })
    );
    assert!(screen_text(&mut state).contains("com.example.app (1234)"));
}

#[test]
fn test_tab_and_digit_keys_switch_screens() {
    let mut state = app_with(FakeEnumerator::with_processes(&[]), false);

    handle_key(key(KeyCode::Tab), &mut state);
    assert_eq!(state.current_screen, Screen::Hooks);
    handle_key(key(KeyCode::Tab), &mut state);
    assert_eq!(state.current_screen, Screen::Packages);
    handle_key(key(KeyCode::Char('2')), &mut state);
    assert_eq!(state.current_screen, Screen::Processes);
}

#[test]
fn test_q_quits_unless_typing() {
    let mut state = app_with(FakeEnumerator::with_processes(&[]), false);
    assert!(handle_key(key(KeyCode::Char('q')), &mut state));

    handle_key(key(KeyCode::Char('3')), &mut state);
    handle_key(key(KeyCode::Char('n')), &mut state);
    assert!(state.is_capturing_input());
    assert!(
        !handle_key(key(KeyCode::Char('q')), &mut state),
        "q is text inside the hook prompt"
    );
    assert!(handle_key(ctrl('c'), &mut state));
}

#[test]
fn test_hook_created_from_keys_shows_up_after_poll() {
    let mut state = app_with(FakeEnumerator::with_processes(&[]), true);
    state.select_process(ProcessSelection {
        pid: 42,
        name: "com.example.app".to_string(),
    });

    handle_key(key(KeyCode::Char('j')), &mut state);
    for k in type_text("com.example.Main.onCreate") {
        handle_key(k, &mut state);
    }
    handle_key(key(KeyCode::Enter), &mut state);
    state.poll_background();

    assert_eq!(state.hooks.hooks().len(), 1);
    assert_eq!(
        state.hooks.view.get_item(0),
        Some(vec!["com.example.Main".to_string(), "onCreate".to_string()])
    );
    assert!(screen_text(&mut state).contains("Hooks (1)"));
}

#[test]
fn test_row_preferences_reach_every_list() {
    let mut config = Config::default();
    config.ui.alternate_row_colors = RowColoring::Alternate;
    config.ui.hex_style = HexCase::Lower;
    let (engine, engine_events) = LocalEngine::new(false);

    let state = AppState::new(
        &config,
        Collaborators {
            bridge: Arc::new(FakeBridge::with_packages(&[])),
            enumerator: Arc::new(FakeEnumerator::with_processes(&[])),
            device: DeviceTarget::Local,
            engine: Rc::new(engine),
            engine_events,
        },
    );

    assert_eq!(state.packages.view.row_coloring, RowColoring::Alternate);
    assert_eq!(state.processes.view.row_coloring, RowColoring::Alternate);
    assert_eq!(state.hooks.view.row_coloring, RowColoring::Alternate);
    assert_eq!(state.packages.view.hex_case, HexCase::Lower);
    assert_eq!(state.processes.view.hex_case, HexCase::Lower);
}

#[test]
fn test_install_prompt_reports_missing_apk() {
    let mut state = app_with(FakeEnumerator::with_processes(&[]), false);
    handle_key(key(KeyCode::Char('1')), &mut state);
    handle_key(key(KeyCode::Char('i')), &mut state);
    assert!(state.install_prompt.is_some());

    for k in type_text("/definitely/not/here.apk") {
        handle_key(k, &mut state);
    }
    handle_key(key(KeyCode::Enter), &mut state);

    assert!(state.install_prompt.is_none());
    let status = state.status.clone().unwrap();
    assert!(status.is_error);
    assert!(status.text.contains("/definitely/not/here.apk"));
}

#[test]
fn test_footer_greys_out_refresh_while_running() {
    let mut state = app_with(FakeEnumerator::with_processes(&[(1, "init")]), false);
    settle(&mut state);
    let text = screen_text(&mut state);
    assert!(text.contains("[R]efresh"));
    assert!(text.contains("Processes on usb (1)"));
}

// ============================================================================
// Config files
// ============================================================================

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.ui.alternate_row_colors = RowColoring::Alternate;
    config.bridge.device = DeviceTarget::Host("192.168.1.20:27042".to_string());
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.ui.alternate_row_colors, RowColoring::Alternate);
    assert_eq!(
        loaded.bridge.device,
        DeviceTarget::Host("192.168.1.20:27042".to_string())
    );
}

#[test]
fn test_legacy_string_preferences_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[ui]\nalternate_row_colors = \"true\"\nhex_style = \"lower\"\n\n[engine]\njava_available = true\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.ui.alternate_row_colors, RowColoring::Alternate);
    assert_eq!(config.ui.hex_style, HexCase::Lower);
    assert!(config.engine.java_available);
    assert!(config.packages.show_paths, "missing sections use defaults");
}

#[test]
fn test_default_config_toml() {
    let text = toml::to_string_pretty(&Config::default()).unwrap();
    insta::assert_snapshot!(text, @r#"
    [ui]
    alternate_row_colors = false
    hex_style = "upper"

    [bridge]
    adb_path = "adb"
    frida_ps_path = "frida-ps"
    device = "local"

    [engine]
    java_available = false

    [packages]
    show_paths = true

    [logging]
    enabled = false
    level = "info"
    "#);
}
