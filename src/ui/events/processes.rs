use super::*;

use crossterm::event::{MouseButton, MouseEventKind};

pub(super) fn handle_processes_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => {
            state.processes.refresh();
        }
        KeyCode::Up => state.processes.view.select_previous(),
        KeyCode::Down => state.processes.view.select_next(),
        KeyCode::Enter => {
            if let Some(selection) = state.processes.activate_selected() {
                state.select_process(selection);
            }
        }
        _ => {}
    }
}

pub(super) fn handle_processes_mouse(mouse: MouseEvent, state: &mut AppState) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(row) = state.processes.view.row_at(mouse.column, mouse.row) else {
                return;
            };
            if let Some(selection) = state.processes.click(row, Instant::now()) {
                state.select_process(selection);
            }
        }
        MouseEventKind::ScrollUp => state.processes.view.select_previous(),
        MouseEventKind::ScrollDown => state.processes.view.select_next(),
        _ => {}
    }
}
