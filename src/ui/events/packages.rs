use super::*;

use crossterm::event::{MouseButton, MouseEventKind};
use std::path::PathBuf;

use crate::ui::input_modal::{InputModal, InputOutcome};

pub(super) fn handle_packages_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => {
            if !state.packages.refresh() {
                tracing::debug!("package refresh already running");
            }
        }
        // Prompt for an APK path
        KeyCode::Char('i') | KeyCode::Char('I') => {
            state.install_prompt = Some(InputModal::single_line("install apk (path)", None));
        }
        KeyCode::Up => state.packages.view.select_previous(),
        KeyCode::Down => state.packages.view.select_next(),
        _ => {}
    }
}

pub(super) fn handle_install_prompt_key(key: KeyEvent, state: &mut AppState) {
    let Some(mut prompt) = state.install_prompt.take() else {
        return;
    };

    match prompt.handle_key(key) {
        InputOutcome::Pending => state.install_prompt = Some(prompt),
        InputOutcome::Cancelled => {}
        InputOutcome::Accepted(text) => {
            let path = PathBuf::from(text.trim());
            match state.packages.install(&path) {
                Ok(()) => state.set_status(format!("installing {}...", path.display())),
                Err(err) => state.set_error(err),
            }
        }
    }
}

pub(super) fn handle_packages_mouse(mouse: MouseEvent, state: &mut AppState) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(row) = state.packages.view.row_at(mouse.column, mouse.row) {
                state.packages.view.select(Some(row));
            }
        }
        MouseEventKind::ScrollUp => state.packages.view.select_previous(),
        MouseEventKind::ScrollDown => state.packages.view.select_next(),
        _ => {}
    }
}
