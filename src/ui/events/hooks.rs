use super::*;

pub(super) fn handle_hooks_key(key: KeyEvent, state: &mut AppState) {
    state.hooks.handle_key(key);
}

pub(super) fn handle_hooks_mouse(mouse: MouseEvent, state: &mut AppState) {
    state.hooks.handle_mouse(mouse);
}
