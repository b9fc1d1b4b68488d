// Hooks panel: hook rows, context menu and remote hook configuration

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
};
use std::rc::Rc;

use crate::config::{HexCase, RowColoring};
use crate::engine::{ApiCall, Engine, EngineEvent, Hook, HookKind};
use crate::ui::context_menu::{ContextMenu, MenuEntry};
use crate::ui::input_modal::{InputModal, InputOutcome};
use crate::ui::list_view::{ListView, TableModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Native,
    Java,
    OnLoad,
    Condition,
    Logic,
    Delete,
}

impl MenuEntry for MenuAction {
    fn label(&self) -> &'static str {
        match self {
            Self::Native => "Native (N)",
            Self::Java => "Java (J)",
            Self::OnLoad => "Module load (O)",
            Self::Condition => "Condition",
            Self::Logic => "Logic",
            Self::Delete => "Delete",
        }
    }
}

// What an open input modal will do once accepted
#[derive(Debug, Clone)]
enum PendingInput {
    CreateNative,
    CreateJava,
    CreateOnLoad,
    Condition(Hook),
    Logic(Hook),
}

pub struct HooksPanel {
    pub view: ListView,
    // Parallel to the table rows
    hooks: Vec<Hook>,
    engine: Rc<dyn Engine>,
    menu: Option<(ContextMenu<MenuAction>, Option<usize>)>,
    modal: Option<(PendingInput, InputModal)>,
    area: Rect,
}

impl HooksPanel {
    pub fn new(engine: Rc<dyn Engine>, row_coloring: RowColoring, hex_case: HexCase) -> Self {
        Self {
            view: ListView::with_model(TableModel::new(["input", "address"]))
                .with_preferences(row_coloring, hex_case),
            hooks: Vec::new(),
            engine,
            menu: None,
            modal: None,
            area: Rect::default(),
        }
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn hook(&self, row: usize) -> Option<&Hook> {
        self.hooks.get(row)
    }

    pub fn java_available(&self) -> bool {
        self.engine.java_available()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    pub fn menu(&self) -> Option<&ContextMenu<MenuAction>> {
        self.menu.as_ref().map(|(menu, _)| menu)
    }

    pub fn modal(&self) -> Option<&InputModal> {
        self.modal.as_ref().map(|(_, modal)| modal)
    }

    /// True while the panel wants every key (menu or modal open)
    pub fn is_capturing_input(&self) -> bool {
        self.menu.is_some() || self.modal.is_some()
    }

    fn push_row(&mut self, hook: Hook, cells: Vec<String>) {
        self.view.append_row(cells);
        self.hooks.push(hook);
    }

    pub fn on_native_hook(&mut self, hook: Hook) {
        let address = self.view.hex_case.format(hook.ptr);
        let input = hook.input.clone();
        self.push_row(hook, vec![input, address]);
    }

    pub fn on_onload_hook(&mut self, hook: Option<Hook>) {
        let Some(hook) = hook else {
            return;
        };
        let address = self.view.hex_case.format(0);
        let input = hook.input.clone();
        self.push_row(hook, vec![input, address]);
    }

    pub fn on_java_hook(&mut self, hook: Hook) {
        let (class, method) = split_java_target(&hook.input);
        self.push_row(hook, vec![class, method]);
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::NativeHookCreated(hook) => self.on_native_hook(hook),
            EngineEvent::JavaHookCreated(hook) => self.on_java_hook(hook),
            EngineEvent::OnLoadHookCreated(hook) => self.on_onload_hook(hook),
            EngineEvent::ModuleLoaded { module, base } => self.hit_onload(&module, base),
        }
    }

    /// Show the load address of a watched module on its on-load rows
    pub fn hit_onload(&mut self, module: &str, base: u64) {
        let base = self.view.hex_case.format(base);
        let rows: Vec<usize> = self
            .hooks
            .iter()
            .enumerate()
            .filter(|(_, h)| h.kind == HookKind::OnLoad && h.input == module)
            .map(|(i, _)| i)
            .collect();

        if let Some(model) = self.view.model_mut() {
            for row in rows {
                model.set_text(row, 1, &base);
            }
        }
    }

    /// Entries of the context menu for the row under the cursor
    pub fn menu_actions(&self, row: Option<usize>) -> Vec<MenuAction> {
        let mut actions = vec![MenuAction::Native];

        if self.engine.java_available() {
            actions.push(MenuAction::Java);
            actions.push(MenuAction::OnLoad);
        }

        if let Some(hook) = row.and_then(|r| self.hooks.get(r)) {
            if hook.is_resolved() {
                actions.push(MenuAction::Condition);
                actions.push(MenuAction::Logic);
            }
            actions.push(MenuAction::Delete);
        }

        actions
    }

    pub fn open_menu(&mut self, row: Option<usize>, anchor: (u16, u16)) {
        if row.is_some() {
            self.view.select(row);
        }
        let actions = self.menu_actions(row);
        self.menu = Some((ContextMenu::new(actions, anchor), row));
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    pub fn on_menu_action(&mut self, action: MenuAction, row: Option<usize>) {
        match action {
            MenuAction::Native => self.prompt_create(PendingInput::CreateNative),
            MenuAction::Java => self.prompt_create(PendingInput::CreateJava),
            MenuAction::OnLoad => self.prompt_create(PendingInput::CreateOnLoad),
            MenuAction::Condition => {
                if let Some(row) = row {
                    self.set_condition(row);
                }
            }
            MenuAction::Logic => {
                if let Some(row) = row {
                    self.set_logic(row);
                }
            }
            MenuAction::Delete => {
                if let Some(row) = row {
                    self.delete_hook(row);
                }
            }
        }
    }

    fn prompt_create(&mut self, pending: PendingInput) {
        let title = match pending {
            PendingInput::CreateNative => "hook native (address or symbol)",
            PendingInput::CreateJava => "hook java (class.method)",
            PendingInput::CreateOnLoad => "hook module load (module name)",
            _ => return,
        };
        self.modal = Some((pending, InputModal::single_line(title, None)));
    }

    /// Open the condition editor for a row
    pub fn set_condition(&mut self, row: usize) {
        if let Some(hook) = self.hooks.get(row).cloned() {
            let modal = InputModal::single_line("insert condition", hook.condition.as_deref());
            self.modal = Some((PendingInput::Condition(hook), modal));
        }
    }

    /// Open the logic editor for a row
    pub fn set_logic(&mut self, row: usize) {
        if let Some(hook) = self.hooks.get(row).cloned() {
            let modal = InputModal::multi_line("insert logic", hook.logic.as_deref());
            self.modal = Some((PendingInput::Logic(hook), modal));
        }
    }

    /// Push a condition to the engine; the row keeps the new value only if
    /// the engine accepted it.
    pub fn apply_condition(&mut self, row: usize, condition: &str) -> bool {
        let Some(hook) = self.hooks.get(row) else {
            return false;
        };
        let call = ApiCall::SetHookCondition {
            target: hook.target(),
            condition: condition.to_string(),
        };
        let ok = self.engine.api(&call);
        tracing::info!(
            kind = hook.kind.label(),
            method = call.method(),
            target = %call.target(),
            ok,
            "hook update"
        );

        if ok {
            self.hooks[row].condition = Some(condition.to_string());
        }
        ok
    }

    pub fn apply_logic(&mut self, row: usize, logic: &str) -> bool {
        let Some(hook) = self.hooks.get(row) else {
            return false;
        };
        let call = ApiCall::SetHookLogic {
            target: hook.target(),
            logic: logic.to_string(),
        };
        let ok = self.engine.api(&call);
        tracing::info!(
            kind = hook.kind.label(),
            method = call.method(),
            target = %call.target(),
            ok,
            "hook update"
        );

        if ok {
            self.hooks[row].logic = Some(logic.to_string());
        }
        ok
    }

    /// Remove the row, then ask the engine to drop the hook. The engine's
    /// answer does not bring the row back.
    pub fn delete_hook(&mut self, row: usize) -> Option<Hook> {
        if row >= self.hooks.len() {
            return None;
        }
        self.view.remove_row(row);
        let hook = self.hooks.remove(row);

        let call = ApiCall::DeleteHook {
            target: hook.delete_target(),
        };
        let ok = self.engine.api(&call);
        if !ok {
            tracing::warn!(
                kind = hook.kind.label(),
                target = %call.target(),
                "engine did not confirm hook deletion"
            );
        }
        Some(hook)
    }

    // Row index of a hook captured when a modal was opened. Rows can share
    // an input, so the address has to match too.
    fn find_row(&self, hook: &Hook) -> Option<usize> {
        self.hooks
            .iter()
            .position(|h| h.kind == hook.kind && h.input == hook.input && h.ptr == hook.ptr)
    }

    fn finish_input(&mut self, pending: PendingInput, text: String) {
        match pending {
            PendingInput::CreateNative => self.engine.hook_native(&text),
            PendingInput::CreateJava => self.engine.hook_java(&text),
            PendingInput::CreateOnLoad => self.engine.hook_onload(&text),
            PendingInput::Condition(hook) => {
                if let Some(row) = self.find_row(&hook) {
                    self.apply_condition(row, &text);
                }
            }
            PendingInput::Logic(hook) => {
                if let Some(row) = self.find_row(&hook) {
                    self.apply_logic(row, &text);
                }
            }
        }
    }

    /// Returns true when the key was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some((pending, mut modal)) = self.modal.take() {
            match modal.handle_key(key) {
                InputOutcome::Pending => self.modal = Some((pending, modal)),
                InputOutcome::Accepted(text) => self.finish_input(pending, text),
                InputOutcome::Cancelled => {}
            }
            return true;
        }

        if let Some((menu, row)) = self.menu.as_mut() {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => menu.previous(),
                KeyCode::Down | KeyCode::Char('j') => menu.next(),
                KeyCode::Enter => {
                    let action = menu.selected();
                    let row = *row;
                    self.menu = None;
                    if let Some(action) = action {
                        self.on_menu_action(action, row);
                    }
                }
                KeyCode::Esc => self.menu = None,
                _ => {}
            }
            return true;
        }

        let java = self.engine.java_available();
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.on_menu_action(MenuAction::Native, None);
            }
            KeyCode::Char('j') | KeyCode::Char('J') if java => {
                self.on_menu_action(MenuAction::Java, None);
            }
            KeyCode::Char('o') | KeyCode::Char('O') if java => {
                self.on_menu_action(MenuAction::OnLoad, None);
            }
            KeyCode::Up => self.view.select_previous(),
            KeyCode::Down => self.view.select_next(),
            KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char('M') => {
                let row = self.view.selected();
                let anchor = (self.area.x + 2, self.area.y + 2);
                self.open_menu(row, anchor);
            }
            KeyCode::Delete => {
                if let Some(row) = self.view.selected() {
                    self.delete_hook(row);
                }
            }
            _ => return false,
        }
        true
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.modal.is_some() {
            return;
        }

        if let MouseEventKind::Down(button) = mouse.kind {
            if let Some((menu, row)) = self.menu.as_ref() {
                let picked = menu.action_at(self.area, mouse.column, mouse.row);
                let row = *row;
                self.menu = None;
                if let (MouseButton::Left, Some(action)) = (button, picked) {
                    self.on_menu_action(action, row);
                }
                return;
            }

            let row = self.view.row_at(mouse.column, mouse.row);
            match button {
                MouseButton::Left => {
                    if row.is_some() {
                        self.view.select(row);
                    }
                }
                MouseButton::Right => self.open_menu(row, (mouse.column, mouse.row)),
                MouseButton::Middle => {}
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;

        let kinds: Vec<HookKind> = self.hooks.iter().map(|h| h.kind).collect();
        let title = format!(" Hooks ({}) ", self.hooks.len());
        self.view.render_styled(frame, area, &title, |i| {
            kinds.get(i).map(|kind| Style::default().fg(kind_color(*kind)))
        });

        if let Some((menu, _)) = self.menu.as_mut() {
            menu.render(frame, area);
        }
        if let Some((_, modal)) = self.modal.as_ref() {
            modal.render(frame);
        }
    }
}

fn kind_color(kind: HookKind) -> Color {
    match kind {
        HookKind::Native => Color::Gray,
        HookKind::OnLoad => Color::Green,
        HookKind::Java => Color::Yellow,
    }
}

/// Split `pkg.Class.method` into (`pkg.Class`, `method`).
pub fn split_java_target(input: &str) -> (String, String) {
    match input.rsplit_once('.') {
        Some((class, method)) => (class.to_string(), method.to_string()),
        None => (String::new(), input.to_string()),
    }
}
