// Modal text entry used for hook targets, conditions, logic and APK paths

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tui_textarea::{Input, Key, TextArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Enter accepts
    SingleLine,
    /// Enter inserts a newline, Ctrl+S accepts
    MultiLine,
}

/// What a key press did to the modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Pending,
    Accepted(String),
    Cancelled,
}

pub struct InputModal {
    title: String,
    kind: InputKind,
    textarea: TextArea<'static>,
}

impl InputModal {
    pub fn new(title: impl Into<String>, kind: InputKind, initial: Option<&str>) -> Self {
        let lines: Vec<String> = match (kind, initial) {
            (_, None) => vec![String::new()],
            (InputKind::SingleLine, Some(text)) => vec![text.replace('\n', " ")],
            (InputKind::MultiLine, Some(text)) => text.lines().map(str::to_string).collect(),
        };
        let mut textarea = TextArea::new(if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        });
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        textarea.set_cursor_line_style(Style::default());

        Self {
            title: title.into(),
            kind,
            textarea,
        }
    }

    pub fn single_line(title: impl Into<String>, initial: Option<&str>) -> Self {
        Self::new(title, InputKind::SingleLine, initial)
    }

    pub fn multi_line(title: impl Into<String>, initial: Option<&str>) -> Self {
        Self::new(title, InputKind::MultiLine, initial)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, self.kind) {
            (KeyCode::Esc, _) => return InputOutcome::Cancelled,
            (KeyCode::Enter, InputKind::SingleLine) => {
                return InputOutcome::Accepted(self.text());
            }
            (KeyCode::Char('s'), InputKind::MultiLine) if ctrl => {
                return InputOutcome::Accepted(self.text());
            }
            _ => {}
        }

        self.textarea.input(to_input(key));
        InputOutcome::Pending
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let (want_w, want_h) = match self.kind {
            InputKind::SingleLine => (60, 5),
            InputKind::MultiLine => (80, 16),
        };
        let modal_width = want_w.min(area.width.saturating_sub(4));
        let modal_height = want_h.min(area.height.saturating_sub(2));

        let modal_area = Rect {
            x: (area.width.saturating_sub(modal_width)) / 2,
            y: (area.height.saturating_sub(modal_height)) / 2,
            width: modal_width,
            height: modal_height,
        };

        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        if inner.height == 0 {
            return;
        }

        let text_area = Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        };
        frame.render_widget(&self.textarea, text_area);

        let accept = match self.kind {
            InputKind::SingleLine => "[Enter]",
            InputKind::MultiLine => "[Ctrl+S]",
        };
        let hint = Line::from(vec![
            Span::styled(accept, Style::default().fg(Color::Green)),
            Span::raw(" Accept   "),
            Span::styled("[Esc]", Style::default().fg(Color::Red)),
            Span::raw(" Cancel"),
        ]);
        let hint_area = Rect {
            y: inner.y + inner.height - 1,
            height: 1,
            ..inner
        };
        frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), hint_area);
    }
}

// Map a crossterm key onto the editor's own input type
fn to_input(key: KeyEvent) -> Input {
    let key_code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        KeyCode::F(n) => Key::F(n),
        _ => Key::Null,
    };

    Input {
        key: key_code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}
