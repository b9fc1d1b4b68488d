// Popup action menu anchored at a terminal position

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

pub trait MenuEntry: Copy {
    fn label(&self) -> &'static str;
}

pub struct ContextMenu<A: MenuEntry> {
    actions: Vec<A>,
    pub state: ListState,
    anchor: (u16, u16),
}

impl<A: MenuEntry> ContextMenu<A> {
    pub fn new(actions: Vec<A>, anchor: (u16, u16)) -> Self {
        let mut state = ListState::default();
        if !actions.is_empty() {
            state.select(Some(0));
        }
        Self {
            actions,
            state,
            anchor,
        }
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn selected(&self) -> Option<A> {
        self.state.selected().and_then(|i| self.actions.get(i).copied())
    }

    pub fn next(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1) % self.actions.len());
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        let len = self.actions.len();
        let i = self.state.selected().map_or(0, |i| (i + len - 1) % len);
        self.state.select(Some(i));
    }

    /// Popup rectangle, kept inside `bounds`
    pub fn area(&self, bounds: Rect) -> Rect {
        let width = self
            .actions
            .iter()
            .map(|a| a.label().chars().count() as u16)
            .max()
            .unwrap_or(0)
            .saturating_add(4)
            .min(bounds.width);
        let height = (self.actions.len() as u16 + 2).min(bounds.height);

        let max_x = bounds.x + bounds.width.saturating_sub(width);
        let max_y = bounds.y + bounds.height.saturating_sub(height);
        Rect {
            x: self.anchor.0.clamp(bounds.x, max_x),
            y: self.anchor.1.clamp(bounds.y, max_y),
            width,
            height,
        }
    }

    /// Action under a terminal coordinate
    pub fn action_at(&self, bounds: Rect, column: u16, row: u16) -> Option<A> {
        let area = self.area(bounds);
        if column <= area.x
            || column >= (area.x + area.width).saturating_sub(1)
            || row <= area.y
            || row >= (area.y + area.height).saturating_sub(1)
        {
            return None;
        }
        self.actions.get((row - area.y - 1) as usize).copied()
    }

    pub fn render(&mut self, frame: &mut Frame, bounds: Rect) {
        let area = self.area(bounds);
        frame.render_widget(Clear, area);

        let items: Vec<ListItem> = self
            .actions
            .iter()
            .map(|a| ListItem::new(a.label()))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .style(Style::default().bg(Color::Black)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
