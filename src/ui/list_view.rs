// Table-backed list view shared by the package, process and hook views

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::config::{HexCase, RowColoring};

/// Headers plus rows of display strings. The column count is fixed by the
/// headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn append_row(&mut self, mut cells: Vec<String>) {
        let cols = self.column_count();
        if cells.len() > cols {
            tracing::warn!(got = cells.len(), expected = cols, "row truncated to column count");
        }
        cells.resize(cols, String::new());
        self.rows.push(cells);
    }

    pub fn remove_row(&mut self, row: usize) -> Option<Vec<String>> {
        (row < self.rows.len()).then(|| self.rows.remove(row))
    }

    pub fn set_text(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }
}

/// A list view over an optional [`TableModel`].
///
/// Queries return `None` when no model is attached yet, mirroring a view
/// that has not been populated.
#[derive(Debug, Default)]
pub struct ListView {
    model: Option<TableModel>,
    pub table_state: TableState,
    pub row_coloring: RowColoring,
    pub hex_case: HexCase,

    // Last rendered table body, for mouse hit testing
    pub body_area: Option<Rect>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TableModel) -> Self {
        Self {
            model: Some(model),
            ..Self::default()
        }
    }

    pub fn with_preferences(mut self, row_coloring: RowColoring, hex_case: HexCase) -> Self {
        self.row_coloring = row_coloring;
        self.hex_case = hex_case;
        self
    }

    pub fn set_model(&mut self, model: TableModel) {
        self.model = Some(model);
        self.table_state.select(None);
    }

    pub fn model(&self) -> Option<&TableModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut TableModel> {
        self.model.as_mut()
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.model.as_ref().map(|m| m.headers())
    }

    /// Delete all rows but keep the headers
    pub fn clear(&mut self) {
        if let Some(model) = self.model.as_mut() {
            model.clear_rows();
        }
        self.table_state.select(None);
    }

    pub fn append_row(&mut self, cells: Vec<String>) {
        let Some(model) = self.model.as_mut() else {
            tracing::warn!("row appended to a list view without a model");
            return;
        };
        model.append_row(cells);
        if self.table_state.selected().is_none() {
            self.table_state.select(Some(0));
        }
    }

    pub fn remove_row(&mut self, row: usize) -> Option<Vec<String>> {
        let removed = self.model.as_mut()?.remove_row(row)?;
        let rows = self.number_of_rows().unwrap_or(0);
        match self.table_state.selected() {
            _ if rows == 0 => self.table_state.select(None),
            Some(sel) if sel >= rows => self.table_state.select(Some(rows - 1)),
            _ => {}
        }
        Some(removed)
    }

    /// All column texts of a row
    pub fn get_item(&self, row: usize) -> Option<Vec<String>> {
        self.model.as_ref()?.rows().get(row).cloned()
    }

    /// Text of one cell
    pub fn get_item_text(&self, row: usize, col: usize) -> Option<&str> {
        self.model
            .as_ref()?
            .rows()
            .get(row)?
            .get(col)
            .map(String::as_str)
    }

    /// Whether any cell equals `text`, ignoring case unless `case_sensitive`
    pub fn contains_text(&self, text: &str, case_sensitive: bool) -> bool {
        let Some(model) = self.model.as_ref() else {
            return false;
        };

        if case_sensitive {
            model.rows().iter().flatten().any(|cell| cell == text)
        } else {
            let needle = text.to_lowercase();
            model
                .rows()
                .iter()
                .flatten()
                .any(|cell| cell.to_lowercase() == needle)
        }
    }

    pub fn number_of_items(&self) -> Option<usize> {
        self.model.as_ref().map(TableModel::row_count)
    }

    pub fn number_of_rows(&self) -> Option<usize> {
        self.number_of_items()
    }

    pub fn number_of_cols(&self) -> Option<usize> {
        self.model.as_ref().map(TableModel::column_count)
    }

    /// Rows plus columns
    pub fn number_of_total(&self) -> Option<usize> {
        self.model
            .as_ref()
            .map(|m| m.row_count() + m.column_count())
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn select(&mut self, row: Option<usize>) {
        let rows = self.number_of_rows().unwrap_or(0);
        self.table_state.select(row.filter(|r| *r < rows));
    }

    pub fn select_next(&mut self) {
        let rows = self.number_of_rows().unwrap_or(0);
        if rows == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if i + 1 < rows => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if let Some(i) = self.table_state.selected() {
            self.table_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Row under a terminal coordinate, using the last rendered layout
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.body_area?;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let index = (row - area.y) as usize + self.table_state.offset();
        (index < self.number_of_rows().unwrap_or(0)).then_some(index)
    }

    /// Render with the default row style
    pub fn render(&mut self, frame: &mut Frame, area: Rect, title: &str) {
        self.render_styled(frame, area, title, |_| None);
    }

    /// Render, letting `row_style` override the style of individual rows
    pub fn render_styled<F>(&mut self, frame: &mut Frame, area: Rect, title: &str, row_style: F)
    where
        F: Fn(usize) -> Option<Style>,
    {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let inner = block.inner(area);

        let Some(model) = self.model.as_ref() else {
            frame.render_widget(block, area);
            self.body_area = None;
            return;
        };

        // Header takes the first inner line
        self.body_area = Some(Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        });

        let header = Row::new(model.headers().iter().map(|h| Cell::from(h.clone())))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let alternate = self.row_coloring.is_alternate();
        let rows = model.rows().iter().enumerate().map(|(i, cells)| {
            let base = if alternate && i % 2 == 1 {
                Style::default().bg(Color::Rgb(30, 30, 30))
            } else {
                Style::default()
            };
            let style = row_style(i).map(|s| base.patch(s)).unwrap_or(base);
            Row::new(cells.iter().map(|c| Cell::from(c.clone()))).style(style)
        });

        let widths = column_widths(model);
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

// First columns fit their content, the last one stretches
fn column_widths(model: &TableModel) -> Vec<Constraint> {
    let cols = model.column_count();
    (0..cols)
        .map(|col| {
            if col + 1 == cols {
                Constraint::Min(0)
            } else {
                let content = model
                    .rows()
                    .iter()
                    .filter_map(|r| r.get(col))
                    .chain(std::iter::once(&model.headers()[col]))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0);
                Constraint::Length(content.min(60) as u16 + 1)
            }
        })
        .collect()
}
