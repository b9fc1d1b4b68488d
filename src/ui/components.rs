// Reusable UI components

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::ui::state::{Screen, StatusMessage};

pub struct Footer {
    content: Line<'static>,
}

impl Footer {
    fn from_controls(controls: &[(&'static str, &'static str, bool)]) -> Self {
        let mut spans = vec![Span::raw("CONTROLS: ")];

        for (i, (hotkey, desc, enabled)) in controls.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            let (key_style, desc_style) = if *enabled {
                (Style::default().fg(Color::Yellow), Style::default())
            } else {
                (
                    Style::default().fg(Color::DarkGray),
                    Style::default().fg(Color::Gray),
                )
            };
            spans.push(Span::styled(*hotkey, key_style));
            spans.push(Span::styled(*desc, desc_style));
        }

        Self {
            content: Line::from(spans),
        }
    }

    pub fn packages(refresh_enabled: bool) -> Self {
        Self::from_controls(&[
            ("[R]", "efresh", refresh_enabled),
            ("[I]", "nstall", true),
            ("[Tab]", " Screen", true),
            ("[Q]", "uit", true),
        ])
    }

    pub fn processes(refresh_enabled: bool) -> Self {
        Self::from_controls(&[
            ("[R]", "efresh", refresh_enabled),
            ("[Enter]", " Select", true),
            ("[Tab]", " Screen", true),
            ("[Q]", "uit", true),
        ])
    }

    pub fn hooks(java_available: bool) -> Self {
        Self::from_controls(&[
            ("[N]", "ative", true),
            ("[J]", "ava", java_available),
            ("[O]", "n load", java_available),
            ("[M]", "enu", true),
            ("[Del]", " Delete", true),
            ("[Tab]", " Screen", true),
            ("[Q]", "uit", true),
        ])
    }
}

impl Widget for Footer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.content)
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
    }
}

/// Top line: screen tabs and the selected process
pub struct Header<'a> {
    pub current: Screen,
    pub attached: Option<(u32, &'a str)>,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            " hookdash ",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )];

        for screen in [Screen::Packages, Screen::Processes, Screen::Hooks] {
            spans.push(Span::raw(" "));
            let style = if screen == self.current {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(screen.title(), style));
        }

        if let Some((pid, name)) = self.attached {
            spans.push(Span::raw("   target: "));
            spans.push(Span::styled(
                format!("{} ({})", name, pid),
                Style::default().fg(Color::Green),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub status: Option<&'a StatusMessage>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match self.status {
            Some(msg) => {
                let color = if msg.is_error { Color::Red } else { Color::Green };
                Line::from(vec![
                    Span::styled(
                        msg.at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.text.clone(), Style::default().fg(color)),
                ])
            }
            None => Line::from(""),
        };
        Paragraph::new(line).render(area, buf);
    }
}
