use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::state::ai_config::AiConfigState;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Which row of the configuration form has focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigField {
    #[default]
    Provider,
    Model,
    ApiKey,
}

impl ConfigField {
    pub fn next(self) -> Self {
        match self {
            ConfigField::Provider => ConfigField::Model,
            ConfigField::Model => ConfigField::ApiKey,
            ConfigField::ApiKey => ConfigField::Provider,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ConfigField::Provider => ConfigField::ApiKey,
            ConfigField::Model => ConfigField::Provider,
            ConfigField::ApiKey => ConfigField::Model,
        }
    }
}

pub struct ConfigForm<'a> {
    pub state: &'a AiConfigState,
    pub field: ConfigField,
    pub api_key: &'a LineInput,
    pub theme: &'a Theme,
}

impl<'a> ConfigForm<'a> {
    pub fn new(
        state: &'a AiConfigState,
        field: ConfigField,
        api_key: &'a LineInput,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            field,
            api_key,
            theme,
        }
    }

    fn row(&self, field: ConfigField, label: &str, value: Line<'a>) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let is_focused = self.field == field;
        let indicator = if is_focused { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_focused {
                colors.accent()
            } else {
                colors.fg()
            })
            .add_modifier(if is_focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });

        vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            value,
            Line::from(""),
        ]
    }
}

impl Widget for ConfigForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" AI Model Configuration ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(9),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        // Confirmed status, straight from the server's last word.
        let status_line = if self.state.current.configured {
            Line::from(vec![
                Span::styled("  Status: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    "configured",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "  ({} via {})",
                        self.state.current.model_name, self.state.current.provider
                    ),
                    Style::default().fg(colors.text_dim()),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("  Status: ", Style::default().fg(colors.text_dim())),
                Span::styled("not configured", Style::default().fg(colors.warning())),
            ])
        };
        Paragraph::new(status_line).render(layout[0], buf);

        let value_style = Style::default().fg(colors.fg());
        let dim_style = Style::default().fg(colors.text_dim());

        let provider_value = if self.state.catalog.is_empty() {
            Line::from(Span::styled("     (catalog unavailable)", dim_style))
        } else {
            Line::from(Span::styled(
                format!("     < {} >", self.state.selected_provider()),
                value_style,
            ))
        };

        let model_value = match self.state.selected_model_name() {
            Some(name) => Line::from(Span::styled(
                format!("     < {} ({}) >", name, self.state.selected_model()),
                value_style,
            )),
            None => Line::from(Span::styled("     (no models)", dim_style)),
        };

        let (before, cursor, after) = self.api_key.masked_parts('\u{2022}');
        let cursor_focused = self.field == ConfigField::ApiKey;
        let mut key_spans = vec![
            Span::styled("     ", dim_style),
            Span::styled(before, value_style),
        ];
        match cursor {
            Some(ch) if cursor_focused => key_spans.push(Span::styled(
                ch.to_string(),
                Style::default().fg(colors.bg()).bg(colors.fg()),
            )),
            Some(ch) => key_spans.push(Span::styled(ch.to_string(), value_style)),
            None if cursor_focused => {
                key_spans.push(Span::styled("_", Style::default().fg(colors.accent())))
            }
            None => {}
        }
        key_spans.push(Span::styled(after, value_style));
        if self.api_key.is_empty() && !cursor_focused {
            key_spans.push(Span::styled("(required)", dim_style));
        }

        let mut lines = Vec::new();
        lines.extend(self.row(ConfigField::Provider, "Provider", provider_value));
        lines.extend(self.row(ConfigField::Model, "Model", model_value));
        lines.extend(self.row(ConfigField::ApiKey, "API key", Line::from(key_spans)));
        Paragraph::new(lines).render(layout[1], buf);

        if self.state.is_saving() {
            let saving = Paragraph::new(Line::from(Span::styled(
                "  Saving\u{2026}",
                Style::default().fg(colors.warning()),
            )));
            saving.render(layout[3], buf);
        }
    }
}
