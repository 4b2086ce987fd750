use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::types::AnalysisStatus;
use crate::state::analyses::AnalysisRegistry;
use crate::ui::theme::Theme;

pub struct AnalysesList<'a> {
    pub registry: &'a AnalysisRegistry,
    pub selected: usize,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> AnalysesList<'a> {
    pub fn new(
        registry: &'a AnalysisRegistry,
        selected: usize,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            registry,
            selected,
            focused,
            theme,
        }
    }

    fn status_color(&self, status: AnalysisStatus) -> ratatui::style::Color {
        let colors = &self.theme.colors;
        match status {
            AnalysisStatus::Pending => colors.warning(),
            AnalysisStatus::Processing => colors.accent(),
            AnalysisStatus::Completed => colors.success(),
            AnalysisStatus::Failed => colors.error(),
        }
    }
}

impl Widget for AnalysesList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let title = format!(
            " Analyses ({} ready / {}) ",
            self.registry.completed_count(),
            self.registry.len()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.registry.is_empty() {
            let placeholder = if self.registry.is_loading() {
                "  Loading analyses\u{2026}"
            } else {
                "  No analyses yet. Submit a repository URL above."
            };
            Paragraph::new(Line::from(Span::styled(
                placeholder,
                Style::default().fg(colors.text_dim()),
            )))
            .render(inner, buf);
            return;
        }

        let visible_rows = inner.height as usize;
        // Keep the selection in view; the list is small enough that a simple
        // window suffices.
        let offset = self.selected.saturating_sub(visible_rows.saturating_sub(1));

        let mut lines: Vec<Line> = Vec::new();
        for (i, analysis) in self
            .registry
            .analyses
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_rows)
        {
            let is_selected = i == self.selected;
            let is_current = self.registry.current_id() == Some(analysis.id.as_str());
            let indicator = if is_selected { ">" } else { " " };
            let marker = if is_current { "*" } else { " " };

            let row_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let mut spans = vec![
                Span::styled(format!(" {indicator}{marker} "), row_style),
                Span::styled(
                    format!("{:<10}", analysis.status.label()),
                    Style::default().fg(self.status_color(analysis.status)),
                ),
                Span::styled(format!(" {:<34}", analysis.short_repo()), row_style),
            ];

            match analysis.status {
                AnalysisStatus::Completed => {
                    spans.push(Span::styled(
                        format!(" {:>3} cards", analysis.flashcards.len()),
                        Style::default().fg(colors.text_dim()),
                    ));
                    if !analysis.languages.is_empty() {
                        let langs: Vec<&str> =
                            analysis.languages.iter().map(String::as_str).collect();
                        spans.push(Span::styled(
                            format!("  [{}]", langs.join(", ")),
                            Style::default().fg(colors.text_dim()),
                        ));
                    }
                }
                AnalysisStatus::Failed => {
                    if let Some(error) = &analysis.error {
                        let brief: String = error.chars().take(40).collect();
                        spans.push(Span::styled(
                            format!(" {brief}"),
                            Style::default().fg(colors.error()),
                        ));
                    }
                }
                _ => {
                    if let Some(created) = analysis.created_at {
                        spans.push(Span::styled(
                            format!(" submitted {}", created.format("%H:%M:%S")),
                            Style::default().fg(colors.text_dim()),
                        ));
                    }
                }
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
