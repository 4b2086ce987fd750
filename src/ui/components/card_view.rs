use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::api::types::{Analysis, Difficulty};
use crate::session::deck::DeckSession;
use crate::ui::theme::Theme;

pub struct CardView<'a> {
    pub analysis: &'a Analysis,
    pub deck: &'a DeckSession,
    pub theme: &'a Theme,
}

impl<'a> CardView<'a> {
    pub fn new(analysis: &'a Analysis, deck: &'a DeckSession, theme: &'a Theme) -> Self {
        Self {
            analysis,
            deck,
            theme,
        }
    }

    fn difficulty_color(&self, difficulty: Difficulty) -> ratatui::style::Color {
        let colors = &self.theme.colors;
        match difficulty {
            Difficulty::Easy => colors.success(),
            Difficulty::Medium => colors.warning(),
            Difficulty::Hard => colors.error(),
        }
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = format!(" Studying {} ", self.analysis.short_repo());
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(index) = self.deck.index() else {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "This analysis produced no flashcards.",
                    Style::default().fg(colors.warning()),
                )),
                Line::from(Span::styled(
                    "Try analyzing a repository with more code files.",
                    Style::default().fg(colors.text_dim()),
                )),
            ])
            .alignment(Alignment::Center);
            message.render(inner, buf);
            return;
        };

        let Some(card) = self.analysis.flashcards.get(index) else {
            // The deck was built from this analysis, so the index is in
            // range; a mismatch means the caller paired the wrong analysis.
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(inner);

        // Progress and badges.
        let header = Line::from(vec![
            Span::styled(
                format!("  Card {}/{}", index + 1, self.deck.card_count()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {}", card.difficulty.label()),
                Style::default().fg(self.difficulty_color(card.difficulty)),
            ),
            Span::styled(
                if card.category.is_empty() {
                    String::new()
                } else {
                    format!("   {}", card.category)
                },
                Style::default().fg(colors.text_dim()),
            ),
        ]);
        Paragraph::new(header).render(layout[0], buf);

        let mut body: Vec<Line> = vec![
            Line::from(Span::styled(
                "  Q:",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  {}", card.front),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];

        if self.deck.revealed() {
            body.push(Line::from(Span::styled(
                "  A:",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )));
            body.push(Line::from(Span::styled(
                format!("  {}", card.back),
                Style::default().fg(colors.fg()),
            )));
            body.push(Line::from(""));

            if let Some(snippet) = &card.code_snippet {
                for line in snippet.lines().take(10) {
                    body.push(Line::from(Span::styled(
                        format!("    {line}"),
                        Style::default().fg(colors.code_fg()).bg(colors.code_bg()),
                    )));
                }
                body.push(Line::from(""));
            }
            if let Some(path) = &card.file_path {
                body.push(Line::from(Span::styled(
                    format!("  \u{2192} {path}"),
                    Style::default().fg(colors.text_dim()),
                )));
            }
        } else {
            body.push(Line::from(Span::styled(
                "  (press space to reveal the answer)",
                Style::default().fg(colors.text_dim()),
            )));
        }

        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);
    }
}
