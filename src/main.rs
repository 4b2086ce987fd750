mod api;
mod app;
mod config;
mod event;
mod session;
mod state;
mod ui;

use std::fs;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{AnalyzeFocus, App, NoticeKind, Screen};
use config::Config;
use event::{AppEvent, EventHandler};
use ui::components::analyses_list::AnalysesList;
use ui::components::card_view::CardView;
use ui::components::config_form::{ConfigField, ConfigForm};
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(
    name = "repocards",
    version,
    about = "Terminal study client for AI-generated repository flashcards"
)]
struct Cli {
    #[arg(short, long, help = "Analysis service base URL")]
    server: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(server) = cli.server {
        config.service_url = server;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    init_tracing();

    let events = EventHandler::new(Duration::from_millis(200));
    let mut app = App::new(config, events.sender())?;
    app.bootstrap();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file under the data dir; stdout belongs to the TUI. Filtered by
/// RUST_LOG, default info for this crate only.
fn init_tracing() {
    let Some(dir) = dirs::data_dir() else {
        return;
    };
    let dir = dir.join("repocards");
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::File::create(dir.join("repocards.log")) else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "repocards=info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Api(outcome) => app.apply_api(outcome),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Home => handle_home_key(app, key),
        Screen::Config => handle_config_key(app, key),
        Screen::Analyze => handle_analyze_key(app, key),
        Screen::Flashcards => handle_flashcards_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('a') => app.navigate(Screen::Analyze),
        KeyCode::Char('f') => app.open_flashcards(),
        KeyCode::Char('c') => app.navigate(Screen::Config),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.navigate(Screen::Analyze),
            1 => app.open_flashcards(),
            2 => app.navigate(Screen::Config),
            3 => app.should_quit = true,
            _ => {}
        },
        _ => {}
    }
}

fn handle_config_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.navigate(Screen::Home),
        KeyCode::Enter => app.save_ai_config(),
        KeyCode::Down | KeyCode::Tab => app.config_field = app.config_field.next(),
        KeyCode::Up | KeyCode::BackTab => app.config_field = app.config_field.prev(),
        _ => match app.config_field {
            ConfigField::Provider => match key.code {
                KeyCode::Right | KeyCode::Char('l') => app.ai_config.cycle_provider(true),
                KeyCode::Left | KeyCode::Char('h') => app.ai_config.cycle_provider(false),
                _ => {}
            },
            ConfigField::Model => match key.code {
                KeyCode::Right | KeyCode::Char('l') => app.ai_config.cycle_model(true),
                KeyCode::Left | KeyCode::Char('h') => app.ai_config.cycle_model(false),
                _ => {}
            },
            ConfigField::ApiKey => {
                let _ = app.api_key_input.handle(key);
            }
        },
    }
}

fn handle_analyze_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.navigate(Screen::Home),
        KeyCode::Tab | KeyCode::BackTab => {
            app.analyze_focus = match app.analyze_focus {
                AnalyzeFocus::Url => AnalyzeFocus::List,
                AnalyzeFocus::List => AnalyzeFocus::Url,
            };
        }
        _ => match app.analyze_focus {
            AnalyzeFocus::Url => match key.code {
                KeyCode::Enter => app.submit_analysis(),
                _ => {
                    let _ = app.repo_input.handle(key);
                }
            },
            AnalyzeFocus::List => match key.code {
                KeyCode::Down | KeyCode::Char('j') => app.analyses_cursor_down(),
                KeyCode::Up | KeyCode::Char('k') => app.analyses_cursor_up(),
                KeyCode::Enter => app.select_analysis(app.analyses_selected),
                KeyCode::Char('r') => app.reload_analyses(),
                KeyCode::Char('g') => app.refresh_selected_analysis(),
                _ => {}
            },
        },
    }
}

fn handle_flashcards_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.navigate(Screen::Home),
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(deck) = app.deck.as_mut() {
                if deck.revealed() {
                    deck.next();
                } else {
                    deck.reveal();
                }
            }
        }
        KeyCode::Right | KeyCode::Char('n') => {
            if let Some(deck) = app.deck.as_mut() {
                deck.next();
            }
        }
        KeyCode::Left | KeyCode::Char('p') => {
            if let Some(deck) = app.deck.as_mut() {
                deck.previous();
            }
        }
        KeyCode::Char('r') => {
            if let Some(deck) = app.deck.as_mut() {
                deck.reset();
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.screen {
        Screen::Home => render_home(frame, app, layout.main),
        Screen::Config => render_config(frame, app, layout.main),
        Screen::Analyze => render_analyze(frame, app, layout.main),
        Screen::Flashcards => render_flashcards(frame, app, layout.main),
    }

    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let config_info = if app.ai_config.current.configured {
        format!(" {} | ", app.ai_config.current.model_name)
    } else {
        " no AI model configured | ".to_string()
    };
    let header_info = format!(
        "{}{} analyses ready",
        config_info,
        app.analyses.completed_count()
    );

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " repocards ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Info => colors.success(),
            NoticeKind::Error => colors.error(),
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", notice.text),
            Style::default().fg(color),
        )));
        frame.render_widget(line, area);
        return;
    }

    let hints = match app.screen {
        Screen::Home => " [a] Analyze  [f] Flashcards  [c] Configure  [q] Quit ",
        Screen::Config => " [Tab] Field  [\u{2190}/\u{2192}] Change  [Enter] Save  [Esc] Back ",
        Screen::Analyze => {
            " [Tab] Focus  [Enter] Submit/Study  [r] Refresh  [g] Refresh one  [Esc] Back "
        }
        Screen::Flashcards => {
            " [Space] Reveal/Next  [\u{2190}/\u{2192}] Card  [r] Front  [Esc] Back "
        }
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, area);
}

fn render_home(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let menu_area = centered_rect(50, 80, area);
    frame.render_widget(&app.menu, menu_area);
}

fn render_config(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let form_area = centered_rect(60, 80, area);
    let form = ConfigForm::new(
        &app.ai_config,
        app.config_field,
        &app.api_key_input,
        app.theme,
    );
    frame.render_widget(form, form_area);
}

fn render_analyze(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let url_focused = app.analyze_focus == AnalyzeFocus::Url;
    let border = if url_focused {
        colors.border_focused()
    } else {
        colors.border()
    };
    let title = if app.analyses.is_submitting() {
        " Repository URL (analyzing\u{2026}) "
    } else {
        " Repository URL "
    };
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    let (before, cursor, after) = app.repo_input.render_parts();
    let mut spans = vec![Span::styled(before, Style::default().fg(colors.fg()))];
    match cursor {
        Some(ch) if url_focused => spans.push(Span::styled(
            ch.to_string(),
            Style::default().fg(colors.bg()).bg(colors.fg()),
        )),
        Some(ch) => spans.push(Span::styled(
            ch.to_string(),
            Style::default().fg(colors.fg()),
        )),
        None if url_focused => spans.push(Span::styled("_", Style::default().fg(colors.accent()))),
        None => {}
    }
    spans.push(Span::styled(after, Style::default().fg(colors.fg())));
    if app.repo_input.is_empty() {
        spans.push(Span::styled(
            " https://github.com/owner/repo",
            Style::default().fg(colors.text_dim()),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    let list = AnalysesList::new(
        &app.analyses,
        app.analyses_selected,
        app.analyze_focus == AnalyzeFocus::List,
        app.theme,
    );
    frame.render_widget(list, layout[1]);
}

fn render_flashcards(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    match (&app.deck, app.analyses.current()) {
        (Some(deck), Some(analysis)) if deck.analysis_id() == analysis.id => {
            let card_area = centered_rect(80, 90, area);
            let view = CardView::new(analysis, deck, app.theme);
            frame.render_widget(view, card_area);
        }
        _ => {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No analysis selected.",
                    Style::default().fg(colors.warning()),
                )),
                Line::from(Span::styled(
                    "Pick a completed analysis in the Analyze view to start studying.",
                    Style::default().fg(colors.text_dim()),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(message, centered_rect(70, 50, area));
        }
    }
}
