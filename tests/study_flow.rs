//! End-to-end state-machine scenarios: configure, submit, refresh, study.
//! Service completions are injected as `ApiOutcome` events, the same path
//! the worker threads use, so these flows exercise exactly what the event
//! loop applies.

use std::sync::mpsc;

use repocards::api::client::ApiOutcome;
use repocards::api::error::ApiError;
use repocards::api::types::{AiConfig, Analysis, ModelCatalog, SaveReply};
use repocards::app::{App, NoticeKind, Screen};
use repocards::config::Config;
use repocards::ui::line_input::LineInput;

fn make_app() -> App {
    let (tx, _rx) = mpsc::channel();
    App::new(Config::default(), tx).unwrap()
}

fn catalog() -> ModelCatalog {
    serde_json::from_value(serde_json::json!({
        "openai": {"gpt-4o": "GPT-4o", "o3-mini": "O3 Mini"},
        "anthropic": {"claude-3-5-sonnet": "Claude 3.5 Sonnet"},
        "gemini": {"gemini-2.0-flash": "Gemini 2.0 Flash"}
    }))
    .unwrap()
}

fn analysis(id: &str, status: &str, cards: usize) -> Analysis {
    let cards: Vec<serde_json::Value> = (0..cards)
        .map(|i| {
            serde_json::json!({
                "id": format!("{id}-c{i}"),
                "front": format!("What does module {i} do?"),
                "back": format!("It handles concern {i}."),
                "category": "Architecture",
                "difficulty": "Medium",
                "code_snippet": "fn main() {}",
                "file_path": "src/main.rs"
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "repo_url": format!("https://github.com/octo/{id}"),
        "status": status,
        "flashcards": cards,
        "languages": ["rs"]
    }))
    .unwrap()
}

fn install_catalog(app: &mut App) {
    app.reload_catalog();
    app.apply_api(ApiOutcome::Catalog {
        generation: 1,
        result: Ok(catalog()),
    });
}

#[test]
fn configuration_flow_confirms_only_after_reload() {
    let mut app = make_app();
    install_catalog(&mut app);

    // Catalog order seeds the first provider and its first model.
    assert_eq!(app.ai_config.selected_provider(), "anthropic");
    assert_eq!(app.ai_config.selected_model(), "claude-3-5-sonnet");

    // Walk to openai; the model follows the first-key rule.
    app.ai_config.cycle_provider(true);
    assert_eq!(app.ai_config.selected_provider(), "gemini");
    app.ai_config.cycle_provider(true);
    assert_eq!(app.ai_config.selected_provider(), "openai");
    assert_eq!(app.ai_config.selected_model(), "gpt-4o");

    app.navigate(Screen::Config);
    app.api_key_input = LineInput::new("sk-test-123");
    app.save_ai_config();
    assert!(app.ai_config.is_saving());
    // Still unconfirmed while the request is in flight.
    assert!(!app.ai_config.current.configured);

    app.apply_api(ApiOutcome::ConfigSaved {
        generation: 1,
        result: Ok(SaveReply {
            message: "AI configuration saved successfully".into(),
        }),
    });
    assert_eq!(app.screen, Screen::Home, "successful save returns home");
    assert!(app.ai_config.load_slot.in_flight(), "reload triggered");

    app.apply_api(ApiOutcome::Config {
        generation: 1,
        result: Ok(AiConfig {
            configured: true,
            provider: "openai".into(),
            model_key: "gpt-4o".into(),
            model_name: "GPT-4o".into(),
        }),
    });
    assert!(app.ai_config.current.configured);
    assert_eq!(app.ai_config.current.model_name, "GPT-4o");
}

#[test]
fn submit_before_configuring_is_refused_and_routed_to_config() {
    let mut app = make_app();
    install_catalog(&mut app);
    app.navigate(Screen::Analyze);
    app.repo_input = LineInput::new("https://github.com/octo/repo");

    app.submit_analysis();

    assert_eq!(app.screen, Screen::Config);
    assert!(!app.analyses.is_submitting(), "nothing was sent");
    let notice = app.notice.as_ref().expect("precondition notice shown");
    assert_eq!(notice.kind, NoticeKind::Error);
}

#[test]
fn analysis_lifecycle_submit_refresh_study() {
    let mut app = make_app();
    install_catalog(&mut app);
    app.apply_api(ApiOutcome::Config {
        generation: 0,
        result: Ok(AiConfig {
            configured: true,
            provider: "openai".into(),
            model_key: "gpt-4o".into(),
            model_name: "GPT-4o".into(),
        }),
    });

    // Submit a repository.
    app.navigate(Screen::Analyze);
    app.repo_input = LineInput::new("https://github.com/octo/widget");
    app.submit_analysis();
    assert!(app.analyses.is_submitting());
    app.apply_api(ApiOutcome::AnalysisSubmitted {
        generation: 1,
        result: Ok(serde_json::from_value(serde_json::json!({
            "analysis_id": "a1",
            "status": "queued",
            "message": "Repository analysis started"
        }))
        .unwrap()),
    });
    assert!(app.repo_input.is_empty());
    assert!(app.analyses.is_loading());

    // The list comes back with the analysis still processing.
    app.apply_api(ApiOutcome::Analyses {
        generation: 1,
        result: Ok(vec![analysis("a1", "processing", 0)]),
    });
    assert_eq!(app.analyses.len(), 1);

    // Studying it now is rejected; no deck appears.
    app.select_analysis(0);
    assert!(app.deck.is_none());

    // A single-analysis refresh brings it to completed.
    app.refresh_selected_analysis();
    app.apply_api(ApiOutcome::AnalysisDetail {
        generation: 1,
        result: Ok(analysis("a1", "completed", 3)),
    });

    app.select_analysis(0);
    assert_eq!(app.screen, Screen::Flashcards);
    let deck = app.deck.as_ref().unwrap();
    assert_eq!(deck.index(), Some(0));
    assert!(!deck.revealed());

    // Browse: reveal, advance, clamp at both ends.
    let deck = app.deck.as_mut().unwrap();
    deck.reveal();
    assert!(deck.revealed());
    deck.next();
    assert_eq!(deck.index(), Some(1));
    assert!(!deck.revealed(), "advancing lands on the front side");
    deck.next();
    deck.next();
    assert_eq!(deck.index(), Some(2), "clamped at the last card");
    deck.previous();
    deck.previous();
    deck.previous();
    assert_eq!(deck.index(), Some(0), "clamped at the first card");
    deck.reveal();
    deck.reset();
    assert!(!deck.revealed());
}

#[test]
fn empty_completed_analysis_studies_as_empty_deck() {
    let mut app = make_app();
    app.reload_analyses();
    app.apply_api(ApiOutcome::Analyses {
        generation: 1,
        result: Ok(vec![analysis("bare", "completed", 0)]),
    });

    app.select_analysis(0);
    assert_eq!(app.screen, Screen::Flashcards);
    let deck = app.deck.as_ref().unwrap();
    assert!(deck.is_empty());
    assert_eq!(deck.index(), None);
    assert_eq!(deck.card_count(), 0);
}

#[test]
fn stale_read_never_overwrites_newer_state() {
    let mut app = make_app();
    app.reload_analyses(); // generation 1 — will come back late
    app.reload_analyses(); // generation 2

    app.apply_api(ApiOutcome::Analyses {
        generation: 2,
        result: Ok(vec![analysis("fresh", "completed", 2)]),
    });
    assert_eq!(app.analyses.get(0).unwrap().id, "fresh");

    // The older response finally lands; it must be dropped.
    app.apply_api(ApiOutcome::Analyses {
        generation: 1,
        result: Ok(vec![analysis("stale", "completed", 9)]),
    });
    assert_eq!(app.analyses.len(), 1);
    assert_eq!(app.analyses.get(0).unwrap().id, "fresh");
}

#[test]
fn read_failures_degrade_silently_and_session_stays_usable() {
    let mut app = make_app();
    install_catalog(&mut app);

    app.reload_analyses();
    app.apply_api(ApiOutcome::Analyses {
        generation: 1,
        result: Err(ApiError::network("connection refused")),
    });
    assert!(app.analyses.is_empty());
    assert!(app.notice.is_none(), "reads fail without blocking the UI");

    // The catalog survives a failed refresh attempt too.
    app.reload_catalog();
    app.apply_api(ApiOutcome::Catalog {
        generation: 2,
        result: Err(ApiError::remote(502, "Bad Gateway")),
    });
    assert_eq!(app.ai_config.catalog.provider_count(), 3);

    // And the session still navigates everywhere.
    for screen in [Screen::Analyze, Screen::Flashcards, Screen::Config, Screen::Home] {
        app.navigate(screen);
        assert_eq!(app.screen, screen);
    }
}
