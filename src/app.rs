use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::api::client::{ApiClient, ApiOutcome};
use crate::api::error::ApiError;
use crate::config::Config;
use crate::event::AppEvent;
use crate::session::deck::DeckSession;
use crate::session::identity::UserId;
use crate::state::ai_config::AiConfigState;
use crate::state::analyses::AnalysisRegistry;
use crate::ui::components::config_form::ConfigField;
use crate::ui::components::menu::Menu;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// The closed set of views. Every transition goes through `App::navigate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Config,
    Analyze,
    Flashcards,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient status line; cleared by the tick handler after a few seconds.
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Which half of the Analyze view receives keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyzeFocus {
    Url,
    List,
}

/// The whole session state tree. Handlers receive it explicitly; there are
/// no globals, and only the event-loop thread mutates it.
pub struct App {
    pub screen: Screen,
    pub user_id: UserId,
    pub config: Config,
    pub theme: &'static Theme,
    pub api: ApiClient,
    pub ai_config: AiConfigState,
    pub analyses: AnalysisRegistry,
    /// Created lazily when a completed analysis is opened for study.
    pub deck: Option<DeckSession>,
    pub notice: Option<Notice>,
    pub should_quit: bool,

    // Per-view UI state.
    pub menu: Menu<'static>,
    pub config_field: ConfigField,
    pub api_key_input: LineInput,
    pub repo_input: LineInput,
    pub analyze_focus: AnalyzeFocus,
    pub analyses_selected: usize,
}

impl App {
    pub fn new(mut config: Config, events: Sender<AppEvent>) -> Result<Self> {
        config.normalize();
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);

        let api = ApiClient::new(
            &config.service_url,
            Duration::from_secs(config.request_timeout_secs),
            events,
        )?;
        let user_id = UserId::generate();
        tracing::info!(user_id = %user_id, service_url = %config.service_url, "session started");

        Ok(Self {
            screen: Screen::Home,
            user_id,
            config,
            theme,
            api,
            ai_config: AiConfigState::new(),
            analyses: AnalysisRegistry::new(),
            deck: None,
            notice: None,
            should_quit: false,
            menu,
            config_field: ConfigField::default(),
            api_key_input: LineInput::new(""),
            repo_input: LineInput::new(""),
            analyze_focus: AnalyzeFocus::Url,
            analyses_selected: 0,
        })
    }

    /// Kick off the startup round of reads. Results arrive as events; until
    /// then every view renders its degraded form.
    pub fn bootstrap(&mut self) {
        tracing::debug!(
            service_url = %self.config.service_url,
            timeout_secs = self.config.request_timeout_secs,
            "fetching startup state"
        );
        self.api.check_health();
        self.reload_catalog();
        self.reload_config();
        self.reload_analyses();
    }

    /// The one transition function. Navigation never fails and is never
    /// gated; views degrade when their data is missing.
    pub fn navigate(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            kind: NoticeKind::Info,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            kind: NoticeKind::Error,
            shown_at: Instant::now(),
        });
    }

    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.shown_at.elapsed() > NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    // --- read operations -------------------------------------------------

    pub fn reload_catalog(&mut self) {
        let generation = self.ai_config.catalog_slot.begin();
        self.api.fetch_models(generation);
    }

    pub fn reload_config(&mut self) {
        let generation = self.ai_config.load_slot.begin();
        self.api.fetch_config(&self.user_id, generation);
    }

    pub fn reload_analyses(&mut self) {
        let generation = self.analyses.list_slot.begin();
        self.api.fetch_analyses(&self.user_id, generation);
    }

    /// Refresh just the highlighted analysis — the cheap way to watch one
    /// submission move from pending to completed.
    pub fn refresh_selected_analysis(&mut self) {
        let Some(id) = self
            .analyses
            .get(self.analyses_selected)
            .map(|a| a.id.clone())
        else {
            return;
        };
        let generation = self.analyses.detail_slot.begin();
        self.api.fetch_analysis(&id, generation);
    }

    // --- write operations ------------------------------------------------

    /// Save the selected provider/model with the entered API key. Validation
    /// failures surface locally; no request is issued for them.
    pub fn save_ai_config(&mut self) {
        if self.ai_config.is_saving() {
            return;
        }
        match self
            .ai_config
            .validate_save(self.api_key_input.value(), self.user_id.as_str())
        {
            Ok(request) => {
                let generation = self.ai_config.save_slot.begin();
                tracing::info!(provider = %request.provider, model = %request.model, "saving AI configuration");
                self.api.save_config(request, generation);
            }
            Err(err) => self.notify_error(err.to_string()),
        }
    }

    /// Submit the entered repository URL for analysis. A missing
    /// configuration routes the user to the config view instead of the
    /// network.
    pub fn submit_analysis(&mut self) {
        if self.analyses.is_submitting() {
            return;
        }
        match self.analyses.validate_submit(
            self.repo_input.value(),
            self.ai_config.current.configured,
            self.user_id.as_str(),
        ) {
            Ok(request) => {
                let generation = self.analyses.submit_slot.begin();
                tracing::info!(repo_url = %request.repo_url, "submitting repository for analysis");
                self.api.submit_analysis(request, generation);
            }
            Err(err @ ApiError::Precondition(_)) => {
                self.notify_error(err.to_string());
                self.navigate(Screen::Config);
            }
            Err(err) => self.notify_error(err.to_string()),
        }
    }

    // --- study session ---------------------------------------------------

    /// Make the analysis under the cursor current and open its deck. Only a
    /// completed analysis can be studied; anything else is a no-op with a
    /// notice.
    pub fn select_analysis(&mut self, index: usize) {
        let Some((id, completed)) = self
            .analyses
            .get(index)
            .map(|a| (a.id.clone(), a.status.is_completed()))
        else {
            return;
        };
        if !completed {
            self.notify_info("That analysis is not ready to study yet");
            return;
        }
        if self.analyses.select(&id) {
            self.open_flashcards();
        }
    }

    /// Enter the Flashcards view, building the deck session lazily. A
    /// different analysis than the existing deck's resets position; the same
    /// one keeps it.
    pub fn open_flashcards(&mut self) {
        if let Some(analysis) = self.analyses.current() {
            let rebuild = self
                .deck
                .as_ref()
                .is_none_or(|deck| deck.analysis_id() != analysis.id);
            if rebuild {
                self.deck = Some(DeckSession::open(analysis));
            }
        }
        self.navigate(Screen::Flashcards);
    }

    /// Re-align the deck after the registry changed underneath it: rebuild
    /// when the current analysis's cards changed, drop it when the selection
    /// is gone. Never creates a deck on its own.
    fn sync_deck(&mut self) {
        let next = match (self.analyses.current(), self.deck.as_ref()) {
            (_, None) => return,
            (Some(analysis), Some(deck))
                if deck.analysis_id() == analysis.id
                    && deck.card_count() == analysis.flashcards.len() =>
            {
                return;
            }
            (Some(analysis), Some(_)) => Some(DeckSession::open(analysis)),
            (None, Some(_)) => None,
        };
        self.deck = next;
    }

    // --- event application -----------------------------------------------

    /// Apply one completed service request. Results with a stale generation
    /// are dropped; read failures keep the previous state.
    pub fn apply_api(&mut self, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Health { result } => match result {
                Ok(()) => tracing::debug!("analysis service reachable"),
                Err(err) => {
                    tracing::warn!(%err, "health check failed");
                    self.notify_error(format!(
                        "Cannot reach analysis service at {}",
                        self.api.base_url()
                    ));
                }
            },

            ApiOutcome::Catalog { generation, result } => {
                if !self.ai_config.catalog_slot.accept(generation) {
                    tracing::debug!("dropping stale model catalog response");
                    return;
                }
                match result {
                    Ok(catalog) => self.ai_config.install_catalog(catalog),
                    Err(err) => tracing::warn!(%err, "model catalog fetch failed; keeping previous"),
                }
            }

            ApiOutcome::Config { generation, result } => {
                if !self.ai_config.load_slot.accept(generation) {
                    tracing::debug!("dropping stale config response");
                    return;
                }
                match result {
                    Ok(config) => self.ai_config.apply_loaded(config),
                    Err(err) => tracing::warn!(%err, "config load failed; keeping previous"),
                }
            }

            ApiOutcome::ConfigSaved { generation, result } => {
                if !self.ai_config.save_slot.accept(generation) {
                    tracing::debug!("dropping stale save confirmation");
                    return;
                }
                match result {
                    Ok(reply) => {
                        let text = if reply.message.is_empty() {
                            "AI configuration saved".to_string()
                        } else {
                            reply.message
                        };
                        self.notify_info(text);
                        // Only a confirmed reload flips `configured`; the
                        // save itself never sets it optimistically.
                        self.reload_config();
                        self.navigate(Screen::Home);
                    }
                    Err(err) => self.notify_error(err.to_string()),
                }
            }

            ApiOutcome::Analyses { generation, result } => {
                if !self.analyses.list_slot.accept(generation) {
                    tracing::debug!("dropping stale analysis list");
                    return;
                }
                match result {
                    Ok(list) => {
                        self.analyses.apply_list(list);
                        if !self.analyses.is_empty() {
                            self.analyses_selected =
                                self.analyses_selected.min(self.analyses.len() - 1);
                        } else {
                            self.analyses_selected = 0;
                        }
                        self.sync_deck();
                    }
                    Err(err) => tracing::warn!(%err, "analysis list fetch failed; keeping previous"),
                }
            }

            ApiOutcome::AnalysisDetail { generation, result } => {
                if !self.analyses.detail_slot.accept(generation) {
                    tracing::debug!("dropping stale analysis detail");
                    return;
                }
                match result {
                    Ok(analysis) => {
                        self.analyses.apply_detail(analysis);
                        self.sync_deck();
                    }
                    Err(err) => tracing::warn!(%err, "analysis refresh failed; keeping previous"),
                }
            }

            ApiOutcome::AnalysisSubmitted { generation, result } => {
                if !self.analyses.submit_slot.accept(generation) {
                    tracing::debug!("dropping stale submission confirmation");
                    return;
                }
                match result {
                    Ok(accepted) => {
                        let text = if accepted.message.is_empty() {
                            "Repository analysis started".to_string()
                        } else {
                            accepted.message
                        };
                        self.notify_info(text);
                        self.repo_input.clear();
                        self.reload_analyses();
                    }
                    Err(err) => self.notify_error(err.to_string()),
                }
            }
        }
    }

    // --- analyze-view list cursor ----------------------------------------

    pub fn analyses_cursor_down(&mut self) {
        if !self.analyses.is_empty() {
            self.analyses_selected = (self.analyses_selected + 1).min(self.analyses.len() - 1);
        }
    }

    pub fn analyses_cursor_up(&mut self) {
        self.analyses_selected = self.analyses_selected.saturating_sub(1);
    }
}
