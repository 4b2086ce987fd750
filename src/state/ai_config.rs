use crate::api::error::ApiError;
use crate::api::types::{AiConfig, ModelCatalog, SaveConfigRequest};
use crate::state::slot::RequestSlot;

/// Provider/model/API-key choice and its server-confirmed status, plus the
/// read-only model catalog the choice is made from.
///
/// `current` changes only when a load round-trip confirms it; the form
/// selection (`selected_*`) is local until a save succeeds and the reload
/// lands.
#[derive(Clone, Debug, Default)]
pub struct AiConfigState {
    pub catalog: ModelCatalog,
    pub current: AiConfig,
    selected_provider: String,
    selected_model: String,
    pub catalog_slot: RequestSlot,
    pub load_slot: RequestSlot,
    pub save_slot: RequestSlot,
}

impl AiConfigState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_provider(&self) -> &str {
        &self.selected_provider
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn selected_model_name(&self) -> Option<&str> {
        self.catalog
            .display_name(&self.selected_provider, &self.selected_model)
    }

    pub fn is_saving(&self) -> bool {
        self.save_slot.in_flight()
    }

    /// Install the startup catalog snapshot and seed the form selection:
    /// the confirmed provider/model when one exists in the catalog, else the
    /// first provider with its first model.
    pub fn install_catalog(&mut self, catalog: ModelCatalog) {
        self.catalog = catalog;
        self.sync_selection();
    }

    /// Apply a confirmed configuration from the service.
    pub fn apply_loaded(&mut self, config: AiConfig) {
        self.current = config;
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        if self.current.configured
            && self
                .catalog
                .display_name(&self.current.provider, &self.current.model_key)
                .is_some()
        {
            self.selected_provider = self.current.provider.clone();
            self.selected_model = self.current.model_key.clone();
        } else if let Some(provider) = self.catalog.first_provider() {
            let provider = provider.to_string();
            self.select_provider(&provider);
        }
    }

    /// Select a provider. The selected model always resets to the first key
    /// of that provider's catalog entry, whatever was selected before.
    pub fn select_provider(&mut self, provider: &str) {
        self.selected_provider = provider.to_string();
        self.selected_model = self
            .catalog
            .first_model(provider)
            .unwrap_or_default()
            .to_string();
    }

    pub fn cycle_provider(&mut self, forward: bool) {
        let providers: Vec<String> = self.catalog.providers().map(str::to_string).collect();
        if providers.is_empty() {
            return;
        }
        let next = match providers.iter().position(|p| *p == self.selected_provider) {
            Some(i) if forward => (i + 1) % providers.len(),
            Some(i) => (i + providers.len() - 1) % providers.len(),
            None => 0,
        };
        self.select_provider(&providers[next]);
    }

    pub fn cycle_model(&mut self, forward: bool) {
        let models: Vec<String> = self
            .catalog
            .models(&self.selected_provider)
            .map(|(key, _)| key.to_string())
            .collect();
        if models.is_empty() {
            return;
        }
        let next = match models.iter().position(|m| *m == self.selected_model) {
            Some(i) if forward => (i + 1) % models.len(),
            Some(i) => (i + models.len() - 1) % models.len(),
            None => 0,
        };
        self.selected_model = models[next].clone();
    }

    /// Check the save preconditions and build the request. Failing here means
    /// no network call is made.
    pub fn validate_save(&self, api_key: &str, user_id: &str) -> Result<SaveConfigRequest, ApiError> {
        if self.selected_provider.is_empty() || self.selected_model.is_empty() {
            return Err(ApiError::validation(
                "Select a provider and model before saving",
            ));
        }
        if api_key.trim().is_empty() {
            return Err(ApiError::validation("API key must not be empty"));
        }
        Ok(SaveConfigRequest {
            provider: self.selected_provider.clone(),
            model: self.selected_model.clone(),
            api_key: api_key.trim().to_string(),
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        serde_json::from_value(serde_json::json!({
            "openai": {"gpt4": "GPT-4", "o3-mini": "O3 Mini"},
            "anthropic": {"claude3": "Claude 3"},
            "gemini": {"flash": "Gemini Flash", "pro": "Gemini Pro"}
        }))
        .unwrap()
    }

    fn state_with_catalog() -> AiConfigState {
        let mut state = AiConfigState::new();
        state.install_catalog(catalog());
        state
    }

    #[test]
    fn selecting_a_provider_resets_model_to_first_key() {
        let mut state = state_with_catalog();
        for provider in ["openai", "anthropic", "gemini"] {
            // Park the selection somewhere else first.
            state.select_provider("gemini");
            state.cycle_model(true);
            state.select_provider(provider);
            assert_eq!(
                state.selected_model(),
                state.catalog.first_model(provider).unwrap(),
                "provider {provider}"
            );
        }
    }

    #[test]
    fn switching_provider_picks_first_catalog_model() {
        let mut state = AiConfigState::new();
        state.install_catalog(
            serde_json::from_value(serde_json::json!({
                "openai": {"gpt4": "GPT-4"},
                "anthropic": {"claude3": "Claude 3"}
            }))
            .unwrap(),
        );
        state.select_provider("anthropic");
        assert_eq!(state.selected_model(), "claude3");
    }

    #[test]
    fn install_catalog_seeds_first_provider_when_unconfigured() {
        let state = state_with_catalog();
        assert_eq!(state.selected_provider(), "anthropic");
        assert_eq!(state.selected_model(), "claude3");
    }

    #[test]
    fn install_catalog_prefers_confirmed_config() {
        let mut state = AiConfigState::new();
        state.current = AiConfig {
            configured: true,
            provider: "openai".into(),
            model_key: "o3-mini".into(),
            model_name: "O3 Mini".into(),
        };
        state.install_catalog(catalog());
        assert_eq!(state.selected_provider(), "openai");
        assert_eq!(state.selected_model(), "o3-mini");
    }

    #[test]
    fn confirmed_config_missing_from_catalog_falls_back_to_first() {
        let mut state = AiConfigState::new();
        state.current = AiConfig {
            configured: true,
            provider: "mistral".into(),
            model_key: "large".into(),
            model_name: "Large".into(),
        };
        state.install_catalog(catalog());
        assert_eq!(state.selected_provider(), "anthropic");
    }

    #[test]
    fn cycle_provider_walks_catalog_order_and_wraps() {
        let mut state = state_with_catalog();
        assert_eq!(state.selected_provider(), "anthropic");
        state.cycle_provider(true);
        assert_eq!(state.selected_provider(), "gemini");
        state.cycle_provider(true);
        assert_eq!(state.selected_provider(), "openai");
        state.cycle_provider(true);
        assert_eq!(state.selected_provider(), "anthropic");
        state.cycle_provider(false);
        assert_eq!(state.selected_provider(), "openai");
    }

    #[test]
    fn cycle_model_stays_within_provider() {
        let mut state = state_with_catalog();
        state.select_provider("gemini");
        assert_eq!(state.selected_model(), "flash");
        state.cycle_model(true);
        assert_eq!(state.selected_model(), "pro");
        state.cycle_model(true);
        assert_eq!(state.selected_model(), "flash");
    }

    #[test]
    fn save_with_empty_api_key_is_a_validation_error() {
        let state = state_with_catalog();
        let err = state.validate_save("", "user-1").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = state.validate_save("   ", "user-1").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn save_with_no_catalog_is_a_validation_error() {
        let state = AiConfigState::new();
        let err = state.validate_save("sk-123", "user-1").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn valid_save_builds_the_request() {
        let mut state = state_with_catalog();
        state.select_provider("openai");
        let request = state.validate_save(" sk-123 ", "user-1").unwrap();
        assert_eq!(request.provider, "openai");
        assert_eq!(request.model, "gpt4");
        assert_eq!(request.api_key, "sk-123");
        assert_eq!(request.user_id, "user-1");
    }
}
