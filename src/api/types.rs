use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Provider -> (model key -> display name), as served by `GET /api/ai-models`.
///
/// Backed by `BTreeMap` so provider order and the "first model of a provider"
/// are deterministic for the whole session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog(BTreeMap<String, BTreeMap<String, String>>);

impl ModelCatalog {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn provider_count(&self) -> usize {
        self.0.len()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn first_provider(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    /// (model key, display name) pairs for one provider, in catalog order.
    pub fn models(&self, provider: &str) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .get(provider)
            .into_iter()
            .flat_map(|models| models.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn model_count(&self, provider: &str) -> usize {
        self.0.get(provider).map_or(0, BTreeMap::len)
    }

    pub fn first_model(&self, provider: &str) -> Option<&str> {
        self.0
            .get(provider)?
            .keys()
            .next()
            .map(String::as_str)
    }

    pub fn display_name(&self, provider: &str, model_key: &str) -> Option<&str> {
        self.0.get(provider)?.get(model_key).map(String::as_str)
    }
}

/// Server-confirmed AI configuration from `GET /api/ai-config/{user_id}`.
///
/// The unset state is `configured: false` with empty fields. The model key
/// arrives as `model_key` or as `model` depending on the service build; both
/// are accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub provider: String,
    #[serde(default, alias = "model")]
    pub model_key: String,
    #[serde(default)]
    pub model_name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    // The service writes "queued" for a just-accepted analysis.
    #[serde(alias = "queued")]
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == AnalysisStatus::Completed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// One study card. Order within an analysis defines deck order.
#[derive(Clone, Debug, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// One repository analysis owned by the user. Created and advanced
/// server-side; the client only observes it.
#[derive(Clone, Debug, Deserialize)]
pub struct Analysis {
    pub id: String,
    pub repo_url: String,
    #[serde(default)]
    pub status: AnalysisStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub total_files: u32,
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Analysis {
    /// "owner/repo" tail of the URL for compact display.
    pub fn short_repo(&self) -> &str {
        let trimmed = self.repo_url.trim_end_matches('/').trim_end_matches(".git");
        let mut parts = trimmed.rsplitn(3, '/');
        match (parts.next(), parts.next()) {
            (Some(repo), Some(owner)) if !owner.is_empty() && !repo.is_empty() => {
                let len = owner.len() + 1 + repo.len();
                &trimmed[trimmed.len() - len..]
            }
            _ => trimmed,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnalysisList {
    #[serde(default)]
    pub analyses: Vec<Analysis>,
}

/// Accepted-analysis stub from `POST /api/analyze-repository`.
#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisAccepted {
    pub analysis_id: String,
    #[serde(default)]
    pub status: AnalysisStatus,
    #[serde(default)]
    pub message: String,
}

/// 2xx body of `POST /api/ai-config`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SaveReply {
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SaveConfigRequest {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub user_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyzeRequest {
    pub repo_url: String,
    pub user_id: String,
}
