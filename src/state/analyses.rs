use crate::api::error::ApiError;
use crate::api::types::{Analysis, AnalyzeRequest};
use crate::state::slot::RequestSlot;

/// The analyses owned by this session's user, and the one selected for study.
///
/// The service creates and advances analyses; this registry only observes
/// them. Selection is only ever a completed analysis — anything else is
/// rejected and the previous selection stays.
#[derive(Clone, Debug, Default)]
pub struct AnalysisRegistry {
    pub analyses: Vec<Analysis>,
    current_id: Option<String>,
    pub list_slot: RequestSlot,
    pub detail_slot: RequestSlot,
    pub submit_slot: RequestSlot,
}

impl AnalysisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_slot.in_flight()
    }

    pub fn is_loading(&self) -> bool {
        self.list_slot.in_flight()
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Analysis> {
        self.analyses.get(index)
    }

    pub fn completed_count(&self) -> usize {
        self.analyses
            .iter()
            .filter(|a| a.status.is_completed())
            .count()
    }

    pub fn current(&self) -> Option<&Analysis> {
        let id = self.current_id.as_deref()?;
        self.analyses.iter().find(|a| a.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Select the analysis to study. Only a completed analysis can become
    /// current; otherwise this is a rejected no-op and the previous selection
    /// is untouched.
    pub fn select(&mut self, analysis_id: &str) -> bool {
        let completed = self
            .analyses
            .iter()
            .any(|a| a.id == analysis_id && a.status.is_completed());
        if completed {
            self.current_id = Some(analysis_id.to_string());
        }
        completed
    }

    /// Check the submit preconditions and build the request. Failing here
    /// means no network call is made; a missing configuration tells the
    /// caller to send the user to the config view.
    pub fn validate_submit(
        &self,
        repo_url: &str,
        configured: bool,
        user_id: &str,
    ) -> Result<AnalyzeRequest, ApiError> {
        if !configured {
            return Err(ApiError::precondition(
                "Configure an AI model before analyzing a repository",
            ));
        }
        let repo_url = repo_url.trim();
        if repo_url.is_empty() {
            return Err(ApiError::validation("Repository URL must not be empty"));
        }
        Ok(AnalyzeRequest {
            repo_url: repo_url.to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// Replace the list with a fresh server snapshot. The current selection
    /// survives only if that analysis is still present and completed.
    pub fn apply_list(&mut self, analyses: Vec<Analysis>) {
        self.analyses = analyses;
        if let Some(id) = self.current_id.clone() {
            let still_valid = self
                .analyses
                .iter()
                .any(|a| a.id == id && a.status.is_completed());
            if !still_valid {
                self.current_id = None;
            }
        }
    }

    /// Merge a refreshed single analysis over its list entry. An id the list
    /// does not contain is appended (a just-submitted analysis fetched before
    /// the next full reload).
    pub fn apply_detail(&mut self, analysis: Analysis) {
        match self.analyses.iter_mut().find(|a| a.id == analysis.id) {
            Some(entry) => *entry = analysis,
            None => self.analyses.push(analysis),
        }
    }
}
