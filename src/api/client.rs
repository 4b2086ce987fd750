use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::types::{
    AiConfig, Analysis, AnalysisAccepted, AnalysisList, AnalyzeRequest, ModelCatalog,
    SaveConfigRequest, SaveReply,
};
use crate::event::AppEvent;
use crate::session::identity::UserId;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8001";

/// Completion of one service request, posted back into the event channel.
/// The `generation` token is checked against the owning slot before the
/// result is applied.
#[derive(Debug)]
pub enum ApiOutcome {
    Catalog {
        generation: u64,
        result: Result<ModelCatalog, ApiError>,
    },
    Config {
        generation: u64,
        result: Result<AiConfig, ApiError>,
    },
    ConfigSaved {
        generation: u64,
        result: Result<SaveReply, ApiError>,
    },
    Analyses {
        generation: u64,
        result: Result<Vec<Analysis>, ApiError>,
    },
    AnalysisDetail {
        generation: u64,
        result: Result<Analysis, ApiError>,
    },
    AnalysisSubmitted {
        generation: u64,
        result: Result<AnalysisAccepted, ApiError>,
    },
    Health {
        result: Result<(), ApiError>,
    },
}

/// Blocking HTTP client for the analysis service.
///
/// Every operation runs on a short-lived worker thread and posts exactly one
/// `AppEvent::Api` back to the main loop; the main thread stays the only
/// state mutator.
pub struct ApiClient {
    base_url: String,
    client: Client,
    events: Sender<AppEvent>,
}

#[derive(Clone)]
struct RequestCtx {
    base_url: String,
    client: Client,
    events: Sender<AppEvent>,
}

impl RequestCtx {
    fn send(&self, outcome: ApiOutcome) {
        // The receiver is gone only during shutdown.
        let _ = self.events.send(AppEvent::Api(outcome));
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, events: Sender<AppEvent>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ctx(&self) -> RequestCtx {
        RequestCtx {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            events: self.events.clone(),
        }
    }

    pub fn check_health(&self) {
        let ctx = self.ctx();
        thread::spawn(move || {
            let url = format!("{}/api/health", ctx.base_url);
            let result = get_json::<serde_json::Value>(&ctx.client, &url).map(|_| ());
            ctx.send(ApiOutcome::Health { result });
        });
    }

    pub fn fetch_models(&self, generation: u64) {
        let ctx = self.ctx();
        thread::spawn(move || {
            let url = format!("{}/api/ai-models", ctx.base_url);
            let result = get_json::<ModelCatalog>(&ctx.client, &url);
            ctx.send(ApiOutcome::Catalog { generation, result });
        });
    }

    pub fn fetch_config(&self, user_id: &UserId, generation: u64) {
        let ctx = self.ctx();
        let user_id = user_id.clone();
        thread::spawn(move || {
            let url = format!("{}/api/ai-config/{}", ctx.base_url, user_id);
            let result = get_json::<AiConfig>(&ctx.client, &url);
            ctx.send(ApiOutcome::Config { generation, result });
        });
    }

    pub fn save_config(&self, request: SaveConfigRequest, generation: u64) {
        let ctx = self.ctx();
        thread::spawn(move || {
            let url = format!("{}/api/ai-config", ctx.base_url);
            let result = post_json::<_, SaveReply>(&ctx.client, &url, &request);
            ctx.send(ApiOutcome::ConfigSaved { generation, result });
        });
    }

    pub fn fetch_analyses(&self, user_id: &UserId, generation: u64) {
        let ctx = self.ctx();
        let user_id = user_id.clone();
        thread::spawn(move || {
            let url = format!("{}/api/user-analyses/{}", ctx.base_url, user_id);
            let result = get_json::<AnalysisList>(&ctx.client, &url).map(|list| list.analyses);
            ctx.send(ApiOutcome::Analyses { generation, result });
        });
    }

    pub fn fetch_analysis(&self, analysis_id: &str, generation: u64) {
        let ctx = self.ctx();
        let analysis_id = analysis_id.to_string();
        thread::spawn(move || {
            let url = format!("{}/api/analysis/{}", ctx.base_url, analysis_id);
            let result = get_json::<Analysis>(&ctx.client, &url);
            ctx.send(ApiOutcome::AnalysisDetail { generation, result });
        });
    }

    pub fn submit_analysis(&self, request: AnalyzeRequest, generation: u64) {
        let ctx = self.ctx();
        thread::spawn(move || {
            let url = format!("{}/api/analyze-repository", ctx.base_url);
            let result = post_json::<_, AnalysisAccepted>(&ctx.client, &url, &request);
            ctx.send(ApiOutcome::AnalysisSubmitted { generation, result });
        });
    }
}

fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, ApiError> {
    let response = client.get(url).send().map_err(ApiError::network)?;
    decode(response)
}

fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &B,
) -> Result<T, ApiError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(ApiError::network)?;
    decode(response)
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().map_err(ApiError::network)?;
    if !status.is_success() {
        return Err(ApiError::remote(status.as_u16(), extract_detail(&body)));
    }
    serde_json::from_str(&body).map_err(|e| ApiError::network(format!("malformed response: {e}")))
}

/// Pull the service's `detail` field out of an error body, falling back to
/// the raw body when it isn't the expected JSON shape.
fn extract_detail(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "request failed".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_detail_reads_the_service_field() {
        assert_eq!(
            extract_detail(r#"{"detail": "AI configuration required."}"#),
            "AI configuration required."
        );
    }

    #[test]
    fn extract_detail_falls_back_to_raw_body() {
        assert_eq!(extract_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_detail("  "), "request failed");
    }

    #[test]
    fn extract_detail_caps_runaway_bodies() {
        let body = "x".repeat(500);
        assert_eq!(extract_detail(&body).len(), 200);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let client = ApiClient::new("http://localhost:8001/", Duration::from_secs(1), tx).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8001");
    }
}
