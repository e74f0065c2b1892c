//! Script generation via the Aliyun Bailian (DashScope) completion API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::WeibocastConfig;
use crate::error::{Result, WeibocastError};
use crate::script::outline::{extract_outline, ScriptOutline};

const DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";

/// Collaborator that turns scraped source text into a podcast script.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    async fn generate_script(&self, source_text: &str) -> Result<ScriptOutline>;
}

#[derive(Debug, Deserialize)]
struct CompletionOutput {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    output: Option<CompletionOutput>,
    #[serde(default)]
    request_id: Option<String>,
}

/// DashScope-backed script generator.
///
/// The Bailian application carries the podcast prompt; the request only
/// needs to supply the source text.
pub struct ScriptGenerator {
    client: Client,
    api_key: String,
    app_id: String,
    max_prompt_chars: usize,
}

impl ScriptGenerator {
    pub fn new(config: &WeibocastConfig) -> Result<Self> {
        if config.dashscope_api_key.trim().is_empty() || config.bailian_app_id.trim().is_empty() {
            return Err(WeibocastError::Configuration(
                "DashScope API key and Bailian app id are required for script generation"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.dashscope_api_key.trim().to_string(),
            app_id: config.bailian_app_id.trim().to_string(),
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    fn truncate_prompt(&self, source_text: &str) -> String {
        source_text.chars().take(self.max_prompt_chars).collect()
    }
}

#[async_trait]
impl ScriptSource for ScriptGenerator {
    async fn generate_script(&self, source_text: &str) -> Result<ScriptOutline> {
        let url = format!("{}/apps/{}/completion", DASHSCOPE_BASE_URL, self.app_id);
        let prompt = self.truncate_prompt(source_text);

        log::info!("Requesting podcast script from Bailian app {}", self.app_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "input": { "prompt": prompt },
                "parameters": {},
                "debug": {}
            }))
            .send()
            .await
            .map_err(|e| WeibocastError::ScriptGeneration(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WeibocastError::ScriptGeneration(format!(
                "Bailian API error (status {}): {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| WeibocastError::ScriptGeneration(format!("Invalid response: {}", e)))?;

        if let Some(request_id) = &completion.request_id {
            log::debug!("Bailian request id: {}", request_id);
        }

        let text = completion
            .output
            .and_then(|o| o.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                WeibocastError::ScriptGeneration("Bailian response missing output text".to_string())
            })?;

        Ok(extract_outline(&text))
    }
}
