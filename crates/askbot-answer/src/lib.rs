//! Answer service adapter.
//!
//! Calls an OpenAI-compatible `chat/completions` endpoint once per prompt.
//! No streaming, no retry, no client-side timeout.

use async_trait::async_trait;
use serde_json::{json, Value};

use askbot_core::{answer::AnswerService, config::Config, errors::Error, Result};

#[derive(Clone, Debug)]
pub struct ChatCompletionsConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: Option<String>,
}

impl From<&Config> for ChatCompletionsConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            endpoint: cfg.answer_api_url.clone(),
            api_key: cfg.answer_api_key.clone(),
            model: cfg.answer_model.clone(),
            system_prompt: cfg.answer_system_prompt.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    cfg: ChatCompletionsConfig,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(cfg: ChatCompletionsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("answer http client build failed: {e}")))?;
        Ok(Self { cfg, http })
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut messages = Vec::new();
        if let Some(sys) = &self.cfg.system_prompt {
            messages.push(json!({ "role": "system", "content": sys }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.cfg.model,
            "messages": messages,
        })
    }
}

#[async_trait]
impl AnswerService for ChatCompletionsClient {
    async fn generate_answer(&self, prompt: &str) -> Result<String> {
        let mut req = self
            .http
            .post(&self.cfg.endpoint)
            .json(&self.request_body(prompt));
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("answer request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ExternalService(format!(
                "answer request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: Value = resp
            .json()
            .await
            .map_err(|e| Error::ExternalService(format!("answer json error: {e}")))?;

        let answer = extract_answer(&v).ok_or_else(|| {
            Error::ExternalService("answer service returned no content".to_string())
        })?;
        tracing::debug!(answer_len = answer.len(), "answer received");
        Ok(answer)
    }
}

/// First choice's message content, if present and not blank.
fn extract_answer(v: &Value) -> Option<String> {
    v.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
