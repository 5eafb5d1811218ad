//! Hosted chat model over the `generateContent` REST call

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatCompletion, ChatRole, ChatTurn};
use crate::config::ChatConfig;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    code: Option<i64>,
    message: String,
}

pub struct GeminiChat {
    client: reqwest::Client,
    url: String,
    api_key: String,
    system_instruction: String,
}

impl GeminiChat {
    /// `None` when no API key is configured
    pub fn from_config(config: &ChatConfig) -> StoreResult<Option<Self>> {
        let Some(api_key) = config.api_key.as_ref().filter(|k| !k.trim().is_empty()) else {
            tracing::warn!("Chat relay disabled: no API key configured");
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        tracing::info!(model = %config.model, "Chat relay enabled");

        Ok(Some(Self {
            client,
            url,
            api_key: api_key.clone(),
            system_instruction: config.system_instruction.clone(),
        }))
    }

    fn build_request<'a>(&'a self, message: &'a str, history: &'a [ChatTurn]) -> GenerateRequest<'a> {
        let system_instruction = (!self.system_instruction.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: &self.system_instruction,
            }],
        });

        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|turn| Content {
                role: Some(match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                }),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part { text: message }],
        });

        GenerateRequest {
            system_instruction,
            contents,
        }
    }
}

/// Concatenate the text parts of the first candidate
fn extract_reply(response: GenerateResponse) -> StoreResult<String> {
    if let Some(err) = response.error {
        return Err(StoreError::Upstream(format!(
            "model error {}: {}",
            err.code.unwrap_or_default(),
            err.message
        )));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(StoreError::Upstream("model returned no text".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl ChatCompletion for GeminiChat {
    async fn reply(&self, message: &str, history: &[ChatTurn]) -> StoreResult<String> {
        let request = self.build_request(message, history);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::Upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Upstream(format!("Failed to parse response ({}): {}", status, e)))?;

        let reply = extract_reply(body);
        if let Err(e) = &reply {
            tracing::error!(%status, "Chat relay failed: {}", e);
        }
        reply
    }
}
