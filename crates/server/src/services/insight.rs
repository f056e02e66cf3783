use std::time::Duration;

use axum::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

pub const FALLBACK_INSIGHT: &str = "AI insight is temporarily unavailable.";
pub const EMPTY_INSIGHT: &str = "No AI insight available yet.";

const SYSTEM_PROMPT: &str = "You are a professional technology critic who is good at spotting \
     the highlights and innovations of a project.";

#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn project_insight(
        &self,
        title: &str,
        background_story: &str,
        short_description: &str,
    ) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream returned no choices")]
    EmptyResponse,

    #[error("no API key configured")]
    MissingApiKey,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn user_prompt(title: &str, background_story: &str, short_description: &str) -> String {
    format!(
        "You are a seasoned developer and critic. Based on the project below, write a short, \
         engaging \"AI perspective\" review that highlights what is innovative about it.\n\n\
         Project name: {title}\n\
         Background: {background_story}\n\
         Features: {short_description}\n\n\
         Keep it under 100 words, professional and compelling."
    )
}

pub struct DeepSeekInsights {
    client: Client,
    config: AiConfig,
}

impl DeepSeekInsights {
    pub fn new(config: &AiConfig) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn request_insight(
        &self,
        title: &str,
        background_story: &str,
        short_description: &str,
    ) -> Result<String, InsightError> {
        if self.config.api_key.is_empty() {
            return Err(InsightError::MissingApiKey);
        }

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(title, background_story, short_description),
                },
            ],
            max_tokens: 200,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(InsightError::EmptyResponse)?;

        Ok(choice
            .message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_INSIGHT.to_string()))
    }
}

#[async_trait]
impl InsightGenerator for DeepSeekInsights {
    async fn project_insight(
        &self,
        title: &str,
        background_story: &str,
        short_description: &str,
    ) -> String {
        match self
            .request_insight(title, background_story, short_description)
            .await
        {
            Ok(insight) => insight,
            Err(e) => {
                tracing::warn!(error = %e, %title, "AI insight generation failed");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }
}
