//! OpenAI-compatible chat completion client for off-topic fallback answers.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are the PG&E Substation Operations Assistant, designed to help utility workers with substation operations.
Your expertise includes:
- Asset health diagnostics
- Maintenance procedures and work orders
- Inspection reports
- Outage management
- Safety protocols
- Regulatory compliance
- Equipment specifications

Provide concise, accurate information to help utility workers efficiently manage substation operations.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Falls back to OPENAI_API_KEY when unset
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    /// Configured key, ignoring blanks and the placeholder from the sample .env.
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != "YOUR_OPENAI_API_KEY_HERE")
    }

    /// Test keys get canned replies instead of billable calls.
    pub fn is_test_key(&self) -> bool {
        self.key().is_some_and(|k| k.starts_with("sk-test"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

fn request_body<'a>(settings: &'a LlmSettings, system: &str, turns: &[ChatTurn]) -> Req<'a> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn {
        role: "system".to_string(),
        content: system.to_string(),
    });
    messages.extend(turns.iter().cloned());
    Req {
        model: &settings.model,
        messages,
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

pub async fn openai_complete(
    client: &reqwest::Client,
    settings: &LlmSettings,
    system: &str,
    turns: &[ChatTurn],
) -> Result<String> {
    let Some(key) = settings.key() else {
        bail!("missing OpenAI API key; set OPENAI_API_KEY or [llm].api_key");
    };

    let url = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {key}"))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .json(&request_body(settings, system, turns))
        .send()
        .await
        .context("openai request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("openai error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse openai response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    if content.trim().is_empty() {
        bail!("openai returned an empty completion");
    }
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_prepends_system_prompt() {
        let settings = LlmSettings::default();
        let body = serde_json::to_value(request_body(
            &settings,
            SYSTEM_PROMPT,
            &[ChatTurn::user("what is a recloser?")],
        ))
        .unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "what is a recloser?");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_key_handling() {
        let mut s = LlmSettings::default();
        assert_eq!(s.key(), None);
        s.api_key = Some("YOUR_OPENAI_API_KEY_HERE".to_string());
        assert_eq!(s.key(), None);
        s.api_key = Some(" sk-test-123 ".to_string());
        assert_eq!(s.key(), Some("sk-test-123"));
        assert!(s.is_test_key());
        s.api_key = Some("sk-live".to_string());
        assert!(!s.is_test_key());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let err = openai_complete(
            &reqwest::Client::new(),
            &LlmSettings::default(),
            SYSTEM_PROMPT,
            &[ChatTurn::user("hi")],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("missing OpenAI API key"));
    }
}
