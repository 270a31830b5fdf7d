//! `POST /api/chat/query`: rule-based answers with a configurable fallback.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use substation_core::{canned, AnswerSource, Entity, Intent};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::llm::{self, ChatTurn, LlmSettings};
use crate::AppState;

/// What answers a message the rule chain could not place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Keep the scripted off-topic / general text
    None,
    /// Keyword-picked stock replies
    #[default]
    Canned,
    /// OpenAI-compatible chat completion
    OpenAi,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub fallback: FallbackMode,
    pub llm: LlmSettings,
}

pub struct ChatFallback {
    settings: ChatSettings,
    client: reqwest::Client,
}

impl ChatFallback {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Replacement text for `message`, or None when the scripted answer stands.
    pub async fn reply(&self, message: &str) -> Option<String> {
        match self.settings.fallback {
            FallbackMode::None => None,
            FallbackMode::Canned => Some(canned::reply(message).to_string()),
            FallbackMode::OpenAi => {
                let llm = &self.settings.llm;
                if llm.key().is_none() {
                    warn!("openai fallback selected but no API key configured");
                    return None;
                }
                if llm.is_test_key() {
                    info!("test API key; using canned reply");
                    return Some(canned::reply(message).to_string());
                }
                match llm::openai_complete(
                    &self.client,
                    llm,
                    llm::SYSTEM_PROMPT,
                    &[ChatTurn::user(message)],
                )
                .await
                {
                    Ok(text) => Some(text),
                    Err(err) => {
                        error!(error = %err, "llm fallback failed");
                        None
                    }
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub intent: Intent,
    pub entity: Option<Entity>,
    pub source: ReplySource,
}

/// `AnswerSource` plus the fallback responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Dataset,
    Synthetic,
    Scripted,
    Fallback,
}

impl From<AnswerSource> for ReplySource {
    fn from(s: AnswerSource) -> Self {
        match s {
            AnswerSource::Dataset => ReplySource::Dataset,
            AnswerSource::Synthetic => ReplySource::Synthetic,
            AnswerSource::Scripted => ReplySource::Scripted,
        }
    }
}

/// Answer `message` with the assistant, handing unplaced messages to the
/// configured fallback.
pub async fn respond(state: &AppState, message: &str) -> ChatReply {
    let answer = state.assistant.answer(message);
    info!(intent = %answer.intent, entity = ?answer.entity, source = ?answer.source, "classified");

    let needs_fallback = answer.needs_fallback();
    let mut source = ReplySource::from(answer.source);
    let mut response = answer.text;
    if needs_fallback {
        if let Some(text) = state.fallback.reply(message).await {
            response = text;
            source = ReplySource::Fallback;
        }
    }

    ChatReply {
        response,
        intent: answer.intent,
        entity: answer.entity,
        source,
    }
}

/// Any body without a usable message, malformed or not JSON included, gets
/// the same 400.
pub async fn query(
    State(state): State<AppState>,
    body: Result<Json<ChatQuery>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "rejected chat body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadChatRequest("Message is required".to_string())
        }
    })?;
    let message = body
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadChatRequest("Message is required".to_string()))?;

    info!(message = %message, "chat query");
    Ok(Json(respond(&state, &message).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use substation_core::{Assistant, AssistantSettings, Dataset};

    fn state(chat: ChatSettings) -> AppState {
        AppState::new(
            Assistant::new(Dataset::builtin(), AssistantSettings::default()),
            chat,
        )
    }

    fn openai_without_key() -> ChatSettings {
        ChatSettings {
            fallback: FallbackMode::OpenAi,
            llm: LlmSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_fallback_modes() {
        let none = ChatFallback::new(ChatSettings {
            fallback: FallbackMode::None,
            ..ChatSettings::default()
        });
        assert_eq!(none.reply("tell me a joke").await, None);

        let canned_mode = ChatFallback::new(ChatSettings::default());
        assert_eq!(
            canned_mode.reply("any audit news?").await.as_deref(),
            Some(canned::INSPECTIONS)
        );
    }

    #[tokio::test]
    async fn test_openai_without_key_gives_nothing() {
        let f = ChatFallback::new(openai_without_key());
        assert_eq!(f.reply("tell me a joke").await, None);
    }

    #[tokio::test]
    async fn test_openai_test_key_uses_canned() {
        let f = ChatFallback::new(ChatSettings {
            fallback: FallbackMode::OpenAi,
            llm: LlmSettings {
                api_key: Some("sk-test-abc".to_string()),
                ..LlmSettings::default()
            },
        });
        assert_eq!(f.reply("hey").await.as_deref(), Some(canned::GREETING));
    }

    #[tokio::test]
    async fn test_unanswered_fallback_stays_scripted() {
        let reply = respond(&state(openai_without_key()), "Will it rain tomorrow?").await;
        assert_eq!(reply.intent, Intent::OffTopic);
        assert_eq!(reply.source, ReplySource::Scripted);
        assert_eq!(reply.response, substation_core::respond::OFF_TOPIC_MESSAGE);
        assert_eq!(serde_json::to_value(&reply).unwrap()["source"], "scripted");
    }

    #[tokio::test]
    async fn test_canned_fallback_is_labelled() {
        let reply = respond(&state(ChatSettings::default()), "Will it rain tomorrow?").await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(reply.response, canned::DEFAULT);
    }

    #[tokio::test]
    async fn test_dataset_answers_skip_fallback() {
        let reply = respond(
            &state(ChatSettings::default()),
            "What is the health status of transformer T-123?",
        )
        .await;
        assert_eq!(reply.source, ReplySource::Dataset);
    }

    #[test]
    fn test_fallback_mode_names() {
        let v: FallbackMode = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(v, FallbackMode::OpenAi);
        assert_eq!(serde_json::to_string(&FallbackMode::Canned).unwrap(), "\"canned\"");
    }
}
