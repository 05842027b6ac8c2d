use config::Settings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing or rejected API credentials (set DEEPSEEK_API_KEY)")]
    Authentication,
    #[error("request to the language model API failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("language model API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("language model API returned a malformed response: {0}")]
    Malformed(String),
    #[error("language model did not produce valid JSON after {attempts} attempts")]
    InvalidJson { attempts: usize },
}

/// Chat capability the extraction pipeline needs: one JSON-producing
/// round-trip per batch. Tests substitute a scripted double.
pub trait JsonChat {
    fn chat_json(
        &self,
        system: &str,
        user: &str,
        max_repairs: usize,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Client for an OpenAI-compatible chat-completions endpoint (DeepSeek).
/// One request per call; network failures surface immediately, no retry.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatClient {
    /// Rejects an empty key up front so a misconfigured run fails before
    /// any network I/O.
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::Authentication);
        }

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_response_tokens,
            temperature: settings.temperature,
            client: reqwest::Client::new(),
        })
    }

    /// One chat round-trip: system + user message in, answer text out.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        debug!(prompt_chars = user.len(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::Authentication);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let chat_response: ChatResponse = response.json().await?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("response carried no choices".to_string()))?;

        Ok(choice.message.content)
    }

    /// Chat expecting a JSON object back. Models occasionally wrap the JSON
    /// in prose or a code fence, so the first balanced object is sliced out
    /// of the reply; if it still does not parse, the model is reprompted to
    /// repair its own output, up to `max_repairs` times.
    pub async fn chat_json(
        &self,
        system: &str,
        user: &str,
        max_repairs: usize,
    ) -> Result<String, LlmError> {
        let mut reply = self.chat(system, user).await?;

        for attempt in 0..=max_repairs {
            if let Some(json) = extract_json_object(&reply) {
                if serde_json::from_str::<serde_json::Value>(json).is_ok() {
                    return Ok(json.to_string());
                }
            }

            if attempt < max_repairs {
                warn!(attempt = attempt + 1, "reply was not valid JSON, reprompting");
                reply = self.chat(system, &prompt::repair_prompt(&reply)).await?;
            }
        }

        Err(LlmError::InvalidJson {
            attempts: max_repairs + 1,
        })
    }
}

impl JsonChat for ChatClient {
    async fn chat_json(
        &self,
        system: &str,
        user: &str,
        max_repairs: usize,
    ) -> Result<String, LlmError> {
        ChatClient::chat_json(self, system, user, max_repairs).await
    }
}

/// Slice the first balanced `{...}` out of a reply, counting brace depth.
/// Good enough for model output that wraps JSON in prose or code fences.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: &str) -> Settings {
        let env = [("DEEPSEEK_API_KEY", api_key)];
        Settings::from_vars(|k| {
            env.iter()
                .find(|(name, _)| *name == k)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn client_rejects_whitespace_key_before_any_io() {
        let mut s = settings("sk-test");
        s.api_key = " ".to_string();
        assert!(matches!(ChatClient::new(&s), Err(LlmError::Authentication)));
    }

    #[test]
    fn slices_json_out_of_fenced_reply() {
        let reply = "Claro, aquí está el resultado:\n```json\n{\"proyectos\": []}\n```";
        assert_eq!(extract_json_object(reply), Some(r#"{"proyectos": []}"#));
    }

    #[test]
    fn slices_nested_objects() {
        let reply = r#"{"a": {"b": 1}, "c": "}"} y un comentario final"#;
        assert_eq!(extract_json_object(reply), Some(r#"{"a": {"b": 1}, "c": "}"}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_object() {
        let reply = r#"{"nombre": "Proyecto {beta}"}"#;
        assert_eq!(extract_json_object(reply), Some(reply));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("no hay JSON aquí"), None);
        assert_eq!(extract_json_object("{ sin cerrar"), None);
    }
}
