//! Responder backed by the Gemini `generateContent` endpoint
//!
//! One request per turn: the system instruction, the prior turns, the new
//! prompt and (optionally) the web-search grounding tool. Grounding chunks in
//! the answer become a "Sources" section.

use super::config::LLMConfig;
use super::prompts::build_system_instruction;
use super::responder::{classify_failure, Responder};
use super::sources::{append_sources, GroundingSource};
use crate::credentials::Credential;
use crate::messages::{Role, Turn};
use crate::{JugalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Returned when the model answers with no text at all
pub const EMPTY_RESPONSE_TEXT: &str = "I'm sorry, I couldn't generate a response.";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

fn text_content(role: Option<&'static str>, text: impl Into<String>) -> Content {
    Content {
        role,
        parts: vec![Part { text: text.into() }],
    }
}

fn build_request(
    config: &LLMConfig,
    system_instruction: &str,
    prompt: &str,
    history: &[Turn],
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| text_content(Some(turn.role.as_api_str()), turn.text.clone()))
        .collect();
    contents.push(text_content(Some(Role::User.as_api_str()), prompt));

    let tools = if config.enable_search {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        system_instruction: text_content(None, system_instruction),
        contents,
        tools,
    }
}

/// Turn a successful response body into the final answer text
fn parse_response(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| JugalError::RequestFailed(format!("Malformed response: {}", e)))?;

    let Some(candidate) = response.candidates.first() else {
        return Ok(EMPTY_RESPONSE_TEXT.to_string());
    };

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter(|p| !p.thought)
        .filter_map(|p| p.text.as_deref())
        .collect();

    let mut text = if text.is_empty() {
        EMPTY_RESPONSE_TEXT.to_string()
    } else {
        text
    };

    let sources: Vec<GroundingSource> = candidate
        .grounding_metadata
        .iter()
        .flat_map(|m| m.grounding_chunks.iter())
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| match (&web.uri, &web.title) {
            (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                Some(GroundingSource::new(uri.clone(), title.clone()))
            }
            _ => None,
        })
        .collect();
    append_sources(&mut text, &sources);

    Ok(text)
}

/// Turn an error response into a classified failure
fn parse_error(status: u16, body: &str) -> JugalError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let api = envelope.error;
            let message = match api.status {
                Some(s) => format!("{} ({})", api.message, s),
                None => api.message,
            };
            classify_failure(api.code.or(Some(status)), &message)
        }
        Err(_) => classify_failure(Some(status), &format!("HTTP {}: {}", status, body)),
    }
}

pub struct GeminiResponder {
    config: LLMConfig,
    system_instruction: String,
    client: Client,
}

impl GeminiResponder {
    pub fn new(config: LLMConfig) -> Self {
        let system_instruction = config
            .system_instruction
            .clone()
            .unwrap_or_else(|| build_system_instruction(None));

        Self {
            config,
            system_instruction,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn generate(
        &self,
        credential: &Credential,
        prompt: &str,
        history: &[Turn],
    ) -> Result<String> {
        let request = build_request(&self.config, &self.system_instruction, prompt, history);
        debug!(
            "Sending prompt to {} with {} prior turns",
            self.config.model,
            history.len()
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini request failed: {}", e);
                classify_failure(e.status().map(|s| s.as_u16()), &e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read Gemini response: {}", e);
            JugalError::RequestFailed(e.to_string())
        })?;

        if !status.is_success() {
            let err = parse_error(status.as_u16(), &body);
            error!("Gemini API error: {}", err);
            return Err(err);
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let history = vec![
            Turn::new(Role::User, "Hi"),
            Turn::new(Role::Assistant, "Hello!"),
        ];
        let request = build_request(&LLMConfig::default(), "Be nice.", "What is Rust?", &history);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be nice.");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "What is Rust?");
        assert!(json["tools"][0]["googleSearch"].is_object());
    }

    #[test]
    fn test_search_tool_can_be_disabled() {
        let config = LLMConfig::default().with_search(false);
        let request = build_request(&config, "sys", "prompt", &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_parse_plain_answer() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}],"role":"model"}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Hello world");
    }

    #[test]
    fn test_parse_skips_thoughts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"thinking...","thought":true},{"text":"Answer"}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Answer");
    }

    #[test]
    fn test_parse_appends_sources() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Kathmandu is the capital."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "a", "title": "A"}},
                        {"web": {"uri": "b", "title": "B"}},
                        {"web": {"uri": "a", "title": "A-dup"}},
                        {"web": {"uri": "c"}}
                    ]
                }
            }]
        }"#;

        assert_eq!(
            parse_response(body).unwrap(),
            "Kathmandu is the capital.\n\n**Sources:**\n- [A](a)\n- [B](b)\n"
        );
    }

    #[test]
    fn test_parse_empty_answer() {
        assert_eq!(parse_response(r#"{"candidates":[]}"#).unwrap(), EMPTY_RESPONSE_TEXT);
        assert_eq!(parse_response("{}").unwrap(), EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_response("<html>"),
            Err(JugalError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_quota_error_body() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(parse_error(429, body), JugalError::QuotaExceeded);
    }

    #[test]
    fn test_other_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(parse_error(400, body), JugalError::RequestFailed(_)));
    }

    #[test]
    fn test_unstructured_error_body() {
        assert!(matches!(
            parse_error(503, "Service Unavailable"),
            JugalError::RequestFailed(_)
        ));
        assert_eq!(parse_error(429, "Too Many Requests"), JugalError::QuotaExceeded);
    }

    #[test]
    fn test_custom_instruction_overrides_default() {
        let responder =
            GeminiResponder::new(LLMConfig::default().with_system_instruction("Only haiku."));
        assert_eq!(responder.system_instruction, "Only haiku.");
    }
}
