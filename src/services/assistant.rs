//! AI support assistant: a thin client for the Gemini `generateContent` API
//! plus the conversation normalization the chat session requires. The client
//! is built once at startup and shared through `AppState`.

use serde::{Deserialize, Serialize};

use crate::config::Config;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_OUTPUT_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Shown to the user when the provider call fails; the real error is logged.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

/// Fixed per-session instruction. Configured once here, never per request.
const SYSTEM_INSTRUCTION: &str = "\
You are an AI mental-wellness support assistant embedded in a private journaling application.

Your role: provide empathetic, calm, non-judgmental support; encourage emotional reflection \
and journaling; help users explore thoughts and feelings safely; suggest healthy coping and \
grounding techniques.

You are not a therapist, psychologist, or medical professional, and you never present \
yourself as one.

Style: warm, supportive, minimalist and clear. Respectful and non-assumptive. Avoid absolute \
statements and clinical language.

If a user implies self-harm or suicide: respond with empathy and seriousness, state that you \
cannot help with harming themselves, and encourage reaching out to professional or crisis \
support. Keep language calm and non-alarmist.";

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Assistant API key not configured")]
    MissingApiKey,

    #[error("No user message found in conversation")]
    NoUserMessage,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Assistant API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Assistant returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One turn of the incoming conversation. Turns missing either field are
/// dropped during normalization rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: Option<ChatRole>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct Part {
    text: String,
}

#[derive(Debug)]
struct PreparedConversation {
    history: Vec<Content>,
    current_input: String,
}

/// Normalize a conversation into the shape the chat session expects:
/// provider role names, no leading model turns, and the final turn split off
/// as the current input.
fn prepare_conversation(turns: &[ChatTurn]) -> Result<PreparedConversation, AssistantError> {
    let mut history: Vec<Content> = turns
        .iter()
        .filter_map(|t| match (t.role, &t.content) {
            (Some(role), Some(content)) => Some(Content {
                role: match role {
                    ChatRole::Assistant => "model",
                    // System turns get no dedicated channel; the session
                    // instruction is fixed above.
                    ChatRole::User | ChatRole::System => "user",
                },
                parts: vec![Part {
                    text: content.clone(),
                }],
            }),
            _ => None,
        })
        .collect();

    // The session requires history to start with a user turn.
    let leading_model_turns = history.iter().take_while(|c| c.role == "model").count();
    history.drain(..leading_model_turns);

    let current = history.pop().ok_or(AssistantError::NoUserMessage)?;
    let current_input = current.parts.into_iter().map(|p| p.text).collect();

    Ok(PreparedConversation {
        history,
        current_input,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Process-wide Gemini client: immutable key, model id and system
/// instruction, one HTTP connection pool.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AssistantClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    /// Send a conversation to the model and return the reply text. A failure
    /// is reported once; there are no automatic retries.
    pub async fn generate(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
        if self.api_key.is_empty() {
            return Err(AssistantError::MissingApiKey);
        }

        let prepared = prepare_conversation(turns)?;

        let mut contents = prepared.history;
        contents.push(Content {
            role: "user",
            parts: vec![Part {
                text: prepared.current_input,
            }],
        });

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                system_instruction: SystemInstruction {
                    parts: vec![Part {
                        text: SYSTEM_INSTRUCTION.to_string(),
                    }],
                },
                contents,
                generation_config: GenerationConfig {
                    max_output_tokens: MAX_OUTPUT_TOKENS,
                    temperature: TEMPERATURE,
                },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        reply.text().ok_or(AssistantError::EmptyContent)
    }
}
