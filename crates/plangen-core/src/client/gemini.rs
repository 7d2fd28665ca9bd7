//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ClientError;
use super::backend::{CompletionBackend, StructuredRequest};

const NAME: &str = "gemini";

/// HTTP backend for the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiBackend {
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Endpoint for a model's `generateContent` method.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for GeminiBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: String,
    },
    Text(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Build the JSON body for a request. The attachment part, when present,
/// precedes the text part.
fn request_body(request: &StructuredRequest) -> GenerateContentRequest<'_> {
    let mut parts = Vec::with_capacity(2);
    if let Some(att) = &request.attachment {
        parts.push(Part::InlineData {
            mime_type: &att.mime_type,
            data: att.to_base64(),
        });
    }
    parts.push(Part::Text(&request.prompt));

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
            temperature: request.temperature,
        },
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport {
        backend: NAME.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &StructuredRequest,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(&request.model);
        tracing::debug!(%url, attachment = request.attachment.is_some(), "sending generateContent");

        let res = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(transport)?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Service {
                backend: NAME.to_string(),
                status,
                body,
            });
        }

        let reply: GenerateContentResponse = res.json().await.map_err(transport)?;
        let text = reply.text();
        tracing::debug!(chars = text.len(), "received generateContent reply");
        Ok(text)
    }
}
