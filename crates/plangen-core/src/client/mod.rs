//! Generation client: the two calls made to the external model.
//!
//! # Architecture
//!
//! ```text
//! LessonPlanClient { credential, settings }
//!     |
//!     |  extract_standards(file)      generate_lesson_plan(form)
//!     |        |                              |
//!     |        v                              v
//!     |  StructuredRequest { model, prompt, attachment, schema, temperature }
//!     |        |
//!     v        v
//! dyn CompletionBackend --complete(api_key, request)--> JSON text
//!                                                        |
//!                                   parse + assemble <---+
//! ```
//!
//! The credential is checked before a request is built, so a missing key
//! never reaches the backend.

pub mod backend;
pub mod gemini;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::document::{self, DailyPlanEntry, LessonPlanDocument};
use crate::form::{Attachment, ExtractedStandards, FormInput};
use crate::prompt;

pub use backend::{CompletionBackend, StructuredRequest};
pub use gemini::GeminiBackend;

/// Message shown to users for any failed call.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to generate lesson plan. Please check your API key and try again.";

/// Errors from a generation or extraction call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API key is missing")]
    MissingCredential,

    #[error("request to {backend} failed: {message}")]
    Transport { backend: String, message: String },

    #[error("{backend} returned HTTP {status}: {body}")]
    Service {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("no response from the model")]
    EmptyReply,

    #[error("model reply is not valid JSON: {0}")]
    InvalidReply(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the call was refused locally for lack of an API key.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, ClientError::MissingCredential)
    }

    /// Text suitable for a user-facing banner.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The service API key, resolved once at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_missing(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            f.write_str("Credential(<missing>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Model selection and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
}

impl GenerationSettings {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_TEMPERATURE: f32 = 0.5;
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Generation reply. Only `days` is read; anything else the model returns
/// is ignored.
#[derive(Debug, Deserialize)]
struct GenerationReply {
    #[serde(default)]
    days: Vec<DailyPlanEntry>,
}

/// Issues extraction and generation calls through a backend.
#[derive(Clone)]
pub struct LessonPlanClient {
    credential: Credential,
    settings: GenerationSettings,
    backend: Arc<dyn CompletionBackend>,
}

impl LessonPlanClient {
    pub fn new(
        credential: Credential,
        settings: GenerationSettings,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            credential,
            settings,
            backend,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Pull content/performance/competency standards out of an exemplar.
    pub async fn extract_standards(
        &self,
        file: &Attachment,
    ) -> Result<ExtractedStandards, ClientError> {
        let api_key = self.api_key()?;
        let request = prompt::build_extraction_request(file, &self.settings.model);
        tracing::info!(
            backend = self.backend.name(),
            mime_type = %file.mime_type,
            bytes = file.data.len(),
            "extracting standards from exemplar"
        );

        let result = self
            .complete(api_key, &request)
            .await
            .and_then(|text| Ok(serde_json::from_str::<ExtractedStandards>(&text)?));
        if let Err(e) = &result {
            tracing::error!(error = %e, "error extracting standards");
        }
        result
    }

    /// Generate the five daily plans and assemble them with the form's
    /// own metadata and standards.
    pub async fn generate_lesson_plan(
        &self,
        form: &FormInput,
    ) -> Result<LessonPlanDocument, ClientError> {
        let api_key = self.api_key()?;
        let request = prompt::build_generation_request(
            form,
            &self.settings.model,
            Some(self.settings.temperature),
        );
        tracing::info!(
            backend = self.backend.name(),
            model = %self.settings.model,
            subject = %form.subject,
            exemplar = form.exemplar.is_some(),
            "generating lesson plan"
        );

        let result = self
            .complete(api_key, &request)
            .await
            .and_then(|text| Ok(serde_json::from_str::<GenerationReply>(&text)?));
        match result {
            Ok(reply) => {
                if reply.days.len() != 5 {
                    tracing::warn!(days = reply.days.len(), "model returned unexpected day count");
                }
                Ok(document::assemble(form, reply.days))
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating lesson plan");
                Err(e)
            }
        }
    }

    fn api_key(&self) -> Result<&str, ClientError> {
        if self.credential.is_missing() {
            tracing::error!("API key is missing; refusing to call {}", self.backend.name());
            return Err(ClientError::MissingCredential);
        }
        Ok(self.credential.expose())
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &StructuredRequest,
    ) -> Result<String, ClientError> {
        let text = self.backend.complete(api_key, request).await?;
        if text.trim().is_empty() {
            return Err(ClientError::EmptyReply);
        }
        Ok(text)
    }
}
