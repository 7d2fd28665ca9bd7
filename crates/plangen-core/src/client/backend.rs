//! The `CompletionBackend` trait -- the seam to the external model service.
//!
//! The trait is object-safe so a [`super::LessonPlanClient`] can hold an
//! `Arc<dyn CompletionBackend>` and tests can substitute a canned backend.

use async_trait::async_trait;
use serde_json::Value;

use super::ClientError;
use crate::form::Attachment;

/// One schema-constrained completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// Model identifier (e.g. `gemini-2.5-flash`).
    pub model: String,
    /// Instruction text.
    pub prompt: String,
    /// Binary part sent ahead of the instruction text.
    pub attachment: Option<Attachment>,
    /// Shape the reply must conform to.
    pub response_schema: Value,
    /// Sampling temperature; `None` leaves the service default.
    pub temperature: Option<f32>,
}

/// Adapter interface for a structured-output model service.
///
/// Implementors make exactly one outbound call per `complete` and return
/// the reply text unparsed. No retries, caching or timeouts.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human-readable backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Send `request` authenticated with `api_key` and return the reply's
    /// JSON text (possibly empty).
    async fn complete(&self, api_key: &str, request: &StructuredRequest)
    -> Result<String, ClientError>;
}

// Compile-time assertion: CompletionBackend must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionBackend) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the prompt back, used only to prove the trait is usable as
    /// `dyn CompletionBackend`.
    struct EchoBackend;

    #[async_trait]
    impl CompletionBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            _api_key: &str,
            request: &StructuredRequest,
        ) -> Result<String, ClientError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn backend_is_object_safe() {
        let backend: Box<dyn CompletionBackend> = Box::new(EchoBackend);
        assert_eq!(backend.name(), "echo");
        let req = StructuredRequest {
            model: "m".to_string(),
            prompt: "hello".to_string(),
            attachment: None,
            response_schema: Value::Null,
            temperature: None,
        };
        assert_eq!(backend.complete("k", &req).await.unwrap(), "hello");
    }
}
