//! Shared test fixtures for plangen integration tests.
//!
//! Provides a filled-in sample form, canned model replies in the wire
//! format, and a [`MockBackend`] that records every request it receives
//! instead of calling the network.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use plangen_core::client::{
    ClientError, CompletionBackend, Credential, GenerationSettings, LessonPlanClient,
    StructuredRequest,
};
use plangen_core::form::{Day, FormInput, GeneralField, Signatory, SignatoryRole, StandardField};
use plangen_core::schema;

/// Topics used by [`sample_form`], one per day.
pub const SAMPLE_TOPICS: [&str; 5] = [
    "Photosynthesis",
    "Cellular Respiration",
    "Food Chains",
    "Food Webs",
    "Energy Pyramids",
];

/// A complete form with every required field set and the approver filled.
pub fn sample_form() -> FormInput {
    let mut form = FormInput::default();
    form.set_general(GeneralField::School, "Ramon Magsaysay High School");
    form.set_general(GeneralField::Teacher, "Ana Cruz");
    form.set_general(GeneralField::Subject, "Science");
    form.set_general(GeneralField::GradeLevel, "Grade 8");
    form.set_general(GeneralField::Quarter, "Third Quarter");
    form.set_general(GeneralField::Dates, "December 1 - 5, 2025");
    form.set_standard(
        StandardField::Content,
        "The learners demonstrate understanding of energy flow in ecosystems.",
    );
    form.set_standard(
        StandardField::Performance,
        "The learners design a model of an energy pyramid.",
    );
    form.set_standard(
        StandardField::Competency,
        "Explain how energy is transferred between organisms.",
    );
    for (day, topic) in Day::ALL.into_iter().zip(SAMPLE_TOPICS) {
        form.set_topic(day, topic);
    }
    form.specific_needs = "Include group work.".to_string();
    form.set_signatory(
        SignatoryRole::Approver,
        Signatory::new("Jose Matriano", "Principal IV"),
    );
    form
}

/// One day of a model reply, in the wire format.
pub fn sample_day(n: u32) -> Value {
    let topic = SAMPLE_TOPICS
        .get((n as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("Review");
    json!({
        "dayNumber": n,
        "topic": topic,
        "objectives": [
            format!("Describe {topic}"),
            format!("Illustrate {topic}"),
            format!("Appreciate {topic}")
        ],
        "idfFeatures": "Inquiry-based learning",
        "skills21st": "Collaboration",
        "resources": {
            "references": format!("Science 8 LM p.{}", 100 + n),
            "otherResources": "Video clip"
        },
        "procedures": {
            "activatingPriorKnowledge": "Recall previous lesson",
            "lessonPurpose": format!("Introduce {topic}"),
            "lessonLanguagePractice": "Vocabulary drill",
            "readingKeyIdea": "Read the key idea",
            "developingUnderstanding": "Group activity",
            "deepeningUnderstanding": "Discussion",
            "makingGeneralizations": "Summarize",
            "evaluatingLearning": "Five-item quiz",
            "additionalActivities": "Homework"
        },
        "remarks": "",
        "reflection": ""
    })
}

/// A generation reply carrying days `1..=n`.
pub fn sample_reply(n: u32) -> Value {
    json!({ "days": (1..=n).map(sample_day).collect::<Vec<_>>() })
}

/// [`sample_reply`] serialized as reply text.
pub fn sample_reply_json(n: u32) -> String {
    sample_reply(n).to_string()
}

/// A reply that also tries to smuggle in header metadata and standards.
pub fn reply_with_injected_meta(n: u32) -> String {
    let mut reply = sample_reply(n);
    reply["meta"] = json!({ "school": "Injected School", "subject": "Injected" });
    reply["standards"] = json!({ "contentStandard": "Injected standard" });
    reply.to_string()
}

/// An extraction reply in the wire format.
pub fn sample_extraction_json() -> String {
    json!({
        "contentStandard": "Extracted content standard",
        "performanceStandard": "Extracted performance standard",
        "learningCompetency": ""
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

/// Canned outcome for a mock call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Service { status: u16, body: String },
}

impl MockReply {
    fn to_result(&self, backend: &str) -> Result<String, ClientError> {
        match self {
            MockReply::Text(t) => Ok(t.clone()),
            MockReply::Service { status, body } => Err(ClientError::Service {
                backend: backend.to_string(),
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// A [`CompletionBackend`] that answers from memory.
///
/// Requests carrying the extraction schema get the extraction reply; all
/// others get the generation reply.
#[derive(Debug)]
pub struct MockBackend {
    generation: MockReply,
    extraction: MockReply,
    requests: Mutex<Vec<(String, StructuredRequest)>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            generation: MockReply::Text(sample_reply_json(5)),
            extraction: MockReply::Text(sample_extraction_json()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generation(mut self, reply: MockReply) -> Self {
        self.generation = reply;
        self
    }

    pub fn with_extraction(mut self, reply: MockReply) -> Self {
        self.extraction = reply;
        self
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// API keys presented with each request, in order.
    pub fn api_keys(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &StructuredRequest,
    ) -> Result<String, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        if request.response_schema == schema::extraction_schema() {
            self.extraction.to_result(self.name())
        } else {
            self.generation.to_result(self.name())
        }
    }
}

/// A client over `backend` with the given key and default settings.
pub fn mock_client(api_key: &str, backend: Arc<MockBackend>) -> LessonPlanClient {
    LessonPlanClient::new(
        Credential::new(api_key),
        GenerationSettings::default(),
        backend,
    )
}
