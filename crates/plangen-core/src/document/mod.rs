//! Lesson-plan document model and assembly.
//!
//! The generated reply only contributes [`DailyPlanEntry`] values; header
//! metadata and standards always come from the user's form, copied
//! verbatim by [`assemble`].

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::form::{FormInput, Signatory};

/// One school day's generated content.
///
/// Fields missing from a reply deserialize to empty values, so a
/// non-conforming model answer renders as blank cells instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyPlanEntry {
    #[serde(deserialize_with = "lenient_day_number")]
    pub day_number: u32,
    pub topic: String,
    /// Cognitive, psychomotor and affective objectives, in that order.
    pub objectives: Vec<String>,
    pub idf_features: String,
    #[serde(rename = "skills21st")]
    pub skills_21st: String,
    pub resources: Resources,
    pub procedures: Procedures,
    pub remarks: String,
    pub reflection: String,
}

/// Learning resources for a day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    pub references: String,
    pub other_resources: String,
}

/// The nine teaching and learning procedure phases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Procedures {
    // Before/pre-lesson proper
    pub activating_prior_knowledge: String,
    pub lesson_purpose: String,
    pub lesson_language_practice: String,
    // Lesson proper
    pub reading_key_idea: String,
    pub developing_understanding: String,
    pub deepening_understanding: String,
    // After/post-lesson proper
    pub making_generalizations: String,
    pub evaluating_learning: String,
    pub additional_activities: String,
}

/// A lesson stage grouping three procedure phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStage {
    PreLesson,
    LessonProper,
    PostLesson,
}

impl LessonStage {
    pub const ALL: [LessonStage; 3] = [
        LessonStage::PreLesson,
        LessonStage::LessonProper,
        LessonStage::PostLesson,
    ];

    pub fn title(self) -> &'static str {
        match self {
            LessonStage::PreLesson => "Before/Pre-Lesson Proper",
            LessonStage::LessonProper => "Lesson Proper",
            LessonStage::PostLesson => "After/Post-Lesson Proper",
        }
    }
}

/// Accessor for one procedure phase: row label plus field getter.
pub struct Phase {
    pub label: &'static str,
    pub prompt_label: &'static str,
    pub get: fn(&Procedures) -> &str,
}

impl Procedures {
    /// The three phases of a stage, in teaching order.
    pub fn phases(stage: LessonStage) -> [Phase; 3] {
        match stage {
            LessonStage::PreLesson => [
                Phase {
                    label: "Activating Prior Knowledge",
                    prompt_label: "Activating Prior Knowledge",
                    get: |p| p.activating_prior_knowledge.as_str(),
                },
                Phase {
                    label: "Lesson Purpose/Intention",
                    prompt_label: "Lesson Purpose/Intention",
                    get: |p| p.lesson_purpose.as_str(),
                },
                Phase {
                    label: "Lesson Language Practice",
                    prompt_label: "Lesson Language Practice",
                    get: |p| p.lesson_language_practice.as_str(),
                },
            ],
            LessonStage::LessonProper => [
                Phase {
                    label: "Reading the Key Idea/Stem",
                    prompt_label: "Reading the Key Idea/Stem",
                    get: |p| p.reading_key_idea.as_str(),
                },
                Phase {
                    label: "Developing Understanding",
                    prompt_label: "Developing Understanding of the Key Idea/Stem",
                    get: |p| p.developing_understanding.as_str(),
                },
                Phase {
                    label: "Deepening Understanding",
                    prompt_label: "Deepening Understanding of the Key Idea/Stem",
                    get: |p| p.deepening_understanding.as_str(),
                },
            ],
            LessonStage::PostLesson => [
                Phase {
                    label: "Making Generalizations",
                    prompt_label: "Making Generalizations and Abstractions",
                    get: |p| p.making_generalizations.as_str(),
                },
                Phase {
                    label: "Evaluating Learning",
                    prompt_label: "Evaluating Learning",
                    get: |p| p.evaluating_learning.as_str(),
                },
                Phase {
                    label: "Additional Activities",
                    prompt_label: "Additional Activities for Application or Remediation",
                    get: |p| p.additional_activities.as_str(),
                },
            ],
        }
    }
}

/// Header metadata copied from the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonMeta {
    pub school: String,
    pub teacher: String,
    pub teacher_position: String,
    pub subject: String,
    pub grade_level: String,
    pub quarter: String,
    pub dates: String,
    pub checker_name: String,
    pub checker_position: String,
    pub approver_name: String,
    pub approver_position: String,
    pub noter_name: String,
    pub noter_position: String,
}

impl LessonMeta {
    pub fn checker(&self) -> Signatory {
        Signatory::new(&self.checker_name, &self.checker_position)
    }

    pub fn noter(&self) -> Signatory {
        Signatory::new(&self.noter_name, &self.noter_position)
    }

    pub fn approver(&self) -> Signatory {
        Signatory::new(&self.approver_name, &self.approver_position)
    }
}

/// Weekly standards copied from the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Standards {
    pub content_standard: String,
    pub performance_standard: String,
    pub learning_competency: String,
}

/// A complete weekly lesson log ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonPlanDocument {
    pub meta: LessonMeta,
    pub standards: Standards,
    pub days: Vec<DailyPlanEntry>,
}

/// Errors from reading a saved document.
#[derive(Debug, Error)]
pub enum DocumentParseError {
    #[error("document JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LessonPlanDocument {
    /// Parse a document previously written with [`LessonPlanDocument::to_json`].
    pub fn from_json(content: &str) -> Result<Self, DocumentParseError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Pretty-printed JSON with the same camelCase keys as the model reply.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which cannot happen for a document
    /// made of strings, numbers and vectors.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("lesson plan document always serializes")
    }
}

/// Merge form metadata and generated days into one document.
///
/// `days` is passed through untouched: no reordering, padding or
/// truncation happens here.
pub fn assemble(form: &FormInput, days: Vec<DailyPlanEntry>) -> LessonPlanDocument {
    LessonPlanDocument {
        meta: LessonMeta {
            school: form.school.clone(),
            teacher: form.teacher.clone(),
            teacher_position: form.teacher_position.clone(),
            subject: form.subject.clone(),
            grade_level: form.grade_level.clone(),
            quarter: form.quarter.clone(),
            dates: form.dates.clone(),
            checker_name: form.checker.name.clone(),
            checker_position: form.checker.position.clone(),
            approver_name: form.approver.name.clone(),
            approver_position: form.approver.position.clone(),
            noter_name: form.noter.name.clone(),
            noter_position: form.noter.position.clone(),
        },
        standards: Standards {
            content_standard: form.content_standard.clone(),
            performance_standard: form.performance_standard.clone(),
            learning_competency: form.learning_competency.clone(),
        },
        days,
    }
}

fn lenient_day_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(number.and_then(|n| u32::try_from(n).ok()).unwrap_or_else(|| {
        tracing::warn!(%value, "unreadable day number, using 0");
        0
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Day, GeneralField, SignatoryRole, FormField};

    fn form() -> FormInput {
        let mut f = FormInput::default();
        f.set_general(GeneralField::School, "Rizal High");
        f.set_general(GeneralField::Subject, "Science");
        f.set_topic(Day::One, "Photosynthesis");
        f.set(FormField::SignatoryName(SignatoryRole::Approver), "J. Matriano");
        f.set(FormField::SignatoryPosition(SignatoryRole::Approver), "Principal IV");
        f.content_standard = "CS".to_string();
        f
    }

    #[test]
    fn accepts_float_day_numbers() {
        let entry: DailyPlanEntry =
            serde_json::from_str(r#"{"dayNumber": 2.0, "topic": "t"}"#).unwrap();
        assert_eq!(entry.day_number, 2);
        let entry: DailyPlanEntry = serde_json::from_str(r#"{"dayNumber": "3"}"#).unwrap();
        assert_eq!(entry.day_number, 3);
    }

    #[test]
    fn unreadable_day_number_becomes_zero() {
        for raw in ["true", "null", "-1", "\"Day 1\"", "1e12"] {
            let json = format!(r#"{{"dayNumber": {raw}, "topic": "Photosynthesis"}}"#);
            let entry: DailyPlanEntry = serde_json::from_str(&json).unwrap();
            assert_eq!(entry.day_number, 0, "input {raw}");
            assert_eq!(entry.topic, "Photosynthesis");
        }
    }

    #[test]
    fn missing_fields_default_to_blank() {
        let entry: DailyPlanEntry = serde_json::from_str(r#"{"dayNumber": 1}"#).unwrap();
        assert!(entry.objectives.is_empty());
        assert_eq!(entry.procedures, Procedures::default());
        assert_eq!(entry.skills_21st, "");
    }

    #[test]
    fn reply_field_names_match_wire_format() {
        let entry: DailyPlanEntry = serde_json::from_str(
            r#"{"dayNumber":1,"skills21st":"Collaboration","idfFeatures":"Inquiry",
                "resources":{"references":"TG p.4","otherResources":"Video"},
                "procedures":{"activatingPriorKnowledge":"Recall","additionalActivities":"Homework"}}"#,
        )
        .unwrap();
        assert_eq!(entry.skills_21st, "Collaboration");
        assert_eq!(entry.idf_features, "Inquiry");
        assert_eq!(entry.resources.other_resources, "Video");
        assert_eq!(entry.procedures.activating_prior_knowledge, "Recall");
        assert_eq!(entry.procedures.additional_activities, "Homework");
    }

    #[test]
    fn assemble_copies_form_metadata() {
        let f = form();
        let doc = assemble(&f, vec![]);
        assert_eq!(doc.meta.school, "Rizal High");
        assert_eq!(doc.meta.approver_name, "J. Matriano");
        assert_eq!(doc.meta.approver_position, "Principal IV");
        assert_eq!(doc.standards.content_standard, "CS");
        assert!(doc.days.is_empty());
    }

    #[test]
    fn assemble_is_deterministic() {
        let f = form();
        let days = vec![DailyPlanEntry {
            day_number: 1,
            topic: "Photosynthesis".to_string(),
            ..Default::default()
        }];
        assert_eq!(assemble(&f, days.clone()), assemble(&f, days));
    }

    #[test]
    fn phases_cover_all_nine_fields() {
        let p = Procedures {
            activating_prior_knowledge: "1".into(),
            lesson_purpose: "2".into(),
            lesson_language_practice: "3".into(),
            reading_key_idea: "4".into(),
            developing_understanding: "5".into(),
            deepening_understanding: "6".into(),
            making_generalizations: "7".into(),
            evaluating_learning: "8".into(),
            additional_activities: "9".into(),
        };
        let values: Vec<&str> = LessonStage::ALL
            .into_iter()
            .flat_map(Procedures::phases)
            .map(|phase| (phase.get)(&p))
            .collect();
        assert_eq!(values, ["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }

    #[test]
    fn document_json_round_trip() {
        let doc = assemble(&form(), vec![DailyPlanEntry::default()]);
        let parsed = LessonPlanDocument::from_json(&doc.to_json()).unwrap();
        assert_eq!(parsed, doc);
        assert!(doc.to_json().contains("\"gradeLevel\""));
    }
}
