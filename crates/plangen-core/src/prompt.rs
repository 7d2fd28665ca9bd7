//! Prompt construction for the generation and extraction calls.
//!
//! Pure string assembly: every user value is embedded verbatim, blank or
//! not. Completeness is the form's concern.

use crate::client::StructuredRequest;
use crate::document::{LessonStage, Procedures};
use crate::form::{Attachment, FormInput};
use crate::schema;

/// Instruction sent with an exemplar when extracting standards.
pub const EXTRACTION_PROMPT: &str = "Analyze the attached lesson document. \
Extract the Content Standards, Performance Standards, and Learning Competencies \
exactly as written. If a section is not present, return an empty string for it.";

/// Fixed rules about objective domains.
const OBJECTIVE_RULES: &str = r#"CRITICAL INSTRUCTION FOR LEARNING OBJECTIVES:
For the "objectives" array for EACH day, you MUST generate exactly three (3) distinct objectives covering these domains in this order:
1. Cognitive Domain (Knowledge)
2. Psychomotor Domain (Skills)
3. Affective Domain (Attitude/Values)
Label them clearly if needed, but ensure they cover these three domains specifically.
"#;

const EXEMPLAR_NOTE: &str = "An exemplar lesson document is attached. Use it as a reference \
for the expected style, tone, level of detail and depth of each section, but write new \
content for the topics above.";

/// Build the instruction text for a five-day plan.
pub fn build_generation_prompt(form: &FormInput) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(
        "Create a 5-Day Daily Lesson Log (DLL) strictly following the specified structure.\n\n",
    );

    prompt.push_str("Context:\n");
    prompt.push_str(&format!("- School: {}\n", form.school));
    prompt.push_str(&format!("- Teacher: {}\n", form.teacher));
    prompt.push_str(&format!("- Subject: {}\n", form.subject));
    prompt.push_str(&format!("- Grade Level: {}\n", form.grade_level));
    prompt.push_str(&format!("- Week/Dates: {}\n", form.dates));
    prompt.push_str(&format!("- Quarter: {}\n\n", form.quarter));

    prompt.push_str("Standards (Fixed for the week):\n");
    prompt.push_str(&format!("- Content Standards: {}\n", form.content_standard));
    prompt.push_str(&format!(
        "- Performance Standards: {}\n",
        form.performance_standard
    ));
    prompt.push_str(&format!(
        "- Learning Competencies: {}\n\n",
        form.learning_competency
    ));

    prompt.push_str("Daily Topics:\n");
    for (day, topic) in form.daily_topics.iter() {
        prompt.push_str(&format!("- {day}: {topic}\n"));
    }
    prompt.push('\n');

    prompt.push_str(&format!("Context/Notes: {}\n\n", form.specific_needs));

    prompt.push_str("Task:\nGenerate the lesson plan content for EACH of the 5 days.\n\n");
    prompt.push_str(OBJECTIVE_RULES);
    prompt.push('\n');

    prompt.push_str(
        "For Procedures, you MUST generate content for each of these specific sub-sections:\n\n",
    );
    prompt.push_str("IV. TEACHING AND LEARNING PROCEDURES\n");
    for stage in LessonStage::ALL {
        prompt.push_str(&format!("{}:\n", stage.title()));
        for phase in Procedures::phases(stage) {
            prompt.push_str(&format!("- {}\n", phase.prompt_label));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Also include \"Instructional Design framework (IDF) features\" and \
         \"21st Century Skills\" for each day.\n",
    );

    if form.exemplar.is_some() {
        prompt.push('\n');
        prompt.push_str(EXEMPLAR_NOTE);
        prompt.push('\n');
    }

    prompt
}

/// Full request for a five-day plan: prompt, optional exemplar, schema.
pub fn build_generation_request(
    form: &FormInput,
    model: &str,
    temperature: Option<f32>,
) -> StructuredRequest {
    StructuredRequest {
        model: model.to_string(),
        prompt: build_generation_prompt(form),
        attachment: form.exemplar.clone(),
        response_schema: schema::generation_schema(),
        temperature,
    }
}

/// Full request for extracting standards from an exemplar.
pub fn build_extraction_request(file: &Attachment, model: &str) -> StructuredRequest {
    StructuredRequest {
        model: model.to_string(),
        prompt: EXTRACTION_PROMPT.to_string(),
        attachment: Some(file.clone()),
        response_schema: schema::extraction_schema(),
        temperature: None,
    }
}
