//! TOML format types for form files.
//!
//! A form file lets the CLI fill a [`FormInput`](super::FormInput) without
//! the web form. Every section is optional so a partially filled file still
//! parses; completeness is checked separately before generation.

use serde::{Deserialize, Serialize};

use super::Signatory;

/// Top-level structure of a `form.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormToml {
    #[serde(default)]
    pub class: ClassSection,
    #[serde(default)]
    pub standards: StandardsSection,
    #[serde(default)]
    pub topics: TopicsSection,
    #[serde(default)]
    pub context: ContextSection,
    #[serde(default)]
    pub signatories: SignatoriesSection,
    /// Optional exemplar document sent along with the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemplar: Option<ExemplarSection>,
}

/// `[class]`: header metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassSection {
    pub school: String,
    pub teacher: String,
    pub teacher_position: String,
    pub subject: String,
    pub grade_level: String,
    pub quarter: String,
    pub dates: String,
}

/// `[standards]`: fixed for the whole week.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StandardsSection {
    pub content: String,
    pub performance: String,
    pub competency: String,
}

/// `[topics]`: one topic per school day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TopicsSection {
    pub day1: String,
    pub day2: String,
    pub day3: String,
    pub day4: String,
    pub day5: String,
}

/// `[context]`: free-text notes for the generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextSection {
    pub specific_needs: String,
}

/// `[signatories.*]`: optional reviewers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignatoriesSection {
    pub checker: Signatory,
    pub noter: Signatory,
    pub approver: Signatory,
}

/// `[exemplar]`: path to a reference document, relative to the form file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExemplarSection {
    pub path: String,
    /// Overrides the MIME type guessed from the file extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Blank form written by `plangen template`.
pub const FORM_TEMPLATE: &str = include_str!("form_template.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let form: FormToml = toml::from_str(FORM_TEMPLATE).expect("template should parse");
        assert_eq!(form.class.school, "");
        assert!(form.exemplar.is_none());
    }

    #[test]
    fn deserialize_minimal_form() {
        let form: FormToml = toml::from_str(
            r#"
[class]
subject = "Science"

[topics]
day1 = "Photosynthesis"
"#,
        )
        .expect("should parse");
        assert_eq!(form.class.subject, "Science");
        assert_eq!(form.topics.day1, "Photosynthesis");
        assert_eq!(form.topics.day5, "");
        assert_eq!(form.signatories.noter, Signatory::default());
    }

    #[test]
    fn rejects_sixth_day() {
        let result: Result<FormToml, _> = toml::from_str(
            r#"
[topics]
day6 = "Saturday class"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_signatories_and_exemplar() {
        let form: FormToml = toml::from_str(
            r#"
[signatories.noter]
name = "Michael Armentia"
position = "Head Teacher VI"

[exemplar]
path = "exemplar.pdf"
"#,
        )
        .expect("should parse");
        assert_eq!(form.signatories.noter.name, "Michael Armentia");
        assert_eq!(form.exemplar.unwrap().path, "exemplar.pdf");
    }
}
