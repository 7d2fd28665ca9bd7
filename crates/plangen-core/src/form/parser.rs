//! Form file parsing and completeness checks.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::toml_format::{
    ClassSection, ContextSection, ExemplarSection, FormToml, SignatoriesSection,
    StandardsSection, TopicsSection,
};
use super::{Attachment, DailyTopics, FormField, FormInput};

/// Errors that can occur while loading or checking a form.
#[derive(Debug, Error)]
pub enum FormParseError {
    #[error("failed to read form file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to serialize form: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to read exemplar {path:?}: {source}")]
    Exemplar {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing required fields: {}", .0.join(", "))]
    Incomplete(Vec<String>),
}

/// A parsed form plus the exemplar reference it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFile {
    pub form: FormInput,
    pub exemplar: Option<ExemplarSection>,
}

/// Parse a form TOML string. The exemplar file, if any, is not read.
pub fn parse_form_toml(content: &str) -> Result<FormFile, FormParseError> {
    let raw: FormToml = toml::from_str(content)?;
    Ok(from_toml(raw))
}

/// Read a form file and load its exemplar relative to the file's directory.
pub fn load_form_file(path: &Path) -> Result<FormFile, FormParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| FormParseError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut file = parse_form_toml(&content)?;

    if let Some(ex) = &file.exemplar {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let ex_path = base.join(&ex.path);
        let mut attachment =
            Attachment::from_path(&ex_path).map_err(|e| FormParseError::Exemplar {
                path: ex_path.clone(),
                source: e,
            })?;
        if let Some(mime) = &ex.mime_type {
            attachment.mime_type = mime.clone();
        }
        tracing::debug!(path = %ex_path.display(), bytes = attachment.data.len(), "loaded exemplar");
        file.form.attach_exemplar(attachment);
    }

    Ok(file)
}

/// Serialize a form back to TOML. Attachment bytes are not written; the
/// exemplar path is kept as it was read.
pub fn render_form_toml(file: &FormFile) -> Result<String, FormParseError> {
    Ok(toml::to_string_pretty(&to_toml(file))?)
}

/// Fail with the list of blank required fields, if any.
pub fn validate_form(form: &FormInput) -> Result<(), FormParseError> {
    let missing = form.missing_required();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FormParseError::Incomplete(
            missing.into_iter().map(FormField::name).collect(),
        ))
    }
}

fn from_toml(raw: FormToml) -> FormFile {
    let FormToml {
        class,
        standards,
        topics,
        context,
        signatories,
        exemplar,
    } = raw;

    let form = FormInput {
        school: class.school,
        teacher: class.teacher,
        teacher_position: class.teacher_position,
        subject: class.subject,
        grade_level: class.grade_level,
        quarter: class.quarter,
        dates: class.dates,
        content_standard: standards.content,
        performance_standard: standards.performance,
        learning_competency: standards.competency,
        daily_topics: DailyTopics::new([
            topics.day1,
            topics.day2,
            topics.day3,
            topics.day4,
            topics.day5,
        ]),
        specific_needs: context.specific_needs,
        checker: signatories.checker,
        noter: signatories.noter,
        approver: signatories.approver,
        exemplar: None,
    };

    FormFile { form, exemplar }
}

fn to_toml(file: &FormFile) -> FormToml {
    let f = &file.form;
    let [day1, day2, day3, day4, day5] = super::Day::ALL.map(|d| f.daily_topics[d].clone());
    FormToml {
        class: ClassSection {
            school: f.school.clone(),
            teacher: f.teacher.clone(),
            teacher_position: f.teacher_position.clone(),
            subject: f.subject.clone(),
            grade_level: f.grade_level.clone(),
            quarter: f.quarter.clone(),
            dates: f.dates.clone(),
        },
        standards: StandardsSection {
            content: f.content_standard.clone(),
            performance: f.performance_standard.clone(),
            competency: f.learning_competency.clone(),
        },
        topics: TopicsSection {
            day1,
            day2,
            day3,
            day4,
            day5,
        },
        context: ContextSection {
            specific_needs: f.specific_needs.clone(),
        },
        signatories: SignatoriesSection {
            checker: f.checker.clone(),
            noter: f.noter.clone(),
            approver: f.approver.clone(),
        },
        exemplar: file.exemplar.clone(),
    }
}
