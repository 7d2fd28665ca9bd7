//! Form model: the metadata a teacher enters before generation.
//!
//! [`FormInput`] is an explicit record updated through typed setters. Every
//! editable field is addressed by a [`FormField`], so the web form and the
//! TOML loader never index into the record with raw strings.

pub mod attachment;
pub mod parser;
pub mod toml_format;

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub use attachment::{Attachment, mime_type_for_path};
pub use parser::{
    FormFile, FormParseError, load_form_file, parse_form_toml, render_form_toml, validate_form,
};
pub use toml_format::{FORM_TEMPLATE, FormToml};

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// One of the five school days covered by a weekly log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Day {
    /// All days in teaching order.
    pub const ALL: [Day; 5] = [Day::One, Day::Two, Day::Three, Day::Four, Day::Five];

    /// 1-based day number.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// 0-based position in a week.
    pub fn index(self) -> usize {
        match self {
            Day::One => 0,
            Day::Two => 1,
            Day::Three => 2,
            Day::Four => 3,
            Day::Five => 4,
        }
    }

    /// Look up a day by its 1-based number.
    pub fn from_number(n: u8) -> Option<Day> {
        Day::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {}", self.number())
    }
}

/// The five per-day topics, stored positionally and indexed by [`Day`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyTopics([String; 5]);

impl DailyTopics {
    pub fn new(topics: [String; 5]) -> Self {
        Self(topics)
    }

    /// Iterate `(day, topic)` pairs in teaching order.
    pub fn iter(&self) -> impl Iterator<Item = (Day, &str)> {
        Day::ALL.into_iter().map(move |d| (d, self.0[d.index()].as_str()))
    }
}

impl Index<Day> for DailyTopics {
    type Output = String;

    fn index(&self, day: Day) -> &String {
        &self.0[day.index()]
    }
}

impl IndexMut<Day> for DailyTopics {
    fn index_mut(&mut self, day: Day) -> &mut String {
        &mut self.0[day.index()]
    }
}

// ---------------------------------------------------------------------------
// Signatories
// ---------------------------------------------------------------------------

/// A name/position pair printed in the signature block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
}

impl Signatory {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
        }
    }

    /// A signatory is shown only when a non-blank name was entered.
    pub fn is_present(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Optional reviewers that may sign the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatoryRole {
    Checker,
    Noter,
    Approver,
}

impl SignatoryRole {
    pub const ALL: [SignatoryRole; 3] = [
        SignatoryRole::Checker,
        SignatoryRole::Noter,
        SignatoryRole::Approver,
    ];

    /// Caption printed above the signature.
    pub fn caption(self) -> &'static str {
        match self {
            SignatoryRole::Checker => "Checked by:",
            SignatoryRole::Noter => "Noted by:",
            SignatoryRole::Approver => "Approved by:",
        }
    }

    fn key(self) -> &'static str {
        match self {
            SignatoryRole::Checker => "checker",
            SignatoryRole::Noter => "noter",
            SignatoryRole::Approver => "approver",
        }
    }
}

// ---------------------------------------------------------------------------
// Field addressing
// ---------------------------------------------------------------------------

/// Class and teacher details shown in the document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneralField {
    School,
    Teacher,
    TeacherPosition,
    Subject,
    GradeLevel,
    Quarter,
    Dates,
}

/// The three standards fixed for the whole week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardField {
    Content,
    Performance,
    Competency,
}

/// Address of a single editable text field in [`FormInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    General(GeneralField),
    Standard(StandardField),
    Topic(Day),
    SpecificNeeds,
    SignatoryName(SignatoryRole),
    SignatoryPosition(SignatoryRole),
}

impl FormField {
    /// Every text field, in the order the form presents them.
    pub fn all() -> Vec<FormField> {
        use GeneralField::*;
        let mut fields: Vec<FormField> = [
            School,
            Teacher,
            TeacherPosition,
            Subject,
            GradeLevel,
            Quarter,
            Dates,
        ]
        .into_iter()
        .map(FormField::General)
        .collect();
        fields.extend(
            [
                StandardField::Content,
                StandardField::Performance,
                StandardField::Competency,
            ]
            .map(FormField::Standard),
        );
        fields.extend(Day::ALL.map(FormField::Topic));
        fields.push(FormField::SpecificNeeds);
        for role in SignatoryRole::ALL {
            fields.push(FormField::SignatoryName(role));
            fields.push(FormField::SignatoryPosition(role));
        }
        fields
    }

    /// Stable key used for HTML input names and error messages.
    pub fn name(self) -> String {
        match self {
            FormField::General(g) => match g {
                GeneralField::School => "school",
                GeneralField::Teacher => "teacher",
                GeneralField::TeacherPosition => "teacher_position",
                GeneralField::Subject => "subject",
                GeneralField::GradeLevel => "grade_level",
                GeneralField::Quarter => "quarter",
                GeneralField::Dates => "dates",
            }
            .to_string(),
            FormField::Standard(s) => match s {
                StandardField::Content => "content_standard",
                StandardField::Performance => "performance_standard",
                StandardField::Competency => "learning_competency",
            }
            .to_string(),
            FormField::Topic(day) => format!("day{}", day.number()),
            FormField::SpecificNeeds => "specific_needs".to_string(),
            FormField::SignatoryName(role) => format!("{}_name", role.key()),
            FormField::SignatoryPosition(role) => format!("{}_position", role.key()),
        }
    }

    /// Resolve a key produced by [`FormField::name`].
    pub fn from_name(name: &str) -> Option<FormField> {
        FormField::all().into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label for form rendering.
    pub fn label(self) -> String {
        match self {
            FormField::General(g) => match g {
                GeneralField::School => "School",
                GeneralField::Teacher => "Name of Teacher",
                GeneralField::TeacherPosition => "Teacher Position",
                GeneralField::Subject => "Learning Area",
                GeneralField::GradeLevel => "Grade Level",
                GeneralField::Quarter => "Quarter",
                GeneralField::Dates => "Teaching Dates",
            }
            .to_string(),
            FormField::Standard(s) => match s {
                StandardField::Content => "Content Standards",
                StandardField::Performance => "Performance Standards",
                StandardField::Competency => "Learning Competencies",
            }
            .to_string(),
            FormField::Topic(day) => format!("{day} Topic"),
            FormField::SpecificNeeds => "Specific Needs / Remarks".to_string(),
            FormField::SignatoryName(role) => format!("{} Name", role_title(role)),
            FormField::SignatoryPosition(role) => format!("{} Position", role_title(role)),
        }
    }

    /// Whether the form refuses to submit while this field is blank.
    pub fn is_required(self) -> bool {
        match self {
            FormField::General(GeneralField::TeacherPosition) => false,
            FormField::General(_) | FormField::Standard(_) | FormField::Topic(_) => true,
            FormField::SpecificNeeds
            | FormField::SignatoryName(_)
            | FormField::SignatoryPosition(_) => false,
        }
    }
}

fn role_title(role: SignatoryRole) -> &'static str {
    match role {
        SignatoryRole::Checker => "Checked by",
        SignatoryRole::Noter => "Noted by",
        SignatoryRole::Approver => "Approved by",
    }
}

// ---------------------------------------------------------------------------
// FormInput
// ---------------------------------------------------------------------------

/// Everything the user enters before asking for a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInput {
    pub school: String,
    pub teacher: String,
    pub teacher_position: String,
    pub subject: String,
    pub grade_level: String,
    pub quarter: String,
    pub dates: String,
    pub content_standard: String,
    pub performance_standard: String,
    pub learning_competency: String,
    pub daily_topics: DailyTopics,
    pub specific_needs: String,
    pub checker: Signatory,
    pub noter: Signatory,
    pub approver: Signatory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemplar: Option<Attachment>,
}

impl FormInput {
    /// Read the current value of a field.
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::General(g) => self.general(g),
            FormField::Standard(s) => self.standard(s),
            FormField::Topic(day) => &self.daily_topics[day],
            FormField::SpecificNeeds => &self.specific_needs,
            FormField::SignatoryName(role) => &self.signatory(role).name,
            FormField::SignatoryPosition(role) => &self.signatory(role).position,
        }
    }

    /// Overwrite a single field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::General(g) => self.set_general(g, value),
            FormField::Standard(s) => self.set_standard(s, value),
            FormField::Topic(day) => self.set_topic(day, value),
            FormField::SpecificNeeds => self.specific_needs = value,
            FormField::SignatoryName(role) => self.signatory_mut(role).name = value,
            FormField::SignatoryPosition(role) => self.signatory_mut(role).position = value,
        }
    }

    pub fn general(&self, field: GeneralField) -> &str {
        match field {
            GeneralField::School => &self.school,
            GeneralField::Teacher => &self.teacher,
            GeneralField::TeacherPosition => &self.teacher_position,
            GeneralField::Subject => &self.subject,
            GeneralField::GradeLevel => &self.grade_level,
            GeneralField::Quarter => &self.quarter,
            GeneralField::Dates => &self.dates,
        }
    }

    pub fn set_general(&mut self, field: GeneralField, value: impl Into<String>) {
        let slot = match field {
            GeneralField::School => &mut self.school,
            GeneralField::Teacher => &mut self.teacher,
            GeneralField::TeacherPosition => &mut self.teacher_position,
            GeneralField::Subject => &mut self.subject,
            GeneralField::GradeLevel => &mut self.grade_level,
            GeneralField::Quarter => &mut self.quarter,
            GeneralField::Dates => &mut self.dates,
        };
        *slot = value.into();
    }

    pub fn standard(&self, field: StandardField) -> &str {
        match field {
            StandardField::Content => &self.content_standard,
            StandardField::Performance => &self.performance_standard,
            StandardField::Competency => &self.learning_competency,
        }
    }

    pub fn set_standard(&mut self, field: StandardField, value: impl Into<String>) {
        let slot = match field {
            StandardField::Content => &mut self.content_standard,
            StandardField::Performance => &mut self.performance_standard,
            StandardField::Competency => &mut self.learning_competency,
        };
        *slot = value.into();
    }

    pub fn set_topic(&mut self, day: Day, topic: impl Into<String>) {
        self.daily_topics[day] = topic.into();
    }

    pub fn signatory(&self, role: SignatoryRole) -> &Signatory {
        match role {
            SignatoryRole::Checker => &self.checker,
            SignatoryRole::Noter => &self.noter,
            SignatoryRole::Approver => &self.approver,
        }
    }

    fn signatory_mut(&mut self, role: SignatoryRole) -> &mut Signatory {
        match role {
            SignatoryRole::Checker => &mut self.checker,
            SignatoryRole::Noter => &mut self.noter,
            SignatoryRole::Approver => &mut self.approver,
        }
    }

    pub fn set_signatory(&mut self, role: SignatoryRole, signatory: Signatory) {
        *self.signatory_mut(role) = signatory;
    }

    pub fn attach_exemplar(&mut self, attachment: Attachment) {
        self.exemplar = Some(attachment);
    }

    pub fn clear_exemplar(&mut self) {
        self.exemplar = None;
    }

    /// Discard everything entered so far.
    pub fn reset(&mut self) {
        *self = FormInput::default();
    }

    /// Required fields that are still blank, in form order.
    pub fn missing_required(&self) -> Vec<FormField> {
        FormField::all()
            .into_iter()
            .filter(|f| f.is_required() && self.get(*f).trim().is_empty())
            .collect()
    }

    /// Copy extracted standards into the form.
    ///
    /// Each standard present in the extraction replaces the current value,
    /// even when the user already typed something. Blank extracted values
    /// leave the field as it was.
    pub fn apply_extracted(&mut self, extracted: &ExtractedStandards) {
        let pairs = [
            (StandardField::Content, &extracted.content_standard),
            (StandardField::Performance, &extracted.performance_standard),
            (StandardField::Competency, &extracted.learning_competency),
        ];
        for (field, value) in pairs {
            if !value.trim().is_empty() {
                self.set_standard(field, value.clone());
            }
        }
    }
}

/// Standards pulled out of an uploaded exemplar document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedStandards {
    #[serde(default)]
    pub content_standard: String,
    #[serde(default)]
    pub performance_standard: String,
    #[serde(default)]
    pub learning_competency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_numbers_round_trip() {
        for day in Day::ALL {
            assert_eq!(Day::from_number(day.number()), Some(day));
        }
        assert_eq!(Day::from_number(0), None);
        assert_eq!(Day::from_number(6), None);
        assert_eq!(Day::Three.to_string(), "Day 3");
    }

    #[test]
    fn topics_are_indexed_by_day() {
        let mut topics = DailyTopics::default();
        topics[Day::Four] = "Fractions".to_string();
        assert_eq!(topics[Day::Four], "Fractions");
        assert_eq!(topics[Day::One], "");
        let collected: Vec<(Day, &str)> = topics.iter().collect();
        assert_eq!(collected.len(), 5);
        assert_eq!(collected[3], (Day::Four, "Fractions"));
    }

    #[test]
    fn field_names_resolve_back() {
        for field in FormField::all() {
            assert_eq!(FormField::from_name(&field.name()), Some(field));
        }
        assert_eq!(FormField::from_name("dailyTopics[day1]"), None);
    }

    #[test]
    fn set_and_get_through_field_address() {
        let mut form = FormInput::default();
        form.set(FormField::General(GeneralField::School), "Rizal High");
        form.set(FormField::Topic(Day::Two), "Cells");
        form.set(FormField::SignatoryName(SignatoryRole::Noter), "M. Armentia");
        assert_eq!(form.school, "Rizal High");
        assert_eq!(form.daily_topics[Day::Two], "Cells");
        assert_eq!(form.noter.name, "M. Armentia");
        assert_eq!(form.get(FormField::SignatoryName(SignatoryRole::Noter)), "M. Armentia");
    }

    #[test]
    fn missing_required_lists_blank_fields_in_order() {
        let mut form = FormInput::default();
        form.set_general(GeneralField::School, "School");
        let missing = form.missing_required();
        assert_eq!(missing[0], FormField::General(GeneralField::Teacher));
        assert!(!missing.contains(&FormField::General(GeneralField::TeacherPosition)));
        assert!(!missing.contains(&FormField::SpecificNeeds));
        assert!(missing.contains(&FormField::Topic(Day::Five)));
        // 7 general minus school and position, 3 standards, 5 topics.
        assert_eq!(missing.len(), 5 + 3 + 5);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut form = FormInput::default();
        form.set_general(GeneralField::Quarter, "   ");
        assert!(form.missing_required().contains(&FormField::General(GeneralField::Quarter)));
    }

    #[test]
    fn apply_extracted_overwrites_existing_values() {
        let mut form = FormInput::default();
        form.set_standard(StandardField::Content, "typed by user");
        form.set_standard(StandardField::Competency, "keep me");
        let extracted = ExtractedStandards {
            content_standard: "from exemplar".to_string(),
            performance_standard: "perf".to_string(),
            learning_competency: String::new(),
        };
        form.apply_extracted(&extracted);
        assert_eq!(form.content_standard, "from exemplar");
        assert_eq!(form.performance_standard, "perf");
        assert_eq!(form.learning_competency, "keep me");
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = FormInput::default();
        form.set_general(GeneralField::Subject, "Science");
        form.attach_exemplar(Attachment::new(vec![1, 2, 3], "application/pdf"));
        form.reset();
        assert_eq!(form, FormInput::default());
    }

    #[test]
    fn signatory_presence_ignores_blank_names() {
        assert!(!Signatory::new("  ", "Principal").is_present());
        assert!(Signatory::new("J. Matriano", "").is_present());
    }

    #[test]
    fn json_uses_camel_case_and_topic_array() {
        let mut form = FormInput::default();
        form.set_general(GeneralField::GradeLevel, "Grade 8");
        form.set_topic(Day::One, "Photosynthesis");
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["gradeLevel"], "Grade 8");
        assert_eq!(json["dailyTopics"][0], "Photosynthesis");
        assert!(json.get("exemplar").is_none());

        let back: FormInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, form);
    }
}
