//! HTML rendering of a [`LessonPlanDocument`].
//!
//! Markup is semantic: elements carry `class` names only, and every class
//! is defined in the shared style table (see [`crate::export::STYLE_MAP`]).
//! The same fragment feeds the screen page, the print page and the legacy
//! word-processor export.

pub mod signatories;

use crate::document::{DailyPlanEntry, LessonPlanDocument, LessonStage, Procedures};
use crate::export;

pub use signatories::{SignatoryLayout, SignatureBlock, layout as signatory_layout};

pub const REMARKS_FALLBACK: &str = "No remarks";
pub const REFLECTION_FALLBACK: &str = "No reflection";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Document fragment
// ---------------------------------------------------------------------------

/// Render the full lesson log (header, content table, signatures) as an
/// HTML fragment.
pub fn render_document(doc: &LessonPlanDocument) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<div class=\"sheet\">");
    render_header(&mut out, doc);
    render_table(&mut out, doc);
    signatories::render_signatories(&mut out, &signatories::layout(&doc.meta));
    out.push_str("</div>");
    out
}

fn render_header(out: &mut String, doc: &LessonPlanDocument) {
    let m = &doc.meta;
    out.push_str("<table class=\"header-grid\">");

    out.push_str("<tr>");
    out.push_str(
        "<td class=\"title-cell\" rowspan=\"2\">\
         <div>Revised K to 10 Curriculum</div><div>Weekly Lesson Log</div></td>",
    );
    meta_pair(out, "School", &m.school, "meta-value");
    meta_pair(out, "Grade Level", &m.grade_level, "meta-value");
    out.push_str("</tr>");

    out.push_str("<tr>");
    meta_pair(out, "Name of Teacher", &m.teacher, "meta-value");
    meta_pair(out, "Learning Area", &m.subject, "meta-value");
    out.push_str("</tr>");

    out.push_str("<tr>");
    out.push_str("<td class=\"meta-label\">Teaching Dates and Time</td>");
    out.push_str(&format!(
        "<td class=\"meta-dates\" colspan=\"2\">{}</td>",
        escape_html(&m.dates)
    ));
    meta_pair(out, "Quarter", &m.quarter, "meta-value");
    out.push_str("</tr>");

    out.push_str("</table>");
}

fn meta_pair(out: &mut String, label: &str, value: &str, class: &str) {
    out.push_str(&format!("<td class=\"meta-label\">{label}</td>"));
    out.push_str(&format!(
        "<td class=\"{class}\">{}</td>",
        escape_html(value)
    ));
}

fn render_table(out: &mut String, doc: &LessonPlanDocument) {
    let days = &doc.days;
    let span = days.len() + 1;

    out.push_str("<table class=\"plan-table\"><thead><tr>");
    out.push_str("<th class=\"col-head\">Section</th>");
    for (i, _) in days.iter().enumerate() {
        out.push_str(&format!("<th class=\"col-head\">Day {}</th>", i + 1));
    }
    out.push_str("</tr></thead><tbody>");

    // I. Curriculum content
    section_band(
        out,
        span,
        "I. CURRICULUM CONTENT, STANDARDS, AND LESSON COMPETENCIES",
    );
    standard_row(out, span, "A. Content Standards", &doc.standards.content_standard);
    standard_row(
        out,
        span,
        "B. Performance Standards",
        &doc.standards.performance_standard,
    );
    standard_row(
        out,
        span,
        "C. Learning Competency",
        &doc.standards.learning_competency,
    );
    objectives_row(out, days);
    day_row(
        out,
        days,
        "row-label",
        "E. Instructional Design framework (IDF) features",
        "cell",
        |d| d.idf_features.as_str(),
    );
    day_row(out, days, "row-label", "F. 21st Century Skills", "cell", |d| {
        d.skills_21st.as_str()
    });

    // II. Content
    section_band(out, span, "II. CONTENT");
    day_row(out, days, "row-label", "Subject Matter / Topic", "cell topic", |d| {
        d.topic.as_str()
    });
    day_row(out, days, "row-label", "A. References", "cell reference", |d| {
        d.resources.references.as_str()
    });
    day_row(
        out,
        days,
        "row-label",
        "B. Other Learning Resources",
        "cell reference",
        |d| d.resources.other_resources.as_str(),
    );

    // IV. Procedures
    section_band(out, span, "IV. TEACHING AND LEARNING PROCEDURES");
    for stage in LessonStage::ALL {
        out.push_str(&format!(
            "<tr><td class=\"stage-band\" colspan=\"{span}\">{}</td></tr>",
            stage.title()
        ));
        for phase in Procedures::phases(stage) {
            day_row(out, days, "phase-label", phase.label, "cell", |d| {
                (phase.get)(&d.procedures)
            });
        }
    }

    day_row(out, days, "row-label", "REMARKS", "cell", |d| {
        or_fallback(&d.remarks, REMARKS_FALLBACK)
    });
    day_row(out, days, "row-label", "REFLECTION", "cell", |d| {
        or_fallback(&d.reflection, REFLECTION_FALLBACK)
    });

    out.push_str("</tbody></table>");
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn section_band(out: &mut String, span: usize, title: &str) {
    out.push_str(&format!(
        "<tr><td class=\"section-band\" colspan=\"{span}\">{title}</td></tr>"
    ));
}

fn standard_row(out: &mut String, span: usize, title: &str, value: &str) {
    out.push_str(&format!(
        "<tr><td class=\"standard-cell\" colspan=\"{span}\">\
         <div class=\"standard-title\">{title}</div>\
         <div class=\"standard-body\">{}</div></td></tr>",
        escape_html(value)
    ));
}

fn objectives_row(out: &mut String, days: &[DailyPlanEntry]) {
    out.push_str("<tr><td class=\"row-label\">D. Learning Objectives</td>");
    for day in days {
        out.push_str("<td class=\"cell\"><ul class=\"objectives\">");
        for objective in &day.objectives {
            out.push_str(&format!("<li>{}</li>", escape_html(objective)));
        }
        out.push_str("</ul></td>");
    }
    out.push_str("</tr>");
}

fn day_row<'d>(
    out: &mut String,
    days: &'d [DailyPlanEntry],
    label_class: &str,
    label: &str,
    cell_class: &str,
    value: impl Fn(&'d DailyPlanEntry) -> &'d str,
) {
    out.push_str(&format!("<tr><td class=\"{label_class}\">{label}</td>"));
    for day in days {
        out.push_str(&format!(
            "<td class=\"{cell_class}\">{}</td>",
            escape_html(value(day))
        ));
    }
    out.push_str("</tr>");
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Standalone HTML page showing the document.
pub fn document_page(doc: &LessonPlanDocument) -> String {
    standalone_page(doc, false)
}

/// Standalone page that opens the browser's print dialog on load.
pub fn print_page(doc: &LessonPlanDocument) -> String {
    standalone_page(doc, true)
}

fn standalone_page(doc: &LessonPlanDocument, print: bool) -> String {
    let mut out = String::with_capacity(20 * 1024);
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str(&format!(
        "<title>{} Lesson Plan</title>",
        escape_html(&doc.meta.subject)
    ));
    out.push_str("<style>");
    out.push_str(export::BASE_CSS);
    out.push_str(&export::stylesheet());
    out.push_str("</style></head><body>");
    out.push_str(&render_document(doc));
    if print {
        out.push_str(
            "<script>window.addEventListener('load', function () { \
             window.focus(); setTimeout(function () { window.print(); }, 200); });</script>",
        );
    }
    out.push_str("</body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{LessonMeta, Standards};

    fn day(n: u32, topic: &str) -> DailyPlanEntry {
        DailyPlanEntry {
            day_number: n,
            topic: topic.to_string(),
            objectives: vec!["Know".into(), "Do".into(), "Value".into()],
            ..Default::default()
        }
    }

    fn doc(days: Vec<DailyPlanEntry>) -> LessonPlanDocument {
        LessonPlanDocument {
            meta: LessonMeta {
                school: "Rizal High".into(),
                subject: "Science".into(),
                dates: "Dec 1-5".into(),
                ..Default::default()
            },
            standards: Standards {
                content_standard: "Energy flow".into(),
                ..Default::default()
            },
            days,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn one_column_per_day() {
        let html = render_document(&doc(vec![day(1, "a"), day(2, "b"), day(3, "c")]));
        assert!(html.contains(">Day 3</th>"));
        assert!(!html.contains(">Day 4</th>"));
        assert!(html.contains("colspan=\"4\""));
    }

    #[test]
    fn headers_follow_position_not_day_number() {
        let html = render_document(&doc(vec![day(7, "a")]));
        assert!(html.contains(">Day 1</th>"));
        assert!(!html.contains(">Day 7</th>"));
    }

    #[test]
    fn fallbacks_for_empty_remarks_and_reflection() {
        let mut d = day(1, "a");
        let html = render_document(&doc(vec![d.clone()]));
        assert!(html.contains(">No remarks</td>"));
        assert!(html.contains(">No reflection</td>"));

        d.remarks = "Done".into();
        d.reflection = "Good".into();
        let html = render_document(&doc(vec![d]));
        assert!(!html.contains("No remarks"));
        assert!(html.contains(">Good</td>"));
    }

    #[test]
    fn model_text_is_escaped() {
        let html = render_document(&doc(vec![day(1, "<script>alert(1)</script>")]));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn layout_sections_in_order() {
        let html = render_document(&doc(vec![day(1, "Photosynthesis")]));
        let order = [
            "Revised K to 10 Curriculum",
            "A. Content Standards",
            "D. Learning Objectives",
            "II. CONTENT",
            "Before/Pre-Lesson Proper",
            ">Lesson Proper<",
            "After/Post-Lesson Proper",
            "Additional Activities",
            "REFLECTION",
            "Submitted by:",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|s| html.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("<li>Know</li><li>Do</li><li>Value</li>"));
    }

    #[test]
    fn every_class_used_is_styled() {
        let html = render_document(&doc(vec![day(1, "a")]));
        let re = regex::Regex::new(r#"class="([^"]*)""#).unwrap();
        for cap in re.captures_iter(&html) {
            for class in cap[1].split_whitespace() {
                assert!(
                    export::STYLE_MAP.get(class).is_some(),
                    "class {class} has no style"
                );
            }
        }
    }

    #[test]
    fn print_page_triggers_print() {
        let html = print_page(&doc(vec![day(1, "a")]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("window.print()"));
        assert!(html.contains("size: landscape"));
        assert!(html.contains("<title>Science Lesson Plan</title>"));
        assert!(!document_page(&doc(vec![day(1, "a")])).contains("window.print()"));
    }
}
