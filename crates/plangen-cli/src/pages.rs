//! HTML pages served by `plangen serve`.
//!
//! Plain server-rendered forms: no client-side framework, one page for
//! input and one for the generated document.

use plangen_core::document::LessonPlanDocument;
use plangen_core::export;
use plangen_core::form::{FormField, FormInput};
use plangen_core::render::{escape_html, render_document};

/// One-shot message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

const APP_CSS: &str = "\
body { margin: 0; background: #f3f4f6; font-family: Arial, sans-serif; color: #111827; }\n\
nav { background: #fff; border-bottom: 1px solid #e5e7eb; padding: 12px 24px; display: flex; justify-content: space-between; align-items: center; }\n\
nav h1 { margin: 0; font-size: 20px; }\n\
main { max-width: 1200px; margin: 0 auto; padding: 24px; }\n\
.panel { max-width: 760px; margin: 0 auto; background: #fff; border-radius: 12px; padding: 24px; }\n\
fieldset { border: none; border-top: 1px solid #e5e7eb; margin: 0 0 24px; padding: 16px 0 0; }\n\
legend { font-weight: bold; padding-right: 8px; }\n\
label { display: block; font-size: 14px; font-weight: 600; margin: 12px 0 4px; }\n\
input[type=text], textarea { width: 100%; box-sizing: border-box; padding: 8px; border: 1px solid #d1d5db; border-radius: 6px; }\n\
textarea { min-height: 72px; }\n\
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 0 16px; }\n\
.banner { padding: 12px 16px; margin-bottom: 24px; border-left: 4px solid; }\n\
.banner.error { background: #fef2f2; border-color: #ef4444; color: #b91c1c; }\n\
.banner.info { background: #eff6ff; border-color: #3b82f6; color: #1d4ed8; }\n\
.actions { display: flex; gap: 12px; }\n\
button:disabled { opacity: 0.6; cursor: wait; }\n\
button, .button { padding: 8px 16px; border: none; border-radius: 6px; background: #2563eb; color: #fff; font-weight: 600; cursor: pointer; text-decoration: none; font-size: 14px; }\n\
.button.secondary, button.secondary { background: #4f46e5; }\n\
.button.print { background: #dc2626; }\n\
.document { background: #fff; padding: 16px; overflow-x: auto; }\n\
@media print { nav, .toolbar { display: none; } main { padding: 0; } }\n";

/// Disables both submit buttons once a submission starts and relabels the
/// one that was pressed. The server still refuses overlapping calls.
const BUSY_SCRIPT: &str = "\
function plangenBusy(form, submitter) {\n\
  var extracting = submitter && submitter.getAttribute('formaction') === '/extract';\n\
  form.querySelectorAll('button[type=submit]').forEach(function (b) { b.disabled = true; });\n\
  if (submitter) { submitter.textContent = extracting ? 'Extracting…' : 'Generating…'; }\n\
  return true;\n\
}\n";

fn shell(title: &str, nav_extra: &str, body: &str, doc_styles: bool) -> String {
    let mut out = String::with_capacity(body.len() + 8 * 1024);
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    out.push_str(&format!("<title>{}</title><style>", escape_html(title)));
    out.push_str(APP_CSS);
    if doc_styles {
        out.push_str(&export::stylesheet());
    }
    out.push_str("</style></head><body>");
    out.push_str("<nav><div><h1>PlanGen</h1><small>Weekly Lesson Log Planner</small></div>");
    out.push_str(nav_extra);
    out.push_str("</nav><main>");
    out.push_str(body);
    out.push_str("</main></body></html>");
    out
}

fn banner(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::Error(msg)) => {
            format!("<div class=\"banner error\">{}</div>", escape_html(msg))
        }
        Some(Notice::Info(msg)) => {
            format!("<div class=\"banner info\">{}</div>", escape_html(msg))
        }
        None => String::new(),
    }
}

fn input(out: &mut String, form: &FormInput, field: FormField, multiline: bool) {
    let name = field.name();
    let required = if field.is_required() { " required" } else { "" };
    let value = escape_html(form.get(field));
    out.push_str(&format!(
        "<label for=\"{name}\">{}</label>",
        escape_html(&field.label())
    ));
    if multiline {
        out.push_str(&format!(
            "<textarea id=\"{name}\" name=\"{name}\"{required}>{value}</textarea>"
        ));
    } else {
        out.push_str(&format!(
            "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{required}>"
        ));
    }
}

/// The input form, pre-filled from `form`.
pub fn form_page(form: &FormInput, notice: Option<&Notice>) -> String {
    let mut body = String::with_capacity(12 * 1024);
    body.push_str(&banner(notice));
    body.push_str("<div class=\"panel\"><h2>5-Day Weekly Lesson Log</h2>");
    body.push_str(&format!("<script>{BUSY_SCRIPT}</script>"));
    body.push_str(
        "<form method=\"post\" action=\"/generate\" enctype=\"multipart/form-data\" \
         onsubmit=\"return plangenBusy(this, event.submitter);\">",
    );

    let fields = FormField::all();

    body.push_str("<fieldset><legend>General Information</legend><div class=\"grid\">");
    for f in fields.iter().filter(|f| matches!(f, FormField::General(_))) {
        body.push_str("<div>");
        input(&mut body, form, *f, false);
        body.push_str("</div>");
    }
    body.push_str("</div></fieldset>");

    body.push_str("<fieldset><legend>Curriculum Standards</legend>");
    body.push_str("<label for=\"exemplar\">Exemplar document (optional)</label>");
    body.push_str(
        "<input type=\"file\" id=\"exemplar\" name=\"exemplar\" \
         accept=\".pdf,.doc,.docx,.txt,.md,.html,.png,.jpg,.jpeg,.webp\">",
    );
    if let Some(ex) = &form.exemplar {
        body.push_str(&format!(
            "<p><small>Attached: {} ({} bytes)</small></p>",
            escape_html(&ex.mime_type),
            ex.data.len()
        ));
    }
    body.push_str(
        "<p><button type=\"submit\" class=\"secondary\" formaction=\"/extract\" \
         formnovalidate>Extract standards from exemplar</button></p>",
    );
    for f in fields.iter().filter(|f| matches!(f, FormField::Standard(_))) {
        input(&mut body, form, *f, true);
    }
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Daily Topics</legend>");
    for f in fields.iter().filter(|f| matches!(f, FormField::Topic(_))) {
        input(&mut body, form, *f, false);
    }
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Context</legend>");
    input(&mut body, form, FormField::SpecificNeeds, true);
    body.push_str("</fieldset>");

    body.push_str("<fieldset><legend>Signatories</legend><div class=\"grid\">");
    for f in fields.iter().filter(|f| {
        matches!(
            f,
            FormField::SignatoryName(_) | FormField::SignatoryPosition(_)
        )
    }) {
        body.push_str("<div>");
        input(&mut body, form, *f, false);
        body.push_str("</div>");
    }
    body.push_str("</div></fieldset>");

    body.push_str("<button type=\"submit\">Generate Lesson Plan</button>");
    body.push_str("</form></div>");

    shell("PlanGen", "", &body, false)
}

/// The generated document with print/export actions.
pub fn result_page(doc: &LessonPlanDocument) -> String {
    let nav = "<form method=\"post\" action=\"/reset\">\
               <button type=\"submit\" class=\"secondary\">Create New Plan</button></form>";

    let mut body = String::with_capacity(32 * 1024);
    body.push_str("<div class=\"toolbar actions\"><h2>Generated Daily Lesson Log</h2>");
    body.push_str("<a class=\"button secondary\" href=\"/export/doc\">Export to Word</a>");
    body.push_str(
        "<a class=\"button print\" href=\"/print\" target=\"_blank\" rel=\"noopener\">Save as PDF</a>",
    );
    body.push_str("</div><div class=\"document\">");
    body.push_str(&render_document(doc));
    body.push_str("</div>");

    shell(
        &format!("{} Lesson Plan", doc.meta.subject),
        nav,
        &body,
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plangen_core::document::assemble;
    use plangen_core::form::Attachment;
    use plangen_test_utils::sample_form;

    #[test]
    fn form_has_every_field() {
        let html = form_page(&FormInput::default(), None);
        for f in FormField::all() {
            assert!(
                html.contains(&format!("name=\"{}\"", f.name())),
                "missing input {}",
                f.name()
            );
        }
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"exemplar\""));
    }

    #[test]
    fn form_is_prefilled_and_escaped() {
        let mut form = sample_form();
        form.school = "A & B \"School\"".to_string();
        let html = form_page(&form, None);
        assert!(html.contains("value=\"A &amp; B &quot;School&quot;\""));
        assert!(html.contains(">The learners demonstrate understanding of energy flow"));
    }

    #[test]
    fn required_markers_follow_field_rules() {
        let html = form_page(&FormInput::default(), None);
        assert!(html.contains("name=\"school\" value=\"\" required>"));
        assert!(html.contains("name=\"teacher_position\" value=\"\">"));
        assert!(html.contains("name=\"checker_name\" value=\"\">"));
    }

    #[test]
    fn banner_and_attachment_shown() {
        let mut form = FormInput::default();
        form.attach_exemplar(Attachment::new(vec![1, 2, 3], "application/pdf"));
        let html = form_page(&form, Some(&Notice::Error("Failed <badly>".to_string())));
        assert!(html.contains("<div class=\"banner error\">Failed &lt;badly&gt;</div>"));
        assert!(html.contains("Attached: application/pdf (3 bytes)"));
    }

    #[test]
    fn submit_disables_buttons() {
        let html = form_page(&sample_form(), None);
        assert!(html.contains("onsubmit=\"return plangenBusy(this, event.submitter);\""));
        assert!(html.contains("function plangenBusy(form, submitter)"));
        assert!(html.contains("b.disabled = true"));
        assert!(html.contains("'Generating…'"));
        assert!(html.contains("'Extracting…'"));
        assert_eq!(html.matches("type=\"submit\"").count(), 2);
    }

    #[test]
    fn result_page_links_exports() {
        let html = result_page(&assemble(&sample_form(), vec![]));
        assert!(html.contains("href=\"/export/doc\""));
        assert!(html.contains("href=\"/print\""));
        assert!(html.contains("action=\"/reset\""));
        assert!(html.contains("Revised K to 10 Curriculum"));
        assert!(html.contains(".section-band {"));
    }
}
