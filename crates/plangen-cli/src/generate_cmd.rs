use std::path::Path;

use anyhow::Context;

use plangen_core::client::{GENERIC_FAILURE_MESSAGE, LessonPlanClient};
use plangen_core::form::{Attachment, load_form_file, validate_form};

use crate::export_cmd::{OutputFormat, write_document};

/// Execute `plangen generate`: validate a form file, call the model and
/// write the resulting document.
pub async fn run_generate(
    client: &LessonPlanClient,
    form_path: &Path,
    exemplar: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut file = load_form_file(form_path)
        .with_context(|| format!("failed to load form {}", form_path.display()))?;

    if let Some(path) = exemplar {
        let attachment = Attachment::from_path(path)
            .with_context(|| format!("failed to read exemplar {}", path.display()))?;
        file.form.attach_exemplar(attachment);
    }

    validate_form(&file.form).context("form is incomplete")?;

    println!(
        "Generating {} lesson plan with {}...",
        file.form.subject,
        client.settings().model
    );
    let doc = client
        .generate_lesson_plan(&file.form)
        .await
        .context(GENERIC_FAILURE_MESSAGE)?;

    write_document(&doc, format, output)
}
