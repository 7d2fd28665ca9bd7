use std::path::Path;

use anyhow::Context;

use plangen_core::client::{GENERIC_FAILURE_MESSAGE, LessonPlanClient};
use plangen_core::form::{Attachment, ExtractedStandards, parse_form_toml, render_form_toml};

fn print_standards(extracted: &ExtractedStandards) {
    println!("Content Standards:");
    println!("  {}", extracted.content_standard);
    println!("Performance Standards:");
    println!("  {}", extracted.performance_standard);
    println!("Learning Competencies:");
    println!("  {}", extracted.learning_competency);
}

/// Execute `plangen extract`: pull standards out of an exemplar document,
/// then print them or merge them into a form file.
///
/// Extracted values that come back blank never overwrite the form.
pub async fn run_extract(
    client: &LessonPlanClient,
    file: &Path,
    form_path: Option<&Path>,
) -> anyhow::Result<()> {
    let attachment = Attachment::from_path(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    // Parse the form up front so a broken form file fails before the call.
    let form_file = match form_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read form {}", path.display()))?;
            let parsed = parse_form_toml(&contents)
                .with_context(|| format!("failed to parse form {}", path.display()))?;
            Some((path, parsed))
        }
        None => None,
    };

    let extracted = client
        .extract_standards(&attachment)
        .await
        .context(GENERIC_FAILURE_MESSAGE)?;

    match form_file {
        None => print_standards(&extracted),
        Some((path, mut parsed)) => {
            parsed.form.apply_extracted(&extracted);
            let rendered = render_form_toml(&parsed).context("failed to serialize form")?;
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write form {}", path.display()))?;
            tracing::info!(path = %path.display(), "merged extracted standards into form");
            println!("Updated standards in {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use plangen_test_utils::{MockBackend, MockReply, mock_client};

    const FORM: &str = r#"
[class]
subject = "Science"

[standards]
content = "old content"
performance = "old performance"
competency = "old competency"

[exemplar]
path = "lesson.pdf"
"#;

    #[tokio::test]
    async fn merges_non_blank_values_into_form() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = tmp.path().join("lesson.txt");
        std::fs::write(&doc, "lesson").unwrap();
        let form = tmp.path().join("form.toml");
        std::fs::write(&form, FORM).unwrap();

        run_extract(&mock_client("k", Arc::new(MockBackend::new())), &doc, Some(&form))
            .await
            .unwrap();

        let updated = parse_form_toml(&std::fs::read_to_string(&form).unwrap()).unwrap();
        assert_eq!(updated.form.content_standard, "Extracted content standard");
        assert_eq!(updated.form.performance_standard, "Extracted performance standard");
        assert_eq!(updated.form.learning_competency, "old competency");
        assert_eq!(updated.form.subject, "Science");
        assert_eq!(updated.exemplar.unwrap().path, "lesson.pdf");
    }

    #[tokio::test]
    async fn failure_leaves_form_file_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = tmp.path().join("lesson.txt");
        std::fs::write(&doc, "lesson").unwrap();
        let form = tmp.path().join("form.toml");
        std::fs::write(&form, FORM).unwrap();
        let backend = MockBackend::new().with_extraction(MockReply::Text(String::new()));

        let err = run_extract(&mock_client("k", Arc::new(backend)), &doc, Some(&form))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(std::fs::read_to_string(&form).unwrap(), FORM);
    }

    #[tokio::test]
    async fn missing_input_file_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = run_extract(
            &mock_client("k", Arc::new(MockBackend::new())),
            &tmp.path().join("missing.pdf"),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
