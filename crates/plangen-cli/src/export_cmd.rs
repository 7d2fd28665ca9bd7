use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;

use plangen_core::document::LessonPlanDocument;
use plangen_core::export::legacy_document;
use plangen_core::render::{document_page, print_page};

/// Output formats for a finished document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML page
    Html,
    /// HTML page that opens the print dialog when loaded
    Print,
    /// Word-compatible .doc file
    Doc,
    /// Document JSON, re-renderable with `plangen render`
    Json,
}

/// Encoded document plus the file name used when no output path is given.
///
/// Only `.doc` has a default file name; other formats go to stdout.
pub fn encode(doc: &LessonPlanDocument, format: OutputFormat) -> (Vec<u8>, Option<String>) {
    match format {
        OutputFormat::Html => (document_page(doc).into_bytes(), None),
        OutputFormat::Print => (print_page(doc).into_bytes(), None),
        OutputFormat::Json => (doc.to_json().into_bytes(), None),
        OutputFormat::Doc => {
            let artifact = legacy_document(doc);
            (artifact.bytes, Some(artifact.file_name))
        }
    }
}

/// Write a document in `format` to `output`, its default file, or stdout.
pub fn write_document(
    doc: &LessonPlanDocument,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (bytes, default_name) = encode(doc, format);
    let target: Option<PathBuf> = output
        .map(Path::to_path_buf)
        .or_else(|| default_name.map(PathBuf::from));

    match target {
        Some(path) => {
            std::fs::write(&path, &bytes)
                .with_context(|| format!("cannot write output file: {}", path.display()))?;
            tracing::info!(path = %path.display(), ?format, bytes = bytes.len(), "wrote document");
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Execute `plangen render`: re-render a saved document JSON.
pub fn run_render(
    path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let doc = LessonPlanDocument::from_json(&contents)
        .with_context(|| format!("invalid document JSON in {}", path.display()))?;
    write_document(&doc, format, output)
}
