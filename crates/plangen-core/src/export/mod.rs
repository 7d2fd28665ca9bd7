//! Export of a rendered lesson log.
//!
//! Two targets exist: the print page (see [`crate::render::print_page`]) and
//! a legacy word-processor document. The latter is HTML in a Word-flavoured
//! shell saved with a `.doc` extension; since the word processor does not
//! resolve class selectors, every class is first replaced with the inline
//! declarations from [`STYLE_MAP`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::document::LessonPlanDocument;
use crate::render::{escape_html, render_document};

pub const DOC_MIME_TYPE: &str = "application/msword";

const UTF8_BOM: &str = "\u{feff}";

/// Page and table defaults shared by the print page and the `.doc` shell.
pub const BASE_CSS: &str = "@page { size: landscape; margin: 1cm; }\n\
body { font-family: Arial, sans-serif; color: #000; }\n\
table { width: 100%; border-collapse: collapse; }\n\
td, th { vertical-align: top; }\n";

// ---------------------------------------------------------------------------
// Style table
// ---------------------------------------------------------------------------

/// Class name to CSS declaration mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleMap {
    classes: BTreeMap<String, String>,
}

impl StyleMap {
    /// Declarations for `class`, if it is styled.
    pub fn get(&self, class: &str) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Combined declarations for a space-separated class list. Unknown
    /// classes contribute nothing.
    pub fn declarations(&self, class_list: &str) -> String {
        class_list
            .split_whitespace()
            .filter_map(|c| self.get(c))
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

static STYLES_TOML: &str = include_str!("styles.toml");

/// The embedded style table.
///
/// # Panics
///
/// First access panics if the embedded `styles.toml` is malformed. The
/// file ships inside the binary, so a build that passes its tests cannot
/// hit this.
pub static STYLE_MAP: LazyLock<StyleMap> = LazyLock::new(|| {
    toml::from_str(STYLES_TOML).expect("embedded styles.toml is invalid")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass="([^"]*)""#).expect("invalid class attribute pattern")
});

/// The style table as a class-selector stylesheet.
pub fn stylesheet() -> String {
    let mut css = String::new();
    for (class, decls) in STYLE_MAP.iter() {
        css.push_str(&format!(".{class} {{ {decls} }}\n"));
    }
    css
}

/// Replace every `class="..."` attribute with the equivalent inline
/// `style="..."`. Attributes naming only unknown classes are removed.
/// Text content is left untouched.
pub fn inline_styles(markup: &str) -> String {
    CLASS_ATTR
        .replace_all(markup, |caps: &Captures<'_>| {
            let decls = STYLE_MAP.declarations(&caps[1]);
            if decls.is_empty() {
                String::new()
            } else {
                format!(" style=\"{}\"", escape_html(&decls))
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Legacy document
// ---------------------------------------------------------------------------

/// A downloadable file produced from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `Lesson_Plan_<subject>_Week_<dates>.doc`. Characters that cannot appear
/// in a file name on common platforms become `-`.
pub fn export_file_name(doc: &LessonPlanDocument) -> String {
    let raw = format!(
        "Lesson_Plan_{}_Week_{}.doc",
        doc.meta.subject, doc.meta.dates
    );
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Word-compatible HTML text of the document, without the byte-order mark.
pub fn legacy_markup(doc: &LessonPlanDocument) -> String {
    let body = inline_styles(&render_document(doc));

    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
         xmlns:w='urn:schemas-microsoft-com:office:word' \
         xmlns='http://www.w3.org/TR/REC-html40'>\n",
    );
    out.push_str("<head>\n<meta charset='utf-8'>\n");
    out.push_str(&format!(
        "<title>{} Lesson Plan</title>\n",
        escape_html(&doc.meta.subject)
    ));
    out.push_str("<style>\n");
    out.push_str(BASE_CSS);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&body);
    out.push_str("\n</body></html>");
    out
}

/// Build the `.doc` download: BOM-prefixed UTF-8 Word HTML.
pub fn legacy_document(doc: &LessonPlanDocument) -> ExportArtifact {
    let markup = legacy_markup(doc);
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + markup.len());
    bytes.extend_from_slice(UTF8_BOM.as_bytes());
    bytes.extend_from_slice(markup.as_bytes());

    tracing::debug!(
        subject = %doc.meta.subject,
        bytes = bytes.len(),
        "built legacy document export"
    );

    ExportArtifact {
        file_name: export_file_name(doc),
        mime_type: DOC_MIME_TYPE,
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DailyPlanEntry, LessonMeta};

    fn doc() -> LessonPlanDocument {
        LessonPlanDocument {
            meta: LessonMeta {
                subject: "Science".into(),
                dates: "December 1 - 5, 2025".into(),
                teacher: "Ana Cruz".into(),
                ..Default::default()
            },
            days: vec![DailyPlanEntry {
                day_number: 1,
                topic: "Photosynthesis".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn embedded_styles_parse() {
        assert!(!STYLE_MAP.is_empty());
        assert!(STYLE_MAP.get("section-band").unwrap().contains("#fef9c3"));
    }

    #[test]
    fn stylesheet_has_rule_per_class() {
        let css = stylesheet();
        assert_eq!(css.lines().count(), STYLE_MAP.len());
        assert!(css.contains(".cell { border: 1px solid #000;"));
    }

    #[test]
    fn inline_combines_known_classes() {
        let out = inline_styles(r#"<td class="cell topic">x</td>"#);
        assert_eq!(
            out,
            format!(
                r#"<td style="{} {}">x</td>"#,
                STYLE_MAP.get("cell").unwrap(),
                STYLE_MAP.get("topic").unwrap()
            )
        );
    }

    #[test]
    fn inline_drops_unknown_classes() {
        assert_eq!(inline_styles(r#"<div class="nope">x</div>"#), "<div>x</div>");
        let out = inline_styles(r#"<div class="nope topic">x</div>"#);
        assert_eq!(out, r#"<div style="font-weight: 600;">x</div>"#);
    }

    #[test]
    fn inline_leaves_text_alone() {
        let text = "<p>class=\"cell\" is literal text</p>";
        assert_eq!(inline_styles(text), text);
    }

    #[test]
    fn legacy_markup_has_no_classes() {
        let markup = legacy_markup(&doc());
        assert!(!markup.contains("class="));
        assert!(markup.contains("style=\""));
        assert!(markup.contains("Photosynthesis"));
        assert!(markup.contains("xmlns:w='urn:schemas-microsoft-com:office:word'"));
        assert!(markup.contains("<title>Science Lesson Plan</title>"));
        assert!(markup.contains("size: landscape"));
    }

    #[test]
    fn artifact_is_bom_prefixed_msword() {
        let artifact = legacy_document(&doc());
        assert_eq!(artifact.mime_type, "application/msword");
        assert_eq!(
            artifact.file_name,
            "Lesson_Plan_Science_Week_December 1 - 5, 2025.doc"
        );
        assert_eq!(&artifact.bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = std::str::from_utf8(&artifact.bytes[3..]).unwrap();
        assert!(text.starts_with("<html"));
    }

    #[test]
    fn file_name_replaces_separators() {
        let mut d = doc();
        d.meta.dates = "12/1/2025".into();
        assert_eq!(export_file_name(&d), "Lesson_Plan_Science_Week_12-1-2025.doc");
    }
}
