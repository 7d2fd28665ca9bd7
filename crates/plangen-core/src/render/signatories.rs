//! Signature block layout.
//!
//! The block has a top row of three slots and an optional centered second
//! row. Which reviewers land where depends only on who is present:
//!
//! | checker | noter | approver | slot 2     | slot 3      | second row  |
//! |---------|-------|----------|------------|-------------|-------------|
//! | -       | -     | -        | empty      | empty       | -           |
//! | yes     | -     | -        | Checked by | empty       | -           |
//! | -       | yes   | -        | empty      | Noted by    | -           |
//! | -       | -     | yes      | empty      | Approved by | -           |
//! | -       | yes   | yes      | empty      | Noted by    | Approved by |
//! | yes     | yes   | yes      | Checked by | Noted by    | Approved by |
//!
//! Slot 1 is always the submitting teacher.

use crate::document::LessonMeta;
use crate::form::{Signatory, SignatoryRole};

use super::escape_html;

/// Position printed under the teacher when none was entered.
pub const DEFAULT_TEACHER_POSITION: &str = "Teacher";

/// Caption for the submitting teacher.
pub const SUBMITTED_CAPTION: &str = "Submitted by:";

/// One filled signature slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    pub caption: &'static str,
    pub name: String,
    pub position: String,
}

impl SignatureBlock {
    fn for_role(role: SignatoryRole, signatory: Signatory) -> Self {
        Self {
            caption: role.caption(),
            name: signatory.name,
            position: signatory.position,
        }
    }
}

/// Resolved placement of every signatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatoryLayout {
    /// Top row; `None` renders as an empty cell.
    pub top: [Option<SignatureBlock>; 3],
    /// Centered second row.
    pub centered: Option<SignatureBlock>,
}

/// Apply the placement rules to a document's metadata.
pub fn layout(meta: &LessonMeta) -> SignatoryLayout {
    let checker = Some(meta.checker()).filter(Signatory::is_present);
    let noter = Some(meta.noter()).filter(Signatory::is_present);
    let approver = Some(meta.approver()).filter(Signatory::is_present);

    let position = if meta.teacher_position.trim().is_empty() {
        DEFAULT_TEACHER_POSITION.to_string()
    } else {
        meta.teacher_position.clone()
    };
    let submitted = SignatureBlock {
        caption: SUBMITTED_CAPTION,
        name: meta.teacher.clone(),
        position,
    };

    let checked = checker.map(|s| SignatureBlock::for_role(SignatoryRole::Checker, s));

    let (third, centered) = match (noter, approver) {
        (Some(n), Some(a)) => (
            Some(SignatureBlock::for_role(SignatoryRole::Noter, n)),
            Some(SignatureBlock::for_role(SignatoryRole::Approver, a)),
        ),
        (Some(n), None) => (Some(SignatureBlock::for_role(SignatoryRole::Noter, n)), None),
        (None, Some(a)) => (
            Some(SignatureBlock::for_role(SignatoryRole::Approver, a)),
            None,
        ),
        (None, None) => (None, None),
    };

    SignatoryLayout {
        top: [Some(submitted), checked, third],
        centered,
    }
}

fn push_block(out: &mut String, block: &SignatureBlock) {
    out.push_str(&format!(
        "<div class=\"sig-caption\">{}</div>",
        escape_html(block.caption)
    ));
    out.push_str(&format!(
        "<div class=\"sig-name\">{}</div>",
        escape_html(&block.name)
    ));
    out.push_str(&format!(
        "<div class=\"sig-position\">{}</div>",
        escape_html(&block.position)
    ));
}

/// Append the signature block markup. Tables rather than flex boxes so the
/// legacy word-processor export keeps the three-column layout.
pub fn render_signatories(out: &mut String, layout: &SignatoryLayout) {
    out.push_str("<table class=\"signatories\"><tr>");
    for slot in &layout.top {
        out.push_str("<td class=\"signatory\">");
        if let Some(block) = slot {
            push_block(out, block);
        }
        out.push_str("</td>");
    }
    out.push_str("</tr>");

    if let Some(block) = &layout.centered {
        out.push_str("<tr><td class=\"signatory-centered\" colspan=\"3\">");
        push_block(out, block);
        out.push_str("</td></tr>");
    }
    out.push_str("</table>");
}
