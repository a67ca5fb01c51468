use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};
use ahash::AHashSet;

/// Required sequence fields, at least one node, unique message ids.
pub struct StructureCheck;

impl ValidationCheck for StructureCheck {
    fn name(&self) -> &str {
        "structure"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let sequence = ctx.sequence;
        let mut found = Vec::new();

        if sequence.sequence_id().trim().is_empty() {
            found.push(Diagnostic::new(
                DiagnosticKind::MissingSequenceId,
                "Sequence has no sequenceId",
            ));
        }
        if sequence.name().trim().is_empty() {
            found.push(Diagnostic::new(
                DiagnosticKind::MissingName,
                "Sequence has no name",
            ));
        }
        if sequence.is_empty() {
            found.push(Diagnostic::new(
                DiagnosticKind::EmptySequence,
                "Sequence has no messages",
            ));
        }

        let mut seen = AHashSet::new();
        let mut reported = AHashSet::new();
        for node in sequence.messages() {
            if !seen.insert(node.id) && reported.insert(node.id) {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateMessageId,
                        format!("Message id {} is used more than once", node.id),
                    )
                    .at(node.id),
                );
            }
        }

        found
    }
}
