use super::references::sequence_targets;
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};
use itertools::Itertools;

/// Informational: where a sequence starts and which sequences it hands off to.
pub struct SummaryCheck;

impl ValidationCheck for SummaryCheck {
    fn name(&self) -> &str {
        "summary"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let sequence = ctx.sequence;
        let mut found = Vec::new();

        if let Some(entry) = sequence.entry_id() {
            found.push(
                Diagnostic::new(
                    DiagnosticKind::EntryPoint,
                    format!("Sequence starts at message {}", entry),
                )
                .at(entry),
            );
        }

        for node in sequence.messages() {
            let targets = sequence_targets(node).unique().collect::<Vec<_>>();
            if targets.is_empty() {
                continue;
            }
            found.push(
                Diagnostic::new(
                    DiagnosticKind::ExitPoint,
                    format!(
                        "Message {} hands off to {}",
                        node.id,
                        targets.iter().map(|t| format!("'{}'", t)).join(", ")
                    ),
                )
                .at(node.id),
            );
        }

        found
    }
}
