use crate::sequence::{MessageId, MessageNode};
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};

/// Every message id and, when known, every sequence id a node points at must exist.
pub struct ReferenceCheck;

impl ValidationCheck for ReferenceCheck {
    fn name(&self) -> &str {
        "references"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let sequence = ctx.sequence;
        let mut found = Vec::new();

        let missing = |id: Option<MessageId>| id.filter(|id| !sequence.contains(*id));

        for node in sequence.messages() {
            if let Some(next) = missing(node.next_message_id) {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::InvalidNextMessage,
                        format!(
                            "Message {} continues to message {}, which does not exist",
                            node.id, next
                        ),
                    )
                    .at(node.id),
                );
            }
            for (index, choice) in node.choices().iter().enumerate() {
                if let Some(next) = missing(choice.next_message_id) {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::InvalidChoiceTarget,
                            format!(
                                "Choice {} of message {} points to message {}, which does not exist",
                                index + 1,
                                node.id,
                                next
                            ),
                        )
                        .at(node.id),
                    );
                }
            }
            for (index, route) in node.routes().iter().enumerate() {
                if let Some(next) = missing(route.next_message_id) {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::InvalidRouteTarget,
                            format!(
                                "Route {} of message {} points to message {}, which does not exist",
                                index + 1,
                                node.id,
                                next
                            ),
                        )
                        .at(node.id),
                    );
                }
            }

            if let Some(known) = ctx.known_sequences {
                for target in sequence_targets(node) {
                    if !known.contains(target) {
                        found.push(
                            Diagnostic::new(
                                DiagnosticKind::UnknownTargetSequence,
                                format!(
                                    "Message {} jumps to unknown sequence '{}'",
                                    node.id, target
                                ),
                            )
                            .at(node.id),
                        );
                    }
                }
            }
        }

        found
    }
}

/// Every cross-sequence id a node names: its own, its choices' and its routes'.
pub(super) fn sequence_targets(node: &MessageNode) -> impl Iterator<Item = &str> {
    node.target_sequence_id
        .as_deref()
        .into_iter()
        .chain(
            node.choices()
                .iter()
                .filter_map(|c| c.target_sequence_id.as_deref()),
        )
        .chain(
            node.routes()
                .iter()
                .filter_map(|r| r.target_sequence_id.as_deref()),
        )
}
