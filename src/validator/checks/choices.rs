use crate::sequence::NodeKind;
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};

pub struct ChoiceCheck;

impl ValidationCheck for ChoiceCheck {
    fn name(&self) -> &str {
        "choices"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut found = Vec::new();

        for node in ctx.sequence.messages() {
            let NodeKind::Choice { choices, .. } = &node.kind else {
                continue;
            };
            if choices.is_empty() {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::NoChoices,
                        format!("Choice message {} offers no choices", node.id),
                    )
                    .at(node.id),
                );
                continue;
            }

            for (index, choice) in choices.iter().enumerate() {
                let number = index + 1;
                if !choice.has_destination() {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::ChoiceMissingDestination,
                            format!(
                                "Choice {} of message {} has neither nextMessageId nor sequenceId",
                                number, node.id
                            ),
                        )
                        .at(node.id),
                    );
                }
                if let (Some(next), Some(target)) =
                    (choice.next_message_id, &choice.target_sequence_id)
                {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::AmbiguousChoiceTarget,
                            format!(
                                "Choice {} of message {} names both message {} and sequence '{}'; only the sequence is followed",
                                number, node.id, next, target
                            ),
                        )
                        .at(node.id),
                    );
                }
                if choice.text.trim().is_empty() {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::EmptyChoiceText,
                            format!("Choice {} of message {} has no label", number, node.id),
                        )
                        .at(node.id),
                    );
                }
            }
        }

        found
    }
}
