use crate::sequence::{DataActionKind, NodeKind};
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};

pub struct DataActionCheck;

impl ValidationCheck for DataActionCheck {
    fn name(&self) -> &str {
        "data-actions"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut found = Vec::new();

        for node in ctx.sequence.messages() {
            let NodeKind::DataAction { actions } = &node.kind else {
                continue;
            };
            if actions.is_empty() {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::EmptyDataActions,
                        format!("Data action message {} has no actions", node.id),
                    )
                    .at(node.id),
                );
            }

            for (index, action) in actions.iter().enumerate() {
                let number = index + 1;
                match action.kind {
                    DataActionKind::Trigger => {
                        if action.event.as_deref().is_none_or(|e| e.trim().is_empty()) {
                            found.push(
                                Diagnostic::new(
                                    DiagnosticKind::TriggerWithoutEvent,
                                    format!(
                                        "Trigger action {} of message {} names no event and does nothing",
                                        number, node.id
                                    ),
                                )
                                .at(node.id),
                            );
                        }
                    }
                    kind => {
                        if action.key.trim().is_empty() {
                            found.push(
                                Diagnostic::new(
                                    DiagnosticKind::MissingActionKey,
                                    format!(
                                        "{} action {} of message {} has no key",
                                        kind.name(),
                                        number,
                                        node.id
                                    ),
                                )
                                .at(node.id),
                            );
                        }
                    }
                }

                let counts = matches!(
                    action.kind,
                    DataActionKind::Increment | DataActionKind::Decrement
                );
                let non_numeric = action
                    .value
                    .as_ref()
                    .filter(|v| counts && v.as_number().is_none());
                if let Some(value) = non_numeric {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::NonNumericAmount,
                            format!(
                                "{} action {} of message {} uses non-numeric amount '{}'; 1 is used instead",
                                action.kind.name(),
                                number,
                                node.id,
                                value
                            ),
                        )
                        .at(node.id),
                    );
                }
            }
        }

        found
    }
}
