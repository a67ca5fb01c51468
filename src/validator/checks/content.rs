use crate::sequence::{MessageNode, NodeKind};
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};

const IMAGE_FORBIDDEN_FIELDS: [&str; 3] = ["choices", "routes", "dataActions"];

/// Text and field rules per node kind: template braces, text placement,
/// image references, delays and fields the kind ignores.
pub struct ContentCheck;

impl ValidationCheck for ContentCheck {
    fn name(&self) -> &str {
        "content"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut found = Vec::new();

        for node in ctx.sequence.messages() {
            check_braces(node, &mut found);

            if !node.is_display() && !node.text.trim().is_empty() {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::TextOnNonDisplay,
                        format!(
                            "Message {} is a {} node and must not carry text",
                            node.id,
                            node.kind.name()
                        ),
                    )
                    .at(node.id),
                );
            }

            if let NodeKind::Image { image_path } = &node.kind {
                if image_path.as_deref().is_none_or(|p| p.trim().is_empty()) {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::MissingImageReference,
                            format!("Image message {} has no image reference", node.id),
                        )
                        .at(node.id),
                    );
                }
                let carried: Vec<&str> = node
                    .ignored_fields
                    .iter()
                    .map(String::as_str)
                    .filter(|field| IMAGE_FORBIDDEN_FIELDS.contains(field))
                    .collect();
                if !carried.is_empty() {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::ImageWithContent,
                            format!(
                                "Image message {} must not carry {}",
                                node.id,
                                carried.join(", ")
                            ),
                        )
                        .at(node.id),
                    );
                }
            }

            let shows_something =
                matches!(node.kind, NodeKind::Display { .. } | NodeKind::Image { .. });
            if let Some(delay) = node.delay.filter(|d| *d > 0 && !shows_something) {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DelayOnNonDisplay,
                        format!(
                            "Message {} is a {} node; its {}ms delay has no effect",
                            node.id,
                            node.kind.name(),
                            delay
                        ),
                    )
                    .at(node.id),
                );
            }

            for field in &node.ignored_fields {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::IgnoredField,
                        format!(
                            "Field '{}' on {} message {} is ignored",
                            field,
                            node.kind.name(),
                            node.id
                        ),
                    )
                    .at(node.id),
                );
            }
        }

        found
    }
}

fn check_braces(node: &MessageNode, found: &mut Vec<Diagnostic>) {
    let mut texts = vec![("text".to_string(), node.text.as_str())];
    texts.extend(
        node.choices()
            .iter()
            .enumerate()
            .map(|(i, choice)| (format!("choice {} text", i + 1), choice.text.as_str())),
    );

    for (field, text) in texts {
        let opening = text.matches('{').count();
        let closing = text.matches('}').count();
        if opening != closing {
            found.push(
                Diagnostic::new(
                    DiagnosticKind::UnbalancedBraces,
                    format!(
                        "The {} of message {} has {} '{{' but {} '}}'",
                        field, node.id, opening, closing
                    ),
                )
                .at(node.id),
            );
        }
    }
}
