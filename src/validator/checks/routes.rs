use crate::condition::parse_condition;
use crate::sequence::NodeKind;
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};

const OPERATORS: [&str; 11] = [
    "==", "!=", ">=", "<=", ">", "<", "&&", "||", "!", " contains ", " and ",
];

/// Route lists of autoroute nodes, including a best-effort look at conditions.
pub struct RouteCheck;

impl ValidationCheck for RouteCheck {
    fn name(&self) -> &str {
        "routes"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut found = Vec::new();

        for node in ctx.sequence.messages() {
            let NodeKind::Autoroute { routes } = &node.kind else {
                continue;
            };
            if routes.is_empty() {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::NoRoutes,
                        format!("Autoroute message {} has no routes", node.id),
                    )
                    .at(node.id),
                );
            }

            let defaults = routes.iter().filter(|r| r.is_default).count();
            match defaults {
                0 => found.push(
                    Diagnostic::new(
                        DiagnosticKind::MissingDefaultRoute,
                        format!("Autoroute message {} has no default route", node.id),
                    )
                    .at(node.id),
                ),
                1 => {}
                n => found.push(
                    Diagnostic::new(
                        DiagnosticKind::MultipleDefaultRoutes,
                        format!("Autoroute message {} has {} default routes", node.id, n),
                    )
                    .at(node.id),
                ),
            }

            for (index, route) in routes.iter().enumerate() {
                let number = index + 1;
                if !route.has_destination() {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::RouteMissingDestination,
                            format!(
                                "Route {} of message {} has neither nextMessageId nor sequenceId",
                                number, node.id
                            ),
                        )
                        .at(node.id),
                    );
                }

                let condition = route.condition.as_deref().map(str::trim).unwrap_or("");
                if route.is_default {
                    if !condition.is_empty() {
                        found.push(
                            Diagnostic::new(
                                DiagnosticKind::DefaultRouteCondition,
                                format!(
                                    "Default route {} of message {} has condition '{}', which is ignored",
                                    number, node.id, condition
                                ),
                            )
                            .at(node.id),
                        );
                    }
                    continue;
                }

                if condition.is_empty() {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::RouteMissingCondition,
                            format!(
                                "Route {} of message {} is not the default and has no condition; it never matches",
                                number, node.id
                            ),
                        )
                        .at(node.id),
                    );
                } else if let Some(problem) = condition_problem(condition) {
                    found.push(
                        Diagnostic::new(
                            DiagnosticKind::SuspiciousCondition,
                            format!(
                                "Route {} of message {} has a suspicious condition '{}': {}",
                                number, node.id, condition, problem
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

/// Heuristic first, then the real parser.
fn condition_problem(condition: &str) -> Option<String> {
    if condition.matches('\'').count() % 2 != 0 || condition.matches('"').count() % 2 != 0 {
        return Some("unbalanced quotes".to_string());
    }
    let lowered = condition.to_lowercase();
    if !OPERATORS.iter().any(|op| lowered.contains(op)) {
        return Some("no comparison or logical operator".to_string());
    }
    parse_condition(condition).err().map(|e| e.to_string())
}
