mod common;
use common::*;
use kaiwa::prelude::*;

fn eval(condition: &str, store: &InMemoryStore) -> bool {
    tokio_test::block_on(ConditionEvaluator::new().evaluate(condition, store))
}

fn streak(n: i64) -> InMemoryStore {
    InMemoryStore::with_values([("user.streak", n)])
}

#[cfg(test)]
mod condition_tests {
    use super::*;

    #[test]
    fn test_threshold_comparison() {
        assert!(eval("user.streak >= 7", &streak(7)));
        assert!(eval("user.streak >= 7", &streak(8)));
        assert!(!eval("user.streak >= 7", &streak(6)));
    }

    #[test]
    fn test_missing_variable_is_false() {
        let store = InMemoryStore::new();
        assert!(!eval("user.streak >= 7", &store));
        assert!(!eval("user.streak < 7", &store));
        assert!(eval("user.streak == null", &store));
    }

    #[test]
    fn test_numeric_strings_compare_as_numbers() {
        let store = InMemoryStore::with_values([("user.streak", "10")]);
        assert!(eval("user.streak > 9", &store));
        assert!(eval("user.streak == 10", &store));
    }

    #[test]
    fn test_string_equality() {
        let store = InMemoryStore::with_values([("user.plan", "pro")]);
        assert!(eval("user.plan == 'pro'", &store));
        assert!(eval("user.plan == \"pro\"", &store));
        assert!(eval("user.plan != 'free'", &store));
        assert!(!eval("user.plan == 'free'", &store));
    }

    #[test]
    fn test_ordering_on_mismatched_types_is_false() {
        let store = InMemoryStore::with_values([("user.plan", "pro")]);
        assert!(!eval("user.plan > 3", &store));
        assert!(!eval("user.plan <= 3", &store));
    }

    #[test]
    fn test_logical_operators_and_grouping() {
        let store = InMemoryStore::with_values([
            ("user.streak", Value::from(8)),
            ("user.plan", Value::from("free")),
            ("user.premium", Value::from(false)),
        ]);

        assert!(eval("user.streak >= 7 && user.plan == 'free'", &store));
        assert!(eval("user.streak > 100 || user.plan == 'free'", &store));
        assert!(eval("user.streak >= 7 and user.plan == 'free'", &store));
        assert!(eval("!user.premium", &store));
        assert!(eval("!(user.streak < 7 || user.premium)", &store));
        assert!(!eval("(user.streak > 100 || user.premium) && user.plan == 'free'", &store));
    }

    #[test]
    fn test_contains_on_lists_and_strings() {
        let store = InMemoryStore::with_values([
            ("user.tags", Value::from(vec![Value::from("sleep"), Value::from("move")])),
            ("user.bio", Value::from("early riser")),
            ("user.streak", Value::from(3)),
        ]);

        assert!(eval("user.tags contains 'sleep'", &store));
        assert!(!eval("user.tags contains 'diet'", &store));
        assert!(eval("user.bio contains 'riser'", &store));
        // Not a container.
        assert!(!eval("user.streak contains 3", &store));
    }

    #[test]
    fn test_malformed_conditions_evaluate_false() {
        let store = streak(8);
        for condition in ["", "user.streak >=", "(user.streak > 1", "user.name == 'open", "&& 1"] {
            assert!(!eval(condition, &store), "'{}' should be false", condition);
        }
    }

    #[test]
    fn test_parse_errors_are_reported_by_trace() {
        let store = InMemoryStore::new();
        let evaluator = ConditionEvaluator::new();

        let empty = tokio_test::block_on(evaluator.evaluate_with_trace("   ", &store));
        assert_eq!(empty, Err(ConditionError::Empty));

        let unterminated = tokio_test::block_on(evaluator.evaluate_with_trace("a == 'x", &store));
        assert!(matches!(
            unterminated,
            Err(ConditionError::UnterminatedString(5))
        ));
    }

    #[test]
    fn test_traces_are_comparable() {
        let store = streak(8);
        let evaluator = ConditionEvaluator::new();

        let first = tokio_test::block_on(evaluator.evaluate_with_trace("user.streak >= 7", &store));
        let second = tokio_test::block_on(evaluator.evaluate_with_trace("user.streak >= 7", &store));

        assert!(first.is_ok());
        assert_eq!(first, second);
    }

    #[test]
    fn test_condition_cache_is_bounded() {
        let store = InMemoryStore::new();
        let evaluator = ConditionEvaluator::new();

        for n in 0..AST_CACHE_LIMIT + 10 {
            tokio_test::block_on(evaluator.evaluate(&format!("user.streak >= {}", n), &store));
        }

        assert!(evaluator.cached_conditions() <= AST_CACHE_LIMIT);
        assert!(evaluator.cached_conditions() > 0);
    }

    #[test]
    fn test_contains_on_number_is_type_mismatch() {
        let store = streak(3);
        let result = tokio_test::block_on(
            ConditionEvaluator::new().evaluate_with_trace("user.streak contains 3", &store),
        );
        assert!(matches!(result, Err(ConditionError::TypeMismatch { .. })));
    }

    #[test]
    fn test_trace_explains_decision() {
        let store = streak(8);
        let trace = tokio_test::block_on(
            ConditionEvaluator::new().evaluate_with_trace("user.streak >= 7", &store),
        )
        .unwrap();

        assert_eq!(trace.get_outcome(), Value::Bool(true));
        assert_eq!(
            TraceFormatter::format_trace(&trace),
            "user.streak (was 8) >= 7"
        );
    }

    #[test]
    fn test_store_failure_evaluates_false() {
        let evaluator = ConditionEvaluator::new();
        assert!(!tokio_test::block_on(
            evaluator.evaluate("user.streak >= 7", &FailingStore)
        ));
        assert!(tokio_test::block_on(
            evaluator.evaluate("user.streak == null", &FailingStore)
        ));
    }

    #[test]
    fn test_evaluation_does_not_mutate_store() {
        let store = streak(8);
        eval("user.streak >= 7 && user.missing == null", &store);

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("user.streak"), Some(&Value::Number(8.0)));
    }
}

#[cfg(test)]
mod route_tests {
    use super::*;

    fn routes() -> Vec<Route> {
        vec![
            route_if("user.streak >= 30", 10),
            route_if("user.streak >= 7", 20),
            default_route(30),
        ]
    }

    #[test]
    fn test_first_matching_route_wins() {
        let routes = routes();
        let evaluator = ConditionEvaluator::new();

        let decision =
            tokio_test::block_on(evaluator.resolve_route(&routes, &streak(40))).unwrap();
        assert_eq!(decision.index, 0);
        assert_eq!(decision.route.next_message_id, Some(10));

        let decision =
            tokio_test::block_on(evaluator.resolve_route(&routes, &streak(8))).unwrap();
        assert_eq!(decision.index, 1);
        assert_eq!(decision.reason, "user.streak (was 8) >= 7");
    }

    #[test]
    fn test_default_route_is_fallback() {
        let routes = routes();
        let decision = tokio_test::block_on(
            ConditionEvaluator::new().resolve_route(&routes, &streak(2)),
        )
        .unwrap();

        assert_eq!(decision.index, 2);
        assert_eq!(decision.route.next_message_id, Some(30));
        assert_eq!(decision.reason, "default route");
    }

    #[test]
    fn test_default_route_listed_first_is_still_fallback() {
        let routes = vec![default_route(30), route_if("user.streak >= 7", 20)];
        let decision = tokio_test::block_on(
            ConditionEvaluator::new().resolve_route(&routes, &streak(9)),
        )
        .unwrap();

        assert_eq!(decision.index, 1);
    }

    #[test]
    fn test_no_match_without_default() {
        let routes = vec![route_if("user.streak >= 7", 20), route_if("user.streak ==", 21)];
        let decision = tokio_test::block_on(
            ConditionEvaluator::new().resolve_route(&routes, &streak(1)),
        );

        assert!(decision.is_none());
    }

    #[test]
    fn test_routes_resolve_against_failing_store() {
        let routes = routes();
        let decision = tokio_test::block_on(
            ConditionEvaluator::new().resolve_route(&routes, &FailingStore),
        )
        .unwrap();

        assert_eq!(decision.index, 2);
    }
}

#[cfg(test)]
mod parsing_tests {
    use super::*;
    use kaiwa::condition::parse_condition;

    #[test]
    fn test_parses_precedence() {
        let expression = parse_condition("a == 1 || b > 2 && !c").unwrap();
        let Expression::Or(left, right) = expression else {
            panic!("expected || at the root");
        };
        assert!(matches!(*left, Expression::Equal(..)));
        assert!(matches!(*right, Expression::And(..)));
    }

    #[test]
    fn test_parses_literals() {
        assert_eq!(
            parse_condition("flag == true").unwrap(),
            Expression::Equal(
                Box::new(Expression::Variable("flag".to_string())),
                Box::new(Expression::Literal(Value::Bool(true))),
            )
        );
        assert_eq!(
            parse_condition("score > -2.5").unwrap(),
            Expression::GreaterThan(
                Box::new(Expression::Variable("score".to_string())),
                Box::new(Expression::Literal(Value::Number(-2.5))),
            )
        );
    }

    #[test]
    fn test_rejects_excessive_nesting() {
        let deep = format!("{}a{}", "(".repeat(40), ")".repeat(40));
        assert!(matches!(
            parse_condition(&deep),
            Err(ConditionError::TooDeep(_))
        ));
    }
}
