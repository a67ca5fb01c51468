mod common;
use common::*;
use kaiwa::prelude::*;
use std::sync::{Arc, Mutex};

fn apply(processor: &DataActionProcessor, actions: &[DataAction], store: &InMemoryStore) {
    tokio_test::block_on(processor.apply(actions, store)).expect("in-memory store never fails");
}

/// Records every triggered event.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(String, Payload)>>,
}

impl EventSink for RecordingSink {
    fn on_event(&self, event: &str, data: &Payload) -> std::result::Result<(), TriggerError> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), data.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod data_action_tests {
    use super::*;

    #[test]
    fn test_set_overwrites_value_and_type() {
        let store = InMemoryStore::with_values([("user.goal", 3)]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Set, "user.goal").with_value("sleep")],
            &store,
        );
        assert_eq!(read(&store, "user.goal"), Some(Value::from("sleep")));
    }

    #[test]
    fn test_increment_and_decrement() {
        let store = InMemoryStore::new();
        let processor = DataActionProcessor::new();

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Increment, "points").with_value(10)],
            &store,
        );
        assert_eq!(read(&store, "points"), Some(Value::Number(10.0)));

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Decrement, "points")],
            &store,
        );
        assert_eq!(read(&store, "points"), Some(Value::Number(9.0)));
    }

    #[test]
    fn test_increment_treats_non_numeric_current_as_zero() {
        let store = InMemoryStore::with_values([("points", "lots")]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Increment, "points")],
            &store,
        );
        assert_eq!(read(&store, "points"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_increment_coerces_numeric_strings() {
        let store = InMemoryStore::with_values([("points", "4")]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Increment, "points").with_value("2")],
            &store,
        );
        assert_eq!(read(&store, "points"), Some(Value::Number(6.0)));
    }

    #[test]
    fn test_non_numeric_amount_counts_as_one() {
        let store = InMemoryStore::with_values([("points", 5)]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Increment, "points").with_value("many")],
            &store,
        );
        assert_eq!(read(&store, "points"), Some(Value::Number(6.0)));
    }

    #[test]
    fn test_reset_defaults_to_zero() {
        let store = InMemoryStore::with_values([("user.streak", 12)]);
        let processor = DataActionProcessor::new();

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Reset, "user.streak")],
            &store,
        );
        assert_eq!(read(&store, "user.streak"), Some(Value::Number(0.0)));

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Reset, "user.streak").with_value(1)],
            &store,
        );
        assert_eq!(read(&store, "user.streak"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_append_keeps_items_unique() {
        let store = InMemoryStore::new();
        let append = DataAction::new(DataActionKind::Append, "user.tags").with_value("sleep");

        apply(&DataActionProcessor::new(), &[append.clone(), append], &store);

        assert_eq!(
            read(&store, "user.tags"),
            Some(Value::List(vec![Value::from("sleep")]))
        );
    }

    #[test]
    fn test_append_wraps_scalar() {
        let store = InMemoryStore::with_values([("user.tags", "sleep")]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Append, "user.tags").with_value("move")],
            &store,
        );
        assert_eq!(
            read(&store, "user.tags"),
            Some(Value::List(vec![Value::from("sleep"), Value::from("move")]))
        );
    }

    #[test]
    fn test_append_list_value_is_one_item() {
        let store = InMemoryStore::new();
        let pair = Value::List(vec![Value::from("a"), Value::from("b")]);
        let append = DataAction::new(DataActionKind::Append, "user.pairs").with_value(pair.clone());

        apply(&DataActionProcessor::new(), &[append.clone(), append], &store);

        assert_eq!(read(&store, "user.pairs"), Some(Value::List(vec![pair])));
    }

    #[test]
    fn test_remove_first_equal_item() {
        let store = InMemoryStore::with_values([(
            "user.tags",
            Value::List(vec![Value::from("a"), Value::from("b"), Value::from("a")]),
        )]);
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Remove, "user.tags").with_value("a")],
            &store,
        );
        assert_eq!(
            read(&store, "user.tags"),
            Some(Value::List(vec![Value::from("b"), Value::from("a")]))
        );
    }

    #[test]
    fn test_remove_treats_scalar_as_one_item_list() {
        let store = InMemoryStore::with_values([("user.tags", "a")]);
        let processor = DataActionProcessor::new();

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Remove, "user.tags").with_value("b")],
            &store,
        );
        assert_eq!(read(&store, "user.tags"), Some(Value::from("a")));

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Remove, "user.tags").with_value("a")],
            &store,
        );
        assert_eq!(read(&store, "user.tags"), Some(Value::List(Vec::new())));
    }

    #[test]
    fn test_remove_on_absent_key_writes_nothing() {
        let store = InMemoryStore::new();
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Remove, "user.tags").with_value("a")],
            &store,
        );
        assert_eq!(read(&store, "user.tags"), None);
    }

    #[test]
    fn test_actions_apply_in_order() {
        let store = InMemoryStore::new();
        apply(
            &DataActionProcessor::new(),
            &[
                DataAction::new(DataActionKind::Set, "n").with_value(2),
                DataAction::new(DataActionKind::Increment, "n").with_value(3),
                DataAction::new(DataActionKind::Reset, "n"),
                DataAction::new(DataActionKind::Decrement, "n"),
            ],
            &store,
        );
        assert_eq!(read(&store, "n"), Some(Value::Number(-1.0)));
    }

    #[test]
    fn test_store_failure_is_returned() {
        let result = tokio_test::block_on(DataActionProcessor::new().apply(
            &[DataAction::new(DataActionKind::Set, "user.goal").with_value("sleep")],
            &FailingStore,
        ));
        assert!(matches!(result, Err(StoreError::Backend { .. })));
    }
}

#[cfg(test)]
mod trigger_tests {
    use super::*;

    #[test]
    fn test_trigger_calls_sink_with_payload() {
        let sink = Arc::new(RecordingSink::default());
        let processor = DataActionProcessor::new().with_event_sink(sink.clone());
        let mut data = Payload::default();
        data.insert("step".to_string(), Value::from(1));

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Trigger, "").with_event("onboarding_started", Some(data))],
            &InMemoryStore::new(),
        );

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "onboarding_started");
        assert_eq!(events[0].1.get("step"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_trigger_without_event_is_skipped() {
        let sink = Arc::new(RecordingSink::default());
        let processor = DataActionProcessor::new().with_event_sink(sink.clone());

        apply(
            &processor,
            &[DataAction::new(DataActionKind::Trigger, "")],
            &InMemoryStore::new(),
        );

        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failing_handler_does_not_stop_later_actions() {
        let failing = |event: &str, _: &Payload| -> std::result::Result<(), TriggerError> {
            Err(TriggerError::HandlerFailed {
                event: event.to_string(),
                message: "analytics offline".to_string(),
            })
        };
        let processor = DataActionProcessor::new().with_event_sink(Arc::new(failing));
        let store = InMemoryStore::new();

        apply(
            &processor,
            &[
                DataAction::new(DataActionKind::Trigger, "").with_event("ping", None),
                DataAction::new(DataActionKind::Increment, "after"),
            ],
            &store,
        );

        assert_eq!(read(&store, "after"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_trigger_without_sink_is_harmless() {
        let store = InMemoryStore::new();
        apply(
            &DataActionProcessor::new(),
            &[DataAction::new(DataActionKind::Trigger, "").with_event("ping", None)],
            &store,
        );
        assert!(store.snapshot().unwrap().is_empty());
    }
}
