//! Common test utilities for building sequences and stores.
use async_trait::async_trait;
use kaiwa::prelude::*;

/// Two sequences exercising every node kind.
///
/// `onboarding`: greeting (two bubbles) -> data actions -> choice -> text input
/// -> autoroute on `user.goal` -> hand-off to `daily_checkin`.
#[allow(dead_code)]
pub const ONBOARDING_JSON: &str = r#"{
  "sequenceId": "onboarding",
  "name": "Onboarding",
  "description": "First-run conversation",
  "messages": [
    { "id": 1, "type": "bot", "text": "Hi {user.name|there}!|||Welcome to Kaiwa.", "delay": 300 },
    { "id": 2, "type": "dataAction", "dataActions": [
        { "type": "increment", "key": "user.visits" },
        { "type": "trigger", "event": "onboarding_started", "data": { "step": 1 } }
    ] },
    { "id": 3, "type": "choice", "storeKey": "user.goal", "choices": [
        { "text": "Sleep better", "value": "sleep", "nextMessageId": 4 },
        { "text": "Move more", "value": "move", "nextMessageId": 5 }
    ] },
    { "id": 4, "type": "bot", "text": "Sleep it is.", "nextMessageId": 6 },
    { "id": 5, "type": "bot", "text": "Let's get moving.", "nextMessageId": 6 },
    { "id": 6, "type": "textInput", "storeKey": "user.name", "placeholder": "Your name", "nextMessageId": 7 },
    { "id": 7, "type": "autoroute", "routes": [
        { "condition": "user.goal == 'sleep'", "nextMessageId": 8 },
        { "default": true, "sequenceId": "daily_checkin" }
    ] },
    { "id": 8, "type": "bot", "text": "Good night, {user.name}.", "sequenceId": "daily_checkin" }
  ]
}"#;

/// Streak check-in: greeting -> autoroute on `user.streak` -> data action -> mood input.
#[allow(dead_code)]
pub const DAILY_CHECKIN_JSON: &str = r#"{
  "sequenceId": "daily_checkin",
  "name": "Daily check-in",
  "messages": [
    { "id": 1, "type": "bot", "text": "Day {user.streak|1} of your streak." },
    { "id": 2, "type": "autoroute", "routes": [
        { "condition": "user.streak >= 7", "nextMessageId": 3 },
        { "isDefault": true, "nextMessageId": 4 }
    ] },
    { "id": 3, "type": "bot", "text": "A whole week!", "nextMessageId": 5 },
    { "id": 4, "type": "bot", "text": "Keep going.", "nextMessageId": 5 },
    { "id": 5, "type": "dataAction", "dataActions": [ { "type": "increment", "key": "user.streak" } ] },
    { "id": 6, "type": "textInput", "storeKey": "checkin.mood" }
  ]
}"#;

/// A sequence with many authoring mistakes, one or more per node.
#[allow(dead_code)]
pub const BROKEN_JSON: &str = r#"{
  "sequenceId": "broken",
  "name": "",
  "messages": [
    { "id": 1, "type": "bot", "text": "Hello {user.name", "nextMessageId": 2 },
    { "id": 2, "type": "choice", "text": "Pick one", "choices": [
        { "text": "Go", "nextMessageId": 42 },
        { "text": "", "nextMessageId": 3, "sequenceId": "elsewhere" },
        { "text": "Nowhere" }
    ] },
    { "id": 3, "type": "autoroute", "delay": 500, "routes": [
        { "condition": "user.streak", "nextMessageId": 4 },
        { "nextMessageId": 4 }
    ] },
    { "id": 4, "type": "image", "choices": [ { "text": "x", "nextMessageId": 1 } ] },
    { "id": 9, "type": "bot", "text": "Orphan" }
  ]
}"#;

#[allow(dead_code)]
pub fn onboarding() -> Sequence {
    Sequence::from_json(ONBOARDING_JSON).expect("onboarding fixture must parse")
}

#[allow(dead_code)]
pub fn daily_checkin() -> Sequence {
    Sequence::from_json(DAILY_CHECKIN_JSON).expect("daily_checkin fixture must parse")
}

#[allow(dead_code)]
pub fn catalog() -> SequenceCatalog {
    SequenceCatalog::from_sequences([onboarding(), daily_checkin()])
        .expect("fixture sequence ids are unique")
}

/// Builds a sequence from nodes.
#[allow(dead_code)]
pub fn sequence(id: &str, messages: Vec<MessageNode>) -> Sequence {
    Sequence::new(id, format!("{} sequence", id), messages)
}

/// A bot message with an explicit next id.
#[allow(dead_code)]
pub fn bot_to(id: MessageId, text: &str, next: MessageId) -> MessageNode {
    MessageNode::bot(id, text).with_next(next)
}

#[allow(dead_code)]
pub fn choice_node(id: MessageId, choices: Vec<Choice>) -> MessageNode {
    MessageNode::new(
        id,
        NodeKind::Choice {
            choices,
            store_key: None,
        },
    )
}

#[allow(dead_code)]
pub fn choice_to(text: &str, next: MessageId) -> Choice {
    Choice {
        text: text.to_string(),
        next_message_id: Some(next),
        ..Choice::default()
    }
}

#[allow(dead_code)]
pub fn autoroute_node(id: MessageId, routes: Vec<Route>) -> MessageNode {
    MessageNode::new(id, NodeKind::Autoroute { routes })
}

#[allow(dead_code)]
pub fn route_if(condition: &str, next: MessageId) -> Route {
    Route {
        condition: Some(condition.to_string()),
        next_message_id: Some(next),
        ..Route::default()
    }
}

#[allow(dead_code)]
pub fn default_route(next: MessageId) -> Route {
    Route {
        next_message_id: Some(next),
        is_default: true,
        ..Route::default()
    }
}

#[allow(dead_code)]
pub fn data_action_node(id: MessageId, actions: Vec<DataAction>) -> MessageNode {
    MessageNode::new(id, NodeKind::DataAction { actions })
}

/// A store whose every call fails.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl VariableStore for FailingStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<Value>, StoreError> {
        Err(StoreError::Backend {
            key: key.to_string(),
            message: "offline".to_string(),
        })
    }

    async fn set(&self, key: &str, _value: Value) -> std::result::Result<(), StoreError> {
        Err(StoreError::Backend {
            key: key.to_string(),
            message: "offline".to_string(),
        })
    }
}

/// Reads a key from a store, panicking on store errors.
#[allow(dead_code)]
pub fn read(store: &dyn VariableStore, key: &str) -> Option<Value> {
    tokio_test::block_on(store.get(key)).expect("store read failed")
}
