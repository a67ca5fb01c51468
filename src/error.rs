use crate::ast::Value;
use crate::sequence::MessageId;
use thiserror::Error;

/// Errors that can occur while loading and converting authored sequence files.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceLoadError {
    #[error("Failed to parse sequence JSON: {0}")]
    JsonParseError(String),

    #[error("Could not read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Message {message_id} has an unknown node type: '{type_name}'")]
    UnknownNodeType {
        message_id: MessageId,
        type_name: String,
    },

    #[error("Message {message_id} has a data action with an unknown type: '{type_name}'")]
    UnknownActionType {
        message_id: MessageId,
        type_name: String,
    },

    #[error("Sequence '{0}' is defined more than once in the catalog")]
    DuplicateSequence(String),
}

/// Errors raised while tokenizing, parsing or evaluating a route condition.
///
/// These never escape `ConditionEvaluator::evaluate`, which degrades to `false`;
/// they are surfaced through `evaluate_with_trace` for tooling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Condition is empty")]
    Empty,

    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Unexpected '{found}' at position {position}: expected {expected}")]
    UnexpectedToken {
        found: String,
        position: usize,
        expected: String,
    },

    #[error("Condition ended unexpectedly: expected {0}")]
    UnexpectedEnd(String),

    #[error("Condition nests deeper than {0} levels")]
    TooDeep(usize),

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },
}

/// Errors reported by a `VariableStore` implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Variable store failed on key '{key}': {message}")]
    Backend { key: String, message: String },

    #[error("Variable store lock was poisoned")]
    Poisoned,
}

/// Errors reported by an `EventSink` when handling a triggered event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerError {
    #[error("Handler for event '{event}' failed: {message}")]
    HandlerFailed { event: String, message: String },
}

/// Errors that can occur while saving or loading a packed sequence catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtifactError {
    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("Catalog artifact has format version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Could not access file '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors returned by the conversation orchestrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversationError {
    #[error("Sequence '{0}' is not in the catalog")]
    UnknownSequence(String),

    #[error("Message {message_id} does not exist in sequence '{sequence_id}'")]
    UnknownMessage {
        sequence_id: String,
        message_id: MessageId,
    },

    #[error("Message {message_id} in '{sequence_id}' is not waiting for {expected}")]
    NotAwaitingInput {
        sequence_id: String,
        message_id: MessageId,
        expected: &'static str,
    },

    #[error("Choice {index} is out of range for message {message_id} ({available} choices)")]
    InvalidChoice {
        message_id: MessageId,
        index: usize,
        available: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
