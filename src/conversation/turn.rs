use crate::sequence::{MessageId, Sender};
use crate::walker::StopReason;
use serde::Serialize;

/// A position in a conversation: a message of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub sequence_id: String,
    pub message_id: MessageId,
}

impl Cursor {
    pub fn new(sequence_id: impl Into<String>, message_id: MessageId) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            message_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum MessageContent {
    Text(String),
    /// Image reference, with templates resolved.
    Image(String),
}

/// One bubble ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessage {
    pub sequence_id: String,
    /// The authored node this bubble came from. Split bubbles share it.
    pub message_id: MessageId,
    pub sender: Sender,
    pub content: MessageContent,
    pub delay: Option<u64>,
}

impl RenderedMessage {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Image(_) => None,
        }
    }
}

/// A resolved answer the user can pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub index: usize,
    pub text: String,
}

/// What the conversation is waiting for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PendingInput {
    Choice {
        options: Vec<ChoiceOption>,
    },
    Text {
        placeholder: Option<String>,
        store_key: Option<String>,
    },
}

/// The bot output of one step, and how it stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub messages: Vec<RenderedMessage>,
    pub pending: Option<PendingInput>,
    /// The interactive node to answer, set whenever `pending` is.
    pub cursor: Option<Cursor>,
    pub ended: bool,
    pub stop_reason: StopReason,
}

impl Turn {
    pub(super) fn ended(messages: Vec<RenderedMessage>, stop_reason: StopReason) -> Self {
        Self {
            messages,
            pending: None,
            cursor: None,
            ended: true,
            stop_reason,
        }
    }

    pub(super) fn awaiting(
        messages: Vec<RenderedMessage>,
        pending: PendingInput,
        cursor: Cursor,
    ) -> Self {
        Self {
            messages,
            pending: Some(pending),
            cursor: Some(cursor),
            ended: false,
            stop_reason: StopReason::InteractiveMessage,
        }
    }

    /// Texts of the text bubbles, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().filter_map(RenderedMessage::text).collect()
    }
}
