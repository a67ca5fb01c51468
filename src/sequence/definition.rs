use crate::ast::{Payload, Value};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a message node, unique within its sequence.
pub type MessageId = u32;

/// Who a display message appears to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    Bot,
    User,
}

/// A single authored node in a conversation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: MessageId,
    pub kind: NodeKind,
    /// Display text. Kept for every kind so misuse on non-display nodes can be reported.
    pub text: String,
    pub next_message_id: Option<MessageId>,
    pub target_sequence_id: Option<String>,
    /// Milliseconds to wait before showing the message.
    pub delay: Option<u64>,
    /// Authored fields that this node's kind does not use.
    pub ignored_fields: Vec<String>,
}

/// The kind of a node, carrying only the fields meaningful to that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Display {
        sender: Sender,
    },
    Choice {
        choices: Vec<Choice>,
        store_key: Option<String>,
    },
    TextInput {
        store_key: Option<String>,
        placeholder: Option<String>,
    },
    Autoroute {
        routes: Vec<Route>,
    },
    DataAction {
        actions: Vec<DataAction>,
    },
    Image {
        image_path: Option<String>,
    },
}

impl NodeKind {
    /// The authoring name of the kind, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Display { .. } => "display",
            NodeKind::Choice { .. } => "choice",
            NodeKind::TextInput { .. } => "textInput",
            NodeKind::Autoroute { .. } => "autoroute",
            NodeKind::DataAction { .. } => "dataAction",
            NodeKind::Image { .. } => "image",
        }
    }
}

/// One selectable answer of a choice node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next_message_id: Option<MessageId>,
    pub target_sequence_id: Option<String>,
    pub value: Option<Value>,
    pub content_key: Option<String>,
}

impl Choice {
    pub fn has_destination(&self) -> bool {
        self.next_message_id.is_some() || self.target_sequence_id.is_some()
    }
}

/// One conditional arm of an autoroute node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub condition: Option<String>,
    pub next_message_id: Option<MessageId>,
    pub target_sequence_id: Option<String>,
    pub is_default: bool,
}

impl Route {
    pub fn has_destination(&self) -> bool {
        self.next_message_id.is_some() || self.target_sequence_id.is_some()
    }
}

/// The mutation performed by a data action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataActionKind {
    Set,
    Increment,
    Decrement,
    Reset,
    Trigger,
    Append,
    Remove,
}

impl DataActionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "set" => Some(Self::Set),
            "increment" => Some(Self::Increment),
            "decrement" => Some(Self::Decrement),
            "reset" => Some(Self::Reset),
            "trigger" => Some(Self::Trigger),
            "append" => Some(Self::Append),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::Reset => "reset",
            Self::Trigger => "trigger",
            Self::Append => "append",
            Self::Remove => "remove",
        }
    }
}

/// A typed mutation of the variable store, or an event trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAction {
    pub kind: DataActionKind,
    pub key: String,
    pub value: Option<Value>,
    pub event: Option<String>,
    pub data: Option<Payload>,
}

impl DataAction {
    pub fn new(kind: DataActionKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            value: None,
            event: None,
            data: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>, data: Option<Payload>) -> Self {
        self.event = Some(event.into());
        self.data = data;
        self
    }
}

impl MessageNode {
    pub fn new(id: MessageId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            text: String::new(),
            next_message_id: None,
            target_sequence_id: None,
            delay: None,
            ignored_fields: Vec::new(),
        }
    }

    pub fn bot(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Display { sender: Sender::Bot }).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_next(mut self, next: MessageId) -> Self {
        self.next_message_id = Some(next);
        self
    }

    pub fn with_target_sequence(mut self, sequence_id: impl Into<String>) -> Self {
        self.target_sequence_id = Some(sequence_id.into());
        self
    }

    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Nodes whose text is shown to the user.
    pub fn is_display(&self) -> bool {
        matches!(self.kind, NodeKind::Display { .. })
    }

    /// Nodes the walker pauses at to wait for the user.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Choice { .. } | NodeKind::TextInput { .. }
        )
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            NodeKind::Choice { choices, .. } => choices,
            _ => &[],
        }
    }

    pub fn routes(&self) -> &[Route] {
        match &self.kind {
            NodeKind::Autoroute { routes } => routes,
            _ => &[],
        }
    }

    pub fn store_key(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Choice { store_key, .. } | NodeKind::TextInput { store_key, .. } => {
                store_key.as_deref()
            }
            _ => None,
        }
    }
}

/// One author-defined conversation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    sequence_id: String,
    name: String,
    description: Option<String>,
    messages: Vec<MessageNode>,
    index: AHashMap<MessageId, usize>,
}

impl Sequence {
    /// Builds a sequence. With duplicate ids, lookups resolve to the first occurrence.
    pub fn new(
        sequence_id: impl Into<String>,
        name: impl Into<String>,
        messages: Vec<MessageNode>,
    ) -> Self {
        let mut index = AHashMap::with_capacity(messages.len());
        for (position, node) in messages.iter().enumerate() {
            index.entry(node.id).or_insert(position);
        }
        Self {
            sequence_id: sequence_id.into(),
            name: name.into(),
            description: None,
            messages,
            index,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sequence_id(&self) -> &str {
        &self.sequence_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All nodes in authored order.
    pub fn messages(&self) -> &[MessageNode] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&MessageNode> {
        self.index.get(&id).map(|&position| &self.messages[position])
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.index.contains_key(&id)
    }

    /// The presumed entry point: the lowest message id.
    pub fn entry_id(&self) -> Option<MessageId> {
        self.messages.iter().map(|node| node.id).min()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
