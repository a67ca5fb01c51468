use super::definition::*;
use crate::ast::{Payload, Value};
use crate::error::SequenceLoadError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A trait for source formats that can be converted into a kaiwa `Sequence`.
///
/// The JSON authoring format implements it through `RawSequence`. Other formats
/// (YAML exports, authoring-tool dumps) plug in by implementing it on their own
/// structs.
pub trait IntoSequence {
    /// Consumes the object and converts it into a canonical sequence.
    fn into_sequence(self) -> Result<Sequence, SequenceLoadError>;
}

// --- JSON Deserialization Structs (authoring format) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSequence {
    #[serde(default)]
    pub sequence_id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: MessageId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub text: Option<String>,
    pub choices: Option<Vec<RawChoice>>,
    pub routes: Option<Vec<RawRoute>>,
    pub data_actions: Option<Vec<RawDataAction>>,
    pub next_message_id: Option<MessageId>,
    #[serde(alias = "targetSequenceId")]
    pub sequence_id: Option<String>,
    pub store_key: Option<String>,
    pub delay: Option<u64>,
    #[serde(alias = "image", alias = "imageUrl")]
    pub image_path: Option<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChoice {
    #[serde(default)]
    pub text: String,
    pub next_message_id: Option<MessageId>,
    #[serde(alias = "targetSequenceId")]
    pub sequence_id: Option<String>,
    pub value: Option<serde_json::Value>,
    pub content_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoute {
    pub condition: Option<String>,
    pub next_message_id: Option<MessageId>,
    #[serde(alias = "targetSequenceId")]
    pub sequence_id: Option<String>,
    #[serde(default, alias = "isDefault")]
    pub default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub key: String,
    pub value: Option<serde_json::Value>,
    pub event: Option<String>,
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

// --- Converter Implementation ---

impl IntoSequence for RawSequence {
    fn into_sequence(self) -> Result<Sequence, SequenceLoadError> {
        let messages = self
            .messages
            .into_iter()
            .map(RawMessage::into_node)
            .collect::<Result<Vec<_>, _>>()?;

        let sequence = Sequence::new(self.sequence_id, self.name, messages);
        Ok(match self.description {
            Some(description) => sequence.with_description(description),
            None => sequence,
        })
    }
}

impl RawMessage {
    fn into_node(self) -> Result<MessageNode, SequenceLoadError> {
        let mut ignored = Vec::new();
        let id = self.id;
        let has_placeholder = self.placeholder.is_some();

        let kind = match self.node_type.as_str() {
            "bot" | "user" => {
                note_present(&mut ignored, "choices", has_items(&self.choices));
                note_present(&mut ignored, "routes", has_items(&self.routes));
                note_present(&mut ignored, "dataActions", has_items(&self.data_actions));
                note_present(&mut ignored, "storeKey", self.store_key.is_some());
                note_present(&mut ignored, "imagePath", self.image_path.is_some());
                let sender = if self.node_type == "bot" {
                    Sender::Bot
                } else {
                    Sender::User
                };
                NodeKind::Display { sender }
            }
            "choice" => {
                note_present(&mut ignored, "routes", has_items(&self.routes));
                note_present(&mut ignored, "dataActions", has_items(&self.data_actions));
                note_present(&mut ignored, "imagePath", self.image_path.is_some());
                NodeKind::Choice {
                    choices: self
                        .choices
                        .unwrap_or_default()
                        .into_iter()
                        .map(RawChoice::into_choice)
                        .collect(),
                    store_key: self.store_key,
                }
            }
            "textInput" => {
                note_present(&mut ignored, "choices", has_items(&self.choices));
                note_present(&mut ignored, "routes", has_items(&self.routes));
                note_present(&mut ignored, "dataActions", has_items(&self.data_actions));
                note_present(&mut ignored, "imagePath", self.image_path.is_some());
                NodeKind::TextInput {
                    store_key: self.store_key,
                    placeholder: self.placeholder,
                }
            }
            "autoroute" => {
                note_present(&mut ignored, "choices", has_items(&self.choices));
                note_present(&mut ignored, "dataActions", has_items(&self.data_actions));
                note_present(&mut ignored, "storeKey", self.store_key.is_some());
                note_present(&mut ignored, "imagePath", self.image_path.is_some());
                NodeKind::Autoroute {
                    routes: self
                        .routes
                        .unwrap_or_default()
                        .into_iter()
                        .map(RawRoute::into_route)
                        .collect(),
                }
            }
            "dataAction" => {
                note_present(&mut ignored, "choices", has_items(&self.choices));
                note_present(&mut ignored, "routes", has_items(&self.routes));
                note_present(&mut ignored, "storeKey", self.store_key.is_some());
                note_present(&mut ignored, "imagePath", self.image_path.is_some());
                let actions = self
                    .data_actions
                    .unwrap_or_default()
                    .into_iter()
                    .map(|raw| raw.into_action(id))
                    .collect::<Result<Vec<_>, _>>()?;
                NodeKind::DataAction { actions }
            }
            "image" => {
                note_present(&mut ignored, "choices", has_items(&self.choices));
                note_present(&mut ignored, "routes", has_items(&self.routes));
                note_present(&mut ignored, "dataActions", has_items(&self.data_actions));
                note_present(&mut ignored, "storeKey", self.store_key.is_some());
                NodeKind::Image {
                    image_path: self.image_path,
                }
            }
            other => {
                return Err(SequenceLoadError::UnknownNodeType {
                    message_id: id,
                    type_name: other.to_string(),
                });
            }
        };

        if has_placeholder && !matches!(kind, NodeKind::TextInput { .. }) {
            ignored.push("placeholder".to_string());
        }

        Ok(MessageNode {
            id,
            kind,
            text: self.text.unwrap_or_default(),
            next_message_id: self.next_message_id,
            target_sequence_id: self.sequence_id,
            delay: self.delay,
            ignored_fields: ignored,
        })
    }
}

impl RawChoice {
    fn into_choice(self) -> Choice {
        Choice {
            text: self.text,
            next_message_id: self.next_message_id,
            target_sequence_id: self.sequence_id,
            value: self.value.map(Value::from),
            content_key: self.content_key,
        }
    }
}

impl RawRoute {
    fn into_route(self) -> Route {
        Route {
            condition: self.condition,
            next_message_id: self.next_message_id,
            target_sequence_id: self.sequence_id,
            is_default: self.default,
        }
    }
}

impl RawDataAction {
    fn into_action(self, message_id: MessageId) -> Result<DataAction, SequenceLoadError> {
        let kind = DataActionKind::from_name(&self.action_type).ok_or_else(|| {
            SequenceLoadError::UnknownActionType {
                message_id,
                type_name: self.action_type.clone(),
            }
        })?;
        let data = self.data.map(|map| {
            map.into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect::<Payload>()
        });
        Ok(DataAction {
            kind,
            key: self.key,
            value: self.value.map(Value::from),
            event: self.event,
            data,
        })
    }
}

fn has_items<T>(items: &Option<Vec<T>>) -> bool {
    items.as_ref().is_some_and(|v| !v.is_empty())
}

fn note_present(ignored: &mut Vec<String>, field: &str, present: bool) {
    if present {
        ignored.push(field.to_string());
    }
}

impl Sequence {
    /// Parses a sequence from its JSON authoring format.
    pub fn from_json(json: &str) -> Result<Self, SequenceLoadError> {
        let raw: RawSequence = serde_json::from_str(json)
            .map_err(|e| SequenceLoadError::JsonParseError(e.to_string()))?;
        raw.into_sequence()
    }

    /// Loads a sequence from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SequenceLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SequenceLoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            SequenceLoadError::JsonParseError(message) => {
                SequenceLoadError::JsonParseError(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }
}
