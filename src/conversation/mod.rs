//! The conversation orchestrator.
//!
//! A [`Conversation`] strings the runtime components together: it walks a
//! sequence, applies data actions and renders display nodes in visited order,
//! resolves autoroutes and follows cross-sequence jumps until the walk reaches
//! a node that needs the user, or the chain ends.

use crate::actions::{DataActionProcessor, EventSink};
use crate::ast::Value;
use crate::condition::ConditionEvaluator;
use crate::error::ConversationError;
use crate::sequence::{MessageId, MessageNode, NodeKind, Sender, Sequence, SequenceCatalog};
use crate::store::VariableStore;
use crate::template::{TemplateEngine, split_bubbles};
use crate::walker::{GraphWalker, StopReason};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod turn;

pub use turn::{ChoiceOption, Cursor, MessageContent, PendingInput, RenderedMessage, Turn};

/// Route and sequence hops allowed within one turn.
pub const DEFAULT_MAX_HOPS: usize = 32;

/// Supplies the text behind a choice's `contentKey`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Returns `None` when the key is unknown.
    async fn content(&self, key: &str) -> Option<String>;
}

/// Where a walk should start next.
enum Destination {
    Message(MessageId),
    Sequence(String),
    End,
}

pub struct ConversationBuilder {
    catalog: Arc<SequenceCatalog>,
    store: Arc<dyn VariableStore>,
    walker: GraphWalker,
    templates: TemplateEngine,
    processor: DataActionProcessor,
    content_source: Option<Arc<dyn ContentSource>>,
    max_hops: usize,
}

impl ConversationBuilder {
    pub fn new(catalog: Arc<SequenceCatalog>, store: Arc<dyn VariableStore>) -> Self {
        Self {
            catalog,
            store,
            walker: GraphWalker::new(),
            templates: TemplateEngine::new(),
            processor: DataActionProcessor::new(),
            content_source: None,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.processor = self.processor.with_event_sink(sink);
        self
    }

    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content_source = Some(source);
        self
    }

    pub fn walker(mut self, walker: GraphWalker) -> Self {
        self.walker = walker;
        self
    }

    pub fn template_engine(mut self, templates: TemplateEngine) -> Self {
        self.templates = templates;
        self
    }

    pub fn build(self) -> Conversation {
        Conversation {
            catalog: self.catalog,
            store: self.store,
            walker: self.walker,
            evaluator: ConditionEvaluator::new(),
            templates: self.templates,
            processor: self.processor,
            content_source: self.content_source,
            max_hops: self.max_hops,
        }
    }
}

/// Drives conversations over a catalog of sequences and a shared variable store.
///
/// The conversation itself keeps no position: every turn that waits for input
/// carries a [`Cursor`], which the caller hands back with the user's answer.
pub struct Conversation {
    catalog: Arc<SequenceCatalog>,
    store: Arc<dyn VariableStore>,
    walker: GraphWalker,
    evaluator: ConditionEvaluator,
    templates: TemplateEngine,
    processor: DataActionProcessor,
    content_source: Option<Arc<dyn ContentSource>>,
    max_hops: usize,
}

impl Conversation {
    pub fn builder(
        catalog: Arc<SequenceCatalog>,
        store: Arc<dyn VariableStore>,
    ) -> ConversationBuilder {
        ConversationBuilder::new(catalog, store)
    }

    pub fn catalog(&self) -> &SequenceCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn VariableStore {
        self.store.as_ref()
    }

    /// Starts a sequence at its entry point.
    pub async fn start(&self, sequence_id: &str) -> Result<Turn, ConversationError> {
        self.advance(sequence_id, None).await
    }

    /// Produces the next turn, starting at `start` (or the entry point) of a sequence.
    ///
    /// Fails only when the starting sequence or message does not exist. Broken
    /// references reached later in the turn end the conversation with a warning.
    #[tracing::instrument(skip(self))]
    pub async fn advance(
        &self,
        sequence_id: &str,
        start: Option<MessageId>,
    ) -> Result<Turn, ConversationError> {
        let sequence = self
            .catalog
            .get(sequence_id)
            .ok_or_else(|| ConversationError::UnknownSequence(sequence_id.to_string()))?;
        let start_id = match start {
            Some(id) => id,
            None => sequence.entry_id().ok_or_else(|| ConversationError::UnknownMessage {
                sequence_id: sequence_id.to_string(),
                message_id: 0,
            })?,
        };
        if !sequence.contains(start_id) {
            return Err(ConversationError::UnknownMessage {
                sequence_id: sequence_id.to_string(),
                message_id: start_id,
            });
        }

        self.run(sequence, start_id, Vec::new()).await
    }

    /// Answers a choice node with the option at `index` and continues.
    pub async fn select_choice(
        &self,
        cursor: &Cursor,
        index: usize,
    ) -> Result<Turn, ConversationError> {
        let (sequence, node) = self.locate(cursor)?;
        let NodeKind::Choice { choices, store_key } = &node.kind else {
            return Err(not_awaiting(cursor, "a choice"));
        };
        let choice = choices
            .get(index)
            .ok_or(ConversationError::InvalidChoice {
                message_id: node.id,
                index,
                available: choices.len(),
            })?;
        info!(sequence_id = %cursor.sequence_id, message_id = node.id, choice = index, "Choice selected");

        if let Some(key) = store_key {
            let value = choice
                .value
                .clone()
                .unwrap_or_else(|| Value::String(choice.text.clone()));
            self.store.set(key, value).await?;
        }

        let mut preface = Vec::new();
        if let Some(key) = &choice.content_key {
            self.render_content(key, sequence, node, &mut preface).await;
        }

        let destination = if let Some(target) = &choice.target_sequence_id {
            Destination::Sequence(target.clone())
        } else if let Some(next) = choice.next_message_id {
            Destination::Message(next)
        } else {
            continuation(node, sequence)
        };
        self.follow(sequence, destination, preface).await
    }

    /// Answers a text input node and continues.
    pub async fn submit_text(
        &self,
        cursor: &Cursor,
        text: &str,
    ) -> Result<Turn, ConversationError> {
        let (sequence, node) = self.locate(cursor)?;
        let NodeKind::TextInput { store_key, .. } = &node.kind else {
            return Err(not_awaiting(cursor, "text input"));
        };
        info!(sequence_id = %cursor.sequence_id, message_id = node.id, "Text submitted");

        if let Some(key) = store_key {
            self.store.set(key, Value::String(text.to_string())).await?;
        }
        self.follow(sequence, continuation(node, sequence), Vec::new())
            .await
    }

    fn locate(&self, cursor: &Cursor) -> Result<(&Sequence, &MessageNode), ConversationError> {
        let sequence = self
            .catalog
            .get(&cursor.sequence_id)
            .ok_or_else(|| ConversationError::UnknownSequence(cursor.sequence_id.clone()))?;
        let node = sequence
            .get(cursor.message_id)
            .ok_or_else(|| ConversationError::UnknownMessage {
                sequence_id: cursor.sequence_id.clone(),
                message_id: cursor.message_id,
            })?;
        Ok((sequence, node))
    }

    async fn follow(
        &self,
        from: &Sequence,
        destination: Destination,
        messages: Vec<RenderedMessage>,
    ) -> Result<Turn, ConversationError> {
        match destination {
            Destination::Message(id) if from.contains(id) => self.run(from, id, messages).await,
            Destination::Message(id) => {
                warn!(sequence_id = from.sequence_id(), message_id = id, "Destination message does not exist; ending");
                Ok(Turn::ended(messages, StopReason::EndOfChain))
            }
            Destination::Sequence(target) => match self.catalog.get(&target) {
                Some(sequence) => match sequence.entry_id() {
                    Some(entry) => self.run(sequence, entry, messages).await,
                    None => Ok(Turn::ended(messages, StopReason::SequenceBoundary)),
                },
                None => {
                    warn!(target = %target, "Target sequence is not in the catalog; ending");
                    Ok(Turn::ended(messages, StopReason::SequenceBoundary))
                }
            },
            Destination::End => Ok(Turn::ended(messages, StopReason::EndOfChain)),
        }
    }

    /// Walks from a known-good start until input is needed or the chain ends.
    async fn run(
        &self,
        start_sequence: &Sequence,
        start_id: MessageId,
        mut messages: Vec<RenderedMessage>,
    ) -> Result<Turn, ConversationError> {
        let mut sequence = start_sequence;
        let mut current = start_id;
        let mut hops = 0;

        loop {
            let walk = self.walker.walk(current, sequence);
            debug!(
                sequence_id = sequence.sequence_id(),
                visited = ?walk.message_ids(),
                stop = ?walk.stop_reason,
                "Walk finished"
            );
            for node in &walk.messages {
                self.process_node(node, sequence, &mut messages).await?;
            }

            let destination = match walk.stop_reason {
                StopReason::InteractiveMessage => {
                    let Some(node) = walk.last() else {
                        return Ok(Turn::ended(messages, StopReason::EndOfChain));
                    };
                    let pending = self.pending_input(node).await;
                    let cursor = Cursor::new(sequence.sequence_id(), node.id);
                    return Ok(Turn::awaiting(messages, pending, cursor));
                }
                StopReason::MaxDepthReached => {
                    warn!(sequence_id = sequence.sequence_id(), "Walk hit the depth ceiling; ending turn");
                    return Ok(Turn::ended(messages, StopReason::MaxDepthReached));
                }
                StopReason::SequenceBoundary => match walk.target_sequence_id {
                    Some(target) => Destination::Sequence(target),
                    None => Destination::End,
                },
                StopReason::EndOfChain => match walk.last() {
                    Some(node) => self.resolve_autoroute(node, sequence).await,
                    None => Destination::End,
                },
            };

            hops += 1;
            if hops > self.max_hops {
                warn!(hops, "Too many route and sequence hops in one turn; ending");
                return Ok(Turn::ended(messages, StopReason::MaxDepthReached));
            }

            match destination {
                Destination::Message(id) if sequence.contains(id) => current = id,
                Destination::Message(id) => {
                    warn!(sequence_id = sequence.sequence_id(), message_id = id, "Route destination does not exist; ending");
                    return Ok(Turn::ended(messages, StopReason::EndOfChain));
                }
                Destination::Sequence(target) => {
                    let Some(next_sequence) = self.catalog.get(&target) else {
                        warn!(target = %target, "Target sequence is not in the catalog; ending");
                        return Ok(Turn::ended(messages, StopReason::SequenceBoundary));
                    };
                    let Some(entry) = next_sequence.entry_id() else {
                        return Ok(Turn::ended(messages, StopReason::SequenceBoundary));
                    };
                    debug!(from = sequence.sequence_id(), to = %target, "Crossing into sequence");
                    sequence = next_sequence;
                    current = entry;
                }
                Destination::End => {
                    return Ok(Turn::ended(messages, StopReason::EndOfChain));
                }
            }
        }
    }

    /// Picks where an autoroute node leads. Any other node ends the chain.
    async fn resolve_autoroute(&self, node: &MessageNode, sequence: &Sequence) -> Destination {
        let NodeKind::Autoroute { routes } = &node.kind else {
            return Destination::End;
        };
        let Some(decision) = self
            .evaluator
            .resolve_route(routes, self.store.as_ref())
            .await
        else {
            warn!(
                message_id = node.id,
                "No route matched and no default route; ending"
            );
            return Destination::End;
        };
        info!(
            sequence_id = sequence.sequence_id(),
            message_id = node.id,
            route = decision.index,
            reason = %decision.reason,
            "Autoroute resolved"
        );
        let route = decision.route;
        if let Some(target) = &route.target_sequence_id {
            Destination::Sequence(target.clone())
        } else if let Some(next) = route.next_message_id {
            Destination::Message(next)
        } else {
            Destination::End
        }
    }

    /// Applies a visited node's effects and renders what it shows.
    async fn process_node(
        &self,
        node: &MessageNode,
        sequence: &Sequence,
        messages: &mut Vec<RenderedMessage>,
    ) -> Result<(), ConversationError> {
        match &node.kind {
            NodeKind::DataAction { actions } => {
                self.processor.apply(actions, self.store.as_ref()).await?;
            }
            NodeKind::Display { sender } => {
                for text in self.templates.expand(node, self.store.as_ref()).await {
                    messages.push(rendered(sequence, node, *sender, MessageContent::Text(text)));
                }
            }
            NodeKind::Image { image_path } => match image_path {
                Some(path) if !path.trim().is_empty() => {
                    let path = self.templates.resolve(path, self.store.as_ref()).await;
                    messages.push(rendered(sequence, node, Sender::Bot, MessageContent::Image(path)));
                }
                _ => warn!(message_id = node.id, "Image message has no image reference; skipping"),
            },
            NodeKind::Choice { .. } | NodeKind::TextInput { .. } | NodeKind::Autoroute { .. } => {}
        }
        Ok(())
    }

    async fn pending_input(&self, node: &MessageNode) -> PendingInput {
        match &node.kind {
            NodeKind::TextInput {
                store_key,
                placeholder,
            } => {
                let placeholder = match placeholder {
                    Some(text) => Some(self.templates.resolve(text, self.store.as_ref()).await),
                    None => None,
                };
                PendingInput::Text {
                    placeholder,
                    store_key: store_key.clone(),
                }
            }
            _ => {
                let mut options = Vec::with_capacity(node.choices().len());
                for (index, choice) in node.choices().iter().enumerate() {
                    options.push(ChoiceOption {
                        index,
                        text: self.templates.resolve(&choice.text, self.store.as_ref()).await,
                    });
                }
                PendingInput::Choice { options }
            }
        }
    }

    async fn render_content(
        &self,
        key: &str,
        sequence: &Sequence,
        node: &MessageNode,
        messages: &mut Vec<RenderedMessage>,
    ) {
        let Some(source) = &self.content_source else {
            debug!(content_key = %key, "No content source registered; skipping choice content");
            return;
        };
        let Some(content) = source.content(key).await else {
            warn!(content_key = %key, "Unknown content key");
            return;
        };
        for piece in split_bubbles(&content) {
            let text = self.templates.resolve(&piece, self.store.as_ref()).await;
            messages.push(rendered(sequence, node, Sender::Bot, MessageContent::Text(text)));
        }
    }
}

/// Where an answered interactive node continues: its explicit next, else `id + 1`.
fn continuation(node: &MessageNode, sequence: &Sequence) -> Destination {
    if let Some(target) = &node.target_sequence_id {
        return Destination::Sequence(target.clone());
    }
    let next = match node.next_message_id {
        Some(next) => Some(next),
        None => node.id.checked_add(1).filter(|id| sequence.contains(*id)),
    };
    match next {
        Some(id) => Destination::Message(id),
        None => Destination::End,
    }
}

fn rendered(
    sequence: &Sequence,
    node: &MessageNode,
    sender: Sender,
    content: MessageContent,
) -> RenderedMessage {
    RenderedMessage {
        sequence_id: sequence.sequence_id().to_string(),
        message_id: node.id,
        sender,
        content,
        delay: node.delay,
    }
}

fn not_awaiting(cursor: &Cursor, expected: &'static str) -> ConversationError {
    ConversationError::NotAwaitingInput {
        sequence_id: cursor.sequence_id.clone(),
        message_id: cursor.message_id,
        expected,
    }
}
