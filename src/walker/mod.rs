//! Traversal of a sequence graph for one turn of output.

use crate::sequence::{MessageId, MessageNode, NodeKind, Sequence};
use serde::Serialize;
use tracing::{debug, warn};

/// Walks deeper than this are treated as authoring cycles.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// Reached a choice or text input node that waits for the user.
    InteractiveMessage,
    /// No further node to visit, or an autoroute that the caller must resolve.
    EndOfChain,
    /// Reached a node that jumps to another sequence.
    SequenceBoundary,
    /// Gave up after the depth ceiling.
    MaxDepthReached,
}

/// The nodes visited by one walk, in traversal order, and where it stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkResult<'a> {
    pub messages: Vec<&'a MessageNode>,
    pub stop_reason: StopReason,
    pub stop_message_id: Option<MessageId>,
    pub target_sequence_id: Option<String>,
    pub walk_depth: usize,
    pub is_valid: bool,
}

impl<'a> WalkResult<'a> {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            stop_reason: StopReason::EndOfChain,
            stop_message_id: None,
            target_sequence_id: None,
            walk_depth: 0,
            is_valid: true,
        }
    }

    /// The last visited node, which is the stop node for interactive and boundary stops.
    pub fn last(&self) -> Option<&'a MessageNode> {
        self.messages.last().copied()
    }

    /// Ids of the visited nodes, in order.
    pub fn message_ids(&self) -> Vec<MessageId> {
        self.messages.iter().map(|node| node.id).collect()
    }
}

/// Walks a sequence from a start node to the next interactive, boundary or terminal point.
///
/// The walker never evaluates conditions and never touches the variable store.
/// Autoroute nodes end the walk so the caller can pick a route and walk again
/// from the chosen destination.
#[derive(Debug, Clone, Copy)]
pub struct GraphWalker {
    max_depth: usize,
}

impl Default for GraphWalker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GraphWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[tracing::instrument(skip(self, sequence), fields(sequence_id = sequence.sequence_id()))]
    pub fn walk<'a>(&self, start_id: MessageId, sequence: &'a Sequence) -> WalkResult<'a> {
        let mut result = WalkResult::new();
        let mut current_id = start_id;

        if !sequence.contains(start_id) {
            debug!(start_id, "Start message not found; nothing to walk");
            return result;
        }

        while let Some(node) = sequence.get(current_id) {
            if result.walk_depth >= self.max_depth {
                warn!(
                    depth = result.walk_depth,
                    message_id = current_id,
                    "Walk depth ceiling reached; the sequence likely loops without a pause"
                );
                result.stop_reason = StopReason::MaxDepthReached;
                result.stop_message_id = Some(current_id);
                result.is_valid = false;
                return result;
            }

            result.messages.push(node);
            result.walk_depth += 1;

            if let Some(target) = &node.target_sequence_id {
                result.stop_reason = StopReason::SequenceBoundary;
                result.stop_message_id = Some(node.id);
                result.target_sequence_id = Some(target.clone());
                return result;
            }

            match &node.kind {
                NodeKind::Choice { .. } | NodeKind::TextInput { .. } => {
                    result.stop_reason = StopReason::InteractiveMessage;
                    result.stop_message_id = Some(node.id);
                    return result;
                }
                NodeKind::Autoroute { .. } => {
                    result.stop_reason = StopReason::EndOfChain;
                    result.stop_message_id = Some(node.id);
                    return result;
                }
                NodeKind::Display { .. } | NodeKind::DataAction { .. } | NodeKind::Image { .. } => {
                    current_id = match node.next_message_id {
                        Some(next) => next,
                        None => match node.id.checked_add(1) {
                            Some(next) => next,
                            None => break,
                        },
                    };
                }
            }
        }

        result.stop_reason = StopReason::EndOfChain;
        result
    }
}
