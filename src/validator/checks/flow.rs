use crate::sequence::{MessageId, MessageNode, NodeKind, Sequence};
use crate::validator::{Diagnostic, DiagnosticKind, ValidationCheck, ValidationContext};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;

/// Reachability from the entry point, dead ends and cycles.
pub struct FlowCheck;

impl ValidationCheck for FlowCheck {
    fn name(&self) -> &str {
        "flow"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let sequence = ctx.sequence;
        let mut found = Vec::new();
        let Some(entry) = sequence.entry_id() else {
            return found;
        };

        let reachable = reachable_from(entry, sequence);
        for id in unique_ids(sequence) {
            if !reachable.contains(&id) {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::UnreachableMessage,
                        format!("Message {} cannot be reached from entry message {}", id, entry),
                    )
                    .at(id),
                );
            }
        }

        for node in unique_nodes(sequence) {
            if is_dead_end(node, sequence) {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DeadEnd,
                        format!(
                            "Message {} has no next message, no message {} follows it, and it leaves to no other sequence",
                            node.id,
                            node.id.saturating_add(1)
                        ),
                    )
                    .at(node.id),
                );
            }
        }

        for cycle in find_cycles(sequence) {
            let path = cycle
                .iter()
                .chain(cycle.first())
                .map(|id| id.to_string())
                .join(" -> ");
            let pause = cycle
                .iter()
                .find(|id| sequence.get(**id).is_some_and(MessageNode::is_interactive));
            let message = match pause {
                Some(id) => format!("Cycle {} (waits for input at message {})", path, id),
                None => format!(
                    "Cycle {} never waits for input; a walk through it stops at the depth ceiling",
                    path
                ),
            };
            found.push(Diagnostic::new(DiagnosticKind::Cycle, message).at(cycle[0]));
        }

        found
    }
}

/// The node a non-branching node continues to: its explicit next, else `id + 1`.
fn continuation(node: &MessageNode, sequence: &Sequence) -> Option<MessageId> {
    let next = match node.next_message_id {
        Some(next) => next,
        None => node.id.checked_add(1)?,
    };
    sequence.contains(next).then_some(next)
}

/// In-sequence successors of a node, following the destination each kind honors.
fn successors(node: &MessageNode, sequence: &Sequence) -> Vec<MessageId> {
    if node.target_sequence_id.is_some() {
        return Vec::new();
    }
    let within = |id: Option<MessageId>| id.filter(|id| sequence.contains(*id));
    match &node.kind {
        NodeKind::Display { .. }
        | NodeKind::DataAction { .. }
        | NodeKind::Image { .. }
        | NodeKind::TextInput { .. } => continuation(node, sequence).into_iter().collect(),
        NodeKind::Choice { choices, .. } => choices
            .iter()
            .filter(|c| c.target_sequence_id.is_none())
            .filter_map(|c| match c.next_message_id {
                Some(next) => within(Some(next)),
                None => continuation(node, sequence),
            })
            .unique()
            .collect(),
        NodeKind::Autoroute { routes } => routes
            .iter()
            .filter(|r| r.target_sequence_id.is_none())
            .filter_map(|r| within(r.next_message_id))
            .unique()
            .collect(),
    }
}

fn is_dead_end(node: &MessageNode, sequence: &Sequence) -> bool {
    if node.target_sequence_id.is_some() || node.next_message_id.is_some() {
        return false;
    }
    match node.kind {
        NodeKind::Choice { .. } | NodeKind::TextInput { .. } | NodeKind::Autoroute { .. } => false,
        NodeKind::Display { .. } | NodeKind::DataAction { .. } | NodeKind::Image { .. } => {
            continuation(node, sequence).is_none()
        }
    }
}

fn unique_nodes(sequence: &Sequence) -> impl Iterator<Item = &MessageNode> {
    sequence.messages().iter().unique_by(|node| node.id)
}

fn unique_ids(sequence: &Sequence) -> Vec<MessageId> {
    unique_nodes(sequence).map(|node| node.id).collect()
}

fn reachable_from(entry: MessageId, sequence: &Sequence) -> AHashSet<MessageId> {
    let mut seen = AHashSet::new();
    let mut queue = VecDeque::from([entry]);
    seen.insert(entry);
    while let Some(id) = queue.pop_front() {
        let Some(node) = sequence.get(id) else {
            continue;
        };
        for next in successors(node, sequence) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnPath,
    Done,
}

struct Frame {
    id: MessageId,
    successors: Vec<MessageId>,
    cursor: usize,
}

impl Frame {
    fn new(id: MessageId, sequence: &Sequence) -> Self {
        let successors = sequence
            .get(id)
            .map(|node| successors(node, sequence))
            .unwrap_or_default();
        Self {
            id,
            successors,
            cursor: 0,
        }
    }
}

/// Finds cycles with an iterative depth-first search.
///
/// The frame stack doubles as the current path, so a back edge to a node on
/// the stack yields the cycle directly. Each cycle is rotated to start at its
/// smallest id and reported once.
fn find_cycles(sequence: &Sequence) -> Vec<Vec<MessageId>> {
    let mut state: AHashMap<MessageId, Visit> = AHashMap::new();
    let mut seen_cycles = AHashSet::new();
    let mut cycles = Vec::new();

    for root in unique_ids(sequence).into_iter().sorted() {
        if state.contains_key(&root) {
            continue;
        }
        state.insert(root, Visit::OnPath);
        let mut stack = vec![Frame::new(root, sequence)];

        while let Some(frame) = stack.last_mut() {
            if frame.cursor >= frame.successors.len() {
                state.insert(frame.id, Visit::Done);
                stack.pop();
                continue;
            }
            let next = frame.successors[frame.cursor];
            frame.cursor += 1;

            match state.get(&next).copied() {
                Some(Visit::OnPath) => {
                    let Some(start) = stack.iter().position(|f| f.id == next) else {
                        continue;
                    };
                    let cycle = normalize_cycle(stack[start..].iter().map(|f| f.id).collect());
                    if seen_cycles.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
                Some(Visit::Done) => {}
                None => {
                    state.insert(next, Visit::OnPath);
                    stack.push(Frame::new(next, sequence));
                }
            }
        }
    }

    cycles
}

fn normalize_cycle(mut cycle: Vec<MessageId>) -> Vec<MessageId> {
    if let Some((min_position, _)) = cycle.iter().enumerate().min_by_key(|(_, id)| **id) {
        cycle.rotate_left(min_position);
    }
    cycle
}
