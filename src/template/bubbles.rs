use crate::sequence::MessageNode;

/// Separator splitting one authored text into several chat bubbles.
pub const BUBBLE_SEPARATOR: &str = "|||";

/// Splits text on `|||` into ordered bubbles. Pieces are trimmed and empty pieces dropped.
pub fn split_bubbles(text: &str) -> Vec<String> {
    text.split(BUBBLE_SEPARATOR)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// The bubble texts a node produces before template resolution.
///
/// Only display nodes expand; every other kind yields its text as-is (normally empty).
pub fn node_bubbles(node: &MessageNode) -> Vec<String> {
    if node.is_display() {
        split_bubbles(&node.text)
    } else if node.text.is_empty() {
        Vec::new()
    } else {
        vec![node.text.clone()]
    }
}
