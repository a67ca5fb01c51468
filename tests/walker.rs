//! Tests for graph traversal and its stop conditions.
mod common;
use common::*;
use kaiwa::prelude::*;
use kaiwa::walker::DEFAULT_MAX_DEPTH;

#[cfg(test)]
mod walker_tests {
    use super::*;

    #[test]
    fn test_linear_chain_walks_to_end() {
        let seq = sequence(
            "linear",
            vec![bot_to(1, "one", 2), bot_to(2, "two", 3), MessageNode::bot(3, "three")],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1, 2, 3]);
        assert_eq!(walk.stop_reason, StopReason::EndOfChain);
        assert_eq!(walk.walk_depth, 3);
        assert!(walk.is_valid);
        assert_eq!(walk.stop_message_id, None);
    }

    #[test]
    fn test_sequential_fallback_follows_next_id() {
        let seq = sequence(
            "fallback",
            vec![
                MessageNode::bot(10, "a"),
                MessageNode::bot(11, "b"),
                MessageNode::bot(13, "skipped"),
            ],
        );

        let walk = GraphWalker::new().walk(10, &seq);

        assert_eq!(walk.message_ids(), vec![10, 11]);
        assert_eq!(walk.stop_reason, StopReason::EndOfChain);
    }

    #[test]
    fn test_absent_start_returns_empty_result() {
        let seq = sequence("empty", vec![MessageNode::bot(1, "hi")]);

        let walk = GraphWalker::new().walk(99, &seq);

        assert!(walk.messages.is_empty());
        assert_eq!(walk.stop_reason, StopReason::EndOfChain);
        assert_eq!(walk.walk_depth, 0);
        assert!(walk.is_valid);
    }

    #[test]
    fn test_choice_halts_walk() {
        let seq = sequence(
            "choice",
            vec![
                MessageNode::bot(1, "Question?"),
                choice_node(2, vec![choice_to("Yes", 3)]),
                MessageNode::bot(3, "after"),
            ],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1, 2]);
        assert_eq!(walk.stop_reason, StopReason::InteractiveMessage);
        assert_eq!(walk.stop_message_id, Some(2));
    }

    #[test]
    fn test_text_input_halts_walk() {
        let seq = sequence(
            "input",
            vec![
                MessageNode::new(
                    1,
                    NodeKind::TextInput {
                        store_key: Some("user.name".to_string()),
                        placeholder: None,
                    },
                ),
                MessageNode::bot(2, "never reached"),
            ],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1]);
        assert_eq!(walk.stop_reason, StopReason::InteractiveMessage);
    }

    #[test]
    fn test_sequence_boundary_keeps_display_text() {
        let seq = sequence(
            "boundary",
            vec![
                MessageNode::bot(1, "See you in the next chapter")
                    .with_next(2)
                    .with_target_sequence("chapter_two"),
                MessageNode::bot(2, "not visited"),
            ],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1]);
        assert_eq!(walk.stop_reason, StopReason::SequenceBoundary);
        assert_eq!(walk.stop_message_id, Some(1));
        assert_eq!(walk.target_sequence_id.as_deref(), Some("chapter_two"));
        assert_eq!(walk.messages[0].text, "See you in the next chapter");
    }

    #[test]
    fn test_autoroute_stops_for_orchestrator() {
        let seq = sequence(
            "route",
            vec![
                MessageNode::bot(1, "hi"),
                autoroute_node(2, vec![default_route(3)]),
                MessageNode::bot(3, "after"),
            ],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1, 2]);
        assert_eq!(walk.stop_reason, StopReason::EndOfChain);
        assert_eq!(walk.stop_message_id, Some(2));
    }

    #[test]
    fn test_data_action_nodes_do_not_stop_traversal() {
        let seq = sequence(
            "actions",
            vec![
                MessageNode::bot(1, "hi"),
                data_action_node(2, vec![DataAction::new(DataActionKind::Increment, "count")]),
                MessageNode::bot(3, "bye"),
            ],
        );

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.message_ids(), vec![1, 2, 3]);
        assert_eq!(walk.stop_reason, StopReason::EndOfChain);
    }

    #[test]
    fn test_two_node_cycle_hits_depth_ceiling() {
        let seq = sequence("cycle", vec![bot_to(1, "ping", 2), bot_to(2, "pong", 1)]);

        let walk = GraphWalker::new().walk(1, &seq);

        assert_eq!(walk.walk_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(walk.walk_depth, 50);
        assert_eq!(walk.messages.len(), 50);
        assert_eq!(walk.stop_reason, StopReason::MaxDepthReached);
        assert!(!walk.is_valid);
    }

    #[test]
    fn test_custom_depth_ceiling() {
        let seq = sequence("self_loop", vec![bot_to(1, "again", 1)]);

        let walk = GraphWalker::new().with_max_depth(5).walk(1, &seq);

        assert_eq!(walk.walk_depth, 5);
        assert_eq!(walk.stop_reason, StopReason::MaxDepthReached);
        assert!(!walk.is_valid);
    }

    #[test]
    fn test_walk_is_repeatable() {
        let seq = onboarding();
        let walker = GraphWalker::new();

        let first = walker.walk(1, &seq);
        let second = walker.walk(1, &seq);

        assert_eq!(first, second);
        assert_eq!(first.message_ids(), vec![1, 2, 3]);
    }
}
