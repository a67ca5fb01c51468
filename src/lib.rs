//! # Kaiwa - Scripted Dialogue Engine
//!
//! **Kaiwa** interprets author-defined conversation graphs ("sequences"). A
//! sequence is a directed graph of message nodes; at runtime the engine walks
//! the graph to produce one turn of bot output, pauses at nodes that need the
//! user, follows conditional branches, mutates a shared variable store and
//! jumps between sequences.
//!
//! ## Core Workflow
//!
//! 1.  **Load Sequences**: Parse authored JSON with `Sequence::from_json` / `SequenceCatalog::from_dir`,
//!     or implement `IntoSequence` for your own authoring format.
//! 2.  **Validate**: Run `SequenceValidator` over a sequence or a whole catalog to catch
//!     dangling references, dead ends, cycles and malformed nodes before shipping.
//! 3.  **Converse**: Build a `Conversation` over the catalog and a `VariableStore`, then
//!     `start` a sequence and answer each pending input with `select_choice` or `submit_text`.
//!
//! The building blocks (`GraphWalker`, `ConditionEvaluator`, `TemplateEngine`,
//! `DataActionProcessor`) are usable on their own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let catalog = SequenceCatalog::from_dir("sequences")?;
//!
//!     let report = SequenceValidator::new().validate_catalog(&catalog);
//!     for error in &report.errors {
//!         eprintln!("{}", error);
//!     }
//!
//!     let store = Arc::new(InMemoryStore::with_values([("user.name", "Aiko")]));
//!     let conversation = Conversation::builder(Arc::new(catalog), store).build();
//!
//!     let turn = tokio_test::block_on(conversation.start("onboarding"))?;
//!     for text in turn.texts() {
//!         println!("bot: {}", text);
//!     }
//!     if let (Some(PendingInput::Choice { .. }), Some(cursor)) = (&turn.pending, &turn.cursor) {
//!         let next = tokio_test::block_on(conversation.select_choice(cursor, 0))?;
//!         println!("{} more messages", next.messages.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod ast;
pub mod condition;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod sequence;
pub mod store;
pub mod template;
pub mod trace;
pub mod validator;
pub mod walker;
