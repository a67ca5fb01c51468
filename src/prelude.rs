//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kaiwa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let sequence = Sequence::from_file("sequences/onboarding.json")?;
//! let report = SequenceValidator::new().validate(&sequence);
//! println!("{} errors, {} warnings", report.errors.len(), report.warnings.len());
//!
//! let walk = GraphWalker::new().walk(1, &sequence);
//! println!("Stopped with {:?} after {} messages", walk.stop_reason, walk.walk_depth);
//! # Ok(())
//! # }
//! ```

// Runtime components
pub use crate::actions::{DataActionProcessor, EventSink};
pub use crate::condition::{AST_CACHE_LIMIT, ConditionEvaluator, RouteDecision};
pub use crate::conversation::{
    ChoiceOption, ContentSource, Conversation, Cursor, MessageContent, PendingInput,
    RenderedMessage, Turn,
};
pub use crate::template::{TemplateEngine, TextFormatter};
pub use crate::walker::{GraphWalker, StopReason, WalkResult};

// Sequence model
pub use crate::sequence::{
    Choice, DataAction, DataActionKind, IntoSequence, MessageId, MessageNode, NodeKind, Route,
    Sender, Sequence, SequenceCatalog,
};

// Values and traces
pub use crate::ast::{EvaluationTrace, Expression, Payload, Value};
pub use crate::trace::TraceFormatter;

// Variable store
pub use crate::store::{InMemoryStore, StoreSeed, VariableStore};

// Validation
pub use crate::validator::{
    Diagnostic, DiagnosticKind, SequenceValidator, Severity, ValidationCheck, ValidationContext,
    ValidationReport,
};

// Error types
pub use crate::error::{
    ArtifactError, ConditionError, ConversationError, SequenceLoadError, StoreError, TriggerError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
