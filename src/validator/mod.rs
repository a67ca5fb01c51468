//! Static analysis of authored sequences.
//!
//! The validator runs a list of independent [`ValidationCheck`]s over a
//! [`Sequence`] and merges their findings into a [`ValidationReport`]. Checks
//! never short-circuit each other, so a single malformed node can show up in
//! several checks' output. Built-in checks are registered by default; custom
//! checks plug in through [`SequenceValidatorBuilder::with_check`].

use crate::sequence::{Sequence, SequenceCatalog};
use ahash::AHashSet;
use tracing::debug;

mod checks;
pub mod diagnostics;

pub use checks::{
    ChoiceCheck, ContentCheck, DataActionCheck, FlowCheck, ReferenceCheck, RouteCheck,
    StructureCheck, SummaryCheck,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, ValidationReport};

/// What a check gets to look at.
pub struct ValidationContext<'a> {
    pub sequence: &'a Sequence,
    /// Ids of every sequence the target may jump to. `None` when validating a
    /// sequence in isolation, in which case cross-sequence targets are not checked.
    pub known_sequences: Option<&'a AHashSet<String>>,
}

/// Defines the contract for a single, self-contained validation pass.
pub trait ValidationCheck: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<Diagnostic>;
}

pub struct SequenceValidator {
    checks: Vec<Box<dyn ValidationCheck>>,
    known_sequences: Option<AHashSet<String>>,
}

pub struct SequenceValidatorBuilder {
    checks: Vec<Box<dyn ValidationCheck>>,
    known_sequences: Option<AHashSet<String>>,
}

impl SequenceValidatorBuilder {
    pub fn new() -> Self {
        Self {
            checks: checks::default_checks(),
            known_sequences: None,
        }
    }

    /// Starts from an empty check list instead of the built-in one.
    pub fn without_default_checks(mut self) -> Self {
        self.checks.clear();
        self
    }

    pub fn with_check(mut self, check: Box<dyn ValidationCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Enables unknown-target detection against the given sequence ids.
    pub fn with_known_sequences<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_sequences = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> SequenceValidator {
        SequenceValidator {
            checks: self.checks,
            known_sequences: self.known_sequences,
        }
    }
}

impl Default for SequenceValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SequenceValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SequenceValidatorBuilder {
        SequenceValidatorBuilder::new()
    }

    /// Names of the registered checks, in run order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Validates one sequence. Never panics on malformed input.
    pub fn validate(&self, sequence: &Sequence) -> ValidationReport {
        self.run(sequence, self.known_sequences.as_ref())
    }

    /// Validates every sequence of a catalog, resolving cross-sequence targets
    /// against the catalog's ids (plus any ids given to the builder).
    pub fn validate_catalog(&self, catalog: &SequenceCatalog) -> ValidationReport {
        let mut known: AHashSet<String> = catalog.ids().into_iter().map(String::from).collect();
        if let Some(extra) = &self.known_sequences {
            known.extend(extra.iter().cloned());
        }

        let mut report = ValidationReport::new();
        for sequence in catalog.iter() {
            report.extend(self.run(sequence, Some(&known)));
        }
        report
    }

    fn run(&self, sequence: &Sequence, known: Option<&AHashSet<String>>) -> ValidationReport {
        let ctx = ValidationContext {
            sequence,
            known_sequences: known,
        };
        let mut report = ValidationReport::new();
        for check in &self.checks {
            let diagnostics = check.check(&ctx);
            debug!(
                check = check.name(),
                sequence_id = sequence.sequence_id(),
                found = diagnostics.len(),
                "Validation check finished"
            );
            for mut diagnostic in diagnostics {
                if diagnostic.sequence_id.is_none() {
                    diagnostic.sequence_id = Some(sequence.sequence_id().to_string());
                }
                report.push(diagnostic);
            }
        }
        report
    }
}
