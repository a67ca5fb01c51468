use crate::sequence::MessageId;
use serde::{Serialize, Serializer};
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.pad(label)
    }
}

/// What a diagnostic is about. Serialized as its string code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Structure
    MissingSequenceId,
    MissingName,
    EmptySequence,
    DuplicateMessageId,
    // References
    InvalidNextMessage,
    InvalidChoiceTarget,
    InvalidRouteTarget,
    UnknownTargetSequence,
    // Flow
    UnreachableMessage,
    DeadEnd,
    Cycle,
    // Choices
    NoChoices,
    ChoiceMissingDestination,
    AmbiguousChoiceTarget,
    EmptyChoiceText,
    // Routes
    NoRoutes,
    MissingDefaultRoute,
    MultipleDefaultRoutes,
    RouteMissingDestination,
    RouteMissingCondition,
    DefaultRouteCondition,
    SuspiciousCondition,
    // Content
    UnbalancedBraces,
    TextOnNonDisplay,
    MissingImageReference,
    ImageWithContent,
    DelayOnNonDisplay,
    IgnoredField,
    // Data actions
    EmptyDataActions,
    MissingActionKey,
    TriggerWithoutEvent,
    NonNumericAmount,
    // Summary
    EntryPoint,
    ExitPoint,
    /// Emitted by checks registered outside this crate.
    Custom(&'static str),
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSequenceId => "MISSING_SEQUENCE_ID",
            Self::MissingName => "MISSING_NAME",
            Self::EmptySequence => "EMPTY_SEQUENCE",
            Self::DuplicateMessageId => "DUPLICATE_MESSAGE_ID",
            Self::InvalidNextMessage => "INVALID_NEXT_MESSAGE",
            Self::InvalidChoiceTarget => "INVALID_CHOICE_TARGET",
            Self::InvalidRouteTarget => "INVALID_ROUTE_TARGET",
            Self::UnknownTargetSequence => "UNKNOWN_TARGET_SEQUENCE",
            Self::UnreachableMessage => "UNREACHABLE_MESSAGE",
            Self::DeadEnd => "DEAD_END",
            Self::Cycle => "CYCLE_DETECTED",
            Self::NoChoices => "NO_CHOICES",
            Self::ChoiceMissingDestination => "CHOICE_MISSING_DESTINATION",
            Self::AmbiguousChoiceTarget => "AMBIGUOUS_CHOICE_TARGET",
            Self::EmptyChoiceText => "EMPTY_CHOICE_TEXT",
            Self::NoRoutes => "NO_ROUTES",
            Self::MissingDefaultRoute => "MISSING_DEFAULT_ROUTE",
            Self::MultipleDefaultRoutes => "MULTIPLE_DEFAULT_ROUTES",
            Self::RouteMissingDestination => "ROUTE_MISSING_DESTINATION",
            Self::RouteMissingCondition => "ROUTE_MISSING_CONDITION",
            Self::DefaultRouteCondition => "DEFAULT_ROUTE_CONDITION",
            Self::SuspiciousCondition => "SUSPICIOUS_CONDITION",
            Self::UnbalancedBraces => "UNBALANCED_BRACES",
            Self::TextOnNonDisplay => "TEXT_ON_NON_DISPLAY",
            Self::MissingImageReference => "MISSING_IMAGE_REFERENCE",
            Self::ImageWithContent => "IMAGE_WITH_CONTENT",
            Self::DelayOnNonDisplay => "DELAY_ON_NON_DISPLAY",
            Self::IgnoredField => "IGNORED_FIELD",
            Self::EmptyDataActions => "EMPTY_DATA_ACTIONS",
            Self::MissingActionKey => "MISSING_ACTION_KEY",
            Self::TriggerWithoutEvent => "TRIGGER_WITHOUT_EVENT",
            Self::NonNumericAmount => "NON_NUMERIC_AMOUNT",
            Self::EntryPoint => "ENTRY_POINT",
            Self::ExitPoint => "EXIT_POINT",
            Self::Custom(code) => *code,
        }
    }

    /// The severity built-in checks report this kind with.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::MissingSequenceId
            | Self::MissingName
            | Self::EmptySequence
            | Self::DuplicateMessageId
            | Self::InvalidNextMessage
            | Self::InvalidChoiceTarget
            | Self::InvalidRouteTarget
            | Self::UnknownTargetSequence
            | Self::DeadEnd
            | Self::NoChoices
            | Self::ChoiceMissingDestination
            | Self::NoRoutes
            | Self::MissingDefaultRoute
            | Self::MultipleDefaultRoutes
            | Self::RouteMissingDestination
            | Self::TextOnNonDisplay
            | Self::MissingImageReference
            | Self::ImageWithContent
            | Self::MissingActionKey => Severity::Error,
            Self::UnreachableMessage
            | Self::Cycle
            | Self::AmbiguousChoiceTarget
            | Self::EmptyChoiceText
            | Self::RouteMissingCondition
            | Self::DefaultRouteCondition
            | Self::SuspiciousCondition
            | Self::UnbalancedBraces
            | Self::DelayOnNonDisplay
            | Self::EmptyDataActions
            | Self::TriggerWithoutEvent
            | Self::NonNumericAmount => Severity::Warning,
            Self::IgnoredField | Self::EntryPoint | Self::ExitPoint => Severity::Info,
            Self::Custom(_) => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for DiagnosticKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// One finding of the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's default severity.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            message_id: None,
            sequence_id: None,
            severity: kind.default_severity(),
        }
    }

    pub fn at(mut self, message_id: MessageId) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn in_sequence(mut self, sequence_id: impl Into<String>) -> Self {
        self.sequence_id = Some(sequence_id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)?;
        match (&self.sequence_id, self.message_id) {
            (Some(sequence), Some(id)) => write!(f, " ({}#{})", sequence, id),
            (Some(sequence), None) => write!(f, " ({})", sequence),
            (None, Some(id)) => write!(f, " (message {})", id),
            (None, None) => Ok(()),
        }
    }
}

/// The merged output of all checks, split by severity in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub info: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
            Severity::Info => self.info.push(diagnostic),
        }
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
    }

    /// A sequence is usable when no check reported an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All diagnostics: errors, then warnings, then info.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Number of diagnostics of the given kind, across all severities.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.iter().filter(|d| d.kind == kind).count()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.count(kind) > 0
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
