//! Placeholder substitution for message text.
//!
//! Tokens have the form `{path}`, `{path|fallback}` or
//! `{path:formatter:formatter2|fallback}`. Formatters apply left to right.
//! An absent or null variable yields the fallback verbatim, or an empty string.

use crate::ast::Value;
use crate::sequence::MessageNode;
use crate::store::VariableStore;
use ahash::AHashMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, warn};

mod bubbles;
mod formatters;

pub use bubbles::{BUBBLE_SEPARATOR, node_bubbles, split_bubbles};
pub use formatters::TextFormatter;

use formatters::{create_formatter_by_name, register_default_formatters};

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_$][A-Za-z0-9_.$-]*)((?::[A-Za-z_][A-Za-z0-9_]*)*)(?:\|([^{}]*))?\}")
        .expect("template token regex must compile")
});

/// One parsed `{...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    pub path: String,
    pub formatters: Vec<String>,
    pub fallback: Option<String>,
}

impl TemplateToken {
    fn from_captures(captures: &Captures<'_>) -> Self {
        Self {
            path: captures[1].to_string(),
            formatters: captures
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(':')
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            fallback: captures.get(3).map(|m| m.as_str().to_string()),
        }
    }
}

/// Resolves template tokens in message text against a variable store.
pub struct TemplateEngine {
    formatters: AHashMap<String, Box<dyn TextFormatter>>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Creates an engine with the built-in formatters registered.
    pub fn new() -> Self {
        let mut formatters: AHashMap<String, Box<dyn TextFormatter>> = AHashMap::new();
        register_default_formatters(&mut formatters);
        Self { formatters }
    }

    /// Registers a custom formatter, replacing any formatter with the same name.
    pub fn with_formatter(mut self, formatter: Box<dyn TextFormatter>) -> Self {
        self.formatters
            .insert(formatter.name().to_string(), formatter);
        self
    }

    /// Makes a built-in formatter available under another name.
    pub fn with_formatter_alias(mut self, alias: &str, builtin: &str) -> Self {
        if let Some(formatter) = create_formatter_by_name(builtin) {
            self.formatters.insert(alias.to_string(), formatter);
        }
        self
    }

    /// Lists the tokens of a text in order of appearance.
    pub fn tokens(text: &str) -> Vec<TemplateToken> {
        TOKEN_PATTERN
            .captures_iter(text)
            .map(|captures| TemplateToken::from_captures(&captures))
            .collect()
    }

    /// Resolves every token in `text`. Never fails; store errors fall back like absent values.
    pub async fn resolve(&self, text: &str, store: &dyn VariableStore) -> String {
        if !text.contains('{') {
            return text.to_string();
        }

        let mut variables = AHashMap::new();
        for token in Self::tokens(text) {
            if variables.contains_key(&token.path) {
                continue;
            }
            let value = match store.get(&token.path).await {
                Ok(value) => value.unwrap_or(Value::Null),
                Err(e) => {
                    warn!(key = %token.path, error = %e, "Variable lookup failed; using fallback");
                    Value::Null
                }
            };
            variables.insert(token.path, value);
        }

        self.render(text, &variables)
    }

    /// Substitutes tokens from an already-resolved set of variables.
    pub fn render(&self, text: &str, variables: &AHashMap<String, Value>) -> String {
        TOKEN_PATTERN
            .replace_all(text, |captures: &Captures<'_>| {
                let token = TemplateToken::from_captures(captures);
                self.substitute(&token, variables.get(&token.path))
            })
            .into_owned()
    }

    /// Expands a node into its resolved bubbles, split on `|||` before resolution.
    pub async fn expand(&self, node: &MessageNode, store: &dyn VariableStore) -> Vec<String> {
        let mut bubbles = Vec::new();
        for piece in node_bubbles(node) {
            bubbles.push(self.resolve(&piece, store).await);
        }
        bubbles
    }

    fn substitute(&self, token: &TemplateToken, value: Option<&Value>) -> String {
        let value = match value {
            Some(value) if !value.is_null() => value.clone(),
            _ => return token.fallback.clone().unwrap_or_default(),
        };

        let formatted = token
            .formatters
            .iter()
            .fold(value, |current, name| match self.formatters.get(name) {
                Some(formatter) => formatter.apply(current),
                None => {
                    debug!(formatter = %name, "Unknown formatter; passing value through");
                    current
                }
            });

        if formatted.is_null() {
            token.fallback.clone().unwrap_or_default()
        } else {
            formatted.to_string()
        }
    }
}
