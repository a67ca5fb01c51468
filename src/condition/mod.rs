//! The route condition language.
//!
//! Conditions are small boolean expressions over dotted variable paths:
//! `user.streak >= 7 && user.plan == 'pro'`. They are parsed once into an
//! [`Expression`], the referenced variables are fetched from the
//! [`VariableStore`], and the tree is evaluated over that snapshot.

use crate::ast::{EvaluationTrace, Expression, Value};
use crate::error::{ConditionError, StoreError};
use crate::sequence::Route;
use crate::store::VariableStore;
use crate::trace::TraceFormatter;
use ahash::{AHashMap, AHashSet};
use std::sync::Mutex;
use tracing::{debug, warn};

mod engine;
pub mod parsing;

use engine::ConditionEngine;
pub use parsing::parse_condition;

/// Maximum number of parsed conditions kept by one evaluator.
pub const AST_CACHE_LIMIT: usize = 1024;

/// The outcome of resolving an autoroute node.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecision<'a> {
    /// Position of the winning route in the node's route list.
    pub index: usize,
    pub route: &'a Route,
    /// Human-readable explanation, e.g. `user.streak (was 8) >= 7`.
    pub reason: String,
}

/// Evaluates route conditions against a variable store.
///
/// Parsed expressions are cached by source text, so an evaluator can be shared
/// across turns of a conversation. The cache holds at most [`AST_CACHE_LIMIT`]
/// conditions and is cleared when it fills up.
#[derive(Default)]
pub struct ConditionEvaluator {
    ast_cache: Mutex<AHashMap<String, Expression>>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parsed conditions currently cached.
    pub fn cached_conditions(&self) -> usize {
        self.ast_cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Evaluates a condition. Never fails: malformed input, type errors and
    /// store failures all evaluate to `false`.
    pub async fn evaluate(&self, condition: &str, store: &dyn VariableStore) -> bool {
        match self.evaluate_with_trace(condition, store).await {
            Ok(trace) => trace.get_outcome().is_truthy(),
            Err(e) => {
                debug!(condition = %condition, error = %e, "Condition did not evaluate; treating as false");
                false
            }
        }
    }

    /// Evaluates a condition and returns the full evaluation trace.
    pub async fn evaluate_with_trace(
        &self,
        condition: &str,
        store: &dyn VariableStore,
    ) -> Result<EvaluationTrace, ConditionError> {
        let expression = self.parse_cached(condition)?;

        let mut paths = AHashSet::new();
        expression.variables(&mut paths);
        let variables = resolve_variables(&paths, store).await;

        ConditionEngine::new(&expression, &variables).evaluate()
    }

    /// Picks the destination of an autoroute node.
    ///
    /// Conditional routes are tried in order and the first one that evaluates
    /// to true wins. The default route is the fallback when none match; a
    /// condition attached to the default route is ignored.
    pub async fn resolve_route<'r>(
        &self,
        routes: &'r [Route],
        store: &dyn VariableStore,
    ) -> Option<RouteDecision<'r>> {
        for (index, route) in routes.iter().enumerate() {
            if route.is_default {
                continue;
            }
            let Some(condition) = route.condition.as_deref() else {
                continue;
            };
            match self.evaluate_with_trace(condition, store).await {
                Ok(trace) if trace.get_outcome().is_truthy() => {
                    let reason = TraceFormatter::format_trace(&trace);
                    debug!(route = index, reason = %reason, "Route condition matched");
                    return Some(RouteDecision {
                        index,
                        route,
                        reason,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(route = index, condition = %condition, error = %e, "Malformed route condition");
                }
            }
        }

        routes
            .iter()
            .enumerate()
            .find(|(_, route)| route.is_default)
            .map(|(index, route)| {
                debug!(route = index, "Falling back to default route");
                RouteDecision {
                    index,
                    route,
                    reason: "default route".to_string(),
                }
            })
    }

    fn parse_cached(&self, condition: &str) -> Result<Expression, ConditionError> {
        if let Ok(cache) = self.ast_cache.lock() {
            if let Some(cached) = cache.get(condition) {
                return Ok(cached.clone());
            }
        }

        let expression = parse_condition(condition)?;
        if let Ok(mut cache) = self.ast_cache.lock() {
            if cache.len() >= AST_CACHE_LIMIT {
                debug!(limit = AST_CACHE_LIMIT, "Condition cache full; clearing");
                cache.clear();
            }
            cache.insert(condition.to_string(), expression.clone());
        }
        Ok(expression)
    }
}

/// Fetches every referenced path. Absent keys and store failures resolve to `Null`.
async fn resolve_variables(
    paths: &AHashSet<String>,
    store: &dyn VariableStore,
) -> AHashMap<String, Value> {
    let mut variables = AHashMap::with_capacity(paths.len());
    for path in paths {
        let value = match store.get(path).await {
            Ok(value) => value.unwrap_or(Value::Null),
            Err(e) => {
                log_store_failure(path, &e);
                Value::Null
            }
        };
        variables.insert(path.clone(), value);
    }
    variables
}

fn log_store_failure(path: &str, error: &StoreError) {
    warn!(key = %path, error = %error, "Variable lookup failed; using null");
}
