//! Typed mutations of the variable store and event triggers.

use crate::ast::{Payload, Value};
use crate::error::{StoreError, TriggerError};
use crate::sequence::{DataAction, DataActionKind};
use crate::store::VariableStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receives `trigger` actions.
///
/// Handlers run synchronously, in action order. A returned error is logged by
/// the processor and never interrupts the conversation.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &str, data: &Payload) -> Result<(), TriggerError>;
}

impl<F> EventSink for F
where
    F: Fn(&str, &Payload) -> Result<(), TriggerError> + Send + Sync,
{
    fn on_event(&self, event: &str, data: &Payload) -> Result<(), TriggerError> {
        self(event, data)
    }
}

/// Applies the data actions of a node to a variable store.
#[derive(Clone, Default)]
pub struct DataActionProcessor {
    event_sink: Option<Arc<dyn EventSink>>,
}

impl DataActionProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler invoked for `trigger` actions.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Applies actions strictly in order, each completing before the next starts.
    ///
    /// Only store failures are returned; trigger handler failures are logged.
    pub async fn apply(
        &self,
        actions: &[DataAction],
        store: &dyn VariableStore,
    ) -> Result<(), StoreError> {
        for action in actions {
            self.apply_one(action, store).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, action, store), fields(kind = action.kind.name(), key = %action.key))]
    async fn apply_one(
        &self,
        action: &DataAction,
        store: &dyn VariableStore,
    ) -> Result<(), StoreError> {
        match action.kind {
            DataActionKind::Set => {
                let value = action.value.clone().unwrap_or(Value::Null);
                store.set(&action.key, value).await
            }
            DataActionKind::Increment => self.add(action, store, 1.0).await,
            DataActionKind::Decrement => self.add(action, store, -1.0).await,
            DataActionKind::Reset => {
                let value = action.value.clone().unwrap_or(Value::Number(0.0));
                store.set(&action.key, value).await
            }
            DataActionKind::Append => {
                let Some(value) = &action.value else {
                    debug!("Append without a value; nothing to add");
                    return Ok(());
                };
                let mut items = as_list(store.get(&action.key).await?);
                if items.iter().any(|item| item.loosely_equals(value)) {
                    return Ok(());
                }
                items.push(value.clone());
                store.set(&action.key, Value::List(items)).await
            }
            DataActionKind::Remove => {
                let Some(value) = &action.value else {
                    return Ok(());
                };
                let mut items = as_list(store.get(&action.key).await?);
                match items.iter().position(|item| item.loosely_equals(value)) {
                    Some(position) => {
                        items.remove(position);
                        store.set(&action.key, Value::List(items)).await
                    }
                    None => Ok(()),
                }
            }
            DataActionKind::Trigger => {
                self.trigger(action);
                Ok(())
            }
        }
    }

    /// `increment` / `decrement`: absent or non-numeric current values count as 0.
    async fn add(
        &self,
        action: &DataAction,
        store: &dyn VariableStore,
        sign: f64,
    ) -> Result<(), StoreError> {
        let current = store
            .get(&action.key)
            .await?
            .and_then(|v| v.as_number())
            .unwrap_or(0.0);
        let amount = match &action.value {
            None => 1.0,
            Some(value) => value.as_number().unwrap_or_else(|| {
                warn!(value = %value, "Non-numeric amount; using 1");
                1.0
            }),
        };
        store
            .set(&action.key, Value::Number(current + sign * amount))
            .await
    }

    fn trigger(&self, action: &DataAction) {
        let Some(event) = action.event.as_deref() else {
            return;
        };
        let Some(sink) = &self.event_sink else {
            debug!(event = %event, "No event sink registered; dropping trigger");
            return;
        };
        let empty = Payload::default();
        let data = action.data.as_ref().unwrap_or(&empty);
        if let Err(e) = sink.on_event(event, data) {
            warn!(event = %event, error = %e, "Event handler failed");
        }
    }
}

/// Reads a stored value as a list: absent is empty, a scalar becomes a one-item list.
fn as_list(current: Option<Value>) -> Vec<Value> {
    match current {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::List(items)) => items,
        Some(scalar) => vec![scalar],
    }
}
