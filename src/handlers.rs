//! Registry of event handlers keyed by event kind.

use anyhow::Result;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::lock_or_recover;
use crate::output::{EventKind, SignalEvent};

pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &SignalEvent) -> Result<()>;
}

impl<F> EventHandler for F
where
    F: Fn(&SignalEvent) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &SignalEvent) -> Result<()> {
        self(event)
    }
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        lock_or_recover(&self.handlers, "HandlerRegistry::register")
            .entry(kind)
            .or_default()
            .push(handler);
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        lock_or_recover(&self.handlers, "HandlerRegistry::handler_count")
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Call `f` with every handler of `kind`, in registration order. The list
    /// is snapshotted first, so handlers may register more handlers.
    pub fn for_each_handler(&self, kind: EventKind, mut f: impl FnMut(&dyn EventHandler)) {
        let snapshot: Vec<Arc<dyn EventHandler>> =
            lock_or_recover(&self.handlers, "HandlerRegistry::for_each_handler")
                .get(&kind)
                .cloned()
                .unwrap_or_default();
        for handler in &snapshot {
            f(handler.as_ref());
        }
    }

    /// Deliver `event` to every handler of its kind. A failing or panicking
    /// handler is logged and skipped. Returns how many handlers failed.
    pub fn dispatch(&self, event: &SignalEvent) -> usize {
        let mut failures = 0;
        self.for_each_handler(event.kind, |handler| {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    tracing::warn!(kind = %event.kind, error = %err, "event handler failed");
                    crate::log_debug(&format!("{} handler failed: {err:#}", event.kind));
                }
                Err(_) => {
                    failures += 1;
                    tracing::warn!(kind = %event.kind, "event handler panicked");
                    crate::log_debug(&format!("{} handler panicked", event.kind));
                }
            }
        });
        failures
    }
}
