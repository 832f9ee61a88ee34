use anyhow::Result;
use multiadmin::handlers::HandlerRegistry;
use multiadmin::log_debug_content;
use multiadmin::output::{EventKind, SignalEvent};
use std::sync::Arc;

const TRACED_EVENTS: [EventKind; 6] = [
    EventKind::ServerStart,
    EventKind::WaitingForPlayers,
    EventKind::RoundStart,
    EventKind::RoundEnd,
    EventKind::ServerFull,
    EventKind::ModDetected,
];

/// Record server lifecycle events in the trace log and player traffic in the
/// content-gated debug log.
pub(crate) fn register_default_handlers(registry: &HandlerRegistry) {
    for kind in TRACED_EVENTS {
        registry.register(
            kind,
            Arc::new(|event: &SignalEvent| -> Result<()> {
                tracing::info!(event = %event.kind, "server event");
                Ok(())
            }),
        );
    }
    for kind in [
        EventKind::PlayerConnect,
        EventKind::PlayerDisconnect,
        EventKind::AdminAction,
    ] {
        registry.register(
            kind,
            Arc::new(|event: &SignalEvent| -> Result<()> {
                log_debug_content(&format!("{}: {}", event.kind, event.payload));
                Ok(())
            }),
        );
    }
}
