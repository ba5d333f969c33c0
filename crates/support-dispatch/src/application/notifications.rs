//! Fire-and-forget notification dispatch

use std::sync::Arc;

use crate::domain::events::TicketEvent;
use crate::ports::outbound::Notifier;

/// Hand the event to the notifier on a background task. Delivery failures
/// are logged and never reach the caller.
pub(crate) fn dispatch(notifier: &Arc<dyn Notifier>, event: TicketEvent) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        let ticket_id = event.ticket_id().clone();
        if let Err(e) = notifier.notify(event).await {
            tracing::warn!(ticket_id = %ticket_id, error = %e, "Notification delivery failed");
        }
    });
}
