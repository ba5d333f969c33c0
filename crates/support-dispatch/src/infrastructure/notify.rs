//! Notification and alert adapters

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::dto::TickReport;
use crate::domain::events::TicketEvent;
use crate::ports::outbound::{AlertChannel, NotificationError, Notifier};

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: TicketEvent) -> Result<(), NotificationError> {
        match &event {
            TicketEvent::Assigned { ticket_id, from, to, reason } => tracing::info!(
                ticket_id = %ticket_id,
                from = from.as_ref().map(|a| a.as_str()).unwrap_or("-"),
                to = %to,
                reason = %reason,
                "Ticket assignment notification"
            ),
            TicketEvent::Escalated { ticket_id, from, to } => tracing::info!(
                ticket_id = %ticket_id,
                from = %from,
                to = %to,
                "Ticket escalation notification"
            ),
        }
        Ok(())
    }
}

/// Forwards events to a channel, for hosts that bridge to a real transport.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<TicketEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TicketEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: TicketEvent) -> Result<(), NotificationError> {
        self.sender
            .send(event)
            .map_err(|_| NotificationError::ChannelClosed)
    }
}

/// Reports problem ticks to the log at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertChannel;

#[async_trait]
impl AlertChannel for LogAlertChannel {
    async fn report(&self, report: &TickReport) -> Result<(), NotificationError> {
        if let Some(error) = &report.scan_error {
            tracing::error!(error = %error, "SLA scan could not list tickets");
        }
        if let Some(error) = &report.configuration_error {
            tracing::error!(error = %error, "SLA override rejected, defaults in effect");
        }
        for failure in &report.failures {
            tracing::error!(
                ticket_id = %failure.ticket_id,
                kind = failure.kind,
                error = %failure.error,
                "SLA processing failed"
            );
        }
        Ok(())
    }
}
