//! Notification collaborator
//!
//! State transitions emit `NotificationIntent` values; the dispatcher
//! delivers them best-effort. Delivery failure is logged and never rolls
//! back the transition that produced the intent.

use anyhow::{Context, Result};
use serde::Serialize;

/// Message templates rendered into SMS bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MessageTemplate {
    /// Guest: ticket is ready
    TicketReady { guest_name: String, ticket_url: String },
    /// Admin: booking confirmed, with remaining balance
    TicketSummary {
        property_name: String,
        guest_name: String,
        due_amount: Option<i64>,
    },
    /// Guest: refund is on its way
    RefundInitiated {
        refund_id: String,
        amount: i64,
        sla_days: u32,
    },
    /// Admin: refund initiated for a cancelled booking
    RefundSummary {
        property_name: String,
        refund_id: String,
        amount: i64,
    },
    /// Guest: booking cancelled, nothing was captured
    CancelledNoRefund { property_name: String },
    /// Admin: booking cancelled without refund
    CancelledSummary { property_name: String, guest_name: String },
    /// Owner: payment received, booking request incoming
    PaymentReceivedOwner { guest_name: String, property_name: String },
    /// Admin: payment received for a booking
    PaymentReceivedAdmin { guest_name: String, amount: i64 },
}

impl MessageTemplate {
    /// Render the template into a message body
    pub fn render(&self) -> String {
        match self {
            MessageTemplate::TicketReady { guest_name, ticket_url } => format!(
                "Hi {}, your HavenStay booking is confirmed. Your ticket: {}",
                guest_name, ticket_url
            ),
            MessageTemplate::TicketSummary {
                property_name,
                guest_name,
                due_amount,
            } => match due_amount {
                Some(due) => format!(
                    "Ticket generated for {} at {}. Due at checkin: {}",
                    guest_name, property_name, due
                ),
                None => format!("Ticket generated for {} at {}", guest_name, property_name),
            },
            MessageTemplate::RefundInitiated {
                refund_id,
                amount,
                sla_days,
            } => format!(
                "Your refund of {} has been initiated (ref {}). Expect it within {} working days.",
                amount, refund_id, sla_days
            ),
            MessageTemplate::RefundSummary {
                property_name,
                refund_id,
                amount,
            } => format!(
                "Refund {} of {} initiated for cancelled booking at {}",
                refund_id, amount, property_name
            ),
            MessageTemplate::CancelledNoRefund { property_name } => format!(
                "Your booking at {} was cancelled by the owner. No payment was captured, so no refund applies.",
                property_name
            ),
            MessageTemplate::CancelledSummary {
                property_name,
                guest_name,
            } => format!(
                "Booking for {} at {} closed without refund",
                guest_name, property_name
            ),
            MessageTemplate::PaymentReceivedOwner {
                guest_name,
                property_name,
            } => format!(
                "New booking request: {} has paid the advance for {}. Please confirm or cancel.",
                guest_name, property_name
            ),
            MessageTemplate::PaymentReceivedAdmin { guest_name, amount } => {
                format!("Advance of {} received from {}", amount, guest_name)
            }
        }
    }
}

/// A notification the state machine wants delivered
#[derive(Debug, Clone, Serialize)]
pub struct NotificationIntent {
    pub recipient: String,
    pub template: MessageTemplate,
}

impl NotificationIntent {
    pub fn new(recipient: impl Into<String>, template: MessageTemplate) -> Self {
        Self {
            recipient: recipient.into(),
            template,
        }
    }
}

/// SMS delivery backend
#[derive(Clone)]
pub struct SmsNotifier {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_id: String,
}

impl SmsNotifier {
    pub fn new(api_url: String, api_key: String, sender_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            sender_id,
        }
    }

    /// Deliver a single message; returns whether the provider accepted it
    pub async fn notify(&self, phone: &str, message: &str) -> Result<bool> {
        let response = self
            .http
            .post(&self.api_url)
            .json(&serde_json::json!({
                "apikey": self.api_key,
                "sender": self.sender_id,
                "number": phone,
                "message": message,
            }))
            .send()
            .await
            .context("SMS provider request failed")?;

        Ok(response.status().is_success())
    }
}

/// Notifier backends available to the services layer
#[derive(Clone)]
pub enum Notifier {
    Sms(SmsNotifier),
    /// Logs instead of delivering; used in development and tests
    Noop,
}

impl Notifier {
    /// Dispatch a batch of intents, best-effort.
    ///
    /// Failures are logged and swallowed; the caller's state change has
    /// already been persisted and must not be rolled back.
    pub async fn dispatch(&self, intents: &[NotificationIntent]) {
        for intent in intents {
            let message = intent.template.render();
            match self {
                Notifier::Sms(sms) => match sms.notify(&intent.recipient, &message).await {
                    Ok(true) => {
                        tracing::info!(recipient = %intent.recipient, "Notification delivered");
                    }
                    Ok(false) => {
                        tracing::warn!(recipient = %intent.recipient, "SMS provider rejected message");
                    }
                    Err(e) => {
                        tracing::warn!(recipient = %intent.recipient, error = %e, "Notification delivery failed");
                    }
                },
                Notifier::Noop => {
                    tracing::info!(recipient = %intent.recipient, message = %message, "Notification (noop)");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_ready_render() {
        let template = MessageTemplate::TicketReady {
            guest_name: "Asha".to_string(),
            ticket_url: "https://havenstay.example/t/abc".to_string(),
        };
        let body = template.render();
        assert!(body.contains("Asha"));
        assert!(body.contains("https://havenstay.example/t/abc"));
    }

    #[test]
    fn test_ticket_summary_with_and_without_due() {
        let with_due = MessageTemplate::TicketSummary {
            property_name: "Sea Breeze Villa".to_string(),
            guest_name: "Asha".to_string(),
            due_amount: Some(1_000_000),
        };
        assert!(with_due.render().contains("1000000"));

        let without_due = MessageTemplate::TicketSummary {
            property_name: "Sea Breeze Villa".to_string(),
            guest_name: "Asha".to_string(),
            due_amount: None,
        };
        assert!(!without_due.render().contains("Due"));
    }

    #[test]
    fn test_refund_message_carries_ref_and_sla() {
        let template = MessageTemplate::RefundInitiated {
            refund_id: "RF-42".to_string(),
            amount: 500_000,
            sla_days: 7,
        };
        let body = template.render();
        assert!(body.contains("RF-42"));
        assert!(body.contains("7 working days"));
    }

    #[tokio::test]
    async fn test_noop_dispatch_never_fails() {
        let notifier = Notifier::Noop;
        let intents = vec![NotificationIntent::new(
            "9876543210",
            MessageTemplate::CancelledNoRefund {
                property_name: "Pinewood Cottage".to_string(),
            },
        )];
        notifier.dispatch(&intents).await;
    }
}
