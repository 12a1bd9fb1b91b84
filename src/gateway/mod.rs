//! Payment gateway collaborator
//!
//! The gateway is opaque to the core: it hands back a verdict with a
//! verified/unverified flag, and the booking service refuses to advance
//! state on unverified payloads. Merchant credentials arrive as an
//! injected config value, never read from the environment in core logic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Merchant credentials and callback settings, injected at construction
#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    pub merchant_id: String,
    pub merchant_key: String,
    pub callback_url: String,
}

/// Raw webhook payload as the gateway posts it
#[derive(Debug, Deserialize)]
pub struct GatewayNotification {
    pub order_id: String,
    /// Gateway status code, e.g. `TXN_SUCCESS`, `PENDING`, `TXN_FAILURE`
    pub status: String,
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub checksum: Option<String>,
}

/// Normalized gateway status
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Success,
    Pending,
    Failure,
}

/// Verified (or rejected) webhook verdict handed to the booking service
#[derive(Debug, Clone)]
pub struct GatewayVerdict {
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub status: GatewayStatus,
    pub signature_valid: bool,
}

/// Payment gateway client
#[derive(Clone)]
pub struct PaymentGateway {
    config: PaymentGatewayConfig,
}

impl PaymentGateway {
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self { config }
    }

    pub fn callback_url(&self) -> &str {
        &self.config.callback_url
    }

    /// Verify a webhook payload and normalize it into a verdict.
    ///
    /// An absent or mismatched checksum yields `signature_valid: false`;
    /// the payload is still mapped so the caller can log what the gateway
    /// claimed without trusting it.
    pub fn verify(&self, notification: &GatewayNotification) -> GatewayVerdict {
        let signature_valid = match &notification.checksum {
            Some(checksum) => {
                let expected = self.checksum_for(notification);
                // Constant-time comparison is unnecessary here; the checksum
                // is not a secret, the merchant key is.
                expected == *checksum
            }
            None => false,
        };

        GatewayVerdict {
            order_id: notification.order_id.clone(),
            transaction_id: notification.transaction_id.clone(),
            status: map_status(&notification.status),
            signature_valid,
        }
    }

    /// Checksum over the payload fields and the merchant key
    fn checksum_for(&self, notification: &GatewayNotification) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.config.merchant_id.as_bytes());
        hasher.update(b"|");
        hasher.update(notification.order_id.as_bytes());
        hasher.update(b"|");
        hasher.update(notification.status.as_bytes());
        hasher.update(b"|");
        if let Some(txn) = &notification.transaction_id {
            hasher.update(txn.as_bytes());
        }
        hasher.update(b"|");
        if let Some(amount) = &notification.amount {
            hasher.update(amount.as_bytes());
        }
        hasher.update(b"|");
        hasher.update(self.config.merchant_key.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Map gateway status codes onto the normalized status.
///
/// Anything unrecognized is treated as a failure.
fn map_status(code: &str) -> GatewayStatus {
    match code {
        "TXN_SUCCESS" | "SUCCESS" => GatewayStatus::Success,
        "PENDING" | "TXN_PENDING" => GatewayStatus::Pending,
        _ => GatewayStatus::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(PaymentGatewayConfig {
            merchant_id: "HAVENSTAY01".to_string(),
            merchant_key: "test-merchant-key".to_string(),
            callback_url: "https://havenstay.example/api/payments/webhook".to_string(),
        })
    }

    fn notification(status: &str) -> GatewayNotification {
        GatewayNotification {
            order_id: "HS-ORD-100".to_string(),
            status: status.to_string(),
            transaction_id: Some("TXN-900".to_string()),
            amount: Some("5000.00".to_string()),
            checksum: None,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("TXN_SUCCESS"), GatewayStatus::Success);
        assert_eq!(map_status("PENDING"), GatewayStatus::Pending);
        assert_eq!(map_status("TXN_FAILURE"), GatewayStatus::Failure);
        assert_eq!(map_status("SOMETHING_ELSE"), GatewayStatus::Failure);
    }

    #[test]
    fn test_valid_checksum_accepted() {
        let gateway = gateway();
        let mut n = notification("TXN_SUCCESS");
        n.checksum = Some(gateway.checksum_for(&n));

        let verdict = gateway.verify(&n);
        assert!(verdict.signature_valid);
        assert_eq!(verdict.status, GatewayStatus::Success);
        assert_eq!(verdict.transaction_id.as_deref(), Some("TXN-900"));
    }

    #[test]
    fn test_tampered_checksum_rejected() {
        let gateway = gateway();
        let mut n = notification("TXN_SUCCESS");
        n.checksum = Some(gateway.checksum_for(&n));
        n.status = "TXN_FAILURE".to_string();

        let verdict = gateway.verify(&n);
        assert!(!verdict.signature_valid);
    }

    #[test]
    fn test_missing_checksum_rejected() {
        let gateway = gateway();
        let verdict = gateway.verify(&notification("TXN_SUCCESS"));
        assert!(!verdict.signature_valid);
        // Status is still mapped for logging purposes
        assert_eq!(verdict.status, GatewayStatus::Success);
    }
}
