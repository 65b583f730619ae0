//! Payment gateway notification and status types.
//!
//! These mirror the gateway's own snake_case payloads, not the
//! camelCase order vocabulary.

use serde::{Deserialize, Serialize};

use super::order::PaymentStatus;

/// Transaction status vocabulary of the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Authorize,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Parse the raw `transaction_status` string of a notification.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "capture" => TransactionStatus::Capture,
            "settlement" => TransactionStatus::Settlement,
            "pending" => TransactionStatus::Pending,
            "authorize" => TransactionStatus::Authorize,
            "deny" => TransactionStatus::Deny,
            "cancel" => TransactionStatus::Cancel,
            "expire" => TransactionStatus::Expire,
            "failure" => TransactionStatus::Failure,
            "refund" => TransactionStatus::Refund,
            "partial_refund" => TransactionStatus::PartialRefund,
            "chargeback" => TransactionStatus::Chargeback,
            "partial_chargeback" => TransactionStatus::PartialChargeback,
            _ => TransactionStatus::Unknown,
        }
    }

    /// The order payment status this transaction status is recorded as.
    ///
    /// Returns `None` for statuses this service does not recognise.
    pub fn payment_status(self) -> Option<PaymentStatus> {
        match self {
            TransactionStatus::Capture => Some(PaymentStatus::Capture),
            TransactionStatus::Settlement => Some(PaymentStatus::Settlement),
            TransactionStatus::Pending => Some(PaymentStatus::Pending),
            TransactionStatus::Authorize => Some(PaymentStatus::Authorize),
            TransactionStatus::Deny => Some(PaymentStatus::Deny),
            TransactionStatus::Cancel => Some(PaymentStatus::Cancel),
            TransactionStatus::Expire => Some(PaymentStatus::Expire),
            TransactionStatus::Failure => Some(PaymentStatus::Failure),
            TransactionStatus::Refund => Some(PaymentStatus::Refund),
            TransactionStatus::PartialRefund => Some(PaymentStatus::PartialRefund),
            TransactionStatus::Chargeback => Some(PaymentStatus::Chargeback),
            TransactionStatus::PartialChargeback => Some(PaymentStatus::PartialChargeback),
            TransactionStatus::Unknown => None,
        }
    }
}

/// Body of `POST /payments/notification`, sent by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub signature_key: Option<String>,
}

/// Gateway view of a transaction, returned by `GET /payments/status/{order_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub order_id: String,
    pub transaction_status: TransactionStatus,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_transaction_status_is_tolerated() {
        let parsed: TransactionStatus = serde_json::from_str("\"some_new_status\"").unwrap();
        assert_eq!(parsed, TransactionStatus::Unknown);
        assert_eq!(TransactionStatus::from_raw("settlement"), TransactionStatus::Settlement);
        assert_eq!(TransactionStatus::Unknown.payment_status(), None);
        assert_eq!(
            TransactionStatus::PartialRefund.payment_status(),
            Some(PaymentStatus::PartialRefund)
        );
    }
}
