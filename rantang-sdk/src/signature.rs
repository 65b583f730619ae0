//! Payment gateway notification signatures.
//!
//! The gateway signs every notification with
//!
//! ```text
//! signature_key = hex(SHA512(order_id + status_code + gross_amount + server_key))
//! ```
//!
//! and the receiving side recomputes the digest with its own server key.

use ring::digest::{SHA512, digest};

use crate::objects::PaymentNotification;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("notification is missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid signature")]
    SignatureMismatch,
}

/// Compute the hex-encoded signature the gateway attaches to a notification.
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let data = format!("{order_id}{status_code}{gross_amount}{server_key}");
    hex::encode(digest(&SHA512, data.as_bytes()).as_ref())
}

/// Verify the `signature_key` of a notification against `server_key`.
///
/// The comparison runs over the decoded digest bytes in constant time.
pub fn verify_notification(
    notification: &PaymentNotification,
    server_key: &str,
) -> Result<(), SignatureError> {
    let provided = notification
        .signature_key
        .as_deref()
        .ok_or(SignatureError::MissingField("signature_key"))?;
    let status_code = notification
        .status_code
        .as_deref()
        .ok_or(SignatureError::MissingField("status_code"))?;
    let gross_amount = notification
        .gross_amount
        .as_deref()
        .ok_or(SignatureError::MissingField("gross_amount"))?;

    let provided = hex::decode(provided.trim()).map_err(|_| SignatureError::InvalidHex)?;
    let data = format!(
        "{}{}{}{}",
        notification.order_id, status_code, gross_amount, server_key
    );
    let expected = digest(&SHA512, data.as_bytes());

    if constant_time_eq(expected.as_ref(), &provided) {
        Ok(())
    } else {
        Err(SignatureError::SignatureMismatch)
    }
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(signature_key: Option<String>) -> PaymentNotification {
        PaymentNotification {
            order_id: "0190f5e2-7b1a-7cc0-9a43-3c1f0c1d2e3f".to_string(),
            transaction_status: "settlement".to_string(),
            fraud_status: Some("accept".to_string()),
            payment_type: Some("bank_transfer".to_string()),
            status_code: Some("200".to_string()),
            gross_amount: Some("10000.00".to_string()),
            signature_key,
        }
    }

    #[test]
    fn test_verify_notification_roundtrip() {
        let sig = notification_signature(
            "0190f5e2-7b1a-7cc0-9a43-3c1f0c1d2e3f",
            "200",
            "10000.00",
            "server-key",
        );
        assert_eq!(sig.len(), 128);
        assert!(verify_notification(&notification(Some(sig)), "server-key").is_ok());
    }

    #[test]
    fn test_verify_notification_rejects_wrong_key() {
        let sig = notification_signature(
            "0190f5e2-7b1a-7cc0-9a43-3c1f0c1d2e3f",
            "200",
            "10000.00",
            "server-key",
        );
        assert!(matches!(
            verify_notification(&notification(Some(sig)), "other-key"),
            Err(SignatureError::SignatureMismatch)
        ));
        assert!(matches!(
            verify_notification(&notification(None), "server-key"),
            Err(SignatureError::MissingField("signature_key"))
        ));
        assert!(matches!(
            verify_notification(&notification(Some("zz".to_string())), "server-key"),
            Err(SignatureError::InvalidHex)
        ));
    }

    #[test]
    fn test_verify_notification_rejects_tampered_or_truncated_digest() {
        let sig = notification_signature(
            "0190f5e2-7b1a-7cc0-9a43-3c1f0c1d2e3f",
            "200",
            "10000.00",
            "server-key",
        );
        let mut tampered = hex::decode(&sig).unwrap();
        tampered[63] ^= 0x01;
        assert!(matches!(
            verify_notification(&notification(Some(hex::encode(&tampered))), "server-key"),
            Err(SignatureError::SignatureMismatch)
        ));
        assert!(matches!(
            verify_notification(&notification(Some(sig[..64].to_string())), "server-key"),
            Err(SignatureError::SignatureMismatch)
        ));
        assert!(matches!(
            verify_notification(&notification(Some(sig.to_uppercase())), "server-key"),
            Ok(())
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"rantang", b"rantang"));
        assert!(!constant_time_eq(b"rantang", b"rantanG"));
        assert!(!constant_time_eq(b"rantang", b"rantan"));
    }
}
