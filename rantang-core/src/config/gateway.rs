//! Payment gateway configuration.

use url::Url;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server key used for Basic auth and notification signatures.
    pub server_key: String,
    /// Base URL of the checkout session API (e.g. `https://app.sandbox.midtrans.com`).
    pub snap_base_url: Url,
    /// Base URL of the transaction status API (e.g. `https://api.sandbox.midtrans.com`).
    pub api_base_url: Url,
    /// Where the checkout page sends the buyer after payment.
    pub finish_redirect_url: Option<Url>,
    /// Reject notifications whose `signature_key` does not verify.
    pub verify_signature: bool,
}
