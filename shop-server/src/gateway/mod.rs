//! VNPay-style redirect gateway protocol
//!
//! The exchange is a signed query string in both directions:
//!
//! 1. *Build request*: assemble the protocol parameters, sort them by key
//!    (byte order), form-urlencode (space as `+`), sign the encoded string
//!    with HMAC-SHA512, and append the hex digest as `vnp_SecureHash`.
//! 2. *Verify callback*: strip the hash fields from the returned query,
//!    re-sort and re-sign the rest, and compare in constant time. Any
//!    mismatch is a hard rejection.
//!
//! Credentials come from an explicit [`VnpayConfig`] injected at
//! construction; nothing is read from the environment at call time.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::orders::money;
use crate::utils::time;

type HmacSha512 = Hmac<Sha512>;

/// Gateway credentials and endpoints
#[derive(Debug, Clone)]
pub struct VnpayConfig {
    /// Merchant terminal code issued by the gateway
    pub tmn_code: String,
    /// HMAC secret shared with the gateway
    pub hash_secret: String,
    /// Gateway payment page
    pub base_url: String,
    /// Where the gateway redirects the customer back to
    pub return_url: String,
}

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("HMAC key error: {0}")]
    Key(String),
}

/// Verified callback, ready for settlement
#[derive(Debug, Clone)]
pub struct GatewayReturn {
    /// Merchant order reference (`vnp_TxnRef`)
    pub order_ref: String,
    /// Gateway response code (`"00"` is success)
    pub response_code: String,
    /// Gateway-side transaction number, when present
    pub transaction_no: Option<String>,
}

impl GatewayReturn {
    pub fn is_success(&self) -> bool {
        self.response_code == "00"
    }

    /// Human-readable reason for the response code
    pub fn reason(&self) -> &'static str {
        response_message(&self.response_code)
    }
}

/// Fixed response-code table (unknown codes fall back to a generic message)
fn response_message(code: &str) -> &'static str {
    match code {
        "00" => "Transaction successful",
        "07" => "Money deducted, transaction suspected of fraud",
        "09" => "Card/account not registered for online banking",
        "10" => "Card/account verification failed more than 3 times",
        "11" => "Payment window expired",
        "12" => "Card/account is locked",
        "13" => "Wrong one-time password",
        "24" => "Transaction cancelled by customer",
        "51" => "Insufficient account balance",
        "65" => "Daily transaction limit exceeded",
        "75" => "Bank under maintenance",
        "79" => "Wrong payment password too many times",
        _ => "Transaction failed",
    }
}

/// Normalize the client address the way the gateway expects
fn normalize_ip(ip: &str) -> &str {
    match ip {
        "::1" | "::ffff:127.0.0.1" | "" => "127.0.0.1",
        other => other,
    }
}

/// Redirect gateway client
#[derive(Debug, Clone)]
pub struct VnpayGateway {
    config: VnpayConfig,
}

impl VnpayGateway {
    pub fn new(config: VnpayConfig) -> Self {
        Self { config }
    }

    /// Sorted, form-urlencoded (`+` for space) `key=value&...` string
    fn encode_params(params: &BTreeMap<String, String>) -> String {
        serde_urlencoded::to_string(params).unwrap_or_default()
    }

    /// HMAC-SHA512 hex digest over the encoded parameter string
    fn sign(&self, sign_data: &str) -> Result<String, GatewayError> {
        let mut mac = HmacSha512::new_from_slice(self.config.hash_secret.as_bytes())
            .map_err(|e| GatewayError::Key(e.to_string()))?;
        mac.update(sign_data.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build the signed redirect URL for an order.
    ///
    /// `amount` is in major units; the gateway wants minor units (×100).
    pub fn build_payment_url(
        &self,
        order_id: u64,
        amount: f64,
        client_ip: &str,
    ) -> Result<String, GatewayError> {
        let create_date = time::gateway_timestamp(chrono::Utc::now());
        self.build_payment_url_at(order_id, amount, client_ip, &create_date)
    }

    /// Deterministic core of [`build_payment_url`] (timestamp supplied)
    pub fn build_payment_url_at(
        &self,
        order_id: u64,
        amount: f64,
        client_ip: &str,
        create_date: &str,
    ) -> Result<String, GatewayError> {
        let amount_minor = (money::to_decimal(amount) * rust_decimal::Decimal::from(100))
            .trunc()
            .to_string();

        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("vnp_Version".to_string(), "2.1.0".to_string());
        params.insert("vnp_Command".to_string(), "pay".to_string());
        params.insert("vnp_TmnCode".to_string(), self.config.tmn_code.clone());
        params.insert("vnp_Amount".to_string(), amount_minor);
        params.insert("vnp_CurrCode".to_string(), "VND".to_string());
        params.insert("vnp_TxnRef".to_string(), order_id.to_string());
        params.insert(
            "vnp_OrderInfo".to_string(),
            format!("Payment for order {}", order_id),
        );
        params.insert("vnp_OrderType".to_string(), "other".to_string());
        params.insert("vnp_Locale".to_string(), "vn".to_string());
        params.insert("vnp_ReturnUrl".to_string(), self.config.return_url.clone());
        params.insert(
            "vnp_IpAddr".to_string(),
            normalize_ip(client_ip).to_string(),
        );
        params.insert("vnp_CreateDate".to_string(), create_date.to_string());

        let sign_data = Self::encode_params(&params);
        let secure_hash = self.sign(&sign_data)?;
        params.insert("vnp_SecureHash".to_string(), secure_hash);

        Ok(format!(
            "{}?{}",
            self.config.base_url,
            Self::encode_params(&params)
        ))
    }

    /// Verify a gateway callback.
    ///
    /// The received hash is removed, the remaining parameters re-signed, and
    /// the digests compared in constant time (`Mac::verify_slice`).
    pub fn verify_return(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<GatewayReturn, GatewayError> {
        let received_hash = query
            .get("vnp_SecureHash")
            .ok_or(GatewayError::MissingParameter("vnp_SecureHash"))?;

        let params: BTreeMap<String, String> = query
            .iter()
            .filter(|(k, _)| k.as_str() != "vnp_SecureHash" && k.as_str() != "vnp_SecureHashType")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let sign_data = Self::encode_params(&params);
        let mut mac = HmacSha512::new_from_slice(self.config.hash_secret.as_bytes())
            .map_err(|e| GatewayError::Key(e.to_string()))?;
        mac.update(sign_data.as_bytes());

        let received = hex::decode(received_hash).map_err(|_| GatewayError::InvalidSignature)?;
        mac.verify_slice(&received)
            .map_err(|_| GatewayError::InvalidSignature)?;

        let order_ref = params
            .get("vnp_TxnRef")
            .cloned()
            .ok_or(GatewayError::MissingParameter("vnp_TxnRef"))?;
        let response_code = params
            .get("vnp_ResponseCode")
            .cloned()
            .ok_or(GatewayError::MissingParameter("vnp_ResponseCode"))?;

        Ok(GatewayReturn {
            order_ref,
            response_code,
            transaction_no: params.get("vnp_TransactionNo").cloned(),
        })
    }
}
