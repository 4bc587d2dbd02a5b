//! Daraja wire types.

use serde::{Deserialize, Serialize};

pub(crate) const OAUTH_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
pub(crate) const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
pub(crate) const STK_QUERY_PATH: &str = "/mpesa/stkpushquery/v1/query";
pub(crate) const C2B_REGISTER_PATH: &str = "/mpesa/c2b/v1/registerurl";

/// Daraja caps `AccountReference` at 12 characters.
pub(crate) const ACCOUNT_REFERENCE_MAX: usize = 12;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<ExpiresIn>,
}

/// The sandbox sends `expires_in` as a string; accept both forms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    pub fn seconds(&self) -> Option<u64> {
        match self {
            Self::Seconds(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StkPushBody<'a> {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: &'a str,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "PartyA")]
    pub party_a: &'a str,
    #[serde(rename = "PartyB")]
    pub party_b: &'a str,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: &'a str,
    #[serde(rename = "CallBackURL")]
    pub callback_url: &'a str,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StkQueryBody<'a> {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: &'a str,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterUrlBody<'a> {
    #[serde(rename = "ShortCode")]
    pub short_code: &'a str,
    #[serde(rename = "ResponseType")]
    pub response_type: &'static str,
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: &'a str,
    #[serde(rename = "ValidationURL")]
    pub validation_url: &'a str,
}

/// Parameters for an STK push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StkPush {
    /// Full international format without `+`, e.g. `254712345678`.
    pub phone_number: String,
    /// Whole KES.
    pub amount: u64,
    pub description: String,
}

pub(crate) fn account_reference(description: &str) -> String {
    description.chars().take(ACCOUNT_REFERENCE_MAX).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_in_accepts_string_and_number() {
        let a: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":"3599"}"#).unwrap();
        assert_eq!(a.expires_in.unwrap().seconds(), Some(3599));
        let b: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":120}"#).unwrap();
        assert_eq!(b.expires_in.unwrap().seconds(), Some(120));
        let c: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":"soon"}"#).unwrap();
        assert_eq!(c.expires_in.unwrap().seconds(), None);
    }

    #[test]
    fn account_reference_is_truncated_by_chars() {
        assert_eq!(account_reference("test"), "test");
        assert_eq!(account_reference("Invoice 2024-0001"), "Invoice 2024");
        assert_eq!(account_reference("ñññññññññññññ").chars().count(), 12);
    }

    #[test]
    fn stk_body_field_names() {
        let body = StkPushBody {
            business_short_code: "174379",
            password: "pw".into(),
            timestamp: "20240101000000".into(),
            transaction_type: "CustomerPayBillOnline",
            amount: 1,
            party_a: "254712345678",
            party_b: "174379",
            phone_number: "254712345678",
            callback_url: "https://example.com/cb",
            account_reference: "test".into(),
            transaction_desc: "test",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["CallBackURL"], "https://example.com/cb");
        assert_eq!(json["BusinessShortCode"], "174379");
        assert_eq!(json["Amount"], 1);
    }
}
