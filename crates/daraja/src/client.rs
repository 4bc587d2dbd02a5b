//! Daraja sandbox client.

use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Response;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::api::{
    self, C2B_REGISTER_PATH, OAUTH_PATH, RegisterUrlBody, STK_PUSH_PATH, STK_QUERY_PATH, StkPush,
    StkPushBody, StkQueryBody, TokenResponse,
};
use crate::{Error, Result};

pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const SANDBOX_SHORTCODE: &str = "174379";
/// Example passkey from the Daraja docs; real accounts get their own.
pub const SANDBOX_PASSKEY: &str = "bfb279f9aa9bdbcf1xxxxxxxxxxxxxxxxxxxxxxxxxxxx";
pub const DEFAULT_CALLBACK_URL: &str = "https://example.com/mpesa/callback";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tokens are refreshed this long before the sandbox says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Upper bound on how long a token is cached, whatever `expires_in` says.
const MAX_TOKEN_LIFETIME_SECS: u64 = 24 * 3600;

const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const RESPONSE_TYPE: &str = "Completed";

/// Consumer key/secret pair from the Daraja developer portal.
#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Builder for creating a Daraja client.
#[derive(Debug, Clone)]
pub struct DarajaClientBuilder {
    credentials: Option<Credentials>,
    shortcode: String,
    passkey: String,
    base_url: String,
    callback_url: String,
    request_timeout: Duration,
    auth_timeout: Duration,
}

impl Default for DarajaClientBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            shortcode: SANDBOX_SHORTCODE.to_string(),
            passkey: SANDBOX_PASSKEY.to_string(),
            base_url: SANDBOX_BASE_URL.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }
}

impl DarajaClientBuilder {
    pub fn credentials(
        mut self,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        });
        self
    }

    pub fn shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.shortcode = shortcode.into();
        self
    }

    pub fn passkey(mut self, passkey: impl Into<String>) -> Self {
        self.passkey = passkey.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = callback_url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DarajaClient> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| Error::Build(e.to_string()))?;

        Ok(DarajaClient {
            http,
            credentials: self.credentials,
            shortcode: self.shortcode,
            passkey: self.passkey,
            base_url: self.base_url,
            callback_url: self.callback_url,
            auth_timeout: self.auth_timeout,
            token: Mutex::new(None),
        })
    }
}

/// Client for the Safaricom Daraja sandbox.
///
/// Holds one cached OAuth token; every authenticated call reuses it until it
/// is within 30 seconds of expiring.
pub struct DarajaClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    shortcode: String,
    passkey: String,
    base_url: String,
    callback_url: String,
    auth_timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl DarajaClient {
    pub fn builder() -> DarajaClientBuilder {
        DarajaClientBuilder::default()
    }

    pub fn shortcode(&self) -> &str {
        &self.shortcode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Trigger an STK push prompt on the customer's phone.
    ///
    /// Returns the sandbox JSON body (`CheckoutRequestID`, `ResponseCode`, ...).
    pub async fn stk_push(&self, request: &StkPush) -> Result<Value> {
        let timestamp = timestamp();
        let body = StkPushBody {
            business_short_code: &self.shortcode,
            password: self.password(&timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE,
            amount: request.amount,
            party_a: &request.phone_number,
            party_b: &self.shortcode,
            phone_number: &request.phone_number,
            callback_url: &self.callback_url,
            account_reference: api::account_reference(&request.description),
            transaction_desc: &request.description,
        };

        tracing::debug!(
            phone_number = %request.phone_number,
            amount = request.amount,
            "sending STK push"
        );
        self.post(STK_PUSH_PATH, &body).await
    }

    /// Query an STK push by the `CheckoutRequestID` it returned.
    pub async fn query_stk_status(&self, checkout_request_id: &str) -> Result<Value> {
        let timestamp = timestamp();
        let body = StkQueryBody {
            business_short_code: &self.shortcode,
            password: self.password(&timestamp),
            timestamp,
            checkout_request_id,
        };

        tracing::debug!(checkout_request_id, "querying STK push status");
        self.post(STK_QUERY_PATH, &body).await
    }

    /// Register `url` as both the C2B confirmation and validation URL.
    pub async fn register_callback_url(&self, url: &str) -> Result<Value> {
        let body = RegisterUrlBody {
            short_code: &self.shortcode,
            response_type: RESPONSE_TYPE,
            confirmation_url: url,
            validation_url: url,
        };

        tracing::debug!(url, "registering C2B callback URL");
        self.post(C2B_REGISTER_PATH, &body).await
    }

    /// Canonical sandbox shortcode and example passkey. No network access.
    pub fn test_credentials() -> Value {
        json!({
            "Shortcode": SANDBOX_SHORTCODE,
            "Passkey": SANDBOX_PASSKEY,
            "Notes": "Use your own DARAJA_CONSUMER_KEY and DARAJA_CONSUMER_SECRET from the Safaricom developer portal.",
        })
    }

    /// Get a valid OAuth access token, fetching a new one if needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.expires_at) {
            return Ok(token.value.clone());
        }

        let credentials = self.credentials.as_ref().ok_or(Error::MissingCredentials)?;
        let url = format!("{}{OAUTH_PATH}", self.base_url);
        tracing::debug!(%url, "requesting OAuth token");

        let response = self
            .http
            .get(&url)
            .basic_auth(&credentials.consumer_key, Some(&credentials.consumer_secret))
            .timeout(self.auth_timeout)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let value = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("response carried no access_token".to_string()))?;
        let lifetime = token
            .expires_in
            .and_then(|e| e.seconds())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .min(MAX_TOKEN_LIFETIME_SECS);

        tracing::debug!(expires_in = lifetime, "obtained OAuth token");
        let refresh_after = Duration::from_secs(lifetime).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let now = Instant::now();
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: now.checked_add(refresh_after).unwrap_or(now),
        });

        Ok(value)
    }

    /// `base64(shortcode + passkey + timestamp)`.
    pub fn password(&self, timestamp: &str) -> String {
        let raw = format!("{}{}{timestamp}", self.shortcode, self.passkey);
        STANDARD.encode(raw)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let token = self.access_token().await?;
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        read_json(response).await
    }
}

impl std::fmt::Display for DarajaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "daraja({}, shortcode={})", self.base_url, self.shortcode)
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| Error::InvalidResponse(e.to_string()))
}

/// `YYYYMMDDHHMMSS` in UTC.
fn timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}
