//! Tools backed by the mobile-money sandbox.

use std::sync::Arc;

use async_trait::async_trait;
use daraja::{DarajaClient, StkPush};
use serde_json::{Map, Value};

use super::types::{amount_arg, str_arg};
use super::{ArgKind, ArgSpec, Tool, ToolError, ToolSpec};

/// The sandbox operations the tools delegate to.
///
/// Errors come back as display text; the tools never interpret
/// provider-specific codes.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn stk_push(&self, request: &StkPush) -> Result<Value, ToolError>;
    async fn query_stk_status(&self, checkout_request_id: &str) -> Result<Value, ToolError>;
    async fn register_callback_url(&self, url: &str) -> Result<Value, ToolError>;
    fn test_credentials(&self) -> Value;
}

#[async_trait]
impl SandboxProvider for DarajaClient {
    async fn stk_push(&self, request: &StkPush) -> Result<Value, ToolError> {
        Ok(DarajaClient::stk_push(self, request).await?)
    }

    async fn query_stk_status(&self, checkout_request_id: &str) -> Result<Value, ToolError> {
        Ok(DarajaClient::query_stk_status(self, checkout_request_id).await?)
    }

    async fn register_callback_url(&self, url: &str) -> Result<Value, ToolError> {
        Ok(DarajaClient::register_callback_url(self, url).await?)
    }

    fn test_credentials(&self) -> Value {
        DarajaClient::test_credentials()
    }
}

/// Every sandbox tool, wired to `provider`.
pub fn sandbox_tools(provider: Arc<dyn SandboxProvider>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(SimulateStkPush::new(provider.clone())) as Arc<dyn Tool>,
        Arc::new(QueryTransactionStatus::new(provider.clone())) as Arc<dyn Tool>,
        Arc::new(RegisterCallbackUrl::new(provider.clone())) as Arc<dyn Tool>,
        Arc::new(GenerateTestCredentials::new(provider)) as Arc<dyn Tool>,
    ]
}

pub struct SimulateStkPush {
    spec: ToolSpec,
    provider: Arc<dyn SandboxProvider>,
}

impl SimulateStkPush {
    pub fn new(provider: Arc<dyn SandboxProvider>) -> Self {
        let spec = ToolSpec::new(
            "simulate_stk_push",
            "simulate_stk_push(phone_number, amount, description): Trigger an STK Push via the \
             Daraja sandbox. phone_number is digits only with country code (e.g. 2547XXXXXXXX). \
             amount is whole KES. description is a short string.",
        )
        .arg(ArgSpec::required(
            "phone_number",
            ArgKind::PhoneNumber,
            "string, digits with country code (e.g. 2547XXXXXXXX)",
        ))
        .arg(ArgSpec::required("amount", ArgKind::Amount, "integer, KES"))
        .arg(ArgSpec::required(
            "description",
            ArgKind::String,
            "string, short transaction description",
        ));
        Self { spec, provider }
    }
}

#[async_trait]
impl Tool for SimulateStkPush {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let request = StkPush {
            phone_number: str_arg(args, "phone_number")?.to_string(),
            amount: amount_arg(args, "amount")?,
            description: str_arg(args, "description")?.to_string(),
        };
        self.provider.stk_push(&request).await
    }
}

pub struct QueryTransactionStatus {
    spec: ToolSpec,
    provider: Arc<dyn SandboxProvider>,
}

impl QueryTransactionStatus {
    pub fn new(provider: Arc<dyn SandboxProvider>) -> Self {
        let spec = ToolSpec::new(
            "query_transaction_status",
            "query_transaction_status(checkout_request_id): Query the status of an STK push \
             using its CheckoutRequestID.",
        )
        .arg(ArgSpec::required(
            "checkout_request_id",
            ArgKind::String,
            "string, CheckoutRequestID returned by simulate_stk_push",
        ));
        Self { spec, provider }
    }
}

#[async_trait]
impl Tool for QueryTransactionStatus {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let checkout_request_id = str_arg(args, "checkout_request_id")?;
        self.provider.query_stk_status(checkout_request_id).await
    }
}

pub struct RegisterCallbackUrl {
    spec: ToolSpec,
    provider: Arc<dyn SandboxProvider>,
}

impl RegisterCallbackUrl {
    pub fn new(provider: Arc<dyn SandboxProvider>) -> Self {
        let spec = ToolSpec::new(
            "register_callback_url",
            "register_callback_url(url): Register one HTTPS url as both ConfirmationURL and \
             ValidationURL for C2B in the Daraja sandbox. url must be publicly reachable.",
        )
        .arg(ArgSpec::required(
            "url",
            ArgKind::HttpsUrl,
            "string, HTTPS public URL to receive Daraja callbacks",
        ));
        Self { spec, provider }
    }
}

#[async_trait]
impl Tool for RegisterCallbackUrl {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let url = str_arg(args, "url")?;
        self.provider.register_callback_url(url).await
    }
}

pub struct GenerateTestCredentials {
    spec: ToolSpec,
    provider: Arc<dyn SandboxProvider>,
}

impl GenerateTestCredentials {
    pub fn new(provider: Arc<dyn SandboxProvider>) -> Self {
        let spec = ToolSpec::new(
            "generate_test_credentials",
            "generate_test_credentials(): Return the sandbox Shortcode and example Passkey for \
             quick testing.",
        );
        Self { spec, provider }
    }
}

#[async_trait]
impl Tool for GenerateTestCredentials {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _args: &Map<String, Value>) -> Result<Value, ToolError> {
        Ok(self.provider.test_credentials())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Records calls and answers with canned values.
    #[derive(Default)]
    pub struct FakeProvider {
        pub calls: Mutex<Vec<String>>,
        pub fail_with: Option<String>,
    }

    impl FakeProvider {
        pub fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: String, value: Value) -> Result<Value, ToolError> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some(message) => Err(ToolError::Provider(message.clone())),
                None => Ok(value),
            }
        }
    }

    #[async_trait]
    impl SandboxProvider for FakeProvider {
        async fn stk_push(&self, request: &StkPush) -> Result<Value, ToolError> {
            self.answer(
                format!(
                    "stk_push {} {} {}",
                    request.phone_number, request.amount, request.description
                ),
                json!({"CheckoutRequestID": "ws_CO_test", "ResponseCode": "0"}),
            )
        }

        async fn query_stk_status(&self, checkout_request_id: &str) -> Result<Value, ToolError> {
            self.answer(
                format!("query {checkout_request_id}"),
                json!({"ResultCode": "0", "ResultDesc": "processed"}),
            )
        }

        async fn register_callback_url(&self, url: &str) -> Result<Value, ToolError> {
            self.answer(format!("register {url}"), json!({"ResponseDescription": "success"}))
        }

        fn test_credentials(&self) -> Value {
            DarajaClient::test_credentials()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::FakeProvider;
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn tool_names() {
        let tools = sandbox_tools(Arc::new(FakeProvider::default()));
        let names: Vec<_> = tools.iter().map(|t| t.spec().name.clone()).collect();
        assert_eq!(
            names,
            [
                "simulate_stk_push",
                "query_transaction_status",
                "register_callback_url",
                "generate_test_credentials"
            ]
        );
    }

    #[tokio::test]
    async fn stk_push_forwards_typed_args() {
        let provider = Arc::new(FakeProvider::default());
        let tool = SimulateStkPush::new(provider.clone());
        let result = tool
            .call(&args(json!({
                "phone_number": "254712345678",
                "amount": 5.0,
                "description": "test"
            })))
            .await
            .unwrap();
        assert_eq!(result["CheckoutRequestID"], "ws_CO_test");
        assert_eq!(provider.calls(), ["stk_push 254712345678 5 test"]);
    }

    #[tokio::test]
    async fn provider_error_text_passes_through() {
        let provider = Arc::new(FakeProvider::failing("provider rejected request (400): nope"));
        let tool = QueryTransactionStatus::new(provider);
        let err = tool
            .call(&args(json!({"checkout_request_id": "ws_CO_1"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "provider rejected request (400): nope");
    }

    #[tokio::test]
    async fn test_credentials_need_no_network() {
        let provider = Arc::new(FakeProvider::failing("unreachable"));
        let tool = GenerateTestCredentials::new(provider.clone());
        let result = tool.call(&Map::new()).await.unwrap();
        assert_eq!(result["Shortcode"], "174379");
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn daraja_errors_become_provider_text() {
        let err = ToolError::from(daraja::Error::MissingCredentials);
        assert_eq!(
            err.to_string(),
            "DARAJA_CONSUMER_KEY and DARAJA_CONSUMER_SECRET must be set"
        );
    }
}
