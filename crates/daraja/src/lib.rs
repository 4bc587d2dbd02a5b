//! Safaricom Daraja sandbox client.
//!
//! Wraps the handful of Daraja endpoints the bridge exposes: OAuth token
//! generation, STK push, STK push status query, and C2B URL registration.
//! Provider responses are returned as raw JSON.
//!
//! # Example
//!
//! ```no_run
//! use daraja::{DarajaClient, StkPush};
//!
//! # async fn example() -> daraja::Result<()> {
//! let client = DarajaClient::builder()
//!     .credentials("consumer-key", "consumer-secret")
//!     .build()?;
//!
//! let result = client
//!     .stk_push(&StkPush {
//!         phone_number: "254712345678".into(),
//!         amount: 1,
//!         description: "test".into(),
//!     })
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod error;

pub use api::StkPush;
pub use client::{
    Credentials, DEFAULT_AUTH_TIMEOUT, DEFAULT_CALLBACK_URL, DEFAULT_REQUEST_TIMEOUT,
    DarajaClient, DarajaClientBuilder, SANDBOX_BASE_URL, SANDBOX_PASSKEY, SANDBOX_SHORTCODE,
};
pub use error::{Error, Result};
