//! Bridge runtime: tool registry, dispatcher, and the STDIO loop.
//!
//! # Overview
//!
//! - **Tool**: a named, async handler with a declared argument contract
//!   ([`ToolSpec`]).
//! - **ToolRegistry**: the immutable name → tool mapping, built once at
//!   startup.
//! - **Dispatcher**: turns one [`protocol::Request`] into exactly one
//!   [`protocol::Response`], converting every failure into an error response.
//! - **Server**: the read → dispatch → write loop over stdin/stdout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bridge::{Dispatcher, Server, ToolRegistry, sandbox_tools};
//! use daraja::DarajaClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DarajaClient::builder()
//!     .credentials("consumer-key", "consumer-secret")
//!     .build()?;
//!
//! let registry = ToolRegistry::builder()
//!     .register_all(sandbox_tools(Arc::new(client)))
//!     .build()?;
//!
//! let server = Server::new(Dispatcher::new(Arc::new(registry)));
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod server;
pub mod tools;

pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use server::{MAX_LINE_SIZE, ServeSummary, Server};
pub use tools::{
    ArgKind, ArgSpec, DispatchError, SandboxProvider, Tool, ToolError, ToolRegistry, ToolSpec,
    sandbox_tools,
};
