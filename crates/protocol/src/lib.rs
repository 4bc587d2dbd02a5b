//! Line-delimited JSON protocol for the Daraja bridge.
//!
//! This crate owns the wire format only: decoding one input line into a
//! [`Request`] and writing [`Response`] lines back out.
//!
//! # Example
//!
//! ```no_run
//! use protocol::{parse_line, Response, ResponseWriter};
//!
//! # async fn example() -> std::io::Result<()> {
//! let writer = ResponseWriter::new(tokio::io::stdout());
//!
//! match parse_line(r#"{"id":"a1","tool":"list_tools"}"#) {
//!     Ok(request) => {
//!         let response = Response::success(request.id, serde_json::json!({}));
//!         writer.write(&response).await?;
//!     }
//!     Err(rejected) => eprintln!("dropped line: {rejected}"),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod writer;

pub use error::{ParseError, RejectedLine, Result};
pub use message::{Outcome, Request, RequestId, Response, parse_line};
pub use writer::ResponseWriter;
