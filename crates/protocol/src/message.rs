//! Line protocol types.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"id": "a1", "tool": "simulate_stk_push", "args": {...}}
//! <- {"id": "a1", "result": {...}}
//! <- {"id": "a1", "error": "unknown tool: foo"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParseError, RejectedLine, Result};

/// Request ID (can be string or number).
///
/// Echoed back verbatim; the server never interprets or deduplicates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A validated tool invocation read from one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub tool: String,
    pub args: Map<String, Value>,
}

impl Request {
    pub fn new(id: impl Into<RequestId>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            args: Map::new(),
        }
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }
}

/// Parse one input line into a [`Request`].
///
/// `args` may be absent or `null`, in which case it is empty. Extra top-level
/// fields are ignored.
pub fn parse_line(line: &str) -> Result<Request> {
    let value: Value = serde_json::from_str(line).map_err(|_| ParseError::InvalidJson)?;
    let Value::Object(mut object) = value else {
        return Err(ParseError::NotAnObject.into());
    };

    let id = match object.remove("id") {
        None | Some(Value::Null) => return Err(ParseError::MissingField("id").into()),
        Some(Value::String(s)) if s.is_empty() => {
            return Err(ParseError::MissingField("id").into());
        }
        Some(Value::String(s)) => RequestId::String(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => RequestId::Number(n),
            None => return Err(ParseError::InvalidId.into()),
        },
        Some(_) => return Err(ParseError::InvalidId.into()),
    };

    let tool = match object.remove("tool") {
        None | Some(Value::Null) => {
            return Err(RejectedLine::with_id(id, ParseError::MissingField("tool")));
        }
        Some(Value::String(s)) if s.is_empty() => {
            return Err(RejectedLine::with_id(id, ParseError::MissingField("tool")));
        }
        Some(Value::String(s)) => s,
        Some(_) => return Err(RejectedLine::with_id(id, ParseError::ToolNotString)),
    };

    let args = match object.remove("args") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(args)) => args,
        Some(_) => return Err(RejectedLine::with_id(id, ParseError::ArgsNotObject)),
    };

    Ok(Request { id, tool, args })
}

/// The single outcome carried by a [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Result(Value),
    Error(String),
}

/// A response line, correlated to its request by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(id: RequestId, error: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Error(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Result(_))
    }

    /// Returns the result if successful, or the error message.
    pub fn into_result(self) -> std::result::Result<Value, String> {
        match self.outcome {
            Outcome::Result(value) => Ok(value),
            Outcome::Error(message) => Err(message),
        }
    }
}
