//! Tool trait.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{ToolError, ToolSpec};

/// A named handler the dispatcher can invoke.
///
/// Implementations receive arguments that already passed
/// [`ToolSpec::validate`] for their own spec. This is the boundary between
/// the dispatch loop and side effects.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name, description and argument contract.
    fn spec(&self) -> &ToolSpec;

    /// Execute the tool.
    async fn call(&self, args: &Map<String, Value>) -> Result<Value, ToolError>;
}
