//! Request dispatch.

use std::sync::Arc;

use protocol::{Request, Response};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::tools::{DispatchError, ToolError, ToolRegistry};

/// Routes requests to registered tools.
///
/// Holds no mutable state, so a single dispatcher can serve concurrent
/// requests; correlation lives entirely in the request id.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request. Always yields exactly one response with the
    /// request's id.
    pub async fn dispatch(&self, request: Request) -> Response {
        let Request { id, tool, args } = request;
        let span = tracing::info_span!("dispatch", %id, tool = %tool);

        let outcome = self.invoke(&tool, &args).instrument(span.clone()).await;
        let _entered = span.enter();
        match outcome {
            Ok(result) => {
                tracing::info!("tool succeeded");
                Response::success(id, result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "tool failed");
                Response::failure(id, e.to_string())
            }
        }
    }

    /// Look up, validate and run a tool.
    ///
    /// The handler is not invoked when validation fails.
    pub async fn invoke(
        &self,
        tool: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        let handler = self
            .registry
            .lookup(tool)
            .ok_or_else(|| DispatchError::UnknownTool(tool.to_string()))?;

        handler
            .spec()
            .validate(args)
            .map_err(ToolError::InvalidArguments)?;

        tracing::debug!("invoking tool");
        Ok(handler.call(args).await?)
    }
}
