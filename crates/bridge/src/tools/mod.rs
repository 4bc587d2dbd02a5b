//! Tool definitions, registry, and the sandbox tools.

pub mod errors;
mod registry;
mod sandbox;
mod tool;
mod types;

pub use errors::{DispatchError, ToolError};
pub use registry::{LIST_TOOLS, ToolRegistry, ToolRegistryBuilder};
pub use sandbox::{
    GenerateTestCredentials, QueryTransactionStatus, RegisterCallbackUrl, SandboxProvider,
    SimulateStkPush, sandbox_tools,
};
pub use tool::Tool;
pub use types::{ArgKind, ArgSpec, ToolSpec};

#[cfg(test)]
pub(crate) use sandbox::testing;
