//! Process-wide tool registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Tool, ToolError, ToolSpec};
use crate::{Error, Result};

pub const LIST_TOOLS: &str = "list_tools";

/// Immutable name → tool mapping.
///
/// Built once through [`ToolRegistryBuilder`] before the dispatch loop starts
/// and only read afterwards, so it can be shared freely behind an `Arc`.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// All tool specs, sorted by name.
    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values().map(|t| t.spec())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}

/// Collects tools and freezes them into a [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn register_all(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Freeze the registry, adding the built-in `list_tools`.
    ///
    /// Fails if two tools share a name.
    pub fn build(self) -> Result<ToolRegistry> {
        let mut tools: BTreeMap<String, Arc<dyn Tool>> = BTreeMap::new();
        for tool in self.tools {
            let name = tool.spec().name.clone();
            if tools.insert(name.clone(), tool).is_some() {
                return Err(Error::DuplicateTool(name));
            }
        }

        let catalog: Map<String, Value> = tools
            .values()
            .map(|t| (t.spec().name.clone(), t.spec().catalog_entry()))
            .collect();
        let list = ListTools {
            spec: ToolSpec::new(
                LIST_TOOLS,
                "list_tools(): Describe every available tool and its arguments.",
            ),
            catalog: Value::Object(catalog),
        };
        if tools.insert(LIST_TOOLS.to_string(), Arc::new(list)).is_some() {
            return Err(Error::DuplicateTool(LIST_TOOLS.to_string()));
        }

        Ok(ToolRegistry { tools })
    }
}

/// Built-in catalog tool. The catalog is captured at build time.
struct ListTools {
    spec: ToolSpec,
    catalog: Value,
}

#[async_trait]
impl Tool for ListTools {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _args: &Map<String, Value>) -> std::result::Result<Value, ToolError> {
        Ok(self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ArgKind, ArgSpec};

    struct Named(ToolSpec);

    #[async_trait]
    impl Tool for Named {
        fn spec(&self) -> &ToolSpec {
            &self.0
        }

        async fn call(&self, _args: &Map<String, Value>) -> std::result::Result<Value, ToolError> {
            Ok(Value::Null)
        }
    }

    fn named(name: &str) -> Arc<dyn Tool> {
        Arc::new(Named(
            ToolSpec::new(name, format!("{name} tool"))
                .arg(ArgSpec::required("x", ArgKind::String, "an x")),
        ))
    }

    #[test]
    fn lookup_registered_tools() {
        let registry = ToolRegistry::builder()
            .register(named("a"))
            .register(named("b"))
            .build()
            .unwrap();
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("b").is_some());
        assert!(registry.lookup("c").is_none());
        // a, b, list_tools
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_names_fail() {
        let err = ToolRegistry::builder()
            .register_all([named("a"), named("a")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "a"));
    }

    #[test]
    fn list_tools_name_is_reserved() {
        let err = ToolRegistry::builder()
            .register(named(LIST_TOOLS))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(_)));
    }

    #[test]
    fn specs_are_sorted() {
        let registry = ToolRegistry::builder()
            .register(named("zeta"))
            .register(named("alpha"))
            .build()
            .unwrap();
        let names: Vec<_> = registry.specs().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "list_tools", "zeta"]);
    }

    #[tokio::test]
    async fn list_tools_describes_other_tools() {
        let registry = ToolRegistry::builder()
            .register(named("a"))
            .build()
            .unwrap();
        let list = registry.lookup(LIST_TOOLS).unwrap();
        let catalog = list.call(&Map::new()).await.unwrap();
        assert_eq!(catalog["a"]["description"], "a tool");
        assert_eq!(catalog["a"]["args"]["x"], "an x");
        assert!(catalog.get(LIST_TOOLS).is_none());
    }
}
