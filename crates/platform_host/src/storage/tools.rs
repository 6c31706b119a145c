//! Tool-definition storage: the named registry of user-authored tools the CLI agent may call.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prefs::{load_pref_with, save_pref_with, PrefsStore};

/// Preference key holding the serialized tool list.
pub const TOOLS_PREFS_KEY: &str = "cognitive_os_tools";

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Argument name, referenced by the tool body.
    pub name: String,
    /// Documented type (`string`, `number`, ...); informational only.
    #[serde(rename = "type")]
    pub param_type: String,
    /// Human-readable description.
    pub description: String,
}

/// A stored tool. `tool_name` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Opaque record id.
    pub id: String,
    /// Unique identifier-style name.
    pub tool_name: String,
    /// Natural-language description offered to the agent.
    pub description: String,
    /// Declared parameters, in call order.
    pub parameters: Vec<ToolParameter>,
    /// Executable body, run by the tool sandbox.
    pub code: String,
}

/// Tool storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolStoreError {
    /// `add` was called with a name that is already registered.
    #[error("tool with name \"{0}\" already exists")]
    DuplicateTool(String),
    /// The backing store rejected a write.
    #[error("tool storage failed: {0}")]
    Storage(String),
}

/// Object-safe boxed future used by [`ToolStore`] async methods.
pub type ToolStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Injected registry of tool definitions keyed by `tool_name`.
pub trait ToolStore {
    /// Returns every stored tool in insertion order.
    fn load_all(&self) -> ToolStoreFuture<'_, Result<Vec<ToolDefinition>, ToolStoreError>>;

    /// Adds a tool.
    ///
    /// Fails with [`ToolStoreError::DuplicateTool`] when the name is taken; the store is left
    /// unchanged in that case.
    fn add(&self, tool: ToolDefinition) -> ToolStoreFuture<'_, Result<(), ToolStoreError>>;

    /// Looks a tool up by name.
    fn find_by_name<'a>(
        &'a self,
        tool_name: &'a str,
    ) -> ToolStoreFuture<'a, Result<Option<ToolDefinition>, ToolStoreError>>;

    /// Removes a tool by name. Removing an unknown name succeeds.
    fn remove<'a>(&'a self, tool_name: &'a str)
        -> ToolStoreFuture<'a, Result<(), ToolStoreError>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory tool store. Clones share the same list.
pub struct MemoryToolStore {
    inner: Rc<RefCell<Vec<ToolDefinition>>>,
}

impl ToolStore for MemoryToolStore {
    fn load_all(&self) -> ToolStoreFuture<'_, Result<Vec<ToolDefinition>, ToolStoreError>> {
        Box::pin(async move { Ok(self.inner.borrow().clone()) })
    }

    fn add(&self, tool: ToolDefinition) -> ToolStoreFuture<'_, Result<(), ToolStoreError>> {
        Box::pin(async move {
            let mut tools = self.inner.borrow_mut();
            if tools.iter().any(|t| t.tool_name == tool.tool_name) {
                return Err(ToolStoreError::DuplicateTool(tool.tool_name));
            }
            tools.push(tool);
            Ok(())
        })
    }

    fn find_by_name<'a>(
        &'a self,
        tool_name: &'a str,
    ) -> ToolStoreFuture<'a, Result<Option<ToolDefinition>, ToolStoreError>> {
        Box::pin(async move {
            Ok(self
                .inner
                .borrow()
                .iter()
                .find(|t| t.tool_name == tool_name)
                .cloned())
        })
    }

    fn remove<'a>(
        &'a self,
        tool_name: &'a str,
    ) -> ToolStoreFuture<'a, Result<(), ToolStoreError>> {
        Box::pin(async move {
            self.inner.borrow_mut().retain(|t| t.tool_name != tool_name);
            Ok(())
        })
    }
}

/// Tool store persisting the whole list as one JSON document in a [`PrefsStore`].
///
/// Unreadable or unavailable storage loads as an empty list so the CLI keeps working.
#[derive(Debug, Clone)]
pub struct PrefsToolStore<P> {
    prefs: P,
}

impl<P: PrefsStore> PrefsToolStore<P> {
    /// Wraps a preference store.
    pub fn new(prefs: P) -> Self {
        Self { prefs }
    }

    async fn read(&self) -> Vec<ToolDefinition> {
        match load_pref_with::<_, Vec<ToolDefinition>>(&self.prefs, TOOLS_PREFS_KEY).await {
            Ok(tools) => tools.unwrap_or_default(),
            Err(err) => {
                log::warn!("error loading tools from storage: {err}");
                Vec::new()
            }
        }
    }

    async fn write(&self, tools: &[ToolDefinition]) -> Result<(), ToolStoreError> {
        save_pref_with(&self.prefs, TOOLS_PREFS_KEY, tools)
            .await
            .map_err(ToolStoreError::Storage)
    }
}

impl<P: PrefsStore> ToolStore for PrefsToolStore<P> {
    fn load_all(&self) -> ToolStoreFuture<'_, Result<Vec<ToolDefinition>, ToolStoreError>> {
        Box::pin(async move { Ok(self.read().await) })
    }

    fn add(&self, tool: ToolDefinition) -> ToolStoreFuture<'_, Result<(), ToolStoreError>> {
        Box::pin(async move {
            let mut tools = self.read().await;
            if tools.iter().any(|t| t.tool_name == tool.tool_name) {
                log::warn!("tool with name \"{}\" already exists", tool.tool_name);
                return Err(ToolStoreError::DuplicateTool(tool.tool_name));
            }
            tools.push(tool);
            self.write(&tools).await
        })
    }

    fn find_by_name<'a>(
        &'a self,
        tool_name: &'a str,
    ) -> ToolStoreFuture<'a, Result<Option<ToolDefinition>, ToolStoreError>> {
        Box::pin(async move {
            Ok(self
                .read()
                .await
                .into_iter()
                .find(|t| t.tool_name == tool_name))
        })
    }

    fn remove<'a>(
        &'a self,
        tool_name: &'a str,
    ) -> ToolStoreFuture<'a, Result<(), ToolStoreError>> {
        Box::pin(async move {
            let mut tools = self.read().await;
            tools.retain(|t| t.tool_name != tool_name);
            self.write(&tools).await
        })
    }
}

/// Tools installed into an empty store on first boot.
pub fn default_tool_definitions() -> Vec<ToolDefinition> {
    let stamp = crate::time::next_monotonic_timestamp_ms();
    vec![
        ToolDefinition {
            id: format!("default-calculator-{stamp}"),
            tool_name: "calculator".to_string(),
            description: "Evaluates a simple mathematical expression string (e.g., \"2+2*3\"). \
                          Returns the result or an error message."
                .to_string(),
            parameters: vec![ToolParameter {
                name: "expression".to_string(),
                param_type: "string".to_string(),
                description: "The mathematical expression string to evaluate.".to_string(),
            }],
            code: "eval expression".to_string(),
        },
        ToolDefinition {
            id: format!("default-fetchAndSummarizeUrl-{stamp}"),
            tool_name: "fetchAndSummarizeUrl".to_string(),
            description: "MOCK: Takes a URL, pretends to fetch its content, and returns a short \
                          summary. For a real version, this needs a backend proxy due to CORS."
                .to_string(),
            parameters: vec![ToolParameter {
                name: "url".to_string(),
                param_type: "string".to_string(),
                description: "The URL of the webpage to summarize.".to_string(),
            }],
            code: "mock_summary url".to_string(),
        },
    ]
}

/// Installs [`default_tool_definitions`] when `store` is empty.
///
/// Returns the number of tools added.
///
/// # Errors
///
/// Propagates store failures.
pub async fn seed_default_tools<S: ToolStore + ?Sized>(store: &S) -> Result<usize, ToolStoreError> {
    if !store.load_all().await?.is_empty() {
        return Ok(0);
    }
    let defaults = default_tool_definitions();
    let count = defaults.len();
    for tool in defaults {
        log::info!("seeding default tool `{}`", tool.tool_name);
        store.add(tool).await?;
    }
    Ok(count)
}
