//! Typed host-service contracts and in-memory adapters used by the desktop runtime and its apps.
//!
//! Every service is a trait returning boxed single-threaded futures so browser and test hosts can
//! supply their own adapters. The in-memory and no-op adapters here back tests and offline hosts.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod devices;
pub mod host;
pub mod storage;
pub mod time;

pub use agent::{
    parse_agent_reply, AgentError, AgentFuture, AgentReply, AgentService, ChatMessage,
    MessageSender, MockAgent, NoopAgentService, ToolCallEnvelope, ToolCallRequest,
    ToolManifestItem,
};
pub use devices::{
    DeviceRecord, DeviceScanError, DeviceScanFuture, DeviceScanState, DeviceScanner,
    DiscoveredDevice, NoopDeviceScanner, ScriptedDeviceScanner, UNKNOWN_DEVICE_NAME,
};
pub use host::HostServices;
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, PrefsStore, PrefsStoreFuture,
};
pub use storage::tools::{
    default_tool_definitions, seed_default_tools, MemoryToolStore, PrefsToolStore,
    ToolDefinition, ToolParameter, ToolStore, ToolStoreError, ToolStoreFuture, TOOLS_PREFS_KEY,
};
pub use time::{next_monotonic_timestamp_ms, unique_token, unix_time_ms_now};
