//! Host service bundle handed to the desktop runtime and its apps.

use std::rc::Rc;

use crate::{
    AgentService, DeviceScanner, MemoryToolStore, MockAgent, NoopDeviceScanner, PrefsStore,
    PrefsToolStore, ToolStore,
};

/// Injected host services. Clones share the underlying adapters.
#[derive(Clone)]
pub struct HostServices {
    /// Tool-definition registry.
    pub tools: Rc<dyn ToolStore>,
    /// Conversational backend.
    pub agent: Rc<dyn AgentService>,
    /// Device picker behind the dock status icon.
    pub devices: Rc<dyn DeviceScanner>,
}

impl HostServices {
    /// Fully in-memory services: scripted agent, memory tool store, no device API.
    pub fn offline() -> Self {
        Self {
            tools: Rc::new(MemoryToolStore::default()),
            agent: Rc::new(MockAgent::new()),
            devices: Rc::new(NoopDeviceScanner),
        }
    }

    /// Offline services with tools persisted in `prefs`.
    pub fn with_prefs<P: PrefsStore + 'static>(prefs: P) -> Self {
        Self {
            tools: Rc::new(PrefsToolStore::new(prefs)),
            ..Self::offline()
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
