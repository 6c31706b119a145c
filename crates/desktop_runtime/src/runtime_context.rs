//! Runtime object owning the instance store, mounted app content, and host services.
//!
//! [`DesktopRuntime`] is the single long-lived container for one desktop. Every state change goes
//! through [`reduce_desktop`]; the [`RuntimeEffect`] values it emits are executed here, which is
//! where app content is mounted, dropped, and given keyboard focus.

use std::collections::BTreeMap;

use desktop_app_contract::{AppContent, AppInput, AppMountContext, ApplicationId, ContentView, InstanceId};
use platform_host::{seed_default_tools, DeviceScanState, HostServices};
use thiserror::Error;

use crate::{
    apps::{builtin_catalog, catalog_with_builtin_modules, AppCatalog, CatalogError},
    chrome::{gesture_actions, window_frames, ChromeBounds, WindowFrame, WindowGesture},
    config::{ConfigError, DesktopConfig},
    dock::{device_status_icon, dock_slots, DeviceStatusIcon, DockSlot},
    model::{DesktopState, Position, Size},
    placement::PlacementRules,
    reducer::{
        launch_instance, reduce_desktop, DesktopAction, ReducerContext, ReducerError,
        RuntimeEffect,
    },
};

/// Failures surfaced by [`DesktopRuntime`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Reducer(#[from] ReducerError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Owns one desktop: window state, the app catalog, mounted content, and device status.
pub struct DesktopRuntime {
    config: DesktopConfig,
    catalog: AppCatalog,
    state: DesktopState,
    contents: BTreeMap<InstanceId, Box<dyn AppContent>>,
    services: HostServices,
    device_scan: DeviceScanState,
    focused_input: Option<InstanceId>,
}

fn reducer_context<'a>(catalog: &'a AppCatalog, config: &DesktopConfig) -> ReducerContext<'a> {
    ReducerContext {
        registry: catalog.descriptors(),
        work_area: config.work_area,
        rules: PlacementRules::from(config),
    }
}

impl DesktopRuntime {
    /// Builds a runtime over the embedded catalog, or over `config.registry` when set.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] for invalid settings and [`RuntimeError::Catalog`] for an
    /// unusable registry.
    pub fn new(config: DesktopConfig, services: HostServices) -> Result<Self, RuntimeError> {
        config.validate()?;
        let catalog = match config.registry.clone() {
            Some(registry) => catalog_with_builtin_modules(registry, &services)?,
            None => builtin_catalog(&services)?,
        };
        Ok(Self::with_catalog(config, catalog, services))
    }

    /// Builds a runtime over an explicit catalog.
    pub fn with_catalog(config: DesktopConfig, catalog: AppCatalog, services: HostServices) -> Self {
        Self {
            config,
            catalog,
            state: DesktopState::default(),
            contents: BTreeMap::new(),
            services,
            device_scan: DeviceScanState::default(),
            focused_input: None,
        }
    }

    /// Seeds the default tools and opens every startup app in registry order.
    ///
    /// A failing tool store is logged and does not stop the boot.
    ///
    /// # Errors
    ///
    /// Propagates launch failures.
    pub async fn boot(&mut self) -> Result<Vec<InstanceId>, RuntimeError> {
        match seed_default_tools(self.services.tools.as_ref()).await {
            Ok(0) => {}
            Ok(count) => log::info!("seeded {count} default tools"),
            Err(err) => log::warn!("seeding default tools failed: {err}"),
        }

        let startup: Vec<ApplicationId> = self
            .catalog
            .descriptors()
            .iter()
            .filter(|d| d.open_on_startup)
            .map(|d| d.id.clone())
            .collect();
        let mut launched = Vec::with_capacity(startup.len());
        for app_id in startup {
            launched.push(self.launch(&app_id)?);
        }
        log::info!("desktop booted with {} startup instance(s)", launched.len());
        Ok(launched)
    }

    /// Applies `action` and executes the effects it emits.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Reducer`] when a launch names an unknown app.
    pub fn dispatch(&mut self, action: DesktopAction) -> Result<Vec<RuntimeEffect>, RuntimeError> {
        let ctx = reducer_context(&self.catalog, &self.config);
        let effects = reduce_desktop(&mut self.state, &ctx, action)?;
        self.run_effects(&effects);
        Ok(effects)
    }

    /// Opens `app_id` (or focuses its singleton instance) and returns the instance id.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Reducer`] when `app_id` is not registered.
    pub fn launch(&mut self, app_id: &ApplicationId) -> Result<InstanceId, RuntimeError> {
        let ctx = reducer_context(&self.catalog, &self.config);
        let outcome = launch_instance(&mut self.state, &ctx, app_id)?;
        self.run_effects(&outcome.effects);
        Ok(outcome.instance_id)
    }

    pub fn close(&mut self, instance_id: &InstanceId) {
        self.apply_window_action(DesktopAction::Close {
            instance_id: instance_id.clone(),
        });
    }

    pub fn minimize(&mut self, instance_id: &InstanceId) {
        self.apply_window_action(DesktopAction::Minimize {
            instance_id: instance_id.clone(),
        });
    }

    pub fn focus(&mut self, instance_id: &InstanceId) {
        self.apply_window_action(DesktopAction::Focus {
            instance_id: instance_id.clone(),
        });
    }

    pub fn move_window(&mut self, instance_id: &InstanceId, position: Position) {
        self.apply_window_action(DesktopAction::Move {
            instance_id: instance_id.clone(),
            position,
        });
    }

    pub fn resize_window(&mut self, instance_id: &InstanceId, position: Position, size: Size) {
        self.apply_window_action(DesktopAction::Resize {
            instance_id: instance_id.clone(),
            position,
            size,
        });
    }

    fn apply_window_action(&mut self, action: DesktopAction) {
        if let Err(err) = self.dispatch(action) {
            log::warn!("window action failed: {err}");
        }
    }

    fn run_effects(&mut self, effects: &[RuntimeEffect]) {
        for effect in effects {
            match effect {
                RuntimeEffect::MountContent {
                    app_id,
                    instance_id,
                } => {
                    let content = self.catalog.module_for(app_id).mount(AppMountContext {
                        app_id: app_id.clone(),
                        instance_id: instance_id.clone(),
                    });
                    self.contents.insert(instance_id.clone(), content);
                }
                RuntimeEffect::UnmountContent(instance_id) => {
                    self.contents.remove(instance_id);
                    if self.focused_input.as_ref() == Some(instance_id) {
                        self.focused_input = None;
                    }
                }
                RuntimeEffect::FocusWindowInput(instance_id) => {
                    self.focused_input = Some(instance_id.clone());
                }
            }
        }
    }

    /// Dock launcher slots in registry order.
    pub fn dock(&self) -> Vec<DockSlot> {
        dock_slots(self.catalog.descriptors(), &self.state)
    }

    /// Handles a click on the dock slot for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Reducer`] when `app_id` has no slot.
    pub fn click_dock_slot(&mut self, app_id: &ApplicationId) -> Result<(), RuntimeError> {
        let action = self
            .dock()
            .into_iter()
            .find(|slot| slot.app_id == *app_id)
            .map(|slot| slot.click_action())
            .ok_or_else(|| ReducerError::UnknownApplication(app_id.clone()))?;
        self.dispatch(action)?;
        Ok(())
    }

    /// Frames of visible windows, bottom to top.
    pub fn frames(&self) -> Vec<WindowFrame> {
        window_frames(&self.state)
    }

    /// Routes a pointer gesture on a window frame.
    pub fn handle_gesture(&mut self, instance_id: &InstanceId, gesture: WindowGesture) {
        let Some(window) = self.state.window(instance_id) else {
            log::debug!("gesture ignored: no live instance `{instance_id}`");
            return;
        };
        let bounds = ChromeBounds {
            work_area: self.config.work_area,
            margin: self.config.margin,
        };
        for action in gesture_actions(window, gesture, bounds) {
            self.apply_window_action(action);
        }
    }

    /// Current body of an instance.
    pub fn content_view(&self, instance_id: &InstanceId) -> Option<ContentView> {
        self.contents.get(instance_id).map(|content| content.view())
    }

    /// Delivers input to an instance's content. Returns `false` when the instance is not live.
    pub async fn content_input(&mut self, instance_id: &InstanceId, input: AppInput) -> bool {
        match self.contents.get_mut(instance_id) {
            Some(content) => {
                content.handle_input(input).await;
                true
            }
            None => {
                log::debug!("input ignored: no content for `{instance_id}`");
                false
            }
        }
    }

    /// Runs one device scan through the host scanner.
    pub async fn start_device_scan(&mut self) {
        let scanner = self.services.devices.clone();
        self.device_scan.start_scan(scanner.as_ref()).await;
        if let Some(error) = &self.device_scan.error {
            log::warn!("device scan failed: {error}");
        }
    }

    pub fn device_status(&self) -> DeviceStatusIcon {
        device_status_icon(&self.device_scan)
    }

    pub fn device_scan(&self) -> &DeviceScanState {
        &self.device_scan
    }

    pub fn state(&self) -> &DesktopState {
        &self.state
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    /// Instance whose content last received keyboard focus.
    pub fn focused_input(&self) -> Option<&InstanceId> {
        self.focused_input.as_ref()
    }

    /// Number of instances with mounted content.
    pub fn mounted_count(&self) -> usize {
        self.contents.len()
    }
}

impl std::fmt::Debug for DesktopRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopRuntime")
            .field("state", &self.state)
            .field("mounted", &self.contents.keys().collect::<Vec<_>>())
            .field("focused_input", &self.focused_input)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{DeviceScanError, DiscoveredDevice, ScriptedDeviceScanner};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    use super::*;
    use crate::dock::DeviceStatusKind;

    fn runtime() -> DesktopRuntime {
        DesktopRuntime::new(DesktopConfig::default(), HostServices::offline()).expect("runtime")
    }

    #[test]
    fn launch_mounts_content_and_close_drops_it() {
        let mut runtime = runtime();
        let id = runtime
            .launch(&ApplicationId::trusted("missionControl"))
            .expect("launch");
        assert_eq!(runtime.mounted_count(), 1);
        assert_eq!(runtime.focused_input(), Some(&id));
        assert_eq!(
            runtime.content_view(&id).map(|v| v.heading),
            Some("Placeholder App".to_string())
        );

        runtime.close(&id);
        runtime.close(&id);
        assert_eq!(runtime.mounted_count(), 0);
        assert_eq!(runtime.focused_input(), None);
        assert!(runtime.state().windows.is_empty());
    }

    #[test]
    fn unknown_launches_are_errors_and_leave_state_alone() {
        let mut runtime = runtime();
        assert_eq!(
            runtime.launch(&ApplicationId::trusted("nope")),
            Err(RuntimeError::Reducer(ReducerError::UnknownApplication(
                ApplicationId::trusted("nope")
            )))
        );
        assert!(runtime.state().windows.is_empty());
        assert!(runtime.click_dock_slot(&ApplicationId::trusted("nope")).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DesktopConfig {
            margin: -1,
            ..DesktopConfig::default()
        };
        assert!(matches!(
            DesktopRuntime::new(config, HostServices::offline()),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn content_input_reaches_mounted_apps_only() {
        let mut runtime = runtime();
        let id = runtime
            .launch(&ApplicationId::trusted("mindCLI"))
            .expect("launch");
        assert!(block_on(
            runtime.content_input(&id, AppInput::Submit("hello".to_string()))
        ));
        let view = runtime.content_view(&id).expect("view");
        assert_eq!(view.lines[1], "You: hello");

        runtime.close(&id);
        assert!(!block_on(
            runtime.content_input(&id, AppInput::Submit("hello".to_string()))
        ));
    }

    #[test]
    fn device_scan_updates_the_status_icon() {
        let scanner = Rc::new(ScriptedDeviceScanner::default());
        scanner.push(Err(DeviceScanError::Security));
        scanner.push(Ok(DiscoveredDevice {
            id: "bci-7".to_string(),
            name: None,
        }));
        let services = HostServices {
            devices: scanner,
            ..HostServices::offline()
        };
        let mut runtime =
            DesktopRuntime::new(DesktopConfig::default(), services).expect("runtime");
        assert_eq!(runtime.device_status().kind, DeviceStatusKind::Idle);

        block_on(runtime.start_device_scan());
        let icon = runtime.device_status();
        assert_eq!(icon.kind, DeviceStatusKind::Error);
        assert_eq!(
            icon.tooltip,
            "NeuroLink Error: Bluetooth access denied. Ensure Bluetooth is enabled and permissions are granted."
        );
        assert!(icon.enabled);

        block_on(runtime.start_device_scan());
        assert_eq!(runtime.device_status().kind, DeviceStatusKind::Idle);
        assert_eq!(runtime.device_scan().discovered_devices[0].id, "bci-7");
        assert!(!runtime.device_scan().is_scanning);
    }
}
