//! Dock presentation: one launcher slot per registry entry plus the device status icon.

use desktop_app_contract::{ApplicationDescriptor, ApplicationId, InstanceId};
use platform_host::DeviceScanState;

use crate::{model::DesktopState, reducer::DesktopAction};

/// Indicator state of a launcher slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockSlotState {
    /// No live instance.
    Idle,
    /// The representative instance is visible.
    RunningFocused,
    /// The representative instance is minimized.
    RunningMinimized,
}

/// Launcher slot derived from one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockSlot {
    pub app_id: ApplicationId,
    pub label: String,
    pub icon_id: String,
    pub state: DockSlotState,
    /// First live instance in launch order; the target of a click on a running slot.
    pub representative: Option<InstanceId>,
    pub running_count: usize,
}

impl DockSlot {
    pub fn is_running(&self) -> bool {
        self.running_count > 0
    }

    /// Action a click on this slot dispatches.
    pub fn click_action(&self) -> DesktopAction {
        match &self.representative {
            Some(instance_id) => DesktopAction::Focus {
                instance_id: instance_id.clone(),
            },
            None => DesktopAction::Launch {
                app_id: self.app_id.clone(),
            },
        }
    }

    pub fn aria_label(&self) -> String {
        match self.running_count {
            0 => format!("{} (not running)", self.label),
            1 => format!("{} (1 window running)", self.label),
            count => format!("{} ({count} windows running)", self.label),
        }
    }
}

/// Builds the launcher slots in registry order.
pub fn dock_slots(registry: &[ApplicationDescriptor], state: &DesktopState) -> Vec<DockSlot> {
    registry
        .iter()
        .map(|descriptor| {
            let mut instances = state.instances_of(&descriptor.id);
            let first = instances.next();
            let running_count = first.map_or(0, |_| 1 + instances.count());
            let slot_state = match first {
                None => DockSlotState::Idle,
                Some(window) if window.minimized => DockSlotState::RunningMinimized,
                Some(_) => DockSlotState::RunningFocused,
            };
            DockSlot {
                app_id: descriptor.id.clone(),
                label: descriptor.display_name.clone(),
                icon_id: descriptor.icon_id.clone(),
                state: slot_state,
                representative: first.map(|w| w.instance_id.clone()),
                running_count,
            }
        })
        .collect()
}

/// Visual state of the device-scan button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatusKind {
    Idle,
    Scanning,
    Error,
}

/// Device-scan button as the dock shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatusIcon {
    pub kind: DeviceStatusKind,
    pub tooltip: String,
    /// Clicking starts a scan only when enabled.
    pub enabled: bool,
}

pub fn device_status_icon(scan: &DeviceScanState) -> DeviceStatusIcon {
    let (kind, tooltip) = match (&scan.error, scan.is_scanning) {
        (Some(error), _) => (DeviceStatusKind::Error, format!("NeuroLink Error: {error}")),
        (None, true) => (DeviceStatusKind::Scanning, "Scanning for BCI...".to_string()),
        (None, false) => (DeviceStatusKind::Idle, "Connect BCI (NeuroLink)".to_string()),
    };
    DeviceStatusIcon {
        kind,
        tooltip,
        enabled: !scan.is_scanning,
    }
}
