//! Window-instance state owned by the desktop instance manager.

use desktop_app_contract::{ApplicationId, InstanceId};
use serde::{Deserialize, Serialize};

/// Width used when a descriptor's width hint cannot be read as pixels.
pub const DEFAULT_WINDOW_WIDTH: i32 = 420;
/// Height used when a descriptor's height hint cannot be read as pixels.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;

/// Top-left corner of a window, relative to the work area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Window extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Region windows are placed into (the viewport minus the dock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkArea {
    pub width: i32,
    pub height: i32,
}

impl Default for WorkArea {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// One live window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInstance {
    pub instance_id: InstanceId,
    /// Registry entry this instance was launched from.
    pub app_id: ApplicationId,
    /// Copied from the descriptor display name at launch.
    pub title: String,
    pub position: Position,
    pub size: Size,
    /// Higher values draw on top.
    pub stack_order: u64,
    pub minimized: bool,
}

/// Complete instance-manager state.
///
/// `windows` is kept in launch order; stacking is expressed only through `stack_order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopState {
    pub windows: Vec<WindowInstance>,
    /// Last stack order handed out. Only grows.
    pub next_stack_order: u64,
    /// Serial for the next instance id. Only grows, so ids are never reused.
    pub next_instance_serial: u64,
}

impl DesktopState {
    pub fn window(&self, instance_id: &InstanceId) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.instance_id == *instance_id)
    }

    pub fn window_mut(&mut self, instance_id: &InstanceId) -> Option<&mut WindowInstance> {
        self.windows
            .iter_mut()
            .find(|w| w.instance_id == *instance_id)
    }

    /// Live instances of `app_id`, in launch order.
    pub fn instances_of<'a>(
        &'a self,
        app_id: &'a ApplicationId,
    ) -> impl Iterator<Item = &'a WindowInstance> + 'a {
        self.windows.iter().filter(move |w| w.app_id == *app_id)
    }

    /// The visible window drawn on top, if any.
    pub fn focused_window(&self) -> Option<&WindowInstance> {
        self.windows
            .iter()
            .filter(|w| !w.minimized)
            .max_by_key(|w| w.stack_order)
    }

    /// Visible windows from bottom to top.
    pub fn visible_stack(&self) -> Vec<&WindowInstance> {
        let mut visible: Vec<&WindowInstance> =
            self.windows.iter().filter(|w| !w.minimized).collect();
        visible.sort_by_key(|w| w.stack_order);
        visible
    }

    pub(crate) fn bump_stack_order(&mut self) -> u64 {
        self.next_stack_order += 1;
        self.next_stack_order
    }

    pub(crate) fn mint_instance_id(&mut self, app_id: &ApplicationId) -> InstanceId {
        self.next_instance_serial += 1;
        InstanceId::for_launch(app_id, self.next_instance_serial)
    }
}
