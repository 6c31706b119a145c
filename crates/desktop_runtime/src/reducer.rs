//! Reducer actions, side-effect intents, and transition logic for the instance manager.

use desktop_app_contract::{ApplicationDescriptor, ApplicationId, InstanceId};
use thiserror::Error;

use crate::{
    model::{DesktopState, Position, Size, WindowInstance, WorkArea},
    placement::{self, PlacementRules},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open an instance of an app, or focus the live one for a singleton.
    Launch {
        /// Registry id to launch.
        app_id: ApplicationId,
    },
    /// Remove an instance.
    Close {
        /// Instance to close.
        instance_id: InstanceId,
    },
    /// Hide an instance without closing it.
    Minimize {
        /// Instance to minimize.
        instance_id: InstanceId,
    },
    /// Raise an instance to the top and restore it if minimized.
    Focus {
        /// Instance to focus.
        instance_id: InstanceId,
    },
    /// Move an instance's top-left corner.
    Move {
        /// Instance to move.
        instance_id: InstanceId,
        /// New top-left corner.
        position: Position,
    },
    /// Replace an instance's position and size in one step.
    Resize {
        /// Instance to resize.
        instance_id: InstanceId,
        /// New top-left corner.
        position: Position,
        /// New extent.
        size: Size,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the runtime to execute.
pub enum RuntimeEffect {
    /// Create content for a freshly launched instance.
    MountContent {
        /// App providing the content.
        app_id: ApplicationId,
        /// Instance the content belongs to.
        instance_id: InstanceId,
    },
    /// Drop the content of a closed instance.
    UnmountContent(InstanceId),
    /// Move keyboard focus into the instance's content.
    FocusWindowInput(InstanceId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors. Missing instances are not errors; only launch lookups can fail.
pub enum ReducerError {
    /// `Launch` named an id that is not in the registry.
    #[error("unknown application `{0}`")]
    UnknownApplication(ApplicationId),
}

/// Read-only inputs the reducer needs besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ReducerContext<'a> {
    /// Registry descriptors in registry order.
    pub registry: &'a [ApplicationDescriptor],
    /// Area new windows are placed into.
    pub work_area: WorkArea,
    /// Placement spacing.
    pub rules: PlacementRules,
}

impl ReducerContext<'_> {
    pub fn descriptor(&self, app_id: &ApplicationId) -> Option<&ApplicationDescriptor> {
        self.registry.iter().find(|d| d.id == *app_id)
    }
}

/// Result of [`launch_instance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// The new instance, or the existing one for a singleton.
    pub instance_id: InstanceId,
    /// Whether a new instance was created.
    pub created: bool,
    pub effects: Vec<RuntimeEffect>,
}

/// Applies a [`DesktopAction`] to the desktop state and collects resulting side effects.
///
/// Actions naming an instance that is not live leave the state untouched and return no effects.
///
/// # Errors
///
/// Returns [`ReducerError::UnknownApplication`] when `Launch` names an unregistered app.
pub fn reduce_desktop(
    state: &mut DesktopState,
    ctx: &ReducerContext<'_>,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::Launch { app_id } => {
            effects = launch_instance(state, ctx, &app_id)?.effects;
        }
        DesktopAction::Close { instance_id } => {
            let before_len = state.windows.len();
            state.windows.retain(|w| w.instance_id != instance_id);
            if state.windows.len() == before_len {
                log::debug!("close ignored: no live instance `{instance_id}`");
            } else {
                effects.push(RuntimeEffect::UnmountContent(instance_id));
            }
        }
        DesktopAction::Minimize { instance_id } => match state.window_mut(&instance_id) {
            Some(window) => window.minimized = true,
            None => log::debug!("minimize ignored: no live instance `{instance_id}`"),
        },
        DesktopAction::Focus { instance_id } => {
            if focus_instance(state, &instance_id) {
                effects.push(RuntimeEffect::FocusWindowInput(instance_id));
            } else {
                log::debug!("focus ignored: no live instance `{instance_id}`");
            }
        }
        DesktopAction::Move {
            instance_id,
            position,
        } => match state.window_mut(&instance_id) {
            Some(window) => window.position = position,
            None => log::debug!("move ignored: no live instance `{instance_id}`"),
        },
        DesktopAction::Resize {
            instance_id,
            position,
            size,
        } => match state.window_mut(&instance_id) {
            Some(window) => {
                window.position = position;
                window.size = size;
            }
            None => log::debug!("resize ignored: no live instance `{instance_id}`"),
        },
    }
    Ok(effects)
}

/// Launches `app_id`, honoring singleton semantics.
///
/// # Errors
///
/// Returns [`ReducerError::UnknownApplication`] when `app_id` is not registered.
pub fn launch_instance(
    state: &mut DesktopState,
    ctx: &ReducerContext<'_>,
    app_id: &ApplicationId,
) -> Result<LaunchOutcome, ReducerError> {
    let descriptor = ctx
        .descriptor(app_id)
        .ok_or_else(|| ReducerError::UnknownApplication(app_id.clone()))?;

    if descriptor.singleton {
        let existing = state
            .instances_of(app_id)
            .next()
            .map(|w| w.instance_id.clone());
        if let Some(instance_id) = existing {
            focus_instance(state, &instance_id);
            return Ok(LaunchOutcome {
                effects: vec![RuntimeEffect::FocusWindowInput(instance_id.clone())],
                instance_id,
                created: false,
            });
        }
    }

    let placement = placement::resolve(descriptor, state.windows.len(), ctx.work_area, &ctx.rules);
    let instance_id = state.mint_instance_id(app_id);
    let stack_order = state.bump_stack_order();
    state.windows.push(WindowInstance {
        instance_id: instance_id.clone(),
        app_id: app_id.clone(),
        title: descriptor.display_name.clone(),
        position: placement.position,
        size: placement.size,
        stack_order,
        minimized: false,
    });

    Ok(LaunchOutcome {
        effects: vec![
            RuntimeEffect::MountContent {
                app_id: app_id.clone(),
                instance_id: instance_id.clone(),
            },
            RuntimeEffect::FocusWindowInput(instance_id.clone()),
        ],
        instance_id,
        created: true,
    })
}

/// Raises and restores `instance_id`. Returns `false` when it is not live.
fn focus_instance(state: &mut DesktopState, instance_id: &InstanceId) -> bool {
    if state.window(instance_id).is_none() {
        return false;
    }
    let stack_order = state.bump_stack_order();
    if let Some(window) = state.window_mut(instance_id) {
        window.stack_order = stack_order;
        window.minimized = false;
    }
    true
}
