//! Window chrome: frame view models and pointer-gesture translation.

use desktop_app_contract::{InstanceId, WindowDimension};

use crate::{
    model::{DesktopState, Position, Size, WindowInstance, WorkArea},
    placement::clamp_position,
    reducer::DesktopAction,
};

/// Smallest width a resize gesture may produce.
pub const MIN_WINDOW_WIDTH: i32 = 200;
/// Smallest height a resize gesture may produce.
pub const MIN_WINDOW_HEIGHT: i32 = 150;

/// Pointer interaction on a window frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowGesture {
    /// Pointer pressed anywhere on the frame (capture phase).
    PointerDown,
    DragStart,
    /// Drag released with the frame's final top-left corner.
    DragEnd { position: Position },
    ResizeStart,
    /// Resize released. Dimensions arrive as the frame's style values (`"640px"` or numbers).
    ResizeEnd {
        position: Position,
        width: WindowDimension,
        height: WindowDimension,
    },
    MinimizeButton,
    CloseButton,
}

/// Renderable frame for one visible window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFrame {
    pub instance_id: InstanceId,
    pub title: String,
    pub position: Position,
    pub size: Size,
    pub z_index: u64,
    /// Whether this frame is drawn on top.
    pub focused: bool,
}

/// Frame for `window`, or `None` while it is minimized.
pub fn window_frame(window: &WindowInstance, focused: bool) -> Option<WindowFrame> {
    if window.minimized {
        return None;
    }
    Some(WindowFrame {
        instance_id: window.instance_id.clone(),
        title: window.title.clone(),
        position: window.position,
        size: window.size,
        z_index: window.stack_order,
        focused,
    })
}

/// Frames of all visible windows, bottom to top.
pub fn window_frames(state: &DesktopState) -> Vec<WindowFrame> {
    let stack = state.visible_stack();
    let top = stack.last().map(|w| w.instance_id.clone());
    stack
        .into_iter()
        .filter_map(|w| window_frame(w, Some(&w.instance_id) == top.as_ref()))
        .collect()
}

/// Area a dragged or resized frame must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeBounds {
    pub work_area: WorkArea,
    /// Inset kept between the frame's top-left corner and the work-area edges.
    pub margin: i32,
}

impl Default for ChromeBounds {
    fn default() -> Self {
        Self {
            work_area: WorkArea::default(),
            margin: 8,
        }
    }
}

/// Translates a gesture on `window` into instance-manager actions, in dispatch order.
///
/// Drag and resize end positions are clamped into `bounds` before they reach the reducer.
pub fn gesture_actions(
    window: &WindowInstance,
    gesture: WindowGesture,
    bounds: ChromeBounds,
) -> Vec<DesktopAction> {
    let instance_id = window.instance_id.clone();
    let focus = DesktopAction::Focus {
        instance_id: instance_id.clone(),
    };
    match gesture {
        WindowGesture::PointerDown | WindowGesture::DragStart | WindowGesture::ResizeStart => {
            vec![focus]
        }
        WindowGesture::DragEnd { position } => vec![
            DesktopAction::Move {
                instance_id,
                position: clamp_position(position, window.size, bounds.work_area, bounds.margin),
            },
            focus,
        ],
        WindowGesture::ResizeEnd {
            position,
            width,
            height,
        } => {
            let size = Size {
                width: width
                    .to_pixels()
                    .unwrap_or(window.size.width)
                    .max(MIN_WINDOW_WIDTH),
                height: height
                    .to_pixels()
                    .unwrap_or(window.size.height)
                    .max(MIN_WINDOW_HEIGHT),
            };
            vec![
                DesktopAction::Resize {
                    instance_id,
                    position: clamp_position(position, size, bounds.work_area, bounds.margin),
                    size,
                },
                focus,
            ]
        }
        WindowGesture::MinimizeButton => vec![DesktopAction::Minimize { instance_id }],
        WindowGesture::CloseButton => vec![DesktopAction::Close { instance_id }],
    }
}
