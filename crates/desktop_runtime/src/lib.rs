//! Headless desktop instance manager.
//!
//! The crate keeps the windowing core free of any rendering layer: [`model`] holds the state,
//! [`reducer`] is the only place it changes, and [`runtime_context::DesktopRuntime`] executes
//! the effects the reducer emits against the app catalog and host services. [`dock`] and
//! [`chrome`] derive the view models a renderer needs.

pub mod apps;
pub mod chrome;
pub mod config;
pub mod dock;
pub mod model;
pub mod placement;
pub mod reducer;
pub mod runtime_context;

pub use apps::{builtin_catalog, builtin_descriptors, AppCatalog, CatalogError};
pub use chrome::{ChromeBounds, WindowFrame, WindowGesture};
pub use config::{ConfigError, ConfigLoader, DesktopConfig};
pub use dock::{DeviceStatusIcon, DeviceStatusKind, DockSlot, DockSlotState};
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, ReducerContext, ReducerError, RuntimeEffect};
pub use runtime_context::{DesktopRuntime, RuntimeError};
