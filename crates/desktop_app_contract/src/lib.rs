//! Shared contract types between the desktop instance manager and the apps it hosts.
//!
//! Apps never see window-manager state. The runtime hands each mounted app an
//! [`AppMountContext`] carrying only the owning application id and the instance id, and keeps
//! the returned [`AppContent`] alive for as long as the instance exists.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{fmt, rc::Rc};

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

/// Stable identifier for an application type in the registry (for example `mindCLI`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` is a plain identifier token.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected a letter followed by letters, digits, `-` or `_`"
            ))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for compile-time trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Identifier for one live window instance.
///
/// Instance ids are minted by the instance manager and never reused within a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Builds the id for the `serial`-th instance created for `app_id` (`mindCLI-3`).
    pub fn for_launch(app_id: &ApplicationId, serial: u64) -> Self {
        Self(format!("{app_id}-{serial}"))
    }

    /// Wraps a raw id, for example one echoed back by a UI event.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One axis of a descriptor's default size.
///
/// Registries may express a length as a number or as a CSS-like string (`"700px"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowDimension {
    /// Plain pixel length.
    Pixels(i32),
    /// String-encoded length such as `"640px"` or `"640"`.
    Text(String),
}

impl WindowDimension {
    /// Resolves the dimension to a pixel length.
    ///
    /// String values are read like a lenient integer parse: leading whitespace and an optional
    /// sign are accepted, and everything after the leading digits (units) is ignored. Returns
    /// `None` when the string has no leading digits.
    pub fn to_pixels(&self) -> Option<i32> {
        match self {
            Self::Pixels(px) => Some(*px),
            Self::Text(raw) => parse_leading_int(raw),
        }
    }
}

impl From<i32> for WindowDimension {
    fn from(value: i32) -> Self {
        Self::Pixels(value)
    }
}

impl From<&str> for WindowDimension {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn parse_leading_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().ok()?;
    let value = if negative { -value } else { value };
    Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Default width/height hint carried by a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSize {
    /// Width hint.
    pub width: WindowDimension,
    /// Height hint.
    pub height: WindowDimension,
}

impl DefaultSize {
    /// Creates a pixel size hint.
    pub fn pixels(width: i32, height: i32) -> Self {
        Self {
            width: WindowDimension::Pixels(width),
            height: WindowDimension::Pixels(height),
        }
    }
}

/// Default top-left position hint carried by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPosition {
    /// Horizontal offset from the work-area origin.
    pub x: i32,
    /// Vertical offset from the work-area origin.
    pub y: i32,
}

/// Immutable registry entry describing a launchable application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Unique application id.
    pub id: ApplicationId,
    /// Display name, also used as the initial window title.
    pub display_name: String,
    /// Presentation-only icon token.
    #[serde(default)]
    pub icon_id: String,
    /// Initial size hint.
    pub default_size: DefaultSize,
    /// Optional initial position hint; cascading placement is used when absent.
    #[serde(default)]
    pub default_position: Option<DefaultPosition>,
    /// Whether the app is launched during boot.
    #[serde(default)]
    pub open_on_startup: bool,
    /// Whether at most one instance may be live at a time.
    #[serde(default)]
    pub singleton: bool,
}

/// Context handed to an app when the runtime mounts content for a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMountContext {
    /// Registry id of the app being mounted.
    pub app_id: ApplicationId,
    /// Instance the content belongs to.
    pub instance_id: InstanceId,
}

/// Headless rendering of a window body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentView {
    /// Heading line shown at the top of the body.
    pub heading: String,
    /// Body lines in display order.
    pub lines: Vec<String>,
    /// Optional status line (errors, progress, confirmations).
    pub status: Option<String>,
}

/// Input routed from the host into a mounted app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppInput {
    /// Free-text submission (command line, chat input).
    Submit(String),
    /// Update of a named form field.
    SetField {
        /// Field name.
        name: String,
        /// New field value.
        value: String,
    },
    /// Named action such as `save` or `reset`.
    Action(String),
}

/// Body of a mounted window instance.
pub trait AppContent {
    /// Instance this content was mounted for.
    fn instance_id(&self) -> &InstanceId;

    /// Renders the current body state.
    fn view(&self) -> ContentView;

    /// Handles host input. Apps that take no input can rely on the default no-op.
    fn handle_input<'a>(&'a mut self, input: AppInput) -> LocalBoxFuture<'a, ()> {
        let _ = input;
        Box::pin(async {})
    }
}

type AppMountFn = Rc<dyn Fn(AppMountContext) -> Box<dyn AppContent>>;

/// Content-producer capability registered for an application id.
#[derive(Clone)]
pub struct AppModule {
    mount_fn: AppMountFn,
}

impl AppModule {
    /// Wraps a mount function.
    pub fn new(mount_fn: impl Fn(AppMountContext) -> Box<dyn AppContent> + 'static) -> Self {
        Self {
            mount_fn: Rc::new(mount_fn),
        }
    }

    /// Produces fresh content for an instance.
    pub fn mount(&self, context: AppMountContext) -> Box<dyn AppContent> {
        (self.mount_fn)(context)
    }
}

impl fmt::Debug for AppModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppModule").finish_non_exhaustive()
    }
}
