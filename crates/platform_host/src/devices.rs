//! Device-discovery contracts for the neuro-link status indicator.
//!
//! The host exposes one opaque async scan. [`DeviceScanState`] is the observable state the dock
//! reads; it is updated only through [`DeviceScanState::start_scan`].

use std::{cell::RefCell, collections::VecDeque, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name reported for devices that do not advertise one.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Device returned by the host picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Host-assigned device id.
    pub id: String,
    /// Advertised name, if any.
    pub name: Option<String>,
}

impl DiscoveredDevice {
    /// Name shown to the user.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_DEVICE_NAME,
        }
    }
}

/// Device as stored in [`DeviceScanState`], with the display name already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Host-assigned device id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Scan failures as classified by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceScanError {
    /// Nothing found, or the user dismissed the picker.
    #[error("No Bluetooth devices found or user cancelled selection.")]
    NotFound,
    /// Permission denied or radio disabled.
    #[error("Bluetooth access denied. Ensure Bluetooth is enabled and permissions are granted.")]
    Security,
    /// The host has no device API at all.
    #[error("Web Bluetooth API is not available in this browser.")]
    Unavailable,
    /// Any other host failure.
    #[error("Bluetooth error: {0}")]
    Other(String),
}

/// Object-safe boxed future used by [`DeviceScanner`].
pub type DeviceScanFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that runs one device-picker request.
pub trait DeviceScanner {
    /// Requests a device from the host.
    fn request_device(&self) -> DeviceScanFuture<'_, Result<DiscoveredDevice, DeviceScanError>>;

    /// Whether the host exposes a device API at all.
    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Scanner for hosts without a device API; every scan fails with
/// [`DeviceScanError::Unavailable`].
pub struct NoopDeviceScanner;

impl DeviceScanner for NoopDeviceScanner {
    fn request_device(&self) -> DeviceScanFuture<'_, Result<DiscoveredDevice, DeviceScanError>> {
        Box::pin(async { Err(DeviceScanError::Unavailable) })
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
/// Scanner replaying queued outcomes in order. An exhausted script reports
/// [`DeviceScanError::NotFound`]. Clones share the queue.
pub struct ScriptedDeviceScanner {
    outcomes: Rc<RefCell<VecDeque<Result<DiscoveredDevice, DeviceScanError>>>>,
}

impl ScriptedDeviceScanner {
    /// Queues the outcome of a future scan.
    pub fn push(&self, outcome: Result<DiscoveredDevice, DeviceScanError>) {
        self.outcomes.borrow_mut().push_back(outcome);
    }
}

impl DeviceScanner for ScriptedDeviceScanner {
    fn request_device(&self) -> DeviceScanFuture<'_, Result<DiscoveredDevice, DeviceScanError>> {
        Box::pin(async move {
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(DeviceScanError::NotFound))
        })
    }
}

/// Observable scan state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceScanState {
    /// Whether a scan is in flight.
    pub is_scanning: bool,
    /// Devices found by the last successful scan.
    pub discovered_devices: Vec<DeviceRecord>,
    /// User-facing message for the last failed scan.
    pub error: Option<String>,
}

impl DeviceScanState {
    /// Marks a scan as started, clearing the previous result.
    pub fn begin_scan(&mut self) {
        self.is_scanning = true;
        self.error = None;
        self.discovered_devices.clear();
    }

    /// Records the outcome of a scan and clears the in-flight flag.
    pub fn finish_scan(&mut self, outcome: Result<DiscoveredDevice, DeviceScanError>) {
        match outcome {
            Ok(device) => {
                let record = DeviceRecord {
                    name: device.display_name().to_string(),
                    id: device.id,
                };
                log::info!("device found: {} ({})", record.name, record.id);
                self.discovered_devices = vec![record];
            }
            Err(err) => {
                log::warn!("device scan failed: {err:?}");
                self.error = Some(err.to_string());
            }
        }
        self.is_scanning = false;
    }

    /// Runs one scan against `scanner` and records its outcome.
    ///
    /// Without a device API only the error is set; earlier devices are kept and no scan starts.
    pub async fn start_scan<S: DeviceScanner + ?Sized>(&mut self, scanner: &S) {
        if !scanner.is_available() {
            log::warn!("device scan skipped: no device API");
            self.error = Some(DeviceScanError::Unavailable.to_string());
            return;
        }
        self.begin_scan();
        let outcome = scanner.request_device().await;
        self.finish_scan(outcome);
    }
}
