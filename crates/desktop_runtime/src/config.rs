//! Desktop configuration and its TOML loader.

use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use desktop_app_contract::ApplicationDescriptor;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::model::WorkArea;

/// Placement and registry settings for a desktop runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Minimum gap kept between a new window and the work-area edge.
    pub margin: i32,
    /// First cascade offset for windows without a default position.
    pub cascade_origin: i32,
    /// Cascade offset added per already-open window.
    pub cascade_step: i32,
    /// Work area new windows are clamped into.
    pub work_area: WorkArea,
    /// Replaces the built-in app catalog when present.
    pub registry: Option<Vec<ApplicationDescriptor>>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            margin: 8,
            cascade_origin: 50,
            cascade_step: 30,
            work_area: WorkArea::default(),
            registry: None,
        }
    }
}

impl DesktopConfig {
    /// Parses a TOML document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] for values
    /// placement cannot work with.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse {
            source_name: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects negative spacing and empty work areas.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.margin < 0 {
            return Err(ConfigError::Invalid("margin must not be negative".to_string()));
        }
        if self.cascade_step < 0 {
            return Err(ConfigError::Invalid(
                "cascade_step must not be negative".to_string(),
            ));
        }
        if self.work_area.width <= 0 || self.work_area.height <= 0 {
            return Err(ConfigError::Invalid(
                "work_area must have a positive width and height".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// OS error text.
        message: String,
    },
    /// The text is not valid TOML for the target type.
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        /// File path or `<inline>`.
        source_name: String,
        /// Parser error text.
        message: String,
    },
    /// The document parsed but holds unusable values.
    #[error("invalid desktop config: {0}")]
    Invalid(String),
}

/// TOML file loader for a typed config.
///
/// Handles file access and deserialization only; semantic checks stay with the config type.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Reads and deserializes the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and [`ConfigError::Parse`] when
    /// it is not valid TOML for `T`.
    pub fn load(&self) -> Result<T, ConfigError> {
        let body = fs::read_to_string(&self.path).map_err(|err| ConfigError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        })?;
        toml::from_str(&body).map_err(|err| ConfigError::Parse {
            source_name: self.path.display().to_string(),
            message: err.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigLoader<DesktopConfig> {
    /// Loads and validates a desktop config file.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`] and [`DesktopConfig::validate`].
    pub fn load_desktop(&self) -> Result<DesktopConfig, ConfigError> {
        let config = self.load()?;
        config.validate()?;
        Ok(config)
    }
}
