//! App catalog: registry descriptors plus the content module mounted for each app.

use std::collections::BTreeMap;

use desktop_app_contract::{ApplicationDescriptor, ApplicationId, AppModule};
use platform_host::HostServices;
use thiserror::Error;

mod placeholders;

pub use placeholders::{placeholder_module, PlaceholderContent};

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));

/// Registry id of the conversational CLI.
pub const MIND_CLI_APP_ID: &str = "mindCLI";
/// Registry id of the tool authoring form.
pub const TOOL_CREATOR_APP_ID: &str = "toolCreator";

/// Registry problems detected while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("app catalog is not valid JSON: {0}")]
    Malformed(String),
    #[error("{0}")]
    InvalidId(String),
    #[error("duplicate app id `{0}` in catalog")]
    DuplicateId(ApplicationId),
}

/// Parses the catalog embedded at build time, preserving manifest order.
///
/// # Errors
///
/// Returns [`CatalogError`] when the embedded JSON or its ids are unusable.
pub fn builtin_descriptors() -> Result<Vec<ApplicationDescriptor>, CatalogError> {
    serde_json::from_str(APP_CATALOG_JSON).map_err(|err| CatalogError::Malformed(err.to_string()))
}

/// Registry descriptors and the modules that render their instances.
#[derive(Debug, Clone)]
pub struct AppCatalog {
    descriptors: Vec<ApplicationDescriptor>,
    modules: BTreeMap<ApplicationId, AppModule>,
    fallback: AppModule,
}

impl AppCatalog {
    /// Builds a catalog with no modules; every app mounts the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidId`] or [`CatalogError::DuplicateId`] for a bad registry.
    pub fn new(descriptors: Vec<ApplicationDescriptor>) -> Result<Self, CatalogError> {
        validate_descriptors(&descriptors)?;
        Ok(Self {
            descriptors,
            modules: BTreeMap::new(),
            fallback: placeholder_module(),
        })
    }

    /// Attaches the content module for `app_id`, replacing any earlier one.
    pub fn register_module(&mut self, app_id: ApplicationId, module: AppModule) {
        if self.descriptor(&app_id).is_none() {
            log::warn!("registering module for `{app_id}`, which is not in the registry");
        }
        self.modules.insert(app_id, module);
    }

    /// Descriptors in registry order.
    pub fn descriptors(&self) -> &[ApplicationDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, app_id: &ApplicationId) -> Option<&ApplicationDescriptor> {
        self.descriptors.iter().find(|d| d.id == *app_id)
    }

    /// Module for `app_id`, or the placeholder when none is registered.
    pub fn module_for(&self, app_id: &ApplicationId) -> &AppModule {
        self.modules.get(app_id).unwrap_or(&self.fallback)
    }
}

fn validate_descriptors(descriptors: &[ApplicationDescriptor]) -> Result<(), CatalogError> {
    let mut seen = std::collections::BTreeSet::new();
    for descriptor in descriptors {
        ApplicationId::new(descriptor.id.as_str()).map_err(CatalogError::InvalidId)?;
        if !seen.insert(&descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id.clone()));
        }
    }
    Ok(())
}

/// Catalog over `descriptors` with the built-in app modules wired to `services`.
///
/// # Errors
///
/// Propagates [`AppCatalog::new`] validation failures.
pub fn catalog_with_builtin_modules(
    descriptors: Vec<ApplicationDescriptor>,
    services: &HostServices,
) -> Result<AppCatalog, CatalogError> {
    let mut catalog = AppCatalog::new(descriptors)?;
    catalog.register_module(
        ApplicationId::trusted(MIND_CLI_APP_ID),
        desktop_app_mind_cli::module(services.tools.clone(), services.agent.clone()),
    );
    catalog.register_module(
        ApplicationId::trusted(TOOL_CREATOR_APP_ID),
        desktop_app_tool_creator::module(services.tools.clone()),
    );
    Ok(catalog)
}

/// The embedded registry with the built-in app modules.
///
/// # Errors
///
/// Returns [`CatalogError`] when the embedded registry is unusable.
pub fn builtin_catalog(services: &HostServices) -> Result<AppCatalog, CatalogError> {
    catalog_with_builtin_modules(builtin_descriptors()?, services)
}
