//! Stand-in content for registered apps that have no module of their own yet.

use desktop_app_contract::{AppContent, AppModule, ContentView, InstanceId};

/// Body that only reports which instance it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderContent {
    instance_id: InstanceId,
}

impl AppContent for PlaceholderContent {
    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn view(&self) -> ContentView {
        ContentView {
            heading: "Placeholder App".to_string(),
            lines: vec![
                format!("Instance ID: {}", self.instance_id),
                "This application is not yet implemented.".to_string(),
            ],
            status: None,
        }
    }
}

/// Module mounting [`PlaceholderContent`].
pub fn placeholder_module() -> AppModule {
    AppModule::new(|context| {
        Box::new(PlaceholderContent {
            instance_id: context.instance_id,
        })
    })
}
