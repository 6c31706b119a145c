//! Tool Creator: a form that validates and stores new tool definitions for Mind-CLI.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::rc::Rc;

use desktop_app_contract::{AppContent, AppInput, AppModule, ContentView, InstanceId};
use futures::future::LocalBoxFuture;
use platform_host::{next_monotonic_timestamp_ms, ToolDefinition, ToolParameter, ToolStore};
use serde_json::Value;
use thiserror::Error;

/// Parameters template a fresh form starts with.
pub const DEFAULT_PARAMETERS_JSON: &str = "[\n  {\n    \"name\": \"param1\",\n    \"type\": \"string\",\n    \"description\": \"Description of param1\"\n  }\n]";
/// Tool body a fresh form starts with.
pub const DEFAULT_CODE: &str = "return `Hello, ${param1}!`;";

const PARAMETER_SHAPE_MESSAGE: &str =
    "Parameters JSON must be an array of objects, each with name, type, and description properties.";

/// Validation failure shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolFormError {
    /// Name is not an identifier.
    #[error("Tool Name must be a valid JavaScript identifier (camelCase recommended, e.g., myToolName).")]
    InvalidName,
    /// Description is blank.
    #[error("Description cannot be empty.")]
    EmptyDescription,
    /// Code is blank.
    #[error("Code cannot be empty.")]
    EmptyCode,
    /// Parameters are not valid JSON or have the wrong shape.
    #[error("Invalid Parameters JSON: {0}")]
    InvalidParameters(String),
    /// The store rejected the tool, usually because the name is taken.
    #[error("Failed to add tool \"{0}\". It might already exist.")]
    AddFailed(String),
}

/// Editable form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolForm {
    /// Identifier the agent calls the tool by.
    pub tool_name: String,
    /// Description offered to the agent.
    pub description: String,
    /// Raw JSON array of parameters.
    pub parameters_json: String,
    /// Tool body run by the Mind-CLI sandbox.
    pub code: String,
}

impl Default for ToolForm {
    fn default() -> Self {
        Self {
            tool_name: String::new(),
            description: String::new(),
            parameters_json: DEFAULT_PARAMETERS_JSON.to_string(),
            code: DEFAULT_CODE.to_string(),
        }
    }
}

impl ToolForm {
    /// Checks every field and builds the definition to store.
    pub fn validate(&self, stamp_ms: u64) -> Result<ToolDefinition, ToolFormError> {
        if !is_identifier(&self.tool_name) {
            return Err(ToolFormError::InvalidName);
        }
        if self.description.trim().is_empty() {
            return Err(ToolFormError::EmptyDescription);
        }
        if self.code.trim().is_empty() {
            return Err(ToolFormError::EmptyCode);
        }
        let parameters = parse_parameters(&self.parameters_json)?;
        Ok(ToolDefinition {
            id: format!("tool-{}-{stamp_ms}", self.tool_name),
            tool_name: self.tool_name.clone(),
            description: self.description.clone(),
            parameters,
            code: self.code.clone(),
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "toolName" | "tool_name" => &mut self.tool_name,
            "description" => &mut self.description,
            "parameters" | "parameters_json" => &mut self.parameters_json,
            "code" => &mut self.code,
            _ => return false,
        };
        *slot = value;
        true
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_parameters(raw: &str) -> Result<Vec<ToolParameter>, ToolFormError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ToolFormError::InvalidParameters(err.to_string()))?;
    let well_formed = value.as_array().is_some_and(|items| {
        items.iter().all(|item| {
            ["name", "type", "description"].iter().all(|key| {
                item.get(key)
                    .and_then(Value::as_str)
                    .is_some_and(|text| !text.is_empty())
            })
        })
    });
    if !well_formed {
        return Err(ToolFormError::InvalidParameters(
            PARAMETER_SHAPE_MESSAGE.to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|err| ToolFormError::InvalidParameters(err.to_string()))
}

/// Outcome banner of the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    /// Tool stored.
    Success(String),
    /// Validation or store failure.
    Error(String),
}

/// One Tool Creator window.
pub struct ToolCreatorSession {
    instance_id: InstanceId,
    tools: Rc<dyn ToolStore>,
    form: ToolForm,
    status: Option<FormStatus>,
}

impl ToolCreatorSession {
    /// Opens a form with default fields.
    pub fn new(instance_id: InstanceId, tools: Rc<dyn ToolStore>) -> Self {
        Self {
            instance_id,
            tools,
            form: ToolForm::default(),
            status: None,
        }
    }

    /// Current form fields.
    pub fn form(&self) -> &ToolForm {
        &self.form
    }

    /// Mutable form fields.
    pub fn form_mut(&mut self) -> &mut ToolForm {
        &mut self.form
    }

    /// Banner of the last submission, cleared by reset.
    pub fn status(&self) -> Option<&FormStatus> {
        self.status.as_ref()
    }

    /// Validates the form and adds the tool. The form keeps its values either way.
    pub async fn submit(&mut self) -> Result<ToolDefinition, ToolFormError> {
        self.status = None;
        let result = self.store_form().await;
        self.status = Some(match &result {
            Ok(tool) => FormStatus::Success(format!(
                "Tool \"{}\" created successfully! You can now use it in Mind-CLI.",
                tool.tool_name
            )),
            Err(err) => FormStatus::Error(err.to_string()),
        });
        result
    }

    async fn store_form(&self) -> Result<ToolDefinition, ToolFormError> {
        let tool = self.form.validate(next_monotonic_timestamp_ms())?;
        if let Err(err) = self.tools.add(tool.clone()).await {
            log::warn!("storing tool `{}` failed: {err}", tool.tool_name);
            return Err(ToolFormError::AddFailed(tool.tool_name));
        }
        log::info!("created tool `{}`", tool.tool_name);
        Ok(tool)
    }

    /// Restores the default fields and clears the banner.
    pub fn reset(&mut self) {
        self.form = ToolForm::default();
        self.status = None;
    }
}

impl AppContent for ToolCreatorSession {
    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn view(&self) -> ContentView {
        ContentView {
            heading: "Tool Creator".to_string(),
            lines: vec![
                format!("Tool Name: {}", self.form.tool_name),
                format!("Description: {}", self.form.description),
                format!("Parameters: {}", self.form.parameters_json),
                format!("Code: {}", self.form.code),
            ],
            status: self.status.as_ref().map(|status| match status {
                FormStatus::Success(text) | FormStatus::Error(text) => text.clone(),
            }),
        }
    }

    fn handle_input<'a>(&'a mut self, input: AppInput) -> LocalBoxFuture<'a, ()> {
        Box::pin(async move {
            match input {
                AppInput::SetField { name, value } => {
                    if !self.form.set(&name, value) {
                        log::debug!("tool creator has no field `{name}`");
                    }
                }
                AppInput::Action(action) if action == "submit" => {
                    let _ = self.submit().await;
                }
                AppInput::Submit(_) => {
                    let _ = self.submit().await;
                }
                AppInput::Action(action) if action == "reset" => self.reset(),
                AppInput::Action(action) => log::debug!("tool creator ignored action `{action}`"),
            }
        })
    }
}

/// Tool Creator content producer writing into `tools`.
pub fn module(tools: Rc<dyn ToolStore>) -> AppModule {
    AppModule::new(move |context| {
        Box::new(ToolCreatorSession::new(
            context.instance_id,
            Rc::clone(&tools),
        ))
    })
}
