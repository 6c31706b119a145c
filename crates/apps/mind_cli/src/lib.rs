//! Mind-CLI: the conversational command line that lets the agent call stored tools.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod sandbox;

use std::rc::Rc;

use desktop_app_contract::{AppContent, AppInput, AppModule, ContentView, InstanceId};
use futures::future::LocalBoxFuture;
use platform_host::{
    parse_agent_reply, unique_token, unix_time_ms_now, AgentReply, AgentService, ChatMessage,
    MessageSender, ToolDefinition, ToolManifestItem, ToolStore,
};
use serde_json::{Map, Value};

/// Text of the message every session opens with.
pub const WELCOME_TEXT: &str =
    "Welcome to Mind-CLI. Type \"help\" for commands or to see available tools.";
/// System message shown when the agent cannot be reached.
pub const AGENT_FAILURE_TEXT: &str = "Error: Could not get a response. Please try again.";

/// One Mind-CLI transcript bound to a window instance.
pub struct MindCliSession {
    instance_id: InstanceId,
    tools: Rc<dyn ToolStore>,
    agent: Rc<dyn AgentService>,
    messages: Vec<ChatMessage>,
    draft: String,
    busy: bool,
    active_tool: Option<String>,
}

impl MindCliSession {
    /// Starts a session with the welcome message.
    pub fn new(
        instance_id: InstanceId,
        tools: Rc<dyn ToolStore>,
        agent: Rc<dyn AgentService>,
    ) -> Self {
        Self {
            instance_id,
            tools,
            agent,
            messages: vec![ChatMessage {
                id: "welcome-msg".to_string(),
                text: WELCOME_TEXT.to_string(),
                sender: MessageSender::System,
                timestamp_ms: unix_time_ms_now(),
                tool_name: None,
            }],
            draft: String::new(),
            busy: false,
            active_tool: None,
        }
    }

    /// Transcript in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Current input-line text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the input-line text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Input-line placeholder for the current state.
    pub fn placeholder(&self) -> String {
        match (&self.active_tool, self.busy) {
            (Some(tool), true) => format!("AI is using tool: {tool}..."),
            (None, true) => "AI is processing...".to_string(),
            _ => "Type your command...".to_string(),
        }
    }

    /// Submits the input line and clears it.
    pub async fn submit_draft(&mut self) {
        let text = std::mem::take(&mut self.draft);
        self.submit(&text).await;
    }

    /// Sends `input` to the agent and runs any tool it asks for.
    ///
    /// Blank input and input arriving while a submission is in flight are ignored.
    pub async fn submit(&mut self, input: &str) {
        let text = input.trim();
        if text.is_empty() || self.busy {
            return;
        }
        let history = self.messages.clone();
        self.push(text, MessageSender::User, None);
        self.busy = true;

        let manifest = self.manifest().await;
        match self.agent.send_message(text, &history, &manifest).await {
            Ok(raw) => match parse_agent_reply(&raw) {
                AgentReply::Text(reply) => self.push(&reply, MessageSender::Ai, None),
                AgentReply::ToolCall(call) => {
                    self.active_tool = Some(call.name.clone());
                    match self.tools.find_by_name(&call.name).await {
                        Ok(Some(tool)) => {
                            self.execute_tool(&tool, &call.arguments, text, &history)
                                .await
                        }
                        Ok(None) => self.report_missing_tool(&call.name),
                        Err(err) => {
                            log::warn!("tool lookup for `{}` failed: {err}", call.name);
                            self.report_missing_tool(&call.name);
                        }
                    }
                }
            },
            Err(err) => {
                log::warn!("agent request failed: {err}");
                self.push(AGENT_FAILURE_TEXT, MessageSender::System, None);
            }
        }

        self.busy = false;
        self.active_tool = None;
    }

    async fn manifest(&self) -> Vec<ToolManifestItem> {
        match self.tools.load_all().await {
            Ok(tools) => tools
                .into_iter()
                .map(|tool| ToolManifestItem {
                    tool_name: tool.tool_name,
                    description: tool.description,
                })
                .collect(),
            Err(err) => {
                log::warn!("loading tools for the agent manifest failed: {err}");
                Vec::new()
            }
        }
    }

    async fn execute_tool(
        &mut self,
        tool: &ToolDefinition,
        arguments: &Map<String, Value>,
        original_text: &str,
        history: &[ChatMessage],
    ) {
        let name = tool.tool_name.as_str();
        self.push(
            &format!(
                "Executing tool: {name} with arguments: {}",
                Value::Object(arguments.clone())
            ),
            MessageSender::System,
            Some(name),
        );

        match sandbox::run_tool(tool, arguments) {
            Ok(result) => {
                self.push(
                    &format!(
                        "Tool {name} executed. Result: {}",
                        sandbox::display_result(&result)
                    ),
                    MessageSender::ToolResult,
                    Some(name),
                );
                match self
                    .agent
                    .send_tool_result(original_text, name, &result)
                    .await
                {
                    Ok(reply) => self.push(&reply, MessageSender::Ai, None),
                    Err(err) => {
                        log::warn!("posting the `{name}` result to the agent failed: {err}");
                        self.push(AGENT_FAILURE_TEXT, MessageSender::System, None);
                    }
                }
            }
            Err(err) => {
                log::warn!("tool `{name}` failed: {err}");
                self.push(
                    &format!("Error executing tool {name}: {err}"),
                    MessageSender::System,
                    None,
                );
                let fallback_prompt = format!(
                    "There was an error executing the tool {name} for my previous request \
                     (\"{original_text}\"). The error was: {err}. Can you proceed or suggest an \
                     alternative?"
                );
                match self.agent.send_message(&fallback_prompt, history, &[]).await {
                    Ok(reply) => self.push(&reply, MessageSender::Ai, None),
                    Err(err) => {
                        log::warn!("agent fallback request failed: {err}");
                        self.push(AGENT_FAILURE_TEXT, MessageSender::System, None);
                    }
                }
            }
        }
    }

    fn report_missing_tool(&mut self, name: &str) {
        self.push(
            &format!("AI tried to use a tool named \"{name}\" but it was not found."),
            MessageSender::System,
            None,
        );
    }

    fn push(&mut self, text: &str, sender: MessageSender, tool_name: Option<&str>) {
        let prefix = match sender {
            MessageSender::User => "user",
            MessageSender::Ai => "ai",
            MessageSender::System => "system",
            MessageSender::ToolResult => "tool_result",
        };
        self.messages.push(ChatMessage {
            id: unique_token(prefix),
            text: text.to_string(),
            sender,
            timestamp_ms: unix_time_ms_now(),
            tool_name: tool_name.map(str::to_string),
        });
    }
}

/// Transcript line for one message.
pub fn render_message(message: &ChatMessage) -> String {
    match (message.sender, message.tool_name.as_deref()) {
        (MessageSender::User, _) => format!("You: {}", message.text),
        (MessageSender::Ai, _) => format!("AI: {}", message.text),
        (MessageSender::System, Some(tool)) => format!("Tool ({tool}): {}", message.text),
        (MessageSender::System, None) => format!("System: {}", message.text),
        (MessageSender::ToolResult, tool) => {
            format!("Tool Result ({}): {}", tool.unwrap_or("?"), message.text)
        }
    }
}

impl AppContent for MindCliSession {
    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn view(&self) -> ContentView {
        ContentView {
            heading: "Mind-CLI".to_string(),
            lines: self.messages.iter().map(render_message).collect(),
            status: self.busy.then(|| self.placeholder()),
        }
    }

    fn handle_input<'a>(&'a mut self, input: AppInput) -> LocalBoxFuture<'a, ()> {
        Box::pin(async move {
            match input {
                AppInput::Submit(text) => self.submit(&text).await,
                AppInput::SetField { name, value } if name == "input" => self.set_draft(value),
                AppInput::Action(action) if action == "submit" => self.submit_draft().await,
                other => log::debug!("mind-cli ignored input {other:?}"),
            }
        })
    }
}

/// Mind-CLI content producer wired to the given services.
pub fn module(tools: Rc<dyn ToolStore>, agent: Rc<dyn AgentService>) -> AppModule {
    AppModule::new(move |context| {
        Box::new(MindCliSession::new(
            context.instance_id,
            Rc::clone(&tools),
            Rc::clone(&agent),
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use platform_host::{
        seed_default_tools, AgentError, AgentFuture, MemoryToolStore, MockAgent, ToolParameter,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    /// Agent answering from a fixed queue of replies.
    #[derive(Default)]
    struct QueuedAgent {
        replies: RefCell<Vec<Result<String, AgentError>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl QueuedAgent {
        fn with(replies: Vec<Result<String, AgentError>>) -> Rc<Self> {
            let mut replies = replies;
            replies.reverse();
            Rc::new(Self {
                replies: RefCell::new(replies),
                prompts: RefCell::default(),
            })
        }

        fn next(&self) -> Result<String, AgentError> {
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or(Err(AgentError::Unavailable))
        }
    }

    impl AgentService for QueuedAgent {
        fn send_message<'a>(
            &'a self,
            text: &'a str,
            _history: &'a [ChatMessage],
            _manifest: &'a [ToolManifestItem],
        ) -> AgentFuture<'a, Result<String, AgentError>> {
            self.prompts.borrow_mut().push(text.to_string());
            Box::pin(async move { self.next() })
        }

        fn send_tool_result<'a>(
            &'a self,
            _original_message: &'a str,
            tool_name: &'a str,
            result: &'a Value,
        ) -> AgentFuture<'a, Result<String, AgentError>> {
            self.prompts
                .borrow_mut()
                .push(format!("result {tool_name} {result}"));
            Box::pin(async move { self.next() })
        }
    }

    fn seeded_store() -> Rc<MemoryToolStore> {
        let store = Rc::new(MemoryToolStore::default());
        block_on(seed_default_tools(store.as_ref())).expect("seed");
        store
    }

    fn senders(session: &MindCliSession) -> Vec<MessageSender> {
        session.messages().iter().map(|m| m.sender).collect()
    }

    #[test]
    fn session_opens_with_the_welcome_message() {
        let session = MindCliSession::new(
            InstanceId::from_raw("mindCLI-1"),
            seeded_store(),
            Rc::new(MockAgent::new()),
        );
        assert_eq!(
            render_message(&session.messages()[0]),
            format!("System: {WELCOME_TEXT}")
        );
        assert_eq!(session.placeholder(), "Type your command...");
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = MindCliSession::new(
            InstanceId::from_raw("mindCLI-1"),
            seeded_store(),
            Rc::new(MockAgent::new()),
        );
        block_on(session.submit("   "));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn calculator_round_trip_through_the_mock_agent() {
        let mut session = MindCliSession::new(
            InstanceId::from_raw("mindCLI-1"),
            seeded_store(),
            Rc::new(MockAgent::new()),
        );
        block_on(session.submit("calculate 2 + 2 * 3"));

        assert_eq!(
            senders(&session),
            vec![
                MessageSender::System,
                MessageSender::User,
                MessageSender::System,
                MessageSender::ToolResult,
                MessageSender::Ai,
            ]
        );
        let messages = session.messages();
        assert_eq!(
            messages[2].text,
            "Executing tool: calculator with arguments: {\"expression\":\"2+2*3\"}"
        );
        assert_eq!(messages[3].text, "Tool calculator executed. Result: 8");
        assert!(messages[4].text.contains("**calculator**"));
        assert!(!session.is_busy());
    }

    #[test]
    fn unknown_tool_calls_are_reported() {
        let agent = QueuedAgent::with(vec![Ok(
            r#"{"tool_call":{"name":"teleport","arguments":{}}}"#.to_string(),
        )]);
        let mut session =
            MindCliSession::new(InstanceId::from_raw("mindCLI-1"), seeded_store(), agent);
        block_on(session.submit("beam me up"));
        assert_eq!(
            session.messages().last().map(|m| m.text.as_str()),
            Some("AI tried to use a tool named \"teleport\" but it was not found.")
        );
    }

    #[test]
    fn failing_tools_fall_back_to_the_agent() {
        let store = Rc::new(MemoryToolStore::default());
        block_on(store.add(ToolDefinition {
            id: "tool-greet".to_string(),
            tool_name: "greet".to_string(),
            description: "greets".to_string(),
            parameters: vec![ToolParameter {
                name: "who".to_string(),
                param_type: "string".to_string(),
                description: "name".to_string(),
            }],
            code: "return Hello ${who}".to_string(),
        }))
        .expect("add");
        let agent = QueuedAgent::with(vec![
            Ok(r#"{"tool_call":{"name":"greet","arguments":{}}}"#.to_string()),
            Ok("Sorry, try again with a name.".to_string()),
        ]);
        let mut session =
            MindCliSession::new(InstanceId::from_raw("mindCLI-1"), store, agent.clone());
        block_on(session.submit("greet someone"));

        let texts: Vec<&str> = session.messages()[2..]
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Executing tool: greet with arguments: {}",
                "Error executing tool greet: missing argument `who`",
                "Sorry, try again with a name.",
            ]
        );
        assert!(agent.prompts.borrow()[1].starts_with("There was an error executing the tool greet"));
    }

    #[test]
    fn agent_failures_become_system_messages() {
        let agent = QueuedAgent::with(vec![Err(AgentError::Request("offline".to_string()))]);
        let mut session =
            MindCliSession::new(InstanceId::from_raw("mindCLI-1"), seeded_store(), agent);
        block_on(session.submit("hello"));
        let last = session.messages().last().expect("message");
        assert_eq!(last.sender, MessageSender::System);
        assert_eq!(last.text, AGENT_FAILURE_TEXT);
    }

    #[test]
    fn module_mounts_sessions_that_take_draft_input() {
        let module = module(seeded_store(), Rc::new(MockAgent::new()));
        let mut content = module.mount(desktop_app_contract::AppMountContext {
            app_id: desktop_app_contract::ApplicationId::trusted("mindCLI"),
            instance_id: InstanceId::from_raw("mindCLI-7"),
        });
        block_on(content.handle_input(AppInput::SetField {
            name: "input".to_string(),
            value: "hello".to_string(),
        }));
        block_on(content.handle_input(AppInput::Action("submit".to_string())));

        let view = content.view();
        assert_eq!(content.instance_id().as_str(), "mindCLI-7");
        assert_eq!(view.lines[1], "You: hello");
        assert!(view.lines[2].starts_with("AI: Hello! I am the CognitiveOS assistant."));
        assert_eq!(view.status, None);
    }
}
