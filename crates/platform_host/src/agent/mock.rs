//! Scripted offline agent.

use std::cell::Cell;

use serde_json::{Map, Value};

use super::{
    AgentError, AgentFuture, AgentService, ChatMessage, ToolCallEnvelope, ToolCallRequest,
    ToolManifestItem,
};

const MAX_RESULT_CHARS: usize = 300;

const JOKES: [&str; 4] = [
    "Why don't scientists trust atoms? Because they make up everything!",
    "I told my wife she was drawing her eyebrows too high. She seemed surprised.",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
    "Parallel lines have so much in common. It's a shame they'll never meet.",
];

const HELP_TEXT: &str = "CognitiveOS Mock CLI v0.2
Available commands (examples):
- 'hello' or 'hi'
- 'create plan for a new soda brand'
- 'analyze market trends for e-bikes'
- 'open neuro-metrics' (simulated app opening)
- 'tell me a joke'
- 'what is my current focus level?' (simulated neuro-data query)
- 'generate a report on cognitive load'";

/// Offline agent with canned replies.
///
/// Replies that would vary between calls (jokes, neuro readings) are derived from a turn
/// counter so a session is reproducible.
#[derive(Debug, Default)]
pub struct MockAgent {
    turn: Cell<u64>,
}

impl MockAgent {
    /// Creates an agent at turn zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_turn(&self) -> u64 {
        let turn = self.turn.get();
        self.turn.set(turn.wrapping_add(1));
        turn
    }

    fn reply(&self, text: &str, manifest: &[ToolManifestItem]) -> String {
        let turn = self.next_turn();
        let lower = text.trim().to_lowercase();
        let offers = |name: &str| manifest.iter().any(|tool| tool.tool_name == name);

        if offers("calculator")
            && ["calculate", "what is", "compute"]
                .iter()
                .any(|prefix| lower.starts_with(prefix))
        {
            if let Some(expression) = find_arithmetic_run(&lower) {
                log::debug!("mock agent calling `calculator` with {expression}");
                return tool_call_json("calculator", "expression", expression);
            }
        }

        if offers("fetchAndSummarizeUrl")
            && (lower.starts_with("summarize") || lower.starts_with("fetch and summarize"))
        {
            if let Some(url) = find_url(&lower) {
                log::debug!("mock agent calling `fetchAndSummarizeUrl` with {url}");
                return tool_call_json("fetchAndSummarizeUrl", "url", url.to_string());
            }
        }

        if lower.starts_with("help") {
            let mut help = HELP_TEXT.to_string();
            if !manifest.is_empty() {
                help.push_str("\n\nAvailable custom tools:\n");
                for tool in manifest {
                    help.push_str(&format!("- {}: {}\n", tool.tool_name, tool.description));
                }
                help.push_str(
                    "\nTry invoking them by describing what you want to do, e.g., 'calculate 2+2'.",
                );
            }
            return help;
        }

        if lower.contains("hello") || lower.contains("hi") {
            return "Hello! I am the CognitiveOS assistant. How can I help you develop your \
                    cognitive functions today? Try \"help\" for ideas."
                .to_string();
        }

        if lower.starts_with("create plan") {
            return format!(
                "Okay, I've drafted a preliminary plan based on your request: \"{text}\".
1. Define project objectives and key results (OKRs).
2. Conduct user research & competitive analysis (Consider using Neuro-Metrics for focus during research).
3. Brainstorm core features and design mockups.
4. Develop a prototype (Perhaps using Sandbox Editor for coding tasks).
5. Test and iterate based on feedback.
Shall I elaborate or simulate opening a relevant app like Mission Control?"
            );
        }

        let app_replies = [
            (
                "open neuro-metrics",
                "Understood. Simulating the command to open the Neuro-Metrics Dashboard...",
            ),
            (
                "open mission control",
                "Affirmative. Simulating opening Mission Control for task management...",
            ),
            (
                "open sandbox editor",
                "Roger that. Simulating the launch of Sandbox Editor for coding...",
            ),
            (
                "open tool creator",
                "Right away. Simulating opening the Tool Creator app...",
            ),
        ];
        if let Some((_, reply)) = app_replies.iter().find(|(cmd, _)| lower.contains(cmd)) {
            return (*reply).to_string();
        }

        if lower.contains("joke") {
            return JOKES[(turn % JOKES.len() as u64) as usize].to_string();
        }

        if lower.contains("focus level") || lower.contains("cognitive load") {
            let percentage = 40 + (turn.wrapping_mul(37) % 60);
            if lower.contains("focus level") {
                return format!(
                    "Based on simulated neuro-feedback, your current focus level is approximately \
                     {percentage}%. Keep up the great work!"
                );
            }
            return format!(
                "Simulated cognitive load is currently at {}%. Consider a short break if you \
                 feel strained.",
                100 - percentage
            );
        }

        format!(
            "I have processed your input: \"{text}\". As a mock AI, my responses are limited. If \
             you meant to use a tool, try phrasing your request to match its description (see \
             'help'). For more complex interactions, integration with a live LLM is required."
        )
    }
}

impl AgentService for MockAgent {
    fn send_message<'a>(
        &'a self,
        text: &'a str,
        _history: &'a [ChatMessage],
        manifest: &'a [ToolManifestItem],
    ) -> AgentFuture<'a, Result<String, AgentError>> {
        Box::pin(async move { Ok(self.reply(text, manifest)) })
    }

    fn send_tool_result<'a>(
        &'a self,
        original_message: &'a str,
        tool_name: &'a str,
        result: &'a Value,
    ) -> AgentFuture<'a, Result<String, AgentError>> {
        Box::pin(async move {
            let result_text = truncate_result(&display_value(result));
            Ok(format!(
                "Okay, I've used the tool **{tool_name}** in response to your request: \
                 \"{original_message}\".\nThe result was:\n```\n{result_text}\n```\nHow can I \
                 assist you further with this information?"
            ))
        })
    }
}

fn tool_call_json(name: &str, argument: &str, value: String) -> String {
    let mut arguments = Map::new();
    arguments.insert(argument.to_string(), Value::String(value));
    let envelope = ToolCallEnvelope {
        tool_call: ToolCallRequest {
            name: name.to_string(),
            arguments,
        },
    };
    serde_json::to_string(&envelope).unwrap_or_default()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truncate_result(text: &str) -> String {
    if text.chars().count() <= MAX_RESULT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_RESULT_CHARS - 3).collect();
    format!("{head}...")
}

/// Finds the first `<digits> (<op> <digits>)+` run and returns it with whitespace removed.
fn find_arithmetic_run(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    (0..bytes.len())
        .filter(|&start| bytes[start].is_ascii_digit())
        .find_map(|start| match_arithmetic_at(bytes, start))
        .map(|(start, end)| {
            text[start..end]
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect()
        })
}

fn match_arithmetic_at(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let skip_digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let skip_spaces = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut end = skip_digits(start);
    let mut groups = 0;
    loop {
        let op = skip_spaces(end);
        if op >= bytes.len() || !matches!(bytes[op], b'+' | b'-' | b'*' | b'/') {
            break;
        }
        let operand = skip_spaces(op + 1);
        let operand_end = skip_digits(operand);
        if operand_end == operand {
            break;
        }
        end = operand_end;
        groups += 1;
    }
    (groups > 0).then_some((start, end))
}

fn find_url(text: &str) -> Option<&str> {
    let start = [text.find("http://"), text.find("https://")]
        .into_iter()
        .flatten()
        .min()?;
    let rest = &text[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(&rest[..end])
}
