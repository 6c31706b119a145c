//! Restricted evaluator for stored tool bodies.
//!
//! A body is a single directive that only sees the call's argument map:
//!
//! - `eval <param>` evaluates the argument as arithmetic over numbers, `+ - * /` and parentheses;
//! - `return <template>` returns the template with `${param}` placeholders filled in;
//! - `mock_summary <param>` returns a canned summary of the URL in the argument.

use platform_host::ToolDefinition;
use serde_json::{Map, Value};
use thiserror::Error;

const MAX_EXPRESSION_CHARS: usize = 100;

/// Tool run failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolExecutionError {
    /// The body is not a directive the evaluator understands.
    #[error("unsupported tool body: {0}")]
    UnsupportedBody(String),
    /// The body references an argument the call did not supply.
    #[error("missing argument `{0}`")]
    MissingArgument(String),
}

/// Runs `tool` with `arguments`.
///
/// Arithmetic problems are reported inside the returned value as an `Error: ...` string, the
/// way the tool itself would answer; only structural problems are errors.
///
/// # Errors
///
/// See [`ToolExecutionError`].
pub fn run_tool(
    tool: &ToolDefinition,
    arguments: &Map<String, Value>,
) -> Result<Value, ToolExecutionError> {
    let body = tool.code.trim();
    let (directive, rest) = body
        .split_once(char::is_whitespace)
        .map_or((body, ""), |(head, tail)| (head, tail.trim()));

    match directive {
        "eval" => {
            let expression = argument(arguments, single_param(rest, body)?)?;
            Ok(evaluate_expression(&expression))
        }
        "mock_summary" => {
            let url = argument(arguments, single_param(rest, body)?)?;
            Ok(Value::String(mock_summary(&url)))
        }
        "return" => fill_template(strip_literal(rest), arguments).map(Value::String),
        _ => Err(ToolExecutionError::UnsupportedBody(body.to_string())),
    }
}

/// Renders a tool result for the transcript.
pub fn display_result(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

fn single_param<'a>(rest: &'a str, body: &str) -> Result<&'a str, ToolExecutionError> {
    let name = rest.trim_end_matches(';').trim();
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(ToolExecutionError::UnsupportedBody(body.to_string()))
    }
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn argument(arguments: &Map<String, Value>, name: &str) -> Result<String, ToolExecutionError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Err(ToolExecutionError::MissingArgument(name.to_string())),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

fn strip_literal(raw: &str) -> &str {
    let raw = raw.trim().trim_end_matches(';').trim_end();
    for quote in ['`', '"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn fill_template(
    template: &str,
    arguments: &Map<String, Value>,
) -> Result<String, ToolExecutionError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        out.push_str(&argument(arguments, after[..end].trim())?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn mock_summary(url: &str) -> String {
    if url.contains("error") {
        return format!("MOCK Error: Could not fetch content from {url}");
    }
    let words = 100 + (url.len() * 37) % 500;
    format!(
        "MOCK Summary for {url}: This is a placeholder summary. The page discusses important \
         topics related to web content and kittens. Length: {words} words."
    )
}

fn evaluate_expression(expression: &str) -> Value {
    let allowed = |c: char| c.is_ascii_digit() || "+-*/.() \t\n\r".contains(c);
    if expression.chars().count() > MAX_EXPRESSION_CHARS || !expression.chars().all(allowed) {
        return Value::String("Error: Expression seems invalid or too complex.".to_string());
    }
    match ExpressionParser::new(expression).parse() {
        Ok(number) => number_value(number),
        Err(message) => Value::String(format!("Error: Invalid mathematical expression - {message}")),
    }
}

fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        return Value::from(number as i64);
    }
    serde_json::Number::from_f64(number)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(number.to_string()))
}

struct ExpressionParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<f64, String> {
        let value = self.sum()?;
        self.skip_spaces();
        if self.pos < self.bytes.len() {
            return Err(format!("unexpected `{}`", self.bytes[self.pos] as char));
        }
        if !value.is_finite() {
            return Err("result is not a finite number".to_string());
        }
        Ok(value)
    }

    fn sum(&mut self) -> Result<f64, String> {
        let mut value = self.product()?;
        while let Some(op) = self.eat_any(b"+-") {
            let rhs = self.product()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn product(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_any(b"*/") {
            let rhs = self.unary()?;
            if op == b'/' && rhs == 0.0 {
                return Err("division by zero".to_string());
            }
            value = if op == b'*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, String> {
        match self.eat_any(b"+-") {
            Some(b'-') => Ok(-self.unary()?),
            Some(_) => self.unary(),
            None => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, String> {
        self.skip_spaces();
        if self.eat_any(b"(").is_some() {
            let value = self.sum()?;
            if self.eat_any(b")").is_none() {
                return Err("missing `)`".to_string());
            }
            return Ok(value);
        }
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err("expected a number".to_string());
        }
        let literal = String::from_utf8_lossy(&self.bytes[start..self.pos]);
        literal
            .parse::<f64>()
            .map_err(|_| format!("malformed number `{literal}`"))
    }

    fn eat_any(&mut self, candidates: &[u8]) -> Option<u8> {
        self.skip_spaces();
        let next = *self.bytes.get(self.pos)?;
        if candidates.contains(&next) {
            self.pos += 1;
            Some(next)
        } else {
            None
        }
    }

    fn skip_spaces(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use platform_host::{default_tool_definitions, ToolParameter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn tool(code: &str) -> ToolDefinition {
        ToolDefinition {
            id: "t".to_string(),
            tool_name: "probe".to_string(),
            description: "probe".to_string(),
            parameters: vec![ToolParameter {
                name: "x".to_string(),
                param_type: "string".to_string(),
                description: "input".to_string(),
            }],
            code: code.to_string(),
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn default_tool(name: &str) -> ToolDefinition {
        default_tool_definitions()
            .into_iter()
            .find(|t| t.tool_name == name)
            .expect("default tool")
    }

    #[test]
    fn calculator_evaluates_with_precedence() {
        let calculator = default_tool("calculator");
        assert_eq!(
            run_tool(&calculator, &args(json!({"expression": "2+2*3"}))),
            Ok(json!(8))
        );
        assert_eq!(
            run_tool(&calculator, &args(json!({"expression": "(1 + 2) / 4"}))),
            Ok(json!(0.75))
        );
        assert_eq!(
            run_tool(&calculator, &args(json!({"expression": "-3 * -(2)"}))),
            Ok(json!(6))
        );
    }

    #[test]
    fn calculator_answers_bad_input_with_error_text() {
        let calculator = default_tool("calculator");
        assert_eq!(
            run_tool(&calculator, &args(json!({"expression": "alert(1)"}))),
            Ok(json!("Error: Expression seems invalid or too complex."))
        );
        assert_eq!(
            run_tool(&calculator, &args(json!({"expression": "1".repeat(101)}))),
            Ok(json!("Error: Expression seems invalid or too complex."))
        );
        let Ok(Value::String(text)) = run_tool(&calculator, &args(json!({"expression": "1/0"})))
        else {
            panic!("expected error text");
        };
        assert!(text.starts_with("Error: Invalid mathematical expression - "));
        assert!(matches!(
            run_tool(&calculator, &args(json!({"expression": "2+"}))),
            Ok(Value::String(_))
        ));
    }

    #[test]
    fn mock_summary_reports_error_urls() {
        let summarize = default_tool("fetchAndSummarizeUrl");
        assert_eq!(
            run_tool(&summarize, &args(json!({"url": "https://error.test"}))),
            Ok(json!("MOCK Error: Could not fetch content from https://error.test"))
        );
        let Ok(Value::String(text)) = run_tool(&summarize, &args(json!({"url": "https://a.b"})))
        else {
            panic!("expected summary");
        };
        assert!(text.starts_with("MOCK Summary for https://a.b:"));
    }

    #[test]
    fn return_templates_fill_placeholders() {
        assert_eq!(
            run_tool(&tool("return `Hello, ${x}!`;"), &args(json!({"x": "Ada"}))),
            Ok(json!("Hello, Ada!"))
        );
        assert_eq!(
            run_tool(&tool("return ${x} squared"), &args(json!({"x": 3}))),
            Ok(json!("3 squared"))
        );
    }

    #[test]
    fn structural_problems_are_errors() {
        assert_eq!(
            run_tool(&tool("return ${y}"), &args(json!({"x": "1"}))),
            Err(ToolExecutionError::MissingArgument("y".to_string()))
        );
        assert_eq!(
            run_tool(&tool("eval x"), &Map::new()),
            Err(ToolExecutionError::MissingArgument("x".to_string()))
        );
        assert_eq!(
            run_tool(&tool("fetch('http://x')"), &Map::new()),
            Err(ToolExecutionError::UnsupportedBody("fetch('http://x')".to_string()))
        );
        assert!(matches!(
            run_tool(&tool("eval 1+1"), &Map::new()),
            Err(ToolExecutionError::UnsupportedBody(_))
        ));
    }

    #[test]
    fn results_display_like_the_transcript_expects() {
        assert_eq!(display_result(&json!("ok")), "ok");
        assert_eq!(display_result(&json!(14)), "14");
        assert_eq!(display_result(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }
}
