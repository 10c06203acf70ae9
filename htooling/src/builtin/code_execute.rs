//! Runs short snippets through a local interpreter.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::process::Command;

use hprovider::ToolDefinition;

use crate::{
    Tool, ToolError, ToolExecutionContext, ToolFuture, optional_string, parse_json_object,
    required_string, tool_definition,
};

pub const CODE_EXECUTION_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_LANGUAGE: &str = "python";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Interpreter {
    program: String,
    inline_flag: String,
}

/// Executes code with `<program> <inline_flag> <code>` and captures its output.
///
/// The child is killed when the deadline passes or the call is dropped.
#[derive(Debug, Clone)]
pub struct CodeExecuteTool {
    interpreters: BTreeMap<String, Interpreter>,
    timeout: Duration,
}

impl CodeExecuteTool {
    pub fn new() -> Self {
        Self {
            interpreters: BTreeMap::new(),
            timeout: CODE_EXECUTION_TIMEOUT,
        }
        .with_interpreter("python", "python3", "-c")
        .with_interpreter("javascript", "node", "-e")
    }

    pub fn with_interpreter(
        mut self,
        language: impl Into<String>,
        program: impl Into<String>,
        inline_flag: impl Into<String>,
    ) -> Self {
        self.interpreters.insert(
            language.into(),
            Interpreter {
                program: program.into(),
                inline_flag: inline_flag.into(),
            },
        );
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.interpreters.keys().map(String::as_str)
    }

    /// Always returns a JSON object; failures land in its `error` field.
    pub async fn execute(&self, code: &str, language: &str) -> Value {
        let Some(interpreter) = self.interpreters.get(language) else {
            return json!({"error": format!("Language {language} not supported")});
        };

        let child = Command::new(&interpreter.program)
            .arg(&interpreter.inline_flag)
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(err) => {
                return json!({"error": format!("failed to start {}: {err}", interpreter.program)});
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                json!({
                    "output": String::from_utf8_lossy(&output.stdout),
                    "error": if stderr.is_empty() { Value::Null } else { Value::String(stderr) },
                    "exit_code": output.status.code(),
                })
            }
            Ok(Err(err)) => json!({"error": err.to_string()}),
            Err(_) => json!({
                "error": format!("execution timed out after {} seconds", self.timeout.as_secs())
            }),
        }
    }
}

impl Default for CodeExecuteTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CodeExecuteTool {
    fn definition(&self) -> ToolDefinition {
        tool_definition(
            "code_execute",
            "Execute a short program and return its output",
            json!({
                "type": "object",
                "properties": {
                    "code": {"type": "string"},
                    "language": {
                        "type": "string",
                        "enum": self.languages().collect::<Vec<_>>(),
                        "default": DEFAULT_LANGUAGE
                    }
                },
                "required": ["code"]
            }),
        )
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_json_object(args_json)?;
            let code = required_string(&args, "code")?;
            let language =
                optional_string(&args, "language")?.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

            Ok(self.execute(&code, &language).await.to_string())
        })
    }
}
