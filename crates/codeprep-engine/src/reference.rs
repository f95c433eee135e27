//! JavaScript path: no type inference or code generation. The submission is
//! concatenated with a call wrapper and evaluated; the result comes back as
//! JSON rather than through the canonical printer.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use codeprep_core::{CaseFailure, Language, ReferenceConfig, TestCase, Value};
use thiserror::Error;
use tokio::process::Command;

use crate::literal::format_literal;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    async fn eval(&self, script: &str) -> Result<ScriptOutput, ReferenceError>;
}

/// Evaluates scripts with a local `node -e`.
#[derive(Debug, Clone)]
pub struct NodeRuntime {
    command: String,
    timeout_ms: u64,
}

impl NodeRuntime {
    pub fn new(config: &ReferenceConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout_ms: config.timeout_ms,
        }
    }
}

#[async_trait]
impl ScriptRuntime for NodeRuntime {
    async fn eval(&self, script: &str) -> Result<ScriptOutput, ReferenceError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(["-e", script])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ReferenceError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        let timeout = Duration::from_millis(self.timeout_ms);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ReferenceError::Spawn {
                    command: self.command.clone(),
                    source,
                })
            }
            Err(_) => return Err(ReferenceError::Timeout(self.timeout_ms)),
        };

        Ok(ScriptOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

pub struct ReferenceExecutor {
    runtime: Box<dyn ScriptRuntime>,
}

impl ReferenceExecutor {
    pub fn new(runtime: Box<dyn ScriptRuntime>) -> Self {
        Self { runtime }
    }

    pub fn from_config(config: &ReferenceConfig) -> Self {
        Self::new(Box::new(NodeRuntime::new(config)))
    }

    /// User source followed by a wrapper that looks the callable up by
    /// name and spreads the case's arguments into it.
    pub fn wrap(source: &str, function_name: &str, case: &TestCase) -> String {
        let args = case
            .arguments()
            .into_iter()
            .map(|v| format_literal(v, Language::JavaScript))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            r#"{source}

;(() => {{
  const __fn = typeof {name} === "function" ? {name} : undefined;
  if (__fn === undefined) {{
    process.stderr.write("{name} is not a function");
    process.exit(3);
  }}
  const __result = __fn(...[{args}]);
  if (__result === undefined) {{
    process.stderr.write("{name} returned undefined");
    process.exit(4);
  }}
  process.stdout.write(JSON.stringify(__result));
}})();
"#,
            source = source.trim_end(),
            name = function_name,
            args = args,
        )
    }

    pub async fn evaluate(
        &self,
        source: &str,
        function_name: &str,
        case: &TestCase,
    ) -> Result<Value, CaseFailure> {
        let script = Self::wrap(source, function_name, case);
        let output = self.runtime.eval(&script).await.map_err(|e| match e {
            ReferenceError::Timeout(_) => CaseFailure::Runtime(e.to_string()),
            ReferenceError::Spawn { .. } => CaseFailure::Transport(e.to_string()),
        })?;

        if !output.success {
            let message = match output.stderr.is_empty() {
                true => "script exited with an error".to_string(),
                false => output.stderr,
            };
            return Err(CaseFailure::Runtime(message));
        }

        serde_json::from_str::<serde_json::Value>(&output.stdout)
            .map_err(|e| e.to_string())
            .and_then(|json| Value::try_from(json).map_err(|e| e.to_string()))
            .map_err(|e| CaseFailure::Runtime(format!("unsupported result {}: {}", output.stdout, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedRuntime {
        output: ScriptOutput,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptRuntime for CannedRuntime {
        async fn eval(&self, script: &str) -> Result<ScriptOutput, ReferenceError> {
            self.seen.lock().unwrap().push(script.to_string());
            Ok(self.output.clone())
        }
    }

    fn canned(success: bool, stdout: &str, stderr: &str) -> CannedRuntime {
        CannedRuntime {
            output: ScriptOutput {
                success,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
            seen: Mutex::new(Vec::new()),
        }
    }

    fn two_sum_case() -> TestCase {
        TestCase {
            input: serde_json::from_str("[[2,7,11,15],9]").unwrap(),
            expected: serde_json::from_str("[0,1]").unwrap(),
        }
    }

    #[test]
    fn test_wrapper_spreads_arguments() {
        let script = ReferenceExecutor::wrap("function twoSum(a, t) {}", "twoSum", &two_sum_case());
        assert!(script.starts_with("function twoSum(a, t) {}\n"));
        assert!(script.contains("const __result = __fn(...[[2,7,11,15],9]);"));
        assert!(script.contains("typeof twoSum === \"function\""));
    }

    #[test]
    fn test_single_argument_wrapped_once() {
        let case = TestCase {
            input: Value::Str("abc".into()),
            expected: Value::Str("cba".into()),
        };
        let script = ReferenceExecutor::wrap("", "reverse", &case);
        assert!(script.contains("__fn(...[\"abc\"])"));
    }

    #[tokio::test]
    async fn test_structured_result() {
        let executor = ReferenceExecutor::new(Box::new(canned(true, "[0,1]", "")));
        let value = executor.evaluate("", "twoSum", &two_sum_case()).await.unwrap();
        assert_eq!(value, serde_json::from_str::<Value>("[0,1]").unwrap());
    }

    #[tokio::test]
    async fn test_script_failure_is_runtime_error() {
        let executor = ReferenceExecutor::new(Box::new(canned(false, "", "TypeError: x")));
        let err = executor.evaluate("", "twoSum", &two_sum_case()).await.unwrap_err();
        assert_eq!(err, CaseFailure::Runtime("TypeError: x".into()));
    }

    #[tokio::test]
    async fn test_object_result_rejected() {
        let executor = ReferenceExecutor::new(Box::new(canned(true, r#"{"a":1}"#, "")));
        let err = executor.evaluate("", "f", &two_sum_case()).await.unwrap_err();
        assert!(matches!(err, CaseFailure::Runtime(m) if m.starts_with("unsupported result")));
    }
}
