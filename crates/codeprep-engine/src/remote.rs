use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use codeprep_core::{BackendConfig, ExecutionConfig, Language};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Timed out after {0}s")]
    Timeout(u64),
    #[error("Sandbox returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed sandbox response: {0}")]
    Malformed(String),
    #[error("primary failed ({primary}); secondary failed ({secondary})")]
    Failover {
        primary: Box<TransportError>,
        secondary: Box<TransportError>,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// One program to run. All test input is embedded in the program text.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub language: Language,
    pub program_source: String,
}

/// Normalized sandbox response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub compile_error: Option<String>,
    pub exit_code: Option<i32>,
}

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Nested(NestedResponse),
    Flat(FlatResponse),
}

#[derive(Debug, Deserialize)]
struct NestedResponse {
    run: Stage,
    #[serde(default)]
    compile: Option<Stage>,
}

#[derive(Debug, Default, Deserialize)]
struct Stage {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    signal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlatResponse {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(
        default,
        alias = "compileDiagnostics",
        alias = "compile_output",
        alias = "compileOutput"
    )]
    compile_diagnostics: Option<String>,
    #[serde(default, alias = "exitCode")]
    exit_code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

impl WireResponse {
    fn normalize(self) -> Result<ExecutionResult> {
        match self {
            WireResponse::Nested(nested) => {
                let compile_error = nested.compile.and_then(|stage| {
                    let failed = match stage.code {
                        Some(code) => code != 0,
                        None => stage.signal.is_some(),
                    };
                    failed.then(|| {
                        non_empty(stage.stderr)
                            .or_else(|| non_empty(stage.stdout))
                            .unwrap_or_else(|| "compilation failed".to_string())
                    })
                });
                let run = nested.run;
                let mut stderr = run.stderr.unwrap_or_default();
                let exit_code = match (&run.signal, run.code) {
                    (Some(signal), None) => {
                        stderr.push_str(&format!("\nkilled by {}", signal));
                        Some(-1)
                    }
                    (_, code) => code,
                };
                Ok(ExecutionResult {
                    stdout: run.stdout.unwrap_or_default(),
                    stderr,
                    compile_error,
                    exit_code,
                })
            }
            WireResponse::Flat(flat) => {
                if flat.stdout.is_none() && flat.stderr.is_none() && flat.compile_diagnostics.is_none() {
                    let reason = flat.message.unwrap_or_else(|| "no output fields".to_string());
                    return Err(TransportError::Malformed(reason));
                }
                Ok(ExecutionResult {
                    stdout: flat.stdout.unwrap_or_default(),
                    stderr: flat.stderr.unwrap_or_default(),
                    compile_error: non_empty(flat.compile_diagnostics),
                    exit_code: flat.exit_code,
                })
            }
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Parses either sandbox response shape into the internal result.
pub fn parse_response(body: &str) -> Result<ExecutionResult> {
    let wire: WireResponse = serde_json::from_str(body).map_err(|e| {
        let head: String = body.chars().take(500).collect();
        TransportError::Malformed(format!("{} - Body: {}", e, head))
    })?;
    wire.normalize()
}

/// Sandbox reached over HTTP: POSTs the request as JSON.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    name: String,
    url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(name: &str, config: &BackendConfig, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl ExecutionBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await.map_err(|e| match e.is_timeout() {
            true => TransportError::Timeout(self.timeout_secs),
            false => TransportError::Http(e.to_string()),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = resp.text().await.map_err(|e| match e.is_timeout() {
            true => TransportError::Timeout(self.timeout_secs),
            false => TransportError::Http(e.to_string()),
        })?;

        parse_response(&body)
    }
}

/// Primary sandbox with at most one failover to a secondary. Holds no
/// per-case state, so one instance serves every case of every run.
#[derive(Clone)]
pub struct RemoteExecutor {
    primary: Arc<dyn ExecutionBackend>,
    secondary: Option<Arc<dyn ExecutionBackend>>,
}

impl RemoteExecutor {
    pub fn new(
        primary: Arc<dyn ExecutionBackend>,
        secondary: Option<Arc<dyn ExecutionBackend>>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn from_config(config: &ExecutionConfig) -> Result<Self> {
        let primary = HttpBackend::new("primary", &config.primary, config.timeout_secs)?;
        let secondary = match &config.secondary {
            Some(backend) => Some(Arc::new(HttpBackend::new(
                "secondary",
                backend,
                config.timeout_secs,
            )?) as Arc<dyn ExecutionBackend>),
            None => None,
        };
        Ok(Self::new(Arc::new(primary), secondary))
    }

    pub async fn execute(&self, language: Language, program: String) -> Result<ExecutionResult> {
        let request = ExecutionRequest {
            language,
            program_source: program,
        };

        let primary_err = match self.primary.execute(&request).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let Some(secondary) = &self.secondary else {
            return Err(primary_err);
        };

        tracing::warn!(
            backend = self.primary.name(),
            fallback = secondary.name(),
            error = %primary_err,
            "Execution backend failed, failing over"
        );

        secondary
            .execute(&request)
            .await
            .map_err(|secondary_err| TransportError::Failover {
                primary: Box::new(primary_err),
                secondary: Box::new(secondary_err),
            })
    }
}
