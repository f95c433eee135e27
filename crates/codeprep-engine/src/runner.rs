use codeprep_core::{
    AcceptedSolution, CaseFailure, CodeprepConfig, FailureDetail, Language, Problem, ProblemError,
    RunMode, RunReport, SubmitOutcome, TestCase, TestOutcome, Value, Verdict,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::compare::{compare, values_equal};
use crate::harness::synthesizer_for;
use crate::reference::ReferenceExecutor;
use crate::remote::{ExecutionResult, RemoteExecutor, TransportError};
use crate::starter::extract_function_name;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Started { mode: RunMode, total: usize },
    CaseStarted { case_index: usize, hidden: bool },
    CaseFinished { outcome: TestOutcome },
    Cancelled,
    Done { passed: usize, total: usize },
}

/// Sequences test cases through generation, execution and comparison.
/// Cases run one at a time, in order.
pub struct PracticeRunner {
    remote: RemoteExecutor,
    reference: ReferenceExecutor,
    events: Option<mpsc::Sender<RunEvent>>,
}

impl PracticeRunner {
    pub fn new(remote: RemoteExecutor, reference: ReferenceExecutor) -> Self {
        Self {
            remote,
            reference,
            events: None,
        }
    }

    pub fn from_config(config: &CodeprepConfig) -> Result<Self, TransportError> {
        Ok(Self::new(
            RemoteExecutor::from_config(&config.execution)?,
            ReferenceExecutor::from_config(&config.reference),
        ))
    }

    pub fn with_events(mut self, tx: mpsc::Sender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Visible cases only; every attempted case is reported.
    pub async fn run(
        &self,
        problem: &Problem,
        source: &str,
        language: Language,
        cancel: &CancellationToken,
    ) -> Result<RunReport, ProblemError> {
        self.execute(RunMode::Run, problem, source, language, cancel)
            .await
    }

    /// Every case, stopping at the first failure.
    pub async fn submit(
        &self,
        problem: &Problem,
        source: &str,
        language: Language,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, ProblemError> {
        let report = self
            .execute(RunMode::Submit, problem, source, language, cancel)
            .await?;

        let verdict = match (report.cancelled, report.first_failure()) {
            (_, Some(failure)) => Verdict::Failed(FailureDetail::from(failure)),
            (true, None) => Verdict::Cancelled,
            (false, None) => Verdict::AllPassed,
        };

        let accepted = matches!(verdict, Verdict::AllPassed).then(|| AcceptedSolution {
            problem_id: problem.id.clone(),
            language,
            source: source.to_string(),
        });

        tracing::info!(
            problem = %problem.id,
            language = %language,
            passed = report.passed,
            total = report.total,
            accepted = accepted.is_some(),
            "Submission evaluated"
        );

        Ok(SubmitOutcome {
            report,
            verdict,
            accepted,
        })
    }

    async fn execute(
        &self,
        mode: RunMode,
        problem: &Problem,
        source: &str,
        language: Language,
        cancel: &CancellationToken,
    ) -> Result<RunReport, ProblemError> {
        problem.validate()?;
        let function_name =
            extract_function_name(&problem.starter).ok_or(ProblemError::MissingFunctionName)?;

        let cases = match mode {
            RunMode::Run => problem.visible(),
            RunMode::Submit => &problem.test_cases[..],
        };

        tracing::info!(
            problem = %problem.id,
            language = %language,
            mode = ?mode,
            cases = cases.len(),
            function = %function_name,
            "Starting run"
        );

        let mut report = RunReport::new(mode, cases.len());
        self.emit(RunEvent::Started {
            mode,
            total: cases.len(),
        })
        .await;

        for (idx, case) in cases.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let hidden = problem.is_hidden(idx);
            self.emit(RunEvent::CaseStarted {
                case_index: idx + 1,
                hidden,
            })
            .await;

            let outcome = self
                .run_case(idx, hidden, case, source, &function_name, language)
                .await;

            // A result that lands after cancellation is dropped.
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            tracing::debug!(
                case = outcome.case_index,
                hidden = outcome.hidden,
                passed = outcome.passed,
                failure = ?outcome.failure,
                "Case finished"
            );

            let failed = !outcome.passed;
            self.emit(RunEvent::CaseFinished {
                outcome: outcome.clone(),
            })
            .await;
            report.push(outcome);

            if failed && mode == RunMode::Submit {
                break;
            }
        }

        match report.cancelled {
            true => self.emit(RunEvent::Cancelled).await,
            false => {
                self.emit(RunEvent::Done {
                    passed: report.passed,
                    total: report.total,
                })
                .await
            }
        }

        Ok(report)
    }

    async fn run_case(
        &self,
        idx: usize,
        hidden: bool,
        case: &TestCase,
        source: &str,
        function_name: &str,
        language: Language,
    ) -> TestOutcome {
        let result = match synthesizer_for(language) {
            None => self
                .reference
                .evaluate(source, function_name, case)
                .await
                .map(|actual| {
                    let passed = values_equal(&actual, &case.expected);
                    (actual, passed)
                }),
            Some(synthesizer) => {
                let program = synthesizer.synthesize(source, function_name, case);
                match self.remote.execute(language, program).await {
                    Ok(executed) => judge(executed, &case.expected),
                    Err(e) => {
                        tracing::error!(case = idx + 1, error = %e, "Execution failed");
                        Err(CaseFailure::Transport(e.to_string()))
                    }
                }
            }
        };

        let (actual, passed, failure) = match result {
            Ok((actual, true)) => (Some(actual), true, None),
            Ok((actual, false)) => (Some(actual), false, Some(CaseFailure::Mismatch)),
            Err(failure) => (None, false, Some(failure)),
        };

        TestOutcome {
            case_index: idx + 1,
            hidden,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual,
            passed,
            failure,
        }
    }

    async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

/// Classifies a sandbox result: compile diagnostics first, then runtime
/// failure, then output comparison.
fn judge(result: ExecutionResult, expected: &Value) -> Result<(Value, bool), CaseFailure> {
    if let Some(diagnostics) = result.compile_error {
        return Err(CaseFailure::Compile(diagnostics));
    }
    let crashed = result.exit_code.is_some_and(|code| code != 0);
    let silent_error = result.stdout.trim().is_empty() && !result.stderr.trim().is_empty();
    if crashed || silent_error {
        let message = match result.stderr.trim().is_empty() {
            true => format!("exited with code {}", result.exit_code.unwrap_or(-1)),
            false => result.stderr.trim().to_string(),
        };
        return Err(CaseFailure::Runtime(message));
    }
    let comparison = compare(&result.stdout, expected);
    Ok((comparison.actual, comparison.passed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stdout: &str, stderr: &str, compile: Option<&str>, code: Option<i32>) -> ExecutionResult {
        ExecutionResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            compile_error: compile.map(str::to_string),
            exit_code: code,
        }
    }

    #[test]
    fn test_judge_compile_error_wins() {
        let r = judge(result("", "", Some("error: expected ';'"), Some(1)), &Value::Int(1));
        assert_eq!(r, Err(CaseFailure::Compile("error: expected ';'".into())));
    }

    #[test]
    fn test_judge_runtime_error() {
        let r = judge(result("", "Exception in thread main", None, Some(1)), &Value::Int(1));
        assert_eq!(r, Err(CaseFailure::Runtime("Exception in thread main".into())));

        let r = judge(result("", "", None, Some(139)), &Value::Int(1));
        assert_eq!(r, Err(CaseFailure::Runtime("exited with code 139".into())));
    }

    #[test]
    fn test_judge_compares_output() {
        let r = judge(result("[0,1]\n", "", None, Some(0)), &serde_json::from_str("[0,1]").unwrap());
        assert!(matches!(r, Ok((_, true))));

        let r = judge(result("[1,0]\n", "warning", None, None), &serde_json::from_str("[0,1]").unwrap());
        assert!(matches!(r, Ok((_, false))));
    }
}
