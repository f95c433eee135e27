use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Visible cases only, every case reported.
    Run,
    /// All cases, stops at the first failure.
    Submit,
}

/// Why a case did not pass.
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CaseFailure {
    #[error("Compilation failed: {0}")]
    Compile(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Execution service unavailable: {0}")]
    Transport(String),
    #[error("Wrong answer")]
    Mismatch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// 1-based position in the problem's case list.
    pub case_index: usize,
    pub hidden: bool,
    pub input: Value,
    pub expected: Value,
    pub actual: Option<Value>,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaseFailure>,
}

impl TestOutcome {
    pub fn message(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub outcomes: Vec<TestOutcome>,
    pub passed: usize,
    /// Cases in scope for this mode, attempted or not.
    pub total: usize,
    #[serde(default)]
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(mode: RunMode, total: usize) -> Self {
        Self {
            mode,
            outcomes: Vec::with_capacity(total),
            passed: 0,
            total,
            cancelled: false,
        }
    }

    pub fn push(&mut self, outcome: TestOutcome) {
        if outcome.passed {
            self.passed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn all_passed(&self) -> bool {
        !self.cancelled && self.passed == self.total
    }

    pub fn first_failure(&self) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| !o.passed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub case_index: usize,
    pub hidden_case_failure: bool,
    pub input: Value,
    pub expected: Value,
    pub actual: Option<Value>,
    pub message: Option<String>,
}

impl From<&TestOutcome> for FailureDetail {
    fn from(outcome: &TestOutcome) -> Self {
        Self {
            case_index: outcome.case_index,
            hidden_case_failure: outcome.hidden,
            input: outcome.input.clone(),
            expected: outcome.expected.clone(),
            actual: outcome.actual.clone(),
            message: outcome.message(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    AllPassed,
    Failed(FailureDetail),
    Cancelled,
}

/// Handed to the persistence collaborator when a submission is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptedSolution {
    pub problem_id: String,
    pub language: Language,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub report: RunReport,
    pub verdict: Verdict,
    pub accepted: Option<AcceptedSolution>,
}

impl SubmitOutcome {
    pub fn all_passed(&self) -> bool {
        matches!(self.verdict, Verdict::AllPassed)
    }
}
