use serde::{Deserialize, Serialize};

use crate::error::ProblemError;
use crate::types::InferredType;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Value,
    pub expected: Value,
}

impl TestCase {
    /// Positional call arguments: an array input is spread, anything else
    /// is passed as the single argument.
    pub fn arguments(&self) -> Vec<&Value> {
        match &self.input {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

fn default_visible_cases() -> usize {
    3
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default)]
    pub example: String,
    /// JavaScript starter; the callable's name is read from it.
    pub starter: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default = "default_visible_cases")]
    pub visible_cases: usize,
}

impl Problem {
    pub fn visible(&self) -> &[TestCase] {
        let k = self.visible_cases.min(self.test_cases.len());
        &self.test_cases[..k]
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        index >= self.visible_cases
    }

    /// Structural shape check of every case. Correctness of the data is
    /// the content source's concern.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.test_cases.is_empty() {
            return Err(ProblemError::NoTestCases);
        }
        for (idx, case) in self.test_cases.iter().enumerate() {
            for arg in case.arguments() {
                InferredType::check(arg).map_err(|source| ProblemError::Schema {
                    case: idx + 1,
                    field: "input",
                    source,
                })?;
            }
            InferredType::check(&case.expected).map_err(|source| ProblemError::Schema {
                case: idx + 1,
                field: "expected",
                source,
            })?;
        }
        Ok(())
    }
}
