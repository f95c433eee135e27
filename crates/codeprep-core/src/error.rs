use thiserror::Error;

/// A value that falls outside the test-case grammar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("null is not a supported test value")]
    Null,

    #[error("objects are not supported test values")]
    Object,

    #[error("number {0} cannot be represented")]
    Number(String),

    #[error("integer {0} does not fit a 32-bit int")]
    IntegerRange(i64),

    #[error("arrays nested deeper than two levels are not supported")]
    TooDeep,

    #[error("mixed-type array: expected {expected}, found {found} at position {position}")]
    MixedArray {
        expected: String,
        found: String,
        position: usize,
    },
}

/// Problems that stop a run before anything is executed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("test case {case} {field}: {source}")]
    Schema {
        case: usize,
        field: &'static str,
        #[source]
        source: SchemaError,
    },

    #[error("no function name found in starter source")]
    MissingFunctionName,

    #[error("problem has no test cases")]
    NoTestCases,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
