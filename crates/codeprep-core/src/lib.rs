pub mod config;
pub mod error;
pub mod language;
pub mod problem;
pub mod report;
pub mod types;
pub mod value;

pub use config::{BackendConfig, CatalogConfig, CodeprepConfig, ExecutionConfig, ReferenceConfig};
pub use error::{ConfigError, ProblemError, SchemaError};
pub use language::Language;
pub use problem::{Difficulty, Problem, TestCase};
pub use report::{
    AcceptedSolution, CaseFailure, FailureDetail, RunMode, RunReport, SubmitOutcome, TestOutcome,
    Verdict,
};
pub use types::{InferredType, ScalarType};
pub use value::Value;
