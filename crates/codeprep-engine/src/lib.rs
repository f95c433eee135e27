pub mod cache;
pub mod catalog;
pub mod compare;
pub mod harness;
pub mod literal;
pub mod reference;
pub mod remote;
pub mod runner;
pub mod starter;

pub use cache::{CacheKey, CachedProblemSource, ProblemCache, ProblemSource, SourceError};
pub use catalog::{load_catalog, load_problem, LoaderError};
pub use compare::{compare, parse_output, values_equal, Comparison};
pub use harness::{synthesizer_for, CallPlan, CppHarness, HarnessSynthesizer, JavaHarness};
pub use literal::{format_literal, format_typed, type_name};
pub use reference::{NodeRuntime, ReferenceError, ReferenceExecutor, ScriptOutput, ScriptRuntime};
pub use remote::{
    ExecutionBackend, ExecutionRequest, ExecutionResult, HttpBackend, RemoteExecutor,
    TransportError,
};
pub use runner::{PracticeRunner, RunEvent};
pub use starter::extract_function_name;
