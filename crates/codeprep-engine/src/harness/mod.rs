//! Harness synthesis for statically typed targets.
//!
//! A harness declares every argument of one test case as a typed local,
//! calls the submitted function and prints the result in canonical form
//! (`[e1,e2]`, quoted strings, `true`/`false`). The comparator parses that
//! exact form back, so the printers here and `compare::parse_output` change
//! together.

mod cpp;
mod java;

pub use cpp::CppHarness;
pub use java::JavaHarness;

use codeprep_core::{InferredType, Language, TestCase, Value};

use crate::literal::{format_typed, type_name};

pub trait HarnessSynthesizer: Send + Sync {
    fn language(&self) -> Language;

    /// Complete standalone program for one test case.
    fn synthesize(&self, source: &str, function_name: &str, case: &TestCase) -> String;
}

pub fn synthesizer_for(language: Language) -> Option<&'static dyn HarnessSynthesizer> {
    match language {
        Language::Cpp => Some(&CppHarness),
        Language::Java => Some(&JavaHarness),
        Language::JavaScript => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: InferredType,
    pub declared: String,
    pub literal: String,
}

/// Typed call shape of one test case in one language.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    pub arguments: Vec<Argument>,
    pub result: InferredType,
    pub result_declared: String,
}

impl CallPlan {
    /// The result type comes from the expected value, never from the
    /// submitted source. An argument that is an array with no elements to
    /// inspect borrows its element type from an array-typed expected value.
    pub fn new(case: &TestCase, language: Language) -> CallPlan {
        let result = InferredType::infer(&case.expected);
        let arguments = case
            .arguments()
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let ty = argument_type(value, result);
                Argument {
                    name: format!("arg{}", idx),
                    ty,
                    declared: type_name(ty, language).unwrap_or_default(),
                    literal: format_typed(value, ty, language),
                }
            })
            .collect();
        CallPlan {
            arguments,
            result,
            result_declared: type_name(result, language).unwrap_or_default(),
        }
    }

    pub fn call_arguments(&self) -> String {
        self.arguments
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn argument_type(value: &Value, expected: InferredType) -> InferredType {
    let inferred = InferredType::infer(value);
    if !expected.is_array() || has_elements(value) {
        return inferred;
    }
    match inferred {
        InferredType::Array(_) => InferredType::Array(expected.element()),
        InferredType::Array2d(_) => InferredType::Array2d(expected.element()),
        scalar => scalar,
    }
}

fn has_elements(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| match item {
            Value::Array(cells) => !cells.is_empty(),
            _ => true,
        }),
        _ => true,
    }
}

/// Appends `text` indented by `depth` levels of four spaces.
pub(crate) fn line(out: &mut Vec<String>, depth: usize, text: impl AsRef<str>) {
    out.push(format!("{}{}", "    ".repeat(depth), text.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeprep_core::ScalarType;

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase {
            input: serde_json::from_str(input).unwrap(),
            expected: serde_json::from_str(expected).unwrap(),
        }
    }

    #[test]
    fn test_plan_is_n_ary() {
        let plan = CallPlan::new(&case(r#"[[1,2],"x",true,2.5]"#, "0"), Language::Java);
        let declared: Vec<_> = plan.arguments.iter().map(|a| a.declared.as_str()).collect();
        assert_eq!(declared, vec!["int[]", "String", "boolean", "double"]);
        assert_eq!(plan.call_arguments(), "arg0, arg1, arg2, arg3");
        assert_eq!(plan.result_declared, "int");
    }

    #[test]
    fn test_empty_argument_borrows_expected_element() {
        let plan = CallPlan::new(&case(r#"[[],5]"#, r#"["a"]"#), Language::Cpp);
        assert_eq!(plan.arguments[0].ty, InferredType::Array(ScalarType::Str));
        assert_eq!(plan.arguments[0].declared, "vector<string>");
        assert_eq!(plan.arguments[0].literal, "{}");
        assert_eq!(plan.arguments[1].declared, "int");
    }

    #[test]
    fn test_empty_argument_and_empty_expected_default_to_int() {
        let plan = CallPlan::new(&case(r#"[[],5]"#, "[]"), Language::Java);
        assert_eq!(plan.arguments[0].literal, "new int[0]");
        assert_eq!(plan.result_declared, "int[]");
    }

    #[test]
    fn test_non_empty_argument_keeps_its_own_type() {
        let plan = CallPlan::new(&case(r#"[["a","b"]]"#, "[1]"), Language::Cpp);
        assert_eq!(plan.arguments[0].declared, "vector<string>");
    }

    #[test]
    fn test_synthesizer_lookup() {
        assert!(synthesizer_for(Language::JavaScript).is_none());
        assert_eq!(synthesizer_for(Language::Cpp).map(|s| s.language()), Some(Language::Cpp));
        assert_eq!(synthesizer_for(Language::Java).map(|s| s.language()), Some(Language::Java));
    }
}
