//! Source-code literals and declared type names for test values.

use codeprep_core::{InferredType, Language, ScalarType, Value};

/// Renders `value` as a literal in `language`, typed by inference.
pub fn format_literal(value: &Value, language: Language) -> String {
    format_typed(value, InferredType::infer(value), language)
}

/// Renders `value` as a literal of the declared type `ty`. The declared
/// type may differ from the value's own inference only for empty arrays,
/// which carry no element evidence.
pub fn format_typed(value: &Value, ty: InferredType, language: Language) -> String {
    match (ty, value) {
        (InferredType::Array(element), Value::Array(items)) => {
            let body = join(items.iter().map(|v| scalar_literal(v, element)));
            match language {
                Language::Java if items.is_empty() => {
                    format!("new {}[0]", java_scalar(element))
                }
                Language::Java => format!("new {}[]{{{}}}", java_scalar(element), body),
                Language::Cpp => format!("{{{}}}", body),
                Language::JavaScript => format!("[{}]", body),
            }
        }
        (InferredType::Array2d(element), Value::Array(rows)) => {
            let row = |cells: &[Value]| join(cells.iter().map(|v| scalar_literal(v, element)));
            let body = join(
                rows.iter()
                    .map(|r| r.as_array().unwrap_or_default())
                    .map(|cells| match language {
                        Language::JavaScript => format!("[{}]", row(cells)),
                        _ => format!("{{{}}}", row(cells)),
                    }),
            );
            match language {
                Language::Java if rows.is_empty() => {
                    format!("new {}[0][]", java_scalar(element))
                }
                Language::Java => format!("new {}[][]{{{}}}", java_scalar(element), body),
                Language::Cpp => format!("{{{}}}", body),
                Language::JavaScript => format!("[{}]", body),
            }
        }
        (ty, value) => scalar_literal(value, ty.element()),
    }
}

/// Declared type of a local variable, or `None` for the dynamic language.
pub fn type_name(ty: InferredType, language: Language) -> Option<String> {
    let name = match language {
        Language::JavaScript => return None,
        Language::Cpp => match ty {
            InferredType::Scalar(s) => cpp_scalar(s).to_string(),
            InferredType::Array(s) => format!("vector<{}>", cpp_scalar(s)),
            InferredType::Array2d(s) => format!("vector<vector<{}>>", cpp_scalar(s)),
        },
        Language::Java => match ty {
            InferredType::Scalar(s) => java_scalar(s).to_string(),
            InferredType::Array(s) => format!("{}[]", java_scalar(s)),
            InferredType::Array2d(s) => format!("{}[][]", java_scalar(s)),
        },
    };
    Some(name)
}

fn cpp_scalar(s: ScalarType) -> &'static str {
    match s {
        ScalarType::Bool => "bool",
        ScalarType::Int => "int",
        ScalarType::Float => "double",
        ScalarType::Str => "string",
    }
}

fn java_scalar(s: ScalarType) -> &'static str {
    match s {
        ScalarType::Bool => "boolean",
        ScalarType::Int => "int",
        ScalarType::Float => "double",
        ScalarType::Str => "String",
    }
}

// Boolean keywords, decimal numbers and double-quoted strings read the same
// in every supported language.
fn scalar_literal(value: &Value, scalar: ScalarType) -> String {
    match (scalar, value) {
        (_, Value::Bool(b)) => b.to_string(),
        (ScalarType::Float, Value::Int(n)) => format!("{}.0", n),
        (ScalarType::Float, Value::Float(f)) => format!("{:?}", f),
        (_, Value::Int(n)) => n.to_string(),
        (_, Value::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
        (_, Value::Float(f)) => format!("{:?}", f),
        (_, Value::Str(s)) => quote(s),
        (_, array @ Value::Array(_)) => array.to_string(),
    }
}

/// Double-quoted with `"`, `\` and line-control characters escaped. The
/// harness printers emit the same escapes for string results.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(",")
}
