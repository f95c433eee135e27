use codeprep_core::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub passed: bool,
    pub actual: Value,
}

/// Reads harness output back into a value. Anything that is not in the
/// canonical grammar is taken as the raw trimmed text.
pub fn parse_output(raw: &str) -> Value {
    let trimmed = raw.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|json| Value::try_from(json).ok())
        .unwrap_or_else(|| Value::Str(trimmed.to_string()))
}

/// Deep structural equality. Numbers compare by value, so `3` equals
/// `3.0`; a number never equals a string.
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

pub fn compare(raw_stdout: &str, expected: &Value) -> Comparison {
    let actual = parse_output(raw_stdout);
    Comparison {
        passed: values_equal(&actual, expected),
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn test_canonical_array_output() {
        let c = compare("[0,1]\n", &json("[0,1]"));
        assert!(c.passed);
        assert_eq!(c.actual, json("[0,1]"));
    }

    #[test]
    fn test_numeric_canonicalization() {
        assert!(compare("3", &json("3.0")).passed);
        assert!(compare("3.0", &json("3")).passed);
        assert!(compare("[1,2.5]", &json("[1.0,2.5]")).passed);
        assert!(!compare("3", &json("\"3\"")).passed);
        assert!(!compare("\"3\"", &json("3")).passed);
    }

    #[test]
    fn test_unparseable_output_is_raw_string() {
        let c = compare("  hello world \n", &json("\"hello world\""));
        assert!(c.passed);
        assert_eq!(c.actual, Value::Str("hello world".into()));
        assert_eq!(parse_output("[1,2"), Value::Str("[1,2".into()));
    }

    #[test]
    fn test_empty_arrays_equal() {
        assert!(compare("[]", &json("[]")).passed);
        assert!(!compare("[]", &json("[[]]")).passed);
    }

    #[test]
    fn test_nested_and_lengths() {
        assert!(compare("[[1,2],[3]]", &json("[[1,2],[3]]")).passed);
        assert!(!compare("[[1,2],[3]]", &json("[[1,2],[3,4]]")).passed);
        assert!(!compare("[true]", &json("[1]")).passed);
    }

    #[test]
    fn test_printed_canonical_form_round_trips() {
        for text in [r#"[[1,2],[]]"#, r#"["a","b c"]"#, "true", "2.5", "-7", "[]"] {
            let v = json(text);
            assert!(values_equal(&parse_output(&v.to_string()), &v), "{}", text);
        }
    }
}
