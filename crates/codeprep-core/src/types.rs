use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    #[serde(rename = "string")]
    Str,
}

impl ScalarType {
    pub fn label(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Str => "string",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }
}

/// Static type assigned to a test value. Every generator declares
/// parameters and results from this tag alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", content = "element", rename_all = "snake_case")]
pub enum InferredType {
    Scalar(ScalarType),
    Array(ScalarType),
    Array2d(ScalarType),
}

impl InferredType {
    /// Classifies a value. Total and pure: the same value always yields the
    /// same tag, so literal formatting and declarations agree.
    ///
    /// Arrays take their element type from the first element, widened to
    /// float when any numeric element is fractional or too large for an
    /// int. An empty array is `array<int>`.
    pub fn infer(value: &Value) -> InferredType {
        match value {
            Value::Array(items) => match items.first() {
                Some(Value::Array(_)) => {
                    let cells: Vec<&Value> = items
                        .iter()
                        .filter_map(Value::as_array)
                        .flatten()
                        .collect();
                    InferredType::Array2d(element_type(&cells))
                }
                _ => InferredType::Array(element_type(&items.iter().collect::<Vec<_>>())),
            },
            scalar => InferredType::Scalar(scalar_type(scalar).unwrap_or(ScalarType::Int)),
        }
    }

    /// Validates the value against the grammar, then infers. Rejects
    /// nesting beyond two levels, arrays whose elements disagree and
    /// integers that a declared `int` cannot hold.
    pub fn check(value: &Value) -> Result<InferredType, SchemaError> {
        let ty = InferredType::infer(value);
        match (value, ty) {
            (Value::Array(items), InferredType::Array(element)) => {
                check_elements(items.iter().enumerate(), element)?;
            }
            (Value::Array(rows), InferredType::Array2d(element)) => {
                for (position, row) in rows.iter().enumerate() {
                    let cells = match row {
                        Value::Array(cells) => cells,
                        other => {
                            return Err(SchemaError::MixedArray {
                                expected: "array".to_string(),
                                found: other.kind().to_string(),
                                position,
                            })
                        }
                    };
                    if cells.iter().any(|c| matches!(c, Value::Array(_))) {
                        return Err(SchemaError::TooDeep);
                    }
                    check_elements(cells.iter().enumerate(), element)?;
                }
            }
            (scalar, _) => check_range(scalar)?,
        }
        Ok(ty)
    }

    pub fn element(&self) -> ScalarType {
        match self {
            InferredType::Scalar(s) | InferredType::Array(s) | InferredType::Array2d(s) => *s,
        }
    }

    pub fn is_array(&self) -> bool {
        !matches!(self, InferredType::Scalar(_))
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Scalar(s) => write!(f, "{}", s.label()),
            InferredType::Array(s) => write!(f, "array<{}>", s.label()),
            InferredType::Array2d(s) => write!(f, "array<array<{}>>", s.label()),
        }
    }
}

fn scalar_type(value: &Value) -> Option<ScalarType> {
    match value {
        Value::Bool(_) => Some(ScalarType::Bool),
        Value::Int(_) => Some(ScalarType::Int),
        Value::Float(f) if f.fract() == 0.0 && fits_int(*f) => Some(ScalarType::Int),
        Value::Float(_) => Some(ScalarType::Float),
        Value::Str(_) => Some(ScalarType::Str),
        Value::Array(_) => None,
    }
}

// Whole floats beyond the int range stay float so their literal is a double.
fn fits_int(f: f64) -> bool {
    f >= i32::MIN as f64 && f <= i32::MAX as f64
}

fn check_range(value: &Value) -> Result<(), SchemaError> {
    match value {
        Value::Int(n) if i32::try_from(*n).is_err() => Err(SchemaError::IntegerRange(*n)),
        _ => Ok(()),
    }
}

fn element_type(items: &[&Value]) -> ScalarType {
    let first = match items.first().and_then(|v| scalar_type(v)) {
        Some(t) => t,
        None => return ScalarType::Int,
    };
    let fractional = items
        .iter()
        .any(|v| scalar_type(v) == Some(ScalarType::Float));
    match first {
        ScalarType::Int if fractional => ScalarType::Float,
        other => other,
    }
}

fn check_elements<'a>(
    items: impl Iterator<Item = (usize, &'a Value)>,
    element: ScalarType,
) -> Result<(), SchemaError> {
    for (position, item) in items {
        let found = match item {
            Value::Array(_) => return Err(SchemaError::TooDeep),
            v => scalar_type(v).unwrap_or(ScalarType::Int),
        };
        check_range(item)?;
        let compatible = found == element || (found.is_numeric() && element.is_numeric());
        if !compatible {
            return Err(SchemaError::MixedArray {
                expected: element.label().to_string(),
                found: found.label().to_string(),
                position,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use InferredType::*;
    use ScalarType::*;

    fn json(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(InferredType::infer(&json("true")), Scalar(Bool));
        assert_eq!(InferredType::infer(&json("7")), Scalar(Int));
        assert_eq!(InferredType::infer(&json("3.0")), Scalar(Int));
        assert_eq!(InferredType::infer(&json("3.5")), Scalar(Float));
        assert_eq!(InferredType::infer(&json("\"hi\"")), Scalar(Str));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(InferredType::infer(&json("[1,2]")), Array(Int));
        assert_eq!(InferredType::infer(&json("[1,2.5]")), Array(Float));
        assert_eq!(InferredType::infer(&json("[\"a\"]")), Array(Str));
        assert_eq!(InferredType::infer(&json("[[1],[2,3]]")), Array2d(Int));
        assert_eq!(InferredType::infer(&json("[[],[\"x\"]]")), Array2d(Str));
    }

    #[test]
    fn test_empty_arrays_default_to_int() {
        assert_eq!(InferredType::infer(&json("[]")), Array(Int));
        assert_eq!(InferredType::infer(&json("[[],[]]")), Array2d(Int));
    }

    #[test]
    fn test_inference_is_deterministic() {
        let v = json("[[1.5,2],[3]]");
        assert_eq!(InferredType::infer(&v), InferredType::infer(&v.clone()));
        assert_eq!(InferredType::infer(&v), Array2d(Float));
    }

    #[test]
    fn test_check_rejects_mixed_and_deep() {
        assert!(matches!(
            InferredType::check(&json("[1,\"a\"]")),
            Err(SchemaError::MixedArray { position: 1, .. })
        ));
        assert_eq!(InferredType::check(&json("[[[1]]]")), Err(SchemaError::TooDeep));
        assert!(InferredType::check(&json("[[1],2]")).is_err());
        assert_eq!(InferredType::check(&json("[1,2.5,3]")), Ok(Array(Float)));
    }

    #[test]
    fn test_check_rejects_integers_beyond_int() {
        assert_eq!(
            InferredType::check(&json("3000000000")),
            Err(SchemaError::IntegerRange(3_000_000_000))
        );
        assert_eq!(
            InferredType::check(&json("[[3000000000,1]]")),
            Err(SchemaError::IntegerRange(3_000_000_000))
        );
        assert_eq!(InferredType::check(&json("-2147483648")), Ok(Scalar(Int)));
        assert_eq!(InferredType::check(&json("[2147483647]")), Ok(Array(Int)));
    }

    #[test]
    fn test_large_whole_float_stays_float() {
        assert_eq!(InferredType::infer(&json("3000000000.0")), Scalar(Float));
        assert_eq!(InferredType::infer(&json("[1,3000000000.0]")), Array(Float));
        assert_eq!(InferredType::check(&json("3000000000.0")), Ok(Scalar(Float)));
    }
}
