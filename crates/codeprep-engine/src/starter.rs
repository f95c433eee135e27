use regex::Regex;

const FUNCTION_PATTERN: &str = r"function\s+([A-Za-z_$][\w$]*)\s*\(|(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)";

/// Name of the callable declared by a JavaScript starter. Only the name is
/// read; the parameter list is not parsed.
pub fn extract_function_name(starter: &str) -> Option<String> {
    let re = Regex::new(FUNCTION_PATTERN).ok()?;
    re.captures(starter)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
}

/// Whether a submission wraps its code in `class Solution`.
pub fn declares_solution_class(source: &str) -> bool {
    Regex::new(r"\bclass\s+Solution\b")
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}
