use codeprep_core::{InferredType, Language, ScalarType, TestCase};

use regex::Regex;

use super::{line, CallPlan, HarnessSynthesizer};
use crate::starter::declares_solution_class;

// Escapes match `literal::quote`, so printed strings parse back unchanged.
const JSON_STRING: &[&str] = &[
    r#"static String jsonString(String s) {"#,
    r#"    StringBuilder q = new StringBuilder("\"");"#,
    r#"    for (char c : s.toCharArray()) {"#,
    r#"        switch (c) {"#,
    r#"            case '"': q.append("\\\""); break;"#,
    r#"            case '\\': q.append("\\\\"); break;"#,
    r#"            case '\n': q.append("\\n"); break;"#,
    r#"            case '\t': q.append("\\t"); break;"#,
    r#"            case '\r': q.append("\\r"); break;"#,
    r#"            default: q.append(c);"#,
    r#"        }"#,
    r#"    }"#,
    r#"    return q.append('"').toString();"#,
    r#"}"#,
];

pub struct JavaHarness;

impl HarnessSynthesizer for JavaHarness {
    fn language(&self) -> Language {
        Language::Java
    }

    fn synthesize(&self, source: &str, function_name: &str, case: &TestCase) -> String {
        let plan = CallPlan::new(case, Language::Java);

        let mut out = Vec::new();
        line(&mut out, 0, "import java.util.*;");
        line(&mut out, 0, "");
        // Bare methods become members of a stand-in Solution class.
        match declares_solution_class(source) {
            true => line(&mut out, 0, demote_public_solution(source.trim_end())),
            false => {
                line(&mut out, 0, "class Solution {");
                line(&mut out, 0, source.trim_end());
                line(&mut out, 0, "}");
            }
        }
        line(&mut out, 0, "");
        line(&mut out, 0, "public class Main {");
        if plan.result.element() == ScalarType::Str {
            for text in JSON_STRING {
                line(&mut out, 1, text);
            }
            line(&mut out, 0, "");
        }
        line(&mut out, 1, "public static void main(String[] args) {");
        for arg in &plan.arguments {
            line(&mut out, 2, format!("{} {} = {};", arg.declared, arg.name, arg.literal));
        }
        line(
            &mut out,
            2,
            format!(
                "{} result = new Solution().{}({});",
                plan.result_declared,
                function_name,
                plan.call_arguments()
            ),
        );
        line(&mut out, 2, "StringBuilder out = new StringBuilder();");
        print_result(&mut out, plan.result);
        line(&mut out, 2, "System.out.println(out);");
        line(&mut out, 1, "}");
        line(&mut out, 0, "}");

        let mut program = out.join("\n");
        program.push('\n');
        program
    }
}

fn print_result(out: &mut Vec<String>, ty: InferredType) {
    match ty {
        InferredType::Scalar(s) => line(out, 2, append("result", s)),
        InferredType::Array(s) => {
            line(out, 2, "out.append(\"[\");");
            line(out, 2, "for (int i = 0; i < result.length; i++) {");
            line(out, 3, "if (i > 0) out.append(\",\");");
            line(out, 3, append("result[i]", s));
            line(out, 2, "}");
            line(out, 2, "out.append(\"]\");");
        }
        InferredType::Array2d(s) => {
            line(out, 2, "out.append(\"[\");");
            line(out, 2, "for (int i = 0; i < result.length; i++) {");
            line(out, 3, "if (i > 0) out.append(\",\");");
            line(out, 3, "out.append(\"[\");");
            line(out, 3, "for (int j = 0; j < result[i].length; j++) {");
            line(out, 4, "if (j > 0) out.append(\",\");");
            line(out, 4, append("result[i][j]", s));
            line(out, 3, "}");
            line(out, 3, "out.append(\"]\");");
            line(out, 2, "}");
            line(out, 2, "out.append(\"]\");");
        }
    }
}

// Main is the file's only public class.
fn demote_public_solution(source: &str) -> String {
    Regex::new(r"\bpublic\s+((?:final\s+)?class\s+Solution\b)")
        .map(|re| re.replace_all(source, "$1").into_owned())
        .unwrap_or_else(|_| source.to_string())
}

fn append(expr: &str, scalar: ScalarType) -> String {
    match scalar {
        ScalarType::Str => format!("out.append(jsonString({}));", expr),
        _ => format!("out.append({});", expr),
    }
}
