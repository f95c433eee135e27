use codeprep_core::{InferredType, Language, ScalarType, TestCase};

use super::{line, CallPlan, HarnessSynthesizer};
use crate::starter::declares_solution_class;

const INCLUDES: &[&str] = &[
    "algorithm",
    "climits",
    "cmath",
    "iomanip",
    "iostream",
    "map",
    "queue",
    "set",
    "stack",
    "string",
    "unordered_map",
    "unordered_set",
    "vector",
];

// Escapes match `literal::quote`, so printed strings parse back unchanged.
const JSON_STRING: &[&str] = &[
    r#"string json_string(const string& s) {"#,
    r#"    string out = "\"";"#,
    r#"    for (char c : s) {"#,
    r#"        switch (c) {"#,
    r#"            case '"': out += "\\\""; break;"#,
    r#"            case '\\': out += "\\\\"; break;"#,
    r#"            case '\n': out += "\\n"; break;"#,
    r#"            case '\t': out += "\\t"; break;"#,
    r#"            case '\r': out += "\\r"; break;"#,
    r#"            default: out += c;"#,
    r#"        }"#,
    r#"    }"#,
    r#"    return out + "\"";"#,
    r#"}"#,
];

pub struct CppHarness;

impl HarnessSynthesizer for CppHarness {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn synthesize(&self, source: &str, function_name: &str, case: &TestCase) -> String {
        let plan = CallPlan::new(case, Language::Cpp);
        let callee = match declares_solution_class(source) {
            true => format!("Solution().{}", function_name),
            false => function_name.to_string(),
        };

        let mut out = Vec::new();
        for header in INCLUDES {
            line(&mut out, 0, format!("#include <{}>", header));
        }
        line(&mut out, 0, "");
        line(&mut out, 0, "using namespace std;");
        line(&mut out, 0, "");
        line(&mut out, 0, source.trim_end());
        line(&mut out, 0, "");
        if plan.result.element() == ScalarType::Str {
            for text in JSON_STRING {
                line(&mut out, 0, text);
            }
            line(&mut out, 0, "");
        }
        line(&mut out, 0, "int main() {");
        for arg in &plan.arguments {
            line(&mut out, 1, format!("{} {} = {};", arg.declared, arg.name, arg.literal));
        }
        line(
            &mut out,
            1,
            format!(
                "{} result = {}({});",
                plan.result_declared,
                callee,
                plan.call_arguments()
            ),
        );
        print_result(&mut out, plan.result);
        line(&mut out, 1, "return 0;");
        line(&mut out, 0, "}");

        let mut program = out.join("\n");
        program.push('\n');
        program
    }
}

fn print_result(out: &mut Vec<String>, ty: InferredType) {
    match ty {
        InferredType::Scalar(s) => {
            line(out, 1, format!("cout << {} << endl;", element("result", s)));
        }
        InferredType::Array(s) => {
            line(out, 1, "cout << \"[\";");
            line(out, 1, "for (size_t i = 0; i < result.size(); ++i) {");
            line(out, 2, "if (i > 0) cout << \",\";");
            line(out, 2, format!("cout << {};", element("result[i]", s)));
            line(out, 1, "}");
            line(out, 1, "cout << \"]\" << endl;");
        }
        InferredType::Array2d(s) => {
            line(out, 1, "cout << \"[\";");
            line(out, 1, "for (size_t i = 0; i < result.size(); ++i) {");
            line(out, 2, "if (i > 0) cout << \",\";");
            line(out, 2, "cout << \"[\";");
            line(out, 2, "for (size_t j = 0; j < result[i].size(); ++j) {");
            line(out, 3, "if (j > 0) cout << \",\";");
            line(out, 3, format!("cout << {};", element("result[i][j]", s)));
            line(out, 2, "}");
            line(out, 2, "cout << \"]\";");
            line(out, 1, "}");
            line(out, 1, "cout << \"]\" << endl;");
        }
    }
}

/// Stream operand printing one scalar canonically.
fn element(expr: &str, scalar: ScalarType) -> String {
    match scalar {
        ScalarType::Bool => format!("({} ? \"true\" : \"false\")", expr),
        ScalarType::Int => expr.to_string(),
        ScalarType::Float => format!("setprecision(17) << {}", expr),
        ScalarType::Str => format!("json_string({})", expr),
    }
}
