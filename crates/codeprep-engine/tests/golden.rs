use codeprep_core::TestCase;
use codeprep_engine::{compare, CppHarness, HarnessSynthesizer, JavaHarness};

fn two_sum_case() -> TestCase {
    TestCase {
        input: serde_json::from_str("[[2,7,11,15],9]").unwrap(),
        expected: serde_json::from_str("[0,1]").unwrap(),
    }
}

#[test]
fn cpp_two_sum_harness_matches_golden() {
    let program = CppHarness.synthesize(
        include_str!("golden/two_sum_solution.cpp"),
        "twoSum",
        &two_sum_case(),
    );
    assert_eq!(program, include_str!("golden/two_sum_harness.cpp"));
}

#[test]
fn java_two_sum_harness_matches_golden() {
    let program = JavaHarness.synthesize(
        include_str!("golden/two_sum_solution.java"),
        "twoSum",
        &two_sum_case(),
    );
    assert_eq!(program, include_str!("golden/two_sum_harness.java"));
}

/// A result shape whose printed form the comparator has to read back.
struct PrinterCase {
    name: &'static str,
    function: &'static str,
    input: &'static str,
    expected: &'static str,
    /// What both generated programs write to stdout.
    stdout: &'static str,
    cpp_source: &'static str,
    cpp_harness: &'static str,
    java_source: &'static str,
    java_harness: &'static str,
}

macro_rules! printer_case {
    ($name:literal, $function:literal, $input:literal, $expected:literal, $stdout:literal) => {
        PrinterCase {
            name: $name,
            function: $function,
            input: $input,
            expected: $expected,
            stdout: $stdout,
            cpp_source: include_str!(concat!("golden/", $name, "_solution.cpp")),
            cpp_harness: include_str!(concat!("golden/", $name, "_harness.cpp")),
            java_source: include_str!(concat!("golden/", $name, "_solution.java")),
            java_harness: include_str!(concat!("golden/", $name, "_harness.java")),
        }
    };
}

fn printer_cases() -> Vec<PrinterCase> {
    vec![
        printer_case!("average", "average", "[[1,2]]", "1.5", "1.5\n"),
        printer_case!(
            "group_anagrams",
            "groupAnagrams",
            r#"[["eat","tea","tan"]]"#,
            r#"[["eat","tea"],["tan"]]"#,
            "[[\"eat\",\"tea\"],[\"tan\"]]\n"
        ),
        printer_case!(
            "invert_grid",
            "invertGrid",
            "[[[1,0],[0,1]]]",
            "[[false,true],[true,false]]",
            "[[false,true],[true,false]]\n"
        ),
        printer_case!("empty_two_sum", "twoSum", "[[],5]", "[]", "[]\n"),
        printer_case!(
            "echo_quoted",
            "echo",
            r#"["a\"b\\c"]"#,
            r#""a\"b\\c""#,
            "\"a\\\"b\\\\c\"\n"
        ),
    ]
}

#[test]
fn printer_shapes_match_golden() {
    for case in printer_cases() {
        let test_case = TestCase {
            input: serde_json::from_str(case.input).unwrap(),
            expected: serde_json::from_str(case.expected).unwrap(),
        };
        let cpp = CppHarness.synthesize(case.cpp_source, case.function, &test_case);
        assert_eq!(cpp, case.cpp_harness, "{} (cpp)", case.name);
        let java = JavaHarness.synthesize(case.java_source, case.function, &test_case);
        assert_eq!(java, case.java_harness, "{} (java)", case.name);
    }
}

#[test]
fn printed_results_compare_equal_to_expected() {
    for case in printer_cases() {
        let expected = serde_json::from_str(case.expected).unwrap();
        let comparison = compare(case.stdout, &expected);
        assert!(comparison.passed, "{}: {:?}", case.name, comparison.actual);
        assert_eq!(comparison.actual, expected, "{}", case.name);
    }
}

#[test]
fn harness_embeds_every_input_and_reads_no_stdin() {
    let case = TestCase {
        input: serde_json::from_str(r#"[[[1,2],[3]], ["x","y"], 2.5, false]"#).unwrap(),
        expected: serde_json::from_str("true").unwrap(),
    };
    for program in [
        CppHarness.synthesize("", "f", &case),
        JavaHarness.synthesize("", "f", &case),
    ] {
        assert!(!program.contains("cin"));
        assert!(!program.contains("Scanner"));
        assert!(program.contains("{{1,2},{3}}"));
        assert!(program.contains("\"x\",\"y\""));
        assert!(program.contains("= 2.5;"));
        assert!(program.contains("= false;"));
    }
}
