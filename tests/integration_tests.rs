// Parser robustness tests
//
// Table-driven suites over `dexpr::parse`: every input either parses or
// fails with a reported error, never a panic.

use dexpr::{EvalError, Expr};

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());

        if self.crashed > 0 {
            println!("\n⚠️  WARNING: {} tests caused crashes!", self.crashed);
        }

        if self.failed > 0 {
            println!("\n❌ {} tests had unexpected results.", self.failed);
        }

        if self.crashed == 0 && self.failed == 0 {
            println!("\n✅ All tests passed!");
        }
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    // Catch any panics to detect crashes
    let result = std::panic::catch_unwind(|| {
        parse_input(&test.input)
    });

    match result {
        Ok(parse_result) => {
            match (parse_result, test.should_succeed) {
                (Ok(_), true) => TestResult::Pass,
                (Ok(_), false) => TestResult::Fail("Expected parsing to fail, but it succeeded".to_string()),
                (Err(error), false) => {
                    // Check if error contains expected text
                    if let Some(expected) = &test.expected_error_contains {
                        let message = error.to_string();
                        if message.contains(expected) {
                            TestResult::Pass
                        } else {
                            TestResult::Fail(format!(
                                "Error message '{}' doesn't contain expected text '{}'",
                                message, expected
                            ))
                        }
                    } else {
                        TestResult::Pass // Any error is acceptable
                    }
                }
                (Err(error), true) => TestResult::Fail(format!("Expected parsing to succeed, but got error: {}", error)),
            }
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Parse input and return result
fn parse_input(input: &str) -> Result<Expr, EvalError> {
    dexpr::parse(input)
}

/// Test case builder for convenience
impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_malformed_expressions_tests() -> TestSuite {
    let mut suite = TestSuite::new("Malformed Expressions");

    // === PARENTHESES TESTS ===

    // Unmatched opening parentheses
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        "expected ')' after expression but found EOF",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_nested",
        "((1 + 2)",
        "expected ')' after expression",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_complex",
        "(1 + (2 * 3)",
        "expected ')' after expression",
    ));

    // Unmatched closing parentheses
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        "unexpected ')' after expression",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren_multiple",
        "1 + 2))",
        "unexpected ')' after expression",
    ));

    // Empty parentheses
    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "()",
        "expected expression but found ')'",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses_in_expression",
        "1 + ()",
        "expected expression but found ')'",
    ));

    // === TERNARY TESTS ===

    suite.add_test(TestCase::should_fail_with_message(
        "ternary_missing_colon",
        "true ? 1",
        "expected ':' in ternary expression but found EOF",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "ternary_missing_else_branch",
        "true ? 1 :",
        "expected expression but found EOF",
    ));

    suite.add_test(TestCase::should_fail(
        "ternary_missing_condition",
        "? 1 : 2",
    ));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    // Empty input
    suite.add_test(TestCase::should_fail_with_message(
        "empty_input",
        "",
        "expected expression but found EOF",
    ));

    // Only whitespace
    suite.add_test(TestCase::should_fail("only_whitespace", "   \n\t  "));

    // EOF conditions
    suite.add_test(TestCase::should_fail("unexpected_eof_after_operator", "1 +"));
    suite.add_test(TestCase::should_fail("unexpected_eof_in_expression", "1 + ("));

    // Very deeply nested expressions
    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    suite.add_test(TestCase::should_succeed("deeply_nested_parens", &deep_parens));

    let deep_ternary = "true ? ".repeat(50) + "1" + &" : 2".repeat(50);
    suite.add_test(TestCase::should_succeed("deeply_nested_ternary", &deep_ternary));

    // Surrounding whitespace is skipped
    suite.add_test(TestCase::should_succeed("padded_input", "  \t1 + 2\n"));

    suite
}

fn create_operator_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operator Tests");

    // Missing operands
    suite.add_test(TestCase::should_succeed("unary_plus", "+ 1"));
    suite.add_test(TestCase::should_fail("missing_right_operand", "1 +"));
    suite.add_test(TestCase::should_fail("missing_both_operands", "+"));
    suite.add_test(TestCase::should_fail("missing_left_operand", "* 1"));

    // Prefix operators stack
    suite.add_test(TestCase::should_succeed("double_plus", "1 ++ 2")); // 1 + (+2)
    suite.add_test(TestCase::should_succeed("double_minus", "1 -- 2")); // 1 - (-2)
    suite.add_test(TestCase::should_succeed("mixed_operators", "1 +- 2")); // 1 + (-2)
    suite.add_test(TestCase::should_succeed("double_not", "!!true"));

    // Comparison operators
    suite.add_test(TestCase::should_succeed("comparison_equal", "1 == 2"));
    suite.add_test(TestCase::should_succeed("comparison_not_equal", "1 != 2"));
    suite.add_test(TestCase::should_succeed("comparison_less", "1 < 2"));
    suite.add_test(TestCase::should_succeed("comparison_less_equal", "1 <= 2"));
    suite.add_test(TestCase::should_succeed("comparison_greater", "1 > 2"));
    suite.add_test(TestCase::should_succeed("comparison_greater_equal", "1 >= 2"));
    suite.add_test(TestCase::should_succeed("chained_comparison", "1 < 2 == true"));

    // Compound operators need both characters
    suite.add_test(TestCase::should_fail_with_message(
        "single_equals",
        "1 = 2",
        "incomplete operator '='",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "single_ampersand",
        "a & b",
        "incomplete operator '&'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "single_pipe",
        "a | b",
        "incomplete operator '|'",
    ));

    // Word operators are not part of the language
    suite.add_test(TestCase::should_fail_with_message(
        "word_and",
        "true and false",
        "unexpected 'and' after expression",
    ));

    suite
}

fn create_literal_tests() -> TestSuite {
    let mut suite = TestSuite::new("Literal Tests");

    // Valid literals
    suite.add_test(TestCase::should_succeed("integer_literal", "42"));
    suite.add_test(TestCase::should_succeed("decimal_literal", "3.14"));
    suite.add_test(TestCase::should_succeed("exponent_literal", "2.5E-3"));
    suite.add_test(TestCase::should_succeed("signed_exponent_literal", "1e+5"));
    suite.add_test(TestCase::should_succeed("double_quoted_string", "\"hello\""));
    suite.add_test(TestCase::should_succeed("single_quoted_string", "'hello'"));
    suite.add_test(TestCase::should_succeed("string_with_other_quote", "'say \"hi\"'"));
    suite.add_test(TestCase::should_succeed("boolean_true", "true"));
    suite.add_test(TestCase::should_succeed("boolean_false", "false"));
    suite.add_test(TestCase::should_succeed("dotted_identifier", "order.total"));

    // Invalid number formats
    suite.add_test(TestCase::should_fail("multiple_dots", "3.14.159"));
    suite.add_test(TestCase::should_fail_with_message("trailing_dot", "42.", "malformed number '42.'"));
    suite.add_test(TestCase::should_fail_with_message("leading_dot", ".42", "unexpected character '.'"));
    suite.add_test(TestCase::should_fail_with_message("bare_exponent", "1e", "malformed number '1e'"));

    // Unterminated strings
    suite.add_test(TestCase::should_fail_with_message(
        "unterminated_string",
        "\"hello",
        "unterminated string",
    ));
    suite.add_test(TestCase::should_fail("unterminated_mixed_quotes", "'hello\""));

    // Stray characters
    suite.add_test(TestCase::should_fail_with_message("stray_character", "1 @ 2", "unexpected character '@'"));

    suite
}

fn create_function_call_tests() -> TestSuite {
    let mut suite = TestSuite::new("Function Call Tests");

    // Valid function calls
    suite.add_test(TestCase::should_succeed("simple_function_call", "foo()"));
    suite.add_test(TestCase::should_succeed("function_call_with_args", "foo(1, 2, 3)"));
    suite.add_test(TestCase::should_succeed("nested_calls", "f(g(1), h())"));
    suite.add_test(TestCase::should_succeed("expression_arguments", "max(1 + 2, a ? b : c)"));

    // Invalid function calls
    suite.add_test(TestCase::should_fail_with_message(
        "missing_closing_paren",
        "foo(1, 2",
        "expected ')' after arguments but found EOF",
    ));
    suite.add_test(TestCase::should_fail("missing_opening_paren", "foo 1, 2)"));
    suite.add_test(TestCase::should_fail("trailing_comma", "foo(1, 2,)"));
    suite.add_test(TestCase::should_fail("leading_comma", "foo(, 1)"));

    // Only a bare name is callable
    suite.add_test(TestCase::should_fail_with_message(
        "call_on_group",
        "(foo)(1)",
        "unexpected '(' after expression",
    ));
    suite.add_test(TestCase::should_fail("call_on_literal", "1(2)"));

    suite
}

fn create_mixed_construct_tests() -> TestSuite {
    let mut suite = TestSuite::new("Mixed Construct Tests");

    // Complex valid expressions
    suite.add_test(TestCase::should_succeed(
        "complex_expression",
        "(1 + 2) * 3 + foo(4, 5) ^ 2 % 7",
    ));
    suite.add_test(TestCase::should_succeed(
        "formula",
        "PI * R ^ 2 + abs(x) >= 10 && name != '' ? 'big' : 'small'",
    ));

    // Complex invalid expressions
    suite.add_test(TestCase::should_fail(
        "mismatched_nesting",
        "foo(1 + (2 * 3)",
    ));

    suite
}

fn create_positive_tests() -> TestSuite {
    let mut suite = TestSuite::new("Positive Tests");

    // These tests verify that valid syntax still parses correctly
    suite.add_test(TestCase::should_succeed("simple_arithmetic", "1 + 2 * 3"));
    suite.add_test(TestCase::should_succeed("parentheses", "(1 + 2) * 3"));
    suite.add_test(TestCase::should_succeed("variable", "x"));
    suite.add_test(TestCase::should_succeed("string_concatenation", "\"hello\" + \" world\""));
    suite.add_test(TestCase::should_succeed("boolean_operations", "true && false || !x"));
    suite.add_test(TestCase::should_succeed("comparison", "1 < 2"));
    suite.add_test(TestCase::should_succeed("power_chain", "2 ^ 3 ^ 2"));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    println!("🧪 dexpr Parser Robustness Test Suite");
    println!("=====================================\n");

    let mut all_passed = true;

    // Run each test suite
    let suites = vec![
        create_malformed_expressions_tests(),
        create_edge_case_tests(),
        create_operator_tests(),
        create_literal_tests(),
        create_function_call_tests(),
        create_mixed_construct_tests(),
        create_positive_tests(),
    ];

    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            all_passed = false;
        }
    }

    assert!(all_passed, "some parser robustness cases failed, see output above");
}
