use crate::environment::Environment;

/// Evaluates `source` once, printing the value or a rendered diagnostic.
/// Returns whether evaluation succeeded.
pub fn run(source: &str, environment: &Environment, filename: Option<&str>) -> bool {
    // A trailing newline from a file is not part of the expression.
    let source = source.trim_end();
    match crate::evaluate(source, environment) {
        Ok(value) => {
            println!("{}", value);
            true
        }
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}
