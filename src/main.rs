use std::fs;
use std::path::Path;
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use dexpr::{Environment, EvalError, Value};

fn main() {
    let matches = Command::new("dexpr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Evaluate expressions with exact decimal arithmetic")
        .arg(
            Arg::new("expression")
                .help("The expression to evaluate")
                .value_name("EXPRESSION")
                .index(1)
                .conflicts_with("file"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .help("Read the expression from a file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .help("Declare a variable; VALUE is a number, true/false, or text")
                .value_name("NAME=VALUE")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("vars-json")
                .long("vars-json")
                .help("Declare variables from a JSON object file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("no-defaults")
                .long("no-defaults")
                .help("Start without the default functions and constants")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging();

    let environment = match build_environment(&matches) {
        Ok(environment) => environment,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    let mut succeeded = true;
    let mut evaluated = false;
    if let Some(expression) = matches.get_one::<String>("expression") {
        succeeded = dexpr::run(expression, &environment, None);
        evaluated = true;
    } else if let Some(file_path) = matches.get_one::<String>("file") {
        succeeded = run_file(file_path, &environment);
        evaluated = true;
    }

    if matches.get_flag("interactive") || !evaluated {
        dexpr::start_repl(environment);
    } else if !succeeded {
        process::exit(1);
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG controls the level, warn by default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_environment(matches: &ArgMatches) -> Result<Environment, String> {
    let mut environment = if matches.get_flag("no-defaults") {
        Environment::new()
    } else {
        Environment::with_defaults().map_err(|e| e.to_string())?
    };

    if let Some(path) = matches.get_one::<String>("vars-json") {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("reading '{}': {}", path, e))?;
        let variables: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| format!("'{}' is not a JSON object: {}", path, e))?;
        environment
            .declare_json(&variables)
            .map_err(|e| format!("'{}': {}", path, e))?;
    }

    for assignment in matches.get_many::<String>("var").into_iter().flatten() {
        declare_assignment(&mut environment, assignment)?;
    }

    Ok(environment)
}

/// Declares `NAME=VALUE`, reading VALUE as a number, then a boolean, then
/// text.
fn declare_assignment(environment: &mut Environment, assignment: &str) -> Result<(), String> {
    let (name, raw) = assignment
        .split_once('=')
        .ok_or_else(|| format!("--var expects NAME=VALUE, got '{}'", assignment))?;
    let value = Value::parse_number(raw).unwrap_or_else(|| match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        text => Value::Text(text.to_string()),
    });
    environment
        .declare_variable(name.trim(), value)
        .map_err(|e: EvalError| format!("--var {}: {}", name.trim(), e))
}

fn run_file(path: &str, environment: &Environment) -> bool {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            dexpr::run(&source, environment, Some(&filename))
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
