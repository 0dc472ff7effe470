use std::io::{self, Write};

use crate::environment::Environment;
use crate::error::EvalError;

/// A line of REPL input.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Exit,
    Help,
    Vars,
    Funcs,
    /// `:let NAME = EXPR`
    Let { name: &'a str, expression: &'a str },
    /// `:ast EXPR`
    Ast(&'a str),
    Evaluate(&'a str),
}

const HELP: &str = "\
Commands:
  EXPR                 evaluate an expression
  :let NAME = EXPR     evaluate EXPR and declare it as NAME
  :ast EXPR            show the parsed tree of EXPR
  :vars                list declared variables
  :funcs               list declared functions
  :help                show this message
  exit, quit           leave the REPL";

/// Runs an interactive session over `environment`, which persists between
/// lines so `:let` declarations stay visible.
pub fn start(mut environment: Environment) {
    println!("dexpr v{}", env!("CARGO_PKG_VERSION"));
    println!("Type ':help' for commands, 'exit' or Ctrl+D to quit");
    println!();

    loop {
        print!("> ");
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_command(line) {
                    Ok(command) => {
                        if !execute(command, &mut environment) {
                            break;
                        }
                    }
                    Err(message) => eprintln!("{}", message),
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn parse_command(line: &str) -> Result<Command<'_>, String> {
    if line == "exit" || line == "quit" {
        return Ok(Command::Exit);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Evaluate(line));
    };

    let (keyword, argument) = match rest.split_once(char::is_whitespace) {
        Some((keyword, argument)) => (keyword, argument.trim()),
        None => (rest, ""),
    };
    match keyword {
        "help" => Ok(Command::Help),
        "vars" => Ok(Command::Vars),
        "funcs" => Ok(Command::Funcs),
        "ast" if !argument.is_empty() => Ok(Command::Ast(argument)),
        "ast" => Err("usage: :ast EXPR".to_string()),
        "let" => {
            let (name, expression) = argument
                .split_once('=')
                .map(|(name, expression)| (name.trim(), expression.trim()))
                .ok_or_else(|| "usage: :let NAME = EXPR".to_string())?;
            if !is_identifier(name) {
                return Err(format!("'{}' is not a valid name", name));
            }
            if expression.is_empty() {
                return Err("usage: :let NAME = EXPR".to_string());
            }
            Ok(Command::Let { name, expression })
        }
        other => Err(format!("unknown command ':{}', try ':help'", other)),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Runs one command, returning `false` once the session should end.
fn execute(command: Command<'_>, environment: &mut Environment) -> bool {
    match command {
        Command::Exit => {
            println!("Goodbye!");
            return false;
        }
        Command::Help => println!("{}", HELP),
        Command::Vars => {
            for (name, value) in environment.variables() {
                println!("{} = {}", name, value);
            }
        }
        Command::Funcs => {
            for function in environment.functions() {
                println!("{}", function.signature());
            }
        }
        Command::Ast(source) => match crate::parse(source) {
            Ok(expr) => println!("{}", expr),
            Err(error) => error.report(source, None),
        },
        Command::Evaluate(source) => match crate::evaluate(source, environment) {
            Ok(value) => println!("{}", value),
            Err(error) => error.report(source, None),
        },
        Command::Let { name, expression } => {
            if let Err(error) = declare(name, expression, environment) {
                error.report(expression, None);
            }
        }
    }
    true
}

fn declare(name: &str, expression: &str, environment: &mut Environment) -> Result<(), EvalError> {
    let value = crate::evaluate(expression, environment)?;
    environment.declare_variable(name, value.clone())?;
    println!("{} = {}", name, value);
    Ok(())
}
