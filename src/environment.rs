use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::{Map, Value as JsonValue};

use crate::error::{ErrorKind, EvalError};
use crate::function::Function;
use crate::value::{in_range, Value};

/// What a declared name refers to.
#[derive(Debug, Clone)]
pub enum Symbol {
    Variable(Value),
    Function(Function),
}

/// Flat symbol table of variables and functions.
///
/// A name is declared at most once, as either kind. Evaluation only needs
/// `&Environment`, so a fully built environment can be shared between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    symbols: HashMap<String, Symbol>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    /// An environment with the default functions and constants installed.
    pub fn with_defaults() -> Result<Self, EvalError> {
        let mut environment = Self::new();
        crate::builtins::install(&mut environment)?;
        Ok(environment)
    }

    pub fn declare_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), EvalError> {
        let name = name.into();
        let value = value.into();
        if let Value::Number(number) = &value {
            if !in_range(number) {
                return Err(EvalError::out_of_range(name));
            }
        }
        tracing::debug!(%name, %value, "declaring variable");
        self.declare(name, Symbol::Variable(value))
    }

    pub fn set_function(&mut self, function: Function) -> Result<(), EvalError> {
        tracing::debug!(signature = %function.signature(), "declaring function");
        self.declare(function.name().to_string(), Symbol::Function(function))
    }

    fn declare(&mut self, name: String, symbol: Symbol) -> Result<(), EvalError> {
        if self.symbols.contains_key(&name) {
            return Err(EvalError::new(ErrorKind::AlreadyDeclared { name }));
        }
        self.symbols.insert(name, symbol);
        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        match self.symbols.get(name) {
            Some(Symbol::Variable(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        match self.symbols.get(name) {
            Some(Symbol::Function(function)) => Some(function),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn is_variable(&self, name: &str) -> bool {
        matches!(self.symbols.get(name), Some(Symbol::Variable(_)))
    }

    pub fn is_function(&self, name: &str) -> bool {
        matches!(self.symbols.get(name), Some(Symbol::Function(_)))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Variables sorted by name.
    pub fn variables(&self) -> Vec<(&str, &Value)> {
        let mut variables: Vec<_> = self
            .symbols
            .iter()
            .filter_map(|(name, symbol)| match symbol {
                Symbol::Variable(value) => Some((name.as_str(), value)),
                Symbol::Function(_) => None,
            })
            .collect();
        variables.sort_by(|a, b| a.0.cmp(b.0));
        variables
    }

    /// Functions sorted by name.
    pub fn functions(&self) -> Vec<&Function> {
        let mut functions: Vec<_> = self
            .symbols
            .values()
            .filter_map(|symbol| match symbol {
                Symbol::Function(function) => Some(function),
                Symbol::Variable(_) => None,
            })
            .collect();
        functions.sort_by(|a, b| a.name().cmp(b.name()));
        functions
    }

    /// Declares every entry of a JSON object as a variable.
    ///
    /// Numbers keep their textual digits, so `0.1` is exactly `0.1`. Nulls,
    /// arrays and objects have no `Value` counterpart.
    pub fn declare_json(&mut self, values: &Map<String, JsonValue>) -> Result<(), EvalError> {
        for (name, json) in values {
            let value = json_to_value(name, json)?;
            self.declare_variable(name.clone(), value)?;
        }
        Ok(())
    }
}

fn json_to_value(name: &str, json: &JsonValue) -> Result<Value, EvalError> {
    let unsupported = |found: &str| {
        EvalError::new(ErrorKind::UnknownDataType {
            name: name.to_string(),
            found: found.to_string(),
        })
    };
    match json {
        JsonValue::Number(n) => BigDecimal::from_str(&n.to_string())
            .map(Value::Number)
            .map_err(|_| unsupported("number")),
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Null => Err(unsupported("null")),
        JsonValue::Array(_) => Err(unsupported("array")),
        JsonValue::Object(_) => Err(unsupported("object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Arity;
    use crate::value::DataType;
    use serde_json::json;

    fn constant(name: &str) -> Function {
        Function::new(name, Arity::Exact(0), vec![], DataType::Number, |_| {
            Ok(Value::from(1))
        })
    }

    fn object(json: JsonValue) -> Map<String, JsonValue> {
        match json {
            JsonValue::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn names_resolve_by_kind() {
        let mut env = Environment::new();
        env.declare_variable("x", 3).unwrap();
        env.set_function(constant("one")).unwrap();

        assert_eq!(env.get_variable("x"), Some(&Value::from(3)));
        assert!(env.get_function("x").is_none());
        assert!(env.get_function("one").is_some());
        assert!(env.get_variable("one").is_none());

        assert!(env.is_variable("x") && !env.is_function("x"));
        assert!(env.is_function("one") && !env.is_variable("one"));
        assert!(env.is_declared("x") && env.is_declared("one"));
        assert!(!env.is_declared("y"));
    }

    #[test]
    fn redeclaration_fails_and_keeps_the_first_value() {
        let mut env = Environment::new();
        env.declare_variable("x", 1).unwrap();

        let err = env.declare_variable("x", 2).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::AlreadyDeclared {
                name: "x".to_string()
            }
        );
        assert_eq!(env.get_variable("x"), Some(&Value::from(1)));

        // across kinds too
        assert!(env.set_function(constant("x")).is_err());
        assert!(env.is_variable("x"));

        env.set_function(constant("f")).unwrap();
        assert!(env.declare_variable("f", true).is_err());
        assert!(env.is_function("f"));
    }

    #[test]
    fn out_of_range_numbers_are_not_declared() {
        let mut env = Environment::new();
        let huge = Value::parse_number("1e-100000000000").unwrap();
        let err = env.declare_variable("tiny", huge).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::NumberOutOfRange {
                operation: "tiny".to_string()
            }
        );
        assert!(!env.is_declared("tiny"));

        env.declare_variable("edge", Value::parse_number("1e100000").unwrap())
            .unwrap();
        assert!(env.is_variable("edge"));
    }

    #[test]
    fn listings_are_sorted() {
        let mut env = Environment::new();
        env.declare_variable("b", 2).unwrap();
        env.declare_variable("a", 1).unwrap();
        env.set_function(constant("z")).unwrap();
        env.set_function(constant("m")).unwrap();

        let names: Vec<&str> = env.variables().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["a", "b"]);
        let names: Vec<&str> = env.functions().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["m", "z"]);
    }

    #[test]
    fn json_scalars_become_values() {
        let mut env = Environment::new();
        env.declare_json(&object(json!({
            "rate": 0.1,
            "count": 42,
            "name": "widget",
            "active": true,
        })))
        .unwrap();

        assert_eq!(env.get_variable("rate"), Some(&Value::parse_number("0.1").unwrap()));
        assert_eq!(env.get_variable("count"), Some(&Value::from(42)));
        assert_eq!(env.get_variable("name"), Some(&Value::from("widget")));
        assert_eq!(env.get_variable("active"), Some(&Value::from(true)));
    }

    #[test]
    fn json_containers_and_null_are_rejected() {
        for (json, found) in [
            (json!({ "v": null }), "null"),
            (json!({ "v": [1, 2] }), "array"),
            (json!({ "v": { "w": 1 } }), "object"),
        ] {
            let err = Environment::new().declare_json(&object(json)).unwrap_err();
            assert_eq!(
                err.kind,
                ErrorKind::UnknownDataType {
                    name: "v".to_string(),
                    found: found.to_string(),
                }
            );
        }
    }

    #[test]
    fn json_declarations_respect_existing_names() {
        let mut env = Environment::new();
        env.declare_variable("x", 1).unwrap();
        let err = env.declare_json(&object(json!({ "x": 2 }))).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AlreadyDeclared { .. }));
    }

    #[test]
    fn environments_are_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Environment>();
    }
}
