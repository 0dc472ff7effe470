use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, EvalError};
use crate::value::{DataType, Value};

/// Native implementation of a function.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync;

/// Extra argument check run after arity and types are validated.
pub type ArgVerifier = dyn Fn(&[Value]) -> Result<(), EvalError> + Send + Sync;

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// At least `min`, and at most `max` when bounded.
    Variadic { min: usize, max: Option<usize> },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => *n == count,
            Arity::Variadic { min, max } => {
                if count < *min {
                    return false;
                }
                match max {
                    Some(max) => count <= *max,
                    None => true,
                }
            }
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Arity::Variadic { .. })
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "argument"
    } else {
        "arguments"
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{} {}", n, plural(*n)),
            Arity::Variadic { min, max } => match max {
                Some(max) if min == max => write!(f, "{} {}", min, plural(*min)),
                Some(max) => write!(f, "{}..={} arguments", min, max),
                None if *min == 0 => write!(f, "any number of arguments"),
                None => write!(f, "at least {} {}", min, plural(*min)),
            },
        }
    }
}

/// Descriptor of a callable native function.
///
/// For a variadic function `param_types` holds a single element type that
/// every argument is checked against.
#[derive(Clone)]
pub struct Function {
    name: String,
    arity: Arity,
    param_types: Vec<DataType>,
    return_type: DataType,
    implementation: Arc<NativeFn>,
    verifier: Option<Arc<ArgVerifier>>,
}

impl Function {
    pub fn new<F>(
        name: impl Into<String>,
        arity: Arity,
        param_types: Vec<DataType>,
        return_type: DataType,
        implementation: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            param_types,
            return_type,
            implementation: Arc::new(implementation),
            verifier: None,
        }
    }

    pub fn with_verifier<V>(mut self, verifier: V) -> Self
    where
        V: Fn(&[Value]) -> Result<(), EvalError> + Send + Sync + 'static,
    {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn param_types(&self) -> &[DataType] {
        &self.param_types
    }

    pub fn return_type(&self) -> DataType {
        self.return_type
    }

    /// Human-readable signature, e.g. `max(number...) -> number`.
    pub fn signature(&self) -> String {
        let params = if self.arity.is_variadic() {
            let element = self.param_types.first().copied().unwrap_or(DataType::Any);
            format!("{}...", element)
        } else {
            self.param_types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{}({}) -> {}", self.name, params, self.return_type)
    }

    pub fn check_arity(&self, args: &[Value]) -> Result<(), EvalError> {
        if self.arity.accepts(args.len()) {
            return Ok(());
        }
        Err(EvalError::new(ErrorKind::ArityMismatch {
            name: self.name.clone(),
            expected: self.arity,
            got: args.len(),
        }))
    }

    pub fn check_types(&self, args: &[Value]) -> Result<(), EvalError> {
        for (index, arg) in args.iter().enumerate() {
            let expected = if self.arity.is_variadic() {
                self.param_types.first()
            } else {
                self.param_types.get(index)
            };
            let Some(expected) = expected else {
                continue;
            };
            if !expected.accepts(arg) {
                return Err(EvalError::new(ErrorKind::TypeMismatch {
                    name: self.name.clone(),
                    position: index + 1,
                    expected: *expected,
                    got: arg.data_type(),
                }));
            }
        }
        Ok(())
    }

    pub fn verify(&self, args: &[Value]) -> Result<(), EvalError> {
        match &self.verifier {
            Some(verifier) => verifier(args),
            None => Ok(()),
        }
    }

    /// Validates `args` against the contract, then runs the native
    /// implementation. Its result or error is returned unchanged.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self.check_arity(args)?;
        self.check_types(args)?;
        self.verify(args)?;
        tracing::trace!(function = %self.name, args = args.len(), "dispatching native function");
        (self.implementation)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("param_types", &self.param_types)
            .field("return_type", &self.return_type)
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}
