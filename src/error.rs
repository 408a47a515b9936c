//! Errors.
//!
//! Forwarders report malformed calls with [`ArgumentError`]. Depending on the
//! [`InvalidArgumentPolicy`](canvas_json::InvalidArgumentPolicy) of the
//! isolate, the error is either only logged or turned into a [`ScriptError`]
//! that is raised in script.

use std::fmt;

/// Reason why a call was not forwarded to the native engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Fewer arguments than the operation requires.
    Arity {
        /// Number of required arguments.
        required: usize,
        /// Number of arguments supplied.
        supplied: usize,
    },
    /// An argument has the wrong type.
    WrongType {
        /// Position of the argument.
        index: usize,
        /// Description of the expected type.
        expected: &'static str,
    },
    /// An argument is not an instance of the expected wrapper class.
    WrongInstance {
        /// Position of the argument.
        index: usize,
        /// Name of the expected class.
        expected: &'static str,
    },
    /// The method was called on an object of another class.
    WrongReceiver {
        /// Name of the expected class.
        expected: &'static str,
    },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgumentError::Arity { required, supplied } => write!(
                f,
                "{required} arguments required, but only {supplied} present"
            ),
            ArgumentError::WrongType { index, expected } => {
                write!(f, "argument {} is not {expected}", index + 1)
            }
            ArgumentError::WrongInstance { index, expected } => {
                write!(f, "argument {} is not of type '{expected}'", index + 1)
            }
            ArgumentError::WrongReceiver { expected } => {
                write!(f, "illegal invocation: receiver is not a {expected}")
            }
        }
    }
}

impl std::error::Error for ArgumentError {}

/// Exception raised in script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// `TypeError` with a message.
    TypeError(String),
    /// `TypeError` raised when script constructs a class that only the bridge
    /// may instantiate.
    IllegalConstructor,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScriptError::TypeError(message) => write!(f, "TypeError: {message}"),
            ScriptError::IllegalConstructor => write!(f, "TypeError: Illegal constructor"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<ArgumentError> for ScriptError {
    fn from(value: ArgumentError) -> ScriptError {
        ScriptError::TypeError(value.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        let err = ArgumentError::Arity {
            required: 5,
            supplied: 4,
        };
        assert_eq!(err.to_string(), "5 arguments required, but only 4 present");
        let err = ScriptError::from(ArgumentError::WrongInstance {
            index: 1,
            expected: "WebGLQuery",
        });
        assert_eq!(
            err.to_string(),
            "TypeError: argument 2 is not of type 'WebGLQuery'"
        );
        assert_eq!(
            ScriptError::IllegalConstructor.to_string(),
            "TypeError: Illegal constructor"
        );
    }
}
