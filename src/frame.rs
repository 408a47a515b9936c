//! Call frames.
//!
//! A [`CallFrame`] is what the scripting engine gives to a native function:
//! the receiver, the positional arguments, a return value slot and an
//! exception slot. Functions leave the return slot unset to return
//! `undefined`.

use crate::error::ScriptError;
use crate::value::Value;

/// Call frame of a native function.
pub struct CallFrame {
    this: Value,
    args: Vec<Value>,
    construct: bool,
    return_value: Option<Value>,
    exception: Option<ScriptError>,
    undefined: Value,
}

impl CallFrame {
    /// Creates the frame of a call with receiver `this`.
    pub fn new(this: Value, args: Vec<Value>) -> CallFrame {
        CallFrame {
            this,
            args,
            construct: false,
            return_value: None,
            exception: None,
            undefined: Value::Undefined,
        }
    }

    /// Creates the frame of a `new` expression.
    pub fn construct(args: Vec<Value>) -> CallFrame {
        CallFrame {
            construct: true,
            ..CallFrame::new(Value::Undefined, args)
        }
    }

    /// Returns the receiver.
    pub fn this(&self) -> &Value {
        &self.this
    }

    /// Returns `true` if the function is being called with `new`.
    pub fn is_construct_call(&self) -> bool {
        self.construct
    }

    /// Returns the number of arguments supplied.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the argument at `index`, or `undefined` if it was not supplied.
    pub fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&self.undefined)
    }

    /// Returns all the arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Sets the return value.
    pub fn set_return(&mut self, value: impl Into<Value>) {
        self.return_value = Some(value.into());
    }

    /// Returns the return value, if one was set.
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Raises an exception. Any return value is discarded.
    pub fn throw(&mut self, error: ScriptError) {
        self.return_value = None;
        self.exception = Some(error);
    }

    /// Returns the exception raised by the call, if any.
    pub fn exception(&self) -> Option<&ScriptError> {
        self.exception.as_ref()
    }

    /// Consumes the frame, giving the result of the call.
    pub fn into_result(self) -> Result<Option<Value>, ScriptError> {
        match self.exception {
            Some(error) => Err(error),
            None => Ok(self.return_value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_arguments_are_undefined() {
        let frame = CallFrame::new(Value::Undefined, vec![Value::from(1)]);
        assert_eq!(frame.len(), 1);
        assert!(frame.arg(0).is_number());
        assert!(matches!(frame.arg(7), Value::Undefined));
    }

    #[test]
    fn throw_clears_return() {
        let mut frame = CallFrame::construct(vec![]);
        assert!(frame.is_construct_call());
        frame.set_return(3);
        frame.throw(ScriptError::IllegalConstructor);
        assert!(frame.return_value().is_none());
        assert_eq!(frame.into_result().unwrap_err(), ScriptError::IllegalConstructor);
    }
}
