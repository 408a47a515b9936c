//! Method dispatch for rendering contexts.
//!
//! Every method of a rendering context class is a forwarder: it checks the
//! arguments of the call, converts them to native values and makes exactly
//! one call into the native engine. Forwarders run inside an
//! [`Invocation`], which has the receiver already resolved to its
//! [`ContextState`].
//!
//! Most forwarders are generated with the macros in this module. Arguments
//! are read in order with a [`Cursor`], whose methods name the conversion
//! applied to each argument:
//!
//! - `u32`, `i32`, `f32`, `isize`, `bool`, `string`: the coercions of the WebGL
//!   IDL (`ToUint32`, `ToInt32`, `ToNumber`, `IntegerValue`, `ToBoolean`,
//!   `ToString`).
//! - `number_u32`: like `u32`, but the argument must be a number.
//! - `index(Kind)`: a wrapper of class `Kind`, which must be present.
//! - `nullable(Kind)`: a wrapper of class `Kind`, or `null`, which gives 0.
//! - `location`: a `WebGLUniformLocation`, or `null`, which gives -1.
//! - `sync`: a `WebGLSync`.

use std::cell::RefMut;
use std::rc::Rc;

use crate::coerce::{with_vector, VectorElement};
use crate::error::ArgumentError;
use crate::frame::CallFrame;
use crate::handle::{self, ContextHandle, GlObject, Internal, ObjectKind, SyncHandle};
use crate::isolate::Scope;
use crate::native::{NativeEngine, Parameter};
use crate::registry::ContextMethod;
use crate::value::{Object, TypedArray, Value};
use crate::webgl::{ContextState, ContextVersion};

/// Runs a context method on the receiver of `frame`.
pub(crate) fn invoke(
    scope: &Scope<'_>,
    frame: &mut CallFrame,
    method: ContextMethod,
) -> Result<(), ArgumentError> {
    let context = match frame.this().as_object().and_then(Object::internal) {
        Some(Internal::Context(state)) => Rc::clone(state),
        _ => {
            return Err(ArgumentError::WrongReceiver {
                expected: "WebGLRenderingContext",
            })
        }
    };
    let mut invocation = Invocation {
        scope,
        frame,
        context,
    };
    method(&mut invocation)
}

/// Call of a rendering context method.
pub struct Invocation<'s, 'i> {
    scope: &'s Scope<'i>,
    frame: &'s mut CallFrame,
    context: Rc<ContextState>,
}

impl<'s, 'i> Invocation<'s, 'i> {
    /// Returns the scope of the call.
    pub fn scope(&self) -> &'s Scope<'i> {
        self.scope
    }

    /// Returns the native handle of the receiver.
    pub fn context(&self) -> ContextHandle {
        self.context.handle()
    }

    /// Returns the rendering context of the receiver.
    pub fn state(&self) -> &Rc<ContextState> {
        &self.context
    }

    /// Returns the version of the receiver.
    pub fn version(&self) -> ContextVersion {
        self.context.version()
    }

    /// Borrows the native engine.
    pub fn native(&self) -> RefMut<'i, dyn NativeEngine + 'static> {
        self.scope.native()
    }

    /// Returns the number of arguments supplied.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Returns `true` if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Returns the argument at `index`.
    pub fn arg(&self, index: usize) -> &Value {
        self.frame.arg(index)
    }

    /// Checks that at least `count` arguments were supplied.
    pub fn require(&self, count: usize) -> Result<(), ArgumentError> {
        if self.frame.len() < count {
            return Err(ArgumentError::Arity {
                required: count,
                supplied: self.frame.len(),
            });
        }
        Ok(())
    }

    /// Returns a cursor that reads the arguments from the first one.
    pub fn cursor(&self) -> Cursor<'_, 'i> {
        Cursor {
            scope: self.scope,
            frame: &*self.frame,
            index: 0,
        }
    }

    /// Sets the return value.
    pub fn ret(&mut self, value: impl Into<Value>) {
        self.frame.set_return(value);
    }

    /// Returns a GPU object to script.
    pub fn ret_object(&mut self, object: GlObject) {
        let value = handle::wrap(self.scope, object);
        self.frame.set_return(value);
    }

    /// Returns a uniform location to script. Negative locations give `null`.
    pub fn ret_location(&mut self, location: i32) {
        if location < 0 {
            self.frame.set_return(Value::Null);
        } else {
            self.ret_object(GlObject::UniformLocation(location));
        }
    }

    /// Returns the result of a parameter query to script.
    pub fn ret_parameter(&mut self, parameter: Parameter) {
        let value = parameter_value(self.scope, parameter);
        self.frame.set_return(value);
    }

    /// Runs `f` with the native engine and the elements of a vector argument.
    ///
    /// `range` is the `(srcOffset, srcLength)` pair of the WebGL 2 overloads.
    /// A length of zero means the rest of the vector.
    pub fn vector<T: VectorElement, R>(
        &self,
        index: usize,
        range: (usize, usize),
        f: impl FnOnce(&mut (dyn NativeEngine + 'static), &[T]) -> R,
    ) -> Result<R, ArgumentError> {
        let wrong_type = ArgumentError::WrongType {
            index,
            expected: "a typed array or an array",
        };
        let mut native = self.native();
        with_vector::<T, _>(self.arg(index), |data| {
            let (offset, length) = range;
            let data = data.get(offset..)?;
            let data = match length {
                0 => data,
                n => data.get(..n)?,
            };
            Some(f(&mut *native, data))
        })
        .flatten()
        .ok_or(wrong_type)
    }

    /// Runs `f` with the native engine and the bytes of a byte source.
    ///
    /// Typed arrays give the bytes of the view and the size of their
    /// elements. Generic arrays are converted to bytes, with an element size
    /// of one.
    pub fn view<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut (dyn NativeEngine + 'static), &[u8], usize) -> R,
    ) -> Result<R, ArgumentError> {
        let mut native = self.native();
        match self.arg(index) {
            Value::TypedArray(array) => {
                let size = array.kind().size();
                Ok(array.with_bytes(|bytes| f(&mut *native, bytes, size)))
            }
            value @ Value::Array(_) => {
                with_vector::<u8, _>(value, |bytes| f(&mut *native, bytes, 1)).ok_or(
                    ArgumentError::WrongType {
                        index,
                        expected: "an ArrayBufferView",
                    },
                )
            }
            _ => Err(ArgumentError::WrongType {
                index,
                expected: "an ArrayBufferView",
            }),
        }
    }

    /// Runs `f` with the native engine and the writable bytes of a typed
    /// array, together with the size of its elements.
    pub fn view_mut<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut (dyn NativeEngine + 'static), &mut [u8], usize) -> R,
    ) -> Result<R, ArgumentError> {
        let array = self
            .arg(index)
            .as_typed_array()
            .ok_or(ArgumentError::WrongType {
                index,
                expected: "an ArrayBufferView",
            })?;
        let size = array.kind().size();
        let mut native = self.native();
        Ok(array.with_bytes_mut(|bytes| f(&mut *native, bytes, size)))
    }

    /// Reads a sequence of strings.
    pub fn strings(&self, index: usize) -> Result<Vec<String>, ArgumentError> {
        let array = self.arg(index).as_array().ok_or(ArgumentError::WrongType {
            index,
            expected: "a sequence",
        })?;
        let strings = array
            .elements()
            .iter()
            .map(|element| element.as_ref().map_or_else(|| "undefined".to_string(), Value::to_js_string))
            .collect();
        Ok(strings)
    }

    /// Returns the image asset handle of an `ImageAsset` argument.
    pub fn asset(&self, index: usize) -> Option<u32> {
        crate::image_asset::resolve(self.scope, self.arg(index))
    }
}

/// Reader of the positional arguments of a call.
pub struct Cursor<'a, 'i> {
    scope: &'a Scope<'i>,
    frame: &'a CallFrame,
    index: usize,
}

impl<'a, 'i> Cursor<'a, 'i> {
    fn next(&mut self) -> (usize, &'a Value) {
        let index = self.index;
        self.index += 1;
        (index, self.frame.arg(index))
    }

    /// Returns the position of the next argument.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Skips an argument.
    pub fn skip(&mut self) {
        self.index += 1;
    }

    /// Reads a `GLenum`, `GLuint` or `GLbitfield`.
    pub fn u32(&mut self) -> Result<u32, ArgumentError> {
        Ok(self.next().1.to_uint32())
    }

    /// Reads a `GLint` or `GLsizei`.
    pub fn i32(&mut self) -> Result<i32, ArgumentError> {
        Ok(self.next().1.to_int32())
    }

    /// Reads a `GLfloat` or `GLclampf`.
    pub fn f32(&mut self) -> Result<f32, ArgumentError> {
        Ok(self.next().1.to_number() as f32)
    }

    /// Reads a `GLintptr`, `GLsizeiptr` or `GLint64`.
    pub fn isize(&mut self) -> Result<isize, ArgumentError> {
        Ok(self.next().1.to_integer() as isize)
    }

    /// Reads a `GLboolean`.
    pub fn bool(&mut self) -> Result<bool, ArgumentError> {
        Ok(self.next().1.to_boolean())
    }

    /// Reads a `DOMString`.
    pub fn string(&mut self) -> Result<String, ArgumentError> {
        Ok(self.next().1.to_js_string())
    }

    /// Reads an optional unsigned offset or length. Absent values give 0.
    pub fn optional_usize(&mut self) -> Result<usize, ArgumentError> {
        let (_, value) = self.next();
        Ok(value.to_integer().max(0) as usize)
    }

    /// Reads a `GLenum` or `GLuint` that must be given as a number.
    pub fn number_u32(&mut self) -> Result<u32, ArgumentError> {
        let (index, value) = self.next();
        if !value.is_number() {
            return Err(ArgumentError::WrongType {
                index,
                expected: "a number",
            });
        }
        Ok(value.to_uint32())
    }

    /// Reads a wrapper of class `kind` and returns its object name.
    pub fn index(&mut self, kind: ObjectKind) -> Result<u32, ArgumentError> {
        let (index, value) = self.next();
        handle::resolve(self.scope, value, kind)
            .map(|object| object.index())
            .ok_or(ArgumentError::WrongInstance {
                index,
                expected: kind.class_name(),
            })
    }

    /// Reads a wrapper of class `kind` or `null`, which gives 0.
    pub fn nullable(&mut self, kind: ObjectKind) -> Result<u32, ArgumentError> {
        if self.frame.arg(self.index).is_nullish() {
            self.index += 1;
            return Ok(0);
        }
        self.index(kind)
    }

    /// Reads a uniform location or `null`, which gives -1.
    pub fn location(&mut self) -> Result<i32, ArgumentError> {
        let (index, value) = self.next();
        if value.is_nullish() {
            return Ok(-1);
        }
        match handle::resolve(self.scope, value, ObjectKind::UniformLocation) {
            Some(GlObject::UniformLocation(location)) => Ok(location),
            _ => Err(ArgumentError::WrongInstance {
                index,
                expected: ObjectKind::UniformLocation.class_name(),
            }),
        }
    }

    /// Reads a `WebGLSync`.
    pub fn sync(&mut self) -> Result<SyncHandle, ArgumentError> {
        let (index, value) = self.next();
        match handle::resolve(self.scope, value, ObjectKind::Sync) {
            Some(GlObject::Sync(sync)) => Ok(sync),
            _ => Err(ArgumentError::WrongInstance {
                index,
                expected: ObjectKind::Sync.class_name(),
            }),
        }
    }
}

/// Converts the result of a parameter query to a script value.
pub(crate) fn parameter_value(scope: &Scope<'_>, parameter: Parameter) -> Value {
    match parameter {
        Parameter::None => Value::Null,
        Parameter::Bool(value) => Value::from(value),
        Parameter::I32(value) => Value::from(value),
        Parameter::U32(value) => Value::from(value),
        Parameter::I64(value) => Value::Number(value as f64),
        Parameter::F32(value) => Value::from(value),
        Parameter::BoolArray(values) => Value::array(values.into_iter().map(Value::from)),
        Parameter::I32Array(values) => Value::from(TypedArray::from_slice(&values)),
        Parameter::U32Array(values) => Value::from(TypedArray::from_slice(&values)),
        Parameter::F32Array(values) => Value::from(TypedArray::from_slice(&values)),
        Parameter::String(value) => Value::from(value),
        Parameter::ActiveInfo { name, size, kind } => Value::Object(Object::with_properties([
            ("name", Value::from(name)),
            ("size", Value::from(size)),
            ("type", Value::from(kind)),
        ])),
        Parameter::Object(object) => handle::wrap(scope, object),
    }
}

macro_rules! count {
    () => { 0usize };
    ($head:tt $($tail:tt)*) => { 1usize + $crate::dispatch::count!($($tail)*) };
}

/// Generates forwarders whose arguments are all scalars or wrappers.
///
/// The arity of each forwarder is the number of arguments listed. With
/// `-> method`, the native return value is handed to that method of
/// [`Invocation`].
macro_rules! forwarders {
    ($(
        $name:ident => $native:ident(
            $($arg:ident: $conv:ident $(($kind:ident))?),* $(,)?
        ) $(-> $ret:ident)?;
    )*) => {
        $(
            fn $name(inv: &mut $crate::dispatch::Invocation<'_, '_>)
                -> Result<(), $crate::error::ArgumentError>
            {
                inv.require($crate::dispatch::count!($($arg)*))?;
                #[allow(unused_mut)]
                let mut _args = inv.cursor();
                $(let $arg = _args.$conv($($crate::handle::ObjectKind::$kind)?)?;)*
                let context = inv.context();
                let _result = inv
                    .native()
                    .$native($($crate::dispatch::pass!($conv, $arg),)* context);
                $(inv.$ret(_result);)?
                Ok(())
            }
        )*
    };
}

/// Generates forwarders that end with a vector argument.
///
/// `[T]` reads a vector of `T`. `[T] range` also reads the optional
/// `srcOffset` and `srcLength` arguments that follow the vector.
macro_rules! vector_forwarders {
    ($(
        $name:ident => $native:ident(
            $($arg:ident: $conv:ident $(($kind:ident))?,)* [$elem:ty] $($range:ident)?
        );
    )*) => {
        $(
            fn $name(inv: &mut $crate::dispatch::Invocation<'_, '_>)
                -> Result<(), $crate::error::ArgumentError>
            {
                inv.require($crate::dispatch::count!($($arg)*) + 1)?;
                let mut args = inv.cursor();
                $(let $arg = args.$conv($($crate::handle::ObjectKind::$kind)?)?;)*
                let position = args.position();
                args.skip();
                let range = $crate::dispatch::vector_range!(args $(, $range)?);
                let context = inv.context();
                inv.vector::<$elem, _>(position, range, |native, data| {
                    native.$native($($crate::dispatch::pass!($conv, $arg),)* data, context)
                })
            }
        )*
    };
}

/// Passes a converted argument to the native engine. Strings are lent as
/// `&str`, everything else is `Copy` and moves.
macro_rules! pass {
    (string, $arg:ident) => {
        $arg.as_str()
    };
    ($conv:ident, $arg:ident) => {
        $arg
    };
}

macro_rules! vector_range {
    ($args:ident) => {
        (0usize, 0usize)
    };
    ($args:ident, range) => {
        ($args.optional_usize()?, $args.optional_usize()?)
    };
}

/// Generates `create*` forwarders, which return a new wrapper of class
/// `Kind`.
macro_rules! creators {
    ($(
        $name:ident => $native:ident($($arg:ident: $conv:ident),* $(,)?) as $kind:ident;
    )*) => {
        $(
            fn $name(inv: &mut $crate::dispatch::Invocation<'_, '_>)
                -> Result<(), $crate::error::ArgumentError>
            {
                inv.require($crate::dispatch::count!($($arg)*))?;
                #[allow(unused_mut)]
                let mut _args = inv.cursor();
                $(let $arg = _args.$conv()?;)*
                let context = inv.context();
                let index = inv.native().$native($($arg,)* context);
                inv.ret_object($crate::handle::GlObject::$kind(index));
                Ok(())
            }
        )*
    };
}

/// Generates `delete*` forwarders. `null` does not reach the native engine.
macro_rules! deleters {
    ($($name:ident => $native:ident($kind:ident);)*) => {
        $(
            fn $name(inv: &mut $crate::dispatch::Invocation<'_, '_>)
                -> Result<(), $crate::error::ArgumentError>
            {
                inv.require(1)?;
                if inv.arg(0).is_nullish() {
                    return Ok(());
                }
                let object = inv.cursor().index($crate::handle::ObjectKind::$kind)?;
                let context = inv.context();
                inv.native().$native(object, context);
                Ok(())
            }
        )*
    };
}

/// Generates `is*` forwarders. `null` gives `false` without reaching the
/// native engine.
macro_rules! predicates {
    ($($name:ident => $native:ident($kind:ident);)*) => {
        $(
            fn $name(inv: &mut $crate::dispatch::Invocation<'_, '_>)
                -> Result<(), $crate::error::ArgumentError>
            {
                inv.require(1)?;
                if inv.arg(0).is_nullish() {
                    inv.ret(false);
                    return Ok(());
                }
                let object = inv.cursor().index($crate::handle::ObjectKind::$kind)?;
                let context = inv.context();
                let result = inv.native().$native(object, context);
                inv.ret(result);
                Ok(())
            }
        )*
    };
}

pub(crate) use count;
pub(crate) use creators;
pub(crate) use deleters;
pub(crate) use forwarders;
pub(crate) use pass;
pub(crate) use predicates;
pub(crate) use vector_forwarders;
pub(crate) use vector_range;

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::RecordingEngine;

    #[test]
    fn parameter_values() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        assert!(matches!(
            parameter_value(&scope, Parameter::None),
            Value::Null
        ));
        assert!(parameter_value(&scope, Parameter::I64(-5)).strict_equals(&Value::from(-5)));
        let array = parameter_value(&scope, Parameter::U32Array(vec![1, 2]));
        let array = array.as_typed_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(1), Some(2.0));
        let info = parameter_value(
            &scope,
            Parameter::ActiveInfo {
                name: "u_color".to_string(),
                size: 1,
                kind: 0x8B52,
            },
        );
        let info = info.as_object().unwrap();
        assert_eq!(info.get("name").as_str(), Some("u_color"));
        assert!(info.get("type").strict_equals(&Value::from(0x8B52)));
        let buffer = parameter_value(&scope, Parameter::Object(GlObject::Buffer(4)));
        assert_eq!(
            handle::resolve(&scope, &buffer, ObjectKind::Buffer),
            Some(GlObject::Buffer(4))
        );
    }

    #[test]
    fn context_methods_need_a_context_receiver() {
        fn noop(_: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
            Ok(())
        }
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let mut frame = CallFrame::new(Value::Object(Object::new()), Vec::new());
        assert_eq!(
            invoke(&scope, &mut frame, noop),
            Err(ArgumentError::WrongReceiver {
                expected: "WebGLRenderingContext"
            })
        );
    }
}
