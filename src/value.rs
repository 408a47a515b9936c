//! Engine values.
//!
//! This module contains the values that a scripting call frame hands to the
//! bridge and that the bridge hands back. It is not an object model: objects
//! only carry what the bridge needs, which is a property bag, a class tag and
//! a hidden internal slot.
//!
//! All the values are reference counted with [`Rc`], so they can never leave
//! the thread that runs the scripting engine.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::frame::CallFrame;
use crate::handle::Internal;
use crate::isolate::Scope;
use crate::registry::ClassId;

/// Engine value.
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`.
    #[default]
    Undefined,
    /// `null`.
    Null,
    /// Boolean primitive.
    Boolean(bool),
    /// Number primitive.
    Number(f64),
    /// String primitive.
    String(Rc<str>),
    /// Generic array, which may contain holes.
    Array(Array),
    /// Typed array view.
    TypedArray(TypedArray),
    /// Object.
    Object(Object),
    /// Function.
    Function(Function),
}

impl Value {
    /// Returns `true` for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns `true` for number primitives.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` for boolean primitives.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns the contents of a string primitive.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object if the value is an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the array if the value is a generic array.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the view if the value is a typed array.
    pub fn as_typed_array(&self) -> Option<&TypedArray> {
        match self {
            Value::TypedArray(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the function if the value is a function.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Builds a generic array value without holes.
    pub fn array<I: IntoIterator<Item = Value>>(elements: I) -> Value {
        Value::Array(Array::from_values(elements))
    }

    /// Compares two values with the semantics of `===`.
    ///
    /// Arrays, objects and functions are compared by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::TypedArray(a), Value::TypedArray(b)) => a.same_view(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(a) => f.debug_list().entries(a.elements().iter()).finish(),
            Value::TypedArray(a) => write!(f, "{:?}({})", a.kind(), a.len()),
            Value::Object(o) => match o.class() {
                Some(class) => write!(f, "[object {class:?}]"),
                None => write!(f, "[object Object]"),
            },
            Value::Function(function) => write!(f, "[function {}]", function.name()),
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Value {
                    Value::Number(f64::from(value))
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i32, u32, i16, u16, i8, u8);

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value.into())
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Value {
        Value::Object(value)
    }
}

impl From<TypedArray> for Value {
    fn from(value: TypedArray) -> Value {
        Value::TypedArray(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Value {
        Value::Function(value)
    }
}

/// Generic array.
///
/// Elements set to `None` are holes. They read as `undefined`, but the float
/// vector coercions distinguish them so that they can become `NaN`.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Option<Value>>>>);

impl Array {
    /// Creates an array from its elements.
    pub fn new(elements: Vec<Option<Value>>) -> Array {
        Array(Rc::new(RefCell::new(elements)))
    }

    /// Creates an array without holes.
    pub fn from_values<I: IntoIterator<Item = Value>>(elements: I) -> Array {
        Array::new(elements.into_iter().map(Some).collect())
    }

    /// Returns the length of the array, counting holes.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the array has length zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`, or `None` for holes and indices out of
    /// range.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned().flatten()
    }

    /// Sets the element at `index`, growing the array with holes if needed.
    pub fn set(&self, index: usize, value: Value) {
        let mut elements = self.0.borrow_mut();
        if index >= elements.len() {
            elements.resize(index + 1, None);
        }
        elements[index] = Some(value);
    }

    /// Borrows the elements.
    pub fn elements(&self) -> Ref<'_, Vec<Option<Value>>> {
        self.0.borrow()
    }

    /// Returns `true` if both arrays are the same engine object.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Backing store of typed arrays.
///
/// The storage can be detached, after which every view over it has length
/// zero.
#[derive(Clone, Default)]
pub struct ArrayBuffer(Rc<RefCell<Option<Vec<u8>>>>);

impl ArrayBuffer {
    /// Creates a zero-filled buffer.
    pub fn new(byte_length: usize) -> ArrayBuffer {
        ArrayBuffer::from_bytes(vec![0; byte_length])
    }

    /// Creates a buffer that owns `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> ArrayBuffer {
        ArrayBuffer(Rc::new(RefCell::new(Some(bytes))))
    }

    /// Returns the length in bytes, which is zero once detached.
    pub fn byte_length(&self) -> usize {
        self.0.borrow().as_ref().map_or(0, Vec::len)
    }

    /// Detaches the buffer, releasing its storage.
    pub fn detach(&self) {
        self.0.borrow_mut().take();
    }

    /// Returns `true` if the buffer has been detached.
    pub fn is_detached(&self) -> bool {
        self.0.borrow().is_none()
    }

    /// Returns `true` if both buffers are the same engine object.
    pub fn ptr_eq(&self, other: &ArrayBuffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Element type of a typed array.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementKind {
    /// `Int8Array`.
    Int8,
    /// `Uint8Array`.
    Uint8,
    /// `Uint8ClampedArray`.
    Uint8Clamped,
    /// `Int16Array`.
    Int16,
    /// `Uint16Array`.
    Uint16,
    /// `Int32Array`.
    Int32,
    /// `Uint32Array`.
    Uint32,
    /// `Float32Array`.
    Float32,
    /// `Float64Array`.
    Float64,
}

impl ElementKind {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 => 8,
        }
    }

    /// Name of the typed array class.
    pub fn class_name(&self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8Array",
            ElementKind::Uint8 => "Uint8Array",
            ElementKind::Uint8Clamped => "Uint8ClampedArray",
            ElementKind::Int16 => "Int16Array",
            ElementKind::Uint16 => "Uint16Array",
            ElementKind::Int32 => "Int32Array",
            ElementKind::Uint32 => "Uint32Array",
            ElementKind::Float32 => "Float32Array",
            ElementKind::Float64 => "Float64Array",
        }
    }
}

/// Rust type that can be viewed as the elements of a typed array.
pub trait Element: bytemuck::Pod {
    /// Kind of the typed arrays whose elements have this type.
    const KIND: ElementKind;

    /// Converts the element to a number primitive.
    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($($t:ty => $kind:ident),*) => {
        $(
            impl Element for $t {
                const KIND: ElementKind = ElementKind::$kind;

                fn to_f64(self) -> f64 {
                    f64::from(self)
                }
            }
        )*
    };
}

impl_element!(
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
    f64 => Float64
);

/// Typed array view.
///
/// A view covers `length` elements of an [`ArrayBuffer`] starting at
/// `byte_offset`.
#[derive(Clone)]
pub struct TypedArray {
    buffer: ArrayBuffer,
    kind: ElementKind,
    byte_offset: usize,
    length: usize,
}

impl TypedArray {
    /// Creates a zero-filled typed array with its own buffer.
    pub fn new(kind: ElementKind, length: usize) -> TypedArray {
        TypedArray {
            buffer: ArrayBuffer::new(length * kind.size()),
            kind,
            byte_offset: 0,
            length,
        }
    }

    /// Creates a typed array holding a copy of `data`.
    pub fn from_slice<T: Element>(data: &[T]) -> TypedArray {
        TypedArray {
            buffer: ArrayBuffer::from_bytes(bytemuck::cast_slice(data).to_vec()),
            kind: T::KIND,
            byte_offset: 0,
            length: data.len(),
        }
    }

    /// Creates a `Uint8ClampedArray` holding a copy of `data`.
    pub fn clamped(data: &[u8]) -> TypedArray {
        TypedArray {
            kind: ElementKind::Uint8Clamped,
            ..TypedArray::from_slice(data)
        }
    }

    /// Creates a view over an existing buffer.
    ///
    /// Returns `None` if the view would not fit in the buffer or if
    /// `byte_offset` is not a multiple of the element size.
    pub fn with_buffer(
        buffer: ArrayBuffer,
        kind: ElementKind,
        byte_offset: usize,
        length: usize,
    ) -> Option<TypedArray> {
        let end = byte_offset.checked_add(length.checked_mul(kind.size())?)?;
        if byte_offset % kind.size() != 0 || end > buffer.byte_length() {
            return None;
        }
        Some(TypedArray {
            buffer,
            kind,
            byte_offset,
            length,
        })
    }

    /// Returns the element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the buffer that the view covers.
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Returns the number of elements, which is zero if the buffer is
    /// detached.
    pub fn len(&self) -> usize {
        if self.buffer.is_detached() {
            0
        } else {
            self.length
        }
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the length of the view in bytes.
    pub fn byte_length(&self) -> usize {
        self.len() * self.kind.size()
    }

    /// Returns `true` if both values are the same view of the same buffer.
    pub fn same_view(&self, other: &TypedArray) -> bool {
        self.buffer.ptr_eq(&other.buffer)
            && self.kind == other.kind
            && self.byte_offset == other.byte_offset
            && self.length == other.length
    }

    /// Runs `f` with the bytes covered by the view.
    ///
    /// The slice borrows the backing storage directly. It is empty if the
    /// buffer has been detached.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let storage = self.buffer.0.borrow();
        match storage.as_deref() {
            Some(bytes) => f(&bytes[self.byte_offset..self.byte_offset + self.byte_length()]),
            None => f(&[]),
        }
    }

    /// Runs `f` with the bytes covered by the view, allowing `f` to write them.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let byte_length = self.byte_length();
        let mut storage = self.buffer.0.borrow_mut();
        match storage.as_deref_mut() {
            Some(bytes) => f(&mut bytes[self.byte_offset..self.byte_offset + byte_length]),
            None => f(&mut []),
        }
    }

    /// Runs `f` with the elements of the view.
    ///
    /// Returns `None` without calling `f` if the elements of the view are not
    /// of type `T`. A `Uint8ClampedArray` can be viewed as `u8`. When the
    /// backing storage is suitably aligned the slice borrows it directly;
    /// otherwise the elements are copied out first.
    pub fn with_slice<T: Element, R>(&self, f: impl FnOnce(&[T]) -> R) -> Option<R> {
        let matches = self.kind == T::KIND
            || (T::KIND == ElementKind::Uint8 && self.kind == ElementKind::Uint8Clamped);
        if !matches {
            return None;
        }
        Some(self.with_bytes(|bytes| match bytemuck::try_cast_slice::<u8, T>(bytes) {
            Ok(elements) => f(elements),
            Err(_) => {
                let elements: Vec<T> = bytes
                    .chunks_exact(std::mem::size_of::<T>())
                    .map(bytemuck::pod_read_unaligned)
                    .collect();
                f(&elements)
            }
        }))
    }

    /// Returns the element at `index` as a number.
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len() {
            return None;
        }
        let size = self.kind.size();
        self.with_bytes(|bytes| {
            let element = &bytes[index * size..(index + 1) * size];
            Some(match self.kind {
                ElementKind::Int8 => bytemuck::pod_read_unaligned::<i8>(element).to_f64(),
                ElementKind::Uint8 | ElementKind::Uint8Clamped => f64::from(element[0]),
                ElementKind::Int16 => bytemuck::pod_read_unaligned::<i16>(element).to_f64(),
                ElementKind::Uint16 => bytemuck::pod_read_unaligned::<u16>(element).to_f64(),
                ElementKind::Int32 => bytemuck::pod_read_unaligned::<i32>(element).to_f64(),
                ElementKind::Uint32 => bytemuck::pod_read_unaligned::<u32>(element).to_f64(),
                ElementKind::Float32 => bytemuck::pod_read_unaligned::<f32>(element).to_f64(),
                ElementKind::Float64 => bytemuck::pod_read_unaligned::<f64>(element),
            })
        })
    }
}

/// Object.
///
/// Plain objects created by script only use the property bag. Wrapper objects
/// created by the bridge also carry the class tag of their template and an
/// internal slot with the native handle.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

struct ObjectData {
    class: Option<ClassId>,
    internal: Option<Internal>,
    properties: RefCell<HashMap<String, Value>>,
}

impl Object {
    /// Creates a plain object.
    pub fn new() -> Object {
        Object(Rc::new(ObjectData {
            class: None,
            internal: None,
            properties: RefCell::new(HashMap::new()),
        }))
    }

    /// Creates a plain object with the given properties.
    pub fn with_properties<K, I>(properties: I) -> Object
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = Object::new();
        for (key, value) in properties {
            object.set(key, value);
        }
        object
    }

    pub(crate) fn wrapper(class: ClassId, internal: Internal) -> Object {
        Object(Rc::new(ObjectData {
            class: Some(class),
            internal: Some(internal),
            properties: RefCell::new(HashMap::new()),
        }))
    }

    /// Returns the class tag, if the object was created from a template.
    pub fn class(&self) -> Option<ClassId> {
        self.0.class
    }

    /// Returns the contents of the hidden internal slot.
    pub fn internal(&self) -> Option<&Internal> {
        self.0.internal.as_ref()
    }

    /// Reads an own property.
    pub fn get(&self, key: &str) -> Value {
        self.0
            .properties
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns `true` if the object has an own property called `key`.
    pub fn has(&self, key: &str) -> bool {
        self.0.properties.borrow().contains_key(key)
    }

    /// Writes an own property.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0.properties.borrow_mut().insert(key.into(), value);
    }

    /// Returns `true` if both objects are the same engine object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Object {
    fn default() -> Object {
        Object::new()
    }
}

/// Body of a function.
///
/// Functions receive the scope of the isolate that calls them and the call
/// frame with their receiver and arguments.
pub type FunctionBody = dyn Fn(&Scope<'_>, &mut CallFrame);

/// Function.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

struct FunctionData {
    name: String,
    class: Option<ClassId>,
    body: Box<FunctionBody>,
}

impl Function {
    /// Creates a function from a closure.
    pub fn new(name: impl Into<String>, body: impl Fn(&Scope<'_>, &mut CallFrame) + 'static) -> Function {
        Function(Rc::new(FunctionData {
            name: name.into(),
            class: None,
            body: Box::new(body),
        }))
    }

    pub(crate) fn constructor(
        name: &str,
        class: ClassId,
        body: impl Fn(&Scope<'_>, &mut CallFrame) + 'static,
    ) -> Function {
        Function(Rc::new(FunctionData {
            name: name.to_string(),
            class: Some(class),
            body: Box::new(body),
        }))
    }

    /// Returns the name of the function.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the class that this function constructs, if it is the
    /// constructor of a template.
    pub fn class(&self) -> Option<ClassId> {
        self.0.class
    }

    /// Calls the function.
    pub fn call(&self, scope: &Scope<'_>, frame: &mut CallFrame) {
        (self.0.body)(scope, frame)
    }

    /// Returns `true` if both functions are the same engine object.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn array_holes() {
        let array = Array::new(vec![Some(Value::from(1)), None]);
        array.set(3, Value::from(4));
        assert_eq!(array.len(), 4);
        assert!(array.get(1).is_none());
        assert!(array.get(2).is_none());
        assert!(array.get(3).unwrap().strict_equals(&Value::from(4)));
    }

    #[test]
    fn typed_array_views() {
        let buffer = ArrayBuffer::from_bytes(bytemuck::cast_slice(&[1u32, 2, 3, 4]).to_vec());
        let view = TypedArray::with_buffer(buffer.clone(), ElementKind::Uint32, 4, 2).unwrap();
        assert_eq!(view.with_slice::<u32, _>(|s| s.to_vec()), Some(vec![2, 3]));
        assert_eq!(view.with_slice::<i32, _>(|s| s.len()), None);
        assert_eq!(view.get(1), Some(3.0));
        assert!(TypedArray::with_buffer(buffer.clone(), ElementKind::Uint32, 2, 1).is_none());
        assert!(TypedArray::with_buffer(buffer, ElementKind::Float64, 8, 2).is_none());
    }

    #[test]
    fn unaligned_view_is_copied() {
        let buffer = ArrayBuffer::from_bytes(vec![0; 9]);
        let bytes = TypedArray::with_buffer(buffer.clone(), ElementKind::Uint8, 0, 9).unwrap();
        bytes.with_bytes_mut(|b| b[1..5].copy_from_slice(&7.5f32.to_ne_bytes()));
        let unaligned = TypedArray::with_buffer(buffer, ElementKind::Uint8, 1, 4).unwrap();
        let value = unaligned.with_bytes(|b| bytemuck::pod_read_unaligned::<f32>(b));
        assert_eq!(value, 7.5);
    }

    #[test]
    fn detached_views_are_empty() {
        let array = TypedArray::from_slice(&[1.0f32, 2.0]);
        assert_eq!(array.len(), 2);
        array.buffer().detach();
        assert_eq!(array.len(), 0);
        assert_eq!(array.with_slice::<f32, _>(|s| s.len()), Some(0));
        assert_eq!(array.get(0), None);
    }

    #[test]
    fn clamped_reads_as_bytes() {
        let array = TypedArray::clamped(&[1, 255]);
        assert_eq!(array.kind(), ElementKind::Uint8Clamped);
        assert_eq!(array.with_slice::<u8, _>(|s| s.to_vec()), Some(vec![1, 255]));
    }

    #[test]
    fn object_identity() {
        let a = Object::with_properties([("x", Value::from(1))]);
        let b = a.clone();
        assert!(Value::from(a.clone()).strict_equals(&Value::from(b)));
        assert!(!Value::from(a.clone()).strict_equals(&Value::from(Object::new())));
        assert!(a.has("x"));
        assert!(a.get("y").is_nullish());
    }
}
