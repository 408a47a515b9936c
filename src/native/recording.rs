//! Recording native engine.
//!
//! [`RecordingEngine`] implements the whole native surface by recording every
//! call, with its arguments, instead of rendering anything. Tests use it to
//! check which native calls a script call produces. Return values can be
//! queued per operation with [`RecordingEngine::reply`]. Otherwise the engine
//! answers with fresh handles, `false`, empty strings and so on.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;

use super::{ImageDecoder, Parameter};
use crate::handle::{ContextHandle, SyncHandle};

/// Argument of a recorded call.
///
/// Slices are copied. Floats compare bitwise, so that `NaN` arguments can be
/// compared in tests.
#[derive(Debug, Clone)]
pub enum Arg {
    /// `bool`.
    Bool(bool),
    /// `i32`.
    I32(i32),
    /// `u32`.
    U32(u32),
    /// `isize`.
    Isize(isize),
    /// `usize`.
    Usize(usize),
    /// `f32`.
    F32(f32),
    /// String.
    Str(String),
    /// Byte slice.
    Bytes(Vec<u8>),
    /// `i32` slice.
    I32s(Vec<i32>),
    /// `u32` slice.
    U32s(Vec<u32>),
    /// `f32` slice.
    F32s(Vec<f32>),
    /// String slice.
    Strs(Vec<String>),
    /// Sync object pointer.
    Sync(SyncHandle),
}

impl PartialEq for Arg {
    fn eq(&self, other: &Arg) -> bool {
        match (self, other) {
            (Arg::Bool(a), Arg::Bool(b)) => a == b,
            (Arg::I32(a), Arg::I32(b)) => a == b,
            (Arg::U32(a), Arg::U32(b)) => a == b,
            (Arg::Isize(a), Arg::Isize(b)) => a == b,
            (Arg::Usize(a), Arg::Usize(b)) => a == b,
            (Arg::F32(a), Arg::F32(b)) => a.to_bits() == b.to_bits(),
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::Bytes(a), Arg::Bytes(b)) => a == b,
            (Arg::I32s(a), Arg::I32s(b)) => a == b,
            (Arg::U32s(a), Arg::U32s(b)) => a == b,
            (Arg::F32s(a), Arg::F32s(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Arg::Strs(a), Arg::Strs(b)) => a == b,
            (Arg::Sync(a), Arg::Sync(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_arg {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for Arg {
                fn from(value: $t) -> Arg {
                    Arg::$variant(value)
                }
            }
        )*
    };
}

impl_from_arg!(
    bool => Bool,
    i32 => I32,
    u32 => U32,
    isize => Isize,
    usize => Usize,
    f32 => F32,
    SyncHandle => Sync
);

macro_rules! impl_from_slice_arg {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<&[$t]> for Arg {
                fn from(value: &[$t]) -> Arg {
                    Arg::$variant(value.to_vec())
                }
            }
        )*
    };
}

impl_from_slice_arg!(u8 => Bytes, i32 => I32s, u32 => U32s, f32 => F32s);

impl From<&mut [u8]> for Arg {
    fn from(value: &mut [u8]) -> Arg {
        Arg::Bytes(value.to_vec())
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Arg {
        Arg::Str(value.to_string())
    }
}

impl From<&[&str]> for Arg {
    fn from(value: &[&str]) -> Arg {
        Arg::Strs(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Recorded native call.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    /// Name of the native function.
    pub op: &'static str,
    /// Arguments, without the context handle.
    pub args: Vec<Arg>,
    /// Context handle, for functions bound to a context.
    pub context: Option<ContextHandle>,
}

/// Queued return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Return value of functions returning `bool`.
    Bool(bool),
    /// Return value of functions returning `i32`.
    I32(i32),
    /// Return value of functions returning `u32`.
    U32(u32),
    /// Return value of functions returning a string.
    String(String),
    /// Return value of functions returning bytes.
    Bytes(Vec<u8>),
    /// Return value of functions returning `u32` vectors.
    U32s(Vec<u32>),
    /// Return value of functions returning string vectors.
    Strings(Vec<String>),
    /// Return value of functions returning a sync object.
    Sync(SyncHandle),
    /// Return value of functions returning a context handle.
    Context(ContextHandle),
    /// Return value of the parameter queries.
    Parameter(Parameter),
}

#[derive(Default)]
struct Log {
    calls: Vec<NativeCall>,
    replies: HashMap<&'static str, VecDeque<Reply>>,
    next_id: usize,
}

/// Native engine that records calls.
///
/// Clones share the same log, so a test can keep a clone and inspect it
/// after handing the engine to an isolate.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    log: Rc<RefCell<Log>>,
}

impl RecordingEngine {
    /// Creates an engine with an empty log.
    pub fn new() -> RecordingEngine {
        RecordingEngine::default()
    }

    /// Queues the return value of the next call to `op`.
    pub fn reply(&self, op: &'static str, reply: Reply) {
        self.log
            .borrow_mut()
            .replies
            .entry(op)
            .or_default()
            .push_back(reply);
    }

    /// Returns all the recorded calls.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.log.borrow().calls.clone()
    }

    /// Returns the recorded calls to `op`.
    pub fn calls_to(&self, op: &str) -> Vec<NativeCall> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|call| call.op == op)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.log.borrow().calls.len()
    }

    /// Returns the last recorded call.
    pub fn last(&self) -> Option<NativeCall> {
        self.log.borrow().calls.last().cloned()
    }

    /// Forgets the recorded calls.
    pub fn clear(&self) {
        self.log.borrow_mut().calls.clear();
    }

    pub(super) fn record(
        &self,
        op: &'static str,
        args: Vec<Arg>,
        context: Option<ContextHandle>,
    ) -> Option<Reply> {
        let mut log = self.log.borrow_mut();
        log.calls.push(NativeCall { op, args, context });
        log.replies.get_mut(op).and_then(VecDeque::pop_front)
    }

    fn next_id(&self) -> usize {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        log.next_id
    }
}

/// Conversion of a queued reply into a native return value.
pub trait FromReply: Sized {
    /// Converts `reply`, or makes up a value if there is none.
    fn from_reply(reply: Option<Reply>, engine: &RecordingEngine) -> Self;
}

impl FromReply for bool {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> bool {
        matches!(reply, Some(Reply::Bool(true)))
    }
}

impl FromReply for u32 {
    fn from_reply(reply: Option<Reply>, engine: &RecordingEngine) -> u32 {
        match reply {
            Some(Reply::U32(value)) => value,
            _ => engine.next_id() as u32,
        }
    }
}

impl FromReply for i32 {
    fn from_reply(reply: Option<Reply>, engine: &RecordingEngine) -> i32 {
        match reply {
            Some(Reply::I32(value)) => value,
            _ => engine.next_id() as i32,
        }
    }
}

impl FromReply for String {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> String {
        match reply {
            Some(Reply::String(value)) => value,
            _ => String::new(),
        }
    }
}

impl FromReply for Vec<u8> {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> Vec<u8> {
        match reply {
            Some(Reply::Bytes(value)) => value,
            _ => Vec::new(),
        }
    }
}

impl FromReply for Vec<u32> {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> Vec<u32> {
        match reply {
            Some(Reply::U32s(value)) => value,
            _ => Vec::new(),
        }
    }
}

impl FromReply for Vec<String> {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> Vec<String> {
        match reply {
            Some(Reply::Strings(value)) => value,
            _ => Vec::new(),
        }
    }
}

impl FromReply for SyncHandle {
    fn from_reply(reply: Option<Reply>, engine: &RecordingEngine) -> SyncHandle {
        match reply {
            Some(Reply::Sync(value)) => value,
            _ => SyncHandle(0x1000 + 0x10 * engine.next_id()),
        }
    }
}

impl FromReply for ContextHandle {
    fn from_reply(reply: Option<Reply>, engine: &RecordingEngine) -> ContextHandle {
        match reply {
            Some(Reply::Context(value)) => value,
            _ => ContextHandle(engine.next_id()),
        }
    }
}

impl FromReply for Parameter {
    fn from_reply(reply: Option<Reply>, _: &RecordingEngine) -> Parameter {
        match reply {
            Some(Reply::Parameter(value)) => value,
            _ => Parameter::None,
        }
    }
}

/// Image decoder that records what it decodes.
///
/// Empty inputs fail to decode.
#[derive(Clone, Default)]
pub struct RecordingDecoder {
    loads: Arc<Mutex<Vec<(u32, Vec<u8>)>>>,
}

impl RecordingDecoder {
    /// Creates a decoder with an empty log.
    pub fn new() -> RecordingDecoder {
        RecordingDecoder::default()
    }

    /// Returns the asset handle and the bytes of every successful decode.
    pub fn loads(&self) -> Vec<(u32, Vec<u8>)> {
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ImageDecoder for RecordingDecoder {
    fn load_from_bytes(&self, asset: u32, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            anyhow::bail!("no image data");
        }
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((asset, bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::native::NativeEngine;

    #[test]
    fn records_calls_in_order() {
        let log = RecordingEngine::new();
        let mut engine = log.clone();
        let context = ContextHandle(1);
        engine.webgl2_begin_query(0x8C2F, 3, context);
        engine.webgl2_draw_buffers(&[0x8CE0, 0x8CE1], context);
        assert_eq!(
            log.calls(),
            vec![
                NativeCall {
                    op: "webgl2_begin_query",
                    args: vec![Arg::U32(0x8C2F), Arg::U32(3)],
                    context: Some(context),
                },
                NativeCall {
                    op: "webgl2_draw_buffers",
                    args: vec![Arg::U32s(vec![0x8CE0, 0x8CE1])],
                    context: Some(context),
                },
            ]
        );
    }

    #[test]
    fn queued_replies() {
        let log = RecordingEngine::new();
        let mut engine = log.clone();
        log.reply("webgl2_client_wait_sync", Reply::U32(0x911A));
        let context = ContextHandle(1);
        assert_eq!(
            engine.webgl2_client_wait_sync(SyncHandle(8), 0, 0, context),
            0x911A
        );
        assert!(!engine.webgl2_is_query(1, context));
        let a = engine.webgl2_create_query(context);
        let b = engine.webgl2_create_query(context);
        assert_ne!(a, b);
    }

    #[test]
    fn nan_arguments_compare_equal() {
        assert_eq!(Arg::F32(f32::NAN), Arg::F32(f32::NAN));
        assert_eq!(
            Arg::F32s(vec![1.0, f32::NAN]),
            Arg::F32s(vec![1.0, f32::NAN])
        );
        assert_ne!(Arg::U32(1), Arg::I32(1));
    }

    #[test]
    fn decoder_rejects_empty_input() {
        let decoder = RecordingDecoder::new();
        assert!(decoder.load_from_bytes(1, &[]).is_err());
        decoder.load_from_bytes(2, &[1, 2]).unwrap();
        assert_eq!(decoder.loads(), vec![(2, vec![1, 2])]);
    }
}
