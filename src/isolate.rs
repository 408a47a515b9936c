//! Isolates and scopes.
//!
//! An [`Isolate`] is one scripting context together with everything that the
//! bridge keeps for it: the class template registry, the global bindings, the
//! native engine and the queue of completions posted by worker threads.
//!
//! All the work on engine values is done through a [`Scope`], which holds the
//! execution lock of the isolate for as long as it lives. Engine values are
//! `!Send`, so they cannot be moved to another thread. Worker threads only get
//! an [`IsolateHandle`], which can post a [`Completion`] and nothing else.

use std::cell::{Cell, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use canvas_json::BridgeConfig;
use tokio::sync::mpsc;

use crate::error::{ArgumentError, ScriptError};
use crate::frame::CallFrame;
use crate::native::{ImageDecoder, NativeEngine};
use crate::registry::{Callable, Registry};
use crate::value::{Function, Value};

static NEXT_ISOLATE_ID: AtomicU64 = AtomicU64::new(1);

/// Isolate identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct IsolateId(u64);

/// Identifier of a pending asynchronous request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RequestId(u64);

/// Result of asynchronous work done off the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Request that has completed.
    pub request: RequestId,
    /// Whether the work succeeded.
    pub done: bool,
}

/// Scripting context.
pub struct Isolate {
    id: IsolateId,
    lock: Mutex<()>,
    registry: Registry,
    globals: RefCell<HashMap<String, Value>>,
    native: Rc<RefCell<dyn NativeEngine>>,
    decoder: Option<Arc<dyn ImageDecoder>>,
    runtime: Option<tokio::runtime::Handle>,
    config: BridgeConfig,
    sender: mpsc::UnboundedSender<Completion>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Completion>>,
    pending: RefCell<HashMap<RequestId, Function>>,
    next_request: Cell<u64>,
}

/// Builder for an [`Isolate`].
pub struct IsolateBuilder<E> {
    engine: E,
    config: BridgeConfig,
    decoder: Option<Arc<dyn ImageDecoder>>,
    runtime: Option<tokio::runtime::Handle>,
}

impl<E: NativeEngine + 'static> IsolateBuilder<E> {
    /// Sets the bridge configuration.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bridge configuration from its JSON form.
    pub fn config_json(self, json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(self.config(config))
    }

    /// Sets the decoder used by `ImageAsset.loadFromBytesAsync`.
    ///
    /// Without a decoder, asynchronous loads complete with `false`.
    pub fn decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the tokio runtime used for blocking work.
    ///
    /// By default the runtime of the calling task is used, if there is one.
    pub fn runtime(mut self, runtime: tokio::runtime::Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the isolate.
    pub fn build(self) -> Isolate {
        let id = IsolateId(NEXT_ISOLATE_ID.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        Isolate {
            id,
            lock: Mutex::new(()),
            registry: Registry::new(id),
            globals: RefCell::new(HashMap::new()),
            native: Rc::new(RefCell::new(self.engine)),
            decoder: self.decoder,
            runtime: self.runtime,
            config: self.config,
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            pending: RefCell::new(HashMap::new()),
            next_request: Cell::new(1),
        }
    }
}

impl Isolate {
    /// Creates an isolate with the default configuration.
    pub fn new<E: NativeEngine + 'static>(engine: E) -> Isolate {
        Isolate::builder(engine).build()
    }

    /// Returns a builder for an isolate that uses `engine`.
    pub fn builder<E: NativeEngine + 'static>(engine: E) -> IsolateBuilder<E> {
        IsolateBuilder {
            engine,
            config: BridgeConfig::default(),
            decoder: None,
            runtime: None,
        }
    }

    /// Returns the identity of the isolate.
    pub fn id(&self) -> IsolateId {
        self.id
    }

    /// Returns the configuration of the isolate.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Acquires the execution lock and enters the isolate.
    pub fn enter(&self) -> Scope<'_> {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Scope {
            isolate: self,
            _guard: guard,
        }
    }

    /// Returns a handle that worker threads can use to post completions.
    pub fn handle(&self) -> IsolateHandle {
        IsolateHandle {
            id: self.id,
            sender: self.sender.clone(),
        }
    }

    /// Resolves all the completions that have been posted so far.
    ///
    /// This enters the isolate, so it must not be called while a [`Scope`]
    /// of this isolate is alive. Returns the number of completions resolved.
    #[tracing::instrument(level = "debug", skip_all, fields(isolate = ?self.id))]
    pub fn run_pending(&self) -> usize {
        self.enter().run_pending()
    }

    /// Waits until a completion is posted and returns it.
    ///
    /// The completion must then be resolved with [`Isolate::complete`].
    pub async fn next_completion(&self) -> Option<Completion> {
        self.receiver.lock().await.recv().await
    }

    /// Resolves a completion, calling its script callback.
    pub fn complete(&self, completion: Completion) {
        self.enter().complete(completion)
    }

    /// Returns the number of requests waiting for a completion.
    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Drop for Isolate {
    fn drop(&mut self) {
        // Wrappers that own native objects release them while the engine is
        // still alive.
        self.pending.borrow_mut().clear();
        let globals = std::mem::take(&mut *self.globals.borrow_mut());
        drop(globals);
        self.registry.clear();
        tracing::debug!(isolate = ?self.id, "isolate torn down");
    }
}

/// Handle to an isolate that can be sent to other threads.
#[derive(Clone)]
pub struct IsolateHandle {
    id: IsolateId,
    sender: mpsc::UnboundedSender<Completion>,
}

impl IsolateHandle {
    /// Returns the identity of the isolate.
    pub fn id(&self) -> IsolateId {
        self.id
    }

    /// Posts a completion to the isolate.
    ///
    /// Returns `false` if the isolate no longer exists.
    pub fn post(&self, completion: Completion) -> bool {
        self.sender.send(completion).is_ok()
    }
}

/// Entered isolate.
///
/// The execution lock is released when the scope is dropped.
pub struct Scope<'i> {
    isolate: &'i Isolate,
    _guard: MutexGuard<'i, ()>,
}

impl<'i> Scope<'i> {
    /// Returns the isolate.
    pub fn isolate(&self) -> &'i Isolate {
        self.isolate
    }

    /// Returns the template registry.
    pub fn registry(&self) -> &'i Registry {
        &self.isolate.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &'i BridgeConfig {
        &self.isolate.config
    }

    /// Borrows the native engine.
    ///
    /// # Panics
    ///
    /// Panics if the engine is already borrowed, which can only happen if a
    /// native call re-enters the bridge.
    pub fn native(&self) -> RefMut<'i, dyn NativeEngine + 'static> {
        self.isolate.native.borrow_mut()
    }

    pub(crate) fn native_weak(&self) -> Weak<RefCell<dyn NativeEngine>> {
        Rc::downgrade(&self.isolate.native)
    }

    pub(crate) fn decoder(&self) -> Option<Arc<dyn ImageDecoder>> {
        self.isolate.decoder.clone()
    }

    /// Returns a handle for worker threads.
    pub fn handle(&self) -> IsolateHandle {
        self.isolate.handle()
    }

    /// Reads a global binding.
    pub fn global(&self, name: &str) -> Value {
        self.isolate
            .globals
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Sets a global binding.
    pub fn set_global(&self, name: impl Into<String>, value: Value) {
        self.isolate.globals.borrow_mut().insert(name.into(), value);
    }

    /// Calls a function.
    pub fn call(
        &self,
        function: &Value,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Option<Value>, ScriptError> {
        let function = function
            .as_function()
            .ok_or_else(|| ScriptError::TypeError("value is not a function".to_string()))?;
        let mut frame = CallFrame::new(this, args);
        function.call(self, &mut frame);
        frame.into_result()
    }

    /// Evaluates `new constructor(...args)`.
    pub fn construct(
        &self,
        constructor: &Value,
        args: Vec<Value>,
    ) -> Result<Option<Value>, ScriptError> {
        let constructor = constructor
            .as_function()
            .ok_or_else(|| ScriptError::TypeError("value is not a constructor".to_string()))?;
        let mut frame = CallFrame::construct(args);
        constructor.call(self, &mut frame);
        frame.into_result()
    }

    /// Calls the method `name` of `receiver`.
    ///
    /// Returns `Ok(None)` if the method did not set a return value. Malformed
    /// arguments are handled according to the
    /// [`InvalidArgumentPolicy`](canvas_json::InvalidArgumentPolicy) of the
    /// isolate.
    pub fn call_method(
        &self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, ScriptError> {
        let method = receiver
            .as_object()
            .and_then(|object| object.class())
            .and_then(|class| self.registry().template_of(class))
            .and_then(|template| template.method(name))
            .ok_or_else(|| ScriptError::TypeError(format!("{name} is not a function")))?;
        let mut frame = CallFrame::new(receiver.clone(), args);
        let result = match method {
            Callable::Plain(method) => method(self, &mut frame),
            Callable::Context(method) => crate::dispatch::invoke(self, &mut frame, method),
        };
        if let Err(err) = result {
            self.reject(name, err, &mut frame);
        }
        frame.into_result()
    }

    pub(crate) fn reject(&self, name: &str, err: ArgumentError, frame: &mut CallFrame) {
        tracing::trace!(method = name, reason = %err, "call skipped");
        if self.config().invalid_arguments == canvas_json::InvalidArgumentPolicy::Throw {
            frame.throw(err.into());
        }
    }

    /// Reads the property `name` of `value`.
    ///
    /// This finds own properties, then getters of the class of the object.
    /// On constructors, it finds the constants of the class. Anything else
    /// reads as `undefined`.
    pub fn get(&self, value: &Value, name: &str) -> Value {
        match value {
            Value::Object(object) => {
                if object.has(name) {
                    return object.get(name);
                }
                let Some(template) = object.class().and_then(|c| self.registry().template_of(c))
                else {
                    return Value::Undefined;
                };
                if let Some(getter) = template.getter(name) {
                    getter(self, object)
                } else if let Some(constant) = template.constant(name) {
                    Value::Number(constant)
                } else {
                    Value::Undefined
                }
            }
            Value::Function(function) => function
                .class()
                .and_then(|class| self.registry().template_of(class))
                .and_then(|template| template.constant(name))
                .map_or(Value::Undefined, Value::Number),
            _ => Value::Undefined,
        }
    }

    /// Evaluates `value instanceof constructor`.
    pub fn instance_of(&self, value: &Value, constructor: &Value) -> bool {
        let Some(class) = constructor.as_function().and_then(|f| f.class()) else {
            return false;
        };
        value
            .as_object()
            .and_then(|object| object.class())
            .map_or(false, |c| c == class)
    }

    pub(crate) fn register_pending(&self, callback: Function) -> RequestId {
        let id = self.isolate.next_request.get();
        self.isolate.next_request.set(id + 1);
        let request = RequestId(id);
        self.isolate.pending.borrow_mut().insert(request, callback);
        request
    }

    /// Runs blocking work on the tokio runtime of the isolate.
    ///
    /// Falls back to a new thread if there is no runtime.
    pub(crate) fn spawn_blocking(&self, task: impl FnOnce() + Send + 'static) {
        let runtime = self
            .isolate
            .runtime
            .clone()
            .or_else(|| tokio::runtime::Handle::try_current().ok());
        match runtime {
            Some(runtime) => {
                runtime.spawn_blocking(task);
            }
            None => {
                std::thread::spawn(task);
            }
        }
    }

    /// Resolves the completions posted so far without leaving the scope.
    pub fn run_pending(&self) -> usize {
        let Ok(mut receiver) = self.isolate.receiver.try_lock() else {
            return 0;
        };
        let mut count = 0;
        while let Ok(completion) = receiver.try_recv() {
            self.complete(completion);
            count += 1;
        }
        count
    }

    /// Resolves one completion.
    pub fn complete(&self, completion: Completion) {
        let callback = self.isolate.pending.borrow_mut().remove(&completion.request);
        tracing::trace!(request = ?completion.request, done = completion.done, "completion");
        let Some(callback) = callback else {
            return;
        };
        let mut frame = CallFrame::new(Value::Undefined, vec![Value::from(completion.done)]);
        callback.call(self, &mut frame);
        if let Some(err) = frame.exception() {
            tracing::warn!(request = ?completion.request, %err, "completion callback raised");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::native::recording::RecordingEngine;

    #[test]
    fn isolate_ids_are_unique() {
        let a = Isolate::new(RecordingEngine::new());
        let b = Isolate::new(RecordingEngine::new());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.handle().id(), a.id());
    }

    #[test]
    fn globals() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        assert!(matches!(scope.global("x"), Value::Undefined));
        scope.set_global("x", Value::from(3));
        assert!(scope.global("x").strict_equals(&Value::from(3)));
    }

    #[test]
    fn completion_runs_callback_once() {
        let isolate = Isolate::new(RecordingEngine::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let request = {
            let scope = isolate.enter();
            let seen = Rc::clone(&seen);
            scope.register_pending(Function::new("cb", move |_, frame| {
                seen.borrow_mut().push(frame.arg(0).to_boolean());
            }))
        };
        assert_eq!(isolate.pending_requests(), 1);
        let handle = isolate.handle();
        std::thread::spawn(move || {
            assert!(handle.post(Completion {
                request,
                done: true
            }));
        })
        .join()
        .unwrap();
        assert_eq!(isolate.run_pending(), 1);
        assert_eq!(*seen.borrow(), vec![true]);
        assert_eq!(isolate.pending_requests(), 0);
        isolate.handle().post(Completion {
            request,
            done: true,
        });
        assert_eq!(isolate.run_pending(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn unknown_method_is_type_error() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let err = scope
            .call_method(&Value::from(1), "beginQuery", Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::TypeError("beginQuery is not a function".to_string())
        );
    }

    #[test]
    fn config_from_json() {
        let isolate = Isolate::builder(RecordingEngine::new())
            .config_json(r#"{"invalidArguments": "throw"}"#)
            .unwrap()
            .build();
        assert_eq!(
            isolate.config().invalid_arguments,
            canvas_json::InvalidArgumentPolicy::Throw
        );
    }
}
