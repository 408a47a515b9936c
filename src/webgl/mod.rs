//! Rendering contexts.
//!
//! This module contains the rendering context classes
//! (`WebGLRenderingContext` and `WebGL2RenderingContext`) and the factories
//! that script uses to get a context. The forwarders of the context methods
//! are in [`webgl1`] and [`webgl2`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use canvas_json::PowerPreference;

use crate::constants;
use crate::frame::CallFrame;
use crate::handle::{ContextHandle, Internal};
use crate::isolate::Scope;
use crate::native::NativeEngine;
use crate::registry::{Template, TemplateBuilder, TemplateKey};
use crate::value::{Object, Value};

pub mod extensions;
pub mod webgl1;
pub mod webgl2;

/// Name of the global WebGL 2 context factory.
pub const WEBGL2_FACTORY: &str = "__getWebGL2RenderingContext";
/// Name of the global WebGL 1 context factory.
pub const WEBGL_FACTORY: &str = "__getWebGLRenderingContext";

/// WebGL version of a rendering context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ContextVersion {
    /// WebGL 1.
    V1,
    /// WebGL 2.
    V2,
}

impl ContextVersion {
    /// Returns the name of the script class.
    pub fn class_name(&self) -> &'static str {
        match self {
            ContextVersion::V1 => "WebGLRenderingContext",
            ContextVersion::V2 => "WebGL2RenderingContext",
        }
    }

    /// Returns the version string passed to the native engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextVersion::V1 => "v1",
            ContextVersion::V2 => "v2",
        }
    }

    /// Parses a version string.
    pub fn from_name(name: &str) -> Option<ContextVersion> {
        match name {
            "v1" => Some(ContextVersion::V1),
            "v2" => Some(ContextVersion::V2),
            _ => None,
        }
    }
}

/// Native rendering context owned by a context wrapper.
///
/// The context is released with `webgl_destroy` when the last reference to
/// the wrapper goes away.
pub struct ContextState {
    handle: ContextHandle,
    version: ContextVersion,
    native: Weak<RefCell<dyn NativeEngine>>,
}

impl ContextState {
    /// Returns the native handle.
    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    /// Returns the WebGL version.
    pub fn version(&self) -> ContextVersion {
        self.version
    }
}

impl fmt::Debug for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ContextState")
            .field("handle", &self.handle)
            .field("version", &self.version)
            .finish()
    }
}

impl Drop for ContextState {
    fn drop(&mut self) {
        let Some(native) = self.native.upgrade() else {
            return;
        };
        match native.try_borrow_mut() {
            Ok(mut native) => native.webgl_destroy(self.handle),
            Err(_) => tracing::warn!(
                context = ?self.handle,
                "native engine busy; rendering context not released"
            ),
        };
    }
}

/// Returns the template of a rendering context class, building it if needed.
pub(crate) fn context_template(scope: &Scope<'_>, version: ContextVersion) -> Rc<Template> {
    scope
        .registry()
        .get_or_build(TemplateKey::Context(version), || {
            let builder = TemplateBuilder::new(version.class_name())
                .constants(constants::webgl::CONSTANTS)
                .context_methods(webgl1::METHODS)
                .getter("drawingBufferWidth", drawing_buffer_width)
                .getter("drawingBufferHeight", drawing_buffer_height);
            match version {
                ContextVersion::V1 => builder,
                ContextVersion::V2 => builder
                    .constants(constants::webgl2::CONSTANTS)
                    .signed_constants(constants::webgl2::SIGNED_CONSTANTS)
                    .context_methods(webgl2::METHODS),
            }
        })
}

fn context_of(object: &Object) -> Option<&Rc<ContextState>> {
    match object.internal()? {
        Internal::Context(state) => Some(state),
        _ => None,
    }
}

fn drawing_buffer_width(scope: &Scope<'_>, object: &Object) -> Value {
    context_of(object).map_or(Value::Undefined, |state| {
        Value::from(scope.native().webgl_get_drawing_buffer_width(state.handle()))
    })
}

fn drawing_buffer_height(scope: &Scope<'_>, object: &Object) -> Value {
    context_of(object).map_or(Value::Undefined, |state| {
        Value::from(scope.native().webgl_get_drawing_buffer_height(state.handle()))
    })
}

/// Creates a rendering context.
///
/// `options` is the argument given to the factory: an object with an optional
/// `version` string and the `WebGLContextAttributes` members. Attributes that
/// are missing or of the wrong type take the configured defaults. Returns
/// `None` if `options` is not an object or asks for another version.
pub fn create_context(scope: &Scope<'_>, version: ContextVersion, options: &Value) -> Option<Value> {
    let options = options.as_object()?;
    match options.get("version") {
        Value::Undefined => (),
        Value::String(name) if ContextVersion::from_name(&name) == Some(version) => (),
        _ => return None,
    }
    let mut attributes = scope.config().context_defaults.clone();
    let flags = [
        ("alpha", &mut attributes.alpha),
        ("antialias", &mut attributes.antialias),
        ("depth", &mut attributes.depth),
        (
            "failIfMajorPerformanceCaveat",
            &mut attributes.fail_if_major_performance_caveat,
        ),
        ("premultipliedAlpha", &mut attributes.premultiplied_alpha),
        ("preserveDrawingBuffer", &mut attributes.preserve_drawing_buffer),
        ("stencil", &mut attributes.stencil),
        ("desynchronized", &mut attributes.desynchronized),
        ("xrCompatible", &mut attributes.xr_compatible),
    ];
    for (name, flag) in flags {
        if let Some(value) = options.get(name).optional_bool() {
            *flag = value;
        }
    }
    if let Some(preference) = options
        .get("powerPreference")
        .as_str()
        .and_then(PowerPreference::from_name)
    {
        attributes.power_preference = preference;
    }

    let handle = scope.native().webgl_create(
        version.as_str(),
        attributes.alpha,
        attributes.antialias,
        attributes.depth,
        attributes.fail_if_major_performance_caveat,
        attributes.power_preference.as_str(),
        attributes.premultiplied_alpha,
        attributes.preserve_drawing_buffer,
        attributes.stencil,
        attributes.desynchronized,
        attributes.xr_compatible,
    );
    tracing::debug!(context = ?handle, ?version, "created rendering context");
    let state = Rc::new(ContextState {
        handle,
        version,
        native: scope.native_weak(),
    });
    let template = context_template(scope, version);
    Some(Value::Object(template.instantiate(Internal::Context(state))))
}

fn get_webgl2_context(scope: &Scope<'_>, frame: &mut CallFrame) {
    if let Some(context) = create_context(scope, ContextVersion::V2, frame.arg(0)) {
        frame.set_return(context);
    }
}

fn get_webgl_context(scope: &Scope<'_>, frame: &mut CallFrame) {
    if let Some(context) = create_context(scope, ContextVersion::V1, frame.arg(0)) {
        frame.set_return(context);
    }
}

/// Installs the context classes and factories as globals.
pub(crate) fn install(scope: &Scope<'_>) {
    for version in [ContextVersion::V1, ContextVersion::V2] {
        let template = context_template(scope, version);
        scope.set_global(
            version.class_name(),
            Value::Function(template.constructor().clone()),
        );
    }
    scope.set_global(
        WEBGL2_FACTORY,
        Value::Function(crate::value::Function::new(WEBGL2_FACTORY, get_webgl2_context)),
    );
    scope.set_global(
        WEBGL_FACTORY,
        Value::Function(crate::value::Function::new(WEBGL_FACTORY, get_webgl_context)),
    );
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::error::ScriptError;
    use crate::isolate::Isolate;
    use crate::native::recording::{Arg, RecordingEngine};

    /// Creates an installed isolate and a WebGL 2 context.
    pub(crate) fn webgl2(isolate: &Isolate) -> Value {
        let scope = isolate.enter();
        crate::install(&scope);
        create_context(&scope, ContextVersion::V2, &Value::Object(Object::new())).unwrap()
    }

    #[test]
    fn factory_reads_attributes() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let scope = isolate.enter();
        crate::install(&scope);
        let options = Object::with_properties([
            ("version", Value::from("v2")),
            ("antialias", Value::from(false)),
            ("stencil", Value::from(true)),
            // Only real booleans are read.
            ("depth", Value::from(0)),
            ("powerPreference", Value::from("high-performance")),
        ]);
        let context = scope
            .call(&scope.global(WEBGL2_FACTORY), Value::Undefined, vec![Value::Object(options)])
            .unwrap()
            .unwrap();
        assert!(scope.instance_of(&context, &scope.global("WebGL2RenderingContext")));
        assert!(!scope.instance_of(&context, &scope.global("WebGLRenderingContext")));
        let call = engine.last().unwrap();
        assert_eq!(call.op, "webgl_create");
        assert_eq!(call.context, None);
        assert_eq!(
            call.args,
            vec![
                Arg::Str("v2".to_string()),
                Arg::Bool(true),
                Arg::Bool(false),
                Arg::Bool(true),
                Arg::Bool(false),
                Arg::Str("high-performance".to_string()),
                Arg::Bool(true),
                Arg::Bool(false),
                Arg::Bool(true),
                Arg::Bool(false),
                Arg::Bool(false),
            ]
        );
    }

    #[test]
    fn factory_rejects_bad_arguments() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let scope = isolate.enter();
        crate::install(&scope);
        let factory = scope.global(WEBGL2_FACTORY);
        for arg in [
            Value::Undefined,
            Value::from("v2"),
            Value::Object(Object::with_properties([("version", Value::from("v1"))])),
            Value::Object(Object::with_properties([("version", Value::from(2))])),
        ] {
            let result = scope.call(&factory, Value::Undefined, vec![arg]).unwrap();
            assert!(result.is_none());
        }
        assert_eq!(engine.call_count(), 0);
        let result = scope
            .call(
                &scope.global(WEBGL_FACTORY),
                Value::Undefined,
                vec![Value::Object(Object::with_properties([(
                    "version",
                    Value::from("v1"),
                )]))],
            )
            .unwrap()
            .unwrap();
        assert!(scope.instance_of(&result, &scope.global("WebGLRenderingContext")));
    }

    #[test]
    fn configured_defaults() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::builder(engine.clone())
            .config_json(r#"{"contextDefaults": {"stencil": true, "alpha": false}}"#)
            .unwrap()
            .build();
        let scope = isolate.enter();
        let context =
            create_context(&scope, ContextVersion::V1, &Value::Object(Object::new())).unwrap();
        let args = engine.last().unwrap().args;
        assert_eq!(args[0], Arg::Str("v1".to_string()));
        assert_eq!(args[1], Arg::Bool(false));
        assert_eq!(args[8], Arg::Bool(true));

        drop(context);
        assert_eq!(engine.last().unwrap().op, "webgl_destroy");
        assert_eq!(engine.calls_to("webgl_create").len(), 1);
    }

    #[test]
    fn context_constructors_are_illegal() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        crate::install(&scope);
        for name in ["WebGL2RenderingContext", "WebGLRenderingContext"] {
            assert_eq!(
                scope.construct(&scope.global(name), Vec::new()).unwrap_err(),
                ScriptError::IllegalConstructor
            );
        }
    }

    #[test]
    fn constants_and_getters() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        let constructor = scope.global("WebGL2RenderingContext");
        assert!(scope
            .get(&constructor, "ANY_SAMPLES_PASSED")
            .strict_equals(&Value::from(0x8C2F)));
        assert!(scope
            .get(&context, "TIMEOUT_IGNORED")
            .strict_equals(&Value::from(-1)));
        assert!(scope
            .get(&context, "COLOR_BUFFER_BIT")
            .strict_equals(&Value::from(0x4000)));
        let webgl1 = scope.global("WebGLRenderingContext");
        assert!(matches!(
            scope.get(&webgl1, "ANY_SAMPLES_PASSED"),
            Value::Undefined
        ));
        engine.reply(
            "webgl_get_drawing_buffer_width",
            crate::native::recording::Reply::I32(300),
        );
        assert!(scope
            .get(&context, "drawingBufferWidth")
            .strict_equals(&Value::from(300)));
    }

    #[test]
    fn context_released_on_last_reference() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let handle = engine.calls_to("webgl_create").len();
        assert_eq!(handle, 1);
        let copy = context.clone();
        drop(context);
        assert!(engine.calls_to("webgl_destroy").is_empty());
        drop(copy);
        assert_eq!(engine.calls_to("webgl_destroy").len(), 1);
    }
}
