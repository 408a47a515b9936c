//! canvas-bridge marshals commands from a scripting engine to a native WebGL
//! engine.
//!
//! Script code sees the usual WebGL API: `WebGLRenderingContext` and
//! `WebGL2RenderingContext` objects with their constants and methods, and the
//! wrapper classes of the GPU objects (`WebGLBuffer`, `WebGLQuery`, etc.). Each
//! method call is validated, its arguments are converted to native values and
//! exactly one call is made into a [`NativeEngine`](native::NativeEngine).
//! Calls with malformed arguments never reach the native engine.
//!
//! The bridge also provides `TextEncoder`, `ImageAsset` and
//! `createImageBitmap`, which the native engine backs.
//!
//! # Usage
//!
//! An embedder creates an [`Isolate`] for each scripting context, enters it
//! and installs the bridge globals with [`install`]. The context factories
//! `__getWebGL2RenderingContext` and `__getWebGLRenderingContext` are then
//! available to script. Asynchronous work posts completions that the embedder
//! resolves with [`Isolate::run_pending`] on the engine thread.

#![warn(missing_docs)]

use crate::handle::ObjectKind;
use crate::value::Value;

pub use crate::error::{ArgumentError, ScriptError};
pub use crate::isolate::{Completion, Isolate, IsolateBuilder, IsolateHandle, Scope};
pub use canvas_json::{BridgeConfig, InvalidArgumentPolicy};

pub mod coerce;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod handle;
pub mod image_asset;
pub mod isolate;
pub mod native;
pub mod registry;
pub mod text_encoder;
pub mod value;
pub mod webgl;

/// Installs the bridge globals in an isolate.
///
/// This installs the rendering context classes and factories, the GPU object
/// wrapper classes, `TextEncoder`, `ImageAsset` and `createImageBitmap`.
/// Installing more than once is harmless: every class template is built only
/// once per isolate, so the constructors keep their identity.
#[tracing::instrument(level = "debug", skip_all, fields(isolate = ?scope.isolate().id()))]
pub fn install(scope: &Scope<'_>) {
    webgl::install(scope);
    for kind in ObjectKind::ALL {
        let template = handle::object_template(scope, kind);
        scope.set_global(
            kind.class_name(),
            Value::Function(template.constructor().clone()),
        );
    }
    text_encoder::install(scope);
    image_asset::install(scope);
    tracing::debug!(templates = scope.registry().len(), "bridge installed");
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::native::recording::RecordingEngine;

    /// Prints the traces of a test, filtered with `RUST_LOG`.
    pub(crate) fn trace() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn install_is_idempotent() {
        trace();
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        install(&scope);
        let templates = scope.registry().len();
        let constructor = scope.global("WebGL2RenderingContext");
        let context = webgl::create_context(
            &scope,
            webgl::ContextVersion::V2,
            &Value::Object(value::Object::new()),
        )
        .unwrap();
        install(&scope);
        assert_eq!(scope.registry().len(), templates);
        let again = scope.global("WebGL2RenderingContext");
        assert!(constructor.strict_equals(&again));
        assert!(scope.instance_of(&context, &again));
    }

    #[test]
    fn wrapper_classes_are_installed() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        install(&scope);
        for kind in ObjectKind::ALL {
            let constructor = scope.global(kind.class_name());
            assert_eq!(
                scope.construct(&constructor, Vec::new()).unwrap_err(),
                ScriptError::IllegalConstructor
            );
        }
        for name in ["TextEncoder", "ImageAsset", "createImageBitmap"] {
            assert!(scope.global(name).as_function().is_some(), "{name}");
        }
    }

    #[test]
    fn isolates_do_not_share_classes() {
        let engine = RecordingEngine::new();
        let first = Isolate::new(engine.clone());
        let second = Isolate::new(engine.clone());
        let buffer = {
            let context = webgl::test::webgl2(&first);
            let scope = first.enter();
            scope
                .call_method(&context, "createBuffer", Vec::new())
                .unwrap()
                .unwrap()
        };
        let context = webgl::test::webgl2(&second);
        let scope = second.enter();
        engine.clear();
        scope
            .call_method(&context, "bindBuffer", vec![Value::from(0x8892), buffer])
            .unwrap();
        assert_eq!(engine.call_count(), 0);
    }
}
