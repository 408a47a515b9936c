//! WebGL extensions.
//!
//! `getExtension` enables an extension in the native engine and returns its
//! extension object. `WEBGL_draw_buffers` is the only extension object with
//! members. Any other extension that the engine supports gives an object with
//! no members, and unsupported extensions give `null`.
//!
//! Extension objects keep their rendering context alive, as the methods of
//! `WEBGL_draw_buffers` are forwarded to it.

use std::rc::Rc;

use crate::constants;
use crate::dispatch::{vector_forwarders, Invocation};
use crate::error::ArgumentError;
use crate::handle::Internal;
use crate::isolate::Scope;
use crate::registry::{ContextMethod, Template, TemplateBuilder, TemplateKey};
use crate::value::{Object, Value};

/// Name of the draw buffers extension.
pub const DRAW_BUFFERS: &str = "WEBGL_draw_buffers";

vector_forwarders! {
    draw_buffers_webgl => webgl2_draw_buffers([u32]);
}

const DRAW_BUFFERS_METHODS: &[(&str, ContextMethod)] = &[("drawBuffersWEBGL", draw_buffers_webgl)];

fn draw_buffers_template(scope: &Scope<'_>) -> Rc<Template> {
    scope.registry().get_or_build(TemplateKey::DrawBuffers, || {
        TemplateBuilder::new(DRAW_BUFFERS)
            .constants(constants::webgl_draw_buffers::CONSTANTS)
            .context_methods(DRAW_BUFFERS_METHODS)
    })
}

pub(crate) fn get_extension(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(1)?;
    let name = inv.cursor().string()?;
    let context = inv.context();
    if !inv.native().webgl_get_extension(&name, context) {
        tracing::debug!(extension = %name, ?context, "extension not supported");
        inv.ret(Value::Null);
        return Ok(());
    }
    let object = match name.as_str() {
        DRAW_BUFFERS => draw_buffers_template(inv.scope())
            .instantiate(Internal::Context(Rc::clone(inv.state()))),
        _ => Object::new(),
    };
    inv.ret(Value::Object(object));
    Ok(())
}

pub(crate) fn get_supported_extensions(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    let context = inv.context();
    let names = inv.native().webgl_get_supported_extensions(context);
    inv.ret(Value::array(names.into_iter().map(Value::from)));
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::{Arg, RecordingEngine, Reply};
    use crate::value::{Array, TypedArray};
    use crate::webgl::{create_context, ContextVersion};

    fn webgl1(isolate: &Isolate) -> Value {
        let scope = isolate.enter();
        crate::install(&scope);
        create_context(&scope, ContextVersion::V1, &Value::Object(Object::new())).unwrap()
    }

    #[test]
    fn supported_extensions() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl1(&isolate);
        let scope = isolate.enter();
        engine.reply(
            "webgl_get_supported_extensions",
            Reply::Strings(vec![DRAW_BUFFERS.to_string(), "OES_vertex_array_object".to_string()]),
        );
        let names = scope
            .call_method(&context, "getSupportedExtensions", Vec::new())
            .unwrap()
            .unwrap();
        let names = names.as_array().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(0).unwrap().as_str(), Some(DRAW_BUFFERS));
        assert_eq!(names.get(1).unwrap().as_str(), Some("OES_vertex_array_object"));
    }

    #[test]
    fn unsupported_extension_is_null() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl1(&isolate);
        let scope = isolate.enter();
        engine.clear();
        let extension = scope
            .call_method(&context, "getExtension", vec![Value::from("WEBGL_lose_context")])
            .unwrap()
            .unwrap();
        assert!(matches!(extension, Value::Null));
        let call = engine.last().unwrap();
        assert_eq!(call.op, "webgl_get_extension");
        assert_eq!(call.args, vec![Arg::Str("WEBGL_lose_context".to_string())]);

        engine.reply("webgl_get_extension", Reply::Bool(true));
        let extension = scope
            .call_method(&context, "getExtension", vec![Value::from("OES_element_index_uint")])
            .unwrap()
            .unwrap();
        assert!(extension.as_object().unwrap().class().is_none());
    }

    #[test]
    fn draw_buffers_extension() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl1(&isolate);
        let scope = isolate.enter();
        engine.reply("webgl_get_extension", Reply::Bool(true));
        let extension = scope
            .call_method(&context, "getExtension", vec![Value::from(DRAW_BUFFERS)])
            .unwrap()
            .unwrap();
        assert!(scope
            .get(&extension, "COLOR_ATTACHMENT1_WEBGL")
            .strict_equals(&Value::from(0x8CE1)));
        assert!(scope
            .get(&extension, "MAX_DRAW_BUFFERS_WEBGL")
            .strict_equals(&Value::from(0x8824)));

        engine.clear();
        scope
            .call_method(
                &extension,
                "drawBuffersWEBGL",
                vec![Value::Array(Array::from_values(
                    [0x8CE0, 0x8CE1].map(Value::from),
                ))],
            )
            .unwrap();
        scope
            .call_method(
                &extension,
                "drawBuffersWEBGL",
                vec![Value::from(TypedArray::from_slice(&[0x8CE0u32]))],
            )
            .unwrap();
        let calls = engine.calls_to("webgl2_draw_buffers");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec![Arg::U32s(vec![0x8CE0, 0x8CE1])]);
        assert_eq!(calls[1].args, vec![Arg::U32s(vec![0x8CE0])]);

        let handle = context
            .as_object()
            .and_then(Object::internal)
            .and_then(|internal| match internal {
                Internal::Context(state) => Some(state.handle()),
                _ => None,
            });
        assert_eq!(calls[0].context, handle);

        scope
            .call_method(&extension, "drawBuffersWEBGL", vec![Value::from(5)])
            .unwrap();
        assert_eq!(engine.calls_to("webgl2_draw_buffers").len(), 2);
    }

    #[test]
    fn extension_keeps_context_alive() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl1(&isolate);
        let scope = isolate.enter();
        engine.reply("webgl_get_extension", Reply::Bool(true));
        let extension = scope
            .call_method(&context, "getExtension", vec![Value::from(DRAW_BUFFERS)])
            .unwrap()
            .unwrap();
        drop(context);
        assert!(engine.calls_to("webgl_destroy").is_empty());
        drop(extension);
        assert_eq!(engine.calls_to("webgl_destroy").len(), 1);
    }
}
