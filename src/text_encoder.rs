//! `TextEncoder` class.

use std::rc::Rc;

use crate::error::{ArgumentError, ScriptError};
use crate::frame::CallFrame;
use crate::handle::Internal;
use crate::isolate::Scope;
use crate::registry::{Template, TemplateBuilder, TemplateKey};
use crate::value::{Object, TypedArray, Value};

const DEFAULT_ENCODING: &str = "utf-8";

fn template(scope: &Scope<'_>) -> Rc<Template> {
    scope.registry().get_or_build(TemplateKey::TextEncoder, || {
        TemplateBuilder::new("TextEncoder")
            .constructor(construct)
            .getter("encoding", encoding)
            .method("encode", encode)
    })
}

fn construct(scope: &Scope<'_>, frame: &mut CallFrame) {
    if !frame.is_construct_call() {
        frame.throw(ScriptError::TypeError(
            "Class constructor TextEncoder cannot be invoked without 'new'".to_string(),
        ));
        return;
    }
    let label = match frame.arg(0) {
        Value::Undefined => DEFAULT_ENCODING.to_string(),
        value => value.to_js_string(),
    };
    let encoder = scope.native().text_encoder_create(&label);
    let object = template(scope).instantiate(Internal::TextEncoder(encoder));
    frame.set_return(object);
}

fn encoder_of(object: &Object) -> Option<u32> {
    match object.internal()? {
        Internal::TextEncoder(encoder) => Some(*encoder),
        _ => None,
    }
}

fn encoding(scope: &Scope<'_>, object: &Object) -> Value {
    encoder_of(object).map_or(Value::Undefined, |encoder| {
        Value::from(scope.native().text_encoder_get_encoding(encoder))
    })
}

fn encode(scope: &Scope<'_>, frame: &mut CallFrame) -> Result<(), ArgumentError> {
    let encoder = frame
        .this()
        .as_object()
        .and_then(encoder_of)
        .ok_or(ArgumentError::WrongReceiver {
            expected: "TextEncoder",
        })?;
    let text = match frame.arg(0) {
        Value::Undefined => String::new(),
        value => value.to_js_string(),
    };
    let bytes = scope.native().text_encoder_encode(encoder, &text);
    frame.set_return(TypedArray::from_slice(&bytes));
    Ok(())
}

/// Installs the `TextEncoder` constructor as a global.
pub(crate) fn install(scope: &Scope<'_>) {
    let constructor = template(scope).constructor().clone();
    scope.set_global("TextEncoder", Value::Function(constructor));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::{Arg, RecordingEngine, Reply};
    use crate::value::ElementKind;

    #[test]
    fn default_encoding() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let scope = isolate.enter();
        install(&scope);
        let constructor = scope.global("TextEncoder");
        let encoder = scope.construct(&constructor, Vec::new()).unwrap().unwrap();
        assert!(scope.instance_of(&encoder, &constructor));
        let call = engine.last().unwrap();
        assert_eq!(call.op, "text_encoder_create");
        assert_eq!(call.args, vec![Arg::Str("utf-8".to_string())]);

        engine.reply("text_encoder_get_encoding", Reply::String("utf-8".to_string()));
        assert_eq!(scope.get(&encoder, "encoding").as_str(), Some("utf-8"));
    }

    #[test]
    fn encode_returns_bytes() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let scope = isolate.enter();
        install(&scope);
        let encoder = scope
            .construct(&scope.global("TextEncoder"), vec![Value::from("utf-8")])
            .unwrap()
            .unwrap();
        engine.reply("text_encoder_encode", Reply::Bytes(b"hi".to_vec()));
        let bytes = scope
            .call_method(&encoder, "encode", vec![Value::from("hi")])
            .unwrap()
            .unwrap();
        let bytes = bytes.as_typed_array().unwrap();
        assert_eq!(bytes.kind(), ElementKind::Uint8);
        assert_eq!(bytes.with_slice::<u8, _>(|b| b.to_vec()), Some(b"hi".to_vec()));

        scope
            .call_method(&encoder, "encode", vec![Value::from(12)])
            .unwrap();
        assert_eq!(engine.last().unwrap().args[1], Arg::Str("12".to_string()));
        scope.call_method(&encoder, "encode", Vec::new()).unwrap();
        assert_eq!(engine.last().unwrap().args[1], Arg::Str(String::new()));
    }

    #[test]
    fn needs_new_and_a_receiver() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let scope = isolate.enter();
        install(&scope);
        assert!(scope
            .call(&scope.global("TextEncoder"), Value::Undefined, Vec::new())
            .is_err());
        let mut frame = CallFrame::new(Value::Object(Object::new()), vec![Value::from("x")]);
        assert_eq!(
            encode(&scope, &mut frame),
            Err(ArgumentError::WrongReceiver {
                expected: "TextEncoder"
            })
        );
        assert_eq!(engine.call_count(), 0);
    }
}
