//! `ImageAsset` class and `createImageBitmap`.
//!
//! An `ImageAsset` is a decoded image held by the native engine. It can be
//! loaded from encoded bytes either synchronously, on the engine thread, or
//! asynchronously. Asynchronous loads copy the bytes, decode them on a tokio
//! blocking worker with the [`ImageDecoder`](crate::native::ImageDecoder) of
//! the isolate, and post a [`Completion`] that calls the script callback the
//! next time the isolate resolves its pending completions.

use std::rc::Rc;

use anyhow::{Context, Result};
use bytes::Bytes;
use canvas_json::{ColorSpaceConversion, ImageBitmapOptions, PremultiplyAlpha, ResizeQuality};

use crate::coerce::with_bytes;
use crate::error::{ArgumentError, ScriptError};
use crate::frame::CallFrame;
use crate::handle::Internal;
use crate::isolate::{Completion, Scope};
use crate::native::ImageDecoder;
use crate::registry::{Template, TemplateBuilder, TemplateKey};
use crate::value::{Function, Object, Value};

/// Name of the global `createImageBitmap` function.
pub const CREATE_IMAGE_BITMAP: &str = "createImageBitmap";

fn template(scope: &Scope<'_>) -> Rc<Template> {
    scope.registry().get_or_build(TemplateKey::ImageAsset, || {
        TemplateBuilder::new("ImageAsset")
            .constructor(construct)
            .getter("width", get_width)
            .getter("height", get_height)
            .getter("error", get_error)
            .method("loadFromBytes", load_from_bytes)
            .method("loadFromBytesAsync", load_from_bytes_async)
    })
}

fn construct(scope: &Scope<'_>, frame: &mut CallFrame) {
    if !frame.is_construct_call() {
        frame.throw(ScriptError::TypeError(
            "Class constructor ImageAsset cannot be invoked without 'new'".to_string(),
        ));
        return;
    }
    let asset = scope.native().image_asset_create();
    frame.set_return(wrap(scope, asset));
}

fn wrap(scope: &Scope<'_>, asset: u32) -> Value {
    Value::Object(template(scope).instantiate(Internal::ImageAsset(asset)))
}

/// Returns the native handle of an `ImageAsset` created by this isolate.
pub(crate) fn resolve(scope: &Scope<'_>, value: &Value) -> Option<u32> {
    let object = value.as_object()?;
    let template = scope.registry().get(TemplateKey::ImageAsset)?;
    if object.class()? != template.class() {
        return None;
    }
    asset_of(object)
}

fn asset_of(object: &Object) -> Option<u32> {
    match object.internal()? {
        Internal::ImageAsset(asset) => Some(*asset),
        _ => None,
    }
}

fn receiver(frame: &CallFrame) -> Result<u32, ArgumentError> {
    frame
        .this()
        .as_object()
        .and_then(asset_of)
        .ok_or(ArgumentError::WrongReceiver {
            expected: "ImageAsset",
        })
}

macro_rules! getters {
    ($($name:ident),*) => {
        paste::paste! {
            $(
                fn [<get_ $name>](scope: &Scope<'_>, object: &Object) -> Value {
                    asset_of(object).map_or(Value::Undefined, |asset| {
                        Value::from(scope.native().[<image_asset_ $name>](asset))
                    })
                }
            )*
        }
    };
}

getters!(width, height, error);

fn not_bytes(index: usize) -> ArgumentError {
    ArgumentError::WrongType {
        index,
        expected: "a typed array or an array",
    }
}

fn load_from_bytes(scope: &Scope<'_>, frame: &mut CallFrame) -> Result<(), ArgumentError> {
    let asset = receiver(frame)?;
    let done = with_bytes(frame.arg(0), 0, |bytes| {
        scope.native().image_asset_load_from_bytes(asset, bytes)
    })
    .ok_or_else(|| not_bytes(0))?;
    frame.set_return(done);
    Ok(())
}

fn decode(decoder: &dyn ImageDecoder, asset: u32, bytes: &Bytes) -> Result<()> {
    decoder
        .load_from_bytes(asset, bytes)
        .with_context(|| format!("failed to decode {} bytes into image asset {asset}", bytes.len()))
}

fn load_from_bytes_async(scope: &Scope<'_>, frame: &mut CallFrame) -> Result<(), ArgumentError> {
    let asset = receiver(frame)?;
    if frame.len() < 2 {
        return Err(ArgumentError::Arity {
            required: 2,
            supplied: frame.len(),
        });
    }
    let bytes = with_bytes(frame.arg(0), 0, Bytes::copy_from_slice).ok_or_else(|| not_bytes(0))?;
    let callback = frame
        .arg(1)
        .as_function()
        .cloned()
        .ok_or(ArgumentError::WrongType {
            index: 1,
            expected: "a function",
        })?;
    let request = scope.register_pending(callback);
    let handle = scope.handle();
    let Some(decoder) = scope.decoder() else {
        tracing::warn!(asset, "no image decoder; asynchronous load fails");
        handle.post(Completion {
            request,
            done: false,
        });
        return Ok(());
    };
    scope.spawn_blocking(move || {
        let done = match decode(decoder.as_ref(), asset, &bytes) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(asset, "{err:#}");
                false
            }
        };
        if !handle.post(Completion { request, done }) {
            tracing::debug!(asset, "isolate gone before image load completed");
        }
    });
    Ok(())
}

/// Reads an `ImageBitmapOptions` dictionary.
///
/// Members of the wrong type keep their defaults.
fn bitmap_options(value: &Value) -> ImageBitmapOptions {
    let mut options = ImageBitmapOptions::default();
    let Some(object) = value.as_object() else {
        return options;
    };
    if let Some(flip_y) = object.get("flipY").optional_bool() {
        options.flip_y = flip_y;
    }
    if let Some(premultiply) = object
        .get("premultiplyAlpha")
        .as_str()
        .and_then(PremultiplyAlpha::from_name)
    {
        options.premultiply_alpha = premultiply;
    }
    if let Some(conversion) = object
        .get("colorSpaceConversion")
        .as_str()
        .and_then(ColorSpaceConversion::from_name)
    {
        options.color_space_conversion = conversion;
    }
    if let Some(quality) = object
        .get("resizeQuality")
        .as_str()
        .and_then(ResizeQuality::from_name)
    {
        options.resize_quality = quality;
    }
    let number = |name: &str| match object.get(name) {
        Value::Number(n) => Some(n as f32),
        _ => None,
    };
    options.resize_width = number("resizeWidth");
    options.resize_height = number("resizeHeight");
    options
}

fn create_image_bitmap(scope: &Scope<'_>, frame: &mut CallFrame) {
    match image_bitmap(scope, frame) {
        Ok(asset) => frame.set_return(asset),
        Err(err) => scope.reject(CREATE_IMAGE_BITMAP, err, frame),
    }
}

fn image_bitmap(scope: &Scope<'_>, frame: &CallFrame) -> Result<Value, ArgumentError> {
    if frame.is_empty() {
        return Err(ArgumentError::Arity {
            required: 1,
            supplied: 0,
        });
    }
    // The source rectangle is only given as a whole.
    let has_rect = frame.len() >= 5;
    let (sx, sy, sw, sh) = if has_rect {
        (
            frame.arg(1).to_number() as f32,
            frame.arg(2).to_number() as f32,
            frame.arg(3).to_number() as f32,
            frame.arg(4).to_number() as f32,
        )
    } else {
        (0.0, 0.0, 0.0, 0.0)
    };
    let options = bitmap_options(frame.arg(if has_rect { 5 } else { 1 }));
    let resize_width = options.resize_width.unwrap_or(f32::NAN);
    let resize_height = options.resize_height.unwrap_or(f32::NAN);

    let source = frame.arg(0);
    let bitmap = if let Some(asset) = resolve(scope, source) {
        scope.native().image_bitmap_create_from_asset(
            asset,
            has_rect,
            sx,
            sy,
            sw,
            sh,
            options.flip_y,
            options.premultiply_alpha.code(),
            options.color_space_conversion.code(),
            options.resize_quality.code(),
            resize_width,
            resize_height,
        )
    } else {
        with_bytes(source, 0, |bytes| {
            scope.native().image_bitmap_create_from_bytes(
                bytes,
                has_rect,
                sx,
                sy,
                sw,
                sh,
                options.flip_y,
                options.premultiply_alpha.code(),
                options.color_space_conversion.code(),
                options.resize_quality.code(),
                resize_width,
                resize_height,
            )
        })
        .ok_or(ArgumentError::WrongType {
            index: 0,
            expected: "an ImageAsset or a byte array",
        })?
    };
    Ok(wrap(scope, bitmap))
}

/// Installs the `ImageAsset` constructor and `createImageBitmap` as globals.
pub(crate) fn install(scope: &Scope<'_>) {
    let constructor = template(scope).constructor().clone();
    scope.set_global("ImageAsset", Value::Function(constructor));
    scope.set_global(
        CREATE_IMAGE_BITMAP,
        Value::Function(Function::new(CREATE_IMAGE_BITMAP, create_image_bitmap)),
    );
}
