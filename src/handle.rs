//! GPU object handles.
//!
//! Every GPU object that the native engine hands out is wrapped in a script
//! object of one of the classes in [`ObjectKind`]. The wrapper keeps the
//! native handle in its internal slot, and the forwarders get it back with
//! [`resolve`], which checks that the argument really is a wrapper of the
//! expected class.

use std::rc::Rc;

use crate::isolate::Scope;
use crate::registry::{TemplateBuilder, TemplateKey};
use crate::value::{Object, Value};
use crate::webgl::ContextState;

/// Class of a GPU object wrapper.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    /// `WebGLBuffer`.
    Buffer,
    /// `WebGLFramebuffer`.
    Framebuffer,
    /// `WebGLProgram`.
    Program,
    /// `WebGLRenderbuffer`.
    Renderbuffer,
    /// `WebGLShader`.
    Shader,
    /// `WebGLTexture`.
    Texture,
    /// `WebGLUniformLocation`.
    UniformLocation,
    /// `WebGLQuery`.
    Query,
    /// `WebGLSampler`.
    Sampler,
    /// `WebGLSync`.
    Sync,
    /// `WebGLTransformFeedback`.
    TransformFeedback,
    /// `WebGLVertexArrayObject`.
    VertexArray,
}

impl ObjectKind {
    /// All the wrapper classes.
    pub const ALL: [ObjectKind; 12] = [
        ObjectKind::Buffer,
        ObjectKind::Framebuffer,
        ObjectKind::Program,
        ObjectKind::Renderbuffer,
        ObjectKind::Shader,
        ObjectKind::Texture,
        ObjectKind::UniformLocation,
        ObjectKind::Query,
        ObjectKind::Sampler,
        ObjectKind::Sync,
        ObjectKind::TransformFeedback,
        ObjectKind::VertexArray,
    ];

    /// Returns the name of the script class.
    pub fn class_name(&self) -> &'static str {
        match self {
            ObjectKind::Buffer => "WebGLBuffer",
            ObjectKind::Framebuffer => "WebGLFramebuffer",
            ObjectKind::Program => "WebGLProgram",
            ObjectKind::Renderbuffer => "WebGLRenderbuffer",
            ObjectKind::Shader => "WebGLShader",
            ObjectKind::Texture => "WebGLTexture",
            ObjectKind::UniformLocation => "WebGLUniformLocation",
            ObjectKind::Query => "WebGLQuery",
            ObjectKind::Sampler => "WebGLSampler",
            ObjectKind::Sync => "WebGLSync",
            ObjectKind::TransformFeedback => "WebGLTransformFeedback",
            ObjectKind::VertexArray => "WebGLVertexArrayObject",
        }
    }
}

/// Pointer to a native sync object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SyncHandle(pub usize);

/// Handle of a native rendering context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ContextHandle(pub usize);

/// Raw native handle.
///
/// The bridge never interprets these. It only stores them and passes them
/// back to the native engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Handle {
    /// Unsigned object name.
    Index(u32),
    /// Signed uniform location.
    Location(i32),
    /// Pointer-sized sync handle.
    Pointer(SyncHandle),
}

/// GPU object, as stored in the internal slot of a wrapper.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GlObject {
    /// `WebGLBuffer`.
    Buffer(u32),
    /// `WebGLFramebuffer`.
    Framebuffer(u32),
    /// `WebGLProgram`.
    Program(u32),
    /// `WebGLRenderbuffer`.
    Renderbuffer(u32),
    /// `WebGLShader`.
    Shader(u32),
    /// `WebGLTexture`.
    Texture(u32),
    /// `WebGLUniformLocation`.
    UniformLocation(i32),
    /// `WebGLQuery`.
    Query(u32),
    /// `WebGLSampler`.
    Sampler(u32),
    /// `WebGLSync`.
    Sync(SyncHandle),
    /// `WebGLTransformFeedback`.
    TransformFeedback(u32),
    /// `WebGLVertexArrayObject`.
    VertexArray(u32),
}

impl GlObject {
    /// Builds an object of a kind whose handle is an unsigned name.
    ///
    /// Returns `None` for uniform locations and sync objects.
    pub fn from_index(kind: ObjectKind, index: u32) -> Option<GlObject> {
        Some(match kind {
            ObjectKind::Buffer => GlObject::Buffer(index),
            ObjectKind::Framebuffer => GlObject::Framebuffer(index),
            ObjectKind::Program => GlObject::Program(index),
            ObjectKind::Renderbuffer => GlObject::Renderbuffer(index),
            ObjectKind::Shader => GlObject::Shader(index),
            ObjectKind::Texture => GlObject::Texture(index),
            ObjectKind::Query => GlObject::Query(index),
            ObjectKind::Sampler => GlObject::Sampler(index),
            ObjectKind::TransformFeedback => GlObject::TransformFeedback(index),
            ObjectKind::VertexArray => GlObject::VertexArray(index),
            ObjectKind::UniformLocation | ObjectKind::Sync => return None,
        })
    }

    /// Returns the wrapper class of the object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            GlObject::Buffer(_) => ObjectKind::Buffer,
            GlObject::Framebuffer(_) => ObjectKind::Framebuffer,
            GlObject::Program(_) => ObjectKind::Program,
            GlObject::Renderbuffer(_) => ObjectKind::Renderbuffer,
            GlObject::Shader(_) => ObjectKind::Shader,
            GlObject::Texture(_) => ObjectKind::Texture,
            GlObject::UniformLocation(_) => ObjectKind::UniformLocation,
            GlObject::Query(_) => ObjectKind::Query,
            GlObject::Sampler(_) => ObjectKind::Sampler,
            GlObject::Sync(_) => ObjectKind::Sync,
            GlObject::TransformFeedback(_) => ObjectKind::TransformFeedback,
            GlObject::VertexArray(_) => ObjectKind::VertexArray,
        }
    }

    /// Returns the raw native handle.
    pub fn handle(&self) -> Handle {
        match *self {
            GlObject::UniformLocation(location) => Handle::Location(location),
            GlObject::Sync(sync) => Handle::Pointer(sync),
            GlObject::Buffer(index)
            | GlObject::Framebuffer(index)
            | GlObject::Program(index)
            | GlObject::Renderbuffer(index)
            | GlObject::Shader(index)
            | GlObject::Texture(index)
            | GlObject::Query(index)
            | GlObject::Sampler(index)
            | GlObject::TransformFeedback(index)
            | GlObject::VertexArray(index) => Handle::Index(index),
        }
    }

    /// Returns the unsigned object name, or 0 for kinds that do not have one.
    pub fn index(&self) -> u32 {
        match self.handle() {
            Handle::Index(index) => index,
            Handle::Location(_) | Handle::Pointer(_) => 0,
        }
    }
}

/// Contents of the internal slot of a wrapper object.
#[derive(Debug, Clone)]
pub enum Internal {
    /// GPU object.
    Gl(GlObject),
    /// Rendering context.
    Context(Rc<ContextState>),
    /// Text encoder handle.
    TextEncoder(u32),
    /// Image asset handle.
    ImageAsset(u32),
}

/// Returns the wrapper class template of `kind`, building it if needed.
pub(crate) fn object_template(scope: &Scope<'_>, kind: ObjectKind) -> Rc<crate::registry::Template> {
    scope
        .registry()
        .get_or_build(TemplateKey::Object(kind), || {
            TemplateBuilder::new(kind.class_name())
        })
}

/// Wraps a GPU object in a script object of its class.
pub fn wrap(scope: &Scope<'_>, object: GlObject) -> Value {
    let template = object_template(scope, object.kind());
    Value::Object(Object::wrapper(template.class(), Internal::Gl(object)))
}

/// Gets the GPU object wrapped by `value`.
///
/// Returns `None` unless `value` is a wrapper created by this isolate for
/// the class of `kind`.
pub fn resolve(scope: &Scope<'_>, value: &Value, kind: ObjectKind) -> Option<GlObject> {
    let object = value.as_object()?;
    let template = scope.registry().get(TemplateKey::Object(kind))?;
    if object.class()? != template.class() {
        return None;
    }
    match object.internal()? {
        Internal::Gl(gl) if gl.kind() == kind => Some(*gl),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::RecordingEngine;

    #[test]
    fn handles() {
        assert_eq!(GlObject::Query(7).handle(), Handle::Index(7));
        assert_eq!(
            GlObject::UniformLocation(-1).handle(),
            Handle::Location(-1)
        );
        assert_eq!(
            GlObject::Sync(SyncHandle(0xdead0)).handle(),
            Handle::Pointer(SyncHandle(0xdead0))
        );
        assert_eq!(GlObject::from_index(ObjectKind::Sync, 1), None);
        assert_eq!(
            GlObject::from_index(ObjectKind::Sampler, 3).map(|o| o.kind()),
            Some(ObjectKind::Sampler)
        );
    }

    #[test]
    fn resolve_checks_class() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let query = wrap(&scope, GlObject::Query(5));
        assert_eq!(
            resolve(&scope, &query, ObjectKind::Query),
            Some(GlObject::Query(5))
        );
        assert_eq!(resolve(&scope, &query, ObjectKind::Sampler), None);
        assert_eq!(resolve(&scope, &Value::from(5), ObjectKind::Query), None);
        assert_eq!(
            resolve(&scope, &Value::Object(Object::new()), ObjectKind::Query),
            None
        );
    }

    #[test]
    fn wrappers_from_other_isolates_are_rejected() {
        let first = Isolate::new(RecordingEngine::new());
        let second = Isolate::new(RecordingEngine::new());
        let query = wrap(&first.enter(), GlObject::Query(1));
        let scope = second.enter();
        object_template(&scope, ObjectKind::Query);
        assert_eq!(resolve(&scope, &query, ObjectKind::Query), None);
    }

    #[test]
    fn class_names() {
        assert_eq!(ObjectKind::VertexArray.class_name(), "WebGLVertexArrayObject");
        let mut names: Vec<_> = ObjectKind::ALL.iter().map(|k| k.class_name()).collect();
        names.dedup();
        assert_eq!(names.len(), 12);
    }
}
