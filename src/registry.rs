//! Class template registry.
//!
//! Each isolate owns one [`Registry`]. A class template (constructor,
//! constants, methods and getters of a script class) is built the first time
//! it is needed and then reused for the lifetime of the isolate, so that the
//! constructor identity that script observes never changes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dispatch::Invocation;
use crate::error::{ArgumentError, ScriptError};
use crate::frame::CallFrame;
use crate::handle::{Internal, ObjectKind};
use crate::isolate::{IsolateId, Scope};
use crate::value::{Function, Object, Value};
use crate::webgl::ContextVersion;

/// Class tag.
///
/// Wrapper objects carry the class tag of the template that created them.
/// Tags are unique across isolates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClassId {
    isolate: IsolateId,
    index: u32,
}

/// Key of a template in the registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TemplateKey {
    /// Rendering context class.
    Context(ContextVersion),
    /// GPU object wrapper class.
    Object(ObjectKind),
    /// `TextEncoder`.
    TextEncoder,
    /// `ImageAsset`.
    ImageAsset,
    /// `WEBGL_draw_buffers` extension object.
    DrawBuffers,
}

/// Method that does not need a rendering context.
pub type Method = fn(&Scope<'_>, &mut CallFrame) -> Result<(), ArgumentError>;

/// Method of a rendering context class.
///
/// These run with the receiver already resolved to its context.
pub type ContextMethod = fn(&mut Invocation<'_, '_>) -> Result<(), ArgumentError>;

/// Property getter.
pub type Getter = fn(&Scope<'_>, &Object) -> Value;

/// Entry of the method table of a template.
#[derive(Copy, Clone)]
pub enum Callable {
    /// Method that does not need a rendering context.
    Plain(Method),
    /// Method of a rendering context class.
    Context(ContextMethod),
}

/// Builder for a [`Template`].
pub struct TemplateBuilder {
    name: &'static str,
    constructor: Option<fn(&Scope<'_>, &mut CallFrame)>,
    constants: HashMap<&'static str, f64>,
    methods: HashMap<&'static str, Callable>,
    getters: HashMap<&'static str, Getter>,
}

impl TemplateBuilder {
    /// Creates a builder for a class called `name`.
    ///
    /// Unless [`TemplateBuilder::constructor`] is used, the class constructor
    /// throws "Illegal constructor".
    pub fn new(name: &'static str) -> TemplateBuilder {
        TemplateBuilder {
            name,
            constructor: None,
            constants: HashMap::new(),
            methods: HashMap::new(),
            getters: HashMap::new(),
        }
    }

    /// Sets the body of the class constructor.
    pub fn constructor(mut self, body: fn(&Scope<'_>, &mut CallFrame)) -> Self {
        self.constructor = Some(body);
        self
    }

    /// Adds unsigned constants.
    pub fn constants(mut self, table: &[(&'static str, u32)]) -> Self {
        self.constants
            .extend(table.iter().map(|&(name, value)| (name, f64::from(value))));
        self
    }

    /// Adds signed constants.
    pub fn signed_constants(mut self, table: &[(&'static str, i32)]) -> Self {
        self.constants
            .extend(table.iter().map(|&(name, value)| (name, f64::from(value))));
        self
    }

    /// Adds a method.
    pub fn method(mut self, name: &'static str, method: Method) -> Self {
        self.methods.insert(name, Callable::Plain(method));
        self
    }

    /// Adds the methods of a rendering context class.
    pub fn context_methods(mut self, table: &[(&'static str, ContextMethod)]) -> Self {
        self.methods.extend(
            table
                .iter()
                .map(|&(name, method)| (name, Callable::Context(method))),
        );
        self
    }

    /// Adds a getter.
    pub fn getter(mut self, name: &'static str, getter: Getter) -> Self {
        self.getters.insert(name, getter);
        self
    }

    fn build(self, class: ClassId) -> Template {
        let constructor = match self.constructor {
            Some(body) => Function::constructor(self.name, class, body),
            None => Function::constructor(self.name, class, |_, frame| {
                frame.throw(ScriptError::IllegalConstructor)
            }),
        };
        Template {
            class,
            name: self.name,
            constructor,
            constants: self.constants,
            methods: self.methods,
            getters: self.getters,
        }
    }
}

/// Class template.
pub struct Template {
    class: ClassId,
    name: &'static str,
    constructor: Function,
    constants: HashMap<&'static str, f64>,
    methods: HashMap<&'static str, Callable>,
    getters: HashMap<&'static str, Getter>,
}

impl Template {
    /// Returns the class tag of the instances.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Returns the name of the class.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the constructor function.
    pub fn constructor(&self) -> &Function {
        &self.constructor
    }

    /// Looks up a constant.
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    /// Returns the number of constants.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Looks up a method.
    pub fn method(&self, name: &str) -> Option<Callable> {
        self.methods.get(name).copied()
    }

    /// Returns `true` if the class has a method called `name`.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Looks up a getter.
    pub fn getter(&self, name: &str) -> Option<Getter> {
        self.getters.get(name).copied()
    }

    /// Creates an instance with the given internal slot.
    pub fn instantiate(&self, internal: Internal) -> Object {
        Object::wrapper(self.class, internal)
    }
}

/// Template registry of an isolate.
pub struct Registry {
    isolate: IsolateId,
    templates: RefCell<HashMap<TemplateKey, Rc<Template>>>,
    classes: RefCell<Vec<Rc<Template>>>,
}

impl Registry {
    pub(crate) fn new(isolate: IsolateId) -> Registry {
        Registry {
            isolate,
            templates: RefCell::new(HashMap::new()),
            classes: RefCell::new(Vec::new()),
        }
    }

    /// Returns the template of `key`, if it has been built.
    pub fn get(&self, key: TemplateKey) -> Option<Rc<Template>> {
        self.templates.borrow().get(&key).cloned()
    }

    /// Returns the template of `key`, building it with `build` if this is the
    /// first time that it is requested.
    pub fn get_or_build(
        &self,
        key: TemplateKey,
        build: impl FnOnce() -> TemplateBuilder,
    ) -> Rc<Template> {
        if let Some(template) = self.get(key) {
            return template;
        }
        let builder = build();
        let mut classes = self.classes.borrow_mut();
        let class = ClassId {
            isolate: self.isolate,
            index: classes.len() as u32,
        };
        let template = Rc::new(builder.build(class));
        classes.push(Rc::clone(&template));
        self.templates.borrow_mut().insert(key, Rc::clone(&template));
        tracing::debug!(
            isolate = ?self.isolate,
            class = template.name(),
            constants = template.constant_count(),
            "built class template"
        );
        template
    }

    /// Returns the template of a class tag.
    ///
    /// Tags issued by another isolate give `None`.
    pub fn template_of(&self, class: ClassId) -> Option<Rc<Template>> {
        if class.isolate != self.isolate {
            return None;
        }
        self.classes.borrow().get(class.index as usize).cloned()
    }

    /// Returns the number of templates built so far.
    pub fn len(&self) -> usize {
        self.classes.borrow().len()
    }

    /// Returns `true` if no template has been built.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&self) {
        self.templates.borrow_mut().clear();
        self.classes.borrow_mut().clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::RecordingEngine;

    #[test]
    fn builds_once() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let registry = scope.registry();
        let mut builds = 0;
        let first = registry.get_or_build(TemplateKey::TextEncoder, || {
            builds += 1;
            TemplateBuilder::new("TextEncoder")
        });
        let second = registry.get_or_build(TemplateKey::TextEncoder, || {
            builds += 1;
            TemplateBuilder::new("TextEncoder")
        });
        assert_eq!(builds, 1);
        assert!(Rc::ptr_eq(&first, &second));
        assert!(first.constructor().ptr_eq(second.constructor()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn default_constructor_is_illegal() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let template = scope
            .registry()
            .get_or_build(TemplateKey::Object(ObjectKind::Query), || {
                TemplateBuilder::new("WebGLQuery")
            });
        let mut frame = CallFrame::construct(Vec::new());
        template.constructor().call(&scope, &mut frame);
        assert_eq!(frame.exception(), Some(&ScriptError::IllegalConstructor));
    }

    #[test]
    fn constants_and_lookup() {
        let isolate = Isolate::new(RecordingEngine::new());
        let scope = isolate.enter();
        let template = scope
            .registry()
            .get_or_build(TemplateKey::ImageAsset, || {
                TemplateBuilder::new("ImageAsset")
                    .constants(&[("ONE", 1)])
                    .signed_constants(&[("MINUS_ONE", -1)])
            });
        assert_eq!(template.constant("ONE"), Some(1.0));
        assert_eq!(template.constant("MINUS_ONE"), Some(-1.0));
        assert_eq!(template.constant("TWO"), None);
        let found = scope.registry().template_of(template.class()).unwrap();
        assert_eq!(found.name(), "ImageAsset");
    }

    #[test]
    fn classes_are_per_isolate() {
        let first = Isolate::new(RecordingEngine::new());
        let second = Isolate::new(RecordingEngine::new());
        let class = first
            .enter()
            .registry()
            .get_or_build(TemplateKey::TextEncoder, || TemplateBuilder::new("TextEncoder"))
            .class();
        assert!(second.enter().registry().template_of(class).is_none());
    }
}
