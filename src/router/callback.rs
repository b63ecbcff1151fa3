//! Handler registry and callback resolution.
//!
//! Routes refer to handlers by a stable identifier: a bare function name or a
//! `Target::method` pair. Identifiers are looked up in [`Handlers`] when a
//! route is dispatched. Handler groups that stand in for separately defined
//! handler sources are loaded as named modules, once.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::Arc,
};

use essentials::debug;

use crate::{
    http::{Reply, Request, Response},
    template::{Param, Transform},
    Error, Result,
};

pub type HandlerFn = dyn Fn(&Request, Response) -> Result<Reply> + Send + Sync + 'static;

/// An invokable route handler.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Request, Response) -> Result<Reply> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn call(&self, request: &Request, response: Response) -> Result<Reply> {
        (self.0)(request, response)
    }
}

impl Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// Reference to a route handler.
#[derive(Debug, Clone)]
pub enum Callback {
    Function(String),
    Method { target: String, method: String },
    /// Already invokable; resolution returns it unchanged.
    Direct(Handler),
}

impl Callback {
    pub fn method(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Method {
            target: target.into(),
            method: method.into(),
        }
    }
}

impl From<&str> for Callback {
    /// `"Target::method"` names a method, anything else a function.
    fn from(reference: &str) -> Self {
        match reference.split_once("::") {
            Some((target, method)) => Self::method(target, method),
            None => Self::Function(reference.to_string()),
        }
    }
}

impl From<String> for Callback {
    fn from(reference: String) -> Self {
        Self::from(reference.as_str())
    }
}

impl From<(&str, &str)> for Callback {
    fn from((target, method): (&str, &str)) -> Self {
        Self::method(target, method)
    }
}

impl From<Handler> for Callback {
    fn from(handler: Handler) -> Self {
        Self::Direct(handler)
    }
}

impl Display for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function(name) => Display::fmt(name, f),
            Self::Method { target, method } => write!(f, "{target}::{method}"),
            Self::Direct(_) => Display::fmt("<handler>", f),
        }
    }
}

type Binder = Arc<dyn Fn() -> Handler + Send + Sync + 'static>;

#[derive(Clone)]
enum Method {
    Static(Handler),
    /// Binds a freshly constructed target instance on every resolution.
    Instance(Binder),
}

impl Method {
    fn bind(&self) -> Handler {
        match self {
            Self::Static(handler) => handler.clone(),
            Self::Instance(bind) => bind(),
        }
    }
}

#[derive(Clone, Default)]
struct TargetEntry {
    methods: HashMap<String, Method>,
}

/// Registers the public methods of one handler target.
pub struct TargetBuilder<'a, T> {
    entry: &'a mut TargetEntry,
    constructor: Arc<dyn Fn() -> T + Send + Sync + 'static>,
}

impl<T: Send + Sync + 'static> TargetBuilder<'_, T> {
    pub fn method<F>(self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&T, &Request, Response) -> Result<Reply> + Send + Sync + 'static,
    {
        let constructor = self.constructor.clone();
        let method = Arc::new(method);
        let bind: Binder = Arc::new(move || {
            let instance = constructor();
            let method = method.clone();
            Handler::new(move |request, response| method(&instance, request, response))
        });
        self.entry.methods.insert(name.into(), Method::Instance(bind));
        self
    }

    pub fn static_method<F>(self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Request, Response) -> Result<Reply> + Send + Sync + 'static,
    {
        self.entry
            .methods
            .insert(name.into(), Method::Static(Handler::new(method)));
        self
    }
}

/// A named group of functions and targets.
#[derive(Clone, Default)]
pub struct Module {
    functions: HashMap<String, Handler>,
    targets: HashMap<String, TargetEntry>,
}

impl Module {
    pub fn function<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Request, Response) -> Result<Reply> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Handler::new(handler));
        self
    }

    /// Starts registering `name`; instance methods run on a fresh value from `constructor`.
    pub fn target<T, C>(&mut self, name: impl Into<String>, constructor: C) -> TargetBuilder<'_, T>
    where
        T: Send + Sync + 'static,
        C: Fn() -> T + Send + Sync + 'static,
    {
        TargetBuilder {
            entry: self.targets.entry(name.into()).or_default(),
            constructor: Arc::new(constructor),
        }
    }

    fn find(&self, callback: &Callback) -> Option<Handler> {
        match callback {
            Callback::Function(name) => self.functions.get(name).cloned(),
            Callback::Method { target, method } => self
                .targets
                .get(target)
                .and_then(|entry| entry.methods.get(method))
                .map(Method::bind),
            Callback::Direct(handler) => Some(handler.clone()),
        }
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of route handlers and named token transforms.
#[derive(Debug, Clone, Default)]
pub struct Handlers {
    root: Module,
    modules: HashMap<String, Module>,
    transforms: HashMap<String, Transform>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Request, Response) -> Result<Reply> + Send + Sync + 'static,
    {
        self.root.function(name, handler);
        self
    }

    pub fn target<T, C>(&mut self, name: impl Into<String>, constructor: C) -> TargetBuilder<'_, T>
    where
        T: Send + Sync + 'static,
        C: Fn() -> T + Send + Sync + 'static,
    {
        self.root.target(name, constructor)
    }

    pub fn transform<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&str) -> Option<Param> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Transform::new(transform));
        self
    }

    pub fn find_transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// Runs `init` for `module` unless it was loaded before.
    pub fn load<F>(&mut self, module: impl Into<String>, init: F) -> &mut Self
    where
        F: FnOnce(&mut Module),
    {
        let module = module.into();
        if self.modules.contains_key(&module) {
            debug!(module = %module, "Handler module already loaded");
            return self;
        }
        let mut handlers = Module::default();
        init(&mut handlers);
        debug!(module = %module, "Handler module loaded");
        self.modules.insert(module, handlers);
        self
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Resolves `callback` to an invokable handler.
    ///
    /// With a `module`, the module must have been loaded and is searched
    /// before the root scope.
    pub fn resolve(&self, callback: &Callback, module: Option<&str>) -> Result<Handler> {
        let scoped = match module {
            Some(name) => Some(
                self.modules
                    .get(name)
                    .ok_or_else(|| Error::CallbackSourceMissing(name.to_string()))?,
            ),
            None => None,
        };
        scoped
            .and_then(|module| module.find(callback))
            .or_else(|| self.root.find(callback))
            .ok_or_else(|| Error::callback(callback.to_string()))
    }
}
