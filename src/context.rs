use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, Weak},
};

use tracing::{error, info, info_span};

use crate::{
    alias::AliasParser,
    any::TypeInfo,
    converter::{Converter, Converters},
    dependency_parser::DependencyParser,
    discovery::ComponentSource,
    errors::BootstrapErrorKind,
    instantiator::InstantiationStrategy,
    naming::BeanNameGenerator,
    processor::{
        BeanPostProcessor, BoxedProcessor, ContextAwareProcessor, DependencyInjectionProcessor, PropertyValueProcessor,
        RegistryAwareProcessor,
    },
    properties::{DefaultPropertyRegistry, PropertyRegistry},
    registry::{Registry, RegistryBuilder},
};

struct ContextInner {
    registry: Registry,
    properties: Arc<dyn PropertyRegistry>,
}

/// Initialized container: the bean registry and the properties the beans were configured with
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    #[inline]
    #[must_use]
    pub fn builder() -> ContextInitializer {
        ContextInitializer::new()
    }

    #[inline]
    #[must_use]
    pub fn get_registry(&self) -> &Registry {
        &self.inner.registry
    }

    #[inline]
    #[must_use]
    pub fn get_property_registry(&self) -> &dyn PropertyRegistry {
        &*self.inner.properties
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("registry", &self.inner.registry).finish_non_exhaustive()
    }
}

/// Handle to a context that doesn't keep it alive
#[derive(Clone)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

impl WeakContext {
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }
}

impl Debug for WeakContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContext").field("alive", &(self.inner.strong_count() > 0)).finish()
    }
}

/// Configuration of a [`Context`].
///
/// Every part has a default, so `ContextInitializer::new().initialize(module_path!())` is a complete setup.
/// Built-in stages (dependency injection, property values, registry and context callbacks)
/// run before the post processors added here.
pub struct ContextInitializer {
    source: Box<dyn ComponentSource>,
    registry: RegistryBuilder,
    post_processors: Vec<BoxedProcessor>,
    properties: Arc<dyn PropertyRegistry>,
    converters: Converters,
}

impl Default for ContextInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextInitializer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: default_source(),
            registry: RegistryBuilder::bare(),
            post_processors: Vec::new(),
            properties: Arc::new(DefaultPropertyRegistry::new()),
            converters: Converters::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn component_source(mut self, source: impl ComponentSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    #[inline]
    #[must_use]
    pub fn name_generator(mut self, generator: impl BeanNameGenerator + 'static) -> Self {
        self.registry = self.registry.name_generator(generator);
        self
    }

    #[inline]
    #[must_use]
    pub fn instantiation_strategy(mut self, strategy: impl InstantiationStrategy + 'static) -> Self {
        self.registry = self.registry.instantiation_strategy(strategy);
        self
    }

    #[inline]
    #[must_use]
    pub fn alias_parser(mut self, parser: impl AliasParser + 'static) -> Self {
        self.registry = self.registry.alias_parser(parser);
        self
    }

    #[inline]
    #[must_use]
    pub fn dependency_parser(mut self, parser: impl DependencyParser + 'static) -> Self {
        self.registry = self.registry.dependency_parser(parser);
        self
    }

    /// Appends a stage after the built-in ones, stages are applied in the order they're added
    #[inline]
    #[must_use]
    pub fn post_processor(mut self, processor: impl BeanPostProcessor + 'static) -> Self {
        self.post_processors.push(Box::new(processor));
        self
    }

    #[inline]
    #[must_use]
    pub fn property_registry(mut self, properties: impl PropertyRegistry + 'static) -> Self {
        self.properties = Arc::new(properties);
        self
    }

    /// Sets the converter used to bind property values of type `T`
    #[inline]
    #[must_use]
    pub fn converter<T: 'static>(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.insert::<T>(converter);
        self
    }

    /// Builds the context and refreshes its registry with the components found under `root`
    ///
    /// # Errors
    /// Returns the first error raised while loading or resolving beans
    pub fn initialize(self, root: &str) -> Result<Context, BootstrapErrorKind> {
        let span = info_span!("initialize", root);
        let _guard = span.enter();

        let Self {
            source,
            registry,
            post_processors,
            properties,
            converters,
        } = self;

        let inner = Arc::new_cyclic(|weak: &Weak<ContextInner>| {
            let mut registry = registry
                .post_processor(DependencyInjectionProcessor)
                .post_processor(PropertyValueProcessor::new(properties.clone(), Arc::new(converters)))
                .post_processor(RegistryAwareProcessor)
                .post_processor(ContextAwareProcessor::new(WeakContext { inner: weak.clone() }));
            for processor in post_processors {
                registry = registry.boxed_post_processor(processor);
            }
            ContextInner {
                registry: registry.build(),
                properties,
            }
        });
        let context = Context { inner };

        let registry = context.get_registry();
        let name = registry.name_generator().generate(&TypeInfo::of::<WeakContext>());
        if let Err(err) = registry.register_singleton(name, context.downgrade()) {
            error!("{}", err);
            return Err(err.into());
        }

        registry.refresh(&*source, root)?;
        info!("Context initialized");
        Ok(context)
    }
}

#[cfg(feature = "auto")]
fn default_source() -> Box<dyn ComponentSource> {
    Box::new(crate::discovery::LinkedComponents)
}

#[cfg(not(feature = "auto"))]
fn default_source() -> Box<dyn ComponentSource> {
    Box::new(crate::discovery::ComponentList::new())
}
