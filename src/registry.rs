use std::{
    any::{Any, TypeId},
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    sync::{Arc, Weak},
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, debug_span, error, info, info_span, warn};

use crate::{
    alias::{AliasIndex, AliasParser, CapabilityAliasParser},
    any::{BeanName, Instance, RawInstance, TypeInfo},
    component::{self_caster, CastTable, Component, ComponentDescriptor},
    dependency_parser::{Dependencies, DependencyParser, MarkerDependencyParser},
    dependency_resolver,
    discovery::{self, ComponentSource},
    errors::{BootstrapErrorKind, ProcessErrorKind, RegistryErrorKind},
    instantiator::{DefaultConstructorStrategy, InstantiationStrategy},
    naming::{BeanNameGenerator, QualifiedNameGenerator, SimpleNameGenerator},
    processor::{self, BeanPostProcessor, BoxedProcessor, DependencyInjectionProcessor, RawBean, RegistryAwareProcessor},
    property::PropertyHandle,
};

/// Discovered component with its canonical name
#[derive(Debug, Clone)]
pub struct BeanDefinition {
    name: BeanName,
    descriptor: ComponentDescriptor,
}

impl BeanDefinition {
    #[inline]
    #[must_use]
    pub fn new(name: BeanName, descriptor: ComponentDescriptor) -> Self {
        Self { name, descriptor }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &BeanName {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.descriptor.type_info()
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }
}

/// Frozen instance held by the registry together with the views it can be cast to
#[derive(Clone)]
pub struct Singleton {
    instance: Instance,
    type_info: TypeInfo,
    casts: CastTable,
    descriptor: Option<ComponentDescriptor>,
}

impl Singleton {
    /// Singleton that can only be looked up as `T` itself
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            instance: value,
            type_info: TypeInfo::of::<T>(),
            casts: Arc::new(BTreeMap::from([(TypeId::of::<T>(), self_caster::<T>())])),
            descriptor: None,
        }
    }

    /// Singleton that can be looked up by every capability of the component
    #[must_use]
    pub fn component<T: Component>(value: T) -> Self {
        let descriptor = ComponentDescriptor::without_constructor::<T>();
        Self {
            instance: Arc::new(value),
            type_info: TypeInfo::of::<T>(),
            casts: descriptor.casts(),
            descriptor: Some(descriptor),
        }
    }

    pub(crate) fn from_parts(instance: Instance, type_info: TypeInfo, casts: CastTable) -> Self {
        Self {
            instance,
            type_info,
            casts,
            descriptor: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn provides(&self, capability: TypeId) -> bool {
        self.casts.contains_key(&capability)
    }

    #[must_use]
    pub fn cast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        let caster = self.casts.get(&TypeId::of::<T>())?;
        caster(&self.instance)?.downcast::<Arc<T>>().ok().map(|instance| *instance)
    }

    /// Boxed `Arc<C>` for a property declared as `C`, if the instance satisfies the property type
    #[must_use]
    pub fn cast_for(&self, property: &PropertyHandle) -> Option<Box<dyn Any>> {
        let (_, caster) = self.casts.iter().find(|(id, _)| property.accepts(**id))?;
        caster(&self.instance)
    }
}

impl Debug for Singleton {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton").field("type_info", &self.type_info).finish_non_exhaustive()
    }
}

/// Configuration of a [`Registry`]
pub struct RegistryBuilder {
    name_generator: Box<dyn BeanNameGenerator>,
    instantiation_strategy: Box<dyn InstantiationStrategy>,
    alias_parser: Box<dyn AliasParser>,
    dependency_parser: Box<dyn DependencyParser>,
    processors: Vec<BoxedProcessor>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Default strategies with dependency injection and registry aware stages
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::bare()
            .post_processor(DependencyInjectionProcessor)
            .post_processor(RegistryAwareProcessor)
    }

    /// Default strategies without any post processor
    #[inline]
    #[must_use]
    pub fn bare() -> Self {
        Self {
            name_generator: Box::new(QualifiedNameGenerator),
            instantiation_strategy: Box::new(DefaultConstructorStrategy),
            alias_parser: Box::new(CapabilityAliasParser),
            dependency_parser: Box::new(MarkerDependencyParser),
            processors: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name_generator(mut self, generator: impl BeanNameGenerator + 'static) -> Self {
        self.name_generator = Box::new(generator);
        self
    }

    #[inline]
    #[must_use]
    pub fn instantiation_strategy(mut self, strategy: impl InstantiationStrategy + 'static) -> Self {
        self.instantiation_strategy = Box::new(strategy);
        self
    }

    #[inline]
    #[must_use]
    pub fn alias_parser(mut self, parser: impl AliasParser + 'static) -> Self {
        self.alias_parser = Box::new(parser);
        self
    }

    #[inline]
    #[must_use]
    pub fn dependency_parser(mut self, parser: impl DependencyParser + 'static) -> Self {
        self.dependency_parser = Box::new(parser);
        self
    }

    /// Appends a stage to the pipeline, stages are applied in the order they're added
    #[inline]
    #[must_use]
    pub fn post_processor(mut self, processor: impl BeanPostProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    #[inline]
    #[must_use]
    pub(crate) fn boxed_post_processor(mut self, processor: BoxedProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(RegistryInner {
                state: RwLock::new(RegistryState::default()),
                initialized: Mutex::new(false),
                name_generator: self.name_generator,
                instantiation_strategy: self.instantiation_strategy,
                alias_parser: self.alias_parser,
                dependency_parser: self.dependency_parser,
                processors: self.processors,
            }),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    definitions: BTreeMap<BeanName, Arc<BeanDefinition>>,
    aliases: AliasIndex,
    singletons: BTreeMap<BeanName, Singleton>,
    early: BTreeMap<BeanName, RawBean>,
    dependencies: BTreeMap<BeanName, Arc<Dependencies>>,
}

impl RegistryState {
    fn is_bean(&self, name: &str) -> bool {
        self.definitions.contains_key(name) || self.singletons.contains_key(name)
    }

    fn resolve(&self, name: &str) -> Result<Option<BeanName>, RegistryErrorKind> {
        self.aliases.resolve(name, |name| self.is_bean(name))
    }

    fn check_free(&self, name: &BeanName) -> Result<(), RegistryErrorKind> {
        if self.singletons.contains_key(name) || self.early.contains_key(name) {
            let err = RegistryErrorKind::DuplicateRegistration { name: name.clone() };
            error!("{}", err);
            return Err(err);
        }
        Ok(())
    }
}

pub(crate) struct RegistryInner {
    state: RwLock<RegistryState>,
    initialized: Mutex<bool>,
    name_generator: Box<dyn BeanNameGenerator>,
    instantiation_strategy: Box<dyn InstantiationStrategy>,
    alias_parser: Box<dyn AliasParser>,
    dependency_parser: Box<dyn DependencyParser>,
    processors: Vec<BoxedProcessor>,
}

impl RegistryInner {
    /// Names a bean of `type_info` is indexed under besides its own:
    /// the type and capability names from the configured generator, then the same names in short form
    fn aliases(&self, type_info: &TypeInfo, descriptor: Option<&ComponentDescriptor>) -> Vec<BeanName> {
        let mut aliases = Vec::new();
        for generator in [&*self.name_generator, &SimpleNameGenerator as &dyn BeanNameGenerator] {
            aliases.push(generator.generate(type_info));
            if let Some(descriptor) = descriptor {
                aliases.extend(self.alias_parser.parse(descriptor, generator));
            }
        }
        aliases
    }
}

/// Name to instance map of singleton beans with the capability index over them.
///
/// Cloning is cheap, clones share the same beans.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }

    #[inline]
    #[must_use]
    pub fn name_generator(&self) -> &dyn BeanNameGenerator {
        &*self.inner.name_generator
    }

    /// Canonical name of type `T`, which is also the capability name dependencies on `T` are resolved by
    #[inline]
    #[must_use]
    pub fn name_of<T: ?Sized + 'static>(&self) -> BeanName {
        self.inner.name_generator.generate(&TypeInfo::of::<T>())
    }

    /// Registers a fully initialized singleton.
    /// The singleton is indexed under its type name and, for components, under its capabilities.
    /// Short type and capability names are indexed too, they're ambiguous if several beans share them.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::DuplicateRegistration`] if the name is already taken
    pub fn register(&self, name: impl Into<BeanName>, singleton: Singleton) -> Result<(), RegistryErrorKind> {
        let name = name.into();
        let aliases = self.inner.aliases(&singleton.type_info, singleton.descriptor.as_ref());

        let mut state = self.inner.state.write();
        state.check_free(&name)?;
        for capability in aliases {
            state.aliases.add_alias(name.clone(), capability);
        }
        debug!(bean = %name, type_info = %singleton.type_info, "Singleton registered");
        state.singletons.insert(name, singleton);
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryErrorKind::DuplicateRegistration`] if the name is already taken
    #[inline]
    pub fn register_singleton<T: Send + Sync + 'static>(&self, name: impl Into<BeanName>, value: T) -> Result<(), RegistryErrorKind> {
        self.register(name, Singleton::new(value))
    }

    /// Registers an instantiated bean whose dependencies aren't injected yet
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::DuplicateRegistration`] if the name is already taken
    pub fn register_early(&self, bean: RawBean) -> Result<(), RegistryErrorKind> {
        let mut state = self.inner.state.write();
        state.check_free(&bean.name)?;
        debug!(bean = %bean.name, "Early bean registered");
        state.early.insert(bean.name.clone(), bean);
        Ok(())
    }

    /// Removes an early bean to continue its initialization
    #[inline]
    pub fn take_early(&self, name: &str) -> Option<RawBean> {
        self.inner.state.write().early.remove(name)
    }

    #[inline]
    #[must_use]
    pub fn is_early(&self, name: &str) -> bool {
        self.inner.state.read().early.contains_key(name)
    }

    pub(crate) fn register_resolved(&self, name: BeanName, singleton: Singleton) -> Result<(), RegistryErrorKind> {
        let mut state = self.inner.state.write();
        state.check_free(&name)?;
        state.singletons.insert(name, singleton);
        Ok(())
    }

    /// Resolves a bean name or capability name to the concrete bean name, `None` for unknown names
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::AmbiguousCapability`] if the capability is provided by several beans
    #[inline]
    pub fn resolve_name(&self, name: &str) -> Result<Option<BeanName>, RegistryErrorKind> {
        self.inner.state.read().resolve(name)
    }

    /// Looks up a bean by name or by capability name
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotFound`] if there is no such bean
    /// - Returns [`RegistryErrorKind::AmbiguousCapability`] if the capability is provided by several beans
    pub fn get_singleton(&self, name: &str) -> Result<Singleton, RegistryErrorKind> {
        let state = self.inner.state.read();
        let Some(bean) = state.resolve(name)? else {
            let err = RegistryErrorKind::NotFound { name: BeanName::from(name) };
            error!("{}", err);
            return Err(err);
        };
        match state.singletons.get(&bean) {
            Some(singleton) => Ok(singleton.clone()),
            None => {
                let err = RegistryErrorKind::NotFound { name: bean };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// # Errors
    /// See [`Registry::get_singleton`]
    #[inline]
    pub fn get_instance(&self, name: &str) -> Result<Instance, RegistryErrorKind> {
        self.get_singleton(name).map(|singleton| singleton.instance)
    }

    /// Looks up a bean by name or by capability name and views it as `T`
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotFound`] if there is no such bean or it can't be viewed as `T`
    /// - Returns [`RegistryErrorKind::AmbiguousCapability`] if the capability is provided by several beans
    pub fn get_by_name<T: ?Sized + 'static>(&self, name: &str) -> Result<Arc<T>, RegistryErrorKind> {
        let span = debug_span!("get_by_name", name, type_info = %TypeInfo::of::<T>());
        let _guard = span.enter();

        let singleton = self.get_singleton(name)?;
        match singleton.cast::<T>() {
            Some(bean) => {
                debug!("Found");
                Ok(bean)
            }
            None => {
                warn!(actual = %singleton.type_info, "Bean can't be viewed as the requested type");
                let err = RegistryErrorKind::NotFound { name: BeanName::from(name) };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Looks up the bean providing capability `C`
    ///
    /// # Errors
    /// See [`Registry::get_by_name`]
    #[inline]
    pub fn get_by_capability<C: ?Sized + 'static>(&self) -> Result<Arc<C>, RegistryErrorKind> {
        self.get_by_name::<C>(&self.name_of::<C>())
    }

    /// Every bean that can be viewed as `C`
    #[must_use]
    pub fn get_all_of_capability<C: ?Sized + 'static>(&self) -> BTreeMap<BeanName, Arc<C>> {
        let state = self.inner.state.read();
        state
            .singletons
            .iter()
            .filter_map(|(name, singleton)| singleton.cast::<C>().map(|bean| (name.clone(), bean)))
            .collect()
    }

    /// Whether the name or capability name is known to the registry
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let state = self.inner.state.read();
        match state.resolve(name) {
            Ok(Some(bean)) => state.is_bean(&bean),
            Ok(None) => false,
            Err(_) => true,
        }
    }

    /// Names of the registered singletons
    #[must_use]
    pub fn registered_names(&self) -> Vec<BeanName> {
        self.inner.state.read().singletons.keys().cloned().collect()
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.inner.state.read().definitions.get(name).cloned()
    }

    #[must_use]
    pub fn definition_names(&self) -> Vec<BeanName> {
        self.inner.state.read().definitions.keys().cloned().collect()
    }

    /// Dependencies of a discovered bean grouped by capability
    #[must_use]
    pub fn dependencies(&self, name: &str) -> Option<Arc<Dependencies>> {
        self.inner.state.read().dependencies.get(name).cloned()
    }

    /// Whether the bean is fully initialized and registered
    #[inline]
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.inner.state.read().singletons.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *self.inner.initialized.lock()
    }

    /// Discovers the components, then instantiates and initializes every one of them.
    /// The registry can be refreshed once, a failed refresh leaves no definitions, aliases or instances behind.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::AlreadyInitialized`] on a second call
    /// - Returns the first error raised while loading or resolving beans
    pub fn refresh(&self, source: &dyn ComponentSource, root: &str) -> Result<(), BootstrapErrorKind> {
        {
            let mut initialized = self.inner.initialized.lock();
            if *initialized {
                let err = RegistryErrorKind::AlreadyInitialized;
                error!("{}", err);
                return Err(err.into());
            }
            *initialized = true;
        }

        let span = info_span!("refresh", root);
        let _guard = span.enter();

        info!("Refreshing registry");
        match self.bootstrap(source, root) {
            Ok(()) => {
                info!(beans = self.inner.state.read().singletons.len(), "Registry refreshed");
                Ok(())
            }
            Err(err) => {
                *self.inner.state.write() = RegistryState::default();
                debug!("Registry cleared after failed refresh");
                Err(err)
            }
        }
    }

    fn bootstrap(&self, source: &dyn ComponentSource, root: &str) -> Result<(), BootstrapErrorKind> {
        self.register_singleton(self.name_of::<WeakRegistry>(), self.downgrade())?;

        self.load_definitions(discovery::scan(source, root))?;
        debug!("Bean definitions loaded");

        for name in self.definition_names() {
            if !self.is_resolved(&name) {
                dependency_resolver::resolve(self, &name)?;
            }
        }
        Ok(())
    }

    /// Computes names, aliases and dependencies of every component before anything is instantiated
    fn load_definitions(&self, descriptors: Vec<ComponentDescriptor>) -> Result<(), BootstrapErrorKind> {
        let inner = &*self.inner;
        let generator = &*inner.name_generator;

        let mut loaded = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let name = generator.generate(&descriptor.type_info());
            let aliases = inner.aliases(&descriptor.type_info(), Some(&descriptor));
            let dependencies = inner.dependency_parser.parse(&descriptor, generator)?;
            loaded.push((BeanDefinition::new(name, descriptor), aliases, dependencies));
        }

        let mut state = inner.state.write();
        for (definition, aliases, dependencies) in loaded {
            let name = definition.name().clone();
            if state.is_bean(&name) {
                let err = RegistryErrorKind::DuplicateRegistration { name };
                error!("{}", err);
                return Err(err.into());
            }
            for capability in aliases {
                state.aliases.add_alias(name.clone(), capability);
            }
            debug!(bean = %name, type_info = %definition.type_info(), "Bean definition registered");
            state.dependencies.insert(name.clone(), Arc::new(dependencies));
            state.definitions.insert(name, Arc::new(definition));
        }
        Ok(())
    }

    pub(crate) fn instantiate(&self, definition: &BeanDefinition) -> Result<RawInstance, BootstrapErrorKind> {
        if let Some(instance) = processor::apply_before_instantiation(&self.inner.processors, definition, self)? {
            return Ok(instance);
        }
        Ok(self.inner.instantiation_strategy.instantiate(definition)?)
    }

    pub(crate) fn process(&self, bean: RawBean) -> Result<RawBean, ProcessErrorKind> {
        processor::apply_pipeline(&self.inner.processors, bean, self)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Registry")
            .field("definitions", &state.definitions.keys().collect::<Vec<_>>())
            .field("singletons", &state.singletons.keys().collect::<Vec<_>>())
            .field("aliases", &state.aliases)
            .finish_non_exhaustive()
    }
}

/// Handle to a registry that doesn't keep it alive.
/// Beans get this one, so the registry and its beans don't own each other.
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Registry> {
        self.inner.upgrade().map(|inner| Registry { inner })
    }
}

impl Debug for WeakRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRegistry").field("alive", &(self.inner.strong_count() > 0)).finish()
    }
}
