mod aware;
mod injection;
mod value;

pub use aware::{ContextAware, ContextAwareProcessor, RegistryAware, RegistryAwareProcessor};
pub use injection::DependencyInjectionProcessor;
pub use value::PropertyValueProcessor;

use std::{
    any::TypeId,
    fmt::{self, Debug, Formatter},
    mem,
    sync::Arc,
};

use tracing::debug;

use crate::{
    any::{BeanName, RawInstance, TypeInfo},
    component::{self, CastTable, Component},
    errors::ProcessErrorKind,
    registry::{BeanDefinition, Registry},
};

/// Bean between instantiation and registration
pub struct RawBean {
    pub name: BeanName,
    pub definition: Arc<BeanDefinition>,
    pub instance: RawInstance,
    type_info: TypeInfo,
    casts: CastTable,
}

impl RawBean {
    #[inline]
    #[must_use]
    pub fn new(definition: Arc<BeanDefinition>, instance: RawInstance) -> Self {
        Self {
            name: definition.name().clone(),
            type_info: definition.type_info(),
            casts: definition.descriptor().casts(),
            definition,
            instance,
        }
    }

    #[inline]
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.instance.downcast_mut()
    }

    /// Type the instance is expected to have, the bean type until the instance is replaced
    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Whether the current instance can be viewed as the type with the given id
    #[inline]
    #[must_use]
    pub fn provides(&self, capability: TypeId) -> bool {
        self.casts.contains_key(&capability)
    }

    /// Replaces the instance with another component, usually a decorator of the current one.
    /// The bean is viewed through the capabilities of `W` from now on,
    /// so `W` has to provide every capability the bean is indexed under.
    pub fn replace<W: Component>(&mut self, replacement: W) {
        debug!(bean = %self.name, replacement = %TypeInfo::of::<W>(), "Instance replaced");
        self.instance = Box::new(replacement);
        self.type_info = TypeInfo::of::<W>();
        self.casts = component::cast_table::<W>();
    }

    /// Moves the instance of type `T` into a decorator built by `wrap`.
    /// Returns `false` and leaves the bean untouched if the instance isn't a `T`.
    pub fn wrap<T, W, F>(&mut self, wrap: F) -> bool
    where
        T: 'static,
        W: Component,
        F: FnOnce(T) -> W,
    {
        let instance = mem::replace(&mut self.instance, Box::new(()));
        match instance.downcast::<T>() {
            Ok(inner) => {
                self.replace(wrap(*inner));
                true
            }
            Err(instance) => {
                self.instance = instance;
                false
            }
        }
    }

    pub(crate) fn into_parts(self) -> (RawInstance, TypeInfo, CastTable) {
        (self.instance, self.type_info, self.casts)
    }
}

impl Debug for RawBean {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBean")
            .field("name", &self.name)
            .field("type_info", &self.type_info)
            .finish_non_exhaustive()
    }
}

/// Stage of the bean lifecycle pipeline.
///
/// Hooks are called in this order:
/// 1. `before_instantiation`, the first processor returning an instance skips the instantiation strategy;
/// 2. `after_instantiation`, returning `false` skips the remaining processors of this hook and both initialization hooks;
/// 3. `before_initialization`;
/// 4. `after_initialization`.
///
/// Initialization hooks may replace the instance with [`RawBean::replace`] or [`RawBean::wrap`].
/// The replacement has to provide every capability the bean is indexed under, or the bootstrap fails.
pub trait BeanPostProcessor: Send + Sync {
    fn name(&self) -> &'static str {
        "BeanPostProcessor"
    }

    /// # Errors
    /// Returns an error if the processor fails, the bootstrap is aborted
    fn before_instantiation(&self, _definition: &BeanDefinition, _registry: &Registry) -> Result<Option<RawInstance>, ProcessErrorKind> {
        Ok(None)
    }

    /// # Errors
    /// Returns an error if the processor fails, the bootstrap is aborted
    fn after_instantiation(&self, _bean: &mut RawBean, _registry: &Registry) -> Result<bool, ProcessErrorKind> {
        Ok(true)
    }

    /// # Errors
    /// Returns an error if the processor fails, the bootstrap is aborted
    fn before_initialization(&self, bean: RawBean, _registry: &Registry) -> Result<RawBean, ProcessErrorKind> {
        Ok(bean)
    }

    /// # Errors
    /// Returns an error if the processor fails, the bootstrap is aborted
    fn after_initialization(&self, bean: RawBean, _registry: &Registry) -> Result<RawBean, ProcessErrorKind> {
        Ok(bean)
    }
}

pub(crate) type BoxedProcessor = Box<dyn BeanPostProcessor>;

pub(crate) fn apply_before_instantiation(
    processors: &[BoxedProcessor],
    definition: &BeanDefinition,
    registry: &Registry,
) -> Result<Option<RawInstance>, ProcessErrorKind> {
    for processor in processors {
        if let Some(instance) = processor.before_instantiation(definition, registry)? {
            debug!(bean = %definition.name(), processor = processor.name(), "Instance supplied before instantiation");
            return Ok(Some(instance));
        }
    }
    Ok(None)
}

pub(crate) fn apply_pipeline(processors: &[BoxedProcessor], mut bean: RawBean, registry: &Registry) -> Result<RawBean, ProcessErrorKind> {
    for processor in processors {
        if !processor.after_instantiation(&mut bean, registry)? {
            debug!(bean = %bean.name, processor = processor.name(), "Initialization vetoed");
            return Ok(bean);
        }
    }
    for processor in processors {
        bean = processor.before_initialization(bean, registry)?;
    }
    for processor in processors {
        bean = processor.after_initialization(bean, registry)?;
    }
    Ok(bean)
}

#[cfg(test)]
mod tests {
    use super::{apply_pipeline, BeanPostProcessor, BoxedProcessor, RawBean};
    use crate::{
        any::BeanName,
        component::{Component, ComponentDescriptor},
        errors::ProcessErrorKind,
        registry::{BeanDefinition, Registry},
    };

    use std::{
        any::TypeId,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    #[derive(Default)]
    struct Bean(Vec<&'static str>);

    impl Component for Bean {}

    struct Traced(Bean);

    impl Component for Traced {}

    struct Recorder {
        label: &'static str,
        veto: bool,
        calls: Arc<AtomicUsize>,
    }

    impl BeanPostProcessor for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn after_instantiation(&self, bean: &mut RawBean, _registry: &Registry) -> Result<bool, ProcessErrorKind> {
            bean.downcast_mut::<Bean>().unwrap().0.push(self.label);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(!self.veto)
        }

        fn after_initialization(&self, mut bean: RawBean, _registry: &Registry) -> Result<RawBean, ProcessErrorKind> {
            bean.downcast_mut::<Bean>().unwrap().0.push("init");
            Ok(bean)
        }
    }

    fn raw_bean() -> RawBean {
        let definition = Arc::new(BeanDefinition::new(BeanName::from("Bean"), ComponentDescriptor::of::<Bean>()));
        RawBean::new(definition, Box::new(Bean::default()))
    }

    #[test]
    fn test_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processors: Vec<BoxedProcessor> = vec![
            Box::new(Recorder { label: "first", veto: false, calls: calls.clone() }),
            Box::new(Recorder { label: "second", veto: false, calls: calls.clone() }),
        ];

        let mut bean = apply_pipeline(&processors, raw_bean(), &Registry::new()).unwrap();
        assert_eq!(bean.downcast_mut::<Bean>().unwrap().0, ["first", "second", "init", "init"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_veto() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processors: Vec<BoxedProcessor> = vec![
            Box::new(Recorder { label: "first", veto: true, calls: calls.clone() }),
            Box::new(Recorder { label: "second", veto: false, calls: calls.clone() }),
        ];

        let mut bean = apply_pipeline(&processors, raw_bean(), &Registry::new()).unwrap();
        assert_eq!(bean.downcast_mut::<Bean>().unwrap().0, ["first"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrap() {
        let mut bean = raw_bean();
        bean.downcast_mut::<Bean>().unwrap().0.push("inner");

        assert!(!bean.wrap(|_: u8| Traced(Bean::default())));
        assert!(bean.provides(TypeId::of::<Bean>()));

        assert!(bean.wrap(Traced));
        assert_eq!(bean.type_info().id, TypeId::of::<Traced>());
        assert!(bean.provides(TypeId::of::<Traced>()));
        assert!(!bean.provides(TypeId::of::<Bean>()));
        assert_eq!(bean.downcast_mut::<Traced>().unwrap().0 .0, ["inner"]);
    }

    #[test]
    fn test_replace() {
        let mut bean = raw_bean();
        bean.replace(Traced(Bean::default()));

        let (instance, type_info, casts) = bean.into_parts();
        assert!(instance.downcast_ref::<Traced>().is_some());
        assert_eq!(type_info.id, TypeId::of::<Traced>());
        assert_eq!(casts.len(), 1);
    }
}
