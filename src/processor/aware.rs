use tracing::debug;

use super::{BeanPostProcessor, RawBean};
use crate::{
    context::WeakContext,
    errors::ProcessErrorKind,
    registry::{Registry, WeakRegistry},
};

/// Bean that wants a handle to the registry it's managed by
pub trait RegistryAware {
    fn set_registry(&mut self, registry: WeakRegistry);
}

/// Bean that wants a handle to the context it's managed by
pub trait ContextAware {
    fn set_context(&mut self, context: WeakContext);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryAwareProcessor;

impl BeanPostProcessor for RegistryAwareProcessor {
    fn name(&self) -> &'static str {
        "RegistryAwareProcessor"
    }

    fn after_instantiation(&self, bean: &mut RawBean, registry: &Registry) -> Result<bool, ProcessErrorKind> {
        if let Some(aware) = bean.definition.descriptor().as_registry_aware(bean.instance.as_mut()) {
            aware.set_registry(registry.downgrade());
            debug!(bean = %bean.name, "Registry set");
        }
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct ContextAwareProcessor {
    context: WeakContext,
}

impl ContextAwareProcessor {
    #[inline]
    #[must_use]
    pub fn new(context: WeakContext) -> Self {
        Self { context }
    }
}

impl BeanPostProcessor for ContextAwareProcessor {
    fn name(&self) -> &'static str {
        "ContextAwareProcessor"
    }

    fn before_initialization(&self, mut bean: RawBean, _registry: &Registry) -> Result<RawBean, ProcessErrorKind> {
        if let Some(aware) = bean.definition.descriptor().as_context_aware(bean.instance.as_mut()) {
            aware.set_context(self.context.clone());
            debug!(bean = %bean.name, "Context set");
        }
        Ok(bean)
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistryAware, RegistryAwareProcessor};
    use crate::{
        any::BeanName,
        component::{Component, ComponentDescriptor},
        processor::{BeanPostProcessor as _, RawBean},
        registry::{BeanDefinition, Registry, WeakRegistry},
    };

    use std::sync::Arc;

    #[derive(Default)]
    struct Inspector {
        registry: Option<WeakRegistry>,
    }

    impl RegistryAware for Inspector {
        fn set_registry(&mut self, registry: WeakRegistry) {
            self.registry = Some(registry);
        }
    }

    impl Component for Inspector {
        fn as_registry_aware(&mut self) -> Option<&mut dyn RegistryAware> {
            Some(self)
        }
    }

    #[derive(Default)]
    struct Plain;

    impl Component for Plain {}

    fn raw_bean<T: Component + Default>(name: &str) -> RawBean {
        RawBean::new(
            Arc::new(BeanDefinition::new(BeanName::from(name), ComponentDescriptor::of::<T>())),
            Box::new(T::default()),
        )
    }

    #[test]
    fn test_registry_aware() {
        let registry = Registry::new();

        let mut bean = raw_bean::<Inspector>("Inspector");
        assert!(RegistryAwareProcessor.after_instantiation(&mut bean, &registry).unwrap());
        let inspector = bean.downcast_mut::<Inspector>().unwrap();
        assert!(inspector.registry.as_ref().and_then(WeakRegistry::upgrade).is_some());

        let mut bean = raw_bean::<Plain>("Plain");
        assert!(RegistryAwareProcessor.after_instantiation(&mut bean, &registry).unwrap());
    }
}
