use tracing::{debug, error};

use crate::{any::RawInstance, errors::InstantiateErrorKind, registry::BeanDefinition};

/// Creates a bare, not yet injected instance of a bean
pub trait InstantiationStrategy: Send + Sync {
    /// # Errors
    /// Returns an error if the bean can't be created by the strategy
    fn instantiate(&self, definition: &BeanDefinition) -> Result<RawInstance, InstantiateErrorKind>;
}

impl<F> InstantiationStrategy for F
where
    F: Fn(&BeanDefinition) -> Result<RawInstance, InstantiateErrorKind> + Send + Sync,
{
    #[inline]
    fn instantiate(&self, definition: &BeanDefinition) -> Result<RawInstance, InstantiateErrorKind> {
        self(definition)
    }
}

/// Calls the parameterless constructor captured by the component descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConstructorStrategy;

impl InstantiationStrategy for DefaultConstructorStrategy {
    fn instantiate(&self, definition: &BeanDefinition) -> Result<RawInstance, InstantiateErrorKind> {
        match definition.descriptor().construct() {
            Some(instance) => {
                debug!(bean = %definition.name(), "Instantiated");
                Ok(instance)
            }
            None => {
                let err = InstantiateErrorKind::NoConstructor {
                    name: definition.name().clone(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}
