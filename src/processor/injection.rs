use tracing::{debug, error, warn};

use super::{BeanPostProcessor, RawBean};
use crate::{
    errors::{ProcessErrorKind, ResolveErrorKind},
    registry::Registry,
};

/// Sets every dependency property of a bean.
///
/// Dependencies have to be resolved by the time a bean reaches this stage, the stage never creates beans.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyInjectionProcessor;

impl BeanPostProcessor for DependencyInjectionProcessor {
    fn name(&self) -> &'static str {
        "DependencyInjectionProcessor"
    }

    fn after_instantiation(&self, bean: &mut RawBean, registry: &Registry) -> Result<bool, ProcessErrorKind> {
        let Some(dependencies) = registry.dependencies(&bean.name) else {
            return Ok(true);
        };

        for (capability, properties) in dependencies.iter() {
            let Some(dependency) = registry.resolve_name(capability)? else {
                let err = ResolveErrorKind::UnsatisfiedDependency {
                    bean: bean.name.clone(),
                    capability: capability.clone(),
                };
                error!("{}", err);
                return Err(err.into());
            };
            let singleton = registry.get_singleton(&dependency)?;

            for property in properties {
                let Some(value) = singleton.cast_for(property) else {
                    warn!(
                        bean = %bean.name,
                        property = property.name(),
                        %dependency,
                        actual = %singleton.type_info(),
                        "Dependency doesn't satisfy the property type, skipped"
                    );
                    continue;
                };
                if property.set(bean.instance.as_mut(), value).is_err() {
                    warn!(bean = %bean.name, property = property.name(), "Dependency can't be set, skipped");
                    continue;
                }
                debug!(bean = %bean.name, property = property.name(), %dependency, "Dependency injected");
            }
        }

        Ok(true)
    }
}
