use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::{
    any::BeanName,
    component::ComponentDescriptor,
    errors::ParseErrorKind,
    naming::BeanNameGenerator,
    property::{Marker, PropertyHandle, ValueKind},
};

/// Properties of one bean grouped by the capability they require
pub type Dependencies = BTreeMap<BeanName, Vec<PropertyHandle>>;

/// Computes what a bean depends on
pub trait DependencyParser: Send + Sync {
    /// # Errors
    /// Returns an error if a dependency can't be injected into the bean
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Result<Dependencies, ParseErrorKind>;
}

impl<F> DependencyParser for F
where
    F: Fn(&ComponentDescriptor, &dyn BeanNameGenerator) -> Result<Dependencies, ParseErrorKind> + Send + Sync,
{
    #[inline]
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Result<Dependencies, ParseErrorKind> {
        self(descriptor, generator)
    }
}

/// Collects properties marked with [`Marker::Dependency`].
///
/// Scalars and collections are values, not beans, so they're rejected as dependency targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerDependencyParser;

impl DependencyParser for MarkerDependencyParser {
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Result<Dependencies, ParseErrorKind> {
        let bean = descriptor.type_info();
        let mut dependencies = Dependencies::new();

        for property in descriptor.properties() {
            if property.marker() != Some(Marker::Dependency) {
                continue;
            }

            if !property.is_settable() {
                let err = ParseErrorKind::UnsupportedProperty {
                    bean,
                    property: property.name(),
                    reason: "setter is missing",
                };
                error!("{}", err);
                return Err(err);
            }

            let reason = match ValueKind::classify(&property.type_info()) {
                ValueKind::Object => None,
                ValueKind::Scalar => Some("scalar types are values, not beans"),
                ValueKind::Collection => Some("collections are values, not beans"),
            };
            if let Some(reason) = reason {
                let err = ParseErrorKind::UnsupportedType {
                    bean,
                    property: property.name(),
                    type_info: property.type_info(),
                    reason,
                };
                error!("{}", err);
                return Err(err);
            }

            let capability = generator.generate(&property.type_info());
            debug!(bean = %bean, property = property.name(), %capability, "Dependency found");
            dependencies.entry(capability).or_default().push(property.clone());
        }

        Ok(dependencies)
    }
}
