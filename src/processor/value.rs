use std::sync::Arc;

use tracing::{debug, error};

use super::{BeanPostProcessor, RawBean};
use crate::{
    converter::Converters,
    errors::{BindErrorKind, ParseErrorKind, ProcessErrorKind},
    properties::PropertyRegistry,
    property::Marker,
    registry::Registry,
};

/// Binds properties marked with [`Marker::Value`] to converted values from the property registry
pub struct PropertyValueProcessor {
    properties: Arc<dyn PropertyRegistry>,
    converters: Arc<Converters>,
}

impl PropertyValueProcessor {
    #[inline]
    #[must_use]
    pub fn new(properties: Arc<dyn PropertyRegistry>, converters: Arc<Converters>) -> Self {
        Self { properties, converters }
    }
}

impl BeanPostProcessor for PropertyValueProcessor {
    fn name(&self) -> &'static str {
        "PropertyValueProcessor"
    }

    fn after_instantiation(&self, bean: &mut RawBean, _registry: &Registry) -> Result<bool, ProcessErrorKind> {
        let definition = Arc::clone(&bean.definition);

        for property in definition.descriptor().properties() {
            let Some(Marker::Value { key, required }) = property.marker() else {
                continue;
            };

            if key.trim().is_empty() || !property.is_settable() {
                let err = ParseErrorKind::UnsupportedProperty {
                    bean: definition.type_info(),
                    property: property.name(),
                    reason: if property.is_settable() {
                        "property key is empty"
                    } else {
                        "setter is missing"
                    },
                };
                error!("{}", err);
                return Err(err.into());
            }

            let Some(value) = self.properties.get_property(key) else {
                if required {
                    let err = BindErrorKind::MissingRequiredProperty {
                        bean: bean.name.clone(),
                        key,
                    };
                    error!("{}", err);
                    return Err(err.into());
                }
                debug!(bean = %bean.name, key, "Optional property value is absent");
                continue;
            };

            let type_info = property.type_info();
            let Some(converter) = self.converters.get(type_info.id) else {
                let err = BindErrorKind::UnsupportedConversion {
                    bean: bean.name.clone(),
                    property: property.name(),
                    type_info,
                };
                error!("{}", err);
                return Err(err.into());
            };

            let converted = match converter.convert(&value) {
                Ok(converted) => converted,
                Err(source) => {
                    let err = BindErrorKind::InvalidPropertyValue {
                        key,
                        value,
                        type_info,
                        source,
                    };
                    error!("{}", err);
                    return Err(err.into());
                }
            };

            if property.set(bean.instance.as_mut(), converted).is_err() {
                let err = BindErrorKind::UnsupportedConversion {
                    bean: bean.name.clone(),
                    property: property.name(),
                    type_info,
                };
                error!("{}", err);
                return Err(err.into());
            }
            debug!(bean = %bean.name, property = property.name(), key, "Property value bound");
        }

        Ok(true)
    }
}
