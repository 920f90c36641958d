use std::{
    any::{Any, TypeId},
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use crate::any::TypeInfo;

/// Marker attached to a property to tell the container how it's populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Populated with a bean providing the property's capability
    Dependency,
    /// Populated with a converted value from the property registry
    Value { key: &'static str, required: bool },
}

/// Coarse classification of a property type.
/// Only object references can be used as dependency targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    Scalar,
    Collection,
}

impl ValueKind {
    #[must_use]
    pub fn of<V: ?Sized + 'static>() -> Self {
        Self::classify(&TypeInfo::of::<V>())
    }

    #[must_use]
    pub fn classify(type_info: &TypeInfo) -> Self {
        const SCALARS: &[fn() -> TypeId] = &[
            TypeId::of::<bool>,
            TypeId::of::<char>,
            TypeId::of::<i8>,
            TypeId::of::<i16>,
            TypeId::of::<i32>,
            TypeId::of::<i64>,
            TypeId::of::<i128>,
            TypeId::of::<isize>,
            TypeId::of::<u8>,
            TypeId::of::<u16>,
            TypeId::of::<u32>,
            TypeId::of::<u64>,
            TypeId::of::<u128>,
            TypeId::of::<usize>,
            TypeId::of::<f32>,
            TypeId::of::<f64>,
            TypeId::of::<String>,
            TypeId::of::<str>,
            TypeId::of::<&'static str>,
        ];
        const COLLECTION_PREFIXES: &[&str] = &[
            "[",
            "&[",
            "alloc::vec::Vec<",
            "alloc::collections::",
            "std::collections::",
            "alloc::boxed::Box<[",
        ];

        if SCALARS.iter().any(|id| id() == type_info.id) {
            return Self::Scalar;
        }
        if COLLECTION_PREFIXES.iter().any(|prefix| type_info.name.starts_with(prefix)) {
            return Self::Collection;
        }
        Self::Object
    }
}

type TypedSetter<T> = Arc<dyn Fn(&mut T, Box<dyn Any>) -> Result<(), Box<dyn Any>> + Send + Sync>;
type ErasedSetter = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Box<dyn Any>) -> Result<(), Box<dyn Any>> + Send + Sync>;

/// Settable property of a component, as it's declared by the component itself
pub struct Property<T> {
    name: &'static str,
    type_info: TypeInfo,
    marker: Option<Marker>,
    setter: Option<TypedSetter<T>>,
}

impl<T: 'static> Property<T> {
    /// Property without a marker and without a setter
    #[inline]
    #[must_use]
    pub fn new<V: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            type_info: TypeInfo::of::<V>(),
            marker: None,
            setter: None,
        }
    }

    /// Property populated with a bean providing capability `C`
    #[must_use]
    pub fn dependency<C, F>(name: &'static str, setter: F) -> Self
    where
        C: ?Sized + 'static,
        F: Fn(&mut T, Arc<C>) + Send + Sync + 'static,
    {
        Self {
            name,
            type_info: TypeInfo::of::<C>(),
            marker: Some(Marker::Dependency),
            setter: Some(Arc::new(move |bean: &mut T, value: Box<dyn Any>| {
                let value = value.downcast::<Arc<C>>()?;
                setter(bean, *value);
                Ok(())
            })),
        }
    }

    /// Required property populated with the value under `key` converted to `V`
    #[must_use]
    pub fn value<V, F>(name: &'static str, key: &'static str, setter: F) -> Self
    where
        V: 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name,
            type_info: TypeInfo::of::<V>(),
            marker: Some(Marker::Value { key, required: true }),
            setter: Some(Arc::new(move |bean: &mut T, value: Box<dyn Any>| {
                let value = value.downcast::<V>()?;
                setter(bean, *value);
                Ok(())
            })),
        }
    }

    /// Makes a value property optional: an absent key leaves the property untouched
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        if let Some(Marker::Value { required, .. }) = &mut self.marker {
            *required = false;
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn marked(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    #[must_use]
    pub(crate) fn erase(self) -> PropertyHandle {
        let setter = self.setter.map(|setter| -> ErasedSetter {
            Arc::new(move |bean: &mut (dyn Any + Send + Sync), value: Box<dyn Any>| match bean.downcast_mut::<T>() {
                Some(bean) => setter(bean, value),
                None => Err(value),
            })
        });

        PropertyHandle {
            name: self.name,
            type_info: self.type_info,
            marker: self.marker,
            setter,
        }
    }
}

impl<T> Debug for Property<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type_info", &self.type_info)
            .field("marker", &self.marker)
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}

/// Type-erased handle over a component property, computed once per component
#[derive(Clone)]
pub struct PropertyHandle {
    name: &'static str,
    type_info: TypeInfo,
    marker: Option<Marker>,
    setter: Option<ErasedSetter>,
}

impl PropertyHandle {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the property (the capability for dependencies)
    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    #[inline]
    #[must_use]
    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    /// Whether a value of `candidate` type can be set to the property
    #[inline]
    #[must_use]
    pub fn accepts(&self, candidate: TypeId) -> bool {
        self.type_info.id == candidate
    }

    /// Sets a boxed value to the property of `bean`.
    /// For dependencies the value is an `Arc<C>`, for property values the converted value itself.
    ///
    /// # Errors
    /// Returns the value back if the property has no setter or the value or the bean has another type
    pub fn set(&self, bean: &mut (dyn Any + Send + Sync), value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        match &self.setter {
            Some(setter) => setter(bean, value),
            None => Err(value),
        }
    }
}

impl Debug for PropertyHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHandle")
            .field("name", &self.name)
            .field("type_info", &self.type_info)
            .field("marker", &self.marker)
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Marker, Property, ValueKind};

    use std::{any::Any, collections::BTreeMap, sync::Arc};

    trait Service: Send + Sync {}

    #[derive(Default)]
    struct Bean {
        service: Option<Arc<dyn Service>>,
        version: u32,
    }

    struct ServiceImpl;

    impl Service for ServiceImpl {}

    #[test]
    fn test_value_kind() {
        assert_eq!(ValueKind::of::<i32>(), ValueKind::Scalar);
        assert_eq!(ValueKind::of::<f64>(), ValueKind::Scalar);
        assert_eq!(ValueKind::of::<String>(), ValueKind::Scalar);
        assert_eq!(ValueKind::of::<char>(), ValueKind::Scalar);
        assert_eq!(ValueKind::of::<Vec<u8>>(), ValueKind::Collection);
        assert_eq!(ValueKind::of::<[u8; 4]>(), ValueKind::Collection);
        assert_eq!(ValueKind::of::<BTreeMap<String, u8>>(), ValueKind::Collection);
        assert_eq!(ValueKind::of::<dyn Service>(), ValueKind::Object);
        assert_eq!(ValueKind::of::<Bean>(), ValueKind::Object);
    }

    #[test]
    fn test_dependency_setter() {
        let handle = Property::dependency("service", |bean: &mut Bean, service: Arc<dyn Service>| {
            bean.service = Some(service);
        })
        .erase();
        assert_eq!(handle.marker(), Some(Marker::Dependency));
        assert_eq!(handle.name(), "service");

        let mut bean: Box<dyn Any + Send + Sync> = Box::new(Bean::default());
        let service: Arc<dyn Service> = Arc::new(ServiceImpl);
        handle.set(bean.as_mut(), Box::new(service)).unwrap();
        assert!(bean.downcast_ref::<Bean>().unwrap().service.is_some());

        handle.set(bean.as_mut(), Box::new(1u32)).unwrap_err();
    }

    #[test]
    fn test_value_setter() {
        let handle = Property::value("version", "app.version", |bean: &mut Bean, version: u32| {
            bean.version = version;
        })
        .optional()
        .erase();
        assert_eq!(
            handle.marker(),
            Some(Marker::Value {
                key: "app.version",
                required: false
            })
        );

        let mut bean: Box<dyn Any + Send + Sync> = Box::new(Bean::default());
        handle.set(bean.as_mut(), Box::new(7u32)).unwrap();
        assert_eq!(bean.downcast_ref::<Bean>().unwrap().version, 7);
    }

    #[test]
    fn test_without_setter() {
        let handle = Property::<Bean>::new::<dyn Service>("service").marked(Marker::Dependency).erase();
        assert!(!handle.is_settable());

        let mut bean: Box<dyn Any + Send + Sync> = Box::new(Bean::default());
        let service: Arc<dyn Service> = Arc::new(ServiceImpl);
        handle.set(bean.as_mut(), Box::new(service)).unwrap_err();
    }
}
