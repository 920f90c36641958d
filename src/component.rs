use std::{
    any::{Any, TypeId},
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    any::{Instance, RawInstance, TypeInfo},
    processor::{ContextAware, RegistryAware},
    property::{Property, PropertyHandle},
};

/// Casts a frozen instance to `Arc<C>` boxed as `dyn Any`.
/// Returns `None` if the instance isn't of the concrete type the caster was built for.
pub(crate) type Caster = Arc<dyn Fn(&Instance) -> Option<Box<dyn Any>> + Send + Sync>;
pub(crate) type CastTable = Arc<BTreeMap<TypeId, Caster>>;

type Constructor = Arc<dyn Fn() -> RawInstance + Send + Sync>;
type RegistryAwareFn = fn(&mut (dyn Any + Send + Sync)) -> Option<&mut dyn RegistryAware>;
type ContextAwareFn = fn(&mut (dyn Any + Send + Sync)) -> Option<&mut dyn ContextAware>;

/// Type managed by the container.
///
/// Every method has a default, so a component without dependencies is just `impl Component for T {}`.
/// Properties describe what the container sets after instantiation, capabilities describe
/// what the component can be looked up (and injected) as besides its concrete type.
pub trait Component: Send + Sync + Sized + 'static {
    #[inline]
    #[must_use]
    fn properties() -> Vec<Property<Self>> {
        Vec::new()
    }

    #[inline]
    #[must_use]
    fn capabilities() -> Vec<Capability<Self>> {
        Vec::new()
    }

    #[inline]
    fn as_registry_aware(&mut self) -> Option<&mut dyn RegistryAware> {
        None
    }

    #[inline]
    fn as_context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        None
    }
}

/// View of component `T` as `C`, usually a trait object.
/// Capabilities may extend other capabilities the same way traits have supertraits.
pub struct Capability<T> {
    type_info: TypeInfo,
    caster: Caster,
    extends: Vec<Capability<T>>,
    _component: PhantomData<fn() -> T>,
}

impl<T: Component> Capability<T> {
    /// Use [`crate::capability!`] to avoid writing the upcast by hand
    #[must_use]
    pub fn of<C>(upcast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + 'static,
    {
        Self {
            type_info: TypeInfo::of::<C>(),
            caster: Arc::new(move |instance: &Instance| {
                let bean = instance.clone().downcast::<T>().ok()?;
                Some(Box::new(upcast(bean)) as Box<dyn Any>)
            }),
            extends: Vec::new(),
            _component: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: Capability<T>) -> Self {
        self.extends.push(parent);
        self
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    fn erase(self, casts: &mut BTreeMap<TypeId, Caster>) -> CapabilityNode {
        casts.entry(self.type_info.id).or_insert(self.caster);
        CapabilityNode {
            type_info: self.type_info,
            extends: self.extends.into_iter().map(|parent| parent.erase(casts)).collect(),
        }
    }
}

impl<T> Debug for Capability<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("type_info", &self.type_info)
            .field("extends", &self.extends)
            .finish_non_exhaustive()
    }
}

/// Type-erased capability tree of a component
#[derive(Debug, Clone)]
pub struct CapabilityNode {
    pub type_info: TypeInfo,
    pub extends: Vec<CapabilityNode>,
}

/// Everything the container knows about a component type, without the type itself
#[derive(Clone)]
pub struct ComponentDescriptor {
    type_info: TypeInfo,
    constructor: Option<Constructor>,
    properties: Arc<[PropertyHandle]>,
    capabilities: Arc<[CapabilityNode]>,
    casts: CastTable,
    registry_aware: RegistryAwareFn,
    context_aware: ContextAwareFn,
}

impl ComponentDescriptor {
    /// Descriptor of a component constructed with [`Default`]
    #[inline]
    #[must_use]
    pub fn of<T: Component + Default>() -> Self {
        Self::with_constructor::<T>(T::default)
    }

    #[must_use]
    pub fn with_constructor<T: Component>(constructor: fn() -> T) -> Self {
        let mut descriptor = Self::without_constructor::<T>();
        descriptor.constructor = Some(Arc::new(move || Box::new(constructor()) as RawInstance));
        descriptor
    }

    /// Descriptor of a component that only a custom instantiation strategy can build
    #[must_use]
    pub fn without_constructor<T: Component>() -> Self {
        let (capabilities, casts) = erase_capabilities::<T>();
        let properties = T::properties().into_iter().map(Property::erase).collect();

        Self {
            type_info: TypeInfo::of::<T>(),
            constructor: None,
            properties,
            capabilities: capabilities.into(),
            casts,
            registry_aware: registry_aware::<T>,
            context_aware: context_aware::<T>,
        }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[PropertyHandle] {
        &self.properties
    }

    /// Directly declared capabilities, each with the capabilities it extends
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[CapabilityNode] {
        &self.capabilities
    }

    #[inline]
    #[must_use]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Calls the captured constructor, `None` if there isn't one
    #[inline]
    #[must_use]
    pub fn construct(&self) -> Option<RawInstance> {
        self.constructor.as_ref().map(|constructor| constructor())
    }

    /// Whether the component can be viewed as the type with the given id
    #[inline]
    #[must_use]
    pub fn provides(&self, capability: TypeId) -> bool {
        self.casts.contains_key(&capability)
    }

    #[inline]
    pub(crate) fn casts(&self) -> CastTable {
        self.casts.clone()
    }

    #[inline]
    pub(crate) fn as_registry_aware<'a>(&self, bean: &'a mut (dyn Any + Send + Sync)) -> Option<&'a mut dyn RegistryAware> {
        (self.registry_aware)(bean)
    }

    #[inline]
    pub(crate) fn as_context_aware<'a>(&self, bean: &'a mut (dyn Any + Send + Sync)) -> Option<&'a mut dyn ContextAware> {
        (self.context_aware)(bean)
    }
}

impl Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type_info", &self.type_info)
            .field("has_constructor", &self.constructor.is_some())
            .field("properties", &self.properties)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

fn erase_capabilities<T: Component>() -> (Vec<CapabilityNode>, CastTable) {
    let mut casts = BTreeMap::new();
    casts.insert(TypeId::of::<T>(), self_caster::<T>());

    let capabilities = T::capabilities()
        .into_iter()
        .map(|capability| capability.erase(&mut casts))
        .collect();
    (capabilities, Arc::new(casts))
}

/// Casts of `T` to itself and to every capability it declares
pub(crate) fn cast_table<T: Component>() -> CastTable {
    erase_capabilities::<T>().1
}

pub(crate) fn self_caster<T: Send + Sync + 'static>() -> Caster {
    Arc::new(|instance: &Instance| {
        let bean = instance.clone().downcast::<T>().ok()?;
        Some(Box::new(bean) as Box<dyn Any>)
    })
}

fn registry_aware<T: Component>(bean: &mut (dyn Any + Send + Sync)) -> Option<&mut dyn RegistryAware> {
    bean.downcast_mut::<T>()?.as_registry_aware()
}

fn context_aware<T: Component>(bean: &mut (dyn Any + Send + Sync)) -> Option<&mut dyn ContextAware> {
    bean.downcast_mut::<T>()?.as_context_aware()
}

/// Builds a [`Capability`] of the component the `capabilities` function is implemented for.
///
/// ```ignore
/// fn capabilities() -> Vec<Capability<Self>> {
///     vec![capability!(dyn UserService).extends(capability!(dyn Service))]
/// }
/// ```
#[macro_export]
macro_rules! capability {
    ($cap:ty) => {
        $crate::Capability::of::<$cap>(|bean| bean as ::std::sync::Arc<$cap>)
    };
}

#[cfg(test)]
mod tests {
    use super::{cast_table, Capability, Component, ComponentDescriptor};
    use crate::{any::Instance, property::Property};

    use std::{any::TypeId, sync::Arc};

    trait Service: Send + Sync {
        fn id(&self) -> u8;
    }

    trait UserService: Service {}

    #[derive(Default)]
    struct UserServiceImpl {
        version: u32,
    }

    impl Service for UserServiceImpl {
        fn id(&self) -> u8 {
            1
        }
    }

    impl UserService for UserServiceImpl {}

    impl Component for UserServiceImpl {
        fn properties() -> Vec<Property<Self>> {
            vec![Property::value("version", "app.version", |bean: &mut Self, version: u32| bean.version = version)]
        }

        fn capabilities() -> Vec<Capability<Self>> {
            vec![capability!(dyn UserService).extends(capability!(dyn Service))]
        }
    }

    struct Standalone;

    impl Component for Standalone {}

    #[test]
    fn test_descriptor_of() {
        let descriptor = ComponentDescriptor::of::<UserServiceImpl>();
        assert_eq!(descriptor.properties().len(), 1);
        assert_eq!(descriptor.capabilities().len(), 1);
        assert_eq!(descriptor.capabilities()[0].extends.len(), 1);
        assert!(descriptor.provides(TypeId::of::<UserServiceImpl>()));
        assert!(descriptor.provides(TypeId::of::<dyn UserService>()));
        assert!(descriptor.provides(TypeId::of::<dyn Service>()));
        assert!(!descriptor.provides(TypeId::of::<Standalone>()));
    }

    #[test]
    fn test_casts() {
        let descriptor = ComponentDescriptor::of::<UserServiceImpl>();
        let instance: Instance = Arc::new(UserServiceImpl { version: 2 });

        let casts = descriptor.casts();
        let service = casts[&TypeId::of::<dyn Service>()](&instance)
            .unwrap()
            .downcast::<Arc<dyn Service>>()
            .unwrap();
        assert_eq!(service.id(), 1);

        let concrete = casts[&TypeId::of::<UserServiceImpl>()](&instance)
            .unwrap()
            .downcast::<Arc<UserServiceImpl>>()
            .unwrap();
        assert_eq!(concrete.version, 2);

        let other: Instance = Arc::new(Standalone);
        assert!(casts[&TypeId::of::<dyn Service>()](&other).is_none());
    }

    #[test]
    fn test_constructor() {
        let descriptor = ComponentDescriptor::with_constructor::<UserServiceImpl>(|| UserServiceImpl { version: 3 });
        let instance = descriptor.construct().unwrap();
        assert_eq!(instance.downcast_ref::<UserServiceImpl>().unwrap().version, 3);

        let descriptor = ComponentDescriptor::without_constructor::<Standalone>();
        assert!(!descriptor.has_constructor());
        assert!(descriptor.construct().is_none());
    }

    #[test]
    fn test_cast_table() {
        let casts = cast_table::<UserServiceImpl>();
        assert_eq!(casts.len(), 3);
        assert!(casts.contains_key(&TypeId::of::<dyn Service>()));
        assert!(cast_table::<Standalone>().contains_key(&TypeId::of::<Standalone>()));
        assert_eq!(cast_table::<Standalone>().len(), 1);
    }
}
