#[macro_use]
pub(crate) mod component;

pub(crate) mod alias;
pub(crate) mod any;
pub(crate) mod context;
pub(crate) mod converter;
pub(crate) mod dependency_parser;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod instantiator;
pub(crate) mod naming;
pub(crate) mod processor;
pub(crate) mod properties;
pub(crate) mod property;
pub(crate) mod registry;

pub mod discovery;

pub use alias::{AliasIndex, AliasParser, CapabilityAliasParser};
pub use any::{BeanName, Instance, RawInstance, TypeInfo};
pub use component::{Capability, CapabilityNode, Component, ComponentDescriptor};
pub use context::{Context, ContextInitializer, WeakContext};
pub use converter::{Converter, Converters, FromStrConverter};
pub use dependency_parser::{Dependencies, DependencyParser, MarkerDependencyParser};
pub use discovery::{ComponentList, ComponentSource};
pub use errors::{
    BindErrorKind, BootstrapErrorKind, InstantiateErrorKind, ParseErrorKind, ProcessErrorKind, RegistryErrorKind, ResolveErrorKind,
};
pub use instantiator::{DefaultConstructorStrategy, InstantiationStrategy};
pub use naming::{BeanNameGenerator, QualifiedNameGenerator, SimpleNameGenerator};
pub use processor::{
    BeanPostProcessor, ContextAware, ContextAwareProcessor, DependencyInjectionProcessor, PropertyValueProcessor, RawBean, RegistryAware,
    RegistryAwareProcessor,
};
pub use properties::{DefaultPropertyRegistry, PropertyRegistry};
pub use property::{Marker, Property, PropertyHandle, ValueKind};
pub use registry::{BeanDefinition, Registry, RegistryBuilder, Singleton, WeakRegistry};

#[cfg(feature = "auto")]
pub use discovery::LinkedComponents;
