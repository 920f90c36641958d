use crate::any::BeanName;

#[derive(thiserror::Error, Debug)]
pub enum RegistryErrorKind {
    #[error("Bean {name} has already been registered")]
    DuplicateRegistration { name: BeanName },
    #[error("Bean {name} not found in registry")]
    NotFound { name: BeanName },
    #[error(
        "Capability {capability} is provided by several beans ({}), depend on a concrete type instead",
        candidates.iter().map(BeanName::as_str).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousCapability { capability: BeanName, candidates: Vec<BeanName> },
    #[error("Registry can't be initialized multiple times")]
    AlreadyInitialized,
}
