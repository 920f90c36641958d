use std::fmt::{self, Display, Formatter};

use super::RegistryErrorKind;
use crate::any::BeanName;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Bean {bean} depends on {capability}, which isn't provided by any bean")]
    UnsatisfiedDependency { bean: BeanName, capability: BeanName },
    #[error("Circular dependency detected: {}", DisplayPath(path))]
    CircularDependency { path: Vec<BeanName> },
    #[error(transparent)]
    Registry(#[from] RegistryErrorKind),
}

impl ResolveErrorKind {
    /// Beans forming the cycle, the first bean is repeated at the end
    #[must_use]
    pub fn cycle(&self) -> Option<&[BeanName]> {
        match self {
            Self::CircularDependency { path } => Some(path),
            _ => None,
        }
    }
}

struct DisplayPath<'a>(&'a [BeanName]);

impl Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names = self.0.iter();
        if let Some(name) = names.next() {
            write!(f, "{name}")?;
        }
        for name in names {
            write!(f, " -> {name}")?;
        }
        Ok(())
    }
}
