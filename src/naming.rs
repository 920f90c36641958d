use crate::any::{BeanName, TypeInfo};

/// Derives canonical bean names (and capability names) from type identities
pub trait BeanNameGenerator: Send + Sync {
    fn generate(&self, type_info: &TypeInfo) -> BeanName;
}

impl<F> BeanNameGenerator for F
where
    F: Fn(&TypeInfo) -> BeanName + Send + Sync,
{
    #[inline]
    fn generate(&self, type_info: &TypeInfo) -> BeanName {
        self(type_info)
    }
}

/// Last path segment of the type, so `app::service::UserServiceImpl` becomes `UserServiceImpl`.
/// Types with the same name in different modules get the same bean name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleNameGenerator;

impl BeanNameGenerator for SimpleNameGenerator {
    #[inline]
    fn generate(&self, type_info: &TypeInfo) -> BeanName {
        BeanName::from(type_info.short_name())
    }
}

/// Full type path, trait objects without `dyn` and auto-trait bounds.
/// This is the default generator, every concrete type gets its own bean name.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedNameGenerator;

impl BeanNameGenerator for QualifiedNameGenerator {
    #[inline]
    fn generate(&self, type_info: &TypeInfo) -> BeanName {
        BeanName::from(type_info.path())
    }
}
