use std::{
    any::{type_name, Any, TypeId},
    borrow::Borrow,
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    ops::Deref,
    sync::Arc,
};

/// Instance as it's held by the registry once initialization is complete
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Instance as it's created by an instantiation strategy, before it's frozen
pub type RawInstance = Box<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Full path of the type.
    /// Trait objects lose the `dyn` keyword and any additional bounds.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self.name.strip_prefix("dyn ") {
            Some(name) => name.split_once(" + ").map_or(name, |(name, _)| name),
            None => self.name,
        }
    }

    /// Last path segment of [`TypeInfo::path`], generic arguments are kept as is
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.path();
        let path_end = name.find('<').unwrap_or(name.len());
        match name[..path_end].rfind("::") {
            Some(idx) => &name[idx + 2..],
            None => name,
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Name of a bean, or of a capability used as an alias of bean names
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeanName(Arc<str>);

impl BeanName {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BeanName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for BeanName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BeanName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BeanName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BeanName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for BeanName {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl PartialEq<str> for BeanName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for BeanName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::{BeanName, TypeInfo};

    trait Service {}
    struct UserService<T>(T);

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<i32>().short_name(), "i32");
        assert_eq!(TypeInfo::of::<String>().short_name(), "String");
        assert_eq!(TypeInfo::of::<dyn Service>().short_name(), "Service");
        assert_eq!(TypeInfo::of::<dyn Service + Send + Sync>().short_name(), "Service");
        assert!(TypeInfo::of::<UserService<String>>().short_name().starts_with("UserService<"));
    }

    #[test]
    fn test_path() {
        assert_eq!(TypeInfo::of::<dyn Service + Send + Sync>().path(), "beanwire::any::tests::Service");
        assert_eq!(TypeInfo::of::<u8>().path(), "u8");
    }

    #[test]
    fn test_bean_name_as_str() {
        fn len(name: &str) -> usize {
            name.len()
        }

        let name = BeanName::from("app::UserServiceImpl");
        assert_eq!(len(&name), 20);
        assert!(name.ends_with("UserServiceImpl"));
    }

    #[test]
    fn test_eq_by_id() {
        assert_eq!(TypeInfo::of::<dyn Service>(), TypeInfo::of::<dyn Service>());
        assert_ne!(TypeInfo::of::<dyn Service>(), TypeInfo::of::<dyn Service + Send>());
    }
}
