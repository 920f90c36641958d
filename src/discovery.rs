use tracing::debug;

use crate::component::{Component, ComponentDescriptor};

/// Yields the components managed by the container under `root`
pub trait ComponentSource: Send + Sync {
    fn scan(&self, root: &str) -> Vec<ComponentDescriptor>;
}

impl<F> ComponentSource for F
where
    F: Fn(&str) -> Vec<ComponentDescriptor> + Send + Sync,
{
    #[inline]
    fn scan(&self, root: &str) -> Vec<ComponentDescriptor> {
        self(root)
    }
}

/// Explicitly listed components. The root is ignored.
#[derive(Debug, Clone, Default)]
pub struct ComponentList {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentList {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with<T: Component + Default>(self) -> Self {
        self.with_descriptor(ComponentDescriptor::of::<T>())
    }

    #[inline]
    #[must_use]
    pub fn with_constructor<T: Component>(self, constructor: fn() -> T) -> Self {
        self.with_descriptor(ComponentDescriptor::with_constructor(constructor))
    }

    #[inline]
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl ComponentSource for ComponentList {
    fn scan(&self, _root: &str) -> Vec<ComponentDescriptor> {
        self.descriptors.clone()
    }
}

#[cfg(feature = "auto")]
pub use linked::{LinkedComponents, COMPONENTS};

#[cfg(feature = "auto")]
#[doc(hidden)]
pub use linkme::{self, distributed_slice};

#[cfg(feature = "auto")]
mod linked {
    use linkme::distributed_slice;
    use tracing::debug;

    use super::ComponentSource;
    use crate::component::ComponentDescriptor;

    /// Components registered with [`crate::component!`] anywhere in the final binary
    #[distributed_slice]
    pub static COMPONENTS: [fn() -> ComponentDescriptor];

    /// Components collected at link time, filtered by the module path they're declared in.
    /// Use `module_path!()` of the crate root (or any module) as the root, an empty root matches everything.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LinkedComponents;

    impl ComponentSource for LinkedComponents {
        fn scan(&self, root: &str) -> Vec<ComponentDescriptor> {
            let descriptors = COMPONENTS
                .iter()
                .map(|getter| getter())
                .filter(|descriptor| in_module(descriptor.type_info().name, root))
                .collect::<Vec<_>>();
            debug!(root, found = descriptors.len(), total = COMPONENTS.len(), "Components scanned");
            descriptors
        }
    }

    fn in_module(type_name: &str, root: &str) -> bool {
        if root.is_empty() {
            return true;
        }
        match type_name.strip_prefix(root) {
            Some(rest) => rest.starts_with("::"),
            None => false,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::in_module;

        #[test]
        fn test_in_module() {
            assert!(in_module("app::service::UserServiceImpl", "app"));
            assert!(in_module("app::service::UserServiceImpl", "app::service"));
            assert!(in_module("app::service::UserServiceImpl", ""));
            assert!(!in_module("application::UserServiceImpl", "app"));
            assert!(!in_module("other::UserServiceImpl", "app"));
        }
    }
}

/// Registers a component for [`LinkedComponents`] discovery.
///
/// ```ignore
/// component!(UserServiceImpl);
/// component!(Config, || Config { retries: 3 });
/// ```
#[cfg(feature = "auto")]
#[macro_export]
macro_rules! component {
    ($ty:ty) => {
        $crate::component!($ty, <$ty as ::core::default::Default>::default);
    };
    ($ty:ty, $constructor:expr) => {
        const _: () = {
            #[$crate::discovery::distributed_slice($crate::discovery::COMPONENTS)]
            #[linkme(crate = $crate::discovery::linkme)]
            static COMPONENT: fn() -> $crate::ComponentDescriptor = || $crate::ComponentDescriptor::with_constructor::<$ty>($constructor);
        };
    };
}

pub(crate) fn scan(source: &dyn ComponentSource, root: &str) -> Vec<ComponentDescriptor> {
    let descriptors = source.scan(root);
    debug!(root, count = descriptors.len(), "Component descriptors loaded");
    descriptors
}
