use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, error};

use crate::{
    any::BeanName,
    component::{CapabilityNode, ComponentDescriptor},
    errors::RegistryErrorKind,
    naming::BeanNameGenerator,
};

/// Computes the capability names a component is indexed under
pub trait AliasParser: Send + Sync {
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Vec<BeanName>;
}

impl<F> AliasParser for F
where
    F: Fn(&ComponentDescriptor, &dyn BeanNameGenerator) -> Vec<BeanName> + Send + Sync,
{
    #[inline]
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Vec<BeanName> {
        self(descriptor, generator)
    }
}

/// Walks the whole capability tree breadth-first, so capabilities extended by declared ones are indexed too.
/// Each capability is reported once, even if it's reachable by several paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityAliasParser;

impl AliasParser for CapabilityAliasParser {
    fn parse(&self, descriptor: &ComponentDescriptor, generator: &dyn BeanNameGenerator) -> Vec<BeanName> {
        let mut seen = BTreeSet::from([descriptor.type_info().id]);
        let mut queue = descriptor.capabilities().iter().collect::<VecDeque<&CapabilityNode>>();
        let mut aliases = Vec::new();

        while let Some(node) = queue.pop_front() {
            if !seen.insert(node.type_info.id) {
                continue;
            }
            aliases.push(generator.generate(&node.type_info));
            queue.extend(node.extends.iter());
        }
        aliases
    }
}

/// Capability name to the names of the beans providing it
#[derive(Debug, Default, Clone)]
pub struct AliasIndex {
    aliases: BTreeMap<BeanName, BTreeSet<BeanName>>,
}

impl AliasIndex {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `bean` as a provider of `capability`.
    /// A bean is never an alias of itself.
    pub fn add_alias(&mut self, bean: BeanName, capability: BeanName) {
        if bean == capability {
            return;
        }
        debug!(%bean, %capability, "Alias added");
        self.aliases.entry(capability).or_default().insert(bean);
    }

    /// Resolves a bean name or capability name to a concrete bean name.
    ///
    /// `is_bean` tells whether the name is a concrete bean name, which is returned unchanged.
    /// An unknown name resolves to `None`.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::AmbiguousCapability`] if the capability is provided by several beans
    pub fn resolve(&self, name: &str, is_bean: impl Fn(&str) -> bool) -> Result<Option<BeanName>, RegistryErrorKind> {
        if is_bean(name) {
            return Ok(Some(BeanName::from(name)));
        }

        let Some(candidates) = self.aliases.get(name) else {
            return Ok(None);
        };
        let mut iter = candidates.iter();
        match (iter.next(), iter.next()) {
            (Some(bean), None) => Ok(Some(bean.clone())),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => {
                let err = RegistryErrorKind::AmbiguousCapability {
                    capability: BeanName::from(name),
                    candidates: candidates.iter().cloned().collect(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Beans providing the capability, in name order
    #[must_use]
    pub fn candidates(&self, capability: &str) -> Vec<BeanName> {
        self.aliases
            .get(capability)
            .map(|candidates| candidates.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.aliases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{AliasIndex, AliasParser, CapabilityAliasParser};
    use crate::{
        any::BeanName,
        component::{Capability, Component, ComponentDescriptor},
        errors::RegistryErrorKind,
        naming::SimpleNameGenerator,
    };

    use std::any::TypeId;
    use tracing_test::traced_test;

    trait Service: Send + Sync {}
    trait UserService: Service {}
    trait Auditable: Service {}

    #[derive(Default)]
    struct UserServiceImpl;

    impl Service for UserServiceImpl {}
    impl UserService for UserServiceImpl {}
    impl Auditable for UserServiceImpl {}

    impl Component for UserServiceImpl {
        fn capabilities() -> Vec<Capability<Self>> {
            vec![
                capability!(dyn UserService).extends(capability!(dyn Service)),
                capability!(dyn Auditable).extends(capability!(dyn Service)),
            ]
        }
    }

    #[test]
    fn test_parse_transitive() {
        let descriptor = ComponentDescriptor::of::<UserServiceImpl>();
        let aliases = CapabilityAliasParser.parse(&descriptor, &SimpleNameGenerator);
        assert_eq!(aliases, vec![BeanName::from("UserService"), BeanName::from("Auditable"), BeanName::from("Service")]);

        assert!(descriptor.provides(TypeId::of::<dyn Service>()));
        assert!(descriptor.provides(TypeId::of::<dyn Auditable>()));
    }

    #[test]
    #[traced_test]
    fn test_resolve() {
        let mut index = AliasIndex::new();
        index.add_alias("UserServiceImpl".into(), "Service".into());
        index.add_alias("UserServiceImpl".into(), "UserService".into());
        index.add_alias("UserServiceImpl".into(), "UserServiceImpl".into());
        index.add_alias("OrderService".into(), "Service".into());

        let is_bean = |name: &str| name == "UserServiceImpl" || name == "OrderService";

        assert_eq!(index.resolve("UserServiceImpl", is_bean).unwrap().unwrap(), "UserServiceImpl");
        assert_eq!(index.resolve("UserService", is_bean).unwrap().unwrap(), "UserServiceImpl");
        assert!(index.resolve("Unknown", is_bean).unwrap().is_none());
        assert!(!index.is_alias("UserServiceImpl"));

        match index.resolve("Service", is_bean) {
            Err(RegistryErrorKind::AmbiguousCapability { capability, candidates }) => {
                assert_eq!(capability, "Service");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("Unexpected result: {other:?}"),
        }
        assert_eq!(index.candidates("Service").len(), 2);
    }
}
