use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, debug_span, error};

use crate::{
    any::{BeanName, Instance, TypeInfo},
    component::CapabilityNode,
    errors::{BootstrapErrorKind, InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind},
    processor::RawBean,
    registry::{Registry, Singleton},
};

/// Bean on the current resolution path with the capabilities it still has to walk through
struct Frame {
    name: BeanName,
    requirements: Vec<BeanName>,
    next: usize,
}

/// Resolves `root` and everything it depends on, depth-first.
///
/// Each bean is instantiated when it's entered and registered as early,
/// then initialized and registered as resolved once all its dependencies are resolved.
/// The path is kept on an explicit stack, so a dependency already on it is reported as a cycle with the whole path.
pub(crate) fn resolve(registry: &Registry, root: &BeanName) -> Result<(), BootstrapErrorKind> {
    if registry.is_resolved(root) {
        return Ok(());
    }

    let mut edges = BTreeSet::new();
    let mut path = vec![enter(registry, root)?];

    while let Some(frame) = path.last_mut() {
        let Some(capability) = frame.requirements.get(frame.next).cloned() else {
            let name = frame.name.clone();
            path.pop();
            complete(registry, name)?;
            continue;
        };
        frame.next += 1;
        let bean = frame.name.clone();

        let Some(dependency) = registry.resolve_name(&capability).map_err(ResolveErrorKind::from)? else {
            let err = ResolveErrorKind::UnsatisfiedDependency { bean, capability };
            error!("{}", err);
            return Err(err.into());
        };

        if let Some(pos) = path.iter().position(|frame| frame.name == dependency) {
            let mut cycle = path[pos..].iter().map(|frame| frame.name.clone()).collect::<Vec<_>>();
            cycle.push(dependency);
            let err = ResolveErrorKind::CircularDependency { path: cycle };
            error!("{}", err);
            return Err(err.into());
        }

        if !edges.insert((bean.clone(), dependency.clone())) {
            debug!(%bean, %dependency, "Edge already walked");
            continue;
        }
        if registry.is_resolved(&dependency) {
            continue;
        }
        path.push(enter(registry, &dependency)?);
    }

    Ok(())
}

/// Instantiates the bean and registers it as early
fn enter(registry: &Registry, name: &BeanName) -> Result<Frame, BootstrapErrorKind> {
    let span = debug_span!("enter", bean = %name);
    let _guard = span.enter();

    let Some(definition) = registry.definition(name) else {
        let err = RegistryErrorKind::NotFound { name: name.clone() };
        error!("{}", err);
        return Err(err.into());
    };
    let requirements = registry
        .dependencies(name)
        .map(|dependencies| dependencies.keys().cloned().collect())
        .unwrap_or_default();

    let instance = registry.instantiate(&definition)?;
    registry.register_early(RawBean::new(definition, instance))?;

    Ok(Frame {
        name: name.clone(),
        requirements,
        next: 0,
    })
}

/// Runs the pipeline over the early bean, then freezes and registers it
fn complete(registry: &Registry, name: BeanName) -> Result<(), BootstrapErrorKind> {
    let span = debug_span!("complete", bean = %name);
    let _guard = span.enter();

    let Some(bean) = registry.take_early(&name) else {
        let err = RegistryErrorKind::NotFound { name };
        error!("{}", err);
        return Err(err.into());
    };
    let definition = Arc::clone(&bean.definition);

    let bean = registry.process(bean)?;
    let missing = if bean.instance.as_ref().type_id() == bean.type_info().id {
        missing_capability(definition.descriptor().capabilities(), &bean)
    } else {
        Some(bean.type_info())
    };
    if let Some(expected) = missing {
        let err = InstantiateErrorKind::IncorrectType { name, expected };
        error!("{}", err);
        return Err(err.into());
    }

    let (instance, type_info, casts) = bean.into_parts();
    let instance: Instance = Arc::from(instance);
    registry.register_resolved(name, Singleton::from_parts(instance, type_info, casts))?;
    debug!("Resolved");
    Ok(())
}

/// First capability the bean is indexed under that its current instance can't be viewed as
fn missing_capability(nodes: &[CapabilityNode], bean: &RawBean) -> Option<TypeInfo> {
    nodes.iter().find_map(|node| {
        if bean.provides(node.type_info.id) {
            missing_capability(&node.extends, bean)
        } else {
            Some(node.type_info)
        }
    })
}
