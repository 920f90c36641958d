#![allow(dead_code)]

use beanwire::{capability, Capability, Component, ComponentList, Context, DefaultPropertyRegistry, Property, Registry};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

trait Leaf: Send + Sync {}

#[derive(Default)]
struct CAAAAA;

impl Leaf for CAAAAA {}

impl Component for CAAAAA {
    fn capabilities() -> Vec<Capability<Self>> {
        vec![capability!(dyn Leaf)]
    }
}

macro_rules! node {
    ($name:ident, $dep:ty) => {
        #[derive(Default)]
        struct $name(Option<Arc<$dep>>);

        impl Component for $name {
            fn properties() -> Vec<Property<Self>> {
                vec![Property::dependency("dep", |bean: &mut Self, dep: Arc<$dep>| bean.0 = Some(dep))]
            }
        }
    };
}

node!(CAAAA, dyn Leaf);
node!(CAAA, CAAAA);
node!(CAA, CAAA);
node!(CA, CAA);
node!(C, CA);

#[derive(Default)]
struct B(i32);

impl Component for B {
    fn properties() -> Vec<Property<Self>> {
        vec![Property::value("value", "b.value", |bean: &mut Self, value: i32| bean.0 = value)]
    }
}

#[derive(Default)]
struct A(Option<Arc<B>>, Option<Arc<C>>);

impl Component for A {
    fn properties() -> Vec<Property<Self>> {
        vec![
            Property::dependency("b", |bean: &mut Self, b: Arc<B>| bean.0 = Some(b)),
            Property::dependency("c", |bean: &mut Self, c: Arc<C>| bean.1 = Some(c)),
        ]
    }
}

#[inline]
fn components() -> ComponentList {
    ComponentList::new()
        .with::<A>()
        .with::<B>()
        .with::<C>()
        .with::<CA>()
        .with::<CAA>()
        .with::<CAAA>()
        .with::<CAAAA>()
        .with::<CAAAAA>()
}

#[inline]
fn context_initialize() -> Context {
    Context::builder()
        .component_source(components())
        .property_registry(DefaultPropertyRegistry::from_pairs([("b.value", "2")]))
        .initialize("")
        .unwrap()
}

#[inline]
fn registry_refresh() -> Registry {
    let registry = Registry::new();
    registry.refresh(&components(), "").unwrap();
    registry
}

#[inline]
fn registry_get(registry: &Registry) {
    let _ = registry.get_by_name::<A>("A").unwrap();
}

#[inline]
fn registry_get_by_capability(registry: &Registry) {
    let _ = registry.get_by_capability::<dyn Leaf>().unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let context = context_initialize();
    let registry = context.get_registry().clone();

    c.bench_function("context_initialize", |b| b.iter(context_initialize))
        .bench_function("registry_refresh", |b| b.iter(registry_refresh))
        .bench_function("registry_get", |b| b.iter(|| registry_get(&registry)))
        .bench_function("registry_get_by_capability", |b| b.iter(|| registry_get_by_capability(&registry)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
