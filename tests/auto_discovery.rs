use std::sync::Arc;

use beanwire::{capability, component, Capability, Component, ComponentSource as _, Context, LinkedComponents, Property};
use tracing_test::traced_test;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

impl Component for FixedClock {
    fn capabilities() -> Vec<Capability<Self>> {
        vec![capability!(dyn Clock)]
    }
}

component!(FixedClock, || FixedClock(42));

#[derive(Default)]
struct Scheduler {
    clock: Option<Arc<dyn Clock>>,
}

impl Component for Scheduler {
    fn properties() -> Vec<Property<Self>> {
        vec![Property::dependency("clock", |bean: &mut Self, clock: Arc<dyn Clock>| bean.clock = Some(clock))]
    }
}

component!(Scheduler);

mod outside {
    use beanwire::{component, Component};

    #[derive(Default)]
    pub struct Unrelated;

    impl Component for Unrelated {}

    component!(Unrelated);
}

#[test]
fn test_scan() {
    let all = LinkedComponents.scan("");
    assert_eq!(all.len(), 3);

    let scoped = LinkedComponents.scan(concat!(module_path!(), "::outside"));
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].type_info().short_name(), "Unrelated");

    assert!(LinkedComponents.scan("auto_discovery_other").is_empty());
}

#[test]
#[traced_test]
fn test_initialize_from_linked() {
    let context = Context::builder().initialize(module_path!()).unwrap();
    let registry = context.get_registry();

    let scheduler = registry.get_by_name::<Scheduler>("Scheduler").unwrap();
    assert_eq!(scheduler.clock.as_ref().unwrap().now(), 42);
    assert!(registry.contains("Unrelated"));
}
