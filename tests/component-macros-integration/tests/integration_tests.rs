//! 组件派生宏集成测试

use aop_abstractions::{AspectDefinition, JoinPoint};
use component_macros::Component;
use di_abstractions::{Autowired, ComponentType};
use di_impl::StaticDiscovery;
use infrastructure_common::{
    string_arg, ConfigurationError, InfrastructureError, Invocable, InvocationError,
    OperationSignature, Value,
};
use infrastructure_composition::ApplicationContext;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

mod shop {
    use super::*;

    /// 共享调用记录
    #[derive(Default, Component)]
    pub struct Journal {
        pub entries: Mutex<Vec<String>>,
    }

    impl Journal {
        pub fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[derive(Default, Component)]
    #[component(invocable, init = "start")]
    pub struct UserService {
        #[autowired]
        pub journal: Autowired<Journal>,
        #[autowired]
        pub order_service: Autowired<dyn Invocable>,
        pub started: AtomicBool,
    }

    impl UserService {
        fn start(&self) -> Result<(), InvocationError> {
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Invocable for UserService {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::of::<Self>("createUser").param("String")]
        }

        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
            match operation {
                "createUser" => {
                    let user = string_arg(operation, args, 0)?;
                    if let Some(journal) = self.journal.get() {
                        journal.push(format!("user:{}", user));
                    }
                    match self.order_service.get() {
                        Some(orders) => orders.invoke("createOrder", args),
                        None => Err(InvocationError::failed(operation, "orderService 未注入")),
                    }
                }
                _ => Err(InvocationError::unknown_operation("UserService", operation)),
            }
        }
    }

    /// 与 UserService 互相依赖
    #[derive(Default, Component)]
    #[component(name = "orderService", invocable, destroy = "shutdown")]
    pub struct OrderServiceImpl {
        #[autowired]
        pub journal: Autowired<Journal>,
        #[autowired]
        pub user_service: Autowired<dyn Invocable>,
        #[autowired(name = "discountService", required = false)]
        pub discounts: Autowired<dyn Invocable>,
    }

    impl OrderServiceImpl {
        fn shutdown(&self) -> Result<(), String> {
            if let Some(journal) = self.journal.get() {
                journal.push("shutdown:orderService");
            }
            Ok(())
        }
    }

    impl Invocable for OrderServiceImpl {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::of::<Self>("createOrder").param("String")]
        }

        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
            match operation {
                "createOrder" => {
                    let user = string_arg(operation, args, 0)?;
                    if let Some(journal) = self.journal.get() {
                        journal.push(format!("order:{}", user));
                    }
                    Ok(Value::from(format!("order-for-{}", user)))
                }
                _ => Err(InvocationError::unknown_operation("OrderServiceImpl", operation)),
            }
        }
    }

    #[derive(Default, Component)]
    #[component(aspect = "advice")]
    pub struct CountingAspect {
        pub calls: AtomicUsize,
    }

    impl CountingAspect {
        fn advice() -> AspectDefinition {
            AspectDefinition::new().before(
                "execution(* shop.*.create*(..))",
                "count",
                |aspect: &CountingAspect, _jp: &JoinPoint<'_>| {
                    aspect.calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )
        }
    }
}

mod registered {
    use super::*;

    /// 通过链接期登记发现
    #[derive(Default, Component)]
    #[component(register, name = "ticker")]
    pub struct Ticker {
        #[autowired(optional)]
        pub clock: Autowired<Clock>,
    }

    #[derive(Default)]
    pub struct Clock;
}

use shop::{CountingAspect, Journal, OrderServiceImpl, UserService};

fn shop_discovery() -> StaticDiscovery {
    StaticDiscovery::new()
        .with::<UserService>()
        .with::<OrderServiceImpl>()
        .with::<Journal>()
        .with::<CountingAspect>()
}

#[test]
fn test_generated_definitions() {
    let user = UserService::definition();
    assert!(user.explicit_name().is_none());
    assert!(user.has_init());
    assert!(!user.has_destroy());

    let names: Vec<_> = user
        .dependencies()
        .iter()
        .map(|dependency| (dependency.name(), dependency.field_name(), dependency.is_required()))
        .collect();
    assert_eq!(
        names,
        vec![("journal", "journal", true), ("orderService", "order_service", true)]
    );
    assert!(user.dependencies()[1].is_interface());

    let orders = OrderServiceImpl::definition();
    assert_eq!(orders.explicit_name(), Some("orderService"));
    assert!(orders.has_destroy());
    assert!(!orders.dependencies()[2].is_required());

    assert!(CountingAspect::definition().is_aspect());
}

#[test]
fn test_derived_components_form_a_context() -> anyhow::Result<()> {
    let context = ApplicationContext::builder()
        .with_discovery(shop_discovery())
        .start()?;

    let user_service = context.get_invocable("userService")?;
    let result = user_service.invoke("createUser", &[Value::from("carol")])?;
    assert_eq!(result, Value::from("order-for-carol"));

    let aspect = context.get_bean_typed::<CountingAspect>("countingAspect")?;
    assert_eq!(aspect.calls.load(Ordering::SeqCst), 2);

    let raw_user = context
        .get_bean("userService")?
        .downcast::<UserService>()
        .expect("raw instance");
    assert!(raw_user.started.load(Ordering::SeqCst));

    let journal = context.get_bean_typed::<Journal>("journal")?;
    assert_eq!(journal.entries(), vec!["user:carol", "order:carol"]);

    context.close()?;
    assert_eq!(journal.entries().last().map(String::as_str), Some("shutdown:orderService"));
    Ok(())
}

#[test]
fn test_duplicate_derived_names_fail_scan() {
    let context = ApplicationContext::builder()
        .with_discovery(shop_discovery().with::<UserService>())
        .build()
        .expect("build");

    let err = context.scan().expect_err("duplicate userService");
    assert!(matches!(
        err,
        InfrastructureError::Configuration {
            source: ConfigurationError::DuplicateName { .. }
        }
    ));
}

#[test]
fn test_registered_component_is_discovered() -> anyhow::Result<()> {
    let context = ApplicationContext::run("integration_tests::registered")?;

    assert_eq!(context.bean_names(), vec!["ticker"]);
    let ticker: Arc<registered::Ticker> = context.get_bean_typed("ticker")?;
    assert!(!ticker.clock.is_set());
    Ok(())
}
