//! 容器端到端集成测试：通过应用上下文验证创建协议与拦截层

use aop_abstractions::{AspectDefinition, JoinPoint, ProceedingJoinPoint};
use di_abstractions::{
    Autowired, BeanPostProcessor, ComponentDefinition, ContainerConfig, DependencyDescriptor,
};
use di_impl::StaticDiscovery;
use infrastructure_common::{
    string_arg, BeanRef, BoxError, DependencyError, InfrastructureError, Invocable,
    InvocationError, OperationSignature, Value,
};
use infrastructure_composition::ApplicationContext;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 记录调用顺序
#[derive(Default)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

fn context(discovery: StaticDiscovery, config: ContainerConfig) -> ApplicationContext {
    ApplicationContext::builder()
        .container_config(config)
        .with_discovery(discovery)
        .build()
        .unwrap()
}

fn started(discovery: StaticDiscovery) -> ApplicationContext {
    let context = context(discovery, ContainerConfig::default());
    context.start().unwrap();
    context
}

fn dependency_error(error: InfrastructureError) -> DependencyError {
    match error {
        InfrastructureError::Dependency { source } => source,
        other => panic!("期望依赖错误, 实际: {other}"),
    }
}

mod cycle {
    use super::*;

    #[derive(Default)]
    pub struct Left {
        pub right: Autowired<Right>,
    }

    #[derive(Default)]
    pub struct Right {
        pub left: Autowired<Left>,
    }

    pub fn discovery() -> StaticDiscovery {
        StaticDiscovery::new()
            .with_definition(
                ComponentDefinition::of::<Left>()
                    .depends_on(DependencyDescriptor::field("right", "right", |l: &Left| &l.right)),
            )
            .with_definition(
                ComponentDefinition::of::<Right>()
                    .depends_on(DependencyDescriptor::field("left", "left", |r: &Right| &r.left)),
            )
    }
}

#[test]
fn test_cycle_cross_references_point_at_finished_singletons() {
    let context = started(cycle::discovery());

    let left = context.get_bean_typed::<cycle::Left>("left").unwrap();
    let right = context.get_bean_typed::<cycle::Right>("right").unwrap();

    assert!(Arc::ptr_eq(left.right.get().unwrap(), &right));
    assert!(Arc::ptr_eq(right.left.get().unwrap(), &left));
    assert_eq!(context.stats().early_references, 1);
}

#[test]
fn test_cycle_resolves_from_either_side_when_lazy() {
    for first in ["left", "right"] {
        let context = context(
            cycle::discovery(),
            ContainerConfig {
                eager_init: false,
                ..ContainerConfig::default()
            },
        );
        context.start().unwrap();

        context.get_bean(first).unwrap();
        let left = context.get_bean_typed::<cycle::Left>("left").unwrap();
        let right = context.get_bean_typed::<cycle::Right>("right").unwrap();
        assert!(Arc::ptr_eq(left.right.get().unwrap(), &right));
        assert!(Arc::ptr_eq(right.left.get().unwrap(), &left));
    }
}

#[test]
fn test_singleton_law() {
    let context = started(cycle::discovery());

    let first = context.get_bean("left").unwrap();
    let second = context.get_bean("left").unwrap();
    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&context.get_bean("right").unwrap()));
}

mod missing {
    use super::*;

    #[derive(Default)]
    pub struct Checkout {
        pub payments: Autowired<dyn Invocable>,
        pub coupons: Autowired<dyn Invocable>,
    }

    pub fn checkout(required_payments: bool) -> ComponentDefinition {
        ComponentDefinition::of::<Checkout>()
            .depends_on(
                DependencyDescriptor::field("paymentGateway", "payments", |c: &Checkout| &c.payments)
                    .with_required(required_payments),
            )
            .depends_on(
                DependencyDescriptor::field("couponService", "coupons", |c: &Checkout| &c.coupons)
                    .optional(),
            )
    }
}

#[test]
fn test_missing_required_dependency_names_both_sides() {
    let context = context(
        StaticDiscovery::new().with_definition(missing::checkout(true)),
        ContainerConfig::default(),
    );
    context.scan().unwrap();

    let error = dependency_error(context.refresh().unwrap_err());
    assert_eq!(error.missing_dependency(), Some(("checkout", "paymentGateway")));
    assert_eq!(error.creation_chain(), vec!["checkout"]);
    assert!(!context.is_singleton_in_creation("checkout"));
}

#[test]
fn test_missing_optional_dependencies_are_left_unset() {
    let context = started(StaticDiscovery::new().with_definition(missing::checkout(false)));

    let checkout = context.get_bean_typed::<missing::Checkout>("checkout").unwrap();
    assert!(!checkout.payments.is_set());
    assert!(!checkout.coupons.is_set());
}

mod processors {
    use super::*;

    pub struct Greeter {
        pub label: &'static str,
    }

    impl Default for Greeter {
        fn default() -> Self {
            Self { label: "original" }
        }
    }

    /// 在后置阶段替换对象
    pub struct Replacer;

    impl BeanPostProcessor for Replacer {
        fn name(&self) -> &str {
            "replacer"
        }

        fn post_process_after_initialization(
            &self,
            bean: BeanRef,
            _bean_name: &str,
        ) -> Result<BeanRef, BoxError> {
            if bean.downcast_ref::<Greeter>().is_some() {
                return Ok(BeanRef::new(Arc::new(Greeter { label: "replaced" })));
            }
            Ok(bean)
        }
    }

    /// 记录看到的对象
    #[derive(Default)]
    pub struct Observer {
        pub seen: Mutex<Vec<&'static str>>,
    }

    impl BeanPostProcessor for Observer {
        fn name(&self) -> &str {
            "observer"
        }

        fn post_process_after_initialization(
            &self,
            bean: BeanRef,
            _bean_name: &str,
        ) -> Result<BeanRef, BoxError> {
            if let Some(greeter) = bean.downcast_ref::<Greeter>() {
                self.seen.lock().unwrap().push(greeter.label);
            }
            Ok(bean)
        }
    }
}

#[test]
fn test_replacement_is_seen_downstream_and_stored() {
    let observer = Arc::new(processors::Observer::default());
    let context = ApplicationContext::builder()
        .with_discovery(
            StaticDiscovery::new().with_definition(ComponentDefinition::of::<processors::Greeter>()),
        )
        .with_post_processor(Arc::new(processors::Replacer))
        .with_post_processor(observer.clone())
        .start()
        .unwrap();

    assert_eq!(*observer.seen.lock().unwrap(), vec!["replaced"]);
    let greeter = context.get_bean_typed::<processors::Greeter>("greeter").unwrap();
    assert_eq!(greeter.label, "replaced");
}

mod shop {
    use super::*;

    #[derive(Default)]
    pub struct OrderService {
        pub journal: Autowired<Journal>,
    }

    impl Invocable for OrderService {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![
                OperationSignature::of::<Self>("createOrder").param("String"),
                OperationSignature::of::<Self>("cancelOrder").param("String"),
            ]
        }

        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
            let journal = self
                .journal
                .get()
                .ok_or_else(|| InvocationError::failed(operation, "journal 未注入"))?;
            match operation {
                "createOrder" => {
                    let user = string_arg(operation, args, 0)?;
                    journal.push(format!("createOrder:{}", user));
                    Ok(Value::from(format!("order-for-{}", user)))
                }
                "cancelOrder" => {
                    journal.push("cancelOrder");
                    Err(InvocationError::failed(operation, "订单已发货"))
                }
                _ => Err(InvocationError::unknown_operation("OrderService", operation)),
            }
        }
    }

    #[derive(Default)]
    pub struct UserService {
        pub order_service: Autowired<dyn Invocable>,
    }

    impl Invocable for UserService {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::of::<Self>("createUser").param("String")]
        }

        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
            match operation {
                "createUser" => match self.order_service.get() {
                    Some(orders) => orders.invoke("createOrder", args),
                    None => Err(InvocationError::failed(operation, "orderService 未注入")),
                },
                _ => Err(InvocationError::unknown_operation("UserService", operation)),
            }
        }
    }

    #[derive(Default)]
    pub struct TraceAspect {
        pub journal: Autowired<Journal>,
    }

    impl TraceAspect {
        fn record(&self, entry: String) {
            if let Some(journal) = self.journal.get() {
                journal.push(entry);
            }
        }
    }

    pub fn discovery(aspect: AspectDefinition) -> StaticDiscovery {
        StaticDiscovery::new()
            .with_definition(ComponentDefinition::of::<Journal>())
            .with_definition(
                ComponentDefinition::invocable::<UserService>().depends_on(
                    DependencyDescriptor::field("orderService", "order_service", |u: &UserService| {
                        &u.order_service
                    }),
                ),
            )
            .with_definition(
                ComponentDefinition::invocable::<OrderService>().depends_on(
                    DependencyDescriptor::field("journal", "journal", |o: &OrderService| &o.journal),
                ),
            )
            .with_definition(
                ComponentDefinition::of::<TraceAspect>()
                    .depends_on(DependencyDescriptor::field("journal", "journal", |a: &TraceAspect| {
                        &a.journal
                    }))
                    .aspect(aspect),
            )
    }

    pub fn trace_before_after() -> AspectDefinition {
        AspectDefinition::new()
            .before("*Service.*", "before", |a: &TraceAspect, jp: &JoinPoint<'_>| {
                a.record(format!("before:{}", jp.operation_name()));
                Ok(())
            })
            .after("*Service.*", "after", |a: &TraceAspect, jp: &JoinPoint<'_>| {
                a.record(format!("after:{}", jp.operation_name()));
                Ok(())
            })
    }
}

fn journal(context: &ApplicationContext) -> Arc<Journal> {
    context.get_bean_typed::<Journal>("journal").unwrap()
}

#[test]
fn test_example_user_service_reaches_order_service() {
    let context = started(shop::discovery(AspectDefinition::new()));

    let users = context.get_invocable("userService").unwrap();
    let result = users.invoke("createUser", &[Value::from("alice")]).unwrap();

    assert_eq!(result, Value::from("order-for-alice"));
    assert_eq!(journal(&context).entries(), vec!["createOrder:alice"]);
    assert_eq!(context.stats().proxies_created, 0);
}

#[test]
fn test_before_and_after_wrap_the_operation_even_when_it_fails() {
    let context = started(shop::discovery(shop::trace_before_after()));
    let orders = context.get_invocable("orderService").unwrap();

    orders.invoke("createOrder", &[Value::from("bob")]).unwrap();
    assert_eq!(
        journal(&context).entries(),
        vec!["before:createOrder", "createOrder:bob", "after:createOrder"]
    );

    let error = orders.invoke("cancelOrder", &[]).unwrap_err();
    assert!(matches!(error.primary(), InvocationError::Failed { operation, .. } if operation == "cancelOrder"));
    assert_eq!(
        journal(&context).entries()[3..],
        ["before:cancelOrder", "cancelOrder", "after:cancelOrder"]
    );
}

#[test]
fn test_around_without_proceed_suppresses_the_operation() {
    let aspect = AspectDefinition::new().around(
        "OrderService.createOrder",
        "block",
        |_a: &shop::TraceAspect, _pjp: ProceedingJoinPoint| Ok(Value::from("blocked")),
    );
    let context = started(shop::discovery(aspect));

    let users = context.get_invocable("userService").unwrap();
    let result = users.invoke("createUser", &[Value::from("carol")]).unwrap();

    assert_eq!(result, Value::from("blocked"));
    assert!(journal(&context).entries().is_empty());
}

mod naming {
    use super::*;

    pub struct Counted(pub &'static str);

    impl Invocable for Counted {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::new(self.0, "create")]
        }

        fn invoke(&self, _operation: &str, _args: &[Value]) -> Result<Value, InvocationError> {
            Ok(Value::Null)
        }
    }

    #[derive(Default)]
    pub struct CountingAspect {
        pub calls: AtomicUsize,
    }
}

#[test]
fn test_service_pointcut_selects_by_type_suffix() {
    let discovery = StaticDiscovery::new()
        .with_definition(
            ComponentDefinition::with_interface(|| Ok(naming::Counted("billing.PaymentService")))
                .named("paymentService"),
        )
        .with_definition(
            ComponentDefinition::with_interface(|| Ok(naming::Counted("billing.LedgerRepository")))
                .named("ledgerRepository"),
        )
        .with_definition(ComponentDefinition::of::<naming::CountingAspect>().aspect(
            AspectDefinition::new().before(
                "*Service.*",
                "count",
                |a: &naming::CountingAspect, _jp: &JoinPoint<'_>| {
                    a.calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            ),
        ));
    let context = started(discovery);

    context.get_invocable("paymentService").unwrap().invoke("create", &[]).unwrap();
    context.get_invocable("ledgerRepository").unwrap().invoke("create", &[]).unwrap();

    let aspect = context.get_bean_typed::<naming::CountingAspect>("countingAspect").unwrap();
    assert_eq!(aspect.calls.load(Ordering::SeqCst), 1);
    assert!(context.get_bean("paymentService").unwrap().is_advised());
    assert!(!context.get_bean("ledgerRepository").unwrap().is_advised());
}

mod flaky {
    use super::*;

    pub static FAIL_NEXT: AtomicBool = AtomicBool::new(true);

    #[derive(Default)]
    pub struct Flaky;

    pub fn definition() -> ComponentDefinition {
        ComponentDefinition::of::<Flaky>().with_init(|_: &Flaky| {
            if FAIL_NEXT.swap(false, Ordering::SeqCst) {
                return Err("下游暂不可用");
            }
            Ok(())
        })
    }
}

#[test]
fn test_failed_creation_can_be_retried() {
    let context = context(
        StaticDiscovery::new()
            .with_definition(flaky::definition())
            .with_definition(ComponentDefinition::of::<Journal>()),
        ContainerConfig {
            eager_init: false,
            ..ContainerConfig::default()
        },
    );
    context.start().unwrap();

    let error = dependency_error(context.get_bean("flaky").unwrap_err());
    assert_eq!(error.creation_chain(), vec!["flaky"]);
    assert!(!context.is_singleton_in_creation("flaky"));

    context.get_bean("journal").unwrap();
    let retried = context.get_bean("flaky").unwrap();
    assert!(retried.ptr_eq(&context.get_bean("flaky").unwrap()));
    assert_eq!(context.stats().creation_failures, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_resolution_yields_one_instance_per_name() {
    let context = Arc::new(context(
        cycle::discovery(),
        ContainerConfig {
            eager_init: false,
            ..ContainerConfig::default()
        },
    ));
    context.start().unwrap();

    let mut handles = Vec::new();
    for index in 0..16 {
        let context = context.clone();
        let name = if index % 2 == 0 { "left" } else { "right" };
        handles.push(tokio::task::spawn_blocking(move || {
            (name, context.get_bean(name).unwrap())
        }));
    }

    let mut lefts = Vec::new();
    let mut rights = Vec::new();
    for handle in handles {
        let (name, bean) = handle.await.unwrap();
        if name == "left" {
            lefts.push(bean);
        } else {
            rights.push(bean);
        }
    }

    assert!(lefts.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    assert!(rights.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    assert_eq!(context.stats().active_singletons, 2);
}
